use crate::error::CommonError;

/// Common Result type alias
pub type CommonResult<T> = Result<T, CommonError>;

/// Decode a JSON document into `T`
pub fn from_json<T: serde::de::DeserializeOwned>(source: &str) -> CommonResult<T> {
    Ok(serde_json::from_str(source)?)
}
