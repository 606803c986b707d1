pub mod error;
pub mod region_id;
pub mod result;
pub mod visitor;

pub use error::*;
pub use region_id::*;
pub use result::*;
pub use visitor::*;
