use crc32fast::Hasher;

/// Stable region identifier for a block title using CRC32.
///
/// The same title always yields the same id, across sessions and
/// catalog reloads, so a region whose boundary markers were lost can
/// still be matched to its block.
pub fn region_id(title: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"block://");
    hasher.update(title.as_bytes());
    format!("rgn-{:08x}", hasher.finalize())
}

/// CRC32 over a sequence of byte slices
pub fn checksum(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}
