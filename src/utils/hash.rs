use std::time::{SystemTime, UNIX_EPOCH};
use sha2::{Sha256, Digest};

pub fn hash_text(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Short visitor token from wall-clock time and process id.
/// Not collision-free: two sessions opened in the same instant by the
/// same process share an id.
pub fn visitor_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    let mut digest = hash_text(&format!("{}_{}", secs, std::process::id()));
    digest.truncate(8);
    digest
}
