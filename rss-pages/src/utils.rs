use crate::types::{AggregatorError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes `value` next to `path` and renames it into place, so readers
/// never see a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec(value)?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json).map_err(|e| AggregatorError::file(&tmp_path, e))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AggregatorError::file(path, e));
    }

    Ok(())
}

/// Time helpers shared by the fetch log and the run loop.
pub mod time {
    use chrono::{DateTime, Duration, Utc};

    /// True when strictly more than `interval` has elapsed since `last`.
    pub fn has_elapsed(last: DateTime<Utc>, interval: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last) > interval
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.num_seconds();

        if total_seconds < 60 {
            format!("{}s", total_seconds)
        } else if total_seconds < 3600 {
            format!("{}m", total_seconds / 60)
        } else if total_seconds < 86400 {
            format!("{}h", total_seconds / 3600)
        } else {
            format!("{}d", total_seconds / 86400)
        }
    }
}
