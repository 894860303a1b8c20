use std::fs;
use std::path::{Path, PathBuf};

use pr_api::PremiumRequest;
use pr_core::RatingError;

use crate::map_request_read;

/// Absolute form of a user-supplied path, relative to the working directory.
pub(crate) fn resolve_path(raw: &Path) -> Result<PathBuf, RatingError> {
    if raw.is_absolute() {
        return Ok(raw.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|error| {
        RatingError::request(format!("failed to resolve working directory: {}", error))
    })?;
    Ok(cwd.join(raw))
}

pub(crate) fn load_request(path: &str) -> Result<PremiumRequest, RatingError> {
    let absolute = resolve_path(Path::new(path))?;
    if !absolute.exists() {
        return Err(RatingError::request(format!(
            "request file does not exist: {}",
            absolute.display()
        )));
    }
    if !absolute.is_file() {
        return Err(RatingError::request(format!(
            "request path is not a file: {}",
            absolute.display()
        )));
    }

    let raw = fs::read_to_string(&absolute).map_err(map_request_read)?;
    PremiumRequest::from_json(&raw)
}
