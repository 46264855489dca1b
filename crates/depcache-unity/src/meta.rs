//! Sidecar `.meta` files.
//!
//! Every asset `Foo.png` has a `Foo.png.meta` next to it whose `guid:` line
//! holds the asset's content ID.

use depcache::{ContentId, ScanError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extension of sidecar files.
pub const META_EXTENSION: &str = "meta";

/// Path of the sidecar for `asset`.
#[must_use]
pub fn meta_path(asset: &Path) -> PathBuf {
    let mut os = asset.as_os_str().to_os_string();
    os.push(".");
    os.push(META_EXTENSION);
    PathBuf::from(os)
}

/// Extract the guid from the text of a `.meta` file.
#[must_use]
pub fn parse_guid(text: &str) -> Option<ContentId> {
    text.lines()
        .filter_map(|line| line.strip_prefix("guid:"))
        .map(str::trim)
        .find(|guid| !guid.is_empty())
        .map(ContentId::new)
}

/// Read the content ID of `asset` from its sidecar.
///
/// `display_path` is what ends up in the error.
///
/// # Errors
///
/// Returns a `MissingId` error if the sidecar is absent or has no guid, and a
/// `Read` error if it exists but cannot be read.
pub fn read_guid(asset: &Path, display_path: &str) -> Result<ContentId, ScanError> {
    let text = match std::fs::read_to_string(meta_path(asset)) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ScanError::missing_id(display_path));
        }
        Err(e) => return Err(ScanError::read(display_path, &e)),
    };
    parse_guid(&text).ok_or_else(|| ScanError::missing_id(display_path))
}
