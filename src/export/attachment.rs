//! Persist attachments into the output directory.

use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::{ExtractError, Result};
use crate::model::attachment::Attachment;

/// Write one attachment to `output_dir/filename` and return that path.
///
/// The directory is created if it does not exist yet. An existing file with
/// the same name is overwritten: attachments from different messages, or two
/// same-named parts of one message, share a single path.
pub fn save_attachment(attachment: &Attachment, output_dir: &Path) -> Result<PathBuf> {
    let filename = checked_filename(&attachment.filename)?;

    std::fs::create_dir_all(output_dir).map_err(|e| ExtractError::io(output_dir, e))?;

    let path = output_dir.join(filename);
    std::fs::write(&path, &attachment.data).map_err(|e| ExtractError::io(&path, e))?;

    info!(
        path = %path.display(),
        size = attachment.data.len(),
        "Saved attachment"
    );
    Ok(path)
}

/// Accept `name` only if it is exactly one plain path component.
///
/// Rejects empty names, `.`/`..`, anything containing a separator (either
/// slash direction, on every platform) and NUL bytes.
fn checked_filename(name: &str) -> Result<&str> {
    let single_component = matches!(
        Path::new(name).components().collect::<Vec<_>>().as_slice(),
        [Component::Normal(_)]
    );
    if !single_component || name.contains(['/', '\\', '\0']) {
        return Err(ExtractError::InvalidFilename(name.to_string()));
    }
    Ok(name)
}
