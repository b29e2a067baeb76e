//! Scoped temp-file lifecycle for conversion requests.
//!
//! Every intermediate artifact (input copy, palette image, tier output)
//! is a [`tempfile::TempPath`], so deletion is guaranteed on every exit
//! path: drop removes the file whether the request succeeded, failed, or
//! panicked. Final artifacts leave the scope only via [`persist`].

use std::io::Write;
use std::path::Path;

use tempfile::{NamedTempFile, TempPath};

use gifforge_core::{Error, Result};

/// Save an upload to a scoped temp file, inferring the extension from the
/// original file name (`.mp4` when absent, matching the most common input).
///
/// Fails fast with a `Validation` error for an empty upload.
pub fn save_scoped_input(original_name: &str, bytes: &[u8]) -> Result<TempPath> {
    if bytes.is_empty() {
        return Err(Error::Validation("uploaded file is empty".into()));
    }

    let ext = infer_extension(original_name);
    let mut file = tempfile::Builder::new()
        .prefix("gifforge-in-")
        .suffix(&ext)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;

    Ok(file.into_temp_path())
}

/// Scoped path for the two-pass palette intermediate.
pub fn scoped_palette() -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix("gifforge-palette-")
        .suffix(".png")
        .tempfile()?;
    Ok(file.into_temp_path())
}

/// Scoped path for a tier's output attempt. Only a verified, successful
/// attempt is persisted into the export directory.
pub fn scoped_output(ext: &str) -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix("gifforge-out-")
        .suffix(&format!(".{ext}"))
        .tempfile()?;
    Ok(file.into_temp_path())
}

/// Globally-unique artifact name: `<uuid-v4>.<ext>`. Never reused, so
/// concurrent requests cannot collide in the shared export directory.
pub fn unique_artifact_name(ext: &str) -> String {
    format!("{}.{ext}", uuid::Uuid::new_v4())
}

/// Verify that an artifact exists and is non-empty, returning its size.
pub fn verify_artifact(path: &Path) -> Result<u64> {
    let meta = std::fs::metadata(path).map_err(|_| {
        Error::Resource(format!("expected output {} was not created", path.display()))
    })?;
    if meta.len() == 0 {
        return Err(Error::Resource(format!(
            "output {} is empty",
            path.display()
        )));
    }
    Ok(meta.len())
}

/// Move a verified scoped output into its final location.
///
/// Rename first; fall back to copy+remove for cross-filesystem moves.
pub fn persist(scoped: TempPath, dest: &Path) -> Result<()> {
    if let Err(e) = scoped.persist(dest) {
        let scoped = e.path;
        std::fs::copy(&scoped, dest)?;
        // TempPath drop removes the source copy.
    }
    Ok(())
}

fn infer_extension(name: &str) -> String {
    match Path::new(name).extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => ".mp4".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn input_extension_inferred_from_name() {
        let path = save_scoped_input("clip.MOV", b"data").unwrap();
        assert!(path.to_string_lossy().ends_with(".mov"));
    }

    #[test]
    fn input_extension_defaults_to_mp4() {
        let path = save_scoped_input("upload", b"data").unwrap();
        assert!(path.to_string_lossy().ends_with(".mp4"));
    }

    #[test]
    fn empty_upload_is_validation_error() {
        let err = save_scoped_input("clip.mp4", b"").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn scoped_input_deleted_on_drop() {
        let path = save_scoped_input("clip.mp4", b"data").unwrap();
        let on_disk = path.to_path_buf();
        assert!(on_disk.exists());
        drop(path);
        assert!(!on_disk.exists());
    }

    #[test]
    fn palette_deleted_on_drop() {
        let palette = scoped_palette().unwrap();
        let on_disk = palette.to_path_buf();
        assert!(on_disk.exists());
        drop(palette);
        assert!(!on_disk.exists());
    }

    #[test]
    fn unique_names_do_not_collide() {
        let a = unique_artifact_name("gif");
        let b = unique_artifact_name("gif");
        assert_ne!(a, b);
        assert!(a.ends_with(".gif"));
    }

    #[test]
    fn verify_rejects_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.gif");
        assert!(matches!(
            verify_artifact(&missing),
            Err(Error::Resource(_))
        ));

        let empty = dir.path().join("empty.gif");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(verify_artifact(&empty), Err(Error::Resource(_))));

        let full = dir.path().join("full.gif");
        fs::write(&full, b"GIF89a").unwrap();
        assert_eq!(verify_artifact(&full).unwrap(), 6);
    }

    #[test]
    fn persist_moves_into_destination() {
        let dir = tempfile::tempdir().unwrap();
        let out = scoped_output("gif").unwrap();
        fs::write(&out, b"GIF89a").unwrap();

        let dest = dir.path().join("final.gif");
        persist(out, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"GIF89a");
    }
}
