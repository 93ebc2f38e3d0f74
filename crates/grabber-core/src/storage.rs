use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::error::{ErrorContext, GrabError, Result};

/// File name of the persisted registry snapshot inside a collection directory.
pub const INDEX_FILE: &str = "index.json";

/// Directory holding a collection's artifacts: `root/namespace/name`.
pub fn collection_dir<P: AsRef<Path>>(root: P, namespace: &str, name: &str) -> PathBuf {
    root.as_ref().join(namespace).join(name)
}

/// Creates a directory structure if it doesn't exist.
///
/// # Errors
///
/// Returns [`GrabError::Storage`] if the directory could not be created or the path exists
/// but is not a directory.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).with_context(path, || "creating directory".into())?;
    } else if !path.is_dir() {
        return Err(GrabError::Storage {
            action: "creating directory".into(),
            path: path.to_path_buf(),
            source: io::Error::other("path exists but is not a directory"),
        });
    }

    Ok(())
}

/// Replaces `path` with `contents` through a sibling temporary file.
///
/// Readers observe either the previous file or the complete new one.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let write = || -> io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()
    };

    if let Err(err) = write() {
        let _ = fs::remove_file(&tmp_path);
        return Err::<(), _>(err).with_context(&tmp_path, || "writing".into());
    }

    fs::rename(&tmp_path, path).with_context(path, || {
        format!("renaming `{}` to", tmp_path.display())
    })
}
