//! App scaffolding.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::commands::CommandError;
use crate::routing::ASSETS_DIR;

const STUB_HTML: &str = include_str!("../resources/stub.html");

/// Create `<parent>/<name>/` with an `assets/` directory and a stub `index.html`.
pub fn create_app(parent: &Path, name: &str) -> Result<PathBuf, CommandError> {
    let single_component = Path::new(name).components().count() == 1;
    if name.is_empty() || name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) || !single_component {
        return Err(CommandError::InvalidName(name.to_string()));
    }

    let target = parent.join(name);
    fs::create_dir(&target).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => CommandError::AlreadyExists(target.clone()),
        _ => CommandError::Io {
            path: target.clone(),
            source: e,
        },
    })?;

    let assets = target.join(ASSETS_DIR);
    fs::create_dir(&assets).map_err(CommandError::io(&assets))?;

    let index = target.join("index.html");
    fs::write(&index, STUB_HTML).map_err(CommandError::io(&index))?;

    tracing::info!(path = %target.display(), "App created");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(dir.path(), "myapp").unwrap();
        assert!(app.join(ASSETS_DIR).is_dir());
        let index = fs::read_to_string(app.join("index.html")).unwrap();
        assert!(index.contains("<html>"));
    }

    #[test]
    fn test_rejects_nested_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a/b", "", "..", "/abs"] {
            assert!(
                matches!(create_app(dir.path(), name), Err(CommandError::InvalidName(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn test_existing_directory_aborts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("taken")).unwrap();
        assert!(matches!(
            create_app(dir.path(), "taken"),
            Err(CommandError::AlreadyExists(_))
        ));
    }
}
