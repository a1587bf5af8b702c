//! Handing finished artifacts to a destination.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::job::Artifact;

/// Bundles a batch's artifacts into a deliverable.
pub trait ArchivePackager {
    /// Store `artifacts` in order, returning where each one went.
    ///
    /// # Errors
    ///
    /// Returns an error if any artifact cannot be stored.
    fn package(&self, artifacts: &[&Artifact]) -> Result<Vec<PathBuf>>;
}

/// Writes each artifact as a file in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryPackager {
    dir: PathBuf,
}

impl DirectoryPackager {
    /// Package into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destination directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArchivePackager for DirectoryPackager {
    fn package(&self, artifacts: &[&Artifact]) -> Result<Vec<PathBuf>> {
        check_filenames(artifacts)?;
        if !artifacts.is_empty() && !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }
        artifacts
            .iter()
            .map(|artifact| {
                let path = self.dir.join(&artifact.filename);
                std::fs::write(&path, &artifact.bytes)?;
                tracing::debug!(path = %path.display(), "wrote artifact");
                Ok(path)
            })
            .collect()
    }
}

/// Every filename must be one plain component, unique ignoring ASCII case.
/// Nothing is written if any check fails.
fn check_filenames(artifacts: &[&Artifact]) -> Result<()> {
    let mut seen = HashSet::with_capacity(artifacts.len());
    for artifact in artifacts {
        let name = &artifact.filename;
        let mut components = Path::new(name).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !name.contains(['/', '\\']);
        if !plain {
            return Err(Error::UnsafeArtifactName(name.clone()));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(Error::DuplicateArtifact(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "alpha_premultiply_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn writes_artifacts_into_new_directory() {
        let dir = temp_dir("packager").join("nested");
        let artifact = Artifact {
            filename: "x.tga".into(),
            mime: crate::job::TGA_MIME,
            bytes: Arc::from(&b"abc"[..]),
        };
        let paths = DirectoryPackager::new(&dir).package(&[&artifact]).unwrap();
        assert_eq!(paths, [dir.join("x.tga")]);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"abc");
        std::fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }

    fn artifact(filename: &str) -> Artifact {
        Artifact {
            filename: filename.into(),
            mime: crate::job::TGA_MIME,
            bytes: Arc::from(&b"abc"[..]),
        }
    }

    #[test]
    fn duplicate_names_write_nothing() {
        let dir = temp_dir("duplicates");
        let (a, b) = (artifact("logo.tga"), artifact("logo.tga"));
        let err = DirectoryPackager::new(&dir).package(&[&a, &b]).unwrap_err();
        assert!(matches!(err, Error::DuplicateArtifact(ref name) if name == "logo.tga"));
        assert_eq!(err.kind(), crate::ErrorKind::Package);
        assert!(!dir.exists());

        let upper = artifact("LOGO.tga");
        assert!(DirectoryPackager::new(&dir).package(&[&a, &upper]).is_err());
    }

    #[test]
    fn names_cannot_leave_the_directory() {
        let dir = temp_dir("escape");
        for name in ["../escaped.tga", "/tmp/abs.tga", "a/b.tga", "..", ".", "", "a\\b.tga"] {
            let err = DirectoryPackager::new(&dir)
                .package(&[&artifact(name)])
                .unwrap_err();
            assert!(matches!(err, Error::UnsafeArtifactName(_)), "{name:?}");
        }
        assert!(!dir.exists());
    }
}
