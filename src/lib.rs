//! Shared fixtures for the workspace-level integration tests

pub use bzlgen_core::*;

use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway Bazel workspace on disk
pub struct WorkspaceFixture {
    dir: TempDir,
}

impl WorkspaceFixture {
    /// Empty workspace with root `WORKSPACE` and `BUILD` files
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("WORKSPACE"), "")?;
        fs::write(dir.path().join("BUILD"), "")?;
        Ok(Self { dir })
    }

    /// Write `contents` to the workspace-relative `path`, creating directories
    pub fn file(self, path: &str, contents: &str) -> io::Result<Self> {
        let file = self.dir.path().join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file, contents)?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self, path: &str) -> Workspace {
        Workspace::new(self.root(), path)
    }
}
