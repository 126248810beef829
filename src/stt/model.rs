//! Opaque model handles.
//!
//! Model acquisition and validation happen outside this crate; the session
//! core only checks whether a handle is present. A handle stays immutable
//! for the lifetime of any session that uses it.

use std::path::{Path, PathBuf};

/// Handle to an already-validated recognition model on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    path: PathBuf,
    name: String,
}

impl ModelHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short display name, derived from the model directory name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Holder for the currently loaded model, supplied by the external
/// model-management collaborator.
#[derive(Debug, Default)]
pub struct ModelStore {
    handle: Option<ModelHandle>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly loaded model, replacing any previous one.
    pub fn install(&mut self, handle: ModelHandle) {
        self.handle = Some(handle);
    }

    pub fn clear(&mut self) {
        self.handle = None;
    }

    pub fn loaded_model(&self) -> Option<&ModelHandle> {
        self.handle.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }
}
