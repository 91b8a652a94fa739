//! Asynchronous file read primitive.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::dispatch::error::DispatchError;
use crate::dispatch::DispatchResult;

/// Parameters for a file read from the configured data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReadParams {
    /// Bare filename inside the data directory.
    pub name: String,
}

impl FileReadParams {
    /// Reject empty names and anything that could escape the data directory.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("filename must not be empty".to_string());
        }
        if self.name.contains("..") || self.name.contains('/') || self.name.contains('\\') {
            return Err("filename must not contain path separators".to_string());
        }
        Ok(())
    }

    pub fn resolve(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.name)
    }
}

/// Read the file without holding a worker slot or the dispatch path.
pub async fn read(path: PathBuf, params: &FileReadParams) -> DispatchResult {
    let contents = tokio::fs::read(&path)
        .await
        .map_err(|e| DispatchError::Transport(format!("read {}: {}", params.name, e)))?;

    Ok(json!({
        "name": params.name,
        "bytes": contents.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_rejected() {
        for name in ["../etc/passwd", "a/b", "a\\b", ""] {
            assert!(
                FileReadParams { name: name.into() }.validate().is_err(),
                "{:?} should be rejected",
                name
            );
        }
        assert!(FileReadParams {
            name: "notes.txt".into()
        }
        .validate()
        .is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_transport_error() {
        let params = FileReadParams {
            name: "does-not-exist.txt".into(),
        };
        let path = params.resolve(Path::new("/nonexistent-dir"));
        let result = read(path, &params).await;
        assert!(matches!(result, Err(DispatchError::Transport(_))));
    }
}
