//! JSON Array File Storage
//!
//! Whole-file read and write of a JSON array of records. Every mutation is
//! a full read-modify-write; callers get no locking, but a write is never
//! observed half done.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Error reading or writing a record file
#[derive(Debug, thiserror::Error)]
pub enum JsonFileError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode records for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Handle to one JSON array file
#[derive(Debug, Clone)]
pub struct JsonArrayFile {
    path: PathBuf,
}

impl JsonArrayFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record.
    ///
    /// A missing or empty file reads as an empty list. A file that exists but
    /// does not parse is an error; it is never silently replaced.
    pub async fn read_all<T>(&self) -> Result<Vec<T>, JsonFileError>
    where
        T: DeserializeOwned,
    {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(JsonFileError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| JsonFileError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file with `records`, pretty-printed.
    ///
    /// The records go to a temp file in the same directory which is then
    /// renamed over the target, so readers and overlapping writers only ever
    /// see a complete file. Creates the parent directory if needed.
    pub async fn write_all<T>(&self, records: &[T]) -> Result<(), JsonFileError>
    where
        T: Serialize,
    {
        let json = serde_json::to_vec_pretty(records).map_err(|source| JsonFileError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| JsonFileError::Io {
                path: dir.clone(),
                source,
            })?;

        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || replace_file(&dir, &path, &json))
            .await
            .unwrap_or_else(|e| Err(std::io::Error::other(e)));

        result.map_err(|source| JsonFileError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn replace_file(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u64,
        name: String,
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonArrayFile::new(dir.path().join("rows.json"));

        let rows: Vec<Row> = file.read_all().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonArrayFile::new(dir.path().join("nested").join("rows.json"));

        let rows = vec![
            Row { id: 1, name: "a".into() },
            Row { id: 2, name: "b".into() },
        ];
        file.write_all(&rows).await.unwrap();

        let back: Vec<Row> = file.read_all().await.unwrap();
        assert_eq!(back, rows);

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("\n  {"), "expected 2-space indentation");
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "{ not json").unwrap();

        let file = JsonArrayFile::new(path);
        let result: Result<Vec<Row>, _> = file.read_all().await;
        assert!(matches!(result, Err(JsonFileError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_blank_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "  \n").unwrap();

        let rows: Vec<Row> = JsonArrayFile::new(path).read_all().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_overlapping_writes_leave_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonArrayFile::new(dir.path().join("rows.json"));

        let writers: Vec<_> = (0..16u64)
            .map(|n| {
                let file = file.clone();
                tokio::spawn(async move {
                    let rows: Vec<Row> = (0..=n)
                        .map(|id| Row { id, name: "x".repeat(id as usize * 50) })
                        .collect();
                    file.write_all(&rows).await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let rows: Vec<Row> = file.read_all().await.unwrap();
        assert!(!rows.is_empty());
        // No temp files left beside the target
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
