use crate::domain::ports::DocumentProvider;
use crate::utils::error::{DefineryError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];

/// Reads shared parameter files from the local file system.
///
/// The CAD tool writes either UTF-8 or UTF-16 LE (with BOM); both decode to the
/// same text.
#[derive(Debug, Clone, Default)]
pub struct LocalDocuments {
    base_path: Option<PathBuf>,
}

impl LocalDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative paths resolve against `base_path`.
    pub fn rooted(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl DocumentProvider for LocalDocuments {
    async fn read_all_text(&self, path: &Path) -> Result<String> {
        let full_path = self.resolve(path);
        let bytes = tokio::fs::read(&full_path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), full_path.display());
        decode(&bytes)
    }
}

fn decode(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        if rest.len() % 2 != 0 {
            return Err(invalid_data(format!(
                "UTF-16 text has a trailing odd byte ({} bytes after BOM)",
                rest.len()
            )));
        }
        let units = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(|e| invalid_data(e.to_string()));
    }

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| invalid_data(e.to_string()))
}

fn invalid_data(reason: String) -> DefineryError {
    DefineryError::IoFailure(std::io::Error::new(std::io::ErrorKind::InvalidData, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_reads_utf8_with_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(UTF8_BOM).unwrap();
        file.write_all("*META\tVERSION".as_bytes()).unwrap();

        let text = LocalDocuments::new().read_all_text(file.path()).await.unwrap();
        assert_eq!(text, "*META\tVERSION");
    }

    #[tokio::test]
    async fn test_reads_utf16_le() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(UTF16_LE_BOM).unwrap();
        for unit in "*GROUP\tID\tNAME\nGROUP\t1\tDonnées".encode_utf16() {
            file.write_all(&unit.to_le_bytes()).unwrap();
        }

        let text = LocalDocuments::new().read_all_text(file.path()).await.unwrap();
        assert_eq!(text, "*GROUP\tID\tNAME\nGROUP\t1\tDonnées");
    }

    #[tokio::test]
    async fn test_relative_path_resolves_against_base() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("params.txt"), "hello").unwrap();

        let docs = LocalDocuments::rooted(dir.path());
        assert_eq!(docs.read_all_text(Path::new("params.txt")).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_failure() {
        let dir = TempDir::new().unwrap();
        let err = LocalDocuments::rooted(dir.path())
            .read_all_text(Path::new("nope.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DefineryError::IoFailure(_)));
    }

    #[test]
    fn test_truncated_utf16_is_rejected() {
        let mut bytes = UTF16_LE_BOM.to_vec();
        for unit in "PARAM".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.push(0x41);

        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DefineryError::IoFailure(ref e) if e.kind() == std::io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        assert!(decode(&[0x66, 0xFF, 0x6F]).is_err());
    }
}
