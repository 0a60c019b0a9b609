use crate::utils::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// Standard (padded) base64, the form DocuSign expects in `documentBase64`.
pub fn document_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn read_document_base64<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(document_to_base64(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_document_to_base64() {
        assert_eq!(document_to_base64(b"A"), "QQ==");
        assert_eq!(document_to_base64(b""), "");
    }

    #[test]
    fn test_read_document_base64() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let encoded = read_document_base64(file.path()).unwrap();
        assert_eq!(encoded, "JVBERi0xLjQ=");
    }

    #[test]
    fn test_read_missing_document() {
        assert!(read_document_base64("/nonexistent/contract.pdf").is_err());
    }
}
