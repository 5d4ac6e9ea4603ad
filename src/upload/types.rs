use derivative::Derivative;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A picked or dropped file, held in memory as opaque bytes.
#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    #[derivative(Debug = "ignore")]
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path, mime_type: &str) -> io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid filename"))?;
        let bytes = fs::read(path)?;
        Ok(Self::new(name, mime_type, Arc::from(bytes)))
    }
}

/// Which of the two upload slots a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSlot {
    Document,
    Data,
}

/// Both files, ready to be sent together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub document: SelectedFile,
    pub data: SelectedFile,
}

impl FilePair {
    pub fn total_bytes(&self) -> u64 {
        self.document.size_bytes + self.data.size_bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerHealth {
    Checking,
    Online,
    Offline,
}

impl ServerHealth {
    pub fn label(&self) -> &'static str {
        match self {
            ServerHealth::Checking => "Checking...",
            ServerHealth::Online => "ONLINE",
            ServerHealth::Offline => "OFFLINE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn from_path_reads_name_size_and_bytes() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(b"id,grade\n1,A\n").unwrap();

        let selected = SelectedFile::from_path(file.path(), "text/csv").unwrap();

        assert!(selected.name.ends_with(".csv"));
        assert_eq!(selected.size_bytes, 13);
        assert_eq!(selected.mime_type, "text/csv");
        assert_eq!(&selected.bytes[..], b"id,grade\n1,A\n");
    }

    #[test]
    fn from_path_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.docx");
        assert!(SelectedFile::from_path(&missing, "text/csv").is_err());
    }

    #[test]
    fn debug_output_omits_file_contents() {
        let file = SelectedFile::new("grades.csv", "text/csv", Arc::from(&b"secret-row"[..]));
        let rendered = format!("{:?}", file);
        assert!(rendered.contains("grades.csv"));
        assert!(!rendered.contains("secret"));
    }
}
