use bytes::Bytes;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME_TYPE: &str = "application/vnd.ms-excel";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// An uploaded spreadsheet: the filename is only used for tagging rows and
/// for error messages.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let size = content.len();
        Self {
            name: name.into(),
            size,
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: String) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn is_spreadsheet(&self) -> bool {
        let declared = self
            .mime_type
            .as_deref()
            .map(|mt| mt == XLSX_MIME_TYPE || mt == XLS_MIME_TYPE)
            .unwrap_or(false);

        let name = self.name.to_lowercase();
        declared
            || name.ends_with(".xlsx")
            || name.ends_with(".xls")
            || self.content.starts_with(ZIP_MAGIC)
            || self.content.starts_with(CFB_MAGIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_detection() {
        assert!(UploadedFile::new("Cartera.XLSX", Bytes::new()).is_spreadsheet());
        assert!(UploadedFile::new("old.xls", Bytes::new()).is_spreadsheet());
        assert!(UploadedFile::new("blob", b"PK\x03\x04rest".to_vec()).is_spreadsheet());
        assert!(UploadedFile::new("blob", vec![0xD0u8, 0xCF, 0x11, 0xE0, 0]).is_spreadsheet());
        assert!(UploadedFile::new("blob", Bytes::new())
            .with_mime_type(XLSX_MIME_TYPE.to_string())
            .is_spreadsheet());
        assert!(!UploadedFile::new("notes.txt", b"hello".to_vec()).is_spreadsheet());
    }
}
