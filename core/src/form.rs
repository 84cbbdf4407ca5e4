//! Raw form input as the front end hands it over.
//!
//! # Design
//! `RequestSpec` is a snapshot of the form taken at the moment the user
//! presses send. It is plain data with no validation applied; everything
//! that can go wrong with it is reported by `RequestBuilder::build`.

use mime_guess::Mime;

use crate::http::HttpMethod;

/// Label shown while no file is attached.
pub const EMPTY_FILE_LABEL: &str = "File";

const LABEL_MAX_CHARS: usize = 17;
const LABEL_KEEP_CHARS: usize = 14;

/// A file picked in the form: its name and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub filename: String,
    pub content: Vec<u8>,
}

impl FileBlob {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Media type guessed from the file extension.
    pub fn mime_type(&self) -> Mime {
        mime_guess::from_path(&self.filename).first_or_octet_stream()
    }

    /// Label to show next to the file picker.
    pub fn label(&self) -> String {
        file_label(&self.filename)
    }
}

/// Shorten a file name for display: anything over 17 characters keeps its
/// first 14 followed by `...`.
pub fn file_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX_CHARS {
        let head: String = name.chars().take(LABEL_KEEP_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Everything the form holds when a request is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    /// JSON text exactly as typed.
    pub data: String,
    pub file: Option<FileBlob>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            data: String::new(),
            file: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_file(mut self, file: FileBlob) -> Self {
        self.file = Some(file);
        self
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}
