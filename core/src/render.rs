//! Turning a response into the text shown in the output area.

use std::fmt;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

const INDENT: &[u8] = b"    ";

/// Status and pretty-printed JSON of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseView {
    pub status: u16,
    pub body: String,
}

impl ResponseView {
    pub fn new(status: u16, body: &Value) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status,
            body: to_pretty_json(body)?,
        })
    }

    /// `STATUS CODE: <n>` followed by a blank line and the body.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResponseView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STATUS CODE: {}\n\n{}", self.status, self.body)
    }
}

/// JSON with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}
