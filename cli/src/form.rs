//! Interactive form: one command per line, the credential kept in between.
//!
//! Fields are edited with `method`, `path`, `data`, `file` and `cancel`;
//! `send` dispatches the current form. A line starting with a method name
//! (`POST /api/auth/token/ {"username": "ana", "password": "pw"}`) fills
//! method, path and data in one go and sends immediately.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use reqtester_core::{Dispatcher, FileBlob, FormField, HttpMethod, RequestSpec, Transport, EMPTY_FILE_LABEL};
use tracing::debug;

use crate::output::Outcome;

pub const HELP: &str = "\
Commands:
  method <METHOD>         GET, POST, PUT, PATCH or DELETE
  path <PATH>             API path, e.g. /api/photos/
  data <JSON>             request data (rest of the line)
  file <FILE>             attach a file, sent as the `image` field
  cancel                  detach the file
  show                    print the form
  send                    send the request
  <METHOD> <PATH> [JSON]  fill method, path and data, then send
  help                    print this help
  quit                    leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Method(HttpMethod),
    Path(String),
    Data(String),
    File(String),
    Cancel,
    Show,
    Send,
    Quick {
        method: HttpMethod,
        path: String,
        data: String,
    },
    Help,
    Quit,
}

/// Split off the first word. The rest keeps its whitespace apart from the
/// single separator after the word.
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((at, sep)) => (&line[..at], &line[at + sep.len_utf8()..]),
        None => (line, ""),
    }
}

/// `Ok(None)` for blank lines and `#` comments.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let (word, rest) = split_word(line);
    if word.is_empty() || word.starts_with('#') {
        return Ok(None);
    }
    if let Ok(method) = word.parse::<HttpMethod>() {
        let (path, data) = split_word(rest);
        return Ok(Some(Command::Quick {
            method,
            path: path.to_string(),
            data: data.to_string(),
        }));
    }
    let command = match word.to_ascii_lowercase().as_str() {
        "method" => Command::Method(rest.parse()?),
        "path" => Command::Path(rest.to_string()),
        "data" => Command::Data(rest.to_string()),
        "file" if rest.trim().is_empty() => return Err("usage: file <FILE>".to_string()),
        "file" => Command::File(rest.trim().to_string()),
        "cancel" => Command::Cancel,
        "show" => Command::Show,
        "send" => Command::Send,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try `help`")),
    };
    Ok(Some(command))
}

/// Read a file from disk for upload.
pub fn load_file(path: &Path) -> Result<FileBlob> {
    let content = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileBlob::new(filename, content))
}

/// Current contents of the form.
#[derive(Debug, Clone)]
pub struct FormState {
    spec: RequestSpec,
    /// Validation prompt shown in place of a field until it is edited.
    notice: Option<(FormField, String)>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            spec: RequestSpec::new(HttpMethod::Get, ""),
            notice: None,
        }
    }
}

impl FormState {
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    fn edited(&mut self, field: FormField) {
        if matches!(&self.notice, Some((f, _)) if *f == field) {
            self.notice = None;
        }
    }

    fn shown(&self, field: FormField, value: &str) -> String {
        match &self.notice {
            Some((f, prompt)) if *f == field => prompt.clone(),
            _ => value.to_string(),
        }
    }

    pub fn file_label(&self) -> String {
        self.spec
            .file
            .as_ref()
            .map_or_else(|| EMPTY_FILE_LABEL.to_string(), FileBlob::label)
    }

    /// The form as it would look on screen.
    pub fn render(&self) -> String {
        format!(
            "method: {}\npath: {}\ndata: {}\nfile: {}",
            self.spec.method,
            self.shown(FormField::Endpoint, &self.spec.path),
            self.shown(FormField::Data, &self.spec.data),
            self.file_label(),
        )
    }
}

/// Run commands from `input` until it ends or `quit` is read.
pub fn run_form<T, R, W>(dispatcher: &mut Dispatcher<T>, input: R, output: &mut W, interactive: bool) -> Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    let mut form = FormState::default();
    if interactive {
        writeln!(
            output,
            "Sending to {}://{}. Type `help` for commands.",
            dispatcher.builder().scheme(),
            dispatcher.builder().host()
        )?;
    }

    let mut lines = input.lines();
    loop {
        if interactive {
            write!(output, "> ")?;
            output.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read form input")?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };
        debug!(?command, "form command");

        match command {
            Command::Method(method) => form.spec.method = method,
            Command::Path(path) => {
                form.spec.path = path;
                form.edited(FormField::Endpoint);
            }
            Command::Data(data) => {
                form.spec.data = data;
                form.edited(FormField::Data);
            }
            Command::File(path) => match load_file(Path::new(&path)) {
                Ok(file) => {
                    form.spec.file = Some(file);
                    writeln!(output, "file: {}", form.file_label())?;
                }
                Err(err) => writeln!(output, "{err:#}")?,
            },
            Command::Cancel => {
                form.spec.file = None;
                writeln!(output, "file: {}", form.file_label())?;
            }
            Command::Show => writeln!(output, "{}", form.render())?,
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => break,
            Command::Send => submit(dispatcher, &mut form, output)?,
            Command::Quick { method, path, data } => {
                form.spec.method = method;
                form.spec.path = path;
                form.spec.data = data;
                form.notice = None;
                submit(dispatcher, &mut form, output)?;
            }
        }
    }
    Ok(())
}

fn submit<T: Transport, W: Write>(dispatcher: &mut Dispatcher<T>, form: &mut FormState, output: &mut W) -> Result<()> {
    let result = dispatcher.dispatch(form.spec());
    if let Err(reqtester_core::DispatchError::Validation(err)) = &result {
        form.notice = Some((err.field(), err.to_string()));
    }
    let outcome = Outcome::from_result(result);
    writeln!(output, "{}", outcome.text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_line_becomes_quick_send() {
        let command = parse_command(r#"post /api/auth/token/ {"username": "ana"}"#).unwrap();
        assert_eq!(
            command,
            Some(Command::Quick {
                method: HttpMethod::Post,
                path: "/api/auth/token/".to_string(),
                data: r#"{"username": "ana"}"#.to_string(),
            })
        );
    }

    #[test]
    fn quick_send_without_path_keeps_it_empty() {
        let command = parse_command("GET").unwrap();
        assert!(matches!(command, Some(Command::Quick { path, .. }) if path.is_empty()));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# login first"), Ok(None));
    }

    #[test]
    fn data_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse_command("data {\"a\": 1, \"b\": \"x y\"}"),
            Ok(Some(Command::Data("{\"a\": 1, \"b\": \"x y\"}".to_string())))
        );
    }

    #[test]
    fn path_keeps_surrounding_spaces() {
        assert_eq!(
            parse_command("path  /api/x "),
            Ok(Some(Command::Path(" /api/x ".to_string())))
        );
        assert_eq!(parse_command("path"), Ok(Some(Command::Path(String::new()))));
    }

    #[test]
    fn method_and_file_arguments_are_trimmed() {
        assert_eq!(parse_command("method  patch "), Ok(Some(Command::Method(HttpMethod::Patch))));
        assert_eq!(
            parse_command("file  photo.png "),
            Ok(Some(Command::File("photo.png".to_string())))
        );
    }

    #[test]
    fn unknown_commands_and_methods_are_reported() {
        assert!(parse_command("launch").unwrap_err().contains("unknown command"));
        assert!(parse_command("method TRACE").unwrap_err().contains("unsupported HTTP method"));
        assert!(parse_command("file").is_err());
    }

    #[test]
    fn prompt_replaces_field_until_edited() {
        let mut form = FormState::default();
        form.notice = Some((FormField::Endpoint, "Please enter an API endpoint.".to_string()));
        assert!(form.render().contains("path: Please enter an API endpoint."));
        form.edited(FormField::Data);
        assert!(form.notice.is_some());
        form.edited(FormField::Endpoint);
        assert!(form.render().contains("path: \n"));
    }

    #[test]
    fn file_label_tracks_attachment() {
        let mut form = FormState::default();
        assert_eq!(form.file_label(), "File");
        form.spec.file = Some(FileBlob::new("a-very-long-photo-name.png", vec![]));
        assert_eq!(form.file_label(), "a-very-long-ph...");
    }
}
