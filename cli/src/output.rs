//! Text written to the output area for each dispatch.

use reqtester_core::{DispatchError, FormField, ResponseView};

use crate::exit_codes::ExitCode;

/// What a dispatch produced, ready to print.
#[derive(Debug, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    pub exit_code: ExitCode,
}

impl Outcome {
    pub fn from_result(result: Result<ResponseView, DispatchError>) -> Self {
        match result {
            Ok(view) => Self {
                text: view.render(),
                exit_code: ExitCode::Success,
            },
            Err(DispatchError::Validation(err)) => Self {
                text: prompt_line(err.field(), &err.to_string()),
                exit_code: ExitCode::InvalidInput,
            },
            Err(err) => Self {
                text: format!("Request failed: {}", error_chain(&err)),
                exit_code: ExitCode::RequestFailed,
            },
        }
    }
}

/// `[field] prompt`, naming where the prompt belongs in the form.
pub fn prompt_line(field: FormField, prompt: &str) -> String {
    format!("[{}] {prompt}", field.as_str())
}

/// The error and all of its sources, joined with `: `.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use reqtester_core::ValidationError;
    use serde_json::json;

    use super::*;

    #[test]
    fn response_renders_as_is() {
        let view = ResponseView::new(201, &json!({"id": 5})).unwrap();
        let outcome = Outcome::from_result(Ok(view));
        assert_eq!(outcome.text, "STATUS CODE: 201\n\n{\n    \"id\": 5\n}");
        assert_eq!(outcome.exit_code, ExitCode::Success);
    }

    #[test]
    fn validation_prompt_names_its_field() {
        let outcome = Outcome::from_result(Err(ValidationError::EmptyPath.into()));
        assert_eq!(outcome.text, "[endpoint] Please enter an API endpoint.");
        assert_eq!(outcome.exit_code, ExitCode::InvalidInput);
    }

    #[test]
    fn invalid_response_is_rendered_not_swallowed() {
        let source = serde_json::from_str::<serde_json::Value>("").unwrap_err();
        let outcome = Outcome::from_result(Err(DispatchError::InvalidResponse { status: 204, source }));
        assert!(outcome.text.starts_with("Request failed: response with status 204 is not valid JSON"));
        assert_eq!(outcome.exit_code, ExitCode::RequestFailed);
    }
}
