//! Stateless request builder and response parser.
//!
//! # Design
//! `RequestBuilder` holds only the startup configuration (scheme, host and
//! the anonymous `Authorization` policy) and carries no mutable state
//! between calls. Building is split from parsing: `build` turns a form
//! snapshot plus the current credential into an `HttpRequest`, and
//! `parse_response` turns the transport's `HttpResponse` into a view. The
//! caller executes the round-trip in between, keeping this module
//! deterministic and free of I/O.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DispatchError, ValidationError};
use crate::form::{FileBlob, RequestSpec};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::multipart::MultipartForm;
use crate::render::ResponseView;
use crate::session::{AnonymousAuth, Credential};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Multipart field the attached file is sent under.
pub const FILE_FIELD: &str = "image";

/// Paths ending in this suffix issue tokens.
pub const TOKEN_PATH_SUFFIX: &str = "token/";

/// Which `Content-Type` the request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    /// Multipart: the transport sets the header along with the boundary.
    TransportChosen,
}

impl ContentType {
    /// Value for the explicit header set, if any.
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            ContentType::Json => Some(JSON_CONTENT_TYPE),
            ContentType::TransportChosen => None,
        }
    }
}

/// JSON unless a file is attached.
pub fn determine_content_type(has_file: bool) -> ContentType {
    if has_file {
        ContentType::TransportChosen
    } else {
        ContentType::Json
    }
}

/// Whether responses to `path` carry a token to capture.
pub fn captures_token(path: &str) -> bool {
    path.ends_with(TOKEN_PATH_SUFFIX)
}

/// Build the request body from the raw form data.
///
/// GET and DELETE never get a body. Every other method needs non-empty,
/// parseable JSON. With `ContentType::TransportChosen` the file goes first,
/// followed by one text field per object member or array element (keyed
/// by index). Other JSON values add no fields.
pub fn build_body(
    method: HttpMethod,
    content_type: ContentType,
    data: &str,
    file: Option<&FileBlob>,
) -> Result<Option<RequestBody>, ValidationError> {
    if !method.carries_body() {
        return Ok(None);
    }
    if data.is_empty() {
        return Err(ValidationError::EmptyData);
    }
    let parsed: Value = serde_json::from_str(data).map_err(|e| ValidationError::MalformedData {
        detail: e.to_string(),
    })?;

    match content_type {
        ContentType::Json => Ok(Some(RequestBody::Json(parsed.to_string()))),
        ContentType::TransportChosen => {
            let mut form = MultipartForm::new();
            if let Some(file) = file {
                form = form.file(FILE_FIELD, file.clone());
            }
            for (key, value) in form_fields(parsed) {
                form = form.text(key, field_text(value));
            }
            Ok(Some(RequestBody::Multipart(form)))
        }
    }
}

fn form_fields(parsed: Value) -> Vec<(String, Value)> {
    match parsed {
        Value::Object(fields) => fields.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Text of a form field: strings as-is, anything else as compact JSON.
fn field_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// A built request plus what to do with its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub request: HttpRequest,
    /// Store the reply's `access` field as the new credential.
    pub captures_token: bool,
}

/// Builds `HttpRequest` values for one backend.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    scheme: String,
    host: String,
    anonymous_auth: AnonymousAuth,
}

impl RequestBuilder {
    pub fn new(scheme: &str, host: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            anonymous_auth: AnonymousAuth::default(),
        }
    }

    pub fn anonymous_auth(mut self, policy: AnonymousAuth) -> Self {
        self.anonymous_auth = policy;
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `{scheme}://{host}{path}`, with `path` taken verbatim.
    pub fn build_url(&self, path: &str) -> Result<String, ValidationError> {
        if path.is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        Ok(format!("{}://{}{}", self.scheme, self.host, path))
    }

    pub fn build(&self, spec: &RequestSpec, credential: &Credential) -> Result<PreparedRequest, ValidationError> {
        let url = self.build_url(&spec.path)?;
        let content_type = determine_content_type(spec.has_file());
        let body = build_body(spec.method, content_type, &spec.data, spec.file.as_ref())?;

        let mut headers = Vec::new();
        if let Some(value) = content_type.header_value() {
            headers.push(("Content-Type".to_string(), value.to_string()));
        }
        if let Some(value) = credential.authorization(self.anonymous_auth) {
            headers.push(("Authorization".to_string(), value));
        }

        debug!(method = %spec.method, %url, file = spec.has_file(), "built request");
        Ok(PreparedRequest {
            request: HttpRequest {
                method: spec.method,
                url,
                headers,
                body,
            },
            captures_token: captures_token(&spec.path),
        })
    }

    /// Parse the response body as JSON and render it.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<(ResponseView, Value), DispatchError> {
        let status = response.status;
        let body: Value = serde_json::from_str(&response.body).map_err(|source| {
            warn!(status, "response body is not JSON");
            DispatchError::InvalidResponse { status, source }
        })?;
        let view = ResponseView::new(status, &body).map_err(|source| DispatchError::InvalidResponse { status, source })?;
        Ok((view, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("http", "localhost:8000")
    }

    fn photo() -> FileBlob {
        FileBlob::new("photo.png", b"\x89PNG".to_vec())
    }

    #[test]
    fn url_is_scheme_host_and_exact_path() {
        let b = builder();
        assert_eq!(b.build_url("/api/photos/").unwrap(), "http://localhost:8000/api/photos/");
        assert_eq!(b.build_url(" odd path?q=a b").unwrap(), "http://localhost:8000 odd path?q=a b");
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(builder().build_url(""), Err(ValidationError::EmptyPath));
        let spec = RequestSpec::new(HttpMethod::Get, "");
        assert_eq!(builder().build(&spec, &Credential::new()), Err(ValidationError::EmptyPath));
    }

    #[test]
    fn content_type_depends_on_file() {
        assert_eq!(determine_content_type(false), ContentType::Json);
        assert_eq!(determine_content_type(true), ContentType::TransportChosen);
        assert_eq!(ContentType::TransportChosen.header_value(), None);
    }

    #[test]
    fn get_and_delete_never_carry_a_body() {
        for method in [HttpMethod::Get, HttpMethod::Delete] {
            for content_type in [ContentType::Json, ContentType::TransportChosen] {
                let photo = photo();
                assert_eq!(build_body(method, content_type, "{not json", Some(&photo)), Ok(None));
                assert_eq!(build_body(method, content_type, "", None), Ok(None));
            }
        }
    }

    #[test]
    fn empty_data_is_rejected_for_body_methods() {
        for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch] {
            assert_eq!(build_body(method, ContentType::Json, "", None), Err(ValidationError::EmptyData));
        }
    }

    #[test]
    fn malformed_data_is_rejected() {
        let err = build_body(HttpMethod::Post, ContentType::Json, "{\"a\":", None).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedData { .. }));
    }

    #[test]
    fn json_body_is_reserialized_compactly() {
        let body = build_body(HttpMethod::Post, ContentType::Json, "{ \"a\" : 1,\n \"b\": \"x\" }", None).unwrap();
        assert_eq!(body, Some(RequestBody::Json(r#"{"a":1,"b":"x"}"#.to_string())));
    }

    #[test]
    fn scalar_json_is_a_valid_json_body() {
        let body = build_body(HttpMethod::Put, ContentType::Json, "42", None).unwrap();
        assert_eq!(body, Some(RequestBody::Json("42".to_string())));
    }

    #[test]
    fn multipart_body_holds_file_and_flattened_fields() {
        let photo = photo();
        let data = r#"{"title":"Sunset","rating":4,"tags":["sea","sky"],"draft":false}"#;
        let body = build_body(HttpMethod::Post, ContentType::TransportChosen, data, Some(&photo))
            .unwrap()
            .unwrap();
        let form = body.as_multipart().unwrap();
        let names: Vec<_> = form.parts().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["image", "title", "rating", "tags", "draft"]);
        assert_eq!(form.text_value("title"), Some("Sunset"));
        assert_eq!(form.text_value("rating"), Some("4"));
        assert_eq!(form.text_value("tags"), Some(r#"["sea","sky"]"#));
        assert_eq!(form.text_value("draft"), Some("false"));
    }

    fn multipart_names(data: &str) -> Vec<String> {
        let photo = photo();
        let body = build_body(HttpMethod::Post, ContentType::TransportChosen, data, Some(&photo))
            .unwrap()
            .unwrap();
        body.as_multipart()
            .unwrap()
            .parts()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    #[test]
    fn multipart_array_fields_are_keyed_by_index() {
        assert_eq!(multipart_names(r#"["sea",{"b":1}]"#), vec!["image", "0", "1"]);
        let photo = photo();
        let body = build_body(HttpMethod::Post, ContentType::TransportChosen, r#"["sea",{"b":1}]"#, Some(&photo))
            .unwrap()
            .unwrap();
        let form = body.as_multipart().unwrap();
        assert_eq!(form.text_value("0"), Some("sea"));
        assert_eq!(form.text_value("1"), Some(r#"{"b":1}"#));
    }

    #[test]
    fn multipart_scalar_sends_only_the_file() {
        for data in ["42", "true", "null", r#""caption""#] {
            assert_eq!(multipart_names(data), vec!["image"], "{data}");
        }
    }

    #[test]
    fn multipart_empty_object_sends_only_the_file() {
        assert_eq!(multipart_names("{}"), vec!["image"]);
    }

    #[test]
    fn scalar_data_with_file_builds_a_request() {
        let spec = RequestSpec::new(HttpMethod::Post, "/api/photos/")
            .with_data("42")
            .with_file(photo());
        let req = builder().build(&spec, &Credential::new()).unwrap().request;
        let form = req.body.as_ref().and_then(RequestBody::as_multipart).unwrap();
        assert_eq!(form.parts().len(), 1);
        assert!(form.part("image").is_some());
    }

    #[test]
    fn json_request_has_content_type_and_null_auth() {
        let spec = RequestSpec::new(HttpMethod::Post, "/api/items/").with_data(r#"{"a":1,"b":"x"}"#);
        let prepared = builder().build(&spec, &Credential::new()).unwrap();
        let req = prepared.request;
        assert_eq!(req.url, "http://localhost:8000/api/items/");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Authorization"), Some("null"));
        assert_eq!(req.body.as_ref().and_then(RequestBody::as_json), Some(r#"{"a":1,"b":"x"}"#));
        assert!(!prepared.captures_token);
    }

    #[test]
    fn file_request_leaves_content_type_to_transport() {
        let spec = RequestSpec::new(HttpMethod::Post, "/api/photos/")
            .with_data(r#"{"a":1}"#)
            .with_file(photo());
        let req = builder().build(&spec, &Credential::bearer("xyz")).unwrap().request;
        assert_eq!(req.header("Content-Type"), None);
        assert_eq!(req.header("Authorization"), Some("Bearer xyz"));
        let form = req.body.as_ref().and_then(RequestBody::as_multipart).unwrap();
        assert!(matches!(form.part("image"), Some(crate::multipart::Part::File { file, .. }) if file.filename == "photo.png"));
        assert_eq!(form.text_value("a"), Some("1"));
    }

    #[test]
    fn omit_policy_drops_anonymous_auth() {
        let spec = RequestSpec::new(HttpMethod::Get, "/api/photos/");
        let req = builder()
            .anonymous_auth(AnonymousAuth::Omit)
            .build(&spec, &Credential::new())
            .unwrap()
            .request;
        assert_eq!(req.header("Authorization"), None);
        assert!(req.body.is_none());
    }

    #[test]
    fn token_paths_are_flagged() {
        assert!(captures_token("/api/auth/token/"));
        assert!(!captures_token("/api/auth/token/refresh/"));
        assert!(!captures_token("/api/auth/token"));
        let spec = RequestSpec::new(HttpMethod::Post, "/api/auth/token/").with_data("{}");
        assert!(builder().build(&spec, &Credential::new()).unwrap().captures_token);
    }

    #[test]
    fn path_is_checked_before_data() {
        let spec = RequestSpec::new(HttpMethod::Post, "").with_data("{bad");
        assert_eq!(builder().build(&spec, &Credential::new()), Err(ValidationError::EmptyPath));
    }

    #[test]
    fn parse_response_renders_json() {
        let response = HttpResponse {
            status: 201,
            body: r#"{"id":5}"#.to_string(),
        };
        let (view, body) = builder().parse_response(&response).unwrap();
        assert_eq!(view.render(), "STATUS CODE: 201\n\n{\n    \"id\": 5\n}");
        assert_eq!(body["id"], 5);
    }

    #[test]
    fn parse_response_rejects_non_json() {
        let response = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let err = builder().parse_response(&response).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidResponse { status: 204, .. }));
    }
}
