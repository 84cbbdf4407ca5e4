//! `ureq`-backed `Transport`.
//!
//! Status codes are data here: the agent is built with
//! `http_status_as_error(false)` so 4xx/5xx replies reach the renderer.
//! No timeouts are configured; a silent backend blocks until it answers.

use reqtester_core::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, Part, RequestBody, Transport, TransportError};
use tracing::debug;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::unversioned::multipart;
use ureq::{Agent, RequestBuilder};

pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder().http_status_as_error(false).build().new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// ureq form borrowing the parts of `form`; ureq picks the boundary and
/// sets the matching `Content-Type`.
fn multipart_form(form: &MultipartForm) -> Result<multipart::Form<'_>, ureq::Error> {
    let mut out = multipart::Form::new();
    for part in form.parts() {
        out = match part {
            Part::Text { name, value } => out.text(name, value),
            Part::File { name, file } => {
                let mime = file.mime_type();
                let file_part = multipart::Part::bytes(&file.content)
                    .file_name(&file.filename)
                    .mime_str(mime.essence_str())?;
                out.part(name, file_part)
            }
        };
    }
    Ok(out)
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&RequestBody>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        None => builder.send_empty(),
        Some(RequestBody::Json(text)) => builder.send(text.as_bytes()),
        Some(RequestBody::Multipart(form)) => {
            debug!(parts = form.parts().len(), "sending multipart body");
            builder.send(multipart_form(form)?)
        }
    }
}

fn call(builder: RequestBuilder<WithoutBody>) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    builder.call()
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let headers = &request.headers;
        let body = request.body.as_ref();

        let mut response = match request.method {
            HttpMethod::Get => call(with_headers(self.agent.get(url), headers)),
            HttpMethod::Delete => call(with_headers(self.agent.delete(url), headers)),
            HttpMethod::Post => send(with_headers(self.agent.post(url), headers), body),
            HttpMethod::Put => send(with_headers(self.agent.put(url), headers), body),
            HttpMethod::Patch => send(with_headers(self.agent.patch(url), headers), body),
        }?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse { status, body })
    }
}
