//! One form submission, end to end.
//!
//! # Design
//! `Transport` is the only seam that touches the network. `Dispatcher`
//! owns the builder, a transport and the session, and runs the linear
//! flow: build, send, parse, render, capture token. `dispatch` takes
//! `&mut self`, so a dispatcher never has two requests in flight and the
//! credential slot is only ever written in request order.

use tracing::{info, warn};

use crate::client::RequestBuilder;
use crate::error::{DispatchError, TransportError};
use crate::form::RequestSpec;
use crate::http::{HttpRequest, HttpResponse};
use crate::render::ResponseView;
use crate::session::Session;

/// Executes an `HttpRequest` and returns the full response.
///
/// Non-2xx statuses are responses, not errors.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

pub struct Dispatcher<T> {
    builder: RequestBuilder,
    transport: T,
    session: Session,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(builder: RequestBuilder, transport: T) -> Self {
        Self::with_session(builder, transport, Session::new())
    }

    pub fn with_session(builder: RequestBuilder, transport: T, session: Session) -> Self {
        Self {
            builder,
            transport,
            session,
        }
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Validate, send, and render one request.
    ///
    /// Validation failures return before the transport is called. The
    /// credential is only updated after a JSON reply from a token path.
    pub fn dispatch(&mut self, spec: &RequestSpec) -> Result<ResponseView, DispatchError> {
        let prepared = self.builder.build(spec, self.session.credential()).inspect_err(|e| {
            warn!(field = e.field().as_str(), "request rejected: {e}");
        })?;

        let response = self
            .transport
            .execute(&prepared.request)
            .map_err(DispatchError::Transport)?;
        info!(method = %prepared.request.method, url = %prepared.request.url, status = response.status, "response received");

        let (view, body) = self.builder.parse_response(&response)?;
        if prepared.captures_token && self.session.capture_token(&body) {
            info!("stored bearer token");
        }
        Ok(view)
    }
}
