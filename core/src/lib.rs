//! Request builder and dispatcher behind the `reqtester` form.
//!
//! # Overview
//! Turns a form snapshot (method, path, JSON text, optional file) into an
//! `HttpRequest` for a fixed scheme and host, hands it to a `Transport`,
//! and renders the reply as `STATUS CODE: <n>` plus pretty JSON. Replies
//! from paths ending in `token/` update a single bearer-token slot that is
//! sent on every later request.
//!
//! # Design
//! - `RequestBuilder` is stateless and does no I/O (host-does-IO pattern);
//!   the network lives behind the `Transport` trait.
//! - The credential slot is an explicit `Session` value owned by the
//!   `Dispatcher`, not a global.
//! - Input problems come back as `ValidationError` values naming the form
//!   field they belong to.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod http;
pub mod multipart;
pub mod render;
pub mod session;

pub use client::{build_body, captures_token, determine_content_type, ContentType, PreparedRequest, RequestBuilder};
pub use dispatch::{Dispatcher, Transport};
pub use error::{DispatchError, FormField, TransportError, ValidationError};
pub use form::{file_label, FileBlob, RequestSpec, EMPTY_FILE_LABEL};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use multipart::{MultipartForm, Part};
pub use render::ResponseView;
pub use session::{AnonymousAuth, Credential, Session};
