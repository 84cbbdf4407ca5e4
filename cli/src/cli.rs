use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqtester_core::{AnonymousAuth, HttpMethod, RequestBuilder};

#[derive(Parser, Debug)]
#[command(name = "reqtester")]
#[command(about = "Send JSON or multipart requests to a backend and print the status and JSON reply", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Verbosity level (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where requests go, read once at startup.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// URL scheme of the backend
    #[arg(long, env = "REQTESTER_SCHEME", default_value = "http", global = true)]
    pub scheme: String,

    /// Host (and port) of the backend
    #[arg(long, env = "REQTESTER_HOST", default_value = "localhost:8000", global = true)]
    pub host: String,

    /// Authorization header sent before a token is captured: `null` or `omit`
    #[arg(long, value_name = "POLICY", env = "REQTESTER_ANONYMOUS_AUTH", default_value_t = AnonymousAuth::Null, global = true)]
    pub anonymous_auth: AnonymousAuth,
}

impl TargetArgs {
    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(&self.scheme, &self.host).anonymous_auth(self.anonymous_auth)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single request and print the reply
    Send(SendArgs),

    /// Fill in the form interactively; the token is kept between requests (default)
    Form,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// HTTP method (GET, POST, PUT, PATCH or DELETE)
    #[arg(short = 'X', long = "method", default_value = "GET")]
    pub method: HttpMethod,

    /// API path appended to scheme and host, e.g. /api/photos/
    #[arg(value_name = "PATH", default_value = "")]
    pub path: String,

    /// JSON data for POST, PUT and PATCH
    #[arg(short = 'd', long = "data", value_name = "JSON", default_value = "")]
    pub data: String,

    /// File to upload as the `image` field
    #[arg(short = 'F', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,
}
