/// Process exit codes for `reqtester send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// A response was received and rendered, whatever its status.
    Success = 0,
    /// The request could not be sent or its reply was not JSON.
    RequestFailed = 1,
    /// The form was rejected before anything was sent.
    InvalidInput = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
