//! Exit codes for the CLI tool.

use arcfs::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 1;
/// Member or hint anchor not found
pub const NOT_FOUND: i32 = 2;
/// Path is not a supported container
pub const NOT_AN_ARCHIVE: i32 = 3;
/// Member exceeds the size limit
pub const LIMIT_EXCEEDED: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    NotFound,
    NotAnArchive,
    LimitExceeded,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::NotFound => NOT_FOUND,
            Self::NotAnArchive => NOT_AN_ARCHIVE,
            Self::LimitExceeded => LIMIT_EXCEEDED,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts an arcfs error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::NotFound { .. } | Error::HintNotFound { .. } => ExitCode::NotFound,
        Error::NotAnArchive { .. } => ExitCode::NotAnArchive,
        Error::ResourceLimitExceeded(_) => ExitCode::LimitExceeded,
        Error::InvalidUrl(_) => ExitCode::BadArgs,
        Error::Unsupported { .. } => ExitCode::FatalError,
        e if e.is_io() => ExitCode::IoError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
