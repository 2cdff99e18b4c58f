//! Source location shared by the crate's error types.

use derive_more::Display;

/// Where an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{}:{}", file, line)]
pub struct ErrorLocation {
    /// Source file.
    pub file: &'static str,
    /// Line number.
    pub line: u32,
}

impl ErrorLocation {
    /// Location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}
