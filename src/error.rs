//! Error types for binpack encoding and decoding.

/// Errors that can occur while encoding or decoding a binpack stream.
#[derive(Debug, thiserror::Error)]
pub enum BinpackError {
    #[error("unsupported value: {0}")]
    UnsupportedValueKind(String),

    #[error("cannot encode absent value: {0}")]
    NilReference(String),

    #[error("sink write failed: {0}")]
    SinkWrite(#[source] std::io::Error),

    #[error("end of input")]
    EndOfInput,

    #[error("truncated input: {0}")]
    TruncatedInput(String),

    #[error("invalid tag byte: 0x{0:02X}")]
    InvalidTag(u8),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("integer overflow: {0}")]
    IntegerOverflow(String),

    #[error("non-canonical encoding: {0}")]
    NonCanonical(String),

    #[error("invalid UTF-8 string: {0}")]
    InvalidStringEncoding(#[from] std::string::FromUtf8Error),

    #[error("value binding error: {0}")]
    Binding(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BinpackError {
    /// Wraps any displayable error as a value-binding error.
    pub fn binding(e: impl std::fmt::Display) -> Self {
        Self::Binding(e.to_string())
    }

    /// Returns `true` for the benign end-of-stream signal.
    ///
    /// Callers reading a sequence of values loop until this is returned.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }
}
