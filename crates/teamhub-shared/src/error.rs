use thiserror::Error;

/// A stored or received enum value that this client does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unexpected binary frame ({0} bytes)")]
    Binary(usize),
}
