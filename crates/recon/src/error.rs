use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Feed payload has a shape none of the known layouts accept.
    UnexpectedShape { source: String, detail: String },
    /// Cross-reference export could not be decoded by any parser strategy.
    ReferenceFormat(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedShape { source, detail } => {
                write!(f, "unexpected {source} payload: {detail}")
            }
            Self::ReferenceFormat(msg) => write!(f, "unable to parse reference export: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
