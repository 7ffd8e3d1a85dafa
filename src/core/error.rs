use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value cannot be encoded into a term (wrong type, out of u64 domain).
    Encoding,
    /// Query names an index the collection does not define.
    UnknownIndex,
    /// Operator is not valid for the index's mapping kind.
    InvalidOperator,
    InvalidQuery,
    Schema,
    Parse,
    Crypto,
    Analysis,
    InvalidArgument,
    InvalidState,
}

#[derive(Debug, Clone, ThisError)]
#[error("{kind:?}: {context}")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn encoding(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Encoding, context)
    }

    pub fn schema(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Schema, context)
    }

    pub fn crypto(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Crypto, context)
    }

    pub fn unknown_index(collection: &str, index: &str) -> Self {
        Error::new(
            ErrorKind::UnknownIndex,
            format!("collection '{}' has no index named '{}'", collection, index),
        )
    }

    pub fn invalid_operator(collection: &str, index: &str, operator: &str, kind: &str) -> Self {
        Error::new(
            ErrorKind::InvalidOperator,
            format!(
                "operator '{}' is not supported by {} index '{}' of collection '{}'",
                operator, kind, index, collection
            ),
        )
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: format!("hex decode failed: {}", err),
        }
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: format!("invalid id: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
