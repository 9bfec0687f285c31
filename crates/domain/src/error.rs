/// Shared error type used across all bridge crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The exchange could not complete (DNS, refused connection, closed pool).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The configured timeout elapsed before the backend answered.
    #[error("Connection timed out: {0}")]
    Timeout(String),

    /// The backend rejected the call (protocol-level or soft error).
    #[error("Odoo error: {0}")]
    Application(String),

    /// The reply carried neither `result` nor `error`, or was not JSON.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// Any of the above, tagged with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Tag this error with the operation token that produced it.
    ///
    /// Re-tagging an already tagged error replaces the outer tag.
    pub fn tagged(self, operation: &'static str) -> Self {
        match self {
            Error::Operation { source, .. } => Error::Operation { operation, source },
            other => Error::Operation {
                operation,
                source: Box::new(other),
            },
        }
    }

    /// The error without its operation tag.
    pub fn untagged(&self) -> &Error {
        match self {
            Error::Operation { source, .. } => source.untagged(),
            other => other,
        }
    }

    /// The operation token, if the error was tagged.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Error::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Network or infrastructure failure (as opposed to a backend rejection).
    pub fn is_transport(&self) -> bool {
        matches!(
            self.untagged(),
            Error::HttpStatus { .. } | Error::Connection(_) | Error::Timeout(_)
        )
    }

    pub fn is_application(&self) -> bool {
        matches!(self.untagged(), Error::Application(_))
    }

    pub fn is_malformed_reply(&self) -> bool {
        matches!(self.untagged(), Error::MalformedReply(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagging_keeps_the_inner_message() {
        let err = Error::Application("boom".into()).tagged("search");
        assert_eq!(err.operation(), Some("search"));
        assert_eq!(err.to_string(), "search: Odoo error: boom");
        assert_eq!(err.untagged().to_string(), "Odoo error: boom");
    }

    #[test]
    fn retagging_replaces_the_outer_tag() {
        let err = Error::Timeout("slow".into()).tagged("read").tagged("get_record");
        assert_eq!(err.operation(), Some("get_record"));
        assert!(matches!(err.untagged(), Error::Timeout(_)));
    }

    #[test]
    fn classification_sees_through_tags() {
        let http = Error::HttpStatus {
            status: 502,
            body: "bad gateway".into(),
        }
        .tagged("count");
        assert!(http.is_transport());
        assert!(!http.is_application());

        let malformed = Error::MalformedReply("empty".into()).tagged("models");
        assert!(malformed.is_malformed_reply());
        assert!(!malformed.is_transport());
    }
}
