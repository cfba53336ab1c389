use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Broad class of a store failure, derived from transport state, HTTP
/// status and the Postgres / PostgREST error code. Never from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint unreachable, timed out, or credential rejected.
    Connection,
    /// The queried relation does not exist.
    TableAbsent,
    /// A DDL statement tried to create an object that is already there.
    AlreadyExists,
    /// A row violated a column type, enum or constraint.
    Constraint,
    /// The SQL function used for DDL is not installed.
    MissingFunction,
    Other,
}

/// Error body returned by the REST layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<serde_json::Value>,
    hint: Option<String>,
}

impl ApiError {
    /// Builds an error from a non-success response. Bodies that are not the
    /// usual JSON shape are kept verbatim as the message.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self {
                status,
                code: parsed.code,
                message: parsed.message.unwrap_or_default(),
                details: parsed.details.and_then(|value| match value {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(text) => Some(text),
                    other => Some(other.to_string()),
                }),
                hint: parsed.hint,
            },
            Err(_) => Self {
                status,
                message: body.trim().to_string(),
                ..Self::default()
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        if matches!(self.status, 401 | 403) {
            return ErrorKind::Connection;
        }

        match self.code.as_deref() {
            Some("PGRST301" | "PGRST302") => ErrorKind::Connection,
            // undefined_table / relation missing from schema cache
            Some("42P01" | "PGRST205") => ErrorKind::TableAbsent,
            // duplicate_table / duplicate_object
            Some("42P07" | "42710") => ErrorKind::AlreadyExists,
            // invalid_text_representation, not_null, unique, check, string too long
            Some("22P02" | "23502" | "23505" | "23514" | "22001") => ErrorKind::Constraint,
            // undefined_function / function missing from schema cache
            Some("42883" | "PGRST202") => ErrorKind::MissingFunction,
            _ => ErrorKind::Other,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot reach {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("credential rejected: {0}")]
    Unauthorized(ApiError),

    #[error("{0}")]
    Api(ApiError),

    /// A bodiless 404 on a table URL, as answered to HEAD requests.
    #[error("relation {0:?} does not exist")]
    RelationAbsent(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn from_response(status: u16, body: &str) -> Self {
        let error = ApiError::from_body(status, body);
        if error.kind() == ErrorKind::Connection {
            Self::Unauthorized(error)
        } else {
            Self::Api(error)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_)
            | Self::Unreachable { .. }
            | Self::Timeout(_)
            | Self::Unauthorized(_) => ErrorKind::Connection,
            Self::Api(error) => error.kind(),
            Self::RelationAbsent(_) => ErrorKind::TableAbsent,
            Self::Decode(_) => ErrorKind::Other,
        }
    }

    pub fn is_table_absent(&self) -> bool {
        self.kind() == ErrorKind::TableAbsent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_code_not_message() {
        // Message mentions a missing relation but the code says otherwise.
        let body = r#"{"code":"22P02","message":"relation \"events\" does not exist","details":null,"hint":null}"#;
        let error = StoreError::from_response(400, body);
        assert_eq!(error.kind(), ErrorKind::Constraint);
        assert!(!error.is_table_absent());
    }

    #[test]
    fn missing_table_codes() {
        for code in ["42P01", "PGRST205"] {
            let body = format!(r#"{{"code":"{}","message":"whatever"}}"#, code);
            assert!(StoreError::from_response(404, &body).is_table_absent());
        }
    }

    #[test]
    fn bodiless_not_found_is_table_absent() {
        let error = StoreError::RelationAbsent("events".into());
        assert!(error.is_table_absent());
        assert_eq!(error.to_string(), "relation \"events\" does not exist");
    }

    #[test]
    fn rejected_key_is_connection_class() {
        let error = StoreError::from_response(401, r#"{"message":"Invalid API key"}"#);
        assert!(matches!(error, StoreError::Unauthorized(_)));
        assert_eq!(error.kind(), ErrorKind::Connection);

        let jwt = StoreError::from_response(400, r#"{"code":"PGRST301","message":"JWT invalid"}"#);
        assert_eq!(jwt.kind(), ErrorKind::Connection);
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let error = ApiError::from_body(502, "Bad Gateway\n");
        assert_eq!(error.message, "Bad Gateway");
        assert_eq!(error.code, None);
        assert_eq!(error.kind(), ErrorKind::Other);
        assert_eq!(error.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn duplicate_and_missing_function_codes() {
        let dup = ApiError::from_body(400, r#"{"code":"42P07","message":"relation \"events\" already exists"}"#);
        assert_eq!(dup.kind(), ErrorKind::AlreadyExists);

        let missing = ApiError::from_body(404, r#"{"code":"PGRST202","message":"Could not find the function"}"#);
        assert_eq!(missing.kind(), ErrorKind::MissingFunction);
    }
}
