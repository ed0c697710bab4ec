//! Error taxonomy for the ESIA client.
//!
//! Mirrors the layered structure of the EPGU client errors: the
//! operation that was invoked, the failure cause, and the ESIA error
//! code extracted from a callback query or a token-endpoint error
//! body. ESIA reports its codes as a `ESIA-NNNNNN` prefix of the
//! `error_description` field, not as a separate field.

use crate::signature::SignatureError;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for ESIA operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The operation a failure originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    AuthUri,
    ParseCallback,
    TokenExchange,
    TokenUpdate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AuthUri => "AuthUri",
            Self::ParseCallback => "ParseCallback",
            Self::TokenExchange => "TokenExchange",
            Self::TokenUpdate => "TokenUpdate",
        })
    }
}

/// Error returned by every ESIA operation.
#[derive(Debug, Error)]
#[error("{op} failed: {kind}")]
pub struct Error {
    op: Operation,
    #[source]
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(op: Operation, kind: ErrorKind) -> Self {
        Self { op, kind }
    }

    /// The operation that produced this error.
    pub fn operation(&self) -> Operation {
        self.op
    }

    /// The underlying failure.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The ESIA error code, when the failure carries one.
    pub fn esia_code(&self) -> Option<EsiaCode> {
        match &self.kind {
            ErrorKind::Denied { code, .. } => Some(*code),
            ErrorKind::Api(api) => api.code(),
            _ => None,
        }
    }
}

/// The failure cause behind an [`Error`].
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The callback query carried no `state` parameter.
    #[error("missing state parameter")]
    NoState,

    /// Request signing failed.
    #[error("failed to sign request: {0}")]
    Sign(#[source] SignatureError),

    /// A timestamp could not be rendered in the ESIA layout.
    #[error("failed to format timestamp: {0}")]
    Timestamp(String),

    /// A URI could not be assembled.
    #[error("invalid URI: {0}")]
    Uri(String),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    ResponseRead(#[source] reqwest::Error),

    /// A success response carried a body that is not the expected JSON.
    #[error("failed to decode JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    /// ESIA rejected the authorization request in the callback.
    #[error("{code}{annotations}")]
    Denied { code: EsiaCode, annotations: String },

    /// The token endpoint reported a failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Classified failure response from the ESIA token endpoint.
#[derive(Debug)]
pub struct ApiError {
    status: u16,
    body: BodyError,
}

impl ApiError {
    /// The raw HTTP status code.
    pub fn http_status(&self) -> u16 {
        self.status
    }

    /// The classified response body.
    pub fn body(&self) -> &BodyError {
        &self.body
    }

    /// The ESIA error code, if the body was a JSON error envelope.
    pub fn code(&self) -> Option<EsiaCode> {
        match &self.body {
            BodyError::Esia { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(reason) = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
        {
            write!(f, " {reason}")?;
        }
        write!(f, ": {}", self.body)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.body)
    }
}

/// Classification of a failure response body from the token endpoint.
#[derive(Debug, Error)]
pub enum BodyError {
    /// JSON error envelope with an `ESIA-NNNNNN` description prefix.
    #[error("{code}{annotations}")]
    Esia { code: EsiaCode, annotations: String },

    /// Raw `text/plain` (or untyped) body, newlines escaped.
    #[error("{0}")]
    Text(String),

    /// A JSON-typed body that does not parse as JSON.
    #[error("malformed JSON error body: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// A content type this client does not understand.
    #[error("unexpected content type: '{0}'")]
    UnexpectedContentType(String),
}

/// Error response from ESIA, in a callback query or a token-endpoint
/// error body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub state: String,
}

impl ErrorResponse {
    pub(crate) fn annotations(&self) -> String {
        format!(
            " [error='{}', error_description='{}', state='{}']",
            self.error, self.error_description, self.state
        )
    }
}

/// ESIA error code, recognized by the `ESIA-NNNNNN` prefix of the
/// `error_description` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EsiaCode {
    E036700,
    E036701,
    E036702,
    E036703,
    E036704,
    E036705,
    E036706,
    E036707,
    E036716,
    E036726,
    E036727,
    E007002,
    E007003,
    E007004,
    E007005,
    E007006,
    E007007,
    E007008,
    E007009,
    E007011,
    E007012,
    E007013,
    E007014,
    E007015,
    E007019,
    E007023,
    E007038,
    E007039,
    E007040,
    E007046,
    E007053,
    E007055,
    E007060,
    E007061,
    E007062,
    E007194,
    E008010,
    /// A description this version does not recognize.
    Unknown,
}

impl EsiaCode {
    /// Recognize a code by the prefix of an `error_description` value.
    pub fn from_description(description: &str) -> Self {
        let Some(code) = description.strip_prefix("ESIA-").and_then(|rest| rest.get(..6)) else {
            return Self::Unknown;
        };
        match code {
            "036700" => Self::E036700,
            "036701" => Self::E036701,
            "036702" => Self::E036702,
            "036703" => Self::E036703,
            "036704" => Self::E036704,
            "036705" => Self::E036705,
            "036706" => Self::E036706,
            "036707" => Self::E036707,
            "036716" => Self::E036716,
            "036726" => Self::E036726,
            "036727" => Self::E036727,
            "007002" => Self::E007002,
            "007003" => Self::E007003,
            "007004" => Self::E007004,
            "007005" => Self::E007005,
            "007006" => Self::E007006,
            "007007" => Self::E007007,
            "007008" => Self::E007008,
            "007009" => Self::E007009,
            "007011" => Self::E007011,
            "007012" => Self::E007012,
            "007013" => Self::E007013,
            "007014" => Self::E007014,
            "007015" => Self::E007015,
            "007019" => Self::E007019,
            "007023" => Self::E007023,
            "007038" => Self::E007038,
            "007039" => Self::E007039,
            "007040" => Self::E007040,
            "007046" => Self::E007046,
            "007053" => Self::E007053,
            "007055" => Self::E007055,
            "007060" => Self::E007060,
            "007061" => Self::E007061,
            "007062" => Self::E007062,
            "007194" => Self::E007194,
            "008010" => Self::E008010,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for EsiaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::E036700 => "ESIA-036700: consent type mnemonic not specified",
            Self::E036701 => "ESIA-036701: consent type not found",
            Self::E036702 => "ESIA-036702: mandatory scope for the consent type not specified",
            Self::E036703 => "ESIA-036703: scopes exceed those allowed for the consent type",
            Self::E036704 => "ESIA-036704: scopes must not be specified for the consent type",
            Self::E036705 => "ESIA-036705: at least one action must be specified",
            Self::E036706 => "ESIA-036706: the specified action does not exist",
            Self::E036707 => "ESIA-036707: at least one purpose must be specified",
            Self::E036716 => "ESIA-036716: invalid consent expiration time",
            Self::E036726 => "ESIA-036726: the specified purpose does not exist",
            Self::E036727 => "ESIA-036727: exactly one consent purpose must be specified",
            Self::E007002 => {
                "ESIA-007002: certificate does not match the system mnemonic, \
                 or no certificate is registered for the system"
            }
            Self::E007003 => {
                "ESIA-007003: the request is missing a mandatory parameter, includes an \
                 invalid parameter value or includes a parameter more than once"
            }
            Self::E007004 => {
                "ESIA-007004: the resource owner or authorization service denied the request"
            }
            Self::E007005 => {
                "ESIA-007005: the client system is not allowed to request an access \
                 token with this method"
            }
            Self::E007006 => {
                "ESIA-007006: the requested scope is invalid, unknown or malformed"
            }
            Self::E007007 => {
                "ESIA-007007: an unexpected authorization service error prevented the request"
            }
            Self::E007008 => {
                "ESIA-007008: the authorization service is temporarily unable to handle \
                 the request due to load or maintenance"
            }
            Self::E007009 => {
                "ESIA-007009: the authorization service does not support obtaining an \
                 access token with this method"
            }
            Self::E007011 => {
                "ESIA-007011: the authorization code or refresh token is invalid, \
                 expired, revoked, does not match the redirect URI, or was issued to \
                 another client"
            }
            Self::E007012 => {
                "ESIA-007012: the authorization code type is not supported"
            }
            Self::E007013 => "ESIA-007013: the request does not specify a scope",
            Self::E007014 => "ESIA-007014: the request does not contain a mandatory parameter",
            Self::E007015 => "ESIA-007015: invalid request time",
            Self::E007019 => "ESIA-007019: access permission is missing",
            Self::E007023 => {
                "ESIA-007023: the redirect_uri is not among those allowed for the system"
            }
            Self::E007038 => "ESIA-007038: failed to read parameters from the request",
            Self::E007039 => {
                "ESIA-007039: the initial /v2/ac request did not specify code_challenge"
            }
            Self::E007040 => {
                "ESIA-007040: source and control values do not match"
            }
            Self::E007046 => {
                "ESIA-007046: the scope requires two-factor authorization that is \
                 unavailable to the user"
            }
            Self::E007053 => {
                "ESIA-007053: client_secret is malformed, does not match the \
                 certificate or system, or the certificate is inactive"
            }
            Self::E007055 => "ESIA-007055: signing in with an unconfirmed account",
            Self::E007060 => "ESIA-007060: invalid roles parameter value",
            Self::E007061 => "ESIA-007061: invalid obj_type parameter value",
            Self::E007062 => "ESIA-007062: invalid user type or role in the request",
            Self::E007194 => {
                "ESIA-007194: scope requested for an organization the user is not \
                 an employee of"
            }
            Self::E008010 => "ESIA-008010: failed to authenticate the client system",
            Self::Unknown => "unknown ESIA error",
        })
    }
}

/// Classify a failed token-endpoint response.
pub(crate) fn classify(
    status: reqwest::StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> ApiError {
    let body = match content_type {
        Some(ct) if ct.starts_with("application/json") => classify_json(body),
        Some(ct) if ct.starts_with("text/plain") => {
            BodyError::Text(String::from_utf8_lossy(body).replace('\n', "\\n"))
        }
        None => BodyError::Text(String::from_utf8_lossy(body).replace('\n', "\\n")),
        Some(ct) => BodyError::UnexpectedContentType(ct.to_string()),
    };
    ApiError {
        status: status.as_u16(),
        body,
    }
}

fn classify_json(body: &[u8]) -> BodyError {
    let envelope: ErrorResponse = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(err) => return BodyError::MalformedJson(err),
    };
    BodyError::Esia {
        code: EsiaCode::from_description(&envelope.error_description),
        annotations: envelope.annotations(),
    }
}
