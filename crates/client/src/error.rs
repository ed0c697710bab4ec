//! Error taxonomy and response classification.
//!
//! A failed operation produces a chain of up to three layers: the
//! operation that was invoked, the failure cause, and (when the API
//! answered) the HTTP status category plus the classification of the
//! error body. The API overloads `204 No Content` to mean "order not
//! found", so 204 is classified as a failure alongside the `>= 400`
//! statuses.

use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The operation a failure originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    OrderCreate,
    OrderPush,
    OrderPushChunked,
    OrderInfo,
    OrderCancel,
    AttachmentDownload,
    Dict,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OrderCreate => "OrderCreate",
            Self::OrderPush => "OrderPush",
            Self::OrderPushChunked => "OrderPushChunked",
            Self::OrderInfo => "OrderInfo",
            Self::OrderCancel => "OrderCancel",
            Self::AttachmentDownload => "AttachmentDownload",
            Self::Dict => "Dict",
        })
    }
}

/// Error returned by every client operation.
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

    /// HTTP status category of a classified API response, if any.
    pub fn status(&self) -> Option<StatusCategory> {
        match &self.kind {
            ErrorKind::Api(api) => Some(api.category()),
            _ => None,
        }
    }

    /// Business error code of a classified API response, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match &self.kind {
            ErrorKind::Api(api) => api.code(),
            _ => None,
        }
    }
}

/// The failure cause behind an [`Error`].
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The archive was missing or empty; checked before any network I/O.
    #[error("no archive data to upload")]
    EmptyArchive,

    /// A multipart body could not be assembled. The partial buffer is
    /// discarded, never sent.
    #[error("failed to prepare multipart body: {0}")]
    Multipart(#[source] std::io::Error),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    ResponseRead(#[source] reqwest::Error),

    /// A success response carried a body that is not the expected JSON.
    #[error("failed to decode JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The API reported a failure; see the classified response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response did not echo a usable order id.
    #[error("no valid order id in response")]
    MissingOrderId,

    /// A success response echoed an order id that does not match the
    /// request. A protocol violation, distinct from transport errors.
    #[error("wrong order id in response: expected {expected}, got {actual}")]
    WrongOrderId { expected: u64, actual: u64 },

    /// An attachment link did not match the documented pattern.
    #[error("invalid file link: '{0}'")]
    InvalidFileLink(String),
}

/// HTTP status category of a failed API response.
///
/// Fixed enumeration from the API error appendix. `204 No Content` is
/// overloaded by the API to mean "order not found" on info endpoints
/// and is classified here rather than treated as success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCategory {
    /// HTTP 204
    OrderNotFound,
    /// HTTP 400
    BadRequest,
    /// HTTP 401
    Unauthorized,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    UrlNotFound,
    /// HTTP 409
    UnableToHandleRequest,
    /// HTTP 429
    TooManyRequests,
    /// HTTP 500
    Internal,
    /// HTTP 502
    BadGateway,
    /// HTTP 503
    ServiceUnavailable,
    /// HTTP 504
    GatewayTimeout,
    /// Any other error status.
    Unexpected,
}

impl StatusCategory {
    /// Classify a status code. Only meaningful for failure statuses.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            204 => Self::OrderNotFound,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::UrlNotFound,
            409 => Self::UnableToHandleRequest,
            429 => Self::TooManyRequests,
            500 => Self::Internal,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => Self::Unexpected,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OrderNotFound => "order not found",
            Self::BadRequest => "invalid parameters",
            Self::Unauthorized => "access denied",
            Self::Forbidden => "access forbidden",
            Self::UrlNotFound => "request URL not found",
            Self::UnableToHandleRequest => "unable to handle request",
            Self::TooManyRequests => "too many requests",
            Self::Internal => "internal error",
            Self::BadGateway => "bad gateway",
            Self::ServiceUnavailable => "service unavailable",
            Self::GatewayTimeout => "gateway timeout",
            Self::Unexpected => "unexpected HTTP status",
        })
    }
}

/// Business error code from the API's JSON error envelope.
///
/// Closed enumeration of the documented codes, plus sentinels for an
/// empty code and for codes this version does not know about (the API
/// may introduce new ones).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    AccessDeniedPersonPermissions,
    AccessDeniedService,
    AccessDeniedSystem,
    AccessDeniedUser,
    AccessDeniedUserLegal,
    BadDelegation,
    BadRequest,
    CancelNotAllowed,
    ConfigDelegation,
    InternalError,
    LimitationException,
    NotFound,
    OrderAccess,
    PushDenied,
    ServiceNotFound,
    /// The error body carried no code.
    NotSpecified,
    /// The error body carried a code this version does not know about.
    Unexpected,
}

impl ErrorCode {
    /// Map a wire code onto the enumeration.
    pub fn from_code(code: &str) -> Self {
        match code {
            "access_denied_person_permissions" => Self::AccessDeniedPersonPermissions,
            "access_denied_service" => Self::AccessDeniedService,
            "access_denied_system" => Self::AccessDeniedSystem,
            "access_denied_user" => Self::AccessDeniedUser,
            "access_denied_user_legal" => Self::AccessDeniedUserLegal,
            "bad_delegation" => Self::BadDelegation,
            "bad_request" => Self::BadRequest,
            "cancel_not_allowed" => Self::CancelNotAllowed,
            "config_delegation" => Self::ConfigDelegation,
            "internal_error" => Self::InternalError,
            "limitation_exception" => Self::LimitationException,
            "not_found" => Self::NotFound,
            "order_access" => Self::OrderAccess,
            "push_denied" => Self::PushDenied,
            "service_not_found" => Self::ServiceNotFound,
            "" => Self::NotSpecified,
            _ => Self::Unexpected,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AccessDeniedPersonPermissions => {
                "the user has not granted your system consent for this operation"
            }
            Self::AccessDeniedService => {
                "the system is not allowed to access the requested service"
            }
            Self::AccessDeniedSystem => "access is denied for the requesting system",
            Self::AccessDeniedUser => "access is denied for this user type",
            Self::AccessDeniedUserLegal => {
                "the token was issued for an organization that does not own the requesting system"
            }
            Self::BadDelegation => "missing the authority required to create the application",
            Self::BadRequest => "invalid request parameters",
            Self::CancelNotAllowed => "the application cannot be cancelled in its current status",
            Self::ConfigDelegation => "no delegation authority exists for the requested service",
            Self::InternalError => "internal error while processing the application",
            Self::LimitationException => "the request exceeds the established limits",
            Self::NotFound => "application not found",
            Self::OrderAccess => "the user has no rights to work with this application",
            Self::PushDenied => "no rights to submit the application",
            Self::ServiceNotFound => "no service matches the serviceCode in the request",
            Self::NotSpecified => "error code not specified",
            Self::Unexpected => "unexpected error code",
        })
    }
}

/// Classified failure response from the API.
///
/// Composes the HTTP status category with the classification of the
/// response body. The body is `None` for the bare `204 No Content`
/// case and for empty untyped bodies.
#[derive(Debug)]
pub struct ApiError {
    status: u16,
    category: StatusCategory,
    body: Option<BodyError>,
}

impl ApiError {
    /// The raw HTTP status code.
    pub fn http_status(&self) -> u16 {
        self.status
    }

    /// The HTTP status category.
    pub fn category(&self) -> StatusCategory {
        self.category
    }

    /// The classified response body, if one was present.
    pub fn body(&self) -> Option<&BodyError> {
        self.body.as_ref()
    }

    /// The business error code, if the body was a JSON error envelope.
    pub fn code(&self) -> Option<ErrorCode> {
        match &self.body {
            Some(BodyError::Code { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(reason) = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
        {
            write!(f, " {reason}")?;
        }
        write!(f, ": {}", self.category)?;
        if let Some(body) = &self.body {
            write!(f, ": {body}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.body.as_ref().map(|body| body as _)
    }
}

/// Classification of a failure response body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// JSON error envelope; the code is mapped through [`ErrorCode`]
    /// and the present fields are rendered as a bracketed annotation.
    #[error("{code}{annotations}")]
    Code { code: ErrorCode, annotations: String },

    /// Raw `text/plain` (or untyped) body, newlines escaped.
    #[error("{0}")]
    Text(String),

    /// A JSON-typed body that does not parse as JSON.
    #[error("malformed JSON error body: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// A content type this client does not understand; the body is not
    /// parsed.
    #[error("unexpected content type: '{0}'")]
    UnexpectedContentType(String),
}

/// Error envelope of a failed API response.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: String,
}

/// Classify a failed response into its layered error value.
///
/// Pure over its inputs: the same `(status, content type, body)` triple
/// always classifies to the same categories.
pub(crate) fn classify(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> ApiError {
    let category = StatusCategory::from_status(status);
    if status == StatusCode::NO_CONTENT {
        return ApiError {
            status: status.as_u16(),
            category,
            body: None,
        };
    }

    let body = match content_type {
        Some(ct) if ct.starts_with("application/json") => Some(classify_json(body)),
        Some(ct) if ct.starts_with("text/plain") => text_body(body),
        None => text_body(body),
        Some(ct) => Some(BodyError::UnexpectedContentType(ct.to_string())),
    };

    ApiError {
        status: status.as_u16(),
        category,
        body,
    }
}

fn text_body(body: &[u8]) -> Option<BodyError> {
    if body.is_empty() {
        return None;
    }
    Some(BodyError::Text(
        String::from_utf8_lossy(body).replace('\n', "\\n"),
    ))
}

fn classify_json(body: &[u8]) -> BodyError {
    let envelope: ErrorEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(err) => return BodyError::MalformedJson(err),
    };

    let code = ErrorCode::from_code(&envelope.code);

    let mut fields = Vec::new();
    if !envelope.code.is_empty() {
        fields.push(format!("code='{}'", envelope.code));
    }
    if !envelope.message.is_empty() {
        fields.push(format!("message='{}'", envelope.message));
    }
    if !envelope.error.is_empty() {
        fields.push(format!("error='{}'", envelope.error));
    }
    let annotations = if fields.is_empty() {
        String::new()
    } else {
        format!(" [{}]", fields.join(", "))
    };

    BodyError::Code { code, annotations }
}
