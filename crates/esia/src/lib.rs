//! ESIA OAuth2-like consent and token exchange for EPGU consumers.
//!
//! Builds signed authorization links, parses the authorization
//! callback, and exchanges authorization codes for the bearer tokens
//! consumed by the EPGU API client. Request signing is pluggable
//! through [`SignatureProvider`].

mod client;
mod error;
mod permissions;
mod signature;

pub use client::{AUTH_CODE_ENDPOINT, Client, TOKEN_ENDPOINT, TokenResponse, parse_callback};
pub use error::{ApiError, BodyError, Error, ErrorKind, EsiaCode, Operation, Result};
pub use permissions::{Permission, Permissions, Sysname};
pub use signature::{CryptoProProvider, NopProvider, SignatureError, SignatureProvider};
