//! OAuth2-like client for requesting user consent and access tokens.

use crate::error::{Error, ErrorKind, Operation, Result, classify};
use crate::permissions::Permissions;
use crate::signature::SignatureProvider;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use uuid::Uuid;

/// Consent page URI where the user grants the requested permissions.
pub const AUTH_CODE_ENDPOINT: &str = "/aas/oauth2/v2/ac";

/// Endpoint exchanging an authorization code for an access token.
pub const TOKEN_ENDPOINT: &str = "/aas/oauth2/v3/te";

// `2023.12.13 14:23:02 +0300`
const TS_LAYOUT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year].[month].[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);

/// Successful token response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// OAuth2 client for the ESIA consent and token exchange flow of
/// individual service recipients.
pub struct Client<P> {
    http: reqwest::Client,
    base_uri: String,
    client_id: String,
    signer: P,
}

impl<P: SignatureProvider> Client<P> {
    /// Create a client for the given ESIA base URI, consuming-system
    /// mnemonic and signature provider.
    pub fn new(base_uri: impl Into<String>, client_id: impl Into<String>, signer: P) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_uri: base_uri.into(),
            client_id: client_id.into(),
            signer,
        }
    }

    /// Replace the HTTP client, e.g. to configure timeouts or proxies.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Build the signed authorization link the user opens to grant the
    /// requested permissions. `scope` must include `openid`.
    pub fn auth_uri(
        &self,
        scope: &str,
        redirect_uri: &str,
        permissions: &Permissions,
    ) -> Result<String> {
        self.auth_uri_at(
            scope,
            redirect_uri,
            permissions,
            Uuid::new_v4(),
            OffsetDateTime::now_utc(),
        )
    }

    /// Like [`Client::auth_uri`], with the `state` value and timestamp
    /// supplied by the caller.
    pub fn auth_uri_at(
        &self,
        scope: &str,
        redirect_uri: &str,
        permissions: &Permissions,
        state: Uuid,
        now: OffsetDateTime,
    ) -> Result<String> {
        let op = Operation::AuthUri;
        match self.auth_uri_inner(scope, redirect_uri, permissions, state, now) {
            Ok(uri) => Ok(uri),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    fn auth_uri_inner(
        &self,
        scope: &str,
        redirect_uri: &str,
        permissions: &Permissions,
        state: Uuid,
        now: OffsetDateTime,
    ) -> std::result::Result<String, ErrorKind> {
        let timestamp = format_timestamp(now)?;
        let state = state.to_string();
        let client_secret =
            self.sign(&[&self.client_id, scope, &timestamp, &state, redirect_uri])?;

        let mut url = Url::parse(&format!("{}{}", self.base_uri, AUTH_CODE_ENDPOINT))
            .map_err(|err| ErrorKind::Uri(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &client_secret)
            .append_pair("scope", scope)
            .append_pair("timestamp", &timestamp)
            .append_pair("state", &state)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("client_certificate_hash", self.signer.cert_hash())
            .append_pair("response_type", "code")
            .append_pair("access_type", "online")
            .append_pair("permissions", &permissions.to_base64());

        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// `scope` and `redirect_uri` must equal the values used for
    /// [`Client::auth_uri`].
    pub async fn token_exchange(
        &self,
        code: &str,
        scope: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse> {
        let op = Operation::TokenExchange;
        match self.token_exchange_inner(code, scope, redirect_uri).await {
            Ok(token) => Ok(token),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn token_exchange_inner(
        &self,
        code: &str,
        scope: &str,
        redirect_uri: &str,
    ) -> std::result::Result<TokenResponse, ErrorKind> {
        let timestamp = format_timestamp(OffsetDateTime::now_utc())?;
        let state = Uuid::new_v4().to_string();
        let client_secret =
            self.sign(&[&self.client_id, scope, &timestamp, &state, redirect_uri, code])?;

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", &client_secret),
            ("scope", scope),
            ("timestamp", &timestamp),
            ("state", &state),
            ("redirect_uri", redirect_uri),
            ("client_certificate_hash", self.signer.cert_hash()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("token_type", "Bearer"),
        ];
        self.token_request(&form).await
    }

    /// Refresh an access token for a user by their ESIA identifier
    /// (OID), with `scope="prm_chg"`. `redirect_uri` must equal the
    /// value used for [`Client::auth_uri`].
    pub async fn token_update(&self, oid: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let op = Operation::TokenUpdate;
        match self.token_update_inner(oid, redirect_uri).await {
            Ok(token) => Ok(token),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn token_update_inner(
        &self,
        oid: &str,
        redirect_uri: &str,
    ) -> std::result::Result<TokenResponse, ErrorKind> {
        let timestamp = format_timestamp(OffsetDateTime::now_utc())?;
        let scope = format!("prm_chg?oid={oid}");
        let state = Uuid::new_v4().to_string();
        let client_secret =
            self.sign(&[&self.client_id, &scope, &timestamp, &state, redirect_uri])?;

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", &client_secret),
            ("scope", &scope),
            ("timestamp", &timestamp),
            ("state", &state),
            ("redirect_uri", redirect_uri),
            ("client_certificate_hash", self.signer.cert_hash()),
            ("grant_type", "client_credentials"),
            ("token_type", "Bearer"),
        ];
        self.token_request(&form).await
    }

    async fn token_request(
        &self,
        form: &[(&str, &str)],
    ) -> std::result::Result<TokenResponse, ErrorKind> {
        let url = format!("{}{}", self.base_uri, TOKEN_ENDPOINT);
        tracing::debug!(url = %url, "token request");

        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(ErrorKind::Request)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(ErrorKind::ResponseRead)?;

        tracing::debug!(status = status.as_u16(), url = %url, "token response");

        if status.as_u16() >= 400 {
            return Err(ErrorKind::Api(classify(
                status,
                content_type.as_deref(),
                &bytes,
            )));
        }
        serde_json::from_slice(&bytes).map_err(ErrorKind::Decode)
    }

    /// Sign the concatenation of the given values, base64-url encoded
    /// for the `client_secret` parameter.
    fn sign(&self, values: &[&str]) -> std::result::Result<String, ErrorKind> {
        let data = values.concat();
        let signature = self
            .signer
            .sign(data.as_bytes())
            .map_err(ErrorKind::Sign)?;
        Ok(URL_SAFE.encode(signature))
    }
}

/// Extract the authorization code and `state` from the callback
/// request ESIA issues to the redirect URI.
///
/// When ESIA reports an error instead of a code, the error description
/// is mapped to an [`crate::EsiaCode`] and returned as a denial.
pub fn parse_callback(callback: &Url) -> Result<(String, String)> {
    let op = Operation::ParseCallback;
    let query = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };

    let Some(state) = query("state") else {
        return Err(Error::new(op, ErrorKind::NoState));
    };
    match query("code") {
        Some(code) => Ok((code, state)),
        None => {
            let envelope = crate::error::ErrorResponse {
                error: query("error").unwrap_or_default(),
                error_description: query("error_description").unwrap_or_default(),
                state,
            };
            Err(Error::new(
                op,
                ErrorKind::Denied {
                    code: crate::EsiaCode::from_description(&envelope.error_description),
                    annotations: envelope.annotations(),
                },
            ))
        }
    }
}

fn format_timestamp(now: OffsetDateTime) -> std::result::Result<String, ErrorKind> {
    now.format(TS_LAYOUT)
        .map_err(|err| ErrorKind::Timestamp(err.to_string()))
}
