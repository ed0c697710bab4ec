//! The EPGU REST client.

use crate::debug;
use crate::error::{Error, ErrorKind, Operation, Result, classify};
use crate::multipart::{MultipartBody, Part};
use epgu_core::archive::Archive;
use epgu_core::chunk::{self, DEFAULT_CHUNK_SIZE};
use epgu_core::dict::{Dict, DictRequest};
use epgu_core::link::FileLink;
use epgu_core::meta::OrderMeta;
use epgu_core::order::{OrderInfo, OrderInfoResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Response envelope carrying the echoed order id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderIdResponse {
    #[serde(default)]
    order_id: u64,
}

fn to_json<T: serde::Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("request payloads serialize infallibly")
}

/// REST client for the EPGU e-services API.
///
/// One instance holds one shared HTTP client; calls are independent and
/// the instance is cheap to clone.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_uri: String,
    chunk_size: usize,
}

impl Client {
    /// Create a client for the given base URI (scheme and host, no
    /// trailing slash).
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_uri: base_uri.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Replace the HTTP client, e.g. to configure timeouts or proxies.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Set the maximum chunk size for chunked uploads. Zero is ignored.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        if chunk_size > 0 {
            self.chunk_size = chunk_size;
        }
        self
    }

    /// Create an application.
    ///
    /// `POST /api/gusmev/order`. Returns the number of the created
    /// order.
    pub async fn order_create(&self, token: &str, meta: &OrderMeta) -> Result<u64> {
        let op = Operation::OrderCreate;
        match self.order_create_inner(token, meta).await {
            Ok(order_id) => Ok(order_id),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn order_create_inner(
        &self,
        token: &str,
        meta: &OrderMeta,
    ) -> std::result::Result<u64, ErrorKind> {
        let response: OrderIdResponse = self
            .execute(
                Method::POST,
                "/api/gusmev/order",
                Some(JSON_CONTENT_TYPE),
                Some(token),
                Some(to_json(meta)),
            )
            .await?;
        if response.order_id == 0 {
            return Err(ErrorKind::MissingOrderId);
        }
        Ok(response.order_id)
    }

    /// Create and submit an application with its attachment archive in
    /// a single request.
    ///
    /// `POST /api/gusmev/push`. Returns the number of the created
    /// order.
    pub async fn order_push(&self, token: &str, meta: &OrderMeta, archive: &Archive) -> Result<u64> {
        let op = Operation::OrderPush;
        match self.order_push_inner(token, meta, archive).await {
            Ok(order_id) => Ok(order_id),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn order_push_inner(
        &self,
        token: &str,
        meta: &OrderMeta,
        archive: &Archive,
    ) -> std::result::Result<u64, ErrorKind> {
        if archive.data.is_empty() {
            return Err(ErrorKind::EmptyArchive);
        }

        let parts = [
            Part::Json {
                name: "meta",
                data: to_json(meta),
            },
            Part::File {
                filename: format!("{}.zip", archive.file_stem()),
                data: &archive.data,
            },
        ];
        let response: OrderIdResponse = self
            .execute_multipart("/api/gusmev/push", token, &parts)
            .await?;
        if response.order_id == 0 {
            return Err(ErrorKind::MissingOrderId);
        }
        Ok(response.order_id)
    }

    /// Upload an application's attachment archive in bounded chunks.
    ///
    /// `POST /api/gusmev/push/chunked`, one request per chunk, strictly
    /// in order: the remote side is stateful per order and later chunks
    /// are not sent until the previous response has been read in full.
    /// The first failure aborts the remaining chunks; there is no
    /// resume or per-chunk retry. Every response must echo the
    /// requested order id.
    pub async fn order_push_chunked(
        &self,
        token: &str,
        order_id: u64,
        meta: &OrderMeta,
        archive: &Archive,
    ) -> Result<()> {
        let op = Operation::OrderPushChunked;
        match self
            .order_push_chunked_inner(token, order_id, meta, archive)
            .await
        {
            Ok(()) => Ok(()),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn order_push_chunked_inner(
        &self,
        token: &str,
        order_id: u64,
        meta: &OrderMeta,
        archive: &Archive,
    ) -> std::result::Result<(), ErrorKind> {
        if archive.data.is_empty() {
            return Err(ErrorKind::EmptyArchive);
        }

        let stem = archive.file_stem();
        for chunk in chunk::split(&archive.data, self.chunk_size) {
            let parts = [
                Part::Field {
                    name: "orderId",
                    value: order_id.to_string(),
                },
                Part::Json {
                    name: "meta",
                    data: to_json(meta),
                },
                Part::File {
                    filename: chunk.filename(stem),
                    data: chunk.data,
                },
                Part::Field {
                    name: "chunk",
                    value: chunk.index.to_string(),
                },
                Part::Field {
                    name: "chunks",
                    value: chunk.total.to_string(),
                },
            ];
            let response: OrderIdResponse = self
                .execute_multipart("/api/gusmev/push/chunked", token, &parts)
                .await?;
            if response.order_id != order_id {
                return Err(ErrorKind::WrongOrderId {
                    expected: order_id,
                    actual: response.order_id,
                });
            }
        }
        Ok(())
    }

    /// Fetch detailed information about a submitted application.
    ///
    /// `POST /api/gusmev/order/{orderId}`. The API answers `204 No
    /// Content` when the order does not exist; that is reported as an
    /// order-not-found failure, never as success.
    pub async fn order_info(&self, token: &str, order_id: u64) -> Result<OrderInfo> {
        let op = Operation::OrderInfo;
        match self.order_info_inner(token, order_id).await {
            Ok(info) => Ok(info),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn order_info_inner(
        &self,
        token: &str,
        order_id: u64,
    ) -> std::result::Result<OrderInfo, ErrorKind> {
        let path = format!("/api/gusmev/order/{order_id}");
        let response: OrderInfoResponse = self
            .execute(
                Method::POST,
                &path,
                Some(JSON_CONTENT_TYPE),
                Some(token),
                None,
            )
            .await?;
        response.parse().map_err(ErrorKind::Decode)
    }

    /// Cancel an application.
    ///
    /// `POST /api/gusmev/order/{orderId}/cancel`. The response must
    /// echo the cancelled order id.
    pub async fn order_cancel(&self, token: &str, order_id: u64) -> Result<()> {
        let op = Operation::OrderCancel;
        match self.order_cancel_inner(token, order_id).await {
            Ok(()) => Ok(()),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn order_cancel_inner(
        &self,
        token: &str,
        order_id: u64,
    ) -> std::result::Result<(), ErrorKind> {
        let path = format!("/api/gusmev/order/{order_id}/cancel");
        let response: OrderIdResponse = self
            .execute(
                Method::POST,
                &path,
                Some(JSON_CONTENT_TYPE),
                Some(token),
                None,
            )
            .await?;
        if response.order_id != order_id {
            return Err(ErrorKind::WrongOrderId {
                expected: order_id,
                actual: response.order_id,
            });
        }
        Ok(())
    }

    /// Download an order attachment or response file by its storage
    /// link.
    ///
    /// The opaque `link` (`terrabyte://...`) is resolved to
    /// `GET /api/storage/v2/files/{objectId}/{objectType}/download`.
    pub async fn attachment_download(&self, token: &str, link: &str) -> Result<Vec<u8>> {
        let op = Operation::AttachmentDownload;
        match self.attachment_download_inner(token, link).await {
            Ok(data) => Ok(data),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn attachment_download_inner(
        &self,
        token: &str,
        link: &str,
    ) -> std::result::Result<Vec<u8>, ErrorKind> {
        let file_link =
            FileLink::parse(link).map_err(|_| ErrorKind::InvalidFileLink(link.to_string()))?;
        self.execute_raw(
            Method::GET,
            &file_link.download_path(),
            None,
            Some(token),
            None,
        )
        .await
    }

    /// Look up one page of a reference dictionary.
    ///
    /// `POST /api/nsi/v1/dictionary/{code}`.
    pub async fn dict(&self, token: &str, code: &str, request: &DictRequest) -> Result<Dict> {
        let op = Operation::Dict;
        match self.dict_inner(token, code, request).await {
            Ok(dict) => Ok(dict),
            Err(kind) => Err(Error::new(op, kind)),
        }
    }

    async fn dict_inner(
        &self,
        token: &str,
        code: &str,
        request: &DictRequest,
    ) -> std::result::Result<Dict, ErrorKind> {
        let path = format!("/api/nsi/v1/dictionary/{code}");
        self.execute(
            Method::POST,
            &path,
            Some(JSON_CONTENT_TYPE),
            Some(token),
            Some(to_json(request)),
        )
        .await
    }

    async fn execute_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        parts: &[Part<'_>],
    ) -> std::result::Result<T, ErrorKind> {
        tracing::debug!(path, parts = %debug::multipart_preview(parts), "multipart request body");
        let body = MultipartBody::build(parts).map_err(ErrorKind::Multipart)?;
        let content_type = body.content_type();
        self.execute(
            Method::POST,
            path,
            Some(&content_type),
            Some(token),
            Some(body.into_bytes()),
        )
        .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<T, ErrorKind> {
        let bytes = self
            .execute_raw(method, path, content_type, token, body)
            .await?;
        serde_json::from_slice(&bytes).map_err(ErrorKind::Decode)
    }

    /// Perform one request-response cycle.
    ///
    /// The response body is always read in full, success or failure, so
    /// the underlying connection can be reused. Failure statuses (and
    /// the overloaded `204 No Content`) are handed to the classifier.
    async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<Vec<u8>, ErrorKind> {
        let url = format!("{}{}", self.base_uri, path);

        let preview = match (&body, content_type) {
            (Some(body), Some(ct)) if !ct.starts_with("multipart/") => debug::body_preview(body),
            (Some(_), _) => String::from("[multipart body]"),
            (None, _) => String::new(),
        };
        tracing::debug!(method = %method, url = %url, body = %preview, "request");

        let mut request = self.http.request(method, &url);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(ErrorKind::Request)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(ErrorKind::ResponseRead)?;

        tracing::debug!(
            status = status.as_u16(),
            url = %url,
            body = %debug::body_preview(&bytes),
            "response"
        );

        if status.as_u16() >= 400 || status == StatusCode::NO_CONTENT {
            return Err(ErrorKind::Api(classify(
                status,
                content_type.as_deref(),
                &bytes,
            )));
        }

        Ok(bytes.to_vec())
    }
}
