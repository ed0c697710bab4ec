use epgu_client::{Client, ErrorCode, ErrorKind, Operation, StatusCategory};
use epgu_core::archive::Archive;
use epgu_core::dict::{DictRequest, TreeFiltering};
use epgu_core::meta::OrderMeta;
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

const TOKEN: &str = "test-token";
const ORDER_ID: u64 = 123_456;

fn test_meta() -> OrderMeta {
    OrderMeta::new("test-region", "test-service", "test-target")
}

fn meta_json() -> serde_json::Value {
    json!({
        "region": "test-region",
        "serviceCode": "test-service",
        "targetCode": "test-target",
    })
}

/// Section of a multipart body holding one binary file payload.
fn file_section(payload: &[u8]) -> String {
    let mut section = String::from("Content-Type: application/octet-stream\r\n\r\n");
    section.push_str(std::str::from_utf8(payload).unwrap());
    section.push_str("\r\n");
    section
}

fn chunk_field(index: usize) -> String {
    format!("name=\"chunk\"\r\n\r\n{index}\r\n")
}

#[tokio::test]
async fn order_create_returns_order_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/gusmev/order")
            .header("authorization", format!("Bearer {TOKEN}"))
            .header("content-type", "application/json; charset=utf-8")
            .json_body(meta_json());
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":123456}"#);
    });

    let client = Client::new(server.base_url());
    let order_id = client.order_create(TOKEN, &test_meta()).await.unwrap();

    assert_eq!(order_id, ORDER_ID);
    mock.assert_hits(1);
}

#[tokio::test]
async fn order_create_without_order_id_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"foo":"bar"}"#);
    });

    let client = Client::new(server.base_url());
    let err = client.order_create(TOKEN, &test_meta()).await.unwrap_err();

    assert_eq!(err.operation(), Operation::OrderCreate);
    assert!(matches!(err.kind(), ErrorKind::MissingOrderId));
}

#[tokio::test]
async fn order_create_with_malformed_json_fails_to_decode() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body("malformed json{}");
    });

    let client = Client::new(server.base_url());
    let err = client.order_create(TOKEN, &test_meta()).await.unwrap_err();

    assert_eq!(err.operation(), Operation::OrderCreate);
    assert!(matches!(err.kind(), ErrorKind::Decode(_)));
}

#[tokio::test]
async fn order_create_bad_request_classifies_missing_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order");
        then.status(400)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"error":"schema validation failed"}"#);
    });

    let client = Client::new(server.base_url());
    let err = client.order_create(TOKEN, &test_meta()).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCategory::BadRequest));
    assert_eq!(err.code(), Some(ErrorCode::NotSpecified));
    assert_eq!(
        err.to_string(),
        "OrderCreate failed: HTTP 400 Bad Request: invalid parameters: \
         error code not specified [error='schema validation failed']"
    );
}

#[tokio::test]
async fn order_create_forbidden_classifies_business_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order");
        then.status(403)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"code":"access_denied_service", "message":"denied"}"#);
    });

    let client = Client::new(server.base_url());
    let err = client.order_create(TOKEN, &test_meta()).await.unwrap_err();

    assert_eq!(err.operation(), Operation::OrderCreate);
    assert_eq!(err.status(), Some(StatusCategory::Forbidden));
    assert_eq!(err.code(), Some(ErrorCode::AccessDeniedService));
    assert_eq!(
        err.to_string(),
        "OrderCreate failed: HTTP 403 Forbidden: access forbidden: \
         the system is not allowed to access the requested service \
         [code='access_denied_service', message='denied']"
    );
}

#[tokio::test]
async fn push_chunked_sends_single_chunk_upload() {
    let server = MockServer::start();
    let data = vec![b'x'; 100];
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/gusmev/push/chunked")
            .header("authorization", format!("Bearer {TOKEN}"))
            .body_contains("name=\"orderId\"\r\n\r\n123456\r\n")
            .body_contains(r#"{"region":"test-region","serviceCode":"test-service","targetCode":"test-target"}"#)
            .body_contains("filename=\"test-archive.zip\"")
            .body_contains(file_section(&data))
            .body_contains(chunk_field(0))
            .body_contains("name=\"chunks\"\r\n\r\n1\r\n");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":123456}"#);
    });

    let client = Client::new(server.base_url()).with_chunk_size(100);
    let archive = Archive::from_zip("test-archive", data);
    client
        .order_push_chunked(TOKEN, ORDER_ID, &test_meta(), &archive)
        .await
        .unwrap();

    mock.assert_hits(1);
}

#[tokio::test]
async fn push_chunked_round_trips_four_chunks() {
    let server = MockServer::start();
    // 301 printable bytes so each chunk payload can be matched exactly.
    let data: Vec<u8> = (0..301).map(|i| b'a' + (i % 26) as u8).collect();

    let mut mocks = Vec::new();
    for index in 0..4usize {
        let start = index * 100;
        let end = (start + 100).min(data.len());
        let payload = data[start..end].to_vec();
        mocks.push(server.mock(|when, then| {
            when.method(POST)
                .path("/api/gusmev/push/chunked")
                .header("authorization", format!("Bearer {TOKEN}"))
                .body_contains("name=\"orderId\"\r\n\r\n123456\r\n")
                .body_contains(format!("filename=\"test-archive.z{:03}\"", index + 1))
                .body_contains(file_section(&payload))
                .body_contains(chunk_field(index))
                .body_contains("name=\"chunks\"\r\n\r\n4\r\n");
            then.status(200)
                .header("content-type", "application/json; charset=utf-8")
                .body(r#"{"orderId":123456}"#);
        }));
    }

    let client = Client::new(server.base_url()).with_chunk_size(100);
    let archive = Archive::from_zip("test-archive", data);
    client
        .order_push_chunked(TOKEN, ORDER_ID, &test_meta(), &archive)
        .await
        .unwrap();

    for mock in &mocks {
        mock.assert_hits(1);
    }
}

#[tokio::test]
async fn push_chunked_rejects_wrong_order_id() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/push/chunked");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":9999}"#);
    });

    let client = Client::new(server.base_url()).with_chunk_size(100);
    let archive = Archive::from_zip("test-archive", vec![b'a'; 100]);
    let err = client
        .order_push_chunked(TOKEN, ORDER_ID, &test_meta(), &archive)
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Operation::OrderPushChunked);
    assert!(matches!(
        err.kind(),
        ErrorKind::WrongOrderId {
            expected: 123_456,
            actual: 9999,
        }
    ));
}

#[tokio::test]
async fn push_chunked_missing_order_id_is_a_mismatch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/push/chunked");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"foo":"bar"}"#);
    });

    let client = Client::new(server.base_url()).with_chunk_size(100);
    let archive = Archive::from_zip("test-archive", vec![b'a'; 100]);
    let err = client
        .order_push_chunked(TOKEN, ORDER_ID, &test_meta(), &archive)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::WrongOrderId {
            expected: 123_456,
            actual: 0,
        }
    ));
}

#[tokio::test]
async fn push_chunked_plain_text_error_is_verbatim() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/push/chunked");
        then.status(500)
            .header("content-type", "text/plain; charset=utf-8")
            .body("internal error");
    });

    let client = Client::new(server.base_url()).with_chunk_size(100);
    let archive = Archive::from_zip("test-archive", vec![b'a'; 100]);
    let err = client
        .order_push_chunked(TOKEN, ORDER_ID, &test_meta(), &archive)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCategory::Internal));
    assert_eq!(
        err.to_string(),
        "OrderPushChunked failed: HTTP 500 Internal Server Error: internal error: internal error"
    );
}

#[tokio::test]
async fn push_chunked_rejects_empty_archive_without_any_request() {
    let server = MockServer::start();
    let catch_all = server.mock(|when, then| {
        when.path_contains("/");
        then.status(200);
    });

    let client = Client::new(server.base_url()).with_chunk_size(100);
    let archive = Archive::from_zip("test-archive", Vec::new());
    let err = client
        .order_push_chunked(TOKEN, ORDER_ID, &test_meta(), &archive)
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Operation::OrderPushChunked);
    assert!(matches!(err.kind(), ErrorKind::EmptyArchive));
    catch_all.assert_hits(0);
}

#[tokio::test]
async fn order_push_uploads_whole_archive_at_once() {
    let server = MockServer::start();
    let data = vec![b'z'; 64];
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/gusmev/push")
            .header("authorization", format!("Bearer {TOKEN}"))
            .body_contains("name=\"meta\"")
            .body_contains("filename=\"test-archive.zip\"")
            .body_contains(file_section(&data));
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":123456}"#);
    });

    let client = Client::new(server.base_url());
    let archive = Archive::from_zip("test-archive", data);
    let order_id = client
        .order_push(TOKEN, &test_meta(), &archive)
        .await
        .unwrap();

    assert_eq!(order_id, ORDER_ID);
    mock.assert_hits(1);
}

#[tokio::test]
async fn order_push_names_unnamed_archives() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/gusmev/push")
            .body_contains("filename=\"archive.zip\"");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":123456}"#);
    });

    let client = Client::new(server.base_url());
    let archive = Archive::from_zip("", vec![b'a'; 10]);
    client.order_push(TOKEN, &test_meta(), &archive).await.unwrap();

    mock.assert_hits(1);
}

#[tokio::test]
async fn order_push_rejects_empty_archive() {
    let client = Client::new("http://127.0.0.1:9");
    let archive = Archive::from_zip("test-archive", Vec::new());
    let err = client
        .order_push(TOKEN, &test_meta(), &archive)
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Operation::OrderPush);
    assert!(matches!(err.kind(), ErrorKind::EmptyArchive));
}

#[tokio::test]
async fn order_info_decodes_embedded_order() {
    let server = MockServer::start();
    let body = json!({
        "code": "OK",
        "message": "test",
        "messageId": "test-GUID",
        "order": "{\"id\":123456,\"orderStatusId\":2,\"orderStatusName\":\"received\"}",
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/gusmev/order/123456")
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .json_body(body);
    });

    let client = Client::new(server.base_url());
    let info = client.order_info(TOKEN, ORDER_ID).await.unwrap();

    assert_eq!(info.code, "OK");
    assert_eq!(info.message.as_deref(), Some("test"));
    let order = info.order.unwrap();
    assert_eq!(order.id, ORDER_ID);
    assert_eq!(order.order_status_name, "received");
}

#[tokio::test]
async fn order_info_decodes_null_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order/123456");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"code":"OK","message":null,"messageId":"test-GUID","order":null}"#);
    });

    let client = Client::new(server.base_url());
    let info = client.order_info(TOKEN, ORDER_ID).await.unwrap();

    assert_eq!(info.code, "OK");
    assert!(info.order.is_none());
}

#[tokio::test]
async fn order_info_reports_malformed_order_field() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order/123456");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"code":"OK","message":"test","messageId":"g","order":"malformed json{}"}"#);
    });

    let client = Client::new(server.base_url());
    let err = client.order_info(TOKEN, ORDER_ID).await.unwrap_err();

    assert_eq!(err.operation(), Operation::OrderInfo);
    assert!(matches!(err.kind(), ErrorKind::Decode(_)));
}

#[tokio::test]
async fn order_info_treats_204_as_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order/123456");
        then.status(204);
    });

    let client = Client::new(server.base_url());
    let err = client.order_info(TOKEN, ORDER_ID).await.unwrap_err();

    assert_eq!(err.operation(), Operation::OrderInfo);
    assert_eq!(err.status(), Some(StatusCategory::OrderNotFound));
}

#[tokio::test]
async fn order_info_unexpected_status_with_unknown_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order/123456");
        then.status(406)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"code":"unknown_code", "message":"Unknown Code"}"#);
    });

    let client = Client::new(server.base_url());
    let err = client.order_info(TOKEN, ORDER_ID).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCategory::Unexpected));
    assert_eq!(err.code(), Some(ErrorCode::Unexpected));
    assert_eq!(
        err.to_string(),
        "OrderInfo failed: HTTP 406 Not Acceptable: unexpected HTTP status: \
         unexpected error code [code='unknown_code', message='Unknown Code']"
    );
}

#[tokio::test]
async fn order_cancel_verifies_echoed_order_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/gusmev/order/123456/cancel")
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":123456}"#);
    });

    let client = Client::new(server.base_url());
    client.order_cancel(TOKEN, ORDER_ID).await.unwrap();
    mock.assert_hits(1);
}

#[tokio::test]
async fn order_cancel_rejects_mismatched_order_id() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/gusmev/order/123456/cancel");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(r#"{"orderId":654321}"#);
    });

    let client = Client::new(server.base_url());
    let err = client.order_cancel(TOKEN, ORDER_ID).await.unwrap_err();

    assert_eq!(err.operation(), Operation::OrderCancel);
    assert!(matches!(err.kind(), ErrorKind::WrongOrderId { .. }));
}

#[tokio::test]
async fn attachment_download_resolves_storage_link() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/storage/v2/files/123456/2/download")
            .query_param("mnemonic", "req.xml")
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .header("content-type", "application/octet-stream")
            .body(&[0u8, 1, 2, 3][..]);
    });

    let client = Client::new(server.base_url());
    let data = client
        .attachment_download(TOKEN, "terrabyte://00/123456/req.xml/2")
        .await
        .unwrap();

    assert_eq!(data, [0, 1, 2, 3]);
    mock.assert_hits(1);
}

#[tokio::test]
async fn attachment_download_rejects_invalid_link() {
    let client = Client::new("http://127.0.0.1:9");
    let err = client
        .attachment_download(TOKEN, "http://not-a-storage-link")
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Operation::AttachmentDownload);
    assert!(matches!(err.kind(), ErrorKind::InvalidFileLink(_)));
}

#[tokio::test]
async fn dict_requests_one_page() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/nsi/v1/dictionary/EXTERNAL_BIC")
            .header("authorization", format!("Bearer {TOKEN}"))
            .json_body(json!({
                "treeFiltering": "ONELEVEL",
                "pageNum": 1,
                "pageSize": 100,
            }));
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .json_body(json!({
                "error": {"code": 0, "message": "operation completed"},
                "fieldErrors": [],
                "total": 1,
                "items": [{"value": "044525974", "title": "Test Bank", "isLeaf": true}],
            }));
    });

    let client = Client::new(server.base_url());
    let request = DictRequest {
        tree_filtering: TreeFiltering::OneLevel,
        parent_ref_item_value: None,
        page_num: Some(1),
        page_size: Some(100),
    };
    let dict = client.dict(TOKEN, "EXTERNAL_BIC", &request).await.unwrap();

    assert_eq!(dict.error.code, 0);
    assert_eq!(dict.total, 1);
    assert_eq!(dict.items[0].value, "044525974");
    mock.assert_hits(1);
}
