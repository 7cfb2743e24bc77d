//! The merge service over a real TCP listener.

use futures::future::join_all;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use pdfbind::config::{
    FILES_MERGED_HEADER, FILES_SKIPPED_HEADER, PAGES_HEADER, ServerConfig, UPLOAD_FIELD,
};
use pdfbind::merge::{MergeInput, MergeRequest};
use pdfbind::server::{MERGE_FAILED_MESSAGE, NO_FILES_MESSAGE};
use pdfbind::transport::MergeClient;

use crate::common::{TestServer, page_markers, pdf_bytes};

fn pdf_part(name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}

fn header<'a>(response: &'a reqwest::Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_merge_skips_corrupt_file_and_keeps_order() {
    let server = TestServer::start().await;

    let form = Form::new()
        .part(UPLOAD_FIELD, pdf_part("validA.pdf", pdf_bytes("A", 3)))
        .part(UPLOAD_FIELD, pdf_part("corrupt.pdf", b"not a pdf at all".to_vec()))
        .part(UPLOAD_FIELD, pdf_part("validB.pdf", pdf_bytes("B", 2)));

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "application/pdf");
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"merged.pdf\"; filename*=UTF-8''merged.pdf"
    );
    assert_eq!(header(&response, FILES_MERGED_HEADER), "2");
    assert_eq!(header(&response, FILES_SKIPPED_HEADER), "1");
    assert_eq!(header(&response, PAGES_HEADER), "5");

    let bytes = response.bytes().await.unwrap();
    assert_eq!(page_markers(&bytes), ["A.1", "A.2", "A.3", "B.1", "B.2"]);

    server.stop().await;
}

#[tokio::test]
async fn test_no_file_parts_is_bad_request() {
    let server = TestServer::start().await;

    let form = Form::new().text("filename", "report");
    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), NO_FILES_MESSAGE);

    server.stop().await;
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let server = TestServer::start().await;

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .body("just some text")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());

    server.stop().await;
}

#[tokio::test]
async fn test_nothing_parsable_returns_empty_document() {
    let server = TestServer::start().await;

    let form = Form::new()
        .part(UPLOAD_FIELD, pdf_part("broken.pdf", b"garbage".to_vec()))
        .part(
            UPLOAD_FIELD,
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")
                .unwrap(),
        );

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, FILES_MERGED_HEADER), "0");
    assert_eq!(header(&response, FILES_SKIPPED_HEADER), "2");

    let bytes = response.bytes().await.unwrap();
    assert!(page_markers(&bytes).is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_requested_filename_is_advertised() {
    let server = TestServer::start().await;

    let form = Form::new()
        .text("filename", "  Quarterly.PDF ")
        .part(UPLOAD_FIELD, pdf_part("a.pdf", pdf_bytes("A", 1)));

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"Quarterly.pdf\"; filename*=UTF-8''Quarterly.pdf"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_non_ascii_filename_is_advertised_exactly() {
    let server = TestServer::start().await;

    let form = Form::new()
        .text("filename", "résumé")
        .part(UPLOAD_FIELD, pdf_part("a.pdf", pdf_bytes("A", 1)));

    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_merge_client_round_trip() {
    let server = TestServer::start().await;
    let client = MergeClient::new(&server.base_url).unwrap();

    let bytes = pdf_bytes("A", 2);
    let request = MergeRequest::from(vec![
        MergeInput::pdf("a.pdf", bytes.clone()),
        MergeInput::pdf("a.pdf", bytes),
    ]);

    let response = client.merge(&request, "twice").await.unwrap();

    assert_eq!(response.files_merged, Some(2));
    assert_eq!(response.files_skipped, Some(0));
    assert_eq!(response.pages, Some(4));
    assert_eq!(page_markers(&response.bytes), ["A.1", "A.2", "A.1", "A.2"]);

    server.stop().await;
}

#[tokio::test]
async fn test_merge_client_reports_rejection() {
    let server = TestServer::start().await;
    let client = MergeClient::new(&server.base_url).unwrap();

    let err = client.merge(&MergeRequest::new(), "x").await.unwrap_err();

    match err {
        pdfbind::PdfBindError::ServerRejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, NO_FILES_MESSAGE);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_ne!(NO_FILES_MESSAGE, MERGE_FAILED_MESSAGE);

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = TestServer::start_with(ServerConfig {
        max_upload_bytes: 1024,
        ..Default::default()
    })
    .await;

    let form = Form::new().part(UPLOAD_FIELD, pdf_part("big.pdf", vec![b'x'; 8 * 1024]));
    let response = reqwest::Client::new()
        .post(server.url("/merge"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let server = TestServer::start().await;
    let client = MergeClient::new(&server.base_url).unwrap();

    let labels = ["A", "B", "C", "D"];
    let requests: Vec<_> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            MergeRequest::from(vec![MergeInput::pdf(
                format!("{label}.pdf"),
                pdf_bytes(label, i + 1),
            )])
        })
        .collect();

    let responses = join_all(requests.iter().map(|r| client.merge(r, ""))).await;

    for (i, (label, response)) in labels.iter().zip(responses).enumerate() {
        let markers = page_markers(&response.unwrap().bytes);
        let expected: Vec<String> = (1..=i + 1).map(|n| format!("{label}.{n}")).collect();
        assert_eq!(markers, expected);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;

    let health: serde_json::Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health["status"], "ok");
    assert_eq!(health["service"], "pdfbind");

    server.stop().await;
}
