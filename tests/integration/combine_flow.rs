//! Scan, select, upload and save against a running service.

use std::time::Duration;
use tempfile::TempDir;

use pdfbind::config::ClientConfig;
use pdfbind::ops::combine;
use pdfbind::output::OutputFormatter;
use pdfbind::scan::Scanner;
use pdfbind::scan::fs::FsEntrySource;
use pdfbind::selection::Selection;
use pdfbind::transport::{MergeClient, SubmitControl, SubmitState, Uploader};

use crate::common::{TestServer, page_markers, write_pdf};

/// Lay out:
///
/// ```text
/// docs/a.pdf        A (3 pages)
/// docs/notes.txt
/// docs/sub/b.pdf    B (2 pages)
/// c.pdf             C (1 page)
/// ```
fn payload() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_pdf(&root.join("docs/a.pdf"), "A", 3);
    std::fs::write(root.join("docs/notes.txt"), b"not a pdf").unwrap();
    write_pdf(&root.join("docs/sub/b.pdf"), "B", 2);
    write_pdf(&root.join("c.pdf"), "C", 1);
    temp
}

fn client_config(temp: &TempDir, server: &TestServer) -> ClientConfig {
    ClientConfig {
        inputs: vec![
            temp.path().join("docs").display().to_string(),
            temp.path().join("c.pdf").display().to_string(),
        ],
        server_url: server.base_url.clone(),
        output_dir: temp.path().join("out"),
        quiet: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_combine_folder_and_file() {
    let temp = payload();
    let server = TestServer::start().await;

    let config = ClientConfig {
        output_name: "  bundle.PDF ".to_string(),
        ..client_config(&temp, &server)
    };
    let summary = combine(&config, &OutputFormatter::new(true, false))
        .await
        .unwrap();

    let saved = summary.saved.unwrap();
    assert_eq!(saved, temp.path().join("out").join("bundle.pdf"));
    assert_eq!(summary.selected, 3);
    assert!(summary.scan.failures.is_empty());

    let bytes = std::fs::read(&saved).unwrap();
    assert_eq!(
        page_markers(&bytes),
        ["A.1", "A.2", "A.3", "B.1", "B.2", "C.1"]
    );

    server.stop().await;
}

#[tokio::test]
async fn test_combine_keeps_nested_name_inside_output_dir() {
    let temp = payload();
    let server = TestServer::start().await;

    for (name, expected) in [("sub/x", "sub_x.pdf"), ("../escaped", ".._escaped.pdf")] {
        let config = ClientConfig {
            output_name: name.to_string(),
            ..client_config(&temp, &server)
        };
        let summary = combine(&config, &OutputFormatter::new(true, false))
            .await
            .unwrap();

        assert_eq!(
            summary.saved.unwrap(),
            temp.path().join("out").join(expected)
        );
    }
    assert!(!temp.path().join("escaped.pdf").exists());

    server.stop().await;
}

#[tokio::test]
async fn test_combine_with_removal_and_default_name() {
    let temp = payload();
    let server = TestServer::start().await;

    let config = ClientConfig {
        remove: vec![1],
        ..client_config(&temp, &server)
    };
    let summary = combine(&config, &OutputFormatter::new(true, false))
        .await
        .unwrap();

    let saved = summary.saved.unwrap();
    assert_eq!(saved.file_name().unwrap(), "merged-document.pdf");
    assert_eq!(summary.selected, 2);
    assert_eq!(
        page_markers(&std::fs::read(&saved).unwrap()),
        ["A.1", "A.2", "A.3", "C.1"]
    );

    server.stop().await;
}

#[tokio::test]
async fn test_corrupt_pdf_is_uploaded_but_skipped_by_service() {
    let temp = payload();
    std::fs::write(temp.path().join("docs/broken.pdf"), b"definitely not a pdf").unwrap();
    let server = TestServer::start().await;

    let summary = combine(&client_config(&temp, &server), &OutputFormatter::new(true, false))
        .await
        .unwrap();

    // a.pdf, broken.pdf, sub/b.pdf, c.pdf
    assert_eq!(summary.selected, 4);
    let bytes = std::fs::read(summary.saved.unwrap()).unwrap();
    assert_eq!(
        page_markers(&bytes),
        ["A.1", "A.2", "A.3", "B.1", "B.2", "C.1"]
    );

    server.stop().await;
}

#[tokio::test]
async fn test_submit_control_follows_a_real_submission() {
    let temp = payload();
    let server = TestServer::start().await;

    let source = FsEntrySource::new(1);
    let roots = source.entries_for(&[temp.path().join("docs")]).await;
    let mut selection = Selection::new();
    Scanner::new()
        .scan(&source, roots, |handle| {
            selection.add(handle);
        })
        .await;
    assert_eq!(selection.len(), 2);

    let control = SubmitControl::new(selection.subscribe(), Duration::from_millis(50));
    let mut states = control.subscribe();
    let uploader = Uploader::new(MergeClient::new(&server.base_url).unwrap(), control);

    let download = uploader.submit(&selection, "").await.unwrap().unwrap();
    assert_eq!(download.filename, "merged-document.pdf");
    assert_eq!(uploader.control().state(), SubmitState::Success);
    assert!(!uploader.control().state().is_enabled());

    tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|state| *state == SubmitState::Idle { count: 2 }),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(uploader.control().state().label(), "Combine 2 PDFs");

    server.stop().await;
}

#[tokio::test]
async fn test_failed_submission_restores_control() {
    let temp = payload();
    let server = TestServer::start().await;
    let base_url = server.base_url.clone();
    // Nothing listens any more once the server is stopped.
    server.stop().await;

    let config = ClientConfig {
        server_url: base_url,
        inputs: vec![temp.path().join("c.pdf").display().to_string()],
        quiet: true,
        ..Default::default()
    };

    let err = combine(&config, &OutputFormatter::new(true, false))
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(!temp.path().join("merged-document.pdf").exists());
}
