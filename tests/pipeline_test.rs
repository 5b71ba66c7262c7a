//! End-to-end tests of the export pipeline

mod common;

use common::{direct_client, slide, FakeService, TestServer};
use pretty_assertions::assert_eq;
use slides_export::render::ImageFetcher;
use slides_export::{process_presentation, Error};

fn fetcher() -> ImageFetcher {
    ImageFetcher::with_client(direct_client())
}

fn dimensions(path: &str) -> (u32, u32) {
    let img = image::open(path).unwrap();
    (img.width(), img.height())
}

#[tokio::test]
async fn test_single_slide_export() {
    let server = TestServer::start().await;
    server.png("/thumb/1.png", 800, 600);
    let service = FakeService::new(
        vec![slide("g1", &["Hello, ", "World!"])],
        &[("g1", server.url("/thumb/1.png"))],
    );
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("Slides");

    let output = process_presentation(&service, &fetcher(), "deck", &output_dir)
        .await
        .unwrap();

    assert_eq!(output.presentation_id, "deck");
    assert_eq!(output.base_dir, output_dir);
    assert_eq!(output.manifest.len(), 1);

    let record = output.manifest.get(1).unwrap();
    assert_eq!(record.notes, "Hello, World!");
    assert_eq!(
        record.original,
        output_dir.join("slide_1.png").display().to_string()
    );
    assert_eq!(
        record.standard,
        output_dir.join("4_3/slide_1.png").display().to_string()
    );
    assert_eq!(
        record.widescreen,
        output_dir.join("16_9/slide_1.png").display().to_string()
    );

    assert_eq!(dimensions(&record.original), (800, 600));
    assert_eq!(dimensions(&record.standard), (800, 600));
    assert_eq!(dimensions(&record.widescreen), (1067, 600));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output.manifest_path).unwrap()).unwrap();
    assert_eq!(output.manifest_path, output_dir.join("slides_data.json"));
    assert_eq!(manifest["slide_1"]["notes"], "Hello, World!");
    assert_eq!(manifest["slide_1"]["16:9"], record.widescreen.as_str());
}

#[tokio::test]
async fn test_manifest_keys_cover_every_slide() {
    let server = TestServer::start().await;
    let mut slides = Vec::new();
    let mut thumbnails = Vec::new();
    for n in 1..=11 {
        let path = format!("/thumb/{}.png", n);
        server.png(&path, 64, 48);
        slides.push(slide(&format!("g{}", n), &[]));
        thumbnails.push((format!("g{}", n), server.url(&path)));
    }
    let thumbnails: Vec<(&str, String)> = thumbnails
        .iter()
        .map(|(id, url)| (id.as_str(), url.clone()))
        .collect();
    let service = FakeService::new(slides, &thumbnails);
    let tmp = tempfile::tempdir().unwrap();

    let output = process_presentation(&service, &fetcher(), "deck", &tmp.path().join("Slides"))
        .await
        .unwrap();

    let keys: Vec<String> = output.manifest.entries().map(|(key, _)| key).collect();
    let expected: Vec<String> = (1..=11).map(|n| format!("slide_{}", n)).collect();
    assert_eq!(keys, expected);
    assert!(output.manifest.entries().all(|(_, r)| r.notes.is_empty()));
}

#[tokio::test]
async fn test_failed_thumbnail_fails_run_without_rollback() {
    let server = TestServer::start().await;
    server.png("/thumb/1.png", 800, 600);
    let service = FakeService::new(
        vec![slide("g1", &["first"]), slide("g2", &["second"])],
        &[
            ("g1", server.url("/thumb/1.png")),
            ("g2", server.url("/thumb/missing.png")),
        ],
    );
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("Slides");

    let result = process_presentation(&service, &fetcher(), "deck", &output_dir).await;

    match result {
        Err(Error::Processing { message }) => {
            assert!(message.contains("slide 2"), "unexpected message: {}", message)
        }
        other => panic!("expected processing error, got {:?}", other.map(|o| o.run_id)),
    }

    // Slide 1 was fully processed before the failure
    assert!(output_dir.join("slide_1.png").is_file());
    assert!(output_dir.join("4_3/slide_1.png").is_file());
    assert!(output_dir.join("16_9/slide_1.png").is_file());
    assert!(!output_dir.join("slide_2.png").exists());
    assert!(!output_dir.join("slides_data.json").exists());
}

#[tokio::test]
async fn test_presentation_fetch_failure() {
    let service = FakeService::not_found();
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("Slides");

    let result = process_presentation(&service, &fetcher(), "missing", &output_dir).await;

    assert!(matches!(result, Err(Error::Processing { .. })));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_empty_presentation() {
    let service = FakeService::new(vec![], &[]);
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("Slides");

    let output = process_presentation(&service, &fetcher(), "deck", &output_dir)
        .await
        .unwrap();

    assert!(output.manifest.is_empty());
    assert_eq!(
        std::fs::read_to_string(output_dir.join("slides_data.json")).unwrap(),
        "{}"
    );
    assert!(output_dir.join("4_3").is_dir());
    assert!(output_dir.join("16_9").is_dir());
}

#[tokio::test]
async fn test_rerun_replaces_previous_output() {
    let server = TestServer::start().await;
    server.png("/thumb/1.png", 40, 30);
    server.png("/thumb/2.png", 40, 30);
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("Slides");

    let two_slides = FakeService::new(
        vec![slide("a", &[]), slide("b", &[])],
        &[
            ("a", server.url("/thumb/1.png")),
            ("b", server.url("/thumb/2.png")),
        ],
    );
    process_presentation(&two_slides, &fetcher(), "deck", &output_dir)
        .await
        .unwrap();
    assert!(output_dir.join("16_9/slide_2.png").exists());

    let one_slide = FakeService::new(vec![slide("a", &[])], &[("a", server.url("/thumb/1.png"))]);
    let output = process_presentation(&one_slide, &fetcher(), "deck", &output_dir)
        .await
        .unwrap();

    assert_eq!(output.manifest.len(), 1);
    assert!(!output_dir.join("slide_2.png").exists());
    assert!(!output_dir.join("16_9/slide_2.png").exists());
}

#[tokio::test]
async fn test_export_keeps_unrelated_files_in_output_dir() {
    let server = TestServer::start().await;
    server.png("/thumb/1.png", 40, 30);
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("Slides");
    std::fs::create_dir_all(output_dir.join("projects")).unwrap();
    std::fs::write(output_dir.join("projects/thesis.tex"), "\\documentclass{article}").unwrap();
    std::fs::write(output_dir.join("readme.txt"), "notes").unwrap();

    let service = FakeService::new(vec![slide("a", &[])], &[("a", server.url("/thumb/1.png"))]);
    let output = process_presentation(&service, &fetcher(), "deck", &output_dir)
        .await
        .unwrap();

    assert_eq!(output.manifest.len(), 1);
    assert_eq!(
        std::fs::read_to_string(output_dir.join("projects/thesis.tex")).unwrap(),
        "\\documentclass{article}"
    );
    assert!(output_dir.join("readme.txt").is_file());
    assert!(output_dir.join("slide_1.png").is_file());
}

#[tokio::test]
async fn test_export_rejects_output_dir_without_name() {
    let service = FakeService::new(vec![], &[]);

    let result = process_presentation(&service, &fetcher(), "deck", std::path::Path::new("/")).await;

    match result {
        Err(Error::Processing { message }) => {
            assert!(message.contains("Invalid output directory"), "{}", message)
        }
        other => panic!("expected processing error, got {:?}", other.map(|o| o.run_id)),
    }
}
