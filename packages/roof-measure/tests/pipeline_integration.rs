//! Integration tests for the measurement pipeline.
//!
//! These tests drive the façade end to end:
//! 1. Text path over synthetic document bytes
//! 2. Vision path through the mock model
//! 3. Every fallback, with its diagnostic

use std::sync::Arc;
use std::time::Duration;

use roof_measure::{
    render_pages, simulated_record, ExtractionMethod, ExtractionRequest, InferenceError,
    MeasurementPipeline, MockRasterizer, MockVisionModel, PageImage, PipelineConfig,
    PipelineError,
};

/// A document with a typical report summary shown as text operators.
fn report_bytes() -> Vec<u8> {
    let lines = [
        "Report Summary",
        "Total Area: 2,500 sq ft",
        "Predominant Pitch: 7/12",
        "Ridges = 100 ft",
        "Hips = 45 ft",
        "Valleys: 30 ft",
        "Eaves: 120.5 ft",
        "Chimneys: 1",
        "Skylights: 2",
        "Pipe Vents: 3",
        "7/12 pitch area: 1,800 sq ft",
        "4/12 pitch area: 700 sq ft",
    ];

    let mut bytes = b"%PDF-1.4\n1 0 obj\n<< /Type /Page >>\nBT\n".to_vec();
    for line in lines {
        bytes.extend_from_slice(format!("({}) Tj\n", line).as_bytes());
    }
    bytes.extend_from_slice(b"ET\nendobj\n%%EOF");
    bytes
}

/// The same kind of summary, but shown from inside a content stream.
fn streamed_report_bytes() -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n4 0 obj\n<< /Length 180 >>\nstream\nBT\n".to_vec();
    for line in [
        "6/12 pitch area: 1,200 sq ft",
        "10/12 pitch area: 300 sq ft",
        "Ridges = 40 ft",
        "Chimneys: 1",
    ] {
        bytes.extend_from_slice(format!("({}) Tj\n", line).as_bytes());
    }
    bytes.extend_from_slice(b"ET\nendstream\nendobj\n%%EOF");
    bytes
}

fn pages(count: u32) -> Vec<PageImage> {
    (1..=count).map(|n| PageImage::png(n, vec![n as u8; 4])).collect()
}

fn text_pipeline() -> MeasurementPipeline {
    MeasurementPipeline::new(PipelineConfig::default())
}

#[tokio::test]
async fn test_no_input_is_the_only_hard_failure() {
    let err = text_pipeline()
        .extract(ExtractionRequest::new().with_filename("report.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_text_path_recovers_labeled_values() {
    let report = text_pipeline()
        .extract(ExtractionRequest::new().with_document(report_bytes()))
        .await
        .unwrap();

    assert!(report.authentic);
    assert_eq!(report.method, ExtractionMethod::TextPattern);
    assert!(report.diagnostic.is_none());

    let record = &report.record;
    assert_eq!(record.total_area, 2500.0);
    assert_eq!(record.predominant_pitch, "7:12");
    assert_eq!(record.ridge.length, 100.0);
    assert_eq!(record.ridge.count, 5);
    assert_eq!(record.hip.count, 3);
    assert_eq!(record.valley.count, 2);
    assert_eq!(record.eave.length, 120.5);
    assert_eq!(record.eave.count, 5);
    assert_eq!(record.rake.length, 0.0);

    // 1 chimney, 2 skylights, 3 pipe vents
    assert_eq!(record.penetrations_area, 27.0);
    assert_eq!(record.penetrations_perimeter, 46.0);
    assert_eq!(record.step_flashing.length, 48.0);
    assert_eq!(record.step_flashing.count, 6);

    assert_eq!(record.areas_by_pitch["7:12"], 1800.0);
    assert_eq!(record.areas_by_pitch["4:12"], 700.0);
}

#[tokio::test]
async fn test_text_path_inside_content_stream() {
    let report = text_pipeline()
        .extract(ExtractionRequest::new().with_document(streamed_report_bytes()))
        .await
        .unwrap();

    assert!(report.authentic);
    let record = &report.record;
    assert_eq!(record.areas_by_pitch["6:12"], 1200.0);
    assert_eq!(record.areas_by_pitch["10:12"], 300.0);
    assert_eq!(record.total_area, 1500.0);
    assert_eq!(record.predominant_pitch, "6:12");
    assert_eq!(record.ridge.length, 40.0);
    assert_eq!(record.ridge.count, 2);
    assert_eq!(record.chimney_count, 1);
    assert_eq!(record.step_flashing.count, 1);
}

#[tokio::test]
async fn test_short_labelled_document_is_authentic() {
    let report = text_pipeline()
        .extract(ExtractionRequest::new().with_document(b"(Total Area: 2,500 sq ft) Tj (Ridge: 100 ft) Tj".to_vec()))
        .await
        .unwrap();

    assert!(report.authentic);
    assert_eq!(report.method, ExtractionMethod::TextPattern);
    assert_eq!(report.record.total_area, 2500.0);
    assert_eq!(report.record.ridge.count, 5);
}

#[tokio::test]
async fn test_extreme_penetration_counts_do_not_panic() {
    let report = text_pipeline()
        .extract(ExtractionRequest::new().with_document(b"(Chimneys: 4294967295 Skylights: 1 Ridge: 40 ft) Tj".to_vec()))
        .await
        .unwrap();

    assert!(report.authentic);
    assert_eq!(report.record.chimney_count, u32::MAX);
    assert_eq!(report.record.skylight_count, 1);
    assert_eq!(report.record.step_flashing.count, u32::MAX);
}

#[tokio::test]
async fn test_text_path_is_idempotent() {
    let pipeline = text_pipeline();
    let first = pipeline
        .extract(ExtractionRequest::new().with_document(report_bytes()))
        .await
        .unwrap();
    let second = pipeline
        .extract(ExtractionRequest::new().with_document(report_bytes()))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_unreadable_bytes_give_standard_simulated_record() {
    let report = text_pipeline()
        .extract(ExtractionRequest::new().with_document(vec![0x89, 0x50, 0x4E, 0x47, 0x00, 0xFF]))
        .await
        .unwrap();

    assert!(!report.authentic);
    assert_eq!(report.method, ExtractionMethod::Simulated);
    assert_eq!(report.record, simulated_record("document.pdf"));
    assert!(!report.diagnostic.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_simulated_record_follows_filename() {
    let report = text_pipeline()
        .extract(
            ExtractionRequest::new()
                .with_filename("EagleView-Daisy-1234.pdf")
                .with_document(b"garbage".to_vec()),
        )
        .await
        .unwrap();

    assert!(!report.authentic);
    assert_eq!(report.record.total_area, 3215.0);
    assert_eq!(report.record.predominant_pitch, "7:12");
}

#[tokio::test]
async fn test_vision_path_with_fenced_json() {
    let model = Arc::new(MockVisionModel::new().with_response(
        "Here you go:\n```json\n{\n  \"totalArea\": \"3,050\",\n  \"predominantPitch\": \"9/12\",\n  \"ridgeLength\": 72,\n  \"ridgeCount\": 4,\n  \"areasByPitch\": {\"9/12\": 2050, \"5:12\": 1000}\n}\n```",
    ));
    let pipeline = MeasurementPipeline::new(PipelineConfig::default()).with_vision_model(model.clone());

    let report = pipeline
        .extract(ExtractionRequest::new().with_images(pages(3)))
        .await
        .unwrap();

    assert!(report.authentic);
    assert_eq!(report.method, ExtractionMethod::Vision);
    assert_eq!(report.record.total_area, 3050.0);
    // Normalized on the way out
    assert_eq!(report.record.predominant_pitch, "9:12");
    assert_eq!(report.record.areas_by_pitch["9:12"], 2050.0);
    assert_eq!(report.record.ridge.count, 4);

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].images.len(), 3);
}

#[tokio::test]
async fn test_vision_stray_comma_is_not_authentic() {
    let model = Arc::new(MockVisionModel::new().with_response("```json\n{\"totalArea\": 2000,}\n```"));
    let pipeline = MeasurementPipeline::new(PipelineConfig::default()).with_vision_model(model);

    let report = pipeline
        .extract(
            ExtractionRequest::new()
                .with_filename("complex-roof.pdf")
                .with_images(pages(1)),
        )
        .await
        .unwrap();

    assert!(!report.authentic);
    assert_eq!(report.record, simulated_record("complex-roof.pdf"));
    assert!(report.diagnostic.unwrap().contains("unparseable"));
}

#[tokio::test]
async fn test_vision_service_error_is_not_authentic() {
    let model = Arc::new(MockVisionModel::new().with_error(InferenceError::Service {
        status: 502,
        message: "bad gateway".into(),
    }));
    let pipeline = MeasurementPipeline::new(PipelineConfig::default()).with_vision_model(model);

    let report = pipeline
        .extract(ExtractionRequest::new().with_images(pages(2)))
        .await
        .unwrap();

    assert!(!report.authentic);
    assert!(report.diagnostic.unwrap().contains("502"));
}

#[tokio::test(start_paused = true)]
async fn test_vision_timeout_is_not_authentic() {
    let model = Arc::new(
        MockVisionModel::new()
            .with_response(r#"{"totalArea": 2000}"#)
            .with_delay(Duration::from_secs(3)),
    );
    let config = PipelineConfig::default().with_inference_timeout(Duration::from_millis(500));
    let pipeline = MeasurementPipeline::new(config).with_vision_model(model);

    let report = pipeline
        .extract(ExtractionRequest::new().with_images(pages(1)))
        .await
        .unwrap();

    assert!(!report.authentic);
    assert!(report.diagnostic.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_render_pages_keeps_valid_pages_in_order() {
    let rasterizer = MockRasterizer::new(3);
    let rendered = render_pages(&rasterizer, &report_bytes(), 5, 2.0).await;

    let numbers: Vec<u32> = rendered.iter().map(|page| page.page_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(rendered[2].data, b"page-3");
}
