//! Integration tests for scans run on the background worker

use image::{Rgb, RgbImage, imageops};
use screen_qr::capture::{FrameScreen, SelectorEvent};
use screen_qr::export::MemoryClipboard;
use screen_qr::render::RenderOptions;
use screen_qr::{ECLevel, Point, ScanCoordinator, ScanPipeline, ScanReport, generate};
use std::time::Duration;

fn screen_showing(text: &str) -> (FrameScreen, u32) {
    let symbol = generate(text, ECLevel::M, RenderOptions::default()).unwrap();
    let side = symbol.export.width() + 100;
    let mut frame = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));
    imageops::replace(&mut frame, &symbol.export, 50, 50);
    (FrameScreen::with_origin(frame, Point::new(-200, 0)), side)
}

#[test]
fn test_worker_reports_decoded_text() {
    let (screen, side) = screen_showing("from the worker");
    let side = side as i32;
    let events = vec![
        SelectorEvent::PointerDown(Point::new(-195, 5)),
        SelectorEvent::PointerMove(Point::new(-200 + side - 5, side - 5)),
        SelectorEvent::PointerUp(Point::new(-200 + side - 5, side - 5)),
    ];
    let pipeline = ScanPipeline::new(screen);

    let mut coordinator = ScanCoordinator::new();
    let rx = coordinator.trigger(move || pipeline.run(events)).unwrap();
    let report = rx.recv_timeout(Duration::from_secs(30)).unwrap();
    coordinator.join();

    assert_eq!(report, ScanReport::Decoded("from the worker".into()));
    assert!(!coordinator.is_scanning());
}

#[test]
fn test_decoded_report_is_copied_to_clipboard() {
    let (screen, side) = screen_showing("copy me ✓");
    let side = side as i32;
    let events = vec![
        SelectorEvent::PointerDown(Point::new(-195, 5)),
        SelectorEvent::PointerUp(Point::new(-200 + side - 5, side - 5)),
    ];
    let pipeline = ScanPipeline::new(screen);

    let mut coordinator = ScanCoordinator::new();
    let rx = coordinator.trigger(move || pipeline.run(events)).unwrap();
    let report = rx.recv_timeout(Duration::from_secs(30)).unwrap();
    coordinator.join();

    let mut clipboard = MemoryClipboard::new();
    assert!(report.copy_decoded(&mut clipboard).unwrap());
    assert_eq!(clipboard.text_string().as_deref(), Some("copy me ✓"));
    assert_eq!(clipboard.text.as_ref().and_then(|t| t.last()), Some(&0));
}

#[test]
fn test_cancelled_and_rejected_selections() {
    let (screen, _) = screen_showing("never read");
    let pipeline = ScanPipeline::new(screen);

    // a too-small drag re-arms the selector; Esc then cancels
    let events = vec![
        SelectorEvent::PointerDown(Point::new(-190, 10)),
        SelectorEvent::PointerUp(Point::new(-185, 14)),
        SelectorEvent::Cancel,
    ];
    let mut coordinator = ScanCoordinator::new();
    let rx = coordinator.trigger(move || pipeline.run(events)).unwrap();
    let report = rx.recv().unwrap();
    assert_eq!(report, ScanReport::Cancelled);
    assert_eq!(rx.recv().ok(), None);
    coordinator.join();

    let mut clipboard = MemoryClipboard::new();
    assert!(!report.copy_decoded(&mut clipboard).unwrap());
    assert!(clipboard.text.is_none());
}

#[test]
fn test_not_found_report_message() {
    let screen = FrameScreen::new(RgbImage::from_pixel(300, 300, Rgb([255, 255, 255])));
    let pipeline = ScanPipeline::new(screen);
    let events = vec![
        SelectorEvent::PointerDown(Point::new(10, 10)),
        SelectorEvent::PointerUp(Point::new(250, 250)),
    ];
    let mut coordinator = ScanCoordinator::new();
    let report = coordinator
        .trigger(move || pipeline.run(events))
        .unwrap()
        .recv()
        .unwrap();
    coordinator.join();
    assert_eq!(
        report.message(),
        Some(
            "No QR code found in the selected region. Make sure the capture is sharp and \
             complete."
        )
    );
}
