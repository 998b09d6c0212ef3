//! Scan orchestration
//!
//! [`ScanPipeline`] runs selection, capture and decode synchronously.
//! [`ScanCoordinator`] runs one pipeline job at a time on a worker thread
//! and hands its result back over a one-shot channel.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use log::{info, warn};

use crate::capture::pipeline::{ScreenSource, capture_region};
use crate::capture::selector::{SelectionOutcome, SelectorEvent, run_selection};
use crate::decoder::{DecodeHints, Decoder, RqrrDecoder};
use crate::error::{ExportError, ScanError, panic_message};
use crate::export::ClipboardSink;
use crate::models::Rect;

/// Prefix for failures nobody anticipated
pub const UNEXPECTED_ERROR_PREFIX: &str = "Unexpected error during scan: ";

/// What the user is shown once a scan ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    /// Decoded text
    Decoded(String),
    /// The selection was cancelled; nothing to show
    Cancelled,
    /// Human-readable failure
    Failed(String),
}

impl ScanReport {
    /// Flatten a typed scan result into a report
    pub fn from_result(result: Result<Option<String>, ScanError>) -> Self {
        match result {
            Ok(Some(text)) => ScanReport::Decoded(text),
            Ok(None) => ScanReport::Cancelled,
            Err(err) => ScanReport::Failed(err.to_string()),
        }
    }

    /// Text to display, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            ScanReport::Decoded(text) | ScanReport::Failed(text) => Some(text),
            ScanReport::Cancelled => None,
        }
    }

    /// Put decoded text on `clipboard`.
    ///
    /// `Ok(true)` once copied; cancelled and failed reports leave the
    /// clipboard untouched and return `Ok(false)`.
    pub fn copy_decoded<C>(&self, clipboard: &mut C) -> Result<bool, ExportError>
    where
        C: ClipboardSink + ?Sized,
    {
        match self {
            ScanReport::Decoded(text) => {
                clipboard.set_text(text)?;
                info!("Decoded text copied to clipboard");
                Ok(true)
            }
            ScanReport::Cancelled | ScanReport::Failed(_) => Ok(false),
        }
    }
}

/// Selection, capture and decode wired together
#[derive(Debug, Clone)]
pub struct ScanPipeline<S, D = RqrrDecoder> {
    source: S,
    decoder: D,
    hints: DecodeHints,
}

impl<S: ScreenSource> ScanPipeline<S> {
    /// Pipeline over `source` with the default decoder
    pub fn new(source: S) -> Self {
        Self::with_decoder(source, RqrrDecoder)
    }
}

impl<S: ScreenSource, D: Decoder> ScanPipeline<S, D> {
    /// Pipeline over `source` with a specific decoder
    pub fn with_decoder(source: S, decoder: D) -> Self {
        Self {
            source,
            decoder,
            hints: DecodeHints::default(),
        }
    }

    /// Replace the decoder hints
    pub fn hints(mut self, hints: DecodeHints) -> Self {
        self.hints = hints;
        self
    }

    /// Screen being scanned
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Capture and decode an already validated rectangle
    pub fn scan_region(&self, rect: Rect) -> Result<String, ScanError> {
        let buffer = capture_region(&self.source, rect)?;
        self.decoder.decode(&buffer, &self.hints).into_result()
    }

    /// Drive a selection from `events`, then capture and decode it.
    ///
    /// `Ok(None)` when the selection was cancelled.
    pub fn run<I>(&self, events: I) -> Result<Option<String>, ScanError>
    where
        I: IntoIterator<Item = SelectorEvent>,
    {
        match run_selection(events) {
            SelectionOutcome::Completed(rect) => self.scan_region(rect).map(Some),
            SelectionOutcome::Cancelled => {
                info!("Scan cancelled by user");
                Ok(None)
            }
        }
    }
}

/// Clears the in-progress flag when the worker's job is over
struct InProgressGuard(Arc<AtomicBool>);

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// At most one scan in flight
#[derive(Debug, Default)]
pub struct ScanCoordinator {
    in_progress: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ScanCoordinator {
    /// Idle coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a job is running
    pub fn is_scanning(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Start `job` on a fresh worker thread.
    ///
    /// Returns `None`, and does nothing else, while another scan is in
    /// progress. Otherwise the previous worker is joined first and the
    /// returned receiver yields exactly one report.
    pub fn trigger<F>(&mut self, job: F) -> Option<Receiver<ScanReport>>
    where
        F: FnOnce() -> Result<Option<String>, ScanError> + Send + 'static,
    {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Scan already in progress; trigger dropped");
            return None;
        }

        if let Some(previous) = self.worker.take() {
            if previous.join().is_err() {
                warn!("Previous scan worker terminated abnormally");
            }
        }

        let (tx, rx) = mpsc::sync_channel(1);
        let flag = Arc::clone(&self.in_progress);
        let spawned = thread::Builder::new()
            .name("scan-worker".to_string())
            .spawn(move || {
                let report = {
                    let _guard = InProgressGuard(flag);
                    match panic::catch_unwind(AssertUnwindSafe(job)) {
                        Ok(result) => ScanReport::from_result(result),
                        Err(payload) => ScanReport::Failed(format!(
                            "{}{}",
                            UNEXPECTED_ERROR_PREFIX,
                            panic_message(payload.as_ref())
                        )),
                    }
                };
                if tx.send(report).is_err() {
                    warn!("Scan result dropped: receiver is gone");
                }
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Some(rx)
            }
            Err(e) => {
                self.in_progress.store(false, Ordering::Release);
                warn!("Could not start scan worker: {}", e);
                None
            }
        }
    }

    /// Wait for the current worker, if any
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Scan worker terminated abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::screen::FrameScreen;
    use crate::error::CaptureError;
    use crate::export::MemoryClipboard;
    use crate::models::Point;
    use image::{Rgb, RgbImage};
    use std::time::Duration;

    fn drag(l: i32, t: i32, r: i32, b: i32) -> Vec<SelectorEvent> {
        vec![
            SelectorEvent::PointerDown(Point::new(l, t)),
            SelectorEvent::PointerMove(Point::new(r, b)),
            SelectorEvent::PointerUp(Point::new(r, b)),
        ]
    }

    #[test]
    fn test_report_messages() {
        assert_eq!(
            ScanReport::from_result(Ok(Some("hi".into()))).message(),
            Some("hi")
        );
        assert_eq!(ScanReport::from_result(Ok(None)), ScanReport::Cancelled);
        let not_found = ScanReport::from_result(Err(ScanError::NotFound));
        assert_eq!(
            not_found.message(),
            Some(
                "No QR code found in the selected region. Make sure the capture is sharp and \
                 complete."
            )
        );
        let library = ScanReport::from_result(Err(ScanError::Library("bad grid".into())));
        assert_eq!(library.message(), Some("Recognition error: bad grid"));
    }

    #[test]
    fn test_only_decoded_reports_reach_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert!(!ScanReport::Cancelled.copy_decoded(&mut clipboard).unwrap());
        let failed = ScanReport::Failed("Recognition error: x".into());
        assert!(!failed.copy_decoded(&mut clipboard).unwrap());
        assert!(clipboard.text.is_none());

        let decoded = ScanReport::Decoded("https://example.com".into());
        assert!(decoded.copy_decoded(&mut clipboard).unwrap());
        assert_eq!(clipboard.text_string().as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_pipeline_cancel_and_blank_capture() {
        let screen = FrameScreen::new(RgbImage::from_pixel(200, 200, Rgb([255, 255, 255])));
        let pipeline = ScanPipeline::new(screen);
        assert_eq!(pipeline.run([SelectorEvent::Cancel]), Ok(None));
        assert_eq!(pipeline.run(drag(10, 10, 120, 120)), Err(ScanError::NotFound));
    }

    #[test]
    fn test_pipeline_offscreen_selection() {
        let screen = FrameScreen::new(RgbImage::new(100, 100));
        let pipeline = ScanPipeline::new(screen);
        assert_eq!(
            pipeline.scan_region(Rect::new(300, 300, 400, 400)),
            Err(ScanError::Capture(CaptureError::ZeroArea))
        );
    }

    #[test]
    fn test_second_trigger_is_dropped() {
        let mut coordinator = ScanCoordinator::new();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let first = coordinator
            .trigger(move || {
                release_rx.recv().ok();
                Ok(Some("first".to_string()))
            })
            .unwrap();
        assert!(coordinator.is_scanning());

        let ran_second = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran_second);
        let second = coordinator.trigger(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(None)
        });
        assert!(second.is_none());

        release_tx.send(()).unwrap();
        assert_eq!(
            first.recv_timeout(Duration::from_secs(10)).unwrap(),
            ScanReport::Decoded("first".into())
        );
        assert!(!ran_second.load(Ordering::SeqCst));
        assert!(!coordinator.is_scanning());

        // the slot is free again once the report has arrived
        let third = coordinator.trigger(|| Ok(None)).unwrap();
        assert_eq!(third.recv().unwrap(), ScanReport::Cancelled);
        coordinator.join();
    }

    #[test]
    fn test_worker_panic_becomes_report() {
        let mut coordinator = ScanCoordinator::new();
        let rx = coordinator
            .trigger(|| panic!("decoder exploded"))
            .unwrap();
        let report = rx.recv().unwrap();
        assert_eq!(
            report,
            ScanReport::Failed("Unexpected error during scan: decoder exploded".into())
        );
        assert!(!coordinator.is_scanning());
        assert!(coordinator.trigger(|| Ok(None)).is_some());
        coordinator.join();
    }
}
