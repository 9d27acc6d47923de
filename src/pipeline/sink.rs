use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

/// The remote service's output for one frame.
#[derive(Debug)]
pub struct ProcessedResult {
    pub sequence: u64,
    /// JPEG bytes as returned by the transform service.
    pub image_bytes: Vec<u8>,
}

/// Holds the most recently accepted processed result.
///
/// Transform responses may complete out of order relative to when their
/// frames were sampled. The sink is the sole ordering enforcement point:
/// a result is installed only when its sequence number is strictly greater
/// than the one on display, so the displayed sequence never goes backwards.
/// Superseded results are dropped, releasing their buffers.
pub struct RenderSink {
    displayed: Mutex<Option<Arc<ProcessedResult>>>,
}

impl RenderSink {
    /// Create an empty sink with nothing displayed.
    pub fn new() -> Self {
        Self {
            displayed: Mutex::new(None),
        }
    }

    /// Install `result` if it is newer than the displayed one.
    ///
    /// Returns `true` when the result was installed, `false` when it was
    /// discarded as stale. The previously displayed buffer is released on
    /// install; a discarded result is released immediately.
    pub fn accept(&self, result: ProcessedResult) -> bool {
        let mut displayed = self.displayed.lock();
        match displayed.as_ref() {
            Some(current) if result.sequence <= current.sequence => {
                trace!(
                    "discarding stale result seq={} (displayed seq={})",
                    result.sequence,
                    current.sequence
                );
                false
            }
            _ => {
                *displayed = Some(Arc::new(result));
                true
            }
        }
    }

    /// Release the displayed resource and reset to "nothing displayed".
    /// Idempotent; called on session stop.
    pub fn clear(&self) {
        *self.displayed.lock() = None;
    }

    /// The currently displayed result — a cheap reference-counted clone.
    pub fn latest(&self) -> Option<Arc<ProcessedResult>> {
        self.displayed.lock().clone()
    }

    /// Sequence number currently on display, if any.
    pub fn displayed_sequence(&self) -> Option<u64> {
        self.displayed.lock().as_ref().map(|r| r.sequence)
    }

    /// The displayed image as a base64 `data:` URL, ready to hand to a
    /// display surface.
    pub fn latest_data_url(&self) -> Option<String> {
        use base64::Engine;
        self.latest().map(|r| {
            format!(
                "data:image/jpeg;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&r.image_bytes)
            )
        })
    }
}

impl Default for RenderSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(sequence: u64) -> ProcessedResult {
        ProcessedResult {
            sequence,
            image_bytes: vec![sequence as u8; 16],
        }
    }

    #[test]
    fn empty_sink_displays_nothing() {
        let sink = RenderSink::new();
        assert!(sink.latest().is_none());
        assert_eq!(sink.displayed_sequence(), None);
    }

    #[test]
    fn accept_installs_first_result() {
        let sink = RenderSink::new();
        assert!(sink.accept(result(1)));
        assert_eq!(sink.displayed_sequence(), Some(1));
    }

    #[test]
    fn newer_result_replaces_older() {
        let sink = RenderSink::new();
        sink.accept(result(1));
        assert!(sink.accept(result(2)));
        assert_eq!(sink.displayed_sequence(), Some(2));
        assert_eq!(sink.latest().unwrap().image_bytes[0], 2);
    }

    #[test]
    fn stale_result_is_discarded_without_redisplay() {
        let sink = RenderSink::new();
        sink.accept(result(2));
        assert!(!sink.accept(result(1)));
        assert_eq!(sink.displayed_sequence(), Some(2));
        assert_eq!(sink.latest().unwrap().image_bytes[0], 2);
    }

    #[test]
    fn equal_sequence_is_discarded() {
        let sink = RenderSink::new();
        sink.accept(result(3));
        assert!(!sink.accept(result(3)));
        assert_eq!(sink.displayed_sequence(), Some(3));
    }

    #[test]
    fn out_of_order_arrivals_display_monotonically() {
        let sink = RenderSink::new();
        // Responses arrive 2, 1, 3
        assert!(sink.accept(result(2)));
        assert!(!sink.accept(result(1)));
        assert!(sink.accept(result(3)));
        assert_eq!(sink.displayed_sequence(), Some(3));
    }

    #[test]
    fn clear_resets_to_nothing_displayed() {
        let sink = RenderSink::new();
        sink.accept(result(5));
        sink.clear();
        assert!(sink.latest().is_none());

        // After a clear, sequence numbering starts over
        assert!(sink.accept(result(1)));
        assert_eq!(sink.displayed_sequence(), Some(1));
    }

    #[test]
    fn clear_is_idempotent() {
        let sink = RenderSink::new();
        sink.clear();
        sink.clear();
        assert!(sink.latest().is_none());
    }

    #[test]
    fn latest_returns_shared_pointer() {
        let sink = RenderSink::new();
        sink.accept(result(1));

        let a = sink.latest().unwrap();
        let b = sink.latest().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn latest_data_url_encodes_jpeg_prefix() {
        let sink = RenderSink::new();
        sink.accept(ProcessedResult {
            sequence: 1,
            image_bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
        });
        let url = sink.latest_data_url().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RenderSink>();
    }
}
