//! # Scan Assembler
//!
//! Turns a stream of timed key events back into discrete scans.
//!
//! ## Burst Detection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  scanner:  F──P──-──1──2──3──4──5──6──7──8──-──9──⏎                     │
//! │            └─ every gap well under 50ms ─┘        └─► completed scan    │
//! │                                                                         │
//! │  human:    F ........ P ........ 1 ⏎                                    │
//! │              > 50ms gap resets the buffer; Enter on a short buffer      │
//! │              discards it                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two signals separate a scan from a person typing:
//! 1. **Inter-key gap**: hardware scanners emit keys a few milliseconds
//!    apart. A gap above [`INTER_KEY_WINDOW`] starts a fresh buffer.
//! 2. **Length at Enter**: a completed buffer must be longer than
//!    [`MIN_SCAN_LENGTH`] characters; anything shorter is typing noise.
//!
//! Timestamps come from the caller, so the assembler itself is a pure
//! state machine - tests drive it with paused tokio time.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use foodpass_core::MIN_SCAN_LENGTH;

/// Maximum gap between two key events of the same burst.
pub const INTER_KEY_WINDOW: Duration = Duration::from_millis(50);

/// One input event on the scan surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character.
    Char(char),
    /// The burst terminator every wedge scanner sends.
    Enter,
}

/// Reassembles timed key events into scans.
///
/// One assembler per input surface; it is plain mutable state, not shared,
/// so there is nothing to lock.
#[derive(Debug)]
pub struct ScanAssembler {
    buffer: String,
    last_key: Option<Instant>,
    inter_key_window: Duration,
}

impl Default for ScanAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanAssembler {
    pub fn new() -> Self {
        ScanAssembler {
            buffer: String::new(),
            last_key: None,
            inter_key_window: INTER_KEY_WINDOW,
        }
    }

    /// Overrides the inter-key window (some older scanners are slower).
    pub fn inter_key_window(mut self, window: Duration) -> Self {
        self.inter_key_window = window;
        self
    }

    /// Feeds one event. Returns the completed scan text when `event` is an
    /// Enter that terminates a plausible burst; `None` otherwise.
    pub fn push(&mut self, event: KeyEvent, at: Instant) -> Option<String> {
        match event {
            KeyEvent::Char(c) => {
                // A slow gap means the previous characters were typing, not
                // the start of this burst.
                if let Some(last) = self.last_key {
                    if at.duration_since(last) > self.inter_key_window {
                        trace!(stale = %self.buffer, "inter-key gap exceeded, starting fresh burst");
                        self.buffer.clear();
                    }
                }
                self.buffer.push(c);
                self.last_key = Some(at);
                None
            }
            KeyEvent::Enter => {
                let burst_ok = self
                    .last_key
                    .is_some_and(|last| at.duration_since(last) <= self.inter_key_window);
                let completed = std::mem::take(&mut self.buffer);
                self.last_key = None;

                if burst_ok && completed.len() > MIN_SCAN_LENGTH {
                    debug!(len = completed.len(), "scan completed");
                    Some(completed)
                } else {
                    trace!(len = completed.len(), "discarding short or stale buffer");
                    None
                }
            }
        }
    }

    /// Completes a buffered scan whose terminator never arrived.
    ///
    /// Some scanners ship with the Enter suffix disabled. Callers poll this
    /// after a quiet period: once the gap since the last key exceeds the
    /// inter-key window, a plausible buffer is released as a scan and a
    /// short one is discarded as typing.
    pub fn flush_if_idle(&mut self, at: Instant) -> Option<String> {
        let Some(last) = self.last_key else {
            return None;
        };
        if at.duration_since(last) <= self.inter_key_window {
            return None;
        }

        let completed = std::mem::take(&mut self.buffer);
        self.last_key = None;

        if completed.len() > MIN_SCAN_LENGTH {
            debug!(len = completed.len(), "idle flush completed a scan");
            Some(completed)
        } else {
            trace!(len = completed.len(), "idle flush discarded typing");
            None
        }
    }

    /// Current buffer length, for diagnostics.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{self, Duration};

    async fn type_burst(asm: &mut ScanAssembler, text: &str, gap: Duration) -> Option<String> {
        for c in text.chars() {
            assert!(asm.push(KeyEvent::Char(c), Instant::now()).is_none());
            time::advance(gap).await;
        }
        asm.push(KeyEvent::Enter, Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_burst_completes() {
        let mut asm = ScanAssembler::new();
        let scan = type_burst(&mut asm, "FP-12345678-9", Duration::from_millis(5)).await;
        assert_eq!(scan.as_deref(), Some("FP-12345678-9"));
        assert_eq!(asm.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_burst_is_discarded() {
        let mut asm = ScanAssembler::new();
        // Five characters: at the threshold, not over it.
        let scan = type_burst(&mut asm, "12345", Duration::from_millis(5)).await;
        assert_eq!(scan, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_typing_resets_the_buffer() {
        let mut asm = ScanAssembler::new();

        // A human types a few characters slowly...
        for c in "FP-".chars() {
            asm.push(KeyEvent::Char(c), Instant::now());
            time::advance(Duration::from_millis(200)).await;
        }
        // ...then the scanner fires a real burst on the same surface.
        let scan = type_burst(&mut asm, "12345678-9", Duration::from_millis(5)).await;

        // The slow prefix must not contaminate the scan: every 200ms gap
        // evicted what came before, so only the burst text survives.
        assert_eq!(scan.as_deref(), Some("12345678-9"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_long_after_burst_is_stale() {
        let mut asm = ScanAssembler::new();
        for c in "FP-12345678-9".chars() {
            asm.push(KeyEvent::Char(c), Instant::now());
            time::advance(Duration::from_millis(5)).await;
        }

        // The operator walks away; Enter arrives much later by accident.
        time::advance(Duration::from_secs(2)).await;
        assert_eq!(asm.push(KeyEvent::Enter, Instant::now()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_on_empty_buffer_is_noise() {
        let mut asm = ScanAssembler::new();
        assert_eq!(asm.push(KeyEvent::Enter, Instant::now()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_scans() {
        let mut asm = ScanAssembler::new();

        let first = type_burst(&mut asm, "FP-12345678-9", Duration::from_millis(5)).await;
        assert_eq!(first.as_deref(), Some("FP-12345678-9"));

        // The next worker scans seconds later; the assembler starts clean.
        time::advance(Duration::from_secs(3)).await;
        let second = type_burst(&mut asm, "FP-98765432-1", Duration::from_millis(5)).await;
        assert_eq!(second.as_deref(), Some("FP-98765432-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_flush_without_terminator() {
        // Scanner configured without the Enter suffix.
        let mut asm = ScanAssembler::new();
        for c in "FP-12345678-9".chars() {
            asm.push(KeyEvent::Char(c), Instant::now());
            time::advance(Duration::from_millis(5)).await;
        }

        // Still inside the window: nothing to flush yet.
        assert_eq!(asm.flush_if_idle(Instant::now()), None);

        time::advance(Duration::from_millis(100)).await;
        assert_eq!(
            asm.flush_if_idle(Instant::now()).as_deref(),
            Some("FP-12345678-9")
        );

        // A short leftover is typing, not a scan.
        for c in "123".chars() {
            asm.push(KeyEvent::Char(c), Instant::now());
        }
        time::advance(Duration::from_millis(100)).await;
        assert_eq!(asm.flush_if_idle(Instant::now()), None);
        assert_eq!(asm.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_window() {
        let mut asm = ScanAssembler::new().inter_key_window(Duration::from_millis(300));

        // 200ms gaps would reset the default assembler; a widened window
        // accepts them.
        let scan = type_burst(&mut asm, "FP-12345678-9", Duration::from_millis(200)).await;
        assert_eq!(scan.as_deref(), Some("FP-12345678-9"));
    }
}
