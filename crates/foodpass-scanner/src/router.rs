//! # Scan Router
//!
//! Dispatches completed scans to whichever part of the station claims them.
//!
//! ## Interceptor Hook
//! The default destination for a scan is the registration handler, via a
//! channel. But sometimes another surface needs the very next scan - a
//! worker-enrollment form capturing a new badge, for instance. Such a
//! surface registers an interceptor; every completed scan is offered to it
//! first, and only unclaimed scans reach the channel.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  completed scan ──► interceptor registered?                             │
//! │                        │yes                │no                          │
//! │                        ▼                   ▼                            │
//! │                  claims it? ──no──► mpsc channel ──► registration       │
//! │                        │yes                              handler        │
//! │                        ▼                                                │
//! │                 Routed::Intercepted (scan consumed by the surface)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// An interceptor gets first refusal of each scan; returning `true` claims
/// it and keeps it away from the registration handler.
pub type Interceptor = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Where a scan ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Claimed by the registered interceptor.
    Intercepted,
    /// Delivered to the registration channel.
    Forwarded,
}

/// Routing failures.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The registration handler dropped its receiver.
    #[error("Registration channel closed")]
    ChannelClosed,
}

/// Routes completed scans, interceptor first.
pub struct ScanRouter {
    sender: mpsc::Sender<String>,
    interceptor: Mutex<Option<Interceptor>>,
}

impl ScanRouter {
    /// Creates a router and the receiving end for the registration handler.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            ScanRouter {
                sender,
                interceptor: Mutex::new(None),
            },
            receiver,
        )
    }

    /// Registers the interceptor, replacing any previous one.
    pub fn set_interceptor(&self, interceptor: Interceptor) {
        if let Ok(mut slot) = self.interceptor.lock() {
            *slot = Some(interceptor);
        }
    }

    /// Removes the interceptor; scans flow to the channel again.
    pub fn clear_interceptor(&self) {
        if let Ok(mut slot) = self.interceptor.lock() {
            *slot = None;
        }
    }

    /// Routes one completed scan.
    pub async fn route(&self, scan: String) -> Result<Routed, RouteError> {
        // The lock is held only for the callback; interceptors are expected
        // to be cheap (capture the text, flip a flag).
        let claimed = match self.interceptor.lock() {
            Ok(slot) => slot.as_ref().is_some_and(|i| i(&scan)),
            Err(_) => false,
        };

        if claimed {
            debug!(len = scan.len(), "scan claimed by interceptor");
            return Ok(Routed::Intercepted);
        }

        self.sender
            .send(scan)
            .await
            .map_err(|_| RouteError::ChannelClosed)?;
        Ok(Routed::Forwarded)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_forwarded_without_interceptor() {
        let (router, mut rx) = ScanRouter::new(4);

        let routed = router.route("FP-12345678-9".to_string()).await.unwrap();
        assert_eq!(routed, Routed::Forwarded);
        assert_eq!(rx.recv().await.as_deref(), Some("FP-12345678-9"));
    }

    #[tokio::test]
    async fn test_interceptor_gets_first_refusal() {
        let (router, mut rx) = ScanRouter::new(4);
        let captured = Arc::new(Mutex::new(Vec::new()));

        let sink = captured.clone();
        router.set_interceptor(Box::new(move |scan| {
            sink.lock().unwrap().push(scan.to_string());
            true
        }));

        let routed = router.route("FP-12345678-9".to_string()).await.unwrap();
        assert_eq!(routed, Routed::Intercepted);
        assert_eq!(captured.lock().unwrap().as_slice(), ["FP-12345678-9"]);

        // After clearing, scans reach the channel again.
        router.clear_interceptor();
        let routed = router.route("FP-98765432-1".to_string()).await.unwrap();
        assert_eq!(routed, Routed::Forwarded);
        assert_eq!(rx.recv().await.as_deref(), Some("FP-98765432-1"));
    }

    #[tokio::test]
    async fn test_declining_interceptor_forwards() {
        let (router, mut rx) = ScanRouter::new(4);
        let offered = Arc::new(AtomicUsize::new(0));

        let counter = offered.clone();
        router.set_interceptor(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        }));

        let routed = router.route("FP-12345678-9".to_string()).await.unwrap();
        assert_eq!(routed, Routed::Forwarded);
        assert_eq!(offered.load(Ordering::SeqCst), 1);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_closed_channel_is_an_error() {
        let (router, rx) = ScanRouter::new(4);
        drop(rx);

        let err = router.route("FP-12345678-9".to_string()).await.unwrap_err();
        assert!(matches!(err, RouteError::ChannelClosed));
    }
}
