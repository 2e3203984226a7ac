//! Loading indicator with a minimum display time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Visibility flag for a "loading" overlay.
///
/// Once shown, [`hide`](Self::hide) waits until the indicator has been
/// visible for at least `min_display` so fast batches do not flicker.
#[derive(Debug)]
pub struct LoadingIndicator {
    min_display: Duration,
    shown_at: Mutex<Option<Instant>>,
    visible: AtomicBool,
}

impl LoadingIndicator {
    #[must_use]
    pub fn new(min_display: Duration) -> Self {
        Self {
            min_display,
            shown_at: Mutex::new(None),
            visible: AtomicBool::new(false),
        }
    }

    pub fn show(&self) {
        *self.shown_at.lock() = Some(Instant::now());
        self.visible.store(true, Ordering::Release);
    }

    pub async fn hide(&self) {
        let shown_at = *self.shown_at.lock();
        if let Some(shown_at) = shown_at {
            let remaining = self.min_display.saturating_sub(shown_at.elapsed());
            if !remaining.is_zero() {
                tokio::time::sleep(remaining).await;
            }
        }
        *self.shown_at.lock() = None;
        self.visible.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn min_display(&self) -> Duration {
        self.min_display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn hide_waits_for_minimum_display() {
        let indicator = LoadingIndicator::new(Duration::from_millis(3000));
        indicator.show();
        assert!(indicator.is_visible());

        let started = Instant::now();
        indicator.hide().await;
        assert!(!indicator.is_visible());
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn hide_without_show_returns_immediately() {
        let indicator = LoadingIndicator::new(Duration::from_secs(60));
        indicator.hide().await;
        assert!(!indicator.is_visible());
    }
}
