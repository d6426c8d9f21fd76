//! User activity tracking.
//!
//! [`ActivityTracker`] keeps the time of the last user-originated interaction.
//! In the browser, [`ActivityListeners`] feeds it from passive window listeners
//! for as long as the guard is alive.

use crate::client::clock::Clock;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing;

/// DOM event kinds that count as user activity.
pub const ACTIVITY_EVENTS: [&str; 5] = ["click", "keydown", "mousemove", "scroll", "touchstart"];

/// Records the time of the last user interaction.
///
/// The timestamp never moves backwards: a reading older than the stored one is ignored.
pub struct ActivityTracker {
    clock: Rc<dyn Clock>,
    last_activity_ms: Cell<u64>,
}

impl ActivityTracker {
    /// Creates a tracker that treats construction time as the last interaction.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            last_activity_ms: Cell::new(now),
        }
    }

    /// Marks "now" as the last interaction.
    pub fn record(&self) {
        let now = self.clock.now_ms();
        if now > self.last_activity_ms.get() {
            self.last_activity_ms.set(now);
        }
    }

    /// Time of the last interaction in epoch milliseconds.
    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms.get()
    }

    /// Milliseconds elapsed since the last interaction.
    pub fn idle_duration_ms(&self) -> u64 {
        self.clock
            .now_ms()
            .saturating_sub(self.last_activity_ms.get())
    }

    /// Time elapsed since the last interaction.
    pub fn idle_duration(&self) -> Duration {
        Duration::from_millis(self.idle_duration_ms())
    }

    /// Returns true if the last interaction happened within `window`.
    pub fn is_recent(&self, window: Duration) -> bool {
        self.idle_duration() <= window
    }

    /// Current reading of the tracker's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

/// Passive window listeners feeding an [`ActivityTracker`].
///
/// Every listener is removed when the guard is dropped.
#[cfg(target_arch = "wasm32")]
pub struct ActivityListeners {
    window: web_sys::Window,
    callback: wasm_bindgen::closure::Closure<dyn FnMut()>,
}

#[cfg(target_arch = "wasm32")]
impl ActivityListeners {
    /// Attaches listeners for every kind in [`ACTIVITY_EVENTS`].
    ///
    /// Returns `None` when there is no window (e.g. in a worker).
    pub fn attach(tracker: Rc<ActivityTracker>) -> Option<Self> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        let window = web_sys::window()?;
        let callback = Closure::<dyn FnMut()>::new(move || tracker.record());

        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(true);

        for event in ACTIVITY_EVENTS {
            if let Err(e) = window.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            ) {
                tracing::warn!("Failed to attach '{}' activity listener: {:?}", event, e);
            }
        }

        tracing::trace!("Attached {} activity listeners", ACTIVITY_EVENTS.len());
        Some(Self { window, callback })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ActivityListeners {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;

        for event in ACTIVITY_EVENTS {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, self.callback.as_ref().unchecked_ref());
        }
        tracing::trace!("Detached activity listeners");
    }
}

/// Non-WASM stand-in: there is no DOM to listen to.
#[cfg(not(target_arch = "wasm32"))]
pub struct ActivityListeners;

#[cfg(not(target_arch = "wasm32"))]
impl ActivityListeners {
    /// Non-WASM stub for attach; always returns `None`.
    pub fn attach(_tracker: Rc<ActivityTracker>) -> Option<Self> {
        tracing::trace!("Activity listeners skipped (non-WASM)");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::clock::ManualClock;

    fn tracker_at(start_ms: u64) -> (Rc<ManualClock>, ActivityTracker) {
        let clock = Rc::new(ManualClock::new(start_ms));
        let tracker = ActivityTracker::new(clock.clone());
        (clock, tracker)
    }

    #[test]
    fn test_idle_is_zero_right_after_activity() {
        let (clock, tracker) = tracker_at(10_000);
        clock.advance(Duration::from_secs(30));
        tracker.record();

        assert_eq!(tracker.idle_duration_ms(), 0);
    }

    #[test]
    fn test_idle_grows_until_next_event() {
        let (clock, tracker) = tracker_at(10_000);
        let mut previous = tracker.idle_duration_ms();

        for _ in 0..5 {
            clock.advance(Duration::from_millis(700));
            let idle = tracker.idle_duration_ms();
            assert!(idle > previous);
            previous = idle;
        }
        assert_eq!(previous, 3_500);

        tracker.record();
        assert_eq!(tracker.idle_duration_ms(), 0);
    }

    #[test]
    fn test_timestamp_never_moves_backwards() {
        let (clock, tracker) = tracker_at(50_000);
        clock.set(20_000);
        tracker.record();

        assert_eq!(tracker.last_activity_ms(), 50_000);
        // Clock behind the stored instant reads as zero idle time
        assert_eq!(tracker.idle_duration_ms(), 0);
    }

    #[test]
    fn test_is_recent_uses_inclusive_window() {
        let (clock, tracker) = tracker_at(0);
        clock.advance(Duration::from_secs(15));
        assert!(tracker.is_recent(Duration::from_secs(15)));

        clock.advance(Duration::from_millis(1));
        assert!(!tracker.is_recent(Duration::from_secs(15)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_attach_is_noop_natively() {
        let (_clock, tracker) = tracker_at(0);
        assert!(ActivityListeners::attach(Rc::new(tracker)).is_none());
    }
}
