//! Time providers and per-graph frame accounting.
//!
//! - [`Clock`] - Time provider, mockable for testing
//! - [`FrameClock`] - Frame delta and elapsed time for one running graph,
//!   frozen while the graph is paused
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use arbor_core::{Clock, FrameClock};
//!
//! let mut frames = FrameClock::new(Clock::system());
//!
//! frames.advance_by(Duration::from_millis(16));
//! frames.pause();
//! frames.advance_by(Duration::from_millis(16));
//! frames.resume();
//! frames.advance_by(Duration::from_millis(20));
//!
//! assert_eq!(frames.elapsed(), Duration::from_millis(36));
//! assert_eq!(frames.frame(), 2);
//! ```

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for providing current time.
///
/// Implement this for custom time providers (e.g., a host engine's frame
/// timer, or a mock clock for testing).
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// System clock provider using `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Time provider handle.
///
/// Uses the system clock by default. Cloning shares the provider.
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl Clock {
    /// Creates a Clock using the system clock.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a Clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the duration elapsed since the given instant.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameClock
// ─────────────────────────────────────────────────────────────────────────────

/// Frame time accounting for a single running graph.
///
/// The graph calls [`advance`](Self::advance) once at the start of every
/// tick. While paused the clock reports a zero delta and does not accumulate
/// elapsed time, so timers driven by it resume exactly where they stopped.
#[derive(Debug, Clone)]
pub struct FrameClock {
    clock: Clock,
    last: Option<Instant>,
    delta: Duration,
    elapsed: Duration,
    frame: u64,
    paused: bool,
}

impl FrameClock {
    /// Creates a frame clock reading from the given clock.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            last: None,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame: 0,
            paused: false,
        }
    }

    /// Starts a new frame and returns its delta.
    ///
    /// The first frame after creation, reset or resume has a zero delta.
    pub fn advance(&mut self) -> Duration {
        if self.paused {
            self.delta = Duration::ZERO;
            return self.delta;
        }
        let now = self.clock.now();
        self.delta = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        self.elapsed += self.delta;
        self.frame += 1;
        self.delta
    }

    /// Starts a new frame with a host-supplied delta.
    ///
    /// Useful when the host engine already measures frame time.
    pub fn advance_by(&mut self, delta: Duration) -> Duration {
        if self.paused {
            self.delta = Duration::ZERO;
            return self.delta;
        }
        self.delta = delta;
        self.last = Some(self.clock.now());
        self.elapsed += delta;
        self.frame += 1;
        self.delta
    }

    /// Freezes time accounting.
    pub fn pause(&mut self) {
        self.paused = true;
        self.last = None;
        self.delta = Duration::ZERO;
    }

    /// Resumes time accounting. The time spent paused is not counted.
    pub fn resume(&mut self) {
        self.paused = false;
        self.last = None;
    }

    /// Resets elapsed time and the frame counter.
    pub fn reset(&mut self) {
        self.last = None;
        self.delta = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.frame = 0;
        self.paused = false;
    }

    /// Returns the delta of the current frame.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Returns the accumulated unpaused time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the number of frames advanced while unpaused.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns whether the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Clock::system())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock for testing with controllable time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use arbor_core::{Clock, MockClock};
///
/// let mock = Arc::new(MockClock::new(Instant::now()));
/// let clock = Clock::with_provider(mock.clone());
/// let start = clock.now();
///
/// mock.advance(Duration::from_secs(60));
/// assert_eq!(clock.elapsed_since(start), Duration::from_secs(60));
/// ```
#[cfg(any(test, feature = "test-utils"))]
pub struct MockClock {
    current: RwLock<Instant>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given instant.
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mocked() -> (Arc<MockClock>, FrameClock) {
        let mock = Arc::new(MockClock::new(Instant::now()));
        let frames = FrameClock::new(Clock::with_provider(mock.clone()));
        (mock, frames)
    }

    #[test]
    fn clock_default_uses_system_time() {
        let clock = Clock::default();
        let before = Instant::now();
        let clock_now = clock.now();
        let after = Instant::now();

        assert!(clock_now >= before);
        assert!(clock_now <= after);
    }

    #[test]
    fn mock_clock_advance() {
        let mock = MockClock::new(Instant::now());
        let initial = mock.current();

        mock.advance(Duration::from_secs(60));

        assert_eq!(mock.current().duration_since(initial), Duration::from_secs(60));
    }

    #[test]
    fn first_frame_has_zero_delta() {
        let (mock, mut frames) = mocked();
        mock.advance(Duration::from_secs(5));

        assert_eq!(frames.advance(), Duration::ZERO);
        assert_eq!(frames.frame(), 1);
    }

    #[test]
    fn frames_accumulate_elapsed_time() {
        let (mock, mut frames) = mocked();
        frames.advance();
        mock.advance(Duration::from_millis(10));
        frames.advance();
        mock.advance(Duration::from_millis(20));
        frames.advance();

        assert_eq!(frames.delta(), Duration::from_millis(20));
        assert_eq!(frames.elapsed(), Duration::from_millis(30));
        assert_eq!(frames.frame(), 3);
    }

    #[test]
    fn paused_time_is_not_counted() {
        let (mock, mut frames) = mocked();
        frames.advance();
        mock.advance(Duration::from_millis(10));
        frames.advance();

        frames.pause();
        mock.advance(Duration::from_secs(30));
        assert_eq!(frames.advance(), Duration::ZERO);
        assert_eq!(frames.frame(), 2);

        frames.resume();
        frames.advance();
        mock.advance(Duration::from_millis(5));
        frames.advance();

        assert_eq!(frames.elapsed(), Duration::from_millis(15));
    }

    #[test]
    fn advance_by_uses_host_delta() {
        let (_mock, mut frames) = mocked();
        frames.advance_by(Duration::from_millis(16));
        frames.advance_by(Duration::from_millis(16));

        assert_eq!(frames.elapsed(), Duration::from_millis(32));

        frames.pause();
        assert_eq!(frames.advance_by(Duration::from_millis(16)), Duration::ZERO);
        assert_eq!(frames.elapsed(), Duration::from_millis(32));
    }

    #[test]
    fn reset_clears_accounting() {
        let (mock, mut frames) = mocked();
        frames.advance();
        mock.advance(Duration::from_millis(10));
        frames.advance();
        frames.pause();

        frames.reset();

        assert_eq!(frames.elapsed(), Duration::ZERO);
        assert_eq!(frames.frame(), 0);
        assert!(!frames.is_paused());
    }
}
