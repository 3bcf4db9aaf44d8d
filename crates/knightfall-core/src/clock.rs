//! Round clock and tick accounting for a single Knightfall round.
//!
//! The clock is the single source of truth for the round's temporal state.
//! An external periodic source drives it once per interval; the clock maps
//! the raw tick counter to the *observed* tick value `v` that the phase
//! machine keys every transition on.
//!
//! # Design Principles
//!
//! - The raw counter increases strictly monotonically; the skip offset is
//!   only ever added, so observed ticks never decrease or reorder.
//! - The skip is a one-shot fast-forward through the waiting phase. It
//!   offsets all subsequent observed ticks without resetting the real
//!   cadence of the driving interval.
//! - All tick arithmetic is checked (no silent overflow).

use std::time::Duration;

/// Tick bias subtracted when computing the skip offset, so the player
/// still sees the last few countdown seconds before the knights arm.
/// Empirically tuned for feel; preserve as-is.
const SKIP_BIAS: u64 = 3;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The speed multiplier cannot produce a tick interval.
    #[error("invalid speed multiplier: {value} (must be finite and positive)")]
    InvalidSpeed {
        /// The rejected multiplier.
        value: f64,
    },
}

/// Compute the tick interval for a speed multiplier.
///
/// The base cadence is one tick per second; the multiplier compresses it
/// proportionally (`1000 / speed_multiplier` milliseconds).
///
/// # Errors
///
/// Returns [`ClockError::InvalidSpeed`] if the multiplier is not finite
/// or not strictly positive.
pub fn tick_interval(speed_multiplier: f64) -> Result<Duration, ClockError> {
    if !speed_multiplier.is_finite() || speed_multiplier <= 0.0 {
        return Err(ClockError::InvalidSpeed {
            value: speed_multiplier,
        });
    }
    Ok(Duration::from_secs_f64(1.0 / speed_multiplier))
}

/// Clock for one round: raw tick counter plus the one-shot skip offset.
///
/// The observed tick `v` returned by [`next_tick`](Self::next_tick) is
/// `raw + skip`. While no skip is set the clock also records how many
/// ticks have elapsed since the round started, which the skip formula
/// needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundClock {
    /// Raw ticks delivered by the external interval (0-indexed).
    raw: u64,

    /// Offset added to every observed tick once a skip is requested.
    skip_ticks: u64,

    /// Raw ticks seen before the skip was requested.
    ticks_since_start: u64,

    /// The observed tick at which the first hazards arm (the phase
    /// machine's `start` constant).
    start: u64,
}

impl RoundClock {
    /// Create a clock for a round whose first-mechanic tick is `start`.
    pub const fn new(start: u64) -> Self {
        Self {
            raw: 0,
            skip_ticks: 0,
            ticks_since_start: 0,
            start,
        }
    }

    /// Consume the next raw tick and return the observed tick value `v`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if either counter would exceed
    /// `u64::MAX`.
    pub fn next_tick(&mut self) -> Result<u64, ClockError> {
        let observed = self
            .raw
            .checked_add(self.skip_ticks)
            .ok_or(ClockError::TickOverflow)?;
        if self.skip_ticks == 0 {
            self.ticks_since_start = self.raw;
        }
        self.raw = self.raw.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(observed)
    }

    /// Request the one-shot fast-forward through the waiting phase.
    ///
    /// Sets the skip offset to `max(start - ticks_since_start - SKIP_BIAS, 0)`
    /// and returns it. A second request has no further effect and returns
    /// the offset already in place.
    pub const fn skip_to_first_mechanic(&mut self) -> u64 {
        if self.skip_ticks == 0 {
            self.skip_ticks = self
                .start
                .saturating_sub(self.ticks_since_start)
                .saturating_sub(SKIP_BIAS);
        }
        self.skip_ticks
    }

    /// The skip offset currently in effect (0 when none was requested).
    pub const fn skip_ticks(&self) -> u64 {
        self.skip_ticks
    }

    /// Raw ticks observed before any skip was requested.
    pub const fn ticks_since_start(&self) -> u64 {
        self.ticks_since_start
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ticks_start_at_zero_and_increase() {
        let mut clock = RoundClock::new(23);
        assert_eq!(clock.next_tick().unwrap(), 0);
        assert_eq!(clock.next_tick().unwrap(), 1);
        assert_eq!(clock.next_tick().unwrap(), 2);
    }

    #[test]
    fn skip_offsets_all_subsequent_ticks() {
        let mut clock = RoundClock::new(23);
        for _ in 0..5 {
            let _ = clock.next_tick().unwrap();
        }
        // ticks_since_start == 4, so the offset is 23 - 4 - 3 = 16.
        let offset = clock.skip_to_first_mechanic();
        assert_eq!(offset, 16);
        assert_eq!(clock.next_tick().unwrap(), 5 + 16);
        assert_eq!(clock.next_tick().unwrap(), 6 + 16);
    }

    #[test]
    fn skip_is_one_shot() {
        let mut clock = RoundClock::new(23);
        let _ = clock.next_tick().unwrap();
        let first = clock.skip_to_first_mechanic();
        let second = clock.skip_to_first_mechanic();
        assert_eq!(first, second);
    }

    #[test]
    fn skip_never_negative() {
        let mut clock = RoundClock::new(23);
        // Advance past start - SKIP_BIAS; the offset saturates at 0.
        for _ in 0..30 {
            let _ = clock.next_tick().unwrap();
        }
        assert_eq!(clock.skip_to_first_mechanic(), 0);
    }

    #[test]
    fn observed_ticks_monotonic_across_skip() {
        let mut clock = RoundClock::new(23);
        let mut previous = clock.next_tick().unwrap();
        for i in 0..40 {
            if i == 7 {
                let _ = clock.skip_to_first_mechanic();
            }
            let v = clock.next_tick().unwrap();
            assert!(v > previous);
            previous = v;
        }
    }

    #[test]
    fn interval_scales_with_multiplier() {
        assert_eq!(tick_interval(1.0).unwrap(), Duration::from_secs(1));
        assert_eq!(tick_interval(2.0).unwrap(), Duration::from_millis(500));
        assert_eq!(tick_interval(4.0).unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_multipliers_are_rejected() {
        assert!(tick_interval(0.0).is_err());
        assert!(tick_interval(-1.0).is_err());
        assert!(tick_interval(f64::NAN).is_err());
        assert!(tick_interval(f64::INFINITY).is_err());
    }
}
