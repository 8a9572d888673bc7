//! Pure countdown and alarm logic with no platform dependencies.
//! Testable on host, driven by whatever event loop owns it.

mod alarm;
mod blink;

pub use alarm::{AlarmClock, AlarmState, Transition};
pub use blink::{BlinkScheduler, DEFAULT_BLINK_INTERVAL};

use std::cell::Cell;
use std::ops::{Add, Sub};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point in time with whole-second granularity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Instant(i64);

impl Instant {
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> i64 {
        self.0
    }
}

impl Add<i64> for Instant {
    type Output = Instant;

    fn add(self, secs: i64) -> Instant {
        Instant(self.0.saturating_add(secs))
    }
}

impl Sub for Instant {
    type Output = i64;

    /// Signed seconds from `rhs` to `self`.
    fn sub(self, rhs: Instant) -> i64 {
        self.0.saturating_sub(rhs.0)
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Wall clock, seconds since the UNIX epoch.
///
/// Wall time keeps advancing while the machine is suspended, which is what a
/// countdown to a real-world moment wants.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Instant(i64::try_from(secs).unwrap_or(i64::MAX))
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn set(&self, now: Instant) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Format seconds as "HH:MM:SS". Hours keep counting past 23.
pub fn format_hms(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_arithmetic() {
        let a = Instant::from_secs(100);
        assert_eq!((a + 25).as_secs(), 125);
        assert_eq!((a + -150).as_secs(), -50);
        assert_eq!(Instant::from_secs(130) - a, 30);
        assert_eq!(a - Instant::from_secs(130), -30);
    }

    #[test]
    fn test_instant_saturates() {
        let far = Instant::from_secs(i64::MAX - 1);
        assert_eq!((far + 10).as_secs(), i64::MAX);
        assert_eq!((Instant::from_secs(i64::MIN + 1) + i64::MIN).as_secs(), i64::MIN);
        assert_eq!(Instant::from_secs(i64::MIN) - Instant::from_secs(1), i64::MIN);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(Instant::from_secs(50));
        assert_eq!(clock.now(), Instant::from_secs(50));
        clock.advance(3);
        assert_eq!(clock.now(), Instant::from_secs(53));
        clock.set(Instant::from_secs(7));
        assert_eq!((&clock).now(), Instant::from_secs(7));
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > Instant::from_secs(1_577_836_800));
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }
}
