use std::time::Duration;

pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// On/off signal for the alert indicator while the alarm rings.
///
/// The cadence is external: the driver calls [`toggle`](Self::toggle) once
/// per `interval`. Whenever the scheduler is not running, `visible` is true,
/// i.e. the indicator shows its normal state.
#[derive(Clone, Debug)]
pub struct BlinkScheduler {
    visible: bool,
    active: bool,
    interval: Duration,
}

impl Default for BlinkScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_INTERVAL)
    }
}

impl BlinkScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            visible: true,
            active: false,
            interval,
        }
    }

    pub fn start(&mut self) {
        self.visible = true;
        self.active = true;
    }

    /// Flip the signal. Ignored unless started.
    pub fn toggle(&mut self) -> bool {
        if self.active {
            self.visible = !self.visible;
        }
        self.visible
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_ignored_until_started() {
        let mut blink = BlinkScheduler::default();
        assert_eq!(blink.interval(), Duration::from_millis(500));
        assert!(blink.is_visible());
        assert!(blink.toggle());
        assert!(blink.toggle());
        assert!(!blink.is_active());
    }

    #[test]
    fn test_toggle_alternates() {
        let mut blink = BlinkScheduler::new(Duration::from_millis(250));
        blink.start();
        assert!(blink.is_visible());
        assert!(!blink.toggle());
        assert!(blink.toggle());
        assert!(!blink.toggle());
    }

    #[test]
    fn test_stop_always_restores_visible() {
        for toggles in 0..6 {
            let mut blink = BlinkScheduler::default();
            blink.start();
            for _ in 0..toggles {
                blink.toggle();
            }
            blink.stop();
            assert!(blink.is_visible(), "after {} toggles", toggles);
            assert!(!blink.is_active());
            // Late toggle from the cadence must not leave it hidden
            blink.toggle();
            assert!(blink.is_visible());
        }
    }

    #[test]
    fn test_restart_begins_visible() {
        let mut blink = BlinkScheduler::default();
        blink.start();
        blink.toggle();
        assert!(!blink.is_visible());
        blink.start();
        assert!(blink.is_visible());
    }
}
