use crate::{Clock, Instant, SystemClock};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlarmState {
    Idle,
    Armed { target: Instant },
    Alarming { target: Instant, rang_at: Instant },
}

/// State before and after an operation. Equal when nothing changed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Transition {
    pub from: AlarmState,
    pub to: AlarmState,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }

    pub fn entered_alarming(&self) -> bool {
        !matches!(self.from, AlarmState::Alarming { .. })
            && matches!(self.to, AlarmState::Alarming { .. })
    }

    pub fn left_alarming(&self) -> bool {
        matches!(self.from, AlarmState::Alarming { .. })
            && !matches!(self.to, AlarmState::Alarming { .. })
    }
}

/// Single countdown to an absolute target time.
///
/// Remaining time is always `target - now`, never a counter decremented per
/// tick, so missed or late ticks cannot make the countdown drift.
pub struct AlarmClock<C: Clock = SystemClock> {
    clock: C,
    state: AlarmState,
}

impl AlarmClock<SystemClock> {
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> AlarmClock<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: AlarmState::Idle,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Move the target by `delta_secs`, starting from now when idle.
    pub fn adjust(&mut self, delta_secs: i64) -> Transition {
        let now = self.clock.now();
        self.adjust_at(delta_secs, now)
    }

    /// Armed rebases off the current target. Alarming counts as an implicit
    /// cancel, so the new countdown starts from `now`. A target at or before
    /// `now` disarms without ringing.
    ///
    /// An armed target that already elapsed without a tick rings first and
    /// the adjustment is dropped.
    pub fn adjust_at(&mut self, delta_secs: i64, now: Instant) -> Transition {
        if let AlarmState::Armed { target } = self.state {
            if target <= now {
                return self.tick(now);
            }
        }
        let base = match self.state {
            AlarmState::Armed { target } => target,
            AlarmState::Idle | AlarmState::Alarming { .. } => now,
        };
        let target = base + delta_secs;
        let next = if target <= now {
            AlarmState::Idle
        } else {
            AlarmState::Armed { target }
        };
        self.transition(next)
    }

    /// The only path into `Alarming`. No-op unless armed.
    pub fn tick(&mut self, now: Instant) -> Transition {
        match self.state {
            AlarmState::Armed { target } if target - now <= 0 => {
                self.transition(AlarmState::Alarming { target, rang_at: now })
            }
            _ => self.transition(self.state),
        }
    }

    /// Back to idle from anywhere. The only way out of `Alarming`.
    pub fn cancel(&mut self) -> Transition {
        self.transition(AlarmState::Idle)
    }

    pub fn remaining(&self) -> Option<u64> {
        self.remaining_at(self.clock.now())
    }

    /// Whole seconds left, `None` unless armed. Never negative.
    pub fn remaining_at(&self, now: Instant) -> Option<u64> {
        match self.state {
            AlarmState::Armed { target } => Some((target - now).max(0) as u64),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<Instant> {
        match self.state {
            AlarmState::Idle => None,
            AlarmState::Armed { target } | AlarmState::Alarming { target, .. } => Some(target),
        }
    }

    pub fn rang_at(&self) -> Option<Instant> {
        match self.state {
            AlarmState::Alarming { rang_at, .. } => Some(rang_at),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == AlarmState::Idle
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, AlarmState::Armed { .. })
    }

    pub fn is_alarming(&self) -> bool {
        matches!(self.state, AlarmState::Alarming { .. })
    }

    fn transition(&mut self, to: AlarmState) -> Transition {
        let from = self.state;
        self.state = to;
        if from != to {
            log::debug!("alarm {:?} -> {:?}", from, to);
        }
        Transition { from, to }
    }
}
