use std::time::Duration;

const ONE_SEC: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock not running, or untimed.
    Idle,
    Ticked(u32),
    /// Reached zero on this call. Reported once; the clock is stopped afterwards.
    Expired,
}

/// One-second countdown for a level.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    state: ClockState,
    untimed: bool,
    carry: Duration,
}

impl Countdown {
    pub fn new(untimed: bool) -> Self {
        Self {
            remaining: 0,
            state: ClockState::Stopped,
            untimed,
            carry: Duration::ZERO,
        }
    }

    pub fn start(&mut self, secs: u32) {
        self.remaining = secs;
        self.carry = Duration::ZERO;
        self.state = ClockState::Running;
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.carry = Duration::ZERO;
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_untimed(&self) -> bool {
        self.untimed
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != ClockState::Running || self.untimed {
            return TickOutcome::Idle;
        }
        self.take(1)
    }

    /// Accumulate frame time and return how many whole seconds passed.
    pub fn elapse(&mut self, dt: Duration) -> u32 {
        if self.state != ClockState::Running {
            return 0;
        }
        self.carry += dt;
        let mut secs = 0;
        while self.carry >= ONE_SEC {
            self.carry -= ONE_SEC;
            secs += 1;
        }
        secs
    }

    /// Extra time from a power-up.
    pub fn add(&mut self, secs: u32) {
        self.remaining = self.remaining.saturating_add(secs);
    }

    /// Remove time, e.g. for a wrong answer. Never goes below zero.
    pub fn penalize(&mut self, secs: u32) -> TickOutcome {
        if self.untimed || self.state == ClockState::Stopped {
            return TickOutcome::Idle;
        }
        self.take(secs)
    }

    fn take(&mut self, secs: u32) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(secs);
        if self.remaining == 0 {
            self.stop();
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked(self.remaining)
        }
    }
}
