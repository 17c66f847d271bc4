use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn other(self) -> Phase {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }
}

/// Emitted by [`Pomodoro::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The countdown hit zero; the timer stopped and loaded `next`.
    PhaseEnded { finished: Phase, next: Phase },
}

/// Work/break countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Pomodoro {
    work: Duration,
    rest: Duration,
    phase: Phase,
    remaining: Duration,
    running: bool,
}

impl Pomodoro {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        let work = minutes(work_minutes);
        Pomodoro {
            work,
            rest: minutes(break_minutes),
            phase: Phase::Work,
            remaining: work,
            running: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start or pause
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Stop, go back to the work phase with its full duration
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining = self.work;
    }

    /// Change durations. A stopped timer reloads its current phase.
    pub fn set_durations(&mut self, work_minutes: u32, break_minutes: u32) {
        self.work = minutes(work_minutes);
        self.rest = minutes(break_minutes);
        if !self.running {
            self.remaining = self.duration_of(self.phase);
        }
    }

    /// Count down by `elapsed` while running.
    pub fn tick(&mut self, elapsed: Duration) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if !self.remaining.is_zero() {
            return None;
        }
        let finished = self.phase;
        self.running = false;
        self.phase = finished.other();
        self.remaining = self.duration_of(self.phase);
        Some(TimerEvent::PhaseEnded {
            finished,
            next: self.phase,
        })
    }

    fn duration_of(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Work => self.work,
            Phase::Break => self.rest,
        }
    }
}

impl fmt::Display for Pomodoro {
    /// `mm:ss`, rounding partial seconds up
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.remaining.as_millis();
        let secs = millis.div_ceil(1000);
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}
