//! Countdown engine for focus and break sessions.
//!
//! The engine owns no clock. Whoever drives it asks for a [`TickTicket`] on
//! `start` and fires it once per elapsed second; any start/pause/reset/mode
//! change moves the generation on, so tickets issued before it are ignored.

use serde::{Deserialize, Serialize};

pub const SECS_PER_MINUTE: u32 = 60;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum TimerMode {
    #[strum(to_string = "Focus")]
    Focus,
    #[strum(to_string = "Short Break")]
    ShortBreak,
    #[strum(to_string = "Long Break")]
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];
}

/// What the countdown reports when it runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    SessionComplete,
    BreakOver,
}

impl TimerEvent {
    pub fn message(&self) -> &'static str {
        match self {
            TimerEvent::SessionComplete => "Focus session complete!",
            TimerEvent::BreakOver => "Break over!",
        }
    }
}

/// Observable phase of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Permission to deliver one tick for the run that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: TimerMode,
    total_seconds: u32,
    remaining_seconds: u32,
    running: bool,
    generation: u64,
}

impl TimerEngine {
    pub fn new(mode: TimerMode, minutes: u32) -> Self {
        let total_seconds = minutes_to_secs(minutes);
        Self {
            mode,
            total_seconds,
            remaining_seconds: total_seconds,
            running: false,
            generation: 0,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else if self.remaining_seconds == self.total_seconds {
            TimerPhase::Idle
        } else {
            TimerPhase::Paused
        }
    }

    /// Starts or resumes the countdown. Returns the ticket for the next tick,
    /// or `None` if the engine was already running.
    pub fn start(&mut self) -> Option<TickTicket> {
        if self.running || self.remaining_seconds == 0 {
            return None;
        }
        self.running = true;
        self.generation += 1;
        Some(self.ticket())
    }

    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            self.generation += 1;
        }
    }

    /// Start when stopped, pause when running
    pub fn toggle(&mut self) -> Option<TickTicket> {
        if self.running {
            self.pause();
            None
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.total_seconds;
        self.generation += 1;
    }

    /// Switches mode and duration, then resets. Zero minutes is treated as one.
    pub fn set_mode(&mut self, mode: TimerMode, minutes: u32) {
        self.mode = mode;
        self.total_seconds = minutes_to_secs(minutes);
        self.reset();
    }

    /// Delivers one tick if the ticket still belongs to the current run
    pub fn fire(&mut self, ticket: TickTicket) -> Option<TimerEvent> {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping stale tick (ticket gen {}, current {})",
                ticket.generation,
                self.generation
            );
            return None;
        }
        self.tick()
    }

    /// One elapsed second. A no-op unless running; on reaching zero the
    /// engine stops, reports the event, and rewinds to the full duration.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running || self.remaining_seconds == 0 {
            return None;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds > 0 {
            return None;
        }

        self.running = false;
        let event = match self.mode {
            TimerMode::Focus => TimerEvent::SessionComplete,
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerEvent::BreakOver,
        };
        self.reset();
        Some(event)
    }

    /// Fraction of the countdown still remaining, 1.0 when full
    pub fn progress(&self) -> f64 {
        self.remaining_seconds as f64 / self.total_seconds as f64
    }

    pub fn formatted(&self) -> String {
        format_time(self.remaining_seconds)
    }

    fn ticket(&self) -> TickTicket {
        TickTicket {
            generation: self.generation,
        }
    }
}

fn minutes_to_secs(minutes: u32) -> u32 {
    minutes.max(1).saturating_mul(SECS_PER_MINUTE)
}

pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
