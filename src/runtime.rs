use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::timer::TickTicket;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ZenEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait ZenEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<ZenEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ZenEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                // key release events show up on some platforms; count presses only
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    if tx.send(ZenEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(ZenEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("terminal event reader stopped: {e}");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ZenEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ZenEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<ZenEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ZenEvent>) -> Self {
        Self { rx }
    }
}

impl ZenEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ZenEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: ZenEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ZenEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> ZenEvent {
        self.wait(self.ticker.interval())
    }

    /// Like `step`, but wakes no later than `due` so a countdown tick is
    /// delivered on its second boundary instead of up to one interval late
    pub fn step_until(&self, due: Option<Instant>, now: Instant) -> ZenEvent {
        let interval = self.ticker.interval();
        let timeout = due.map_or(interval, |due| {
            due.saturating_duration_since(now).min(interval)
        });
        self.wait(timeout)
    }

    fn wait(&self, timeout: Duration) -> ZenEvent {
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => ZenEvent::Tick,
        }
    }
}

/// Turns wall time into countdown ticks. Armed with the ticket from
/// `TimerEngine::start`, it yields that ticket once per whole period elapsed.
#[derive(Debug, Clone)]
pub struct SecondClock {
    period: Duration,
    armed: Option<(TickTicket, Instant)>,
}

impl SecondClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            armed: None,
        }
    }

    /// Schedules the first tick one period after `now`
    pub fn arm(&mut self, ticket: TickTicket, now: Instant) {
        self.armed = Some((ticket, now + self.period));
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// When the next tick comes due, if armed
    pub fn next_due(&self) -> Option<Instant> {
        self.armed.map(|(_, due)| due)
    }

    /// Returns the ticket if a tick came due by `now`, moving the deadline
    /// one period forward. Call repeatedly to drain several overdue ticks.
    pub fn poll(&mut self, now: Instant) -> Option<TickTicket> {
        let (ticket, due) = self.armed.as_mut()?;
        if now < *due {
            return None;
        }
        *due += self.period;
        Some(*ticket)
    }
}

impl Default for SecondClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TimerEngine, TimerMode};
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            ZenEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(ZenEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            ZenEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn step_until_wakes_at_the_countdown_deadline() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_secs(30)),
        );

        let now = Instant::now();
        let started = Instant::now();
        assert!(matches!(runner.step_until(Some(now), now), ZenEvent::Tick));
        assert!(started.elapsed() < Duration::from_secs(5));

        // a deadline already in the past does not block either
        let past = now.checked_sub(Duration::from_secs(1)).unwrap_or(now);
        assert!(matches!(runner.step_until(Some(past), now), ZenEvent::Tick));
    }

    #[test]
    fn step_until_still_passes_events_through() {
        let (tx, rx) = mpsc::channel();
        tx.send(ZenEvent::Resize).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );
        let now = Instant::now();
        assert!(matches!(
            runner.step_until(Some(now + Duration::from_secs(1)), now),
            ZenEvent::Resize
        ));
    }

    #[test]
    fn next_due_follows_arm_poll_and_disarm() {
        let mut engine = TimerEngine::new(TimerMode::Focus, 1);
        let ticket = engine.start().unwrap();
        let t0 = Instant::now();
        let mut clock = SecondClock::default();
        assert_eq!(clock.next_due(), None);

        clock.arm(ticket, t0);
        assert_eq!(clock.next_due(), Some(t0 + Duration::from_secs(1)));
        clock.poll(t0 + Duration::from_secs(1));
        assert_eq!(clock.next_due(), Some(t0 + Duration::from_secs(2)));
        clock.disarm();
        assert_eq!(clock.next_due(), None);
    }

    #[test]
    fn clock_waits_a_full_period() {
        let mut engine = TimerEngine::new(TimerMode::Focus, 1);
        let ticket = engine.start().unwrap();
        let t0 = Instant::now();
        let mut clock = SecondClock::default();
        clock.arm(ticket, t0);

        assert_eq!(clock.poll(t0), None);
        assert_eq!(clock.poll(t0 + Duration::from_millis(999)), None);
        assert_eq!(clock.poll(t0 + Duration::from_secs(1)), Some(ticket));
        assert_eq!(clock.poll(t0 + Duration::from_millis(1500)), None);
    }

    #[test]
    fn clock_drains_overdue_ticks_one_at_a_time() {
        let mut engine = TimerEngine::new(TimerMode::Focus, 1);
        let ticket = engine.start().unwrap();
        let t0 = Instant::now();
        let mut clock = SecondClock::default();
        clock.arm(ticket, t0);

        let late = t0 + Duration::from_millis(3200);
        let mut fired = 0;
        while clock.poll(late).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
    }

    #[test]
    fn disarmed_clock_yields_nothing() {
        let mut engine = TimerEngine::new(TimerMode::Focus, 1);
        let ticket = engine.start().unwrap();
        let t0 = Instant::now();
        let mut clock = SecondClock::default();
        clock.arm(ticket, t0);
        clock.disarm();
        assert!(!clock.is_armed());
        assert_eq!(clock.poll(t0 + Duration::from_secs(10)), None);
    }
}
