use std::time::Instant;

use crate::config::Config;
use crate::daily_reset::{apply_daily_reset, Clock};
use crate::error::Result;
use crate::record::{Link, SessionRecord, Task};
use crate::runtime::SecondClock;
use crate::session::SessionState;
use crate::store::RecordStore;
use crate::timer::{TimerEngine, TimerEvent, TimerMode};

/// Owns the session record and the countdown, and saves after every
/// mutation except note edits.
pub struct Controller<S: RecordStore> {
    session: SessionState,
    timer: TimerEngine,
    clock: SecondClock,
    store: S,
    config: Config,
}

impl<S: RecordStore> Controller<S> {
    /// Loads the record and applies the daily reset before anything can read
    /// the session counter
    pub fn open(store: S, date_source: &impl Clock, config: Config) -> Self {
        let mut record = store.load();
        apply_daily_reset(&mut record, date_source);
        let timer = TimerEngine::new(TimerMode::Focus, config.minutes_for(TimerMode::Focus));
        Self {
            session: SessionState::new(record),
            timer,
            clock: SecondClock::default(),
            store,
            config,
        }
    }

    pub fn with_clock(mut self, clock: SecondClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn record(&self) -> &SessionRecord {
        self.session.record()
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> &[Task] {
        self.session.tasks()
    }

    pub fn links(&self) -> &[Link] {
        self.session.links()
    }

    pub fn sessions_completed(&self) -> u32 {
        self.session.sessions_completed()
    }

    pub fn save(&self) {
        self.store.save(self.session.record());
    }

    // --- timer intents ---

    pub fn start_timer(&mut self, now: Instant) {
        if let Some(ticket) = self.timer.start() {
            log::debug!("timer started: {} {}", self.timer.mode(), self.timer.formatted());
            self.clock.arm(ticket, now);
        }
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause();
        self.clock.disarm();
    }

    pub fn toggle_timer(&mut self, now: Instant) {
        if self.timer.is_running() {
            self.pause_timer();
        } else {
            self.start_timer(now);
        }
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.clock.disarm();
    }

    pub fn set_mode(&mut self, mode: TimerMode) {
        self.set_mode_minutes(mode, self.config.minutes_for(mode));
    }

    pub fn set_mode_minutes(&mut self, mode: TimerMode, minutes: u32) {
        self.timer.set_mode(mode, minutes);
        self.clock.disarm();
        log::info!("mode set to {mode} ({} min)", self.timer.total_seconds() / 60);
    }

    /// Fires every tick that came due by `now`. Returns the expiry event, if any.
    pub fn advance(&mut self, now: Instant) -> Option<TimerEvent> {
        while let Some(ticket) = self.clock.poll(now) {
            if let Some(event) = self.timer.fire(ticket) {
                self.clock.disarm();
                return Some(self.on_expired(event));
            }
            if !self.timer.is_running() {
                self.clock.disarm();
                break;
            }
        }
        None
    }

    /// Instant of the next countdown tick while the timer runs
    pub fn next_tick_due(&self) -> Option<Instant> {
        self.clock.next_due()
    }

    /// Delivers one tick directly, bypassing the wall clock
    pub fn tick(&mut self) -> Option<TimerEvent> {
        let event = self.timer.tick()?;
        self.clock.disarm();
        Some(self.on_expired(event))
    }

    fn on_expired(&mut self, event: TimerEvent) -> TimerEvent {
        if event == TimerEvent::SessionComplete {
            self.session.increment_session_count();
            self.save();
        }
        log::info!(
            "{} (sessions today: {})",
            event.message(),
            self.session.sessions_completed()
        );
        event
    }

    // --- session intents ---

    pub fn add_task(&mut self, text: &str) -> bool {
        let added = self.session.add_task(text);
        if added {
            self.save();
        }
        added
    }

    pub fn remove_task(&mut self, index: usize) -> Result<Task> {
        let task = self.session.remove_task(index)?;
        self.save();
        Ok(task)
    }

    pub fn set_task_completed(&mut self, index: usize, value: bool) -> Result<()> {
        self.session.set_task_completed(index, value)?;
        self.save();
        Ok(())
    }

    pub fn toggle_task(&mut self, index: usize) -> Result<bool> {
        let completed = self.session.toggle_task(index)?;
        self.save();
        Ok(completed)
    }

    pub fn add_link(&mut self, name: &str, url: &str) -> Result<Link> {
        let link = self.session.add_link(name, url)?.clone();
        self.save();
        Ok(link)
    }

    pub fn remove_link(&mut self, index: usize) -> Result<Link> {
        let link = self.session.remove_link(index)?;
        self.save();
        Ok(link)
    }

    /// Captures the notes text without saving; the caller decides when
    pub fn set_notes(&mut self, text: impl Into<String>) {
        self.session.set_notes(text);
    }

    /// Captures the notes text and persists the whole record
    pub fn commit_notes(&mut self, text: impl Into<String>) {
        self.session.set_notes(text);
        self.save();
    }

    pub fn increment_session_count(&mut self) {
        self.session.increment_session_count();
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily_reset::FixedClock;
    use crate::error::ZenError;
    use crate::store::MemoryRecordStore;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn today() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn stored(sessions: u32, last_date: &str) -> MemoryRecordStore {
        MemoryRecordStore::with_record(SessionRecord {
            sessions_completed: sessions,
            last_date: last_date.into(),
            ..SessionRecord::default()
        })
    }

    fn short_config() -> Config {
        Config {
            focus_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 2,
            ..Config::default()
        }
    }

    #[test]
    fn open_resets_counter_on_new_day() {
        let ctl = Controller::open(stored(5, "2024-01-01"), &today(), Config::default());
        assert_eq!(ctl.sessions_completed(), 0);
        assert_eq!(ctl.record().last_date, "2024-06-01");
    }

    #[test]
    fn open_keeps_counter_on_same_day() {
        let ctl = Controller::open(stored(5, "2024-06-01"), &today(), Config::default());
        assert_eq!(ctl.sessions_completed(), 5);
    }

    #[test]
    fn open_starts_in_focus_mode() {
        let ctl = Controller::open(MemoryRecordStore::default(), &today(), Config::default());
        assert_eq!(ctl.timer().mode(), TimerMode::Focus);
        assert_eq!(ctl.timer().remaining_seconds(), 25 * 60);
        assert!(!ctl.timer().is_running());
    }

    #[test]
    fn focus_expiry_counts_once_and_saves() {
        let mut ctl = Controller::open(stored(2, "2024-06-01"), &today(), short_config());
        ctl.start_timer(Instant::now());
        let events: Vec<TimerEvent> = (0..60).filter_map(|_| ctl.tick()).collect();
        assert_eq!(events, vec![TimerEvent::SessionComplete]);
        assert_eq!(ctl.sessions_completed(), 3);
        assert_eq!(ctl.store().last_saved().unwrap().sessions_completed, 3);
        assert!(!ctl.timer().is_running());
        assert_eq!(ctl.timer().remaining_seconds(), 60);
    }

    #[test]
    fn break_expiry_does_not_count() {
        let mut ctl = Controller::open(stored(2, "2024-06-01"), &today(), short_config());
        ctl.set_mode(TimerMode::ShortBreak);
        ctl.start_timer(Instant::now());
        let events: Vec<TimerEvent> = (0..60).filter_map(|_| ctl.tick()).collect();
        assert_eq!(events, vec![TimerEvent::BreakOver]);
        assert_eq!(ctl.sessions_completed(), 2);
        assert_eq!(ctl.store().save_count(), 0);
    }

    #[test]
    fn advance_follows_wall_time() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), short_config());
        let t0 = Instant::now();
        ctl.start_timer(t0);
        assert_eq!(ctl.advance(t0 + Duration::from_millis(2500)), None);
        assert_eq!(ctl.timer().remaining_seconds(), 58);
        assert_eq!(
            ctl.advance(t0 + Duration::from_secs(60)),
            Some(TimerEvent::SessionComplete)
        );
        assert_eq!(ctl.sessions_completed(), 1);
        assert_eq!(ctl.timer().remaining_seconds(), 60);
        // no leftover ticks once expired
        assert_eq!(ctl.advance(t0 + Duration::from_secs(120)), None);
        assert_eq!(ctl.timer().remaining_seconds(), 60);
    }

    #[test]
    fn pause_stops_wall_time_ticks() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), short_config());
        let t0 = Instant::now();
        ctl.start_timer(t0);
        ctl.advance(t0 + Duration::from_secs(5));
        ctl.pause_timer();
        ctl.advance(t0 + Duration::from_secs(50));
        assert_eq!(ctl.timer().remaining_seconds(), 55);

        ctl.toggle_timer(t0 + Duration::from_secs(50));
        ctl.advance(t0 + Duration::from_secs(51));
        assert_eq!(ctl.timer().remaining_seconds(), 54);
    }

    #[test]
    fn next_tick_due_only_while_running() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), short_config());
        assert_eq!(ctl.next_tick_due(), None);

        let t0 = Instant::now();
        ctl.start_timer(t0);
        assert_eq!(ctl.next_tick_due(), Some(t0 + Duration::from_secs(1)));
        ctl.advance(t0 + Duration::from_secs(3));
        assert_eq!(ctl.next_tick_due(), Some(t0 + Duration::from_secs(4)));

        ctl.pause_timer();
        assert_eq!(ctl.next_tick_due(), None);

        ctl.start_timer(t0 + Duration::from_secs(10));
        ctl.advance(t0 + Duration::from_secs(70));
        assert!(!ctl.timer().is_running());
        assert_eq!(ctl.next_tick_due(), None);
    }

    #[test]
    fn mode_change_cancels_pending_ticks() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), short_config());
        let t0 = Instant::now();
        ctl.start_timer(t0);
        ctl.set_mode(TimerMode::LongBreak);
        ctl.advance(t0 + Duration::from_secs(30));
        assert_eq!(ctl.timer().remaining_seconds(), 120);
        assert_eq!(ctl.timer().mode(), TimerMode::LongBreak);
    }

    #[test]
    fn reset_timer_rewinds() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), short_config());
        let t0 = Instant::now();
        ctl.start_timer(t0);
        ctl.advance(t0 + Duration::from_secs(10));
        ctl.reset_timer();
        ctl.advance(t0 + Duration::from_secs(20));
        assert_eq!(ctl.timer().remaining_seconds(), 60);
        assert!(!ctl.timer().is_running());
    }

    #[test]
    fn each_mutation_saves_immediately() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), Config::default());
        assert!(ctl.add_task("one"));
        assert!(!ctl.add_task(""));
        ctl.toggle_task(0).unwrap();
        ctl.set_task_completed(0, false).unwrap();
        ctl.add_link("Docs", "docs.rs").unwrap();
        ctl.remove_link(0).unwrap();
        ctl.remove_task(0).unwrap();
        assert_eq!(ctl.store().save_count(), 6);
    }

    #[test]
    fn rejected_intents_do_not_save() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), Config::default());
        assert_matches!(ctl.remove_task(0), Err(ZenError::IndexOutOfRange { .. }));
        assert_matches!(ctl.add_link("", "x"), Err(ZenError::Validation(_)));
        assert_matches!(ctl.toggle_task(3), Err(ZenError::IndexOutOfRange { .. }));
        assert_eq!(ctl.store().save_count(), 0);
    }

    #[test]
    fn notes_are_saved_only_on_commit() {
        let mut ctl = Controller::open(MemoryRecordStore::default(), &today(), Config::default());
        ctl.set_notes("draft");
        assert_eq!(ctl.store().save_count(), 0);
        ctl.commit_notes("final");
        assert_eq!(ctl.store().last_saved().unwrap().notes_content, "final");
    }
}
