use std::time::{Duration, Instant};

use crate::rates::{recompute, RateCard};
use crate::schedule::Schedule;
use crate::sink::DisplaySink;

/// Display refresh cadence while a shift is running.
pub const REFRESH_PERIOD: Duration = Duration::from_millis(100);
/// Coin spawn cadence while a shift is running.
pub const COIN_PERIOD: Duration = Duration::from_millis(500);
/// How long the earned amount stays visually emphasized after a refresh.
pub const PULSE_WINDOW: Duration = Duration::from_millis(500);

/// Message surfaced when a start attempt is rejected.
pub const REJECT_START_MSG: &str = "please enter a valid monthly salary and daily working hours";

/// The earnings session: inputs, derived rates, lifecycle flag, and the two
/// periodic schedules that exist only while running.
#[derive(Debug, Default)]
pub struct Session {
    pub monthly_salary: f64,
    pub daily_hours: f64,
    pub rates: RateCard,
    running: bool,
    started_at: Option<Instant>,
    earned: f64,
    refresh: Option<Schedule>,
    coin_spawner: Option<Schedule>,
    pulse_until: Option<Instant>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Last computed accrual. Stays at its final value after `stop`; the
    /// idle display masks it with zero.
    pub fn earned(&self) -> f64 {
        self.earned
    }

    /// Apply an input edit. Rates recompute and redisplay immediately,
    /// running or not. Negative values are clamped so the non-negativity
    /// invariants hold at the boundary.
    pub fn set_inputs(&mut self, monthly_salary: f64, daily_hours: f64, sink: &mut dyn DisplaySink) {
        self.monthly_salary = monthly_salary.max(0.0);
        self.daily_hours = daily_hours.max(0.0);
        self.rates = recompute(self.monthly_salary, self.daily_hours);
        sink.rates(self.rates.hourly, self.rates.secondly);
    }

    /// Push the full current state to the sink (startup, resize).
    pub fn publish(&self, sink: &mut dyn DisplaySink) {
        sink.rates(self.rates.hourly, self.rates.secondly);
        sink.controls(!self.running, self.running);
        if !self.running {
            sink.idle();
        }
    }

    /// Begin a shift. Returns false without touching any state when the
    /// inputs are invalid (a rejection notice goes to the sink) or when a
    /// shift is already running.
    pub fn start(&mut self, now: Instant, sink: &mut dyn DisplaySink) -> bool {
        if self.running {
            return false;
        }
        if self.monthly_salary <= 0.0 || self.daily_hours <= 0.0 {
            sink.validation_failed(REJECT_START_MSG);
            return false;
        }

        self.started_at = Some(now);
        self.earned = 0.0;
        self.running = true;
        self.refresh = Some(Schedule::new(now, REFRESH_PERIOD));
        self.coin_spawner = Some(Schedule::new(now, COIN_PERIOD));
        sink.controls(false, true);
        true
    }

    /// End the shift. Both schedules are dropped before this returns, so no
    /// fire can be observed afterwards. Idempotent; safe to call while idle.
    pub fn stop(&mut self, sink: &mut dyn DisplaySink) {
        self.running = false;
        self.started_at = None;
        self.refresh = None;
        self.coin_spawner = None;
        self.pulse_until = None;
        sink.controls(true, false);
        sink.idle();
    }

    /// Sample both schedules. Pushes a display refresh when the 100ms
    /// boundary passed and returns how many coin spawns became due.
    pub fn on_tick(&mut self, now: Instant, sink: &mut dyn DisplaySink) -> u32 {
        if !self.running {
            return 0;
        }
        let started_at = match self.started_at {
            Some(t) => t,
            None => return 0,
        };

        if let Some(refresh) = self.refresh.as_mut() {
            if refresh.fire(now) > 0 {
                let elapsed = now.saturating_duration_since(started_at);
                self.earned = self.rates.secondly * elapsed.as_secs_f64();
                self.pulse_until = Some(now + PULSE_WINDOW);
                sink.progress(elapsed.as_millis() as u64, self.earned);
            }
        }

        self.coin_spawner.as_mut().map_or(0, |s| s.fire(now))
    }

    /// Whether the earned amount is inside its post-refresh emphasis window.
    pub fn pulse_active(&self, now: Instant) -> bool {
        self.pulse_until.map_or(false, |deadline| now < deadline)
    }
}
