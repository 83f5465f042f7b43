use crate::format::{format_amount, format_clock};

/// Push-style observer the session reports to. The presentational layer
/// implements this; the core only ever hands over plain values.
pub trait DisplaySink {
    /// Derived rates changed (fires on every input edit, running or not).
    fn rates(&mut self, hourly: f64, secondly: f64);
    /// Display refresh while running.
    fn progress(&mut self, elapsed_ms: u64, earned: f64);
    /// The session went (or stayed) idle; elapsed/earned reset to zero.
    fn idle(&mut self);
    /// Availability of the start/stop controls.
    fn controls(&mut self, start_enabled: bool, stop_enabled: bool);
    /// A start attempt was rejected with a user-visible message.
    fn validation_failed(&mut self, message: &str);
}

/// Production sink: keeps the formatted strings the TUI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    currency: String,
    pub hourly: String,
    pub secondly: String,
    pub elapsed: String,
    pub earned: String,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub notice: Option<String>,
}

impl Readout {
    pub fn new(currency: impl Into<String>) -> Self {
        let currency = currency.into();
        let mut readout = Self {
            currency,
            hourly: String::new(),
            secondly: String::new(),
            elapsed: String::new(),
            earned: String::new(),
            start_enabled: true,
            stop_enabled: false,
            notice: None,
        };
        readout.rates(0.0, 0.0);
        readout.idle();
        readout
    }

    fn amount(&self, value: f64, decimals: usize) -> String {
        format!("{} {}", format_amount(value, decimals), self.currency)
    }
}

impl DisplaySink for Readout {
    fn rates(&mut self, hourly: f64, secondly: f64) {
        self.hourly = self.amount(hourly, 2);
        self.secondly = self.amount(secondly, 4);
    }

    fn progress(&mut self, elapsed_ms: u64, earned: f64) {
        self.elapsed = format_clock(elapsed_ms);
        self.earned = self.amount(earned, 2);
    }

    fn idle(&mut self) {
        self.elapsed = format_clock(0);
        self.earned = self.amount(0.0, 2);
    }

    fn controls(&mut self, start_enabled: bool, stop_enabled: bool) {
        self.start_enabled = start_enabled;
        self.stop_enabled = stop_enabled;
        // a shift actually starting supersedes any earlier rejection notice
        if stop_enabled {
            self.notice = None;
        }
    }

    fn validation_failed(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }
}

/// What a sink observed, in order. Used by unit and integration tests.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Rates { hourly: f64, secondly: f64 },
    Progress { elapsed_ms: u64, earned: f64 },
    Idle,
    Controls { start_enabled: bool, stop_enabled: bool },
    ValidationFailed(String),
}

/// Recording sink for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_progress(&self) -> Option<(u64, f64)> {
        self.events.iter().rev().find_map(|ev| match ev {
            SinkEvent::Progress { elapsed_ms, earned } => Some((*elapsed_ms, *earned)),
            _ => None,
        })
    }
}

impl DisplaySink for RecordingSink {
    fn rates(&mut self, hourly: f64, secondly: f64) {
        self.events.push(SinkEvent::Rates { hourly, secondly });
    }

    fn progress(&mut self, elapsed_ms: u64, earned: f64) {
        self.events.push(SinkEvent::Progress { elapsed_ms, earned });
    }

    fn idle(&mut self) {
        self.events.push(SinkEvent::Idle);
    }

    fn controls(&mut self, start_enabled: bool, stop_enabled: bool) {
        self.events.push(SinkEvent::Controls {
            start_enabled,
            stop_enabled,
        });
    }

    fn validation_failed(&mut self, message: &str) {
        self.events.push(SinkEvent::ValidationFailed(message.to_string()));
    }
}
