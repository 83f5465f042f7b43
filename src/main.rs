mod ui;

use kaching::{
    clock::{Clock, SystemClock},
    coins::CoinRain,
    config::{Config, ConfigStore, FileConfigStore},
    rates::parse_amount,
    runtime::{AppEvent, CrosstermEventSource, Pump, TICK_RATE},
    session::Session,
    sink::Readout,
};

use chrono::{DateTime, Local};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Instant,
};

/// real-time earnings ticker with live pay rates and a coin rain
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Turns a monthly salary and daily working hours into an hourly and per-second pay rate, then counts your earnings live while you work, one coin at a time."
)]
pub struct Cli {
    /// monthly salary used to derive the pay rates
    #[clap(short = 'm', long, default_value_t = 0.0)]
    monthly_salary: f64,

    /// working hours per day
    #[clap(short = 'd', long, default_value_t = 0.0)]
    daily_hours: f64,

    /// currency suffix for displayed amounts (overrides the saved preference)
    #[clap(short = 'c', long, value_enum)]
    currency: Option<Currency>,

    /// disable the decorative coin rain
    #[clap(long)]
    no_coins: bool,

    /// clock in immediately when salary and hours are given
    #[clap(long)]
    auto_start: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum, strum_macros::Display)]
pub enum Currency {
    Yuan,
    Dollar,
    Euro,
    Pound,
}

impl Currency {
    fn symbol(&self) -> &'static str {
        match self {
            Currency::Yuan => "¥",
            Currency::Dollar => "$",
            Currency::Euro => "€",
            Currency::Pound => "£",
        }
    }

    fn from_name(name: &str) -> Currency {
        match name {
            "dollar" => Currency::Dollar,
            "euro" => Currency::Euro,
            "pound" => Currency::Pound,
            _ => Currency::Yuan,
        }
    }

    fn config_name(&self) -> String {
        self.to_string().to_lowercase()
    }
}

/// Per-run presentation settings: saved preferences with CLI overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub currency: Currency,
    pub coin_rain: bool,
}

impl Settings {
    fn resolve(cfg: &Config, cli: &Cli) -> Self {
        let currency = cli
            .currency
            .unwrap_or_else(|| Currency::from_name(&cfg.currency));
        Self {
            currency,
            coin_rain: cfg.coin_rain && !cli.no_coins,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputField {
    Salary,
    Hours,
}

/// The TUI harness around the session core.
pub struct App {
    pub session: Session,
    pub readout: Readout,
    pub coins: CoinRain,
    pub salary_text: String,
    pub hours_text: String,
    pub focus: InputField,
    pub coin_rain_enabled: bool,
    pub clocked_in_at: Option<DateTime<Local>>,
    /// Instant of the latest handled event; rendering measures pulse and
    /// coin ages against this.
    pub last_now: Instant,
}

impl App {
    pub fn new(cli: &Cli, settings: &Settings, now: Instant) -> Self {
        let mut app = Self {
            session: Session::new(),
            readout: Readout::new(settings.currency.symbol()),
            coins: CoinRain::new(0.0),
            salary_text: seed_text(cli.monthly_salary),
            hours_text: seed_text(cli.daily_hours),
            focus: InputField::Salary,
            coin_rain_enabled: settings.coin_rain,
            clocked_in_at: None,
            last_now: now,
        };
        app.apply_inputs();
        app.session.publish(&mut app.readout);
        app
    }

    /// Re-parse both text fields into the session. Runs on every edit.
    pub fn apply_inputs(&mut self) {
        self.session.set_inputs(
            parse_amount(&self.salary_text),
            parse_amount(&self.hours_text),
            &mut self.readout,
        );
    }

    fn focused_text_mut(&mut self) -> &mut String {
        match self.focus {
            InputField::Salary => &mut self.salary_text,
            InputField::Hours => &mut self.hours_text,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            InputField::Salary => InputField::Hours,
            InputField::Hours => InputField::Salary,
        };
    }

    /// Keyboard input: digits and a dot edit the focused field, letters are
    /// hotkeys mirroring the start/stop controls.
    pub fn write(&mut self, c: char, now: Instant) {
        match c {
            '0'..='9' | '.' => {
                let text = self.focused_text_mut();
                if text.len() < 12 {
                    text.push(c);
                    self.apply_inputs();
                }
            }
            's' => {
                self.clock_in(now);
            }
            'x' => self.clock_out(),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        if self.focused_text_mut().pop().is_some() {
            self.apply_inputs();
        }
    }

    pub fn clock_in(&mut self, now: Instant) -> bool {
        let started = self.session.start(now, &mut self.readout);
        if started {
            self.clocked_in_at = Some(Local::now());
        }
        started
    }

    pub fn clock_out(&mut self) {
        self.session.stop(&mut self.readout);
        self.clocked_in_at = None;
    }

    /// Advance both periodic processes. Returns whether anything on screen
    /// may have changed (running ticker or coins still falling).
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.last_now = now;
        let due_spawns = self.session.on_tick(now, &mut self.readout);
        if self.coin_rain_enabled {
            for _ in 0..due_spawns {
                self.coins.spawn(now);
            }
        }
        self.coins.sweep(now);
        self.session.is_running() || !self.coins.is_empty()
    }
}

fn seed_text(value: f64) -> String {
    if value > 0.0 {
        format!("{}", value)
    } else {
        String::new()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = store.load();
    // Seed the config file on first run; CLI overrides stay per-run.
    let _ = store.save(&config);
    let settings = Settings::resolve(&config, &cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let clock = SystemClock;
    let mut app = App::new(&cli, &settings, clock.now());
    let size = terminal.size()?;
    app.coins.set_container_width(size.width as f64);
    if cli.auto_start {
        app.clock_in(clock.now());
    }

    let result = run_app(&mut terminal, &mut app, &clock);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    clock: &SystemClock,
) -> Result<(), Box<dyn Error>> {
    let pump = Pump::new(CrosstermEventSource::new(), TICK_RATE);

    app.last_now = clock.now();
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match pump.next() {
            AppEvent::Tick => {
                if app.on_tick(clock.now()) {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.coins.set_container_width(size.width as f64);
                app.last_now = clock.now();
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Key(key) => {
                let now = clock.now();
                app.last_now = now;
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break;
                    }
                    KeyCode::Tab | KeyCode::Up | KeyCode::Down => app.toggle_focus(),
                    KeyCode::Enter => {
                        if app.session.is_running() {
                            app.clock_out();
                        } else {
                            app.clock_in(now);
                        }
                    }
                    KeyCode::Backspace => app.backspace(),
                    KeyCode::Char(c) => app.write(c, now),
                    _ => {}
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use kaching::clock::ManualClock;
    use kaching::session::REJECT_START_MSG;

    fn cli_from(args: &[&str]) -> Cli {
        let mut full = vec!["kaching"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    fn test_app(args: &[&str]) -> (App, ManualClock) {
        let cli = cli_from(args);
        let settings = Settings::resolve(&Config::default(), &cli);
        let clock = ManualClock::new();
        let app = App::new(&cli, &settings, clock.now());
        (app, clock)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = cli_from(&[]);

        assert_eq!(cli.monthly_salary, 0.0);
        assert_eq!(cli.daily_hours, 0.0);
        assert_eq!(cli.currency, None);
        assert!(!cli.no_coins);
        assert!(!cli.auto_start);
    }

    #[test]
    fn test_cli_salary_and_hours() {
        let cli = cli_from(&["-m", "4400", "-d", "8"]);
        assert_eq!(cli.monthly_salary, 4400.0);
        assert_eq!(cli.daily_hours, 8.0);

        let cli = cli_from(&["--monthly-salary", "6600", "--daily-hours", "7.5"]);
        assert_eq!(cli.monthly_salary, 6600.0);
        assert_eq!(cli.daily_hours, 7.5);
    }

    #[test]
    fn test_cli_currency_values() {
        let cli = cli_from(&["-c", "dollar"]);
        assert_eq!(cli.currency, Some(Currency::Dollar));

        let cli = cli_from(&["--currency", "euro"]);
        assert_eq!(cli.currency, Some(Currency::Euro));
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Currency::Yuan.symbol(), "¥");
        assert_eq!(Currency::Dollar.symbol(), "$");
        assert_eq!(Currency::Euro.symbol(), "€");
        assert_eq!(Currency::Pound.symbol(), "£");
    }

    #[test]
    fn test_currency_config_name_roundtrip() {
        for currency in [
            Currency::Yuan,
            Currency::Dollar,
            Currency::Euro,
            Currency::Pound,
        ] {
            assert_eq!(Currency::from_name(&currency.config_name()), currency);
        }
        // unknown names fall back to the default
        assert_eq!(Currency::from_name("doubloon"), Currency::Yuan);
    }

    #[test]
    fn test_settings_resolution() {
        let cfg = Config {
            currency: "euro".into(),
            coin_rain: true,
        };

        let settings = Settings::resolve(&cfg, &cli_from(&[]));
        assert_eq!(settings.currency, Currency::Euro);
        assert!(settings.coin_rain);

        // CLI overrides win for the run
        let settings = Settings::resolve(&cfg, &cli_from(&["-c", "pound", "--no-coins"]));
        assert_eq!(settings.currency, Currency::Pound);
        assert!(!settings.coin_rain);
    }

    #[test]
    fn test_seed_text() {
        assert_eq!(seed_text(0.0), "");
        assert_eq!(seed_text(4400.0), "4400");
        assert_eq!(seed_text(7.5), "7.5");
    }

    #[test]
    fn test_app_new_seeds_inputs_from_cli() {
        let (app, _clock) = test_app(&["-m", "4400", "-d", "8"]);

        assert_eq!(app.salary_text, "4400");
        assert_eq!(app.hours_text, "8");
        assert_eq!(app.readout.hourly, "25.00 ¥");
        assert_eq!(app.readout.secondly, "0.0069 ¥");
        assert!(!app.session.is_running());
    }

    #[test]
    fn test_app_starts_with_idle_readout() {
        let (app, _clock) = test_app(&[]);

        assert_eq!(app.readout.elapsed, "00:00:00");
        assert_eq!(app.readout.earned, "0.00 ¥");
        assert!(app.readout.start_enabled);
        assert!(!app.readout.stop_enabled);
    }

    #[test]
    fn test_typing_updates_rates_live() {
        let (mut app, clock) = test_app(&[]);

        for c in "4400".chars() {
            app.write(c, clock.now());
        }
        app.toggle_focus();
        app.write('8', clock.now());

        assert_eq!(app.readout.hourly, "25.00 ¥");
    }

    #[test]
    fn test_backspace_reparses() {
        let (mut app, _clock) = test_app(&["-m", "4400", "-d", "8"]);

        // drop the trailing hours digit: rates collapse to zero
        app.toggle_focus();
        app.backspace();

        assert_eq!(app.hours_text, "");
        assert_eq!(app.readout.hourly, "0.00 ¥");
    }

    #[test]
    fn test_non_numeric_keys_do_not_edit_fields() {
        let (mut app, clock) = test_app(&[]);

        app.write('a', clock.now());
        app.write('-', clock.now());

        assert_eq!(app.salary_text, "");
    }

    #[test]
    fn test_clock_in_rejected_without_inputs() {
        let (mut app, clock) = test_app(&[]);

        assert!(!app.clock_in(clock.now()));
        assert!(!app.session.is_running());
        assert_eq!(app.readout.notice.as_deref(), Some(REJECT_START_MSG));
        assert!(app.clocked_in_at.is_none());
    }

    #[test]
    fn test_clock_in_and_out_cycle() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8"]);

        assert!(app.clock_in(clock.now()));
        assert!(app.session.is_running());
        assert!(app.clocked_in_at.is_some());
        assert!(!app.readout.start_enabled);
        assert!(app.readout.stop_enabled);

        app.clock_out();
        assert!(!app.session.is_running());
        assert!(app.clocked_in_at.is_none());
        assert_eq!(app.readout.elapsed, "00:00:00");
        assert_eq!(app.readout.earned, "0.00 ¥");
    }

    #[test]
    fn test_hotkeys_mirror_controls() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8"]);

        app.write('s', clock.now());
        assert!(app.session.is_running());

        app.write('x', clock.now());
        assert!(!app.session.is_running());
    }

    #[test]
    fn test_tick_updates_readout_and_spawns_coins() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8"]);
        app.coins.set_container_width(80.0);

        assert!(app.clock_in(clock.now()));
        clock.advance_ms(1_000);
        let redraw = app.on_tick(clock.now());

        assert!(redraw);
        assert_eq!(app.readout.elapsed, "00:00:01");
        assert_eq!(app.coins.coins.len(), 2);
    }

    #[test]
    fn test_no_coins_flag_suppresses_spawns() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8", "--no-coins"]);
        app.coins.set_container_width(80.0);

        assert!(app.clock_in(clock.now()));
        clock.advance_ms(1_000);
        app.on_tick(clock.now());

        assert!(app.coins.is_empty());
        // the ticker itself is unaffected
        assert_eq!(app.readout.elapsed, "00:00:01");
    }

    #[test]
    fn test_tick_while_idle_requests_no_redraw() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8"]);

        clock.advance_ms(500);
        assert!(!app.on_tick(clock.now()));
    }

    #[test]
    fn test_coins_outlive_clock_out() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8"]);
        app.coins.set_container_width(80.0);

        assert!(app.clock_in(clock.now()));
        clock.advance_ms(500);
        app.on_tick(clock.now());
        assert_eq!(app.coins.coins.len(), 1);

        app.clock_out();

        // still falling 2.4s after spawn, and the loop keeps redrawing
        clock.advance_ms(2_400);
        assert!(app.on_tick(clock.now()));
        assert_eq!(app.coins.coins.len(), 1);

        // gone once its 3s lifetime is up
        clock.advance_ms(600);
        app.on_tick(clock.now());
        assert!(app.coins.is_empty());
    }

    #[test]
    fn test_auto_start_path() {
        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8", "--auto-start"]);

        // main() performs this when --auto-start is given
        assert!(app.clock_in(clock.now()));
        assert!(app.session.is_running());
    }

    #[test]
    fn test_ui_renders_idle_screen() {
        use ratatui::{backend::TestBackend, Terminal};

        let (app, _clock) = test_app(&["-m", "4400", "-d", "8"]);
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("25.00"));
        assert!(content.contains("00:00:00"));
    }

    #[test]
    fn test_ui_renders_running_screen_with_coins() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, clock) = test_app(&["-m", "4400", "-d", "8"]);
        app.coins.set_container_width(80.0);
        assert!(app.clock_in(clock.now()));
        clock.advance_ms(1_500);
        app.on_tick(clock.now());

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("00:00:01"));
    }

    #[test]
    fn test_ui_renders_rejection_notice() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, clock) = test_app(&[]);
        app.clock_in(clock.now());

        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("please enter a valid"));
    }

    #[test]
    fn test_ui_renders_on_tiny_terminal() {
        use ratatui::{backend::TestBackend, Terminal};

        let (app, _clock) = test_app(&[]);
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();

        // must not panic on degenerate sizes
        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();
    }

    #[test]
    fn test_focus_toggle_cycles() {
        let (mut app, _clock) = test_app(&[]);

        assert_eq!(app.focus, InputField::Salary);
        app.toggle_focus();
        assert_eq!(app.focus, InputField::Hours);
        app.toggle_focus();
        assert_eq!(app.focus, InputField::Salary);
    }

    #[test]
    fn test_field_length_cap() {
        let (mut app, clock) = test_app(&[]);

        for _ in 0..40 {
            app.write('9', clock.now());
        }

        assert_eq!(app.salary_text.len(), 12);
    }
}
