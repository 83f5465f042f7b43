use std::time::{Duration, Instant};

use unicode_width::UnicodeWidthChar;

/// Every coin lives exactly this long, independent of session state.
pub const COIN_LIFETIME: Duration = Duration::from_millis(3000);
/// Size range (arbitrary units), applied to both axes.
pub const COIN_MIN_SIZE: f64 = 25.0;
pub const COIN_MAX_SIZE: f64 = 35.0;
pub const FULL_TURN_DEGREES: f64 = 360.0;

// Coin faces by initial orientation, edge-on through face-up
const COIN_FACES: [char; 4] = ['○', '◎', '◉', '●'];

/// One falling coin with randomized visual parameters.
#[derive(Debug, Clone)]
pub struct Coin {
    pub x: f64,
    pub size: f64,
    pub rotation: f64,
    pub spawned_at: Instant,
}

impl Coin {
    fn new(now: Instant, container_width: f64) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        let rotation = rng.gen_range(0.0..FULL_TURN_DEGREES);
        let glyph_width = face_for(rotation).width().unwrap_or(1) as f64;
        let max_x = (container_width - glyph_width).max(0.0);

        Self {
            x: rng.gen_range(0.0..=max_x),
            size: rng.gen_range(COIN_MIN_SIZE..COIN_MAX_SIZE),
            rotation,
            spawned_at: now,
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.spawned_at) >= COIN_LIFETIME
    }

    /// How far through its lifetime the coin is, in [0, 1]. Drives the fall.
    pub fn age_fraction(&self, now: Instant) -> f64 {
        let age = now.saturating_duration_since(self.spawned_at);
        (age.as_secs_f64() / COIN_LIFETIME.as_secs_f64()).min(1.0)
    }

    /// The face shown for this coin's initial orientation.
    pub fn face(&self) -> char {
        face_for(self.rotation)
    }
}

fn face_for(rotation: f64) -> char {
    let quadrant = ((rotation / 90.0) as usize).min(COIN_FACES.len() - 1);
    COIN_FACES[quadrant]
}

/// The live set of decorative coins. Purely cosmetic; nothing here feeds
/// back into the financial computation.
#[derive(Debug, Default)]
pub struct CoinRain {
    pub coins: Vec<Coin>,
    container_width: f64,
}

impl CoinRain {
    pub fn new(container_width: f64) -> Self {
        Self {
            coins: Vec::new(),
            container_width,
        }
    }

    pub fn set_container_width(&mut self, width: f64) {
        self.container_width = width;
    }

    pub fn spawn(&mut self, now: Instant) {
        self.coins.push(Coin::new(now, self.container_width));
    }

    /// Drop every coin past its lifetime. Called on every loop tick whether
    /// or not a shift is running, so coins spawned just before a stop still
    /// get removed on schedule.
    pub fn sweep(&mut self, now: Instant) {
        self.coins.retain(|coin| !coin.expired(now));
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}
