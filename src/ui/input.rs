/// Keyboard input: the fallback jump source when no motion device is present.
///
/// Jump strength comes from how long the jump key is "charged":
///   - Terminals that report key releases: hold to charge, release to jump.
///   - Everything else: tap to start charging, tap again to jump.
///
/// Charge time maps linearly to degrees (`charge_deg_per_sec`), so the
/// classifier sees the same units as the gesture detector produces.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::config::KeyboardConfig;

pub struct InputState {
    /// Keys freshly pressed during the most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Keys released during the most recent drain (only when honored).
    releases: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,

    jump_keys: Vec<KeyCode>,
}

impl InputState {
    pub fn new(cfg: &KeyboardConfig) -> Self {
        let mut jump_keys: Vec<KeyCode> = cfg.jump.iter().filter_map(|s| key_from_name(s)).collect();
        if jump_keys.is_empty() {
            jump_keys = vec![KeyCode::Char(' '), KeyCode::Enter];
        }
        InputState {
            fresh_presses: Vec::with_capacity(8),
            releases: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            jump_keys,
        }
    }

    /// Drain all pending terminal events.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.releases.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }
    }

    /// Was any jump key freshly pressed this frame?
    pub fn jump_pressed(&self) -> bool {
        self.jump_keys.iter().any(|k| self.fresh_presses.contains(k))
    }

    /// Was any jump key released this frame? Always false without release reporting.
    pub fn jump_released(&self) -> bool {
        self.jump_keys.iter().any(|k| self.releases.contains(k))
    }

    pub fn quit_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind == KeyEventKind::Press
                && (k.code == KeyCode::Esc
                    || k.code == KeyCode::Char('q')
                    || k.code == KeyCode::Char('Q')
                    || (k.modifiers.contains(KeyModifiers::CONTROL)
                        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))))
        })
    }

    // ── Internal ──

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Press => self.fresh_presses.push(key.code),
            KeyEventKind::Release if self.honor_release => self.releases.push(key.code),
            // Auto-repeat must not restart or fire a charge
            _ => {}
        }
    }
}

/// Key names accepted in `[keyboard] jump = [...]`.
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    match trimmed.to_lowercase().as_str() {
        "space" => Some(KeyCode::Char(' ')),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        _ => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Charge meter
// ══════════════════════════════════════════════════════════════

pub struct JumpCharge {
    started: Option<Instant>,
    deg_per_sec: f64,
}

impl JumpCharge {
    pub fn new(cfg: &KeyboardConfig) -> Self {
        JumpCharge { started: None, deg_per_sec: cfg.charge_deg_per_sec }
    }

    /// Advance the charge from this frame's input. Returns a jump signal
    /// (degrees) when the charge is let go.
    pub fn update(&mut self, kb: &InputState, now: Instant) -> Option<f64> {
        self.step(kb.jump_pressed(), kb.jump_released(), kb.honor_release, now)
    }

    /// Current charge in degrees, for the HUD meter.
    pub fn preview(&self, now: Instant) -> Option<f64> {
        self.started.map(|t| self.degrees(now.saturating_duration_since(t)))
    }

    fn step(&mut self, pressed: bool, released: bool, hold_mode: bool, now: Instant) -> Option<f64> {
        match self.started {
            // Press and release drained in one frame: a zero-length charge
            None if pressed && released && hold_mode => Some(0.0),
            None if pressed => {
                self.started = Some(now);
                None
            }
            Some(t) if released || (!hold_mode && pressed) => {
                self.started = None;
                Some(self.degrees(now.saturating_duration_since(t)))
            }
            _ => None,
        }
    }

    fn degrees(&self, held: Duration) -> f64 {
        held.as_secs_f64() * self.deg_per_sec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb_cfg() -> KeyboardConfig {
        KeyboardConfig { charge_deg_per_sec: 300.0, jump: vec!["Space".into()] }
    }

    #[test]
    fn key_names_parse() {
        assert_eq!(key_from_name("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(key_from_name("ENTER"), Some(KeyCode::Enter));
        assert_eq!(key_from_name("j"), Some(KeyCode::Char('j')));
        assert_eq!(key_from_name("F13"), None);
    }

    #[test]
    fn tap_mode_fires_on_second_press() {
        let mut c = JumpCharge::new(&kb_cfg());
        let t0 = Instant::now();
        assert_eq!(c.step(true, false, false, t0), None);
        assert!(c.started.is_some());
        // A frame with no input keeps charging
        assert_eq!(c.step(false, false, false, t0 + Duration::from_millis(100)), None);
        let delta = c.step(true, false, false, t0 + Duration::from_millis(500)).unwrap();
        assert!((delta - 150.0).abs() < 1e-6);
        assert!(c.started.is_none());
    }

    #[test]
    fn hold_mode_fires_on_release_only() {
        let mut c = JumpCharge::new(&kb_cfg());
        let t0 = Instant::now();
        c.step(true, false, true, t0);
        // Another press while holding does nothing in hold mode
        assert_eq!(c.step(true, false, true, t0 + Duration::from_millis(20)), None);
        let delta = c.step(false, true, true, t0 + Duration::from_secs(2)).unwrap();
        assert!((delta - 600.0).abs() < 1e-6);
    }

    #[test]
    fn hold_mode_tap_within_one_frame_fires_at_once() {
        let mut c = JumpCharge::new(&kb_cfg());
        let t0 = Instant::now();
        assert_eq!(c.step(true, true, true, t0), Some(0.0));
        assert!(c.started.is_none());

        // The next hold is timed from its own press
        c.step(true, false, true, t0 + Duration::from_secs(2));
        let delta = c.step(false, true, true, t0 + Duration::from_millis(2100)).unwrap();
        assert!((delta - 30.0).abs() < 1e-6);
    }

    #[test]
    fn release_without_charge_is_ignored() {
        let mut c = JumpCharge::new(&kb_cfg());
        assert_eq!(c.step(false, true, true, Instant::now()), None);
        assert!(c.started.is_none());
    }

    #[test]
    fn preview_tracks_elapsed_time() {
        let mut c = JumpCharge::new(&kb_cfg());
        let t0 = Instant::now();
        assert_eq!(c.preview(t0), None);
        c.step(true, false, false, t0);
        let p = c.preview(t0 + Duration::from_millis(100)).unwrap();
        assert!((p - 30.0).abs() < 1e-6);
    }

    #[test]
    fn repeats_do_not_count_as_presses() {
        let mut kb = InputState::new(&kb_cfg());
        let mut repeat = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        repeat.kind = KeyEventKind::Repeat;
        kb.record(repeat);
        assert!(!kb.jump_pressed());
        kb.record(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(kb.jump_pressed());
    }

    #[test]
    fn releases_need_enhancement() {
        let mut kb = InputState::new(&kb_cfg());
        let mut release = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        kb.record(release);
        assert!(!kb.jump_released());
        kb.honor_release = true;
        kb.record(release);
        assert!(kb.jump_released());
    }
}
