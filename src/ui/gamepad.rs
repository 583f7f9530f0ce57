/// Gamepad motion source using gilrs.
///
/// A gamepad stands in for the tilt sensor:
///   Left Stick Y          →  pitch (scaled to ±pitch_scale_deg)
///   Right Trigger (analog) →  vertical acceleration (0.0 ..= 1.0)
///
/// Crouch (release the trigger) to arm, then tilt up and squeeze to jump.
/// Samples are taken on a background thread at `sample_hz` and fed through
/// the gesture detector; completed gestures go straight to the session.
///
/// Without the "gamepad" feature, or with no pad attached, the thread is
/// not started and the keyboard remains the only jump source.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::info;
#[cfg(feature = "gamepad")]
use log::{debug, warn};

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::{GamepadConfig, MotionConfig};
use crate::domain::gesture::{GestureDetector, MotionSample};
use crate::sim::session::{Session, SignalOutcome};

/// Latest analog readings, turned into motion samples.
#[derive(Clone, Copy, Debug, Default)]
struct PadReadings {
    stick_y: f32,
    trigger: f32,
}

impl PadReadings {
    fn sample(&self, cfg: &GamepadConfig) -> MotionSample {
        let sign = if cfg.invert_pitch { -1.0 } else { 1.0 };
        let pitch_deg = sign * self.stick_y.clamp(-1.0, 1.0) as f64 * cfg.pitch_scale_deg;
        MotionSample {
            accel_z: self.trigger.clamp(0.0, 1.0) as f64,
            pitch: pitch_deg.to_radians(),
        }
    }
}

/// Start the sampling thread. Returns None when no motion source is available.
///
/// The thread exits once every sender of `stop` is dropped.
pub fn spawn_motion_thread(
    session: Arc<Session>,
    motion: MotionConfig,
    pad: GamepadConfig,
    stop: Receiver<()>,
) -> Option<thread::JoinHandle<()>> {
    if !motion_available() {
        info!("no motion device; keyboard input only");
        return None;
    }
    info!("motion device found; sampling at {} Hz", motion.sample_hz);

    let interval = Duration::from_secs_f64(1.0 / motion.sample_hz as f64);
    let handle = thread::Builder::new()
        .name("motion".into())
        .spawn(move || run_sampler(&session, &motion, &pad, &stop, interval));

    match handle {
        Ok(h) => Some(h),
        Err(e) => {
            log::error!("could not start motion thread: {e}");
            None
        }
    }
}

#[cfg(feature = "gamepad")]
fn motion_available() -> bool {
    match Gilrs::new() {
        Ok(g) => g.gamepads().next().is_some(),
        Err(_) => false,
    }
}

#[cfg(not(feature = "gamepad"))]
fn motion_available() -> bool {
    false
}

/// Feed one sample through the detector and forward a completed gesture.
fn forward(detector: &mut GestureDetector, sample: MotionSample, session: &Session) -> Option<SignalOutcome> {
    let delta = detector.feed(sample)?;
    Some(session.on_jump_signal(delta))
}

/// Wait one interval; false once the stop channel closes.
fn keep_running(stop: &Receiver<()>, interval: Duration) -> bool {
    match stop.recv_timeout(interval) {
        Err(RecvTimeoutError::Timeout) => true,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
    }
}

#[cfg(feature = "gamepad")]
fn run_sampler(
    session: &Session,
    motion: &MotionConfig,
    pad: &GamepadConfig,
    stop: &Receiver<()>,
    interval: Duration,
) {
    // Gilrs is created on this thread; it stays here for its whole life
    let mut gilrs = match Gilrs::new() {
        Ok(g) => g,
        Err(e) => {
            warn!("gamepad backend unavailable: {e}");
            return;
        }
    };
    let mut detector = GestureDetector::new(motion);
    let mut readings = PadReadings::default();

    loop {
        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::AxisChanged(Axis::LeftStickY, value, _) => readings.stick_y = value,
                EventType::ButtonChanged(Button::RightTrigger2, value, _) => readings.trigger = value,
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    readings = PadReadings::default();
                }
                _ => {}
            }
        }

        let was_armed = detector.is_armed();
        if let Some(outcome) = forward(&mut detector, readings.sample(pad), session) {
            debug!("gesture → {:?}", outcome);
        } else if detector.is_armed() && !was_armed {
            debug!("crouch detected; gesture armed");
        }

        if !keep_running(stop, interval) {
            break;
        }
    }
    info!("motion thread exiting");
}

#[cfg(not(feature = "gamepad"))]
fn run_sampler(
    _session: &Session,
    _motion: &MotionConfig,
    _pad: &GamepadConfig,
    stop: &Receiver<()>,
    interval: Duration,
) {
    while keep_running(stop, interval) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::jump::JumpKind;

    fn pad_cfg(invert: bool) -> GamepadConfig {
        GamepadConfig { pitch_scale_deg: 90.0, invert_pitch: invert }
    }

    #[test]
    fn readings_scale_to_pitch_and_accel() {
        let r = PadReadings { stick_y: 0.5, trigger: 0.8 };
        let s = r.sample(&pad_cfg(false));
        assert!((s.pitch.to_degrees() - 45.0).abs() < 1e-4);
        assert!((s.accel_z - 0.8).abs() < 1e-6);

        let s = r.sample(&pad_cfg(true));
        assert!((s.pitch.to_degrees() + 45.0).abs() < 1e-4);
    }

    #[test]
    fn readings_are_clamped() {
        let r = PadReadings { stick_y: 3.0, trigger: -1.0 };
        let s = r.sample(&pad_cfg(false));
        assert!((s.pitch.to_degrees() - 90.0).abs() < 1e-4);
        assert_eq!(s.accel_z, 0.0);
    }

    #[test]
    fn completed_gesture_reaches_session() {
        let cfg = GameConfig::default();
        let (session, rx) = Session::start(&cfg);
        rx.try_recv().unwrap();
        let mut detector = GestureDetector::new(&cfg.motion);
        let pad = pad_cfg(false);

        let crouch = PadReadings { stick_y: -0.1, trigger: 0.0 };
        let jump = PadReadings { stick_y: 0.5, trigger: 1.0 };
        assert_eq!(forward(&mut detector, crouch.sample(&pad), &session), None);
        assert_eq!(
            forward(&mut detector, jump.sample(&pad), &session),
            Some(SignalOutcome::Resolved(JumpKind::Perfect))
        );
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn stop_channel_closing_ends_loop() {
        let (tx, rx) = crossbeam_channel::bounded::<()>(1);
        assert!(keep_running(&rx, Duration::from_millis(1)));
        drop(tx);
        assert!(!keep_running(&rx, Duration::from_millis(1)));
    }
}
