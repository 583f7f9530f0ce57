/// Gesture detection: turns a stream of motion samples into jump signals.
///
/// Two-sample window, edge-triggered:
///   1. Arm: vertical acceleration drops below the threshold; the current
///      pitch becomes the reference.
///   2. Fire: acceleration rises above the threshold while armed and the
///      pitch has climbed more than `min_pitch_delta` degrees past the
///      reference. The climb is the jump signal; the detector disarms.
///
/// An armed detector keeps its reference until it fires.

use crate::config::MotionConfig;

/// One reading from the motion source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    /// User acceleration along the device's vertical axis (g).
    pub accel_z: f64,
    /// Device pitch in radians.
    pub pitch: f64,
}

#[derive(Clone, Debug)]
pub struct GestureDetector {
    accel_threshold: f64,
    min_pitch_delta: f64,
    start_pitch: Option<f64>, // Some = armed, in degrees
}

impl GestureDetector {
    pub fn new(cfg: &MotionConfig) -> Self {
        GestureDetector {
            accel_threshold: cfg.accel_threshold,
            min_pitch_delta: cfg.min_pitch_delta,
            start_pitch: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.start_pitch.is_some()
    }

    /// Feed one sample. Returns the jump delta in degrees when a gesture completes.
    pub fn feed(&mut self, sample: MotionSample) -> Option<f64> {
        let pitch = sample.pitch.to_degrees();
        match self.start_pitch {
            None if sample.accel_z < self.accel_threshold => {
                self.start_pitch = Some(pitch);
                None
            }
            Some(start) if sample.accel_z > self.accel_threshold => {
                let delta = pitch - start;
                if delta > self.min_pitch_delta {
                    self.start_pitch = None;
                    Some(delta)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
