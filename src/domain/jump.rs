/// Jump classification: gesture delta (degrees) → outcome category.

use crate::config::JumpConfig;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum JumpKind {
    Short,
    Perfect,
    Long,
}

impl JumpKind {
    pub fn label(self) -> &'static str {
        match self {
            JumpKind::Short   => "short",
            JumpKind::Perfect => "perfect",
            JumpKind::Long    => "long",
        }
    }

    pub fn is_miss(self) -> bool {
        self != JumpKind::Perfect
    }
}

/// Classify a jump signal.
///
///   delta <  short_threshold               → Short
///   short_threshold <= delta < long_threshold → Perfect
///   delta >= long_threshold                → Long
///
/// Total over f64: NaN never reaches the short threshold, so it lands in Short.
pub fn classify(delta: f64, cfg: &JumpConfig) -> JumpKind {
    if !(delta >= cfg.short_threshold) {
        JumpKind::Short
    } else if delta < cfg.long_threshold {
        JumpKind::Perfect
    } else {
        JumpKind::Long
    }
}
