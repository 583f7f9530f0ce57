/// Commands emitted by the simulation.
/// The presentation layer consumes these to update its scene and play cues.

use crate::domain::entity::ColorTag;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EntityCommand {
    SpawnPlatform { index: usize, offset: f32, color: ColorTag },
    /// Initial token only; later tokens arrive via `RetirePlayerAndSpawn`.
    SpawnPlayer { position: f32, generation: u32 },
    MovePlayer { position: f32, generation: u32 },
    /// The current token stays behind at `retired_at`; a new one appears at `position`.
    RetirePlayerAndSpawn { retired_at: f32, position: f32, generation: u32 },
    SetFeedbackVisible(bool),
    RepositionFeedback { offset: f32 },
    AdjustCamera { delta_y: f32 },
    UpdateScore { score: usize },
}
