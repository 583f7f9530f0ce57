/// GameState: the simulation snapshot for one session.
///
/// Only the outcome engine mutates it; everything the renderer needs
/// leaves through `EntityCommand` batches.

use crate::domain::entity::PlayerToken;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Initializing,
    Active,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub phase: Phase,
    pub player: PlayerToken,
    /// Where the most recent jump ended: the target on a perfect landing,
    /// the miss point otherwise.
    pub landed_at: f32,
    /// Index of the last platform reached with a perfect jump.
    pub score: usize,
    pub feedback_visible: bool,
    pub feedback_offset: f32,
    pub camera_y: f32,
    pub jumps: u64,
    pub misses: u64,
}

impl GameState {
    pub fn new(start: f32) -> Self {
        GameState {
            phase: Phase::Initializing,
            player: PlayerToken::new(start),
            landed_at: start,
            score: 0,
            feedback_visible: false,
            feedback_offset: 0.0,
            camera_y: 0.0,
            jumps: 0,
            misses: 0,
        }
    }
}
