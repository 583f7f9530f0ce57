/// Scene: the presentation layer's own picture of the game.
///
/// Built purely from `EntityCommand` batches. Platforms are keyed by chain
/// index, the active token by generation; retired tokens stay behind as
/// fallen markers. Nothing here feeds back into the simulation.

use std::collections::{BTreeMap, VecDeque};

use crate::domain::entity::ColorTag;
use crate::sim::command::EntityCommand;

/// Platforms older than this (by index, behind the newest) are forgotten.
const PLATFORM_WINDOW: usize = 64;
/// Fallen markers kept on screen.
const FALLEN_CAP: usize = 12;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScenePlatform {
    pub offset: f32,
    pub color: ColorTag,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Token {
    pub position: f32,
    pub generation: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub platforms: BTreeMap<usize, ScenePlatform>,
    pub player: Option<Token>,
    pub fallen: VecDeque<Token>,
    pub feedback_visible: bool,
    pub feedback_offset: f32,
    pub camera_y: f32,
    pub score: usize,
    /// Generations retired so far; the HUD shows it as "falls".
    pub falls: u32,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn apply_all(&mut self, batch: &[EntityCommand]) {
        for cmd in batch {
            self.apply(*cmd);
        }
    }

    pub fn apply(&mut self, cmd: EntityCommand) {
        match cmd {
            EntityCommand::SpawnPlatform { index, offset, color } => {
                self.platforms.insert(index, ScenePlatform { offset, color });
                let floor = index.saturating_sub(PLATFORM_WINDOW);
                self.platforms.retain(|&i, _| i >= floor);
            }
            EntityCommand::SpawnPlayer { position, generation }
            | EntityCommand::MovePlayer { position, generation } => {
                self.player = Some(Token { position, generation });
            }
            EntityCommand::RetirePlayerAndSpawn { retired_at, position, generation } => {
                if let Some(old) = self.player {
                    self.fallen.push_back(Token { position: retired_at, generation: old.generation });
                    if self.fallen.len() > FALLEN_CAP {
                        self.fallen.pop_front();
                    }
                }
                self.falls += 1;
                self.player = Some(Token { position, generation });
            }
            EntityCommand::SetFeedbackVisible(visible) => self.feedback_visible = visible,
            EntityCommand::RepositionFeedback { offset } => self.feedback_offset = offset,
            EntityCommand::AdjustCamera { delta_y } => self.camera_y += delta_y,
            EntityCommand::UpdateScore { score } => self.score = score,
        }
    }

    /// The frontier: furthest platform along the travel axis.
    pub fn frontier(&self) -> Option<f32> {
        self.platforms.values().next_back().map(|p| p.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::session::Session;

    #[test]
    fn setup_batch_builds_opening_scene() {
        let (_session, rx) = Session::start(&GameConfig::default());
        let mut scene = Scene::new();
        scene.apply_all(&rx.try_recv().unwrap());

        assert_eq!(scene.platforms.len(), 2);
        assert_eq!(scene.player, Some(Token { position: -15.0, generation: 0 }));
        assert!(!scene.feedback_visible);
        assert!((scene.camera_y - 20.0).abs() < 1e-6);
        assert_eq!(scene.frontier(), Some(-20.0));
    }

    #[test]
    fn miss_leaves_fallen_marker() {
        let mut scene = Scene::new();
        scene.apply(EntityCommand::SpawnPlayer { position: -15.0, generation: 0 });
        scene.apply(EntityCommand::RetirePlayerAndSpawn { retired_at: -18.0, position: -15.0, generation: 1 });

        assert_eq!(scene.fallen.len(), 1);
        assert_eq!(scene.fallen[0], Token { position: -18.0, generation: 0 });
        assert_eq!(scene.player, Some(Token { position: -15.0, generation: 1 }));
        assert_eq!(scene.falls, 1);
    }

    #[test]
    fn fallen_markers_are_capped() {
        let mut scene = Scene::new();
        scene.apply(EntityCommand::SpawnPlayer { position: 0.0, generation: 0 });
        for g in 1..=(FALLEN_CAP as u32 + 5) {
            scene.apply(EntityCommand::RetirePlayerAndSpawn { retired_at: -2.0, position: 0.0, generation: g });
        }
        assert_eq!(scene.fallen.len(), FALLEN_CAP);
        assert_eq!(scene.fallen.back().map(|t| t.generation), Some(FALLEN_CAP as u32 + 4));
    }

    #[test]
    fn old_platforms_leave_the_scene() {
        let mut scene = Scene::new();
        for i in 0..(PLATFORM_WINDOW + 10) {
            scene.apply(EntityCommand::SpawnPlatform {
                index: i,
                offset: -(i as f32) * 5.0,
                color: ColorTag::Blue,
            });
        }
        assert_eq!(scene.platforms.len(), PLATFORM_WINDOW + 1);
        assert!(!scene.platforms.contains_key(&0));
    }

    #[test]
    fn session_play_keeps_scene_in_step() {
        let mut cfg = GameConfig::default();
        cfg.general.seed = Some(3);
        let (session, rx) = Session::start(&cfg);
        let mut scene = Scene::new();
        for delta in [200.0, 200.0, 3.0, 700.0, 200.0] {
            session.on_jump_signal(delta);
        }
        for batch in rx.try_iter() {
            scene.apply_all(&batch);
        }
        let sum = session.summary();
        assert_eq!(scene.score, sum.score);
        assert_eq!(scene.falls, sum.generation);
        assert_eq!(scene.player.map(|t| t.generation), Some(sum.generation));
        assert!(!scene.feedback_visible);
        // 20 + three perfect landings in the first tier
        assert!((scene.camera_y - (20.0 + 3.0 * 4.5)).abs() < 1e-4);
    }
}
