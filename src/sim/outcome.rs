/// The outcome engine: resolves one classified jump against the chain.
///
///   Short   → land past the target's near edge, respawn a fresh token
///   Perfect → land on the target, grow the chain, raise the camera
///   Long    → overshoot the target, respawn a fresh token
///
/// Misses leave the chain alone. Only a perfect landing moves the target.

use log::{debug, info};
use rand::Rng;

use crate::config::{CameraConfig, OutcomeConfig};
use crate::domain::chain::PlatformChain;
use crate::domain::jump::JumpKind;
use super::command::EntityCommand;
use super::state::GameState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn resolve<R: Rng>(
    kind: JumpKind,
    state: &mut GameState,
    chain: &mut PlatformChain,
    outcome: &OutcomeConfig,
    camera: &CameraConfig,
    rng: &mut R,
) -> Vec<EntityCommand> {
    let mut commands: Vec<EntityCommand> = Vec::with_capacity(6);
    state.jumps += 1;

    if kind.is_miss() {
        // Short lands before the target, long flies past it
        let miss_at = match kind {
            JumpKind::Short => chain.target().offset + outcome.short_overshoot,
            _ => chain.target().offset - outcome.long_overshoot,
        };
        resolve_miss(state, miss_at, &mut commands);
    } else {
        resolve_perfect(state, chain, outcome, camera, rng, &mut commands);
    }

    debug!("{} jump → {:?}", kind.label(), commands);
    commands
}

// ══════════════════════════════════════════════════════════════
// Miss (short / long)
// ══════════════════════════════════════════════════════════════

/// The jumping token falls at `miss_at` and stays there. A new token
/// takes over from where the jump started.
fn resolve_miss(state: &mut GameState, miss_at: f32, commands: &mut Vec<EntityCommand>) {
    let start = state.player.position;
    let retired = state.player.respawn(start);

    state.landed_at = miss_at;
    state.feedback_visible = true;
    state.misses += 1;

    info!(
        "missed at {:.1}; token {} retired, token {} waits at {:.1}",
        miss_at, retired.generation, state.player.generation, start
    );

    commands.push(EntityCommand::SetFeedbackVisible(true));
    commands.push(EntityCommand::RetirePlayerAndSpawn {
        retired_at: miss_at,
        position: state.player.position,
        generation: state.player.generation,
    });
}

// ══════════════════════════════════════════════════════════════
// Perfect landing
// ══════════════════════════════════════════════════════════════

fn resolve_perfect<R: Rng>(
    state: &mut GameState,
    chain: &mut PlatformChain,
    outcome: &OutcomeConfig,
    camera: &CameraConfig,
    rng: &mut R,
    commands: &mut Vec<EntityCommand>,
) {
    let reached = *chain.target();

    state.feedback_visible = false;
    commands.push(EntityCommand::SetFeedbackVisible(false));

    state.player.position = reached.offset;
    state.landed_at = reached.offset;
    commands.push(EntityCommand::MovePlayer {
        position: reached.offset,
        generation: state.player.generation,
    });

    state.score = reached.index;
    commands.push(EntityCommand::UpdateScore { score: state.score });

    let next = chain.append(rng);
    chain.advance_target(chain.last_index());
    commands.push(EntityCommand::SpawnPlatform {
        index: next.index,
        offset: next.offset,
        color: next.color,
    });

    // Tier is chosen by the freshly advanced target
    let step = camera.step_for(chain.target_index());
    state.camera_y += step;
    commands.push(EntityCommand::AdjustCamera { delta_y: step });

    state.feedback_offset = next.offset + outcome.feedback_lead;
    commands.push(EntityCommand::RepositionFeedback { offset: state.feedback_offset });

    info!(
        "landed on platform {} at {:.1}; next target {} at {:.1}",
        reached.index, reached.offset, next.index, next.offset
    );
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::jump::classify;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        cfg: GameConfig,
        state: GameState,
        chain: PlatformChain,
        rng: StdRng,
    }

    impl Fixture {
        fn new() -> Self {
            let cfg = GameConfig::default();
            let mut rng = StdRng::seed_from_u64(42);
            let chain = PlatformChain::seeded(&cfg.chain, &mut rng);
            let state = GameState::new(cfg.chain.landing_offset);
            Fixture { cfg, state, chain, rng }
        }

        fn jump(&mut self, delta: f64) -> Vec<EntityCommand> {
            let kind = classify(delta, &self.cfg.jump);
            resolve(
                kind,
                &mut self.state,
                &mut self.chain,
                &self.cfg.outcome,
                &self.cfg.camera,
                &mut self.rng,
            )
        }
    }

    fn camera_steps(cmds: &[EntityCommand]) -> Vec<f32> {
        cmds.iter()
            .filter_map(|c| match c {
                EntityCommand::AdjustCamera { delta_y } => Some(*delta_y),
                _ => None,
            })
            .collect()
    }

    // ── Scenarios ──

    #[test]
    fn short_jump_lands_before_target() {
        let mut f = Fixture::new();
        let target = *f.chain.target();
        let cmds = f.jump(10.0);

        assert!((f.state.landed_at - (target.offset + 2.0)).abs() < 1e-6);
        assert!(f.state.feedback_visible);
        assert!(cmds.contains(&EntityCommand::SetFeedbackVisible(true)));
        assert!(cmds.contains(&EntityCommand::RetirePlayerAndSpawn {
            retired_at: target.offset + 2.0,
            position: -15.0,
            generation: 1,
        }));
    }

    #[test]
    fn perfect_jump_appends_and_raises_camera() {
        let mut f = Fixture::new();
        let target = *f.chain.target();
        let cmds = f.jump(200.0);

        let new = *f.chain.last();
        assert!((new.offset - (target.offset - 5.0)).abs() < 1e-6);
        assert_eq!(camera_steps(&cmds), vec![4.5]);
        assert!((f.state.camera_y - 4.5).abs() < 1e-6);
        assert!(!f.state.feedback_visible);
        assert!((f.state.player.position - target.offset).abs() < 1e-6);
        assert!((f.state.feedback_offset - (new.offset + 3.0)).abs() < 1e-6);
        assert_eq!(f.state.score, target.index);
        assert!(cmds.contains(&EntityCommand::SpawnPlatform {
            index: new.index,
            offset: new.offset,
            color: new.color,
        }));
    }

    #[test]
    fn long_jump_overshoots_target() {
        let mut f = Fixture::new();
        let target = *f.chain.target();
        f.jump(600.0);

        assert!((f.state.landed_at - (target.offset - 2.0)).abs() < 1e-6);
        assert!(f.state.feedback_visible);
    }

    #[test]
    fn ninety_first_perfect_jump_uses_mid_tier() {
        let mut f = Fixture::new();
        let mut steps = Vec::new();
        for _ in 0..91 {
            steps.extend(camera_steps(&f.jump(200.0)));
        }
        assert_eq!(steps.len(), 91);
        assert!((steps[0] - 4.5).abs() < 1e-6);
        // Jump 88 lands the new target on 89, jump 89 on 90
        assert!((steps[87] - 4.5).abs() < 1e-6);
        assert!((steps[88] - 4.60).abs() < 1e-6);
        assert!((steps[90] - 4.60).abs() < 1e-6);
    }

    #[test]
    fn all_three_camera_tiers_are_reached() {
        let mut f = Fixture::new();
        let mut seen = Vec::new();
        for _ in 0..330 {
            for s in camera_steps(&f.jump(200.0)) {
                if seen.last() != Some(&s) {
                    seen.push(s);
                }
            }
        }
        assert_eq!(seen, vec![4.5, 4.60, 4.7]);
    }

    // ── Chain properties ──

    #[test]
    fn perfect_grows_chain_by_one_and_targets_it() {
        let mut f = Fixture::new();
        for _ in 0..5 {
            let before = f.chain.last_index();
            f.jump(100.0);
            assert_eq!(f.chain.last_index(), before + 1);
            assert_eq!(f.chain.target_index(), f.chain.last_index());
        }
    }

    #[test]
    fn misses_leave_chain_untouched() {
        let mut f = Fixture::new();
        f.jump(100.0);
        let (last, target) = (f.chain.last_index(), f.chain.target_index());
        for delta in [0.0, 14.9, 500.0, 9000.0] {
            f.jump(delta);
            assert_eq!(f.chain.last_index(), last);
            assert_eq!(f.chain.target_index(), target);
        }
    }

    #[test]
    fn generation_moves_only_on_misses() {
        let mut f = Fixture::new();
        let mut gen = f.state.player.generation;
        for delta in [10.0, 200.0, 600.0, 300.0, 1.0, 15.0, 500.0] {
            f.jump(delta);
            let now = f.state.player.generation;
            if classify(delta, &f.cfg.jump).is_miss() {
                assert!(now > gen, "delta {delta}");
            } else {
                assert_eq!(now, gen, "delta {delta}");
            }
            gen = now;
        }
    }

    #[test]
    fn respawned_token_waits_at_jump_start() {
        let mut f = Fixture::new();
        f.jump(200.0); // now standing on platform 1
        let start = f.state.player.position;
        f.jump(600.0);
        assert!((f.state.player.position - start).abs() < 1e-6);
        // Next perfect jump still aims at the same target
        let target = *f.chain.target();
        f.jump(200.0);
        assert!((f.state.player.position - target.offset).abs() < 1e-6);
        assert!(!f.state.feedback_visible);
    }

    #[test]
    fn score_tracks_last_perfect_platform() {
        let mut f = Fixture::new();
        assert_eq!(f.state.score, 0);
        f.jump(200.0);
        assert_eq!(f.state.score, 1);
        f.jump(5.0);
        assert_eq!(f.state.score, 1);
        f.jump(200.0);
        assert_eq!(f.state.score, 2);
        assert_eq!(f.state.jumps, 3);
        assert_eq!(f.state.misses, 1);
    }
}
