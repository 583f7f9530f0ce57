/// Session: one running game, shared between input threads.
///
/// ## Serialization
///
/// Game state and the platform chain live behind a single `Mutex`.
/// `on_jump_signal` only ever *tries* the lock: a signal that arrives while
/// another resolution holds it is dropped, never queued. That gives at most
/// one resolution in flight regardless of how many threads deliver signals.
///
/// ## Output
///
/// Every resolution publishes its commands as one batch on a crossbeam
/// channel. The renderer drains the receiver; it never touches the state.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{CameraConfig, GameConfig, JumpConfig, OutcomeConfig};
use crate::domain::chain::PlatformChain;
use crate::domain::jump::{classify, JumpKind};
use super::command::EntityCommand;
use super::outcome;
use super::state::{GameState, Phase};

pub type CommandBatch = Vec<EntityCommand>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignalOutcome {
    Resolved(JumpKind),
    /// Another resolution was in flight, or the session is not active yet.
    Dropped,
}

/// Read-only view of the session for HUD and save.
#[derive(Clone, Copy, Debug)]
pub struct SessionSummary {
    pub score: usize,
    pub jumps: u64,
    pub misses: u64,
    pub target_index: usize,
    /// Platforms built so far, pruned ones included.
    pub platforms: usize,
    pub generation: u32,
}

struct Core {
    state: GameState,
    chain: PlatformChain,
    rng: StdRng,
    jump: JumpConfig,
    outcome: OutcomeConfig,
    camera: CameraConfig,
}

impl Core {
    /// A panic inside a resolution can leave a platform appended but not
    /// yet targeted. At rest the target is always the last platform.
    fn repair(&mut self) {
        let (target, last) = (self.chain.target_index(), self.chain.last_index());
        if target == last {
            warn!("session lock poisoned; state is consistent, continuing");
        } else {
            warn!("session lock poisoned mid-resolution; moving target {} to {}", target, last);
            self.chain.advance_target(last);
        }
    }
}

pub struct Session {
    core: Mutex<Core>,
    commands: Sender<CommandBatch>,
}

impl Session {
    /// Build the opening scene and go active.
    ///
    /// The setup batch (two platforms, the first token, a hidden feedback
    /// marker, the camera) is already waiting on the returned receiver.
    pub fn start(config: &GameConfig) -> (Session, Receiver<CommandBatch>) {
        let (tx, rx) = unbounded();
        let mut rng = match config.general.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let chain = PlatformChain::seeded(&config.chain, &mut rng);
        let landing = chain.get(0).map_or(config.chain.landing_offset, |s| s.offset);
        let mut state = GameState::new(landing);

        let mut setup: CommandBatch = chain.retained()
            .map(|s| EntityCommand::SpawnPlatform { index: s.index, offset: s.offset, color: s.color })
            .collect();

        setup.push(EntityCommand::SpawnPlayer {
            position: state.player.position,
            generation: state.player.generation,
        });

        state.feedback_visible = false;
        state.feedback_offset = chain.target().offset + config.outcome.feedback_lead;
        setup.push(EntityCommand::RepositionFeedback { offset: state.feedback_offset });
        setup.push(EntityCommand::SetFeedbackVisible(false));

        state.camera_y = config.camera.initial_height;
        setup.push(EntityCommand::AdjustCamera { delta_y: config.camera.initial_height });
        setup.push(EntityCommand::UpdateScore { score: state.score });

        state.phase = Phase::Active;
        info!(
            "session active: landing at {:.1}, first target {} at {:.1}, frontier {:.1}",
            landing, chain.target_index(), chain.target().offset, chain.last().offset
        );

        let session = Session {
            core: Mutex::new(Core {
                state,
                chain,
                rng,
                jump: config.jump,
                outcome: config.outcome,
                camera: config.camera.clone(),
            }),
            commands: tx,
        };
        session.publish(setup);

        (session, rx)
    }

    /// Entry point for motion/keyboard input: one completed gesture.
    pub fn on_jump_signal(&self, delta: f64) -> SignalOutcome {
        self.resolve_with(delta, || {})
    }

    /// Blocking read of the current progress.
    pub fn summary(&self) -> SessionSummary {
        let core = self.lock();
        SessionSummary {
            score: core.state.score,
            jumps: core.state.jumps,
            misses: core.state.misses,
            target_index: core.chain.target_index(),
            platforms: core.chain.len(),
            generation: core.state.player.generation,
        }
    }

    // ── Internal ──

    /// `hold` runs while the lock is held, before the jump is resolved.
    fn resolve_with(&self, delta: f64, hold: impl FnOnce()) -> SignalOutcome {
        let mut core = match self.core.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => {
                let mut core = poisoned.into_inner();
                core.repair();
                self.core.clear_poison();
                core
            }
            Err(TryLockError::WouldBlock) => {
                warn!("jump signal {:.1} dropped: evaluation already in progress", delta);
                return SignalOutcome::Dropped;
            }
        };

        if core.state.phase != Phase::Active {
            debug!("jump signal {:.1} dropped: session not active", delta);
            return SignalOutcome::Dropped;
        }

        hold();

        let kind = classify(delta, &core.jump);
        info!("jump signal {:.1} classified {}", delta, kind.label());

        let Core { state, chain, rng, outcome: outcome_cfg, camera, .. } = &mut *core;
        let batch = outcome::resolve(kind, state, chain, outcome_cfg, camera, rng);
        // Publish before releasing so batches reach the renderer in resolution order
        self.publish(batch);
        drop(core);

        SignalOutcome::Resolved(kind)
    }

    fn publish(&self, batch: CommandBatch) {
        if self.commands.send(batch).is_err() {
            debug!("command receiver gone; batch discarded");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
