/// Entry point and frame loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{info, warn};

use config::GameConfig;
use sim::save::{self, Record};
use sim::session::{CommandBatch, Session};
use ui::gamepad;
use ui::input::{InputState, JumpCharge};
use ui::renderer::{Hud, Renderer};
use ui::scene::Scene;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(16);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init(&config.general.log_file, &config.general.log_level) {
        eprintln!("Warning: logging disabled: {e}");
    }
    info!("hopper starting");

    let mut record = save::load_record().unwrap_or_default();

    let (session, commands) = Session::start(&config);
    let session = Arc::new(session);

    // Dropping the sender stops the motion thread
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    let motion = gamepad::spawn_motion_thread(
        Arc::clone(&session),
        config.motion,
        config.gamepad,
        stop_rx,
    );

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            let _ = renderer.cleanup();
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let sound = SoundEngine::new();

    let mut kb = InputState::new(&config.keyboard);
    kb.honor_release = honor_release;
    let result = game_loop(
        &session, &commands, &mut renderer, &mut kb,
        sound.as_ref(), &config, &record, motion.is_some(),
    );

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    drop(stop_tx);
    if let Some(handle) = motion {
        if handle.join().is_err() {
            warn!("motion thread panicked");
        }
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    let summary = session.summary();
    let new_best = record.absorb(summary.score, summary.jumps, summary.misses);
    if let Err(e) = save::save_record(&record) {
        eprintln!("Warning: {e}");
    }
    info!(
        "session over: platform {}, target {}, {} platforms built, {} jumps, {} misses, token {}",
        summary.score, summary.target_index, summary.platforms, summary.jumps, summary.misses, summary.generation
    );
    log::logger().flush();

    println!();
    println!("Thanks for playing Hopper!");
    println!("Reached platform: {}{}", summary.score, if new_best { "  (new best!)" } else { "" });
    println!("Jumps: {}  Falls: {}  Platforms: {}", summary.jumps, summary.misses, summary.platforms);
}

#[allow(clippy::too_many_arguments)]
fn game_loop(
    session: &Session,
    commands: &Receiver<CommandBatch>,
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    record: &Record,
    motion_active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scene = Scene::new();
    let mut charge = JumpCharge::new(&config.keyboard);

    loop {
        kb.drain_events();
        if kb.quit_pressed() {
            break;
        }

        let now = Instant::now();
        if let Some(delta) = charge.update(kb, now) {
            let outcome = session.on_jump_signal(delta);
            info!("keyboard jump {:.1}° → {:?}", delta, outcome);
        }

        for batch in commands.try_iter() {
            if let (Some(sfx), Some(cue)) = (sound, sound::cue_for(&batch)) {
                sfx.play(cue);
            }
            scene.apply_all(&batch);
        }

        let hud = Hud {
            best: record.best_score.max(scene.score),
            charge: charge.preview(now),
            short_threshold: config.jump.short_threshold,
            long_threshold: config.jump.long_threshold,
            motion_active,
        };
        renderer.render(&scene, &hud)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
