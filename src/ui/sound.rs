/// Sound cues: short procedural tones via rodio.
///
/// All cues are rendered to in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::command::EntityCommand;

/// Which cue a command batch calls for, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Land,
    Miss,
}

pub fn cue_for(batch: &[EntityCommand]) -> Option<Cue> {
    batch.iter().find_map(|c| match c {
        EntityCommand::MovePlayer { .. } => Some(Cue::Land),
        EntityCommand::RetirePlayerAndSpawn { .. } => Some(Cue::Miss),
        _ => None,
    })
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Cue;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::PI * 2.0;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_land: Arc<Vec<u8>>,
        sfx_miss: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_land: Arc::new(make_wav(&gen_land())),
                sfx_miss: Arc::new(make_wav(&gen_miss())),
            })
        }

        pub fn play(&self, cue: Cue) {
            let buf = match cue {
                Cue::Land => &self.sfx_land,
                Cue::Miss => &self.sfx_miss,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    /// Landing: bright two-note hop, E5 → B5
    fn gen_land() -> Vec<f32> {
        let notes = [(659.0_f32, 0.05), (988.0, 0.09)];
        let mut samples = Vec::new();
        for &(freq, dur) in &notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.6);
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    /// Miss: falling slide with a soft thud at the end
    fn gen_miss() -> Vec<f32> {
        let slide = (SAMPLE_RATE as f32 * 0.3) as usize;
        let mut samples = Vec::with_capacity(slide * 2);
        let mut phase = 0.0_f32;
        for i in 0..slide {
            let p = i as f32 / slide as f32;
            let freq = 700.0 - 550.0 * p;
            phase += freq * TAU / SAMPLE_RATE as f32;
            samples.push(phase.sin() * (1.0 - p * 0.5) * 0.25);
        }
        let thud = (SAMPLE_RATE as f32 * 0.08) as usize;
        for i in 0..thud {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / thud as f32;
            samples.push((t * 90.0 * TAU).sin() * env * 0.4);
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * bits_per_sample as u32 / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&(bits_per_sample / 8).to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
}
