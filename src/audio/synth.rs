//! Rodio-backed tone synthesis on a dedicated audio thread.

use std::f32::consts::PI;
use std::sync::{Mutex, mpsc};
use std::thread;

use rodio::{OutputStream, Sink, buffer::SamplesBuffer};
use tracing::warn;

use crate::{
    audio::{PlaybackOutcome, SoundEngine},
    state::alerts::AlertCue,
};

const SAMPLE_RATE: u32 = 44_100;

/// Sound engine generating tones programmatically, no sample assets involved.
///
/// The rodio output stream is not `Send`, so a dedicated thread owns it and
/// receives cues over a channel; `play` only performs a non-blocking send.
pub struct SynthSoundEngine {
    sender: Mutex<Option<mpsc::Sender<AlertCue>>>,
}

impl SynthSoundEngine {
    /// Spawn the audio thread and return the engine handle.
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(Some(spawn_audio_thread())),
        }
    }
}

impl Default for SynthSoundEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundEngine for SynthSoundEngine {
    fn play(&self, cue: AlertCue) -> PlaybackOutcome {
        let mut guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(_) => return PlaybackOutcome::DeviceError,
        };

        match guard.as_ref() {
            Some(sender) => match sender.send(cue) {
                Ok(()) => PlaybackOutcome::Played,
                Err(_) => {
                    // Audio thread exited, most likely because the output
                    // device could not be opened. Drop the stale sender.
                    guard.take();
                    PlaybackOutcome::DeviceError
                }
            },
            None => PlaybackOutcome::DeviceError,
        }
    }

    fn reload(&self) -> PlaybackOutcome {
        let mut guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(_) => return PlaybackOutcome::DeviceError,
        };

        // Dropping the previous sender lets the old thread drain and exit.
        *guard = Some(spawn_audio_thread());
        PlaybackOutcome::Played
    }
}

fn spawn_audio_thread() -> mpsc::Sender<AlertCue> {
    let (sender, receiver) = mpsc::channel::<AlertCue>();

    thread::Builder::new()
        .name("clock-audio".into())
        .spawn(move || {
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(error = %err, "audio output device unavailable; cues will be dropped");
                    return;
                }
            };
            let sink = match Sink::try_new(&handle) {
                Ok(sink) => sink,
                Err(err) => {
                    warn!(error = %err, "failed to open audio sink; cues will be dropped");
                    return;
                }
            };

            while let Ok(cue) = receiver.recv() {
                for (frequency, duration_ms) in cue_tones(cue) {
                    let samples = sine_tone(frequency, duration_ms);
                    sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
                }
            }
        })
        .map(|_| ())
        .unwrap_or_else(|err| warn!(error = %err, "failed to spawn audio thread"));

    sender
}

/// Tone sequence for each cue: `(frequency in Hz, duration in ms)`.
fn cue_tones(cue: AlertCue) -> Vec<(f32, u64)> {
    match cue {
        AlertCue::OneMinuteWarning => vec![(330.0, 400)],
        AlertCue::FinalCountdown(_) => vec![(880.0, 120)],
        AlertCue::LevelComplete => vec![(660.0, 250), (880.0, 250)],
    }
}

/// Generate a sine tone with a short linear fade-out to avoid clicks.
fn sine_tone(frequency: f32, duration_ms: u64) -> Vec<f32> {
    let total = (SAMPLE_RATE as u64 * duration_ms / 1_000) as usize;
    let fade = (total / 10).max(1);

    (0..total)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = if i + fade >= total {
                (total - i) as f32 / fade as f32
            } else {
                1.0
            };
            (2.0 * PI * frequency * t).sin() * 0.4 * envelope
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_have_expected_length() {
        let samples = sine_tone(440.0, 100);
        assert_eq!(samples.len(), 4_410);
        assert!(samples.iter().all(|s| s.abs() <= 0.4 + f32::EPSILON));
    }

    #[test]
    fn level_complete_is_two_tones() {
        assert_eq!(cue_tones(AlertCue::LevelComplete).len(), 2);
    }
}
