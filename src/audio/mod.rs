//! Audio cue rendering, synthesized tones only, always best-effort.
//!
//! The clock never branches on audio success: every operation returns a typed
//! [`PlaybackOutcome`] that callers log and otherwise ignore, so a missing or
//! suspended output device can never stall or crash the tick loop.

#[cfg(feature = "synth-audio")]
mod synth;

use std::sync::Arc;

use crate::state::alerts::AlertCue;

#[cfg(feature = "synth-audio")]
pub use synth::SynthSoundEngine;

/// Typed result of a single audio operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The cue was handed to the output device queue.
    Played,
    /// Audio is administratively unavailable (disabled build or muted engine).
    Denied,
    /// The output device could not be opened or went away.
    DeviceError,
}

/// Fire-and-forget cue renderer.
///
/// Implementations must return quickly: actual synthesis and playback happen
/// off the caller's thread.
pub trait SoundEngine: Send + Sync {
    /// Queue a cue for playback.
    fn play(&self, cue: AlertCue) -> PlaybackOutcome;

    /// Tear down and re-acquire the output device (the "reload audio" control).
    fn reload(&self) -> PlaybackOutcome;
}

/// Engine used when audio is compiled out; every call is denied.
pub struct NullSoundEngine;

impl SoundEngine for NullSoundEngine {
    fn play(&self, _cue: AlertCue) -> PlaybackOutcome {
        PlaybackOutcome::Denied
    }

    fn reload(&self) -> PlaybackOutcome {
        PlaybackOutcome::Denied
    }
}

/// Build the default engine for this build configuration.
pub fn default_engine() -> Arc<dyn SoundEngine> {
    #[cfg(feature = "synth-audio")]
    {
        Arc::new(SynthSoundEngine::new())
    }
    #[cfg(not(feature = "synth-audio"))]
    {
        Arc::new(NullSoundEngine)
    }
}
