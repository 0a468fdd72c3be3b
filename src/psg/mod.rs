//! AY-3-8912 PSG emulation: register model and sample synthesis.
//!
//! The PSG side of the frontend is split into:
//! - [`registers`] — the 16-byte register file and mixer-flag decoding
//! - [`noise`] — the fixed pseudorandom noise waveform table
//! - [`synth`] — register snapshot to 8-bit PCM conversion

pub mod noise;
pub mod registers;
pub mod synth;

pub use registers::{MixerFlags, Register, RegisterFile};
pub use synth::{PsgSynth, SharedDiagnostics, SharedRegisters, SynthDiagnostics};

/// Number of tone voices on the chip.
pub const NUM_VOICES: usize = 3;

/// Audio output rate in samples per second.
pub const SAMPLE_RATE: u32 = 22_050;

/// Samples per fill, sized to one 20 ms scheduler tick at [`SAMPLE_RATE`].
pub const FILL_SAMPLES: usize = 441;

/// Tuning constant mapping register period divisors to phase-step units.
///
/// Chosen so that typical in-game divisors land in the audible square-wave
/// range at [`SAMPLE_RATE`]; the mapping is deliberately naive (no band
/// limiting) and aliases at high tone frequencies.
pub const STEP_SCALE: f32 = 441.0;

/// Clamped maximum tone divisor. A divisor at this value (including a raw
/// zero divisor, which clamps up to it) is treated as inaudible and
/// contributes no tone output at all.
pub const TONE_PERIOD_SILENT: u16 = 4095;

/// Substitute noise divisor for a raw zero noise period.
pub const NOISE_PERIOD_CLAMP: u16 = 256;

/// Numerator for deriving the noise stepping frequency from its divisor.
pub const NOISE_FREQ_SCALE: u32 = 440 * 213;
