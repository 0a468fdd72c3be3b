//! PSG sample synthesis.
//!
//! Converts a register-file snapshot into unsigned 8-bit PCM at
//! [`SAMPLE_RATE`](super::SAMPLE_RATE). The synthesizer is driven from the
//! audio thread at whatever cadence the output device drains its buffers;
//! between calls it persists only what audible continuity needs: each
//! voice's output toggle and flip accumulator, the shared noise position
//! and the smoothing filter's last output sample. Everything else is
//! re-derived from the register snapshot on every fill.
//!
//! Synthesis is intentionally naive: phase-stepped square waves with a
//! period-proportional step and a 2-tap output average. It never fails;
//! zero divisors are clamped by the register accessors, not reported.

use std::sync::Arc;

use parking_lot::Mutex;

use super::noise::{noise_table, NOISE_TABLE_LEN};
use super::registers::RegisterFile;
use super::{FILL_SAMPLES, NOISE_FREQ_SCALE, NUM_VOICES, SAMPLE_RATE, STEP_SCALE, TONE_PERIOD_SILENT};

/// Register snapshot shared between the scheduler (writer, once per tick)
/// and the audio thread (reader, once per fill).
pub type SharedRegisters = Arc<Mutex<RegisterFile>>;

/// Diagnostics slot shared between the audio thread (writer, once per
/// fill) and the renderer's debug overlay (reader). `None` until the
/// first fill completes.
pub type SharedDiagnostics = Arc<Mutex<Option<SynthDiagnostics>>>;

/// Read-only snapshot of the synthesizer's view of the chip, captured
/// after each buffer fill for the debug overlay.
#[derive(Debug, Clone)]
pub struct SynthDiagnostics {
    /// Decoded tone period divisors (already zero-clamped).
    pub tone_period: [u16; NUM_VOICES],
    /// Raw 4-bit volumes.
    pub volume: [u8; NUM_VOICES],
    /// Active-low mixer state, decoded per voice.
    pub tone_muted: [bool; NUM_VOICES],
    /// Active-low noise mixer state, decoded per voice.
    pub noise_muted: [bool; NUM_VOICES],
    /// Decoded noise period divisor.
    pub noise_period: u16,
    /// Copy of the most recently filled PCM buffer.
    pub pcm: Vec<u8>,
}

impl SynthDiagnostics {
    /// Capture a snapshot from the register file just synthesized and the
    /// buffer it produced.
    pub fn capture(regs: &RegisterFile, pcm: &[u8]) -> Self {
        let mixer = regs.mixer();
        let mut tone_period = [0u16; NUM_VOICES];
        let mut volume = [0u8; NUM_VOICES];
        let mut tone_muted = [false; NUM_VOICES];
        let mut noise_muted = [false; NUM_VOICES];
        for voice in 0..NUM_VOICES {
            tone_period[voice] = regs.tone_period(voice);
            volume[voice] = regs.volume(voice);
            tone_muted[voice] = mixer.tone_muted(voice);
            noise_muted[voice] = mixer.noise_muted(voice);
        }
        SynthDiagnostics {
            tone_period,
            volume,
            tone_muted,
            noise_muted,
            noise_period: regs.noise_period(),
            pcm: pcm.to_vec(),
        }
    }
}

/// Per-voice runtime state carried between fills.
#[derive(Debug, Clone, Copy)]
struct VoiceState {
    /// Square-wave toggle: the voice contributes its full volume while
    /// high and nothing while low.
    high: bool,
    /// Flip accumulator: the sample index (relative to the current buffer
    /// start) at which the toggle next inverts.
    flip: f32,
}

impl VoiceState {
    fn new() -> Self {
        VoiceState {
            high: true,
            flip: 0.0,
        }
    }
}

/// The PSG square-wave and noise synthesizer.
#[derive(Debug, Clone)]
pub struct PsgSynth {
    voices: [VoiceState; NUM_VOICES],
    /// Shared running index into the noise table.
    noise_pos: usize,
    /// Previous output sample, the 2-tap smoothing filter's memory.
    last_out: u8,
    /// Flip accumulators are seeded from the first fill's steps.
    primed: bool,
}

impl PsgSynth {
    /// Create a synthesizer in its process-start state.
    pub fn new() -> Self {
        PsgSynth {
            voices: [VoiceState::new(); NUM_VOICES],
            noise_pos: 0,
            last_out: 0,
            primed: false,
        }
    }

    /// Fill `out` with `out.len()` samples synthesized from `regs`,
    /// updating the persisted voice/noise/filter state for continuity with
    /// the next call.
    pub fn fill(&mut self, regs: &RegisterFile, out: &mut [u8]) {
        let mixer = regs.mixer();
        let table = noise_table();

        let mut period = [0u16; NUM_VOICES];
        let mut level = [0u8; NUM_VOICES];
        let mut step = [0f32; NUM_VOICES];
        for voice in 0..NUM_VOICES {
            period[voice] = regs.tone_period(voice);
            level[voice] = regs.volume(voice) << 2;
            step[voice] = STEP_SCALE * period[voice] as f32 / SAMPLE_RATE as f32;
        }

        let noise_freq = NOISE_FREQ_SCALE / regs.noise_period() as u32;
        let noise_step = (STEP_SCALE * noise_freq as f32 / SAMPLE_RATE as f32) as usize;

        if !self.primed {
            for voice in 0..NUM_VOICES {
                self.voices[voice].flip = step[voice];
            }
            self.primed = true;
        }

        for (i, sample) in out.iter_mut().enumerate() {
            let mut raw = 0u8;

            for voice in 0..NUM_VOICES {
                if !mixer.tone_muted(voice)
                    && period[voice] < TONE_PERIOD_SILENT
                    && self.voices[voice].high
                {
                    raw = raw.wrapping_add(level[voice]);
                }
            }

            for voice in 0..NUM_VOICES {
                if (i as f32) > self.voices[voice].flip {
                    self.voices[voice].high = !self.voices[voice].high;
                    self.voices[voice].flip += step[voice];
                }
            }

            let noise_sample = table[self.noise_pos] as u16;
            for voice in 0..NUM_VOICES {
                if !mixer.noise_muted(voice) {
                    raw = raw.wrapping_add(((level[voice] as u16 * noise_sample) >> 9) as u8);
                }
            }
            self.noise_pos = (self.noise_pos + noise_step) % NOISE_TABLE_LEN;

            let smoothed = ((raw as u16 + self.last_out as u16) >> 1) as u8;
            *sample = smoothed;
            self.last_out = smoothed;
        }

        // Rebase flip positions onto the next buffer's index space. The
        // floor keeps a starved accumulator (step below one sample) from
        // drifting without bound.
        let len = out.len() as f32;
        for voice in 0..NUM_VOICES {
            self.voices[voice].flip = (self.voices[voice].flip - len).max(-1.0);
        }
    }

    /// Fill one tick-sized buffer and return it, for callers without a
    /// preallocated buffer.
    pub fn fill_tick(&mut self, regs: &RegisterFile) -> Vec<u8> {
        let mut out = vec![0u8; FILL_SAMPLES];
        self.fill(regs, &mut out);
        out
    }
}

impl Default for PsgSynth {
    fn default() -> Self {
        Self::new()
    }
}
