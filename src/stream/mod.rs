//! Audio device integration using rodio.
//!
//! The platform audio thread drives playback by pulling samples from
//! [`PsgSource`], which refills an internal tick-sized buffer from the
//! synthesizer whenever it runs dry. Each refill copies the shared
//! register snapshot by value (a 16-byte copy under an uncontended lock),
//! so the pull never blocks beyond that and never fails — an absent or
//! silent register file just synthesizes silence.
//!
//! Pausing the sink stops the device from pulling; an in-flight refill
//! always completes. Dropping [`AudioDevice`] pauses the sink and closes
//! the stream, which must happen before process exit so no fill runs
//! against freed state.

use rodio::{OutputStream, Sink, Source};
use std::time::Duration;

use crate::psg::{
    PsgSynth, SharedDiagnostics, SharedRegisters, SynthDiagnostics, FILL_SAMPLES, SAMPLE_RATE,
};
use crate::{FrontendError, Result};

/// Audio source that synthesizes PSG samples on demand.
pub struct PsgSource {
    synth: PsgSynth,
    registers: SharedRegisters,
    diagnostics: SharedDiagnostics,
    buffer: Vec<u8>,
    pos: usize,
}

impl PsgSource {
    /// Create a source reading the given shared register snapshot and
    /// publishing diagnostics after each refill.
    pub fn new(registers: SharedRegisters, diagnostics: SharedDiagnostics) -> Self {
        PsgSource {
            synth: PsgSynth::new(),
            registers,
            diagnostics,
            buffer: vec![0; FILL_SAMPLES],
            pos: FILL_SAMPLES, // first pull refills
        }
    }

    fn refill(&mut self) {
        let snapshot = *self.registers.lock();
        self.synth.fill(&snapshot, &mut self.buffer);
        *self.diagnostics.lock() = Some(SynthDiagnostics::capture(&snapshot, &self.buffer));
        self.pos = 0;
    }
}

impl Iterator for PsgSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.buffer.len() {
            self.refill();
        }
        let sample = self.buffer[self.pos];
        self.pos += 1;
        Some(sample as f32 / 127.5 - 1.0)
    }
}

impl Source for PsgSource {
    fn current_frame_len(&self) -> Option<usize> {
        // The register stream never ends on its own
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Audio playback device.
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
}

impl AudioDevice {
    /// Open the default output device and start pulling from a
    /// [`PsgSource`] over the given shared state.
    ///
    /// An unavailable audio backend is a fatal platform failure for the
    /// caller; there is no video-only fallback.
    pub fn new(registers: SharedRegisters, diagnostics: SharedDiagnostics) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| FrontendError::Audio(format!("failed to open output stream: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| FrontendError::Audio(format!("failed to create sink: {e}")))?;
        sink.append(PsgSource::new(registers, diagnostics));

        Ok(AudioDevice {
            _stream: stream,
            sink,
        })
    }

    /// Suspend playback (entering pause).
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback.
    pub fn resume(&self) {
        self.sink.play();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.sink.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    use crate::psg::{Register, RegisterFile};

    fn shared_state() -> (SharedRegisters, SharedDiagnostics) {
        (
            Arc::new(Mutex::new(RegisterFile::new())),
            Arc::new(Mutex::new(None)),
        )
    }

    #[test]
    fn test_source_reports_psg_format() {
        let (registers, diagnostics) = shared_state();
        let source = PsgSource::new(registers, diagnostics);
        assert_eq!(source.channels(), 1);
        assert_eq!(source.sample_rate(), SAMPLE_RATE);
        assert_eq!(source.total_duration(), None);
    }

    #[test]
    fn test_source_yields_normalized_samples() {
        let (registers, diagnostics) = shared_state();
        {
            let mut regs = registers.lock();
            regs.write(Register::VoiceAPeriodLo.addr(), 0x00);
            regs.write(Register::VoiceAPeriodHi.addr(), 0x08);
            regs.write(Register::VoiceAVolume.addr(), 15);
            let mixer = regs.read(Register::Mixer.addr());
            regs.write(Register::Mixer.addr(), mixer & !0x01);
        }

        let mut source = PsgSource::new(registers, diagnostics.clone());
        for _ in 0..FILL_SAMPLES * 2 {
            let sample = source.next().expect("endless source");
            assert!((-1.0..=1.0).contains(&sample));
        }
        // The first pull published a diagnostics snapshot
        let diag = diagnostics.lock();
        let diag = diag.as_ref().expect("snapshot after refill");
        assert_eq!(diag.tone_period[0], 2048);
        assert_eq!(diag.pcm.len(), FILL_SAMPLES);
    }

    #[test]
    fn test_source_picks_up_register_changes_between_fills() {
        let (registers, diagnostics) = shared_state();
        let mut source = PsgSource::new(registers.clone(), diagnostics.clone());

        for _ in 0..FILL_SAMPLES {
            source.next();
        }
        assert_eq!(
            diagnostics.lock().as_ref().unwrap().tone_period[0],
            crate::psg::TONE_PERIOD_SILENT
        );

        registers
            .lock()
            .write(Register::VoiceAPeriodLo.addr(), 0x40);
        for _ in 0..FILL_SAMPLES {
            source.next();
        }
        assert_eq!(diagnostics.lock().as_ref().unwrap().tone_period[0], 0x40);
    }

    #[test]
    fn test_audio_device_creation() {
        let (registers, diagnostics) = shared_state();
        match AudioDevice::new(registers, diagnostics) {
            Ok(device) => {
                device.pause();
                device.resume();
            }
            Err(err) => {
                eprintln!("Skipping audio device test (backend unavailable): {err}");
            }
        }
    }
}
