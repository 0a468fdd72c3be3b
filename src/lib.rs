//! Real-time AV presentation frontend for a Vectrex emulator core
//!
//! Bridges a periodically-updated AY-3-8912 register snapshot to a
//! continuous audio stream and a per-frame vector image, while keeping
//! the emulated machine's clock locked to wall-clock time. Three
//! independently-paced activities share a small block of state: a fixed
//! 20 ms emulation tick, the polled input/render loop, and the audio
//! thread pulling samples at its own cadence.
//!
//! # Features
//! - Naive phase-stepped PSG square-wave and noise synthesis at 22 050 Hz
//! - Fixed 50 Hz tick scheduler with spin or sleep pacing and pause/quit
//! - Vector display-list rendering with an endpoint pass for zero-length
//!   segments, plus an optional audio debug overlay
//! - Joystick/button input latching with the console's active-low wiring
//!
//! The CPU/hardware core is an external collaborator behind the
//! [`Machine`] trait; a deterministic [`DemoMachine`] is bundled so the
//! binary runs stand-alone.
//!
//! # Quick start
//! ## Synthesize from a register snapshot
//! ```
//! use vectrex_av::psg::{PsgSynth, RegisterFile};
//! let mut synth = PsgSynth::new();
//! let mut regs = RegisterFile::new();
//! regs.write(0, 0x00); // Voice A period lo
//! regs.write(1, 0x08); // Voice A period hi
//! regs.write(8, 0x0F); // Voice A volume
//! regs.write(7, 0x3E); // Mixer: voice A tone on (active-low)
//! let mut buffer = [0u8; 441];
//! synth.fill(&regs, &mut buffer);
//! ```
//!
//! ## Run the full frontend
//! ```no_run
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use vectrex_av::{AudioDevice, Config, DemoMachine, FrameScheduler};
//!
//! let config = Config::default();
//! let registers = Arc::new(Mutex::new(vectrex_av::psg::RegisterFile::new()));
//! let diagnostics = Arc::new(Mutex::new(None));
//! let audio = AudioDevice::new(Arc::clone(&registers), Arc::clone(&diagnostics))?;
//! let mut scheduler =
//!     FrameScheduler::new(DemoMachine::new(), &config, registers, diagnostics, audio)?;
//! scheduler.run()?;
//! # Ok::<(), vectrex_av::FrontendError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod display;
pub mod input;
pub mod machine;
pub mod psg;
pub mod scheduler;
pub mod stream;

/// Error type for frontend operations.
///
/// The synthesizer and renderer have no failure modes of their own —
/// numeric edge cases clamp. These variants cover the platform resources
/// the frontend cannot run without, and all of them are fatal: there is
/// no degraded video-only or audio-only mode.
#[derive(thiserror::Error, Debug)]
pub enum FrontendError {
    /// Window or presentation surface unavailable
    #[error("Window error: {0}")]
    Window(String),

    /// Audio device unavailable
    #[error("Audio error: {0}")]
    Audio(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for frontend operations.
pub type Result<T> = std::result::Result<T, FrontendError>;

// Public API exports
pub use config::{Config, PacingMode};
pub use display::{ColorTable, VectorRenderer};
pub use input::{Buttons, InputLatch};
pub use machine::{DemoMachine, DisplayList, LineSegment, Machine};
pub use psg::{MixerFlags, PsgSynth, RegisterFile, SynthDiagnostics};
pub use scheduler::{FrameScheduler, RunState};
pub use stream::{AudioDevice, PsgSource};
