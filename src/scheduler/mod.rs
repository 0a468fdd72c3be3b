//! Fixed-tick frame scheduler.
//!
//! Drives the non-recoverable state machine {Running, Paused, Stopped} on
//! the main thread. Each 20 ms tick while Running: drain all pending key
//! transitions into the input latch, advance the machine by the tick's
//! cycle budget, publish the register snapshot for the audio thread,
//! rasterize and present the display list, then pace to the tick deadline.
//!
//! Pacing spins by default — a blocking sleep trades scheduling jitter
//! for CPU and can be selected per deployment via [`PacingMode`].
//! Pausing suspends both emulation advance and the audio sink; quitting
//! is terminal. The only errors are platform failures (the window going
//! away), which are fatal to the caller.

use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::config::{Config, PacingMode};
use crate::display::VectorRenderer;
use crate::input::{Buttons, InputLatch, AXIS_HIGH, AXIS_LOW, AXIS_REST};
use crate::machine::{Machine, CLOCK_HZ};
use crate::psg::{SharedDiagnostics, SharedRegisters};
use crate::stream::AudioDevice;
use crate::{FrontendError, Result};

/// Fixed tick period in milliseconds (50 Hz).
pub const TICK_MS: u64 = 20;

/// Emulated cycles to run per tick of the given length.
pub fn cycle_budget(tick_ms: u64) -> u32 {
    CLOCK_HZ / 1000 * tick_ms as u32
}

/// Status-line refresh interval: roughly once a second normally, ten
/// times a second while the audio debug overlay is up.
pub fn status_interval(overlay: bool) -> Duration {
    if overlay {
        Duration::from_millis(100)
    } else {
        Duration::from_secs(1)
    }
}

/// Coarse run state; transitions are driven only by input events on the
/// main thread and Stopped is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Emulation advancing, audio playing.
    Running,
    /// Emulation and audio suspended; input still polled.
    Paused,
    /// Loop exited; the process is shutting down.
    Stopped,
}

/// The main-thread loop: window, renderer, machine and audio handle.
pub struct FrameScheduler<M: Machine> {
    machine: M,
    window: Window,
    renderer: VectorRenderer,
    latch: InputLatch,
    state: RunState,
    registers: SharedRegisters,
    diagnostics: SharedDiagnostics,
    audio: AudioDevice,
    pacing: PacingMode,
    overlay: bool,
    frames: u32,
}

impl<M: Machine> FrameScheduler<M> {
    /// Create the window and wire the scheduler up. The audio device is
    /// owned here so that dropping the scheduler closes it before the
    /// process exits.
    pub fn new(
        machine: M,
        config: &Config,
        registers: SharedRegisters,
        diagnostics: SharedDiagnostics,
        audio: AudioDevice,
    ) -> Result<Self> {
        let mut window = Window::new(
            "vectrex-av",
            config.window_width,
            config.window_height,
            WindowOptions::default(),
        )
        .map_err(|e| FrontendError::Window(format!("failed to create window: {e}")))?;
        // Pacing is ours; disable the window's own frame limiter
        window.set_target_fps(0);

        Ok(FrameScheduler {
            machine,
            window,
            renderer: VectorRenderer::new(config.window_width, config.window_height),
            latch: InputLatch::new(),
            state: RunState::Running,
            registers,
            diagnostics,
            audio,
            pacing: config.pacing,
            overlay: config.debug_overlay,
            frames: 0,
        })
    }

    /// Reset the machine and run ticks until Stopped.
    pub fn run(&mut self) -> Result<()> {
        self.machine.reset();
        let budget = cycle_budget(TICK_MS);
        let tick = Duration::from_millis(TICK_MS);
        let mut tick_start = Instant::now();
        let mut status_at = Instant::now();
        self.frames = 0;

        while self.state != RunState::Stopped {
            if !self.window.is_open() {
                self.state = RunState::Stopped;
                break;
            }

            self.poll_input();

            match self.state {
                RunState::Stopped => break,
                RunState::Paused => {
                    self.window.set_title("vectrex-av (paused)");
                    self.window.update();
                }
                RunState::Running => {
                    self.machine.advance(budget, &self.latch);
                    *self.registers.lock() = *self.machine.registers();

                    let diag = self.diagnostics.lock().clone();
                    self.renderer
                        .render(self.machine.display_list(), diag.as_ref(), self.overlay);
                    let (width, height) = (self.renderer.width(), self.renderer.height());
                    self.window
                        .update_with_buffer(self.renderer.buffer(), width, height)
                        .map_err(|e| {
                            FrontendError::Window(format!("presentation failed: {e}"))
                        })?;
                    self.frames += 1;
                    self.publish_status(&mut status_at);
                }
            }

            self.pace(tick_start + tick);
            tick_start = Instant::now();
        }

        Ok(())
    }

    /// Drain every pending key transition. Axis state is latest-wins;
    /// button bits are held state, set and cleared per transition.
    fn poll_input(&mut self) {
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            match key {
                Key::Left => self.latch.axis_x = AXIS_LOW,
                Key::Right => self.latch.axis_x = AXIS_HIGH,
                Key::Up => self.latch.axis_y = AXIS_HIGH,
                Key::Down => self.latch.axis_y = AXIS_LOW,
                Key::A => self.latch.press(Buttons::B1),
                Key::S => self.latch.press(Buttons::B2),
                Key::D => self.latch.press(Buttons::B3),
                Key::F => self.latch.press(Buttons::B4),
                Key::P | Key::Space => self.toggle_pause(),
                Key::W => self.overlay = !self.overlay,
                Key::Q | Key::Escape => self.state = RunState::Stopped,
                _ => {}
            }
        }
        for key in self.window.get_keys_released() {
            match key {
                Key::Left | Key::Right => self.latch.axis_x = AXIS_REST,
                Key::Up | Key::Down => self.latch.axis_y = AXIS_REST,
                Key::A => self.latch.release(Buttons::B1),
                Key::S => self.latch.release(Buttons::B2),
                Key::D => self.latch.release(Buttons::B3),
                Key::F => self.latch.release(Buttons::B4),
                _ => {}
            }
        }
    }

    fn toggle_pause(&mut self) {
        match self.state {
            RunState::Running => {
                self.state = RunState::Paused;
                self.audio.pause();
            }
            RunState::Paused => {
                self.state = RunState::Running;
                self.audio.resume();
            }
            RunState::Stopped => {}
        }
    }

    fn publish_status(&mut self, status_at: &mut Instant) {
        let elapsed = status_at.elapsed();
        if elapsed < status_interval(self.overlay) {
            return;
        }

        let title = if self.overlay {
            match self.diagnostics.lock().as_ref() {
                Some(d) => format!(
                    "F: {:04} {:04} {:04}  V: {:02} {:02} {:02}  T: {}{}{}  N: {}{}{}",
                    d.tone_period[0],
                    d.tone_period[1],
                    d.tone_period[2],
                    d.volume[0],
                    d.volume[1],
                    d.volume[2],
                    u8::from(!d.tone_muted[0]),
                    u8::from(!d.tone_muted[1]),
                    u8::from(!d.tone_muted[2]),
                    u8::from(!d.noise_muted[0]),
                    u8::from(!d.noise_muted[1]),
                    u8::from(!d.noise_muted[2]),
                ),
                None => "vectrex-av (no audio yet)".to_string(),
            }
        } else {
            let fps = self.frames as f64 / elapsed.as_secs_f64();
            format!(
                "vectrex-av ({:.1} FPS) Drawn: {}",
                fps,
                self.machine.display_list().len()
            )
        };
        self.window.set_title(&title);
        *status_at = Instant::now();
        self.frames = 0;
    }

    fn pace(&self, deadline: Instant) {
        match self.pacing {
            PacingMode::Spin => {
                while Instant::now() < deadline {
                    std::hint::spin_loop();
                }
            }
            PacingMode::Sleep => {
                let now = Instant::now();
                if now < deadline {
                    std::thread::sleep(deadline - now);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_budget_matches_tick() {
        // 1.5 MHz for 20 ms
        assert_eq!(cycle_budget(TICK_MS), 30_000);
        assert_eq!(cycle_budget(1), 1_500);
    }

    #[test]
    fn test_status_interval() {
        assert_eq!(status_interval(false), Duration::from_secs(1));
        assert_eq!(status_interval(true), Duration::from_millis(100));
    }
}
