//! Built-in demo machine.
//!
//! A deliberately small stand-in for the real emulation core: it draws a
//! rotating spoke figure inside a frame border, moves a crosshair with the
//! joystick axes, and maps the buttons onto PSG tone/noise registers so
//! the whole audio path can be heard. Everything is integer math driven
//! by the accumulated cycle count, so identical advance sequences always
//! reproduce identical output.

use super::{DisplayList, LineSegment, Machine, BEAM_MAX_X, BEAM_MAX_Y};
use crate::input::{Buttons, InputLatch};
use crate::psg::{MixerFlags, Register, RegisterFile};

/// sin(2*pi*k/64) scaled by 1000, one full turn.
const SIN_TABLE: [i32; 64] = [
    0, 98, 195, 290, 383, 471, 556, 634, 707, 773, 831, 882, 924, 957, 981, 995, 1000, 995, 981,
    957, 924, 882, 831, 773, 707, 634, 556, 471, 383, 290, 195, 98, 0, -98, -195, -290, -383, -471,
    -556, -634, -707, -773, -831, -882, -924, -957, -981, -995, -1000, -995, -981, -957, -924,
    -882, -831, -773, -707, -634, -556, -471, -383, -290, -195, -98,
];

/// Tone divisors selected by the first three buttons.
const NOTE_PERIODS: [u16; 3] = [2048, 1638, 1365];

/// Noise divisor (raw 5-bit field) while button 4 is held.
const NOISE_NOTE: u8 = 15;

/// Cycles per rotation step of the spoke figure.
const CYCLES_PER_STEP: u64 = 8192;

const CENTER_X: i32 = BEAM_MAX_X / 2;
const CENTER_Y: i32 = BEAM_MAX_Y / 2;
const SPOKE_RADIUS: i32 = 12_000;
const CROSSHAIR_ARM: i32 = 1200;

fn sin(index: u64) -> i32 {
    SIN_TABLE[(index % 64) as usize]
}

fn cos(index: u64) -> i32 {
    SIN_TABLE[((index + 16) % 64) as usize]
}

/// Deterministic demo core implementing [`Machine`].
#[derive(Debug, Clone)]
pub struct DemoMachine {
    regs: RegisterFile,
    list: DisplayList,
    cycles: u64,
}

impl DemoMachine {
    /// Create a demo machine in its power-on state.
    pub fn new() -> Self {
        DemoMachine {
            regs: RegisterFile::new(),
            list: DisplayList::new(),
            cycles: 0,
        }
    }

    fn update_audio(&mut self, input: &InputLatch) {
        let mut mixer = MixerFlags::all();
        let mut volume = 0u8;
        let mut period = 0u16;
        let mut noise = 0u8;

        for (slot, button) in [Buttons::B1, Buttons::B2, Buttons::B3].iter().enumerate() {
            if input.held(*button) {
                mixer.remove(MixerFlags::TONE_A);
                volume = 15;
                period = NOTE_PERIODS[slot];
                break;
            }
        }
        if input.held(Buttons::B4) {
            mixer.remove(MixerFlags::NOISE_A);
            volume = 15;
            noise = NOISE_NOTE;
        }

        self.regs.write(Register::VoiceAPeriodLo.addr(), (period & 0xFF) as u8);
        self.regs.write(Register::VoiceAPeriodHi.addr(), (period >> 8) as u8);
        self.regs.write(Register::VoiceAVolume.addr(), volume);
        self.regs.write(Register::NoisePeriod.addr(), noise);
        self.regs.write(Register::Mixer.addr(), mixer.bits());

        let port = self.regs.read(Register::PortA.addr());
        self.regs.write(Register::PortA.addr(), input.fold_into_port(port));
    }

    fn rebuild_display(&mut self, input: &InputLatch) {
        self.list.clear();

        // Frame border
        let inset = 600;
        let (left, top) = (inset, inset);
        let (right, bottom) = (BEAM_MAX_X - inset, BEAM_MAX_Y - inset);
        for (x0, y0, x1, y1) in [
            (left, top, right, top),
            (right, top, right, bottom),
            (right, bottom, left, bottom),
            (left, bottom, left, top),
        ] {
            self.list.push(LineSegment {
                x0,
                y0,
                x1,
                y1,
                color: 96,
            });
        }

        // Rotating spokes
        let step = self.cycles / CYCLES_PER_STEP;
        for spoke in 0..8u64 {
            let angle = step + spoke * 8;
            let x = CENTER_X + SPOKE_RADIUS * cos(angle) / 1000;
            let y = CENTER_Y + SPOKE_RADIUS * sin(angle) / 1000;
            self.list.push(LineSegment {
                x0: CENTER_X,
                y0: CENTER_Y,
                x1: x,
                y1: y,
                color: 127,
            });
        }

        // Joystick crosshair: axis bytes span the beam space, up is 0xFF
        let cx = input.axis_x as i32 * BEAM_MAX_X / 255;
        let cy = (255 - input.axis_y as i32) * BEAM_MAX_Y / 255;
        self.list.push(LineSegment {
            x0: cx - CROSSHAIR_ARM,
            y0: cy,
            x1: cx + CROSSHAIR_ARM,
            y1: cy,
            color: 112,
        });
        self.list.push(LineSegment {
            x0: cx,
            y0: cy - CROSSHAIR_ARM,
            x1: cx,
            y1: cy + CROSSHAIR_ARM,
            color: 112,
        });
        // Center dot: a zero-length segment the beam dwells on
        self.list.push(LineSegment {
            x0: cx,
            y0: cy,
            x1: cx,
            y1: cy,
            color: 127,
        });
    }
}

impl Machine for DemoMachine {
    fn reset(&mut self) {
        self.regs = RegisterFile::new();
        self.list.clear();
        self.cycles = 0;
    }

    fn advance(&mut self, cycles: u32, input: &InputLatch) {
        self.cycles += cycles as u64;
        self.update_audio(input);
        self.rebuild_display(input);
    }

    fn display_list(&self) -> &DisplayList {
        &self.list
    }

    fn registers(&self) -> &RegisterFile {
        &self.regs
    }
}

impl Default for DemoMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::AXIS_LOW;

    fn scripted_inputs() -> Vec<InputLatch> {
        let mut inputs = Vec::new();
        let mut latch = InputLatch::new();
        inputs.push(latch);
        latch.press(Buttons::B1);
        inputs.push(latch);
        latch.axis_x = AXIS_LOW;
        inputs.push(latch);
        latch.release(Buttons::B1);
        latch.press(Buttons::B4);
        inputs.push(latch);
        inputs
    }

    fn run(machine: &mut DemoMachine, inputs: &[InputLatch]) -> Vec<(RegisterFile, DisplayList)> {
        machine.reset();
        inputs
            .iter()
            .map(|latch| {
                machine.advance(30_000, latch);
                (*machine.registers(), machine.display_list().clone())
            })
            .collect()
    }

    #[test]
    fn test_reset_and_replay_is_deterministic() {
        let inputs = scripted_inputs();
        let mut machine = DemoMachine::new();
        let first = run(&mut machine, &inputs);
        // Same machine, reset and replayed
        let second = run(&mut machine, &inputs);
        assert_eq!(first, second);
        // Fresh machine
        let third = run(&mut DemoMachine::new(), &inputs);
        assert_eq!(first, third);
    }

    #[test]
    fn test_button_drives_tone_registers() {
        let mut machine = DemoMachine::new();
        let mut latch = InputLatch::new();
        latch.press(Buttons::B2);
        machine.advance(30_000, &latch);

        let regs = machine.registers();
        assert!(!regs.mixer().tone_muted(0));
        assert_eq!(regs.tone_period(0), NOTE_PERIODS[1]);
        assert_eq!(regs.volume(0), 15);

        latch.release(Buttons::B2);
        machine.advance(30_000, &latch);
        assert!(machine.registers().mixer().tone_muted(0));
    }

    #[test]
    fn test_button_bits_fold_into_port_a() {
        let mut machine = DemoMachine::new();
        let mut latch = InputLatch::new();
        latch.press(Buttons::B3);
        machine.advance(30_000, &latch);
        assert_eq!(machine.registers().read(Register::PortA.addr()), 0x0B);
    }

    #[test]
    fn test_display_list_contains_degenerate_point() {
        let mut machine = DemoMachine::new();
        machine.advance(30_000, &InputLatch::new());
        assert!(machine
            .display_list()
            .as_slice()
            .iter()
            .any(|s| s.x0 == s.x1 && s.y0 == s.y1));
    }

    fn crosshair_center(machine: &DemoMachine) -> (i32, i32) {
        let point = machine
            .display_list()
            .as_slice()
            .iter()
            .find(|s| s.x0 == s.x1 && s.y0 == s.y1)
            .expect("crosshair center point");
        (point.x0, point.y0)
    }

    #[test]
    fn test_crosshair_follows_axes() {
        let mut machine = DemoMachine::new();
        let mut latch = InputLatch::new();
        machine.advance(30_000, &latch);
        assert_eq!(crosshair_center(&machine).0, 128 * BEAM_MAX_X / 255);

        latch.axis_x = AXIS_LOW;
        machine.advance(30_000, &latch);
        assert_eq!(crosshair_center(&machine).0, 0);
    }
}
