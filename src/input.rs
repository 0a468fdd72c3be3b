//! Input latch: raw key transitions to joystick bytes and button bits.
//!
//! The console reads its digital joystick as two pseudo-analog axis bytes
//! and its four buttons as active-low bits in the PSG's I/O port A. The
//! frame scheduler writes this latch on key transition events; the
//! emulation core reads it on its next `advance` call. There is no
//! debouncing: every transition applies immediately and unconditionally,
//! and a held key holds its bit cleared the whole time.

use bitflags::bitflags;

/// Resting axis value, restored on key-up.
pub const AXIS_REST: u8 = 0x80;
/// Axis value for left/down.
pub const AXIS_LOW: u8 = 0x00;
/// Axis value for right/up.
pub const AXIS_HIGH: u8 = 0xFF;

bitflags! {
    /// The four console buttons as they appear in PSG port A.
    ///
    /// Active-low, like the mixer register: a *cleared* bit means the
    /// button is held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buttons: u8 {
        /// Button 1
        const B1 = 0x01;
        /// Button 2
        const B2 = 0x02;
        /// Button 3
        const B3 = 0x04;
        /// Button 4
        const B4 = 0x08;
    }
}

/// Latched input state consumed by the emulation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLatch {
    /// Horizontal axis byte (0x00 left, 0x80 rest, 0xFF right).
    pub axis_x: u8,
    /// Vertical axis byte (0x00 down, 0x80 rest, 0xFF up).
    pub axis_y: u8,
    /// Button bits, active-low; only the low nibble is meaningful.
    buttons: u8,
}

impl InputLatch {
    /// Create a latch in the idle state: axes at rest, no buttons held.
    pub fn new() -> Self {
        InputLatch {
            axis_x: AXIS_REST,
            axis_y: AXIS_REST,
            buttons: Buttons::all().bits(),
        }
    }

    /// Key-down for a button: clears its bit.
    pub fn press(&mut self, button: Buttons) {
        self.buttons &= !button.bits();
    }

    /// Key-up for a button: sets its bit back.
    pub fn release(&mut self, button: Buttons) {
        self.buttons |= button.bits();
    }

    /// Whether a button is currently held (its bit cleared).
    pub fn held(&self, button: Buttons) -> bool {
        self.buttons & button.bits() == 0
    }

    /// Fold the button nibble into a PSG port A value, preserving the
    /// port's upper bits.
    pub fn fold_into_port(&self, port: u8) -> u8 {
        (port & 0xF0) | (self.buttons & 0x0F)
    }
}

impl Default for InputLatch {
    fn default() -> Self {
        Self::new()
    }
}
