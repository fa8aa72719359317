//! CPU register file: the three 8-bit accumulators/index registers, the
//! stack pointer, the program counter, and the processor status flags.

use crate::constants::{self, RESET_STATUS};
use bitflags::bitflags;

bitflags! {
    /// Processor status bits, from bit 0: C, Z, I, D, B, unused, V, N.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY             = constants::FLAG_CARRY;
        const ZERO              = constants::FLAG_ZERO;
        const INTERRUPT_DISABLE = constants::FLAG_INTERRUPT_DISABLE;
        const DECIMAL           = constants::FLAG_DECIMAL;
        const BREAK             = constants::FLAG_BREAK;
        const UNUSED            = constants::FLAG_UNUSED;
        const OVERFLOW          = constants::FLAG_OVERFLOW;
        const NEGATIVE          = constants::FLAG_NEGATIVE;
    }
}

impl Flags {
    /// `PHP`/`BRK` push this with the break bit set; `IRQ`/`NMI` push the
    /// hardware variant instead, with the break bit clear.
    pub fn pushed(self, software: bool) -> u8 {
        let mut bits = self.bits() | constants::FLAG_UNUSED;
        if software {
            bits |= constants::FLAG_BREAK;
        } else {
            bits &= !constants::FLAG_BREAK;
        }
        bits
    }

    /// Sets or clears Z and N from a result byte; bit 5 is always left set.
    pub fn set_zn(&mut self, result: u8) {
        self.assign(Flags::ZERO, result == 0);
        self.assign(Flags::NEGATIVE, result & 0x80 != 0);
        self.insert(Flags::UNUSED);
    }

    /// Like the bitflags-generated `set`, but keeps bit 5 pinned high.
    pub fn assign(&mut self, flag: Flags, value: bool) {
        if value {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
        self.insert(Flags::UNUSED);
    }
}

impl Default for Flags {
    fn default() -> Flags {
        Flags::from_bits_truncate(RESET_STATUS)
    }
}

/// The programmer-visible CPU state: three 8-bit registers, the 8-bit
/// stack pointer, the 16-bit program counter, and status flags.
#[derive(Clone, Copy, Debug)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: Flags,
}

impl Registers {
    pub fn new() -> Registers {
        Registers {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: constants::DEFAULT_START,
            p: Flags::default(),
        }
    }

    /// Resets registers to their power-on state: A/X/Y cleared, SP = 0xFF,
    /// P = 0x24; PC is set separately from the reset vector.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFF;
        self.p = Flags::default();
    }
}

impl Default for Registers {
    fn default() -> Registers {
        Registers::new()
    }
}
