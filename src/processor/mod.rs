//! The interpreter: fetch/decode/execute loop, stack machinery, and
//! interrupt vectoring. A thin public facade (`Processor`) owning the
//! registers and the bus, delegating the actual opcode execution to
//! `dispatch`.

pub mod addressing;
mod dispatch;

use crate::bus::{AudioSink, Bus, Framebuffer, InputSource, LogSink, OutputSink};
use crate::constants::*;
use crate::error::RuntimeError;
use crate::register::{Flags, Registers};
use std::collections::VecDeque;

/// What happened during the most recent [`Processor::step`] — an explicit
/// outcome a host can match on for both batch and single-step drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted,
    /// `WAI` suspended the loop; an interrupt or explicit resume continues it.
    Suspended,
    Error(RuntimeError),
}

pub struct Processor<F, A, O, L> {
    pub registers: Registers,
    pub bus: Bus<F, A, O, L>,
    input_buffer: VecDeque<u8>,
    waiting: bool,
    executing: bool,
    pub maskable_keyboard_interrupt: bool,
    pub maskable_mouse_interrupt: bool,
    nmi_pending: bool,
    irq_pending: bool,
}

impl<F, A, O, L> Processor<F, A, O, L>
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    pub fn new(bus: Bus<F, A, O, L>) -> Processor<F, A, O, L> {
        Processor {
            registers: Registers::new(),
            bus,
            input_buffer: VecDeque::new(),
            waiting: false,
            executing: true,
            maskable_keyboard_interrupt: false,
            maskable_mouse_interrupt: false,
            nmi_pending: false,
            irq_pending: false,
        }
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Reset sequence: clear A/X/Y, SP = 0xFF, P = 0x24, read the reset
    /// vector and jump there if non-zero, else PC = 0x0800. Also clears the
    /// keyboard/mouse mapped cells.
    pub fn reset(&mut self) {
        self.registers.reset();

        let vector = self.bus.read_u16(RESET_VECTOR);
        self.registers.pc = if vector != 0 {
            vector
        } else {
            DEFAULT_START
        };

        for addr in KEY_UP_ADDR..=KEY_ENTER_ADDR {
            self.bus.write_input_cell(addr, 0);
        }
        for addr in MOUSE_LEFT_ADDR..=MOUSE_MIDDLE_ADDR {
            self.bus.write_input_cell(addr, 0);
        }

        self.input_buffer.clear();
        self.waiting = false;
        self.executing = true;
        self.nmi_pending = false;
        self.irq_pending = false;
    }

    /// Feeds a line of host input, terminated with a NUL sentinel, into the
    /// buffer consumed by the `IN` opcode.
    pub fn feed_input_line(&mut self, line: &str) {
        self.input_buffer.extend(line.bytes());
        self.input_buffer.push_back(0);
    }

    /// Raises the non-maskable interrupt; serviced on the next step.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
        self.waiting = false;
    }

    /// Raises a maskable interrupt request; serviced on the next step only
    /// if `P.I` is clear.
    pub fn request_irq(&mut self) {
        self.irq_pending = true;
        if !self.registers.p.contains(Flags::INTERRUPT_DISABLE) {
            self.waiting = false;
        }
    }

    /// A keyboard event: writes `value` into the mapped cell at `address`
    /// (one of the arrow-key/enter cells, or the raw key code at
    /// `KEY_CODE_ADDR`), then — if `maskable_keyboard_interrupt` is armed
    /// and `P.I` is clear — vectors a hardware interrupt through
    /// `0xFFFE/0xFFFF` immediately, ahead of the next step's fetch.
    pub fn handle_key_event(&mut self, address: u16, value: u8) {
        self.bus.write_input_cell(address, value);
        if self.maskable_keyboard_interrupt && !self.registers.p.contains(Flags::INTERRUPT_DISABLE) {
            self.service_interrupt(IRQ_VECTOR, false);
        }
    }

    /// A mouse event: writes `value` into the mapped cell at `address`
    /// (one of the button-state cells, or the `event.buttons` mask), then
    /// — if `maskable_mouse_interrupt` is armed and `P.I` is clear —
    /// vectors a hardware interrupt through `0xFFFE/0xFFFF` immediately,
    /// ahead of the next step's fetch.
    pub fn handle_mouse_event(&mut self, address: u16, value: u8) {
        self.bus.write_input_cell(address, value);
        if self.maskable_mouse_interrupt && !self.registers.p.contains(Flags::INTERRUPT_DISABLE) {
            self.service_interrupt(IRQ_VECTOR, false);
        }
    }

    pub fn push_byte(&mut self, value: u8) {
        self.bus.write(STACK_PAGE + self.registers.sp as u16, value);
        self.registers.sp = self.registers.sp.wrapping_sub(1);
    }

    pub fn pull_byte(&mut self) -> u8 {
        self.registers.sp = self.registers.sp.wrapping_add(1);
        self.bus.read(STACK_PAGE + self.registers.sp as u16)
    }

    pub fn push_word(&mut self, value: u16) {
        self.push_byte((value >> 8) as u8);
        self.push_byte(value as u8);
    }

    pub fn pull_word(&mut self) -> u16 {
        let lo = self.pull_byte() as u16;
        let hi = self.pull_byte() as u16;
        (hi << 8) | lo
    }

    fn service_interrupt(&mut self, vector: u16, software_break: bool) {
        self.push_word(self.registers.pc);
        self.push_byte(self.registers.p.pushed(software_break));
        self.registers.p.insert(Flags::INTERRUPT_DISABLE);
        self.registers.pc = self.bus.read_u16(vector);
        self.waiting = false;
    }

    /// Executes exactly one instruction (or services a pending interrupt),
    /// refreshing the random-number register at 0x00FE with a fresh byte
    /// first.
    pub fn step(&mut self, input: &mut impl InputSource) -> StepOutcome {
        if !self.executing {
            return StepOutcome::Halted;
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            self.service_interrupt(NMI_VECTOR, false);
        } else if self.irq_pending && !self.registers.p.contains(Flags::INTERRUPT_DISABLE) {
            self.irq_pending = false;
            self.service_interrupt(IRQ_VECTOR, false);
        } else if self.waiting {
            return StepOutcome::Suspended;
        }

        let random_byte: u8 = rand::random();
        self.bus.write_input_cell(RANDOM_ADDR, random_byte);

        dispatch::execute(self, input)
    }

    fn next_input_byte(&mut self, input: &mut impl InputSource) -> u8 {
        if self.input_buffer.is_empty() {
            let ch = input.read_input_char();
            if ch == 0 {
                return 0;
            }
            self.input_buffer.push_back(ch);
        }
        self.input_buffer.pop_front().unwrap_or(0)
    }
}
