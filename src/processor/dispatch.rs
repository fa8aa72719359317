//! Executes exactly one decoded instruction against a [`Processor`]. Kept
//! separate from `processor/mod.rs` because of its size.

use super::addressing::{self, AddressingMode, Mnemonic};
use super::{Processor, StepOutcome};
use crate::bus::{AudioSink, Framebuffer, InputSource, LogSink, OutputSink};
use crate::constants::*;
use crate::error::RuntimeError;
use crate::register::Flags;

pub fn execute<F, A, O, L>(
    p: &mut Processor<F, A, O, L>,
    input: &mut impl InputSource,
) -> StepOutcome
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let opcode_addr = p.registers.pc;
    let byte = match p.bus.read_defined(opcode_addr) {
        Some(b) => b,
        None => {
            // Undefined byte (never written): a graceful, non-fatal stop
            // rather than the diagnostic abort a defined-but-unknown byte
            // gets.
            p.executing = false;
            return StepOutcome::Halted;
        }
    };

    let (mnemonic, mode) = match addressing::decode(byte) {
        Some(pair) => pair,
        None => {
            p.executing = false;
            return StepOutcome::Error(RuntimeError::UnknownOpcode {
                address: opcode_addr,
                byte,
            });
        }
    };

    let operand_addr = opcode_addr.wrapping_add(1);
    p.registers.pc = opcode_addr.wrapping_add(1 + mode.operand_len());

    run(p, mnemonic, mode, operand_addr, input)
}

fn zp_word<F, A, O, L>(p: &Processor<F, A, O, L>, zp: u8) -> u16
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let lo = p.bus.read(zp as u16) as u16;
    let hi = p.bus.read(zp.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

/// Resolves the effective address for every mode except `Implied`,
/// `Accumulator`, `Immediate` and `Relative`, which have none.
fn effective_address<F, A, O, L>(
    p: &Processor<F, A, O, L>,
    mode: AddressingMode,
    operand_addr: u16,
) -> u16
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    use AddressingMode::*;
    match mode {
        ZeroPage => p.bus.read(operand_addr) as u16,
        ZeroPageX => p.bus.read(operand_addr).wrapping_add(p.registers.x) as u16,
        ZeroPageY => p.bus.read(operand_addr).wrapping_add(p.registers.y) as u16,
        Absolute => p.bus.read_u16(operand_addr),
        AbsoluteX => p
            .bus
            .read_u16(operand_addr)
            .wrapping_add(p.registers.x as u16),
        AbsoluteY => p
            .bus
            .read_u16(operand_addr)
            .wrapping_add(p.registers.y as u16),
        Indirect => {
            let ptr = p.bus.read_u16(operand_addr);
            // Faithful to the NMOS 6502: the high byte fetch doesn't cross a
            // page boundary, so $xxFF wraps to $xx00 rather than $(xx+1)00.
            let lo = p.bus.read(ptr) as u16;
            let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
            let hi = p.bus.read(hi_addr) as u16;
            (hi << 8) | lo
        }
        IndirectX => {
            let zp = p.bus.read(operand_addr).wrapping_add(p.registers.x);
            zp_word(p, zp)
        }
        IndirectY => {
            let zp = p.bus.read(operand_addr);
            zp_word(p, zp).wrapping_add(p.registers.y as u16)
        }
        Implied | Accumulator | Immediate | Relative => {
            unreachable!("no effective address for {:?}", mode)
        }
    }
}

fn load_value<F, A, O, L>(p: &Processor<F, A, O, L>, mode: AddressingMode, operand_addr: u16) -> u8
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    if mode == AddressingMode::Immediate {
        p.bus.read(operand_addr)
    } else {
        let addr = effective_address(p, mode, operand_addr);
        p.bus.read(addr)
    }
}

fn adc<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8)
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let a = p.registers.a;
    let carry_in: u16 = if p.registers.p.contains(Flags::CARRY) {
        1
    } else {
        0
    };

    if p.registers.p.contains(Flags::DECIMAL) {
        let mut lo = (a & 0x0F) as u16 + (value & 0x0F) as u16 + carry_in;
        let mut hi = (a >> 4) as u16 + (value >> 4) as u16;
        if lo > 9 {
            lo += 6;
            hi += 1;
        }
        let binary_sum = a as u16 + value as u16 + carry_in;
        let overflow = (!(a ^ value) & (a ^ binary_sum as u8)) & 0x80 != 0;
        if hi > 9 {
            hi += 6;
        }
        let result = (((hi & 0x0F) << 4) | (lo & 0x0F)) as u8;
        p.registers.p.assign(Flags::CARRY, hi > 15);
        p.registers.p.assign(Flags::OVERFLOW, overflow);
        p.registers.p.set_zn(result);
        p.registers.a = result;
    } else {
        let sum = a as u16 + value as u16 + carry_in;
        let result = sum as u8;
        let overflow = (!(a ^ value) & (a ^ result)) & 0x80 != 0;
        p.registers.p.assign(Flags::CARRY, sum > 0xFF);
        p.registers.p.assign(Flags::OVERFLOW, overflow);
        p.registers.p.set_zn(result);
        p.registers.a = result;
    }
}

fn sbc<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8)
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    if p.registers.p.contains(Flags::DECIMAL) {
        let a = p.registers.a as i16;
        let v = value as i16;
        let borrow_in: i16 = if p.registers.p.contains(Flags::CARRY) {
            0
        } else {
            1
        };

        let binary = a - v - borrow_in;
        p.registers.p.assign(Flags::CARRY, binary >= 0);
        let overflow = ((a as u8 ^ value) & (a as u8 ^ binary as u8) & 0x80) != 0;
        p.registers.p.assign(Flags::OVERFLOW, overflow);

        let mut lo = (a & 0x0F) - (v & 0x0F) - borrow_in;
        let mut hi = (a >> 4) - (v >> 4);
        if lo < 0 {
            lo -= 6;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 6;
        }
        let result = (((hi & 0x0F) << 4) | (lo & 0x0F)) as u8;
        p.registers.p.set_zn(result);
        p.registers.a = result;
    } else {
        adc(p, !value);
    }
}

fn compare<F, A, O, L>(p: &mut Processor<F, A, O, L>, register: u8, value: u8)
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let result = register.wrapping_sub(value);
    p.registers.p.assign(Flags::CARRY, register >= value);
    p.registers.p.set_zn(result);
}

fn bit<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8)
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let result = p.registers.a & value;
    p.registers.p.assign(Flags::ZERO, result == 0);
    p.registers.p.assign(Flags::NEGATIVE, value & 0x80 != 0);
    p.registers.p.assign(Flags::OVERFLOW, value & 0x40 != 0);
}

fn asl<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8) -> u8
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let carry = value & 0x80 != 0;
    let result = value << 1;
    p.registers.p.assign(Flags::CARRY, carry);
    p.registers.p.set_zn(result);
    result
}

fn lsr<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8) -> u8
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let carry = value & 0x01 != 0;
    let result = value >> 1;
    p.registers.p.assign(Flags::CARRY, carry);
    p.registers.p.set_zn(result);
    result
}

fn rol<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8) -> u8
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let carry_in = p.registers.p.contains(Flags::CARRY) as u8;
    let carry_out = value & 0x80 != 0;
    let result = (value << 1) | carry_in;
    p.registers.p.assign(Flags::CARRY, carry_out);
    p.registers.p.set_zn(result);
    result
}

fn ror<F, A, O, L>(p: &mut Processor<F, A, O, L>, value: u8) -> u8
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let carry_in = p.registers.p.contains(Flags::CARRY) as u8;
    let carry_out = value & 0x01 != 0;
    let result = (value >> 1) | (carry_in << 7);
    p.registers.p.assign(Flags::CARRY, carry_out);
    p.registers.p.set_zn(result);
    result
}

fn branch<F, A, O, L>(p: &mut Processor<F, A, O, L>, operand_addr: u16, taken: bool)
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    if taken {
        let offset = p.bus.read(operand_addr) as i8;
        p.registers.pc = (p.registers.pc as i32 + offset as i32) as u16;
    }
}

#[allow(clippy::cognitive_complexity)]
fn run<F, A, O, L>(
    p: &mut Processor<F, A, O, L>,
    mnemonic: Mnemonic,
    mode: AddressingMode,
    operand_addr: u16,
    input: &mut impl InputSource,
) -> StepOutcome
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    use Mnemonic::*;

    match mnemonic {
        // Loads and transfers.
        LDA => {
            let value = load_value(p, mode, operand_addr);
            p.registers.a = value;
            p.registers.p.set_zn(value);
        }
        LDX => {
            let value = load_value(p, mode, operand_addr);
            p.registers.x = value;
            p.registers.p.set_zn(value);
        }
        LDY => {
            let value = load_value(p, mode, operand_addr);
            p.registers.y = value;
            p.registers.p.set_zn(value);
        }
        STA => {
            let addr = effective_address(p, mode, operand_addr);
            p.bus.write(addr, p.registers.a);
        }
        STX => {
            let addr = effective_address(p, mode, operand_addr);
            p.bus.write(addr, p.registers.x);
        }
        STY => {
            let addr = effective_address(p, mode, operand_addr);
            p.bus.write(addr, p.registers.y);
        }
        TAX => {
            p.registers.x = p.registers.a;
            p.registers.p.set_zn(p.registers.x);
        }
        TAY => {
            p.registers.y = p.registers.a;
            p.registers.p.set_zn(p.registers.y);
        }
        TXA => {
            p.registers.a = p.registers.x;
            p.registers.p.set_zn(p.registers.a);
        }
        TYA => {
            p.registers.a = p.registers.y;
            p.registers.p.set_zn(p.registers.a);
        }
        TSX => {
            p.registers.x = p.registers.sp;
            p.registers.p.set_zn(p.registers.x);
        }
        TXS => {
            p.registers.sp = p.registers.x;
        }

        // Arithmetic and logic.
        ADC => {
            let value = load_value(p, mode, operand_addr);
            adc(p, value);
        }
        SBC => {
            let value = load_value(p, mode, operand_addr);
            sbc(p, value);
        }
        AND => {
            let value = load_value(p, mode, operand_addr);
            p.registers.a &= value;
            p.registers.p.set_zn(p.registers.a);
        }
        ORA => {
            let value = load_value(p, mode, operand_addr);
            p.registers.a |= value;
            p.registers.p.set_zn(p.registers.a);
        }
        EOR => {
            let value = load_value(p, mode, operand_addr);
            p.registers.a ^= value;
            p.registers.p.set_zn(p.registers.a);
        }
        CMP => {
            let value = load_value(p, mode, operand_addr);
            compare(p, p.registers.a, value);
        }
        CPX => {
            let value = load_value(p, mode, operand_addr);
            compare(p, p.registers.x, value);
        }
        CPY => {
            let value = load_value(p, mode, operand_addr);
            compare(p, p.registers.y, value);
        }
        BIT => {
            let value = load_value(p, mode, operand_addr);
            bit(p, value);
        }

        // Increments and decrements.
        INC => {
            let addr = effective_address(p, mode, operand_addr);
            let result = p.bus.read(addr).wrapping_add(1);
            p.bus.write(addr, result);
            p.registers.p.set_zn(result);
        }
        DEC => {
            let addr = effective_address(p, mode, operand_addr);
            let result = p.bus.read(addr).wrapping_sub(1);
            p.bus.write(addr, result);
            p.registers.p.set_zn(result);
        }
        INX => {
            p.registers.x = p.registers.x.wrapping_add(1);
            p.registers.p.set_zn(p.registers.x);
        }
        INY => {
            p.registers.y = p.registers.y.wrapping_add(1);
            p.registers.p.set_zn(p.registers.y);
        }
        DEX => {
            p.registers.x = p.registers.x.wrapping_sub(1);
            p.registers.p.set_zn(p.registers.x);
        }
        DEY => {
            p.registers.y = p.registers.y.wrapping_sub(1);
            p.registers.p.set_zn(p.registers.y);
        }

        // Shifts and rotates.
        ASL => {
            if mode == AddressingMode::Accumulator {
                let result = asl(p, p.registers.a);
                p.registers.a = result;
            } else {
                let addr = effective_address(p, mode, operand_addr);
                let value = p.bus.read(addr);
                let result = asl(p, value);
                p.bus.write(addr, result);
            }
        }
        LSR => {
            if mode == AddressingMode::Accumulator {
                let result = lsr(p, p.registers.a);
                p.registers.a = result;
            } else {
                let addr = effective_address(p, mode, operand_addr);
                let value = p.bus.read(addr);
                let result = lsr(p, value);
                p.bus.write(addr, result);
            }
        }
        ROL => {
            if mode == AddressingMode::Accumulator {
                let result = rol(p, p.registers.a);
                p.registers.a = result;
            } else {
                let addr = effective_address(p, mode, operand_addr);
                let value = p.bus.read(addr);
                let result = rol(p, value);
                p.bus.write(addr, result);
            }
        }
        ROR => {
            if mode == AddressingMode::Accumulator {
                let result = ror(p, p.registers.a);
                p.registers.a = result;
            } else {
                let addr = effective_address(p, mode, operand_addr);
                let value = p.bus.read(addr);
                let result = ror(p, value);
                p.bus.write(addr, result);
            }
        }

        // Branches.
        BCC => branch(p, operand_addr, !p.registers.p.contains(Flags::CARRY)),
        BCS => branch(p, operand_addr, p.registers.p.contains(Flags::CARRY)),
        BEQ => branch(p, operand_addr, p.registers.p.contains(Flags::ZERO)),
        BNE => branch(p, operand_addr, !p.registers.p.contains(Flags::ZERO)),
        BPL => branch(p, operand_addr, !p.registers.p.contains(Flags::NEGATIVE)),
        BMI => branch(p, operand_addr, p.registers.p.contains(Flags::NEGATIVE)),
        BVC => branch(p, operand_addr, !p.registers.p.contains(Flags::OVERFLOW)),
        BVS => branch(p, operand_addr, p.registers.p.contains(Flags::OVERFLOW)),

        // Jumps and subroutines.
        JMP => {
            p.registers.pc = effective_address(p, mode, operand_addr);
        }
        JSR => {
            let target = effective_address(p, mode, operand_addr);
            let return_addr = p.registers.pc.wrapping_sub(1);
            p.push_word(return_addr);
            p.registers.pc = target;
        }
        RTS => {
            p.registers.pc = p.pull_word().wrapping_add(1);
        }
        BRK => {
            let return_addr = p.registers.pc.wrapping_add(1);
            p.push_word(return_addr);
            let pushed = p.registers.p.pushed(true);
            p.push_byte(pushed);
            p.registers.p.insert(Flags::INTERRUPT_DISABLE);
            p.registers.pc = p.bus.read_u16(IRQ_VECTOR);
        }
        RTI => {
            let bits = p.pull_byte();
            p.registers.p = Flags::from_bits_truncate(bits);
            p.registers.p.insert(Flags::UNUSED);
            p.registers.pc = p.pull_word();
        }

        // Stack operations.
        PHA => p.push_byte(p.registers.a),
        PHP => {
            let pushed = p.registers.p.pushed(true);
            p.push_byte(pushed);
        }
        PLA => {
            let value = p.pull_byte();
            p.registers.a = value;
            p.registers.p.set_zn(value);
        }
        PLP => {
            let bits = p.pull_byte();
            p.registers.p = Flags::from_bits_truncate(bits);
            p.registers.p.insert(Flags::UNUSED);
        }

        // Flag instructions.
        CLC => p.registers.p.assign(Flags::CARRY, false),
        SEC => p.registers.p.assign(Flags::CARRY, true),
        CLD => p.registers.p.assign(Flags::DECIMAL, false),
        SED => p.registers.p.assign(Flags::DECIMAL, true),
        CLI => p.registers.p.assign(Flags::INTERRUPT_DISABLE, false),
        SEI => p.registers.p.assign(Flags::INTERRUPT_DISABLE, true),
        CLV => p.registers.p.assign(Flags::OVERFLOW, false),

        NOP => {}

        // Custom extensions, not part of the documented 6502 instruction set.
        HLT => {
            p.executing = false;
            return StepOutcome::Halted;
        }
        OUT => {
            let code = p.registers.a as u16;
            p.bus.output.write_output_char(code);
        }
        OUY => {
            let code = ((p.registers.a as u16) << 8) | p.registers.y as u16;
            p.bus.output.write_output_char(code);
        }
        IN => {
            p.registers.a = p.next_input_byte(input);
        }
        WAI => {
            p.waiting = true;
            return StepOutcome::Suspended;
        }
    }

    StepOutcome::Continue
}
