//! A simulator for an educational, 6502-derived microprocessor: a flat
//! 64 KiB address space, the three 8-bit registers, a 256-byte hardware
//! stack, and a memory-mapped framebuffer/keyboard/mouse/audio surface.
//! The companion `mos6502-asm` crate turns assembly source into the
//! memory image this crate executes.

pub mod bus;
pub mod constants;
pub mod disassembler;
pub mod error;
pub mod memory;
pub mod processor;
pub mod register;
pub mod scheduler;

pub use bus::{AudioSink, Bus, ConsolePeripherals, Framebuffer, InputSource, LogSink, NullPeripherals, OutputSink};
pub use error::RuntimeError;
pub use memory::Memory;
pub use processor::{Processor, StepOutcome};
pub use register::{Flags, Registers};
pub use scheduler::{Scheduler, TickOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    fn new_processor() -> Processor<NullPeripherals, NullPeripherals, NullPeripherals, NullPeripherals> {
        let bus = Bus::new(
            NullPeripherals,
            NullPeripherals,
            NullPeripherals,
            NullPeripherals,
        );
        let mut processor = Processor::new(bus);
        processor.bus.memory.write_u16(constants::RESET_VECTOR, 0);
        processor.reset();
        processor
    }

    #[test]
    fn reset_lands_at_default_start_without_a_vector() {
        let processor = new_processor();
        assert_eq!(processor.registers.pc, constants::DEFAULT_START);
        assert_eq!(processor.registers.sp, 0xFF);
        assert_eq!(processor.registers.p, Flags::default());
    }

    #[test]
    fn reset_vector_overrides_default_start() {
        let mut processor = new_processor();
        processor
            .bus
            .memory
            .write_u16(constants::RESET_VECTOR, 0x1234);
        processor.reset();
        assert_eq!(processor.registers.pc, 0x1234);
    }

    #[test]
    fn lda_immediate_sets_accumulator_and_flags() {
        let mut processor = new_processor();
        let pc = processor.registers.pc;
        processor.bus.write(pc, 0xA9); // LDA #$00
        processor.bus.write(pc + 1, 0x00);

        let mut input = NullPeripherals;
        let outcome = processor.step(&mut input);

        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(processor.registers.a, 0);
        assert!(processor.registers.p.contains(Flags::ZERO));
    }

    #[test]
    fn hlt_stops_execution() {
        let mut processor = new_processor();
        let pc = processor.registers.pc;
        processor.bus.write(pc, 0x02); // HLT

        let mut input = NullPeripherals;
        let outcome = processor.step(&mut input);

        assert_eq!(outcome, StepOutcome::Halted);
        assert!(!processor.is_executing());
    }

    #[test]
    fn unknown_opcode_on_a_defined_byte_is_an_error() {
        let mut processor = new_processor();
        let pc = processor.registers.pc;
        processor.bus.write(pc, 0x03); // undocumented, never assigned

        let mut input = NullPeripherals;
        let outcome = processor.step(&mut input);

        match outcome {
            StepOutcome::Error(RuntimeError::UnknownOpcode { address, byte }) => {
                assert_eq!(address, pc);
                assert_eq!(byte, 0x03);
            }
            other => panic!("expected UnknownOpcode, got {:?}", other),
        }
    }

    #[test]
    fn never_written_byte_halts_gracefully() {
        let mut processor = new_processor();
        let mut input = NullPeripherals;
        let outcome = processor.step(&mut input);
        assert_eq!(outcome, StepOutcome::Halted);
    }

    #[test]
    fn jsr_then_rts_round_trips_the_program_counter() {
        let mut processor = new_processor();
        let pc = processor.registers.pc;
        processor.bus.write(pc, 0x20); // JSR $9000
        processor.bus.write_u16(pc + 1, 0x9000);
        processor.bus.write(0x9000, 0x60); // RTS

        let mut input = NullPeripherals;
        assert_eq!(processor.step(&mut input), StepOutcome::Continue);
        assert_eq!(processor.registers.pc, 0x9000);
        assert_eq!(processor.step(&mut input), StepOutcome::Continue);
        assert_eq!(processor.registers.pc, pc + 3);
    }

    #[test]
    fn adc_sets_carry_and_overflow_on_signed_wraparound() {
        let mut processor = new_processor();
        processor.registers.a = 0x7F;
        let pc = processor.registers.pc;
        processor.bus.write(pc, 0x69); // ADC #$01
        processor.bus.write(pc + 1, 0x01);

        let mut input = NullPeripherals;
        processor.step(&mut input);

        assert_eq!(processor.registers.a, 0x80);
        assert!(processor.registers.p.contains(Flags::OVERFLOW));
        assert!(processor.registers.p.contains(Flags::NEGATIVE));
        assert!(!processor.registers.p.contains(Flags::CARRY));
    }

    #[test]
    fn sbc_decimal_sets_negative_from_the_corrected_byte_not_the_raw_difference() {
        let mut processor = new_processor();
        processor.registers.a = 0x05;
        processor.registers.p.insert(Flags::DECIMAL);
        processor.registers.p.insert(Flags::CARRY); // borrow_in = 0
        let pc = processor.registers.pc;
        processor.bus.write(pc, 0xE9); // SBC #$50
        processor.bus.write(pc + 1, 0x50);

        let mut input = NullPeripherals;
        processor.step(&mut input);

        // 0x05 - 0x50 with no borrow corrects to 0x55 in BCD; bit 7 of the
        // corrected byte is clear even though the raw binary difference
        // (-75 as u8 = 0xB5) has it set.
        assert_eq!(processor.registers.a, 0x55);
        assert!(!processor.registers.p.contains(Flags::NEGATIVE));
        assert!(!processor.registers.p.contains(Flags::ZERO));
    }

    #[test]
    fn key_event_only_writes_the_cell_when_the_keyboard_interrupt_is_disarmed() {
        let mut processor = new_processor();
        processor.handle_key_event(constants::KEY_CODE_ADDR, 0x41);
        assert_eq!(processor.bus.read(constants::KEY_CODE_ADDR), 0x41);
        assert_eq!(processor.registers.pc, constants::DEFAULT_START);
    }

    #[test]
    fn key_event_vectors_an_interrupt_when_armed_and_unmasked() {
        let mut processor = new_processor();
        processor.bus.memory.write_u16(constants::IRQ_VECTOR, 0x9000);
        processor.maskable_keyboard_interrupt = true;

        processor.handle_key_event(constants::KEY_CODE_ADDR, 0x41);

        assert_eq!(processor.bus.read(constants::KEY_CODE_ADDR), 0x41);
        assert_eq!(processor.registers.pc, 0x9000);
        assert!(processor.registers.p.contains(Flags::INTERRUPT_DISABLE));
    }

    #[test]
    fn key_event_does_not_vector_while_interrupts_are_disabled() {
        let mut processor = new_processor();
        processor.bus.memory.write_u16(constants::IRQ_VECTOR, 0x9000);
        processor.maskable_keyboard_interrupt = true;
        processor.registers.p.insert(Flags::INTERRUPT_DISABLE);
        let pc = processor.registers.pc;

        processor.handle_key_event(constants::KEY_CODE_ADDR, 0x41);

        assert_eq!(processor.registers.pc, pc);
    }

    #[test]
    fn mouse_event_vectors_an_interrupt_when_armed_and_unmasked() {
        let mut processor = new_processor();
        processor.bus.memory.write_u16(constants::IRQ_VECTOR, 0x9000);
        processor.maskable_mouse_interrupt = true;

        processor.handle_mouse_event(constants::MOUSE_LEFT_ADDR, 1);

        assert_eq!(processor.bus.read(constants::MOUSE_LEFT_ADDR), 1);
        assert_eq!(processor.registers.pc, 0x9000);
    }
}
