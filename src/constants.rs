//! Fixed addresses and bit layouts for the 6502 memory map and the
//! processor status register.

/// Size of the flat address space.
pub const MEMORY_SIZE: usize = 0x10000;

pub const ZERO_PAGE_START: u16 = 0x0000;
pub const ZERO_PAGE_END: u16 = 0x00FF;

pub const STACK_PAGE: u16 = 0x0100;
pub const STACK_END: u16 = 0x01FF;

pub const FRAMEBUFFER_START: u16 = 0x0200;
pub const FRAMEBUFFER_END: u16 = 0x06AF;
pub const FRAMEBUFFER_COLS: u16 = 40;
pub const FRAMEBUFFER_ROWS: u16 = 30;

pub const CLEAR_SCREEN_ADDR: u16 = 0x06B0;
pub const BEEP_ADDR: u16 = 0x06B1;

pub const KEY_UP_ADDR: u16 = 0x06E0;
pub const KEY_DOWN_ADDR: u16 = 0x06E1;
pub const KEY_LEFT_ADDR: u16 = 0x06E2;
pub const KEY_RIGHT_ADDR: u16 = 0x06E3;
pub const KEY_ENTER_ADDR: u16 = 0x06E4;
/// Raw key code written here also arms the maskable keyboard interrupt.
pub const KEY_CODE_ADDR: u16 = 0x06E0;

pub const MOUSE_LEFT_ADDR: u16 = 0x06F0;
pub const MOUSE_RIGHT_ADDR: u16 = 0x06F1;
pub const MOUSE_MIDDLE_ADDR: u16 = 0x06F2;
pub const MOUSE_RESERVED_START: u16 = 0x06F3;
pub const MOUSE_RESERVED_END: u16 = 0x06FF;

/// Refreshed with a new random byte before every instruction step.
pub const RANDOM_ADDR: u16 = 0x00FE;

pub const GENERAL_RAM_START: u16 = 0x0700;
pub const GENERAL_RAM_END: u16 = 0x7FFF;

pub const PROGRAM_AREA_START: u16 = 0x8000;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// PC's initial value absent a reset vector override.
pub const DEFAULT_START: u16 = 0x0800;

/// Processor status bit masks, from bit 0.
pub const FLAG_CARRY: u8 = 0b0000_0001;
pub const FLAG_ZERO: u8 = 0b0000_0010;
pub const FLAG_INTERRUPT_DISABLE: u8 = 0b0000_0100;
pub const FLAG_DECIMAL: u8 = 0b0000_1000;
pub const FLAG_BREAK: u8 = 0b0001_0000;
pub const FLAG_UNUSED: u8 = 0b0010_0000;
pub const FLAG_OVERFLOW: u8 = 0b0100_0000;
pub const FLAG_NEGATIVE: u8 = 0b1000_0000;

/// P on reset: I and the unused bit set.
pub const RESET_STATUS: u8 = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;

/// Custom, non-6502 opcodes retained by this simulator.
pub const OP_HLT: u8 = 0x02;
pub const OP_OUT: u8 = 0xF2;
pub const OP_IN: u8 = 0xF3;
pub const OP_OUY: u8 = 0xFA;
pub const OP_WAI: u8 = 0xF7;
