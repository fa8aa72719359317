//! The external collaborators the core hands off to: the framebuffer
//! renderer, the audio beeper, the blocking keyboard input source, the
//! character output sink, and the status/log sink. One trait per
//! peripheral, each dispatched from the bus's mapped writes.
//!
//! Each trait gets a no-op implementation so a host that only cares about
//! some collaborators (or a headless CLI) doesn't have to stub out all
//! five.

use crate::memory::io::{self, MappedRegion};
use crate::memory::Memory;

/// 160×120 framebuffer, addressed as a 40×30 grid of 4×4 cells. The byte
/// layout is `RRRGGGBB`; the renderer maps to RGB via
/// `36*R+3, 36*G+3, 85*B`.
pub trait Framebuffer {
    fn draw_pixel(&mut self, x: u16, y: u16, color: u8);
    fn clear(&mut self);
}

pub trait AudioSink {
    fn beep(&mut self);
}

/// Blocking prompt for the `IN` opcode: an empty input buffer calls back
/// synchronously to the host rather than erroring.
pub trait InputSource {
    fn read_input_char(&mut self) -> u8;
}

/// `OUT`/`OUY` sink; code 13 is a newline.
pub trait OutputSink {
    fn write_output_char(&mut self, code: u16);
}

pub trait LogSink {
    fn log(&mut self, text: &str);
    fn log_error(&mut self, text: &str);
}

/// No-op collaborator set for headless execution (used by the CLI and by
/// tests that don't exercise I/O).
#[derive(Default)]
pub struct NullPeripherals;

impl Framebuffer for NullPeripherals {
    fn draw_pixel(&mut self, _x: u16, _y: u16, _color: u8) {}
    fn clear(&mut self) {}
}

impl AudioSink for NullPeripherals {
    fn beep(&mut self) {}
}

impl InputSource for NullPeripherals {
    fn read_input_char(&mut self) -> u8 {
        0
    }
}

impl OutputSink for NullPeripherals {
    fn write_output_char(&mut self, _code: u16) {}
}

impl LogSink for NullPeripherals {
    fn log(&mut self, _text: &str) {}
    fn log_error(&mut self, _text: &str) {}
}

/// Stdout/stderr-backed collaborator set, used by the CLI binary.
pub struct ConsolePeripherals;

impl Framebuffer for ConsolePeripherals {
    fn draw_pixel(&mut self, _x: u16, _y: u16, _color: u8) {}
    fn clear(&mut self) {}
}

impl AudioSink for ConsolePeripherals {
    fn beep(&mut self) {
        print!("\x07");
    }
}

impl InputSource for ConsolePeripherals {
    fn read_input_char(&mut self) -> u8 {
        0
    }
}

impl OutputSink for ConsolePeripherals {
    fn write_output_char(&mut self, code: u16) {
        if code == 13 {
            println!();
        } else if let Some(c) = char::from_u32(code as u32) {
            print!("{}", c);
        }
    }
}

impl LogSink for ConsolePeripherals {
    fn log(&mut self, text: &str) {
        println!("{}", text);
    }

    fn log_error(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}

/// Bundles the CPU-facing memory with the host's collaborators and
/// dispatches mapped writes to them. This is the `Bus` that the processor
/// reads and writes through.
pub struct Bus<F, A, O, L> {
    pub memory: Memory,
    pub framebuffer: F,
    pub audio: A,
    pub output: O,
    pub log: L,
}

impl<F, A, O, L> Bus<F, A, O, L>
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    pub fn new(framebuffer: F, audio: A, output: O, log: L) -> Bus<F, A, O, L> {
        Bus {
            memory: Memory::new(),
            framebuffer,
            audio,
            output,
            log,
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        self.memory.read_or_zero(address)
    }

    pub fn read_defined(&self, address: u16) -> Option<u8> {
        self.memory.read(address)
    }

    pub fn read_u16(&self, address: u16) -> u16 {
        self.memory.read_u16(address)
    }

    /// Writes a byte and dispatches any mapped side effect.
    pub fn write(&mut self, address: u16, value: u8) {
        self.memory.write(address, value);

        match io::classify(address) {
            MappedRegion::Framebuffer { x, y } => self.framebuffer.draw_pixel(x, y, value),
            MappedRegion::ClearScreen => {
                if value != 0 {
                    self.framebuffer.clear();
                    self.memory.write(address, 0);
                }
            }
            MappedRegion::Beep => {
                if value != 0 {
                    self.audio.beep();
                    self.memory.write(address, 0);
                }
            }
            MappedRegion::Random => {}
            MappedRegion::Plain => {}
        }
    }

    pub fn write_u16(&mut self, address: u16, value: u16) {
        self.memory.write_u16(address, value);
    }

    /// Writes a host input event byte into a mapped cell without going
    /// through [`Bus::write`]'s side-effect dispatch — keyboard/mouse cells
    /// are plain storage from the bus's point of view; the maskable-
    /// interrupt decision lives with the processor's interrupt requests.
    pub fn write_input_cell(&mut self, address: u16, value: u8) {
        self.memory.write(address, value);
    }
}
