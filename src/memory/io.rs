//! Classifies addresses into the memory-mapped I/O regions: framebuffer
//! cells, the clear-screen and beep latches, and the random-number cell.
//! A plain classifier rather than a stateful handler, since the mapped
//! regions dispatch to several distinct collaborator traits
//! ([`crate::bus::Bus`]) rather than one.

use crate::constants::*;

/// A cell whose write has a side effect beyond storing the byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappedRegion {
    Framebuffer { x: u16, y: u16 },
    ClearScreen,
    Beep,
    Random,
    Plain,
}

pub fn classify(address: u16) -> MappedRegion {
    if (FRAMEBUFFER_START..=FRAMEBUFFER_END).contains(&address) {
        let offset = address - FRAMEBUFFER_START;
        let x = offset % FRAMEBUFFER_COLS;
        let y = offset / FRAMEBUFFER_COLS;
        MappedRegion::Framebuffer { x, y }
    } else if address == CLEAR_SCREEN_ADDR {
        MappedRegion::ClearScreen
    } else if address == BEEP_ADDR {
        MappedRegion::Beep
    } else if address == RANDOM_ADDR {
        MappedRegion::Random
    } else {
        MappedRegion::Plain
    }
}
