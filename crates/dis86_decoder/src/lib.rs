//! Turns a stream of bytes into [dis86_instruction::Instruction] values.
//!
//! The decoder consumes bytes strictly left to right: first byte, then the
//! ModRegRM byte if the encoding has one, then displacement bytes, then
//! immediate bytes.

mod common;
mod decode;
mod errors;
mod mrrm;
mod traits;

pub use decode::decode_instruction;
pub use errors::{DecodeError, Result};
pub use mrrm::{ModRegRM, RegisterOrMemory};
pub use traits::{OpCodeExt, ReadExt};

use dis86_instruction::{RegisterEncoding, Segment};

trait TryFromEncoding<T> {
    fn try_from_encoding(encoding: u8) -> Result<T>;
}

impl TryFromEncoding<Self> for RegisterEncoding {
    fn try_from_encoding(encoding: u8) -> Result<Self> {
        match encoding {
            0b000 => Ok(RegisterEncoding::AlAx),
            0b001 => Ok(RegisterEncoding::ClCx),
            0b010 => Ok(RegisterEncoding::DlDx),
            0b011 => Ok(RegisterEncoding::BlBx),
            0b100 => Ok(RegisterEncoding::AhSp),
            0b101 => Ok(RegisterEncoding::ChBp),
            0b110 => Ok(RegisterEncoding::DhSi),
            0b111 => Ok(RegisterEncoding::BhDi),
            _ => Err(DecodeError::InvalidRegisterEncoding(encoding)),
        }
    }
}

impl TryFromEncoding<Self> for Segment {
    fn try_from_encoding(encoding: u8) -> Result<Self> {
        match encoding {
            0b00 => Ok(Segment::ES),
            0b01 => Ok(Segment::CS),
            0b10 => Ok(Segment::SS),
            0b11 => Ok(Segment::DS),
            _ => Err(DecodeError::InvalidSegmentEncoding(encoding)),
        }
    }
}
