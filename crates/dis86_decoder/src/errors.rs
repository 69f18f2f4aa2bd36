use std::fmt;

#[derive(PartialEq, Debug)]
pub enum DecodeError {
    /// The stream was exhausted on an instruction boundary. This is the
    /// normal way a run ends.
    EndOfInput,
    /// The stream was exhausted in the middle of an instruction.
    UnexpectedEndOfInput,
    InvalidIndirectMemoryEncoding(u8),
    InvalidModRmEncoding(u8),
    InvalidOpCode(u8),
    InvalidRegisterEncoding(u8),
    InvalidSegmentEncoding(u8),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodeError::EndOfInput => write!(f, "End of input"),
            DecodeError::UnexpectedEndOfInput => {
                write!(f, "Stream ended in the middle of an instruction")
            }
            DecodeError::InvalidIndirectMemoryEncoding(encoding) => {
                write!(f, "Invalid indirect memory encoding ({:#05b})", encoding)
            }
            DecodeError::InvalidModRmEncoding(encoding) => {
                write!(f, "Invalid modR/M encoding ({:#04x})", encoding)
            }
            DecodeError::InvalidOpCode(op_code) => write!(f, "Invalid op code ({:#04x})", op_code),
            DecodeError::InvalidRegisterEncoding(encoding) => {
                write!(f, "Invalid register encoding ({:#05b})", encoding)
            }
            DecodeError::InvalidSegmentEncoding(encoding) => {
                write!(f, "Invalid segment encoding ({:#04b})", encoding)
            }
        }
    }
}
