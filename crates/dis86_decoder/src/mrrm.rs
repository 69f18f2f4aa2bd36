use crate::errors::Result;
use crate::traits::ReadExt;
use crate::{DecodeError, TryFromEncoding};
use dis86_instruction::{
    AddressingMode, Displacement, Operand, OperandSize, RegisterEncoding, SizedRegister,
    WidthLabel,
};

impl TryFromEncoding<Self> for AddressingMode {
    fn try_from_encoding(encoding: u8) -> Result<Self> {
        use AddressingMode::*;

        match encoding {
            0b000 => Ok(BxSi),
            0b001 => Ok(BxDi),
            0b010 => Ok(BpSi),
            0b011 => Ok(BpDi),
            0b100 => Ok(Si),
            0b101 => Ok(Di),
            0b110 => Ok(Bp),
            0b111 => Ok(Bx),
            _ => Err(DecodeError::InvalidIndirectMemoryEncoding(encoding)),
        }
    }
}

/// The r/m half of a ModRegRM byte with its displacement or direct address
/// already consumed from the stream. A mod field of `0b11` comes out as
/// [RegisterOrMemory::Register], so a memory operand in register mode cannot
/// be represented.
#[derive(Debug, PartialEq)]
pub enum RegisterOrMemory {
    Direct(u16),
    Indirect(AddressingMode),
    DisplacementByte(AddressingMode, i8),
    DisplacementWord(AddressingMode, i16),
    Register(RegisterEncoding),
}

impl RegisterOrMemory {
    pub fn try_from_mrrm(mrrm_byte: u8, it: &mut impl Iterator<Item = u8>) -> Result<Self> {
        let mode = mrrm_byte >> 6;
        let rm = mrrm_byte & 0b111;

        match mode {
            0b00 => match rm {
                0b110 => Ok(RegisterOrMemory::Direct(it.read_u16()?)),
                _ => Ok(RegisterOrMemory::Indirect(AddressingMode::try_from_encoding(
                    rm,
                )?)),
            },

            0b01 => Ok(RegisterOrMemory::DisplacementByte(
                AddressingMode::try_from_encoding(rm)?,
                it.read_u8()? as i8,
            )),

            0b10 => Ok(RegisterOrMemory::DisplacementWord(
                AddressingMode::try_from_encoding(rm)?,
                it.read_u16()? as i16,
            )),

            0b11 => Ok(RegisterOrMemory::Register(
                RegisterEncoding::try_from_encoding(rm)?,
            )),

            _ => Err(DecodeError::InvalidModRmEncoding(mrrm_byte)),
        }
    }

    pub fn into_operand(self, operand_size: OperandSize) -> Operand {
        self.into_operand_with_label(operand_size, WidthLabel::None)
    }

    /// Memory forms get an explicit `byte`/`word` keyword matching the
    /// operation width; a register operand never carries one.
    pub fn into_labeled_operand(self, operand_size: OperandSize) -> Operand {
        self.into_operand_with_label(operand_size, WidthLabel::from(operand_size))
    }

    fn into_operand_with_label(self, operand_size: OperandSize, label: WidthLabel) -> Operand {
        match self {
            RegisterOrMemory::Direct(address) => Operand::Direct(address, label),
            RegisterOrMemory::Indirect(addressing_mode) => {
                Operand::Indirect(addressing_mode, Displacement::None, label)
            }
            RegisterOrMemory::DisplacementByte(addressing_mode, displacement) => {
                Operand::Indirect(addressing_mode, Displacement::Byte(displacement), label)
            }
            RegisterOrMemory::DisplacementWord(addressing_mode, displacement) => {
                Operand::Indirect(addressing_mode, Displacement::Word(displacement), label)
            }
            RegisterOrMemory::Register(register) => {
                Operand::Register(SizedRegister(register, operand_size))
            }
        }
    }
}

#[derive(Debug)]
pub struct ModRegRM {
    pub register: RegisterEncoding,
    pub register_or_memory: RegisterOrMemory,
}

impl ModRegRM {
    pub fn try_from_byte(mrrm_byte: u8, it: &mut impl Iterator<Item = u8>) -> Result<Self> {
        let register = RegisterEncoding::try_from_encoding(mrrm_byte >> 3 & 0b111)?;
        let register_or_memory = RegisterOrMemory::try_from_mrrm(mrrm_byte, it)?;

        Ok(ModRegRM {
            register,
            register_or_memory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_reg_or_mem {
        ($mrrm_byte:expr,$bytes:expr,$expected:expr) => {{
            let mut it = $bytes.into_iter();
            assert_eq!(
                $expected,
                RegisterOrMemory::try_from_mrrm($mrrm_byte, &mut it).unwrap()
            );
            assert_eq!(None, it.next());
        }};
    }

    #[test]
    fn indirect() {
        test_reg_or_mem!(
            0b00_000_000,
            [],
            RegisterOrMemory::Indirect(AddressingMode::BxSi)
        );
        test_reg_or_mem!(
            0b00_000_011,
            [],
            RegisterOrMemory::Indirect(AddressingMode::BpDi)
        );
        test_reg_or_mem!(0b00_000_111, [], RegisterOrMemory::Indirect(AddressingMode::Bx));
    }

    #[test]
    fn direct_address_consumes_two_bytes() {
        test_reg_or_mem!(0b00_000_110, [0x12, 0x34], RegisterOrMemory::Direct(0x3412));
    }

    #[test]
    fn displacement_byte() {
        test_reg_or_mem!(
            0b01_000_110,
            [0xFB],
            RegisterOrMemory::DisplacementByte(AddressingMode::Bp, -5)
        );
        test_reg_or_mem!(
            0b01_000_000,
            [0x00],
            RegisterOrMemory::DisplacementByte(AddressingMode::BxSi, 0)
        );
    }

    #[test]
    fn displacement_word() {
        test_reg_or_mem!(
            0b10_000_001,
            [0x12, 0x34],
            RegisterOrMemory::DisplacementWord(AddressingMode::BxDi, 0x3412)
        );
        test_reg_or_mem!(
            0b10_000_100,
            [0x00, 0x80],
            RegisterOrMemory::DisplacementWord(AddressingMode::Si, -32768)
        );
    }

    #[test]
    fn register_mode() {
        test_reg_or_mem!(
            0b11_000_000,
            [],
            RegisterOrMemory::Register(RegisterEncoding::AlAx)
        );
        test_reg_or_mem!(
            0b11_000_111,
            [],
            RegisterOrMemory::Register(RegisterEncoding::BhDi)
        );
    }

    #[test]
    fn register_mode_ignores_width_label() {
        let operand = RegisterOrMemory::Register(RegisterEncoding::ClCx)
            .into_labeled_operand(OperandSize::Word);
        assert_eq!(
            operand,
            Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Word))
        );
    }

    #[test]
    fn memory_operand_takes_width_label() {
        let operand =
            RegisterOrMemory::Indirect(AddressingMode::BpSi).into_labeled_operand(OperandSize::Byte);
        assert_eq!(
            operand,
            Operand::Indirect(AddressingMode::BpSi, Displacement::None, WidthLabel::Byte)
        );
    }

    #[test]
    fn truncated_displacement_is_an_error() {
        let mut it = [].into_iter();
        assert_eq!(
            RegisterOrMemory::try_from_mrrm(0b01_000_000, &mut it),
            Err(DecodeError::UnexpectedEndOfInput)
        );
    }
}
