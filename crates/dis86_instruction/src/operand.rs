use crate::{Segment, SizedRegister};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OperandSize {
    Byte,
    Word,
}

/// Effective-address formula selected by the 3-bit r/m field when the mod
/// field selects a memory mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AddressingMode {
    BxSi,
    BxDi,
    BpSi,
    BpDi,
    Si,
    Di,
    Bp,
    Bx,
}

impl Display for AddressingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use AddressingMode::*;

        match self {
            BxSi => write!(f, "bx + si"),
            BxDi => write!(f, "bx + di"),
            BpSi => write!(f, "bp + si"),
            BpDi => write!(f, "bp + di"),
            Si => write!(f, "si"),
            Di => write!(f, "di"),
            Bp => write!(f, "bp"),
            Bx => write!(f, "bx"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Displacement {
    None,
    Byte(i8),
    Word(i16),
}

impl Display for Displacement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // A zero displacement is elided entirely, so `[bp + 0]` never
        // appears in the output.
        let offset = match self {
            Displacement::None => return Ok(()),
            Displacement::Byte(offset) => *offset as i16,
            Displacement::Word(offset) => *offset,
        };

        match offset {
            0 => Ok(()),
            o if o < 0 => write!(f, " - {}", -(o as i32)),
            o => write!(f, " + {}", o),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Immediate {
    Byte(u8),
    Word(u16),
}

impl Display for Immediate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Immediate::Byte(value) => write!(f, "{}", *value as i8),
            Immediate::Word(value) => write!(f, "{}", *value as i16),
        }
    }
}

/// Explicit `byte`/`word` keyword in front of a printed operand, for the
/// encodings where the assembler could not otherwise infer the width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidthLabel {
    None,
    Byte,
    Word,
}

impl From<OperandSize> for WidthLabel {
    fn from(operand_size: OperandSize) -> Self {
        match operand_size {
            OperandSize::Byte => WidthLabel::Byte,
            OperandSize::Word => WidthLabel::Word,
        }
    }
}

impl Display for WidthLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WidthLabel::None => Ok(()),
            WidthLabel::Byte => write!(f, "byte "),
            WidthLabel::Word => write!(f, "word "),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    Register(SizedRegister),
    Segment(Segment),
    Immediate(Immediate, WidthLabel),
    /// Absolute 16-bit address (mod = 00, r/m = 110).
    Direct(u16, WidthLabel),
    Indirect(AddressingMode, Displacement, WidthLabel),
    /// Short-jump target relative to the current instruction start, with
    /// the +2 adjustment already applied.
    Jump(i16),
}

impl From<SizedRegister> for Operand {
    fn from(register: SizedRegister) -> Self {
        Operand::Register(register)
    }
}

impl From<Immediate> for Operand {
    fn from(immediate: Immediate) -> Self {
        Operand::Immediate(immediate, WidthLabel::None)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{}", register),
            Operand::Segment(segment) => write!(f, "{}", segment),
            Operand::Immediate(immediate, label) => write!(f, "{}{}", label, immediate),
            Operand::Direct(address, label) => write!(f, "{}[{}]", label, address),
            Operand::Indirect(addressing_mode, displacement, label) => {
                write!(f, "{}[{}{}]", label, addressing_mode, displacement)
            }
            Operand::Jump(offset) => write!(f, "${:+}", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegisterEncoding;

    #[test]
    fn register_names_follow_operand_size() {
        assert_eq!(
            SizedRegister(RegisterEncoding::AhSp, OperandSize::Byte).to_string(),
            "ah"
        );
        assert_eq!(
            SizedRegister(RegisterEncoding::AhSp, OperandSize::Word).to_string(),
            "sp"
        );
    }

    #[test]
    fn indirect_operand_with_displacement() {
        let operand = Operand::Indirect(
            AddressingMode::BxSi,
            Displacement::Byte(4),
            WidthLabel::None,
        );
        assert_eq!(operand.to_string(), "[bx + si + 4]");

        let operand = Operand::Indirect(
            AddressingMode::BpDi,
            Displacement::Word(-320),
            WidthLabel::None,
        );
        assert_eq!(operand.to_string(), "[bp + di - 320]");
    }

    #[test]
    fn zero_displacement_is_elided() {
        let operand = Operand::Indirect(AddressingMode::Si, Displacement::Byte(0), WidthLabel::None);
        assert_eq!(operand.to_string(), "[si]");

        let operand = Operand::Indirect(AddressingMode::Bp, Displacement::Word(0), WidthLabel::None);
        assert_eq!(operand.to_string(), "[bp]");
    }

    #[test]
    fn direct_address_prints_unsigned() {
        let operand = Operand::Direct(16, WidthLabel::None);
        assert_eq!(operand.to_string(), "[16]");

        let operand = Operand::Direct(0xFFFE, WidthLabel::None);
        assert_eq!(operand.to_string(), "[65534]");
    }

    #[test]
    fn immediates_print_signed() {
        assert_eq!(Immediate::Word(4660).to_string(), "4660");
        assert_eq!(Immediate::Word(0xFFFD).to_string(), "-3");
        assert_eq!(Immediate::Byte(0xF4).to_string(), "-12");
    }

    #[test]
    fn width_labels() {
        let operand = Operand::Immediate(Immediate::Word(256), WidthLabel::Word);
        assert_eq!(operand.to_string(), "word 256");

        let operand = Operand::Indirect(
            AddressingMode::BpSi,
            Displacement::None,
            WidthLabel::Byte,
        );
        assert_eq!(operand.to_string(), "byte [bp + si]");
    }

    #[test]
    fn jump_targets_use_dollar_syntax() {
        assert_eq!(Operand::Jump(0).to_string(), "$+0");
        assert_eq!(Operand::Jump(7).to_string(), "$+7");
        assert_eq!(Operand::Jump(-4).to_string(), "$-4");
    }
}
