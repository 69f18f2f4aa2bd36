use crate::{Operand, Operation};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OperandSet {
    None,
    Destination(Operand),
    DestinationAndSource(Operand, Operand),
}

impl Display for OperandSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperandSet::None => Ok(()),
            OperandSet::Destination(destination) => write!(f, "{}", destination),
            OperandSet::DestinationAndSource(destination, source) => {
                write!(f, "{}, {}", destination, source)
            }
        }
    }
}

/// A single decoded 8086 instruction. Produced by the decoder, rendered by
/// [Display], and optionally consumed by the simulator; never reused across
/// decode steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instruction {
    pub operation: Operation,
    pub operands: OperandSet,
}

impl Instruction {
    pub fn new(operation: Operation, operands: OperandSet) -> Self {
        Self {
            operation,
            operands,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.operands {
            OperandSet::None => write!(f, "{}", self.operation),
            _ => write!(f, "{} {}", self.operation, self.operands),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Immediate, OperandSize, RegisterEncoding, SizedRegister, WidthLabel,
    };

    #[test]
    fn operand_less_instruction_has_no_trailing_space() {
        let instruction = Instruction::new(Operation::HLT, OperandSet::None);
        assert_eq!(instruction.to_string(), "hlt");
    }

    #[test]
    fn two_operand_instruction() {
        let instruction = Instruction::new(
            Operation::MOV,
            OperandSet::DestinationAndSource(
                SizedRegister(RegisterEncoding::ClCx, OperandSize::Word).into(),
                SizedRegister(RegisterEncoding::BlBx, OperandSize::Word).into(),
            ),
        );
        assert_eq!(instruction.to_string(), "mov cx, bx");
    }

    #[test]
    fn width_label_on_immediate_source() {
        let instruction = Instruction::new(
            Operation::MOV,
            OperandSet::DestinationAndSource(
                Operand::Direct(1000, WidthLabel::None),
                Operand::Immediate(Immediate::Word(256), WidthLabel::Word),
            ),
        );
        assert_eq!(instruction.to_string(), "mov [1000], word 256");
    }
}
