use crate::errors::Result;
use crate::traits::{OpCodeExt, ReadExt};
use crate::TryFromEncoding;
use dis86_instruction::{
    Instruction, Operand, OperandSet, OperandSize, Operation, RegisterEncoding, Segment,
    SizedRegister,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Direction {
    /// Take the `d` bit from the op code.
    Detect,
    RegFirst,
    RegMemFirst,
}

// x x x x x x d w | mod reg r/m
pub(crate) fn register_or_memory_and_register(
    operation: Operation,
    direction: Direction,
    force_operand_size: Option<OperandSize>,
    op_code: u8,
    it: &mut impl Iterator<Item = u8>,
) -> Result<Instruction> {
    let reg_first = match direction {
        Direction::Detect => (op_code >> 1) & 1 == 1,
        Direction::RegFirst => true,
        Direction::RegMemFirst => false,
    };
    let operand_size = match force_operand_size {
        Some(operand_size) => operand_size,
        None => op_code.operand_size(),
    };

    let (mrrm, _) = it.read_mrrm()?;

    let reg = Operand::Register(SizedRegister(mrrm.register, operand_size));
    let reg_mem = mrrm.register_or_memory.into_operand(operand_size);

    Ok(Instruction::new(
        operation,
        if reg_first {
            OperandSet::DestinationAndSource(reg, reg_mem)
        } else {
            OperandSet::DestinationAndSource(reg_mem, reg)
        },
    ))
}

// x x x x x x d x | mod 0 sreg r/m
pub(crate) fn register_or_memory_and_segment(
    operation: Operation,
    op_code: u8,
    it: &mut impl Iterator<Item = u8>,
) -> Result<Instruction> {
    let segment_first = (op_code >> 1) & 1 == 1;

    let (mrrm, mrrm_byte) = it.read_mrrm()?;

    let reg_mem = mrrm.register_or_memory.into_operand(OperandSize::Word);
    let segment = Operand::Segment(Segment::try_from_encoding((mrrm_byte >> 3) & 0b11)?);

    Ok(Instruction::new(
        operation,
        if segment_first {
            OperandSet::DestinationAndSource(segment, reg_mem)
        } else {
            OperandSet::DestinationAndSource(reg_mem, segment)
        },
    ))
}

// x x x x x x x w | data | data if w = 1
pub(crate) fn immediate_to_accumulator(
    operation: Operation,
    op_code: u8,
    it: &mut impl Iterator<Item = u8>,
) -> Result<Instruction> {
    let operand_size = op_code.operand_size();

    Ok(Instruction::new(
        operation,
        OperandSet::DestinationAndSource(
            Operand::Register(SizedRegister(RegisterEncoding::AlAx, operand_size)),
            it.read_immediate(operand_size)?.into(),
        ),
    ))
}

// Short jumps measure their displacement from the start of the *next*
// instruction, which is two bytes past the start of this one.
pub(crate) fn jump_on_condition(
    operation: Operation,
    it: &mut impl Iterator<Item = u8>,
) -> Result<Instruction> {
    let target = it.read_u8()? as i8 as i16 + 2;

    Ok(Instruction::new(
        operation,
        OperandSet::Destination(Operand::Jump(target)),
    ))
}
