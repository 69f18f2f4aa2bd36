use crate::common::{
    immediate_to_accumulator, jump_on_condition, register_or_memory_and_register,
    register_or_memory_and_segment, Direction,
};
use crate::errors::Result;
use crate::traits::{OpCodeExt, ReadExt};
use crate::{DecodeError, TryFromEncoding};
use dis86_instruction::{
    Immediate, Instruction, Operand, OperandSet, OperandSize, Operation, RegisterEncoding,
    Segment, SizedRegister, WidthLabel,
};

// 00 xxx 0dw with the operation in bits 3..5 of the op code.
fn arithmetic_operation(op_code: u8) -> Operation {
    match (op_code >> 3) & 0b111 {
        0b000 => Operation::ADD,
        0b001 => Operation::OR,
        0b010 => Operation::ADC,
        0b011 => Operation::SBB,
        0b100 => Operation::AND,
        0b101 => Operation::SUB,
        0b110 => Operation::XOR,
        0b111 => Operation::CMP,

        _ => unreachable!(),
    }
}

// 1000 00sw with the operation in the reg field of the ModRegRM byte.
fn immediate_group_operation(bits: u8) -> Operation {
    debug_assert!(bits <= 0b111);

    match bits {
        0b000 => Operation::ADD,
        0b001 => Operation::OR,
        0b010 => Operation::ADC,
        0b011 => Operation::SBB,
        0b100 => Operation::AND,
        0b101 => Operation::SUB,
        0b110 => Operation::XOR,
        0b111 => Operation::CMP,

        _ => unreachable!(),
    }
}

// 1101 00vw with the operation in the reg field of the ModRegRM byte.
// 0b110 is undocumented and decodes as SHL, like the documented 0b100.
fn shift_group_operation(bits: u8) -> Operation {
    debug_assert!(bits <= 0b111);

    match bits {
        0b000 => Operation::ROL,
        0b001 => Operation::ROR,
        0b010 => Operation::RCL,
        0b011 => Operation::RCR,
        0b100 => Operation::SHL,
        0b101 => Operation::SHR,
        0b110 => Operation::SHL,
        0b111 => Operation::SAR,

        _ => unreachable!(),
    }
}

/// Classifies the next instruction in the stream and consumes exactly the
/// bytes belonging to it.
///
/// An exhausted stream on the first byte is [DecodeError::EndOfInput]; an
/// unclassified first byte is [DecodeError::InvalidOpCode] with the byte
/// consumed, so the caller can emit it as data and carry on.
pub fn decode_instruction(it: &mut impl Iterator<Item = u8>) -> Result<Instruction> {
    let op_code = it.read_u8().map_err(|err| match err {
        DecodeError::UnexpectedEndOfInput => DecodeError::EndOfInput,
        err => err,
    })?;

    match op_code {
        0x00 | 0x01 | 0x02 | 0x03 | 0x08 | 0x09 | 0x0A | 0x0B | 0x10 | 0x11 | 0x12 | 0x13
        | 0x18 | 0x19 | 0x1A | 0x1B | 0x20 | 0x21 | 0x22 | 0x23 | 0x28 | 0x29 | 0x2A | 0x2B
        | 0x30 | 0x31 | 0x32 | 0x33 | 0x38 | 0x39 | 0x3A | 0x3B => register_or_memory_and_register(
            arithmetic_operation(op_code),
            Direction::Detect,
            None,
            op_code,
            it,
        ),

        0x04 | 0x05 | 0x0C | 0x0D | 0x14 | 0x15 | 0x1C | 0x1D | 0x24 | 0x25 | 0x2C | 0x2D
        | 0x34 | 0x35 | 0x3C | 0x3D => {
            immediate_to_accumulator(arithmetic_operation(op_code), op_code, it)
        }

        0x06 | 0x07 | 0x0E | 0x0F | 0x16 | 0x17 | 0x1E | 0x1F => Ok(Instruction::new(
            match op_code & 1 {
                0 => Operation::PUSH,
                _ => Operation::POP,
            },
            OperandSet::Destination(Operand::Segment(Segment::try_from_encoding(
                (op_code >> 3) & 0b11,
            )?)),
        )),

        0x27 => Ok(Instruction::new(Operation::DAA, OperandSet::None)),

        0x2F => Ok(Instruction::new(Operation::DAS, OperandSet::None)),

        0x37 => Ok(Instruction::new(Operation::AAA, OperandSet::None)),

        0x3F => Ok(Instruction::new(Operation::AAS, OperandSet::None)),

        0x40..=0x47 => Ok(Instruction::new(
            Operation::INC,
            OperandSet::Destination(Operand::Register(SizedRegister(
                RegisterEncoding::try_from_encoding(op_code & 0b111)?,
                OperandSize::Word,
            ))),
        )),

        0x48..=0x4F => Ok(Instruction::new(
            Operation::DEC,
            OperandSet::Destination(Operand::Register(SizedRegister(
                RegisterEncoding::try_from_encoding(op_code & 0b111)?,
                OperandSize::Word,
            ))),
        )),

        0x50..=0x57 => Ok(Instruction::new(
            Operation::PUSH,
            OperandSet::Destination(Operand::Register(SizedRegister(
                RegisterEncoding::try_from_encoding(op_code & 0b111)?,
                OperandSize::Word,
            ))),
        )),

        0x58..=0x5F => Ok(Instruction::new(
            Operation::POP,
            OperandSet::Destination(Operand::Register(SizedRegister(
                RegisterEncoding::try_from_encoding(op_code & 0b111)?,
                OperandSize::Word,
            ))),
        )),

        0x70 => jump_on_condition(Operation::JO, it),
        0x71 => jump_on_condition(Operation::JNO, it),
        0x72 => jump_on_condition(Operation::JB, it),
        0x73 => jump_on_condition(Operation::JNB, it),
        0x74 => jump_on_condition(Operation::JE, it),
        0x75 => jump_on_condition(Operation::JNE, it),
        0x76 => jump_on_condition(Operation::JBE, it),
        0x77 => jump_on_condition(Operation::JNBE, it),
        0x78 => jump_on_condition(Operation::JS, it),
        0x79 => jump_on_condition(Operation::JNS, it),
        0x7A => jump_on_condition(Operation::JP, it),
        0x7B => jump_on_condition(Operation::JNP, it),
        0x7C => jump_on_condition(Operation::JL, it),
        0x7D => jump_on_condition(Operation::JNL, it),
        0x7E => jump_on_condition(Operation::JLE, it),
        0x7F => jump_on_condition(Operation::JNLE, it),

        0x80..=0x83 => {
            let operand_size = op_code.operand_size();
            let sign_extend = (op_code >> 1) & 1 == 1;

            let (mrrm, mrrm_byte) = it.read_mrrm()?;

            let destination = mrrm.register_or_memory.into_labeled_operand(operand_size);
            let source = if sign_extend && operand_size == OperandSize::Word {
                Immediate::Word(it.read_u8()? as i8 as i16 as u16).into()
            } else {
                it.read_immediate(operand_size)?.into()
            };

            Ok(Instruction::new(
                immediate_group_operation((mrrm_byte >> 3) & 0b111),
                OperandSet::DestinationAndSource(destination, source),
            ))
        }

        0x84 | 0x85 => register_or_memory_and_register(
            Operation::TEST,
            Direction::RegMemFirst,
            None,
            op_code,
            it,
        ),

        0x86 | 0x87 => register_or_memory_and_register(
            Operation::XCHG,
            Direction::RegMemFirst,
            None,
            op_code,
            it,
        ),

        0x88..=0x8B => {
            register_or_memory_and_register(Operation::MOV, Direction::Detect, None, op_code, it)
        }

        0x8C | 0x8E => register_or_memory_and_segment(Operation::MOV, op_code, it),

        0x8D => register_or_memory_and_register(
            Operation::LEA,
            Direction::RegFirst,
            Some(OperandSize::Word),
            op_code,
            it,
        ),

        0x8F => {
            let (mrrm, mrrm_byte) = it.read_mrrm()?;

            if (mrrm_byte >> 3) & 0b111 != 0 {
                return Err(DecodeError::InvalidModRmEncoding(mrrm_byte));
            }

            Ok(Instruction::new(
                Operation::POP,
                OperandSet::Destination(
                    mrrm.register_or_memory.into_labeled_operand(OperandSize::Word),
                ),
            ))
        }

        0x90..=0x97 => Ok(Instruction::new(
            Operation::XCHG,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::AlAx, OperandSize::Word)),
                Operand::Register(SizedRegister(
                    RegisterEncoding::try_from_encoding(op_code & 0b111)?,
                    OperandSize::Word,
                )),
            ),
        )),

        0x98 => Ok(Instruction::new(Operation::CBW, OperandSet::None)),

        0x99 => Ok(Instruction::new(Operation::CWD, OperandSet::None)),

        0x9B => Ok(Instruction::new(Operation::WAIT, OperandSet::None)),

        0x9C => Ok(Instruction::new(Operation::PUSHF, OperandSet::None)),

        0x9D => Ok(Instruction::new(Operation::POPF, OperandSet::None)),

        0x9E => Ok(Instruction::new(Operation::SAHF, OperandSet::None)),

        0x9F => Ok(Instruction::new(Operation::LAHF, OperandSet::None)),

        0xA0..=0xA3 => {
            let operand_size = op_code.operand_size();
            // Not a d bit proper: the sense is inverted, 1 means the
            // accumulator is the source.
            let memory_first = (op_code >> 1) & 1 == 1;

            let accumulator =
                Operand::Register(SizedRegister(RegisterEncoding::AlAx, operand_size));
            let memory = Operand::Direct(it.read_u16()?, WidthLabel::None);

            Ok(Instruction::new(
                Operation::MOV,
                if memory_first {
                    OperandSet::DestinationAndSource(memory, accumulator)
                } else {
                    OperandSet::DestinationAndSource(accumulator, memory)
                },
            ))
        }

        0xA4 => Ok(Instruction::new(Operation::MOVSB, OperandSet::None)),

        0xA5 => Ok(Instruction::new(Operation::MOVSW, OperandSet::None)),

        0xA6 => Ok(Instruction::new(Operation::CMPSB, OperandSet::None)),

        0xA7 => Ok(Instruction::new(Operation::CMPSW, OperandSet::None)),

        0xA8 | 0xA9 => immediate_to_accumulator(Operation::TEST, op_code, it),

        0xAA => Ok(Instruction::new(Operation::STOSB, OperandSet::None)),

        0xAB => Ok(Instruction::new(Operation::STOSW, OperandSet::None)),

        0xAC => Ok(Instruction::new(Operation::LODSB, OperandSet::None)),

        0xAD => Ok(Instruction::new(Operation::LODSW, OperandSet::None)),

        0xAE => Ok(Instruction::new(Operation::SCASB, OperandSet::None)),

        0xAF => Ok(Instruction::new(Operation::SCASW, OperandSet::None)),

        0xB0..=0xBF => {
            // The w bit sits in bit 3 for this family.
            let operand_size = (op_code >> 3).operand_size();

            let destination = SizedRegister(
                RegisterEncoding::try_from_encoding(op_code & 0b111)?,
                operand_size,
            )
            .into();
            let source = it.read_immediate(operand_size)?.into();

            Ok(Instruction::new(
                Operation::MOV,
                OperandSet::DestinationAndSource(destination, source),
            ))
        }

        0xC2 => Ok(Instruction::new(
            Operation::RET,
            OperandSet::Destination(it.read_immediate(OperandSize::Word)?.into()),
        )),

        0xC3 => Ok(Instruction::new(Operation::RET, OperandSet::None)),

        0xC4 => register_or_memory_and_register(
            Operation::LES,
            Direction::RegFirst,
            Some(OperandSize::Word),
            op_code,
            it,
        ),

        0xC5 => register_or_memory_and_register(
            Operation::LDS,
            Direction::RegFirst,
            Some(OperandSize::Word),
            op_code,
            it,
        ),

        0xC6 | 0xC7 => {
            let operand_size = op_code.operand_size();
            let (mrrm, mrrm_byte) = it.read_mrrm()?;

            if (mrrm_byte >> 3) & 0b111 != 0 {
                return Err(DecodeError::InvalidModRmEncoding(mrrm_byte));
            }

            let destination = mrrm.register_or_memory.into_operand(operand_size);
            let source = Operand::Immediate(
                it.read_immediate(operand_size)?,
                WidthLabel::from(operand_size),
            );

            Ok(Instruction::new(
                Operation::MOV,
                OperandSet::DestinationAndSource(destination, source),
            ))
        }

        // Inter-segment return prints the same as the within-segment form.
        0xCB => Ok(Instruction::new(Operation::RET, OperandSet::None)),

        0xCC => Ok(Instruction::new(
            Operation::INT,
            OperandSet::Destination(Immediate::Byte(3).into()),
        )),

        0xCD => Ok(Instruction::new(
            Operation::INT,
            OperandSet::Destination(it.read_immediate(OperandSize::Byte)?.into()),
        )),

        0xCE => Ok(Instruction::new(Operation::INTO, OperandSet::None)),

        0xCF => Ok(Instruction::new(Operation::IRET, OperandSet::None)),

        0xD0..=0xD3 => {
            let operand_size = op_code.operand_size();
            let (mrrm, mrrm_byte) = it.read_mrrm()?;

            let destination = mrrm.register_or_memory.into_operand(operand_size);

            // v = 0 shifts by 1, v = 1 shifts by the count in CL. Either
            // way the count renders narrow.
            let source = if (op_code >> 1) & 1 == 1 {
                Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Byte))
            } else {
                Immediate::Byte(1).into()
            };

            Ok(Instruction::new(
                shift_group_operation((mrrm_byte >> 3) & 0b111),
                OperandSet::DestinationAndSource(destination, source),
            ))
        }

        // The byte after AAM/AAD is expected to be 0b00001010 but carries
        // no information; it is consumed and dropped.
        0xD4 => {
            let _ = it.read_u8()?;
            Ok(Instruction::new(Operation::AAM, OperandSet::None))
        }

        0xD5 => {
            let _ = it.read_u8()?;
            Ok(Instruction::new(Operation::AAD, OperandSet::None))
        }

        0xD7 => Ok(Instruction::new(Operation::XLAT, OperandSet::None)),

        0xE0 => jump_on_condition(Operation::LOOPNZ, it),
        0xE1 => jump_on_condition(Operation::LOOPZ, it),
        0xE2 => jump_on_condition(Operation::LOOP, it),
        0xE3 => jump_on_condition(Operation::JCXZ, it),

        0xE4 | 0xE5 => {
            let operand_size = op_code.operand_size();

            Ok(Instruction::new(
                Operation::IN,
                OperandSet::DestinationAndSource(
                    Operand::Register(SizedRegister(RegisterEncoding::AlAx, operand_size)),
                    // The port renders at word width even though the
                    // encoding is a single byte.
                    Immediate::Word(it.read_u8()? as u16).into(),
                ),
            ))
        }

        0xE6 | 0xE7 => {
            let operand_size = op_code.operand_size();

            Ok(Instruction::new(
                Operation::OUT,
                OperandSet::DestinationAndSource(
                    Immediate::Word(it.read_u8()? as u16).into(),
                    Operand::Register(SizedRegister(RegisterEncoding::AlAx, operand_size)),
                ),
            ))
        }

        0xEC | 0xED => {
            let operand_size = op_code.operand_size();

            Ok(Instruction::new(
                Operation::IN,
                OperandSet::DestinationAndSource(
                    Operand::Register(SizedRegister(RegisterEncoding::AlAx, operand_size)),
                    Operand::Register(SizedRegister(RegisterEncoding::DlDx, OperandSize::Word)),
                ),
            ))
        }

        0xEE | 0xEF => {
            let operand_size = op_code.operand_size();

            Ok(Instruction::new(
                Operation::OUT,
                OperandSet::DestinationAndSource(
                    Operand::Register(SizedRegister(RegisterEncoding::DlDx, OperandSize::Word)),
                    Operand::Register(SizedRegister(RegisterEncoding::AlAx, operand_size)),
                ),
            ))
        }

        0xF0 => Ok(Instruction::new(Operation::LOCK, OperandSet::None)),

        0xF2 | 0xF3 => Ok(Instruction::new(Operation::REP, OperandSet::None)),

        0xF4 => Ok(Instruction::new(Operation::HLT, OperandSet::None)),

        0xF5 => Ok(Instruction::new(Operation::CMC, OperandSet::None)),

        0xF6 | 0xF7 => {
            let operand_size = op_code.operand_size();
            let (mrrm, mrrm_byte) = it.read_mrrm()?;

            let destination = mrrm.register_or_memory.into_operand(operand_size);

            let operation = match (mrrm_byte >> 3) & 0b111 {
                0b000 => Operation::TEST,
                0b010 => Operation::NOT,
                0b011 => Operation::NEG,
                0b100 => Operation::MUL,
                0b101 => Operation::IMUL,
                0b110 => Operation::DIV,
                0b111 => Operation::IDIV,
                _ => return Err(DecodeError::InvalidModRmEncoding(mrrm_byte)),
            };

            if operation == Operation::TEST {
                Ok(Instruction::new(
                    operation,
                    OperandSet::DestinationAndSource(
                        destination,
                        it.read_immediate(operand_size)?.into(),
                    ),
                ))
            } else {
                Ok(Instruction::new(
                    operation,
                    OperandSet::Destination(destination),
                ))
            }
        }

        0xF8 => Ok(Instruction::new(Operation::CLC, OperandSet::None)),

        0xF9 => Ok(Instruction::new(Operation::STC, OperandSet::None)),

        0xFA => Ok(Instruction::new(Operation::CLI, OperandSet::None)),

        0xFB => Ok(Instruction::new(Operation::STI, OperandSet::None)),

        0xFC => Ok(Instruction::new(Operation::CLD, OperandSet::None)),

        0xFD => Ok(Instruction::new(Operation::STD, OperandSet::None)),

        0xFE | 0xFF => {
            let operand_size = op_code.operand_size();
            let (mrrm, mrrm_byte) = it.read_mrrm()?;

            let destination = mrrm.register_or_memory.into_labeled_operand(operand_size);

            let operation = match (mrrm_byte >> 3) & 0b111 {
                0b000 => Operation::INC,
                0b001 => Operation::DEC,
                0b010 => Operation::CALL,
                0b011 => Operation::CALL,
                0b100 => Operation::JMP,
                0b101 => Operation::JMP,
                0b110 => Operation::PUSH,
                _ => return Err(DecodeError::InvalidModRmEncoding(mrrm_byte)),
            };

            Ok(Instruction::new(
                operation,
                OperandSet::Destination(destination),
            ))
        }

        _ => Err(DecodeError::InvalidOpCode(op_code)),
    }
}

#[cfg(test)]
#[path = "_tests/decode.rs"]
mod tests;
