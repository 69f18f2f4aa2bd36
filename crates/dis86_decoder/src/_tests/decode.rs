use super::*;
use dis86_instruction::{AddressingMode, Displacement};

fn decode(bytes: &[u8]) -> Result<Instruction> {
    let mut it = bytes.iter().copied();
    let instruction = decode_instruction(&mut it);
    assert_eq!(None, it.next(), "decoder left bytes unconsumed");
    instruction
}

fn decoded_text(bytes: &[u8]) -> String {
    decode(bytes).unwrap().to_string()
}

#[test]
fn mov_register_to_register() {
    assert_eq!(
        decode(&[0x89, 0xD9]).unwrap(),
        Instruction::new(
            Operation::MOV,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Word)),
                Operand::Register(SizedRegister(RegisterEncoding::BlBx, OperandSize::Word)),
            )
        )
    );
    assert_eq!(decoded_text(&[0x89, 0xD9]), "mov cx, bx");
}

#[test]
fn direction_bit_selects_register_slot() {
    // 8A = MOV r8, r/m; 88 = MOV r/m, r8. Same ModRegRM byte either way.
    assert_eq!(decoded_text(&[0x8A, 0xC3]), "mov al, bl");
    assert_eq!(decoded_text(&[0x88, 0xC3]), "mov bl, al");
}

#[test]
fn mov_immediate_to_register() {
    assert_eq!(
        decode(&[0xB8, 0x34, 0x12]).unwrap(),
        Instruction::new(
            Operation::MOV,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::AlAx, OperandSize::Word)),
                Immediate::Word(0x1234).into(),
            )
        )
    );
    assert_eq!(decoded_text(&[0xB8, 0x34, 0x12]), "mov ax, 4660");

    // Narrow form takes the w bit from bit 3.
    assert_eq!(decoded_text(&[0xB1, 0x0C]), "mov cl, 12");
}

#[test]
fn sign_extended_immediate() {
    assert_eq!(
        decode(&[0x83, 0xC3, 0x05]).unwrap(),
        Instruction::new(
            Operation::ADD,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::BlBx, OperandSize::Word)),
                Immediate::Word(5).into(),
            )
        )
    );

    // A negative byte extends through the high half of the word.
    assert_eq!(
        decode(&[0x83, 0xE9, 0xFD]).unwrap(),
        Instruction::new(
            Operation::SUB,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Word)),
                Immediate::Word(0xFFFD).into(),
            )
        )
    );
    assert_eq!(decoded_text(&[0x83, 0xE9, 0xFD]), "sub cx, -3");
}

#[test]
fn immediate_group_labels_memory_destination() {
    // add word [bx + si], 5
    assert_eq!(
        decode(&[0x83, 0x00, 0x05]).unwrap(),
        Instruction::new(
            Operation::ADD,
            OperandSet::DestinationAndSource(
                Operand::Indirect(AddressingMode::BxSi, Displacement::None, WidthLabel::Word),
                Immediate::Word(5).into(),
            )
        )
    );
    assert_eq!(decoded_text(&[0x80, 0x07, 0x22]), "add byte [bx], 34");
}

#[test]
fn full_word_immediate_when_sign_bit_clear() {
    assert_eq!(decoded_text(&[0x81, 0xC1, 0xE8, 0x03]), "add cx, 1000");
}

#[test]
fn mov_accumulator_and_memory() {
    assert_eq!(
        decode(&[0xA1, 0x10, 0x00]).unwrap(),
        Instruction::new(
            Operation::MOV,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::AlAx, OperandSize::Word)),
                Operand::Direct(16, WidthLabel::None),
            )
        )
    );
    assert_eq!(decoded_text(&[0xA1, 0x10, 0x00]), "mov ax, [16]");

    // The direction sense is inverted for this family.
    assert_eq!(decoded_text(&[0xA3, 0x10, 0x00]), "mov [16], ax");
    assert_eq!(decoded_text(&[0xA0, 0x10, 0x00]), "mov al, [16]");
}

#[test]
fn direct_address_in_arithmetic() {
    // cmp cx, [4096]
    assert_eq!(
        decode(&[0x3B, 0x0E, 0x00, 0x10]).unwrap(),
        Instruction::new(
            Operation::CMP,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Word)),
                Operand::Direct(4096, WidthLabel::None),
            )
        )
    );
}

#[test]
fn zero_displacement_renders_bare() {
    // mod = 01 with a zero displacement byte still consumes the byte.
    assert_eq!(decoded_text(&[0x8B, 0x40, 0x00]), "mov ax, [bx + si]");
    // mod = 01 on bp has no zero-displacement shortcut encoding.
    assert_eq!(decoded_text(&[0x8A, 0x46, 0x00]), "mov al, [bp]");
}

#[test]
fn displacements_signed_both_ways() {
    assert_eq!(decoded_text(&[0x8B, 0x41, 0x04]), "mov ax, [bx + di + 4]");
    assert_eq!(decoded_text(&[0x8B, 0x41, 0xFC]), "mov ax, [bx + di - 4]");
    assert_eq!(
        decoded_text(&[0x8B, 0x8A, 0xC0, 0xFE]),
        "mov cx, [bp + si - 320]"
    );
}

#[test]
fn short_jumps_carry_the_next_instruction_offset() {
    assert_eq!(
        decode(&[0x75, 0xFE]).unwrap(),
        Instruction::new(Operation::JNE, OperandSet::Destination(Operand::Jump(0)))
    );
    assert_eq!(decoded_text(&[0x75, 0xFE]), "jne $+0");
    assert_eq!(decoded_text(&[0x74, 0x05]), "je $+7");
    assert_eq!(decoded_text(&[0x70, 0xFA]), "jo $-4");
    assert_eq!(decoded_text(&[0xE2, 0xF6]), "loop $-8");
    assert_eq!(decoded_text(&[0xE1, 0x00]), "loopz $+2");
    assert_eq!(decoded_text(&[0xE0, 0x10]), "loopnz $+18");
    assert_eq!(decoded_text(&[0xE3, 0x02]), "jcxz $+4");
}

#[test]
fn push_pop_register_and_segment() {
    assert_eq!(decoded_text(&[0x50]), "push ax");
    assert_eq!(decoded_text(&[0x5F]), "pop di");
    assert_eq!(decoded_text(&[0x06]), "push es");
    assert_eq!(decoded_text(&[0x1F]), "pop ds");
    assert_eq!(decoded_text(&[0x0E]), "push cs");
}

#[test]
fn inc_dec_register() {
    assert_eq!(decoded_text(&[0x41]), "inc cx");
    assert_eq!(decoded_text(&[0x4D]), "dec bp");
}

#[test]
fn mov_with_segment_register() {
    // 8E = sreg destination, 8C = sreg source.
    assert_eq!(decoded_text(&[0x8E, 0xD8]), "mov ds, ax");
    assert_eq!(decoded_text(&[0x8C, 0xD8]), "mov ax, ds");
    assert_eq!(decoded_text(&[0x8C, 0x06, 0x10, 0x00]), "mov [16], es");
}

#[test]
fn load_effective_address_family() {
    assert_eq!(
        decode(&[0x8D, 0x41, 0x04]).unwrap(),
        Instruction::new(
            Operation::LEA,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::AlAx, OperandSize::Word)),
                Operand::Indirect(
                    AddressingMode::BxDi,
                    Displacement::Byte(4),
                    WidthLabel::None
                ),
            )
        )
    );
    assert_eq!(decoded_text(&[0xC5, 0x17]), "lds dx, [bx]");
    assert_eq!(decoded_text(&[0xC4, 0x17]), "les dx, [bx]");
}

#[test]
fn mov_immediate_to_memory_labels_the_immediate() {
    assert_eq!(
        decode(&[0xC6, 0x04, 0x0C]).unwrap(),
        Instruction::new(
            Operation::MOV,
            OperandSet::DestinationAndSource(
                Operand::Indirect(AddressingMode::Si, Displacement::None, WidthLabel::None),
                Operand::Immediate(Immediate::Byte(12), WidthLabel::Byte),
            )
        )
    );
    assert_eq!(decoded_text(&[0xC6, 0x04, 0x0C]), "mov [si], byte 12");
    assert_eq!(
        decoded_text(&[0xC7, 0x06, 0xE8, 0x03, 0x00, 0x01]),
        "mov [1000], word 256"
    );
}

#[test]
fn mov_immediate_to_memory_requires_zero_reg_field() {
    assert_eq!(
        decode(&[0xC6, 0x0C]),
        Err(DecodeError::InvalidModRmEncoding(0x0C))
    );
}

#[test]
fn pop_register_or_memory() {
    assert_eq!(decoded_text(&[0x8F, 0x02]), "pop word [bp + si]");
    assert_eq!(
        decode(&[0x8F, 0x42, 0x04]).unwrap(),
        Instruction::new(
            Operation::POP,
            OperandSet::Destination(Operand::Indirect(
                AddressingMode::BpSi,
                Displacement::Byte(4),
                WidthLabel::Word
            ))
        )
    );
    assert_eq!(
        decode(&[0x8F, 0x4A, 0x04]),
        Err(DecodeError::InvalidModRmEncoding(0x4A))
    );
}

#[test]
fn xchg_with_accumulator() {
    assert_eq!(decoded_text(&[0x91]), "xchg ax, cx");
    assert_eq!(decoded_text(&[0x97]), "xchg ax, di");
}

#[test]
fn test_and_xchg_register_or_memory() {
    assert_eq!(decoded_text(&[0x85, 0xCB]), "test bx, cx");
    assert_eq!(decoded_text(&[0x86, 0x07]), "xchg [bx], al");
}

#[test]
fn shifts_by_one_and_by_cl() {
    assert_eq!(
        decode(&[0xD1, 0xE3]).unwrap(),
        Instruction::new(
            Operation::SHL,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::BlBx, OperandSize::Word)),
                Immediate::Byte(1).into(),
            )
        )
    );
    assert_eq!(decoded_text(&[0xD1, 0xE3]), "shl bx, 1");

    // The count register always renders narrow, even for a word shift.
    assert_eq!(
        decode(&[0xD3, 0xE8]).unwrap(),
        Instruction::new(
            Operation::SHR,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::AlAx, OperandSize::Word)),
                Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Byte)),
            )
        )
    );
    assert_eq!(decoded_text(&[0xD3, 0xE8]), "shr ax, cl");

    assert_eq!(decoded_text(&[0xD0, 0xC8]), "ror al, 1");
    assert_eq!(decoded_text(&[0xD2, 0xD8]), "rcr al, cl");
    assert_eq!(decoded_text(&[0xD1, 0xF8]), "sar ax, 1");
}

#[test]
fn group_f7_test_takes_an_immediate() {
    assert_eq!(
        decode(&[0xF7, 0xC1, 0x34, 0x12]).unwrap(),
        Instruction::new(
            Operation::TEST,
            OperandSet::DestinationAndSource(
                Operand::Register(SizedRegister(RegisterEncoding::ClCx, OperandSize::Word)),
                Immediate::Word(0x1234).into(),
            )
        )
    );

    assert_eq!(decoded_text(&[0xF7, 0xDB]), "neg bx");
    assert_eq!(decoded_text(&[0xF6, 0xD1]), "not cl");
    assert_eq!(decoded_text(&[0xF7, 0xE1]), "mul cx");
    assert_eq!(decoded_text(&[0xF7, 0xF9]), "idiv cx");

    assert_eq!(
        decode(&[0xF7, 0xC9]),
        Err(DecodeError::InvalidModRmEncoding(0xC9))
    );
}

#[test]
fn group_ff_labels_its_memory_operand() {
    assert_eq!(decoded_text(&[0xFF, 0x32]), "push word [bp + si]");
    assert_eq!(decoded_text(&[0xFF, 0x06, 0x10, 0x00]), "inc word [16]");
    assert_eq!(decoded_text(&[0xFE, 0x0F]), "dec byte [bx]");
    assert_eq!(decoded_text(&[0xFF, 0x17]), "call word [bx]");
    assert_eq!(decoded_text(&[0xFF, 0x27]), "jmp word [bx]");
    // Register destinations never take the width keyword.
    assert_eq!(decoded_text(&[0xFF, 0xC0]), "inc ax");

    assert_eq!(
        decode(&[0xFF, 0x3F]),
        Err(DecodeError::InvalidModRmEncoding(0x3F))
    );
}

#[test]
fn in_and_out_operand_order() {
    assert_eq!(decoded_text(&[0xE4, 0xC8]), "in al, 200");
    assert_eq!(decoded_text(&[0xE5, 0xC8]), "in ax, 200");
    assert_eq!(decoded_text(&[0xE6, 0x2E]), "out 46, al");
    assert_eq!(decoded_text(&[0xEC]), "in al, dx");
    assert_eq!(decoded_text(&[0xED]), "in ax, dx");
    assert_eq!(decoded_text(&[0xEE]), "out dx, al");
    assert_eq!(decoded_text(&[0xEF]), "out dx, ax");
}

#[test]
fn test_immediate_with_accumulator() {
    assert_eq!(decoded_text(&[0xA8, 0x01]), "test al, 1");
    assert_eq!(decoded_text(&[0xA9, 0x00, 0x80]), "test ax, -32768");
}

#[test]
fn string_operations() {
    assert_eq!(decoded_text(&[0xA4]), "movsb");
    assert_eq!(decoded_text(&[0xA5]), "movsw");
    assert_eq!(decoded_text(&[0xA6]), "cmpsb");
    assert_eq!(decoded_text(&[0xA7]), "cmpsw");
    assert_eq!(decoded_text(&[0xAA]), "stosb");
    assert_eq!(decoded_text(&[0xAB]), "stosw");
    assert_eq!(decoded_text(&[0xAC]), "lodsb");
    assert_eq!(decoded_text(&[0xAD]), "lodsw");
    assert_eq!(decoded_text(&[0xAE]), "scasb");
    assert_eq!(decoded_text(&[0xAF]), "scasw");
}

#[test]
fn prefixes_decode_as_their_own_instructions() {
    let rep = decode(&[0xF3]).unwrap();
    assert_eq!(rep, Instruction::new(Operation::REP, OperandSet::None));
    assert!(rep.operation.is_prefix());

    let repne = decode(&[0xF2]).unwrap();
    assert_eq!(repne.operation, Operation::REP);

    let lock = decode(&[0xF0]).unwrap();
    assert_eq!(lock, Instruction::new(Operation::LOCK, OperandSet::None));
    assert!(lock.operation.is_prefix());
}

#[test]
fn interrupts() {
    // INT3 has its own op code but prints as int with an immediate of 3.
    assert_eq!(
        decode(&[0xCC]).unwrap(),
        Instruction::new(
            Operation::INT,
            OperandSet::Destination(Immediate::Byte(3).into())
        )
    );
    assert_eq!(decoded_text(&[0xCC]), "int 3");
    assert_eq!(decoded_text(&[0xCD, 0x15]), "int 21");
    assert_eq!(decoded_text(&[0xCE]), "into");
    assert_eq!(decoded_text(&[0xCF]), "iret");
}

#[test]
fn returns() {
    assert_eq!(decoded_text(&[0xC3]), "ret");
    assert_eq!(decoded_text(&[0xCB]), "ret");
    assert_eq!(decoded_text(&[0xC2, 0x04, 0x00]), "ret 4");
}

#[test]
fn aam_and_aad_discard_their_second_byte() {
    assert_eq!(
        decode(&[0xD4, 0x0A]).unwrap(),
        Instruction::new(Operation::AAM, OperandSet::None)
    );
    assert_eq!(
        decode(&[0xD5, 0x0A]).unwrap(),
        Instruction::new(Operation::AAD, OperandSet::None)
    );
    // The byte is dropped even when it is not the expected 0b00001010.
    assert_eq!(
        decode(&[0xD4, 0xFF]).unwrap(),
        Instruction::new(Operation::AAM, OperandSet::None)
    );
}

#[test]
fn single_byte_operations() {
    for (byte, text) in [
        (0x27u8, "daa"),
        (0x2F, "das"),
        (0x37, "aaa"),
        (0x3F, "aas"),
        (0x98, "cbw"),
        (0x99, "cwd"),
        (0x9B, "wait"),
        (0x9C, "pushf"),
        (0x9D, "popf"),
        (0x9E, "sahf"),
        (0x9F, "lahf"),
        (0xD7, "xlat"),
        (0xF4, "hlt"),
        (0xF5, "cmc"),
        (0xF8, "clc"),
        (0xF9, "stc"),
        (0xFA, "cli"),
        (0xFB, "sti"),
        (0xFC, "cld"),
        (0xFD, "std"),
    ] {
        assert_eq!(decoded_text(&[byte]), text);
    }
}

#[test]
fn arithmetic_family_covers_all_eight_operations() {
    assert_eq!(decoded_text(&[0x00, 0xD8]), "add al, bl");
    assert_eq!(decoded_text(&[0x09, 0xD8]), "or ax, bx");
    assert_eq!(decoded_text(&[0x11, 0xD8]), "adc ax, bx");
    assert_eq!(decoded_text(&[0x19, 0xD8]), "sbb ax, bx");
    assert_eq!(decoded_text(&[0x21, 0xD8]), "and ax, bx");
    assert_eq!(decoded_text(&[0x29, 0xD8]), "sub ax, bx");
    assert_eq!(decoded_text(&[0x31, 0xD8]), "xor ax, bx");
    assert_eq!(decoded_text(&[0x39, 0xD8]), "cmp ax, bx");

    assert_eq!(decoded_text(&[0x04, 0x09]), "add al, 9");
    assert_eq!(decoded_text(&[0x2D, 0xE8, 0x03]), "sub ax, 1000");
    assert_eq!(decoded_text(&[0x3C, 0x09]), "cmp al, 9");
}

#[test]
fn unknown_op_code_is_reported_with_the_byte() {
    assert_eq!(decode(&[0x60]), Err(DecodeError::InvalidOpCode(0x60)));
    let mut it = [0x66u8, 0x90].iter().copied();
    assert_eq!(
        decode_instruction(&mut it),
        Err(DecodeError::InvalidOpCode(0x66))
    );
    // Only the unknown byte itself is consumed.
    assert_eq!(it.next(), Some(0x90));
}

#[test]
fn end_of_input_is_clean_only_on_the_first_byte() {
    assert_eq!(decode(&[]), Err(DecodeError::EndOfInput));
    assert_eq!(decode(&[0xB8]), Err(DecodeError::UnexpectedEndOfInput));
    assert_eq!(decode(&[0x89]), Err(DecodeError::UnexpectedEndOfInput));
    assert_eq!(decode(&[0x8B, 0x41]), Err(DecodeError::UnexpectedEndOfInput));
}
