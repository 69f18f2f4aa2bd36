#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    // Data transfer
    MOV,   // Move
    PUSH,  // Push
    POP,   // Pop
    XCHG,  // Exchange
    IN,    // Input from
    OUT,   // Output to
    XLAT,  // Translate byte to AL
    LEA,   // Load effective address to register
    LDS,   // Load pointer to DS
    LES,   // Load pointer to ES
    LAHF,  // Load AH with flags
    SAHF,  // Store AH into flags
    PUSHF, // Push flags
    POPF,  // Pop flags

    // Arithmetic
    ADD,  // Add
    ADC,  // Add with carry
    INC,  // Increment
    AAA,  // ASCII adjust for add
    DAA,  // Decimal adjust for add
    SUB,  // Subtract
    SBB,  // Subtract with borrow
    DEC,  // Decrement
    NEG,  // Change sign
    CMP,  // Compare
    AAS,  // ASCII adjust for subtract
    DAS,  // Decimal adjust for subtract
    MUL,  // Multiply (unsigned)
    IMUL, // Integer multiply (signed)
    AAM,  // ASCII adjust for multiply
    DIV,  // Divide (unsigned)
    IDIV, // Integer divide (signed)
    AAD,  // ASCII adjust for divide
    CBW,  // Convert byte to word
    CWD,  // Convert word to double word

    // Logic
    NOT,  // Invert
    SHL,  // Shift logical left (alias: SAL)
    SHR,  // Shift logical right
    SAR,  // Shift arithmetic right
    ROL,  // Rotate left
    ROR,  // Rotate right
    RCL,  // Rotate through carry flag left
    RCR,  // Rotate through carry flag right
    AND,  // And
    TEST, // And function to flags, no result
    OR,   // Or
    XOR,  // Exclusive or

    // String manipulation
    REP,   // Repeat prefix
    MOVSB, // Move byte
    MOVSW, // Move word
    CMPSB, // Compare byte
    CMPSW, // Compare word
    SCASB, // Scan byte
    SCASW, // Scan word
    LODSB, // Load byte to AL
    LODSW, // Load word to AX
    STOSB, // Store byte from AL
    STOSW, // Store word from AX

    // Control transfer
    CALL,   // Call
    JMP,    // Unconditional jump
    RET,    // Return from CALL
    JE,     // Jump on equal/zero (alias JZ)
    JL,     // Jump on less (alias JNGE)
    JLE,    // Jump on less or equal (alias JNG)
    JB,     // Jump on below (alias JNAE)
    JBE,    // Jump on below or equal (alias JNA)
    JP,     // Jump on parity even (alias JPE)
    JO,     // Jump on overflow
    JS,     // Jump on sign
    JNE,    // Jump on not equal/not zero (alias JNZ)
    JNL,    // Jump on not less (alias JGE)
    JNLE,   // Jump on not less or equal (alias JG)
    JNB,    // Jump on not below (alias JAE)
    JNBE,   // Jump on not below or equal (alias JA)
    JNP,    // Jump on parity odd (alias JPO)
    JNO,    // Jump on not overflow
    JNS,    // Jump on not sign
    LOOP,   // Loop CX times
    LOOPZ,  // Loop while zero (alias LOOPE)
    LOOPNZ, // Loop while not zero (alias LOOPNE)
    JCXZ,   // Jump on CX zero
    INT,    // Interrupt
    INTO,   // Interrupt on overflow
    IRET,   // Interrupt return

    // Processor control
    CLC,  // Clear carry
    CMC,  // Complement carry
    STC,  // Set carry
    CLD,  // Clear direction
    STD,  // Set direction
    CLI,  // Clear interrupt
    STI,  // Set interrupt
    HLT,  // Halt
    WAIT, // Wait
    LOCK, // Bus lock prefix
}

impl Operation {
    /// LOCK and REP share their output line with the instruction that
    /// follows them in the stream.
    pub fn is_prefix(&self) -> bool {
        matches!(self, Operation::LOCK | Operation::REP)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Operation::*;
        write!(
            f,
            "{}",
            match self {
                MOV => "mov",
                PUSH => "push",
                POP => "pop",
                XCHG => "xchg",
                IN => "in",
                OUT => "out",
                XLAT => "xlat",
                LEA => "lea",
                LDS => "lds",
                LES => "les",
                LAHF => "lahf",
                SAHF => "sahf",
                PUSHF => "pushf",
                POPF => "popf",
                ADD => "add",
                ADC => "adc",
                INC => "inc",
                AAA => "aaa",
                DAA => "daa",
                SUB => "sub",
                SBB => "sbb",
                DEC => "dec",
                NEG => "neg",
                CMP => "cmp",
                AAS => "aas",
                DAS => "das",
                MUL => "mul",
                IMUL => "imul",
                AAM => "aam",
                DIV => "div",
                IDIV => "idiv",
                AAD => "aad",
                CBW => "cbw",
                CWD => "cwd",
                NOT => "not",
                SHL => "shl",
                SHR => "shr",
                SAR => "sar",
                ROL => "rol",
                ROR => "ror",
                RCL => "rcl",
                RCR => "rcr",
                AND => "and",
                TEST => "test",
                OR => "or",
                XOR => "xor",
                REP => "rep",
                MOVSB => "movsb",
                MOVSW => "movsw",
                CMPSB => "cmpsb",
                CMPSW => "cmpsw",
                SCASB => "scasb",
                SCASW => "scasw",
                LODSB => "lodsb",
                LODSW => "lodsw",
                STOSB => "stosb",
                STOSW => "stosw",
                CALL => "call",
                JMP => "jmp",
                RET => "ret",
                JE => "je",
                JL => "jl",
                JLE => "jle",
                JB => "jb",
                JBE => "jbe",
                JP => "jp",
                JO => "jo",
                JS => "js",
                JNE => "jne",
                JNL => "jnl",
                JNLE => "jnle",
                JNB => "jnb",
                JNBE => "jnbe",
                JNP => "jnp",
                JNO => "jno",
                JNS => "jns",
                LOOP => "loop",
                LOOPZ => "loopz",
                LOOPNZ => "loopnz",
                JCXZ => "jcxz",
                INT => "int",
                INTO => "into",
                IRET => "iret",
                CLC => "clc",
                CMC => "cmc",
                STC => "stc",
                CLD => "cld",
                STD => "std",
                CLI => "cli",
                STI => "sti",
                HLT => "hlt",
                WAIT => "wait",
                LOCK => "lock",
            }
        )
    }
}
