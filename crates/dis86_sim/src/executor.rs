use crate::state::{Flags, State};
use dis86_instruction::{
    Immediate, Instruction, Operand, OperandSet, OperandSize, Operation, Segment, SizedRegister,
};
use tracing::{trace, warn};

// Wrapping two's-complement ALU, one function per width. CMP runs through
// the same path as SUB with the result dropped by the caller.
//
// SIGN and ZERO follow the result; PARITY is cleared rather than computed;
// CARRY, AUX_CARRY, OVERFLOW and the control flags are left alone.
fn alu_word(operation: Operation, destination: u16, source: u16, flags: &mut Flags) -> u16 {
    let result = match operation {
        Operation::ADD => destination.wrapping_add(source),
        Operation::SUB | Operation::CMP => destination.wrapping_sub(source),
        _ => unreachable!(),
    };

    flags.set(Flags::SIGN, result & 0x8000 != 0);
    flags.set(Flags::ZERO, result == 0);
    flags.remove(Flags::PARITY);

    result
}

fn alu_byte(operation: Operation, destination: u8, source: u8, flags: &mut Flags) -> u8 {
    let result = match operation {
        Operation::ADD => destination.wrapping_add(source),
        Operation::SUB | Operation::CMP => destination.wrapping_sub(source),
        _ => unreachable!(),
    };

    flags.set(Flags::SIGN, result & 0x80 != 0);
    flags.set(Flags::ZERO, result == 0);
    flags.remove(Flags::PARITY);

    result
}

/// Executes the simulated subset of instructions against a [State] that
/// starts zeroed and lives for the whole run. Every step yields the
/// `;`-comment that the caller appends to the printed assembly line.
#[derive(Default)]
pub struct Cpu {
    state: State,
}

impl Cpu {
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn step(&mut self, instruction: &Instruction) -> String {
        trace!(instruction = %instruction, "simulating");

        let step_trace = match instruction.operation {
            Operation::MOV => self.mov(instruction),
            Operation::ADD | Operation::SUB | Operation::CMP => self.arithmetic(instruction),
            _ => None,
        };

        step_trace.unwrap_or_else(|| {
            warn!(instruction = %instruction, "instruction outside the simulated subset");
            String::from("; not implemented")
        })
    }

    /// The `; Final state:` comment block emitted after the stream ends.
    pub fn final_state(&self) -> String {
        use crate::state::WordRegister::*;

        let mut lines = vec![String::from("; Final state:")];
        lines.push(format!(
            ";   ax: {:#06x}  cx: {:#06x}  dx: {:#06x}  bx: {:#06x}",
            self.state.register(AX),
            self.state.register(CX),
            self.state.register(DX),
            self.state.register(BX),
        ));
        lines.push(format!(
            ";   sp: {:#06x}  bp: {:#06x}  si: {:#06x}  di: {:#06x}",
            self.state.register(SP),
            self.state.register(BP),
            self.state.register(SI),
            self.state.register(DI),
        ));
        lines.push(format!(
            ";   es: {:#06x}  cs: {:#06x}  ss: {:#06x}  ds: {:#06x}",
            self.state.segment(Segment::ES),
            self.state.segment(Segment::CS),
            self.state.segment(Segment::SS),
            self.state.segment(Segment::DS),
        ));
        lines.push(format!(";   flags: [{}]", self.state.flags.letters()));

        lines.join("\n")
    }

    fn source_value(&self, operand: &Operand) -> Option<u16> {
        match operand {
            Operand::Register(SizedRegister(encoding, OperandSize::Byte)) => {
                Some(self.state.register::<u8, _>(*encoding) as u16)
            }
            Operand::Register(SizedRegister(encoding, OperandSize::Word)) => {
                Some(self.state.register::<u16, _>(*encoding))
            }
            Operand::Segment(segment) => Some(self.state.segment(*segment)),
            Operand::Immediate(Immediate::Byte(value), _) => Some(*value as u16),
            Operand::Immediate(Immediate::Word(value), _) => Some(*value),
            _ => None,
        }
    }

    fn mov(&mut self, instruction: &Instruction) -> Option<String> {
        let (destination, source) = match instruction.operands {
            OperandSet::DestinationAndSource(destination, source) => (destination, source),
            _ => return None,
        };

        let value = self.source_value(&source)?;

        match destination {
            Operand::Register(SizedRegister(encoding, OperandSize::Word)) => {
                self.state.set_register(encoding, value);
                Some(format!("; {} = {:#06x}", destination, value))
            }
            Operand::Register(SizedRegister(encoding, OperandSize::Byte)) => {
                self.state.set_register(encoding, value as u8);
                Some(format!("; {} = {:#04x}", destination, value as u8))
            }
            Operand::Segment(segment) => {
                self.state.set_segment(segment, value);
                Some(format!("; {} = {:#06x}", destination, value))
            }
            _ => None,
        }
    }

    fn arithmetic(&mut self, instruction: &Instruction) -> Option<String> {
        let (destination, source) = match instruction.operands {
            OperandSet::DestinationAndSource(destination, source) => (destination, source),
            _ => return None,
        };

        let operation = instruction.operation;
        let source_value = self.source_value(&source)?;
        let before = self.state.flags.letters();

        let new_value = match destination {
            Operand::Register(SizedRegister(encoding, OperandSize::Byte)) => {
                let result = alu_byte(
                    operation,
                    self.state.register::<u8, _>(encoding),
                    source_value as u8,
                    &mut self.state.flags,
                );
                if operation != Operation::CMP {
                    self.state.set_register(encoding, result);
                }
                format!("{:#04x}", result)
            }

            Operand::Register(SizedRegister(encoding, OperandSize::Word)) => {
                let result = alu_word(
                    operation,
                    self.state.register::<u16, _>(encoding),
                    source_value,
                    &mut self.state.flags,
                );
                if operation != Operation::CMP {
                    self.state.set_register(encoding, result);
                }
                format!("{:#06x}", result)
            }

            Operand::Segment(segment) => {
                let result = alu_word(
                    operation,
                    self.state.segment(segment),
                    source_value,
                    &mut self.state.flags,
                );
                if operation != Operation::CMP {
                    self.state.set_segment(segment, result);
                }
                format!("{:#06x}", result)
            }

            _ => return None,
        };

        let after = self.state.flags.letters();

        Some(if operation == Operation::CMP {
            format!("; flags [{}] -> [{}]", before, after)
        } else {
            format!(
                "; flags [{}] -> [{}], {} = {}",
                before, after, destination, new_value
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WordRegister;
    use dis86_instruction::RegisterEncoding;

    fn word_register(encoding: RegisterEncoding) -> Operand {
        Operand::Register(SizedRegister(encoding, OperandSize::Word))
    }

    fn byte_register(encoding: RegisterEncoding) -> Operand {
        Operand::Register(SizedRegister(encoding, OperandSize::Byte))
    }

    fn two_operand(operation: Operation, destination: Operand, source: Operand) -> Instruction {
        Instruction::new(
            operation,
            OperandSet::DestinationAndSource(destination, source),
        )
    }

    #[test]
    fn mov_and_add_registers() {
        let mut cpu = Cpu::default();

        let step = cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::AlAx),
            Immediate::Word(1).into(),
        ));
        assert_eq!(step, "; ax = 0x0001");

        cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::BlBx),
            Immediate::Word(2).into(),
        ));

        let step = cpu.step(&two_operand(
            Operation::ADD,
            word_register(RegisterEncoding::AlAx),
            word_register(RegisterEncoding::BlBx),
        ));
        assert_eq!(step, "; flags [] -> [], ax = 0x0003");

        assert_eq!(cpu.state().register(WordRegister::AX), 3);
        assert_eq!(cpu.state().register(WordRegister::BX), 2);
        assert!(!cpu.state().flags.contains(Flags::ZERO));
        assert!(!cpu.state().flags.contains(Flags::SIGN));
        assert!(!cpu.state().flags.contains(Flags::PARITY));
    }

    #[test]
    fn narrow_mov_writes_through_the_byte_alias() {
        let mut cpu = Cpu::default();

        cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::AlAx),
            Immediate::Word(0x1234).into(),
        ));

        let step = cpu.step(&two_operand(
            Operation::MOV,
            byte_register(RegisterEncoding::AhSp),
            Immediate::Byte(0xAB).into(),
        ));
        assert_eq!(step, "; ah = 0xab");

        // Only the high byte of AX moved; SP is untouched.
        assert_eq!(cpu.state().register(WordRegister::AX), 0xAB34);
        assert_eq!(cpu.state().register(WordRegister::SP), 0);
    }

    #[test]
    fn subtract_to_zero_sets_the_zero_flag() {
        let mut cpu = Cpu::default();

        cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::ClCx),
            Immediate::Word(7).into(),
        ));
        let step = cpu.step(&two_operand(
            Operation::SUB,
            word_register(RegisterEncoding::ClCx),
            Immediate::Word(7).into(),
        ));

        assert_eq!(step, "; flags [] -> [Z], cx = 0x0000");
        assert!(cpu.state().flags.contains(Flags::ZERO));
    }

    #[test]
    fn subtract_below_zero_wraps_and_sets_sign() {
        let mut cpu = Cpu::default();

        let step = cpu.step(&two_operand(
            Operation::SUB,
            word_register(RegisterEncoding::AlAx),
            Immediate::Word(1).into(),
        ));

        assert_eq!(step, "; flags [] -> [S], ax = 0xffff");
        assert_eq!(cpu.state().register(WordRegister::AX), 0xFFFF);
        assert!(cpu.state().flags.contains(Flags::SIGN));
        assert!(!cpu.state().flags.contains(Flags::ZERO));
    }

    #[test]
    fn compare_updates_flags_without_storing() {
        let mut cpu = Cpu::default();

        cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::DlDx),
            Immediate::Word(5).into(),
        ));
        let step = cpu.step(&two_operand(
            Operation::CMP,
            word_register(RegisterEncoding::DlDx),
            Immediate::Word(5).into(),
        ));

        assert_eq!(step, "; flags [] -> [Z]");
        assert_eq!(cpu.state().register(WordRegister::DX), 5);
    }

    #[test]
    fn byte_arithmetic_wraps_at_eight_bits() {
        let mut cpu = Cpu::default();

        cpu.step(&two_operand(
            Operation::MOV,
            byte_register(RegisterEncoding::AlAx),
            Immediate::Byte(0xF0).into(),
        ));
        let step = cpu.step(&two_operand(
            Operation::ADD,
            byte_register(RegisterEncoding::AlAx),
            Immediate::Byte(0x20).into(),
        ));

        assert_eq!(step, "; flags [] -> [], al = 0x10");
        // The wrap stays inside the low byte.
        assert_eq!(cpu.state().register(WordRegister::AX), 0x0010);
    }

    #[test]
    fn segment_registers_are_simulated() {
        let mut cpu = Cpu::default();

        cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::AlAx),
            Immediate::Word(0xB800).into(),
        ));
        let step = cpu.step(&two_operand(
            Operation::MOV,
            Operand::Segment(Segment::ES),
            word_register(RegisterEncoding::AlAx),
        ));

        assert_eq!(step, "; es = 0xb800");
        assert_eq!(cpu.state().segment(Segment::ES), 0xB800);
    }

    #[test]
    fn unsupported_operations_are_reported() {
        let mut cpu = Cpu::default();

        let step = cpu.step(&Instruction::new(Operation::HLT, OperandSet::None));
        assert_eq!(step, "; not implemented");

        // Memory operands are outside the simulated subset.
        let step = cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::AlAx),
            Operand::Direct(16, dis86_instruction::WidthLabel::None),
        ));
        assert_eq!(step, "; not implemented");
    }

    #[test]
    fn final_state_reports_registers_and_flags() {
        let mut cpu = Cpu::default();

        cpu.step(&two_operand(
            Operation::MOV,
            word_register(RegisterEncoding::AlAx),
            Immediate::Word(1).into(),
        ));
        cpu.step(&two_operand(
            Operation::SUB,
            word_register(RegisterEncoding::AlAx),
            Immediate::Word(1).into(),
        ));

        let report = cpu.final_state();
        assert_eq!(
            report,
            "; Final state:\n\
             ;   ax: 0x0000  cx: 0x0000  dx: 0x0000  bx: 0x0000\n\
             ;   sp: 0x0000  bp: 0x0000  si: 0x0000  di: 0x0000\n\
             ;   es: 0x0000  cs: 0x0000  ss: 0x0000  ds: 0x0000\n\
             ;   flags: [Z]"
        );
    }
}
