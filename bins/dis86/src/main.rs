use dis86_decoder::{decode_instruction, DecodeError};
use dis86_sim::Cpu;
use std::io::{Read, Write};
use structopt::StructOpt;
use tracing::debug;

struct ByteStream<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteStream<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }
}

impl<'a> Iterator for ByteStream<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = self.data.get(self.position)?;
        self.position += 1;
        Some(*byte)
    }
}

/// Decodes the whole stream, printing one assembly line per instruction
/// (prefixes share their line with the instruction that follows). In
/// execute mode every line gets a state-change comment and the run ends
/// with a final-state block.
fn run(data: &[u8], source: &str, execute: bool, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "; Disassembly: {}", source)?;
    writeln!(out, "bits 16")?;

    let mut cpu = execute.then(Cpu::default);
    let mut it = ByteStream::new(data);

    loop {
        let start = it.position;

        match decode_instruction(&mut it) {
            Ok(instruction) => {
                debug!(offset = start, instruction = %instruction, "decoded");

                if instruction.operation.is_prefix() {
                    write!(out, "{} ", instruction)?;
                    continue;
                }

                write!(out, "{}", instruction)?;
                if let Some(cpu) = cpu.as_mut() {
                    write!(out, " {}", cpu.step(&instruction))?;
                }
                writeln!(out)?;
            }

            Err(DecodeError::EndOfInput) => break,

            // An unclassified byte is data as far as we are concerned.
            Err(DecodeError::InvalidOpCode(byte)) => {
                writeln!(out, "; {:#04x}", byte)?;
            }

            Err(err) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("decode error at offset {}: {}", start, err),
                ));
            }
        }
    }

    if let Some(cpu) = cpu {
        writeln!(out, "{}", cpu.final_state())?;
    }

    Ok(())
}

fn load_data(binary: &str) -> Result<Vec<u8>, std::io::Error> {
    let mut file = std::fs::File::open(binary)?;
    let mut buffer: Vec<u8> = Vec::new();
    let _ = file.read_to_end(&mut buffer)?;

    Ok(buffer)
}

#[derive(StructOpt)]
struct Opt {
    /// The binary file to disassemble
    binary: String,

    /// Simulate the decoded instructions and trace the CPU state
    #[structopt(short = "e", long)]
    execute: bool,

    #[structopt(short = "E", hidden = true)]
    execute_alias: bool,
}

fn main() {
    let opt = Opt::from_args();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let data = match load_data(opt.binary.as_str()) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to open file: {}: {}", opt.binary, err);
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(err) = run(
        &data,
        opt.binary.as_str(),
        opt.execute || opt.execute_alias,
        &mut out,
    ) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disassembly(data: &[u8]) -> String {
        let mut out = Vec::new();
        run(data, "test.bin", false, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn simulation(data: &[u8]) -> String {
        let mut out = Vec::new();
        run(data, "test.bin", true, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn preamble_and_single_instruction() {
        assert_eq!(
            disassembly(&[0x89, 0xD9]),
            "; Disassembly: test.bin\nbits 16\nmov cx, bx\n"
        );
    }

    #[test]
    fn prefixes_share_the_line() {
        assert_eq!(
            disassembly(&[0xF3, 0xA4]),
            "; Disassembly: test.bin\nbits 16\nrep movsb\n"
        );
        assert_eq!(
            disassembly(&[0xF3, 0xA5]),
            "; Disassembly: test.bin\nbits 16\nrep movsw\n"
        );
        assert_eq!(
            disassembly(&[0xF0, 0x86, 0x07]),
            "; Disassembly: test.bin\nbits 16\nlock xchg [bx], al\n"
        );
    }

    #[test]
    fn unknown_byte_becomes_a_comment_line() {
        assert_eq!(
            disassembly(&[0x60, 0x89, 0xD9]),
            "; Disassembly: test.bin\nbits 16\n; 0x60\nmov cx, bx\n"
        );
    }

    #[test]
    fn truncated_instruction_is_a_hard_error() {
        let mut out = Vec::new();
        let err = run(&[0xB8, 0x01], "test.bin", false, &mut out).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("offset 0"));
    }

    #[test]
    fn execute_mode_traces_and_reports_final_state() {
        let output = simulation(&[0xB8, 0x01, 0x00, 0xBB, 0x02, 0x00, 0x01, 0xD8]);

        assert_eq!(
            output,
            "; Disassembly: test.bin\n\
             bits 16\n\
             mov ax, 1 ; ax = 0x0001\n\
             mov bx, 2 ; bx = 0x0002\n\
             add ax, bx ; flags [] -> [], ax = 0x0003\n\
             ; Final state:\n\
             ;   ax: 0x0003  cx: 0x0000  dx: 0x0000  bx: 0x0002\n\
             ;   sp: 0x0000  bp: 0x0000  si: 0x0000  di: 0x0000\n\
             ;   es: 0x0000  cs: 0x0000  ss: 0x0000  ds: 0x0000\n\
             ;   flags: []\n"
        );
    }

    #[test]
    fn execute_mode_reports_unsupported_instructions() {
        let output = simulation(&[0xF4]);
        assert!(output.contains("hlt ; not implemented\n"));
    }
}
