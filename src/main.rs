//! r16 emulator - CLI entry point
//!
//! Commands:
//! - `r16-emu run <image>` - Load and run a program to halt
//! - `r16-emu debug <image>` - Interactive debugger
//! - `r16-emu disasm <image>` - Disassemble an image
//! - `r16-emu convert <in.cpu> <out.bin>` - Hex text to raw binary

use clap::{Parser, Subcommand};
use r16::{Cpu, Endian, START_ADDR};

/// Demo program baked into the binary; runs when no command is given.
/// Exercises loads, ALU ops, both jump forms and the halt path.
const DEMO_PROGRAM: &[u16] = &[
    0xFFFF, // 0100 NOP
    0x00A3, // 0101 LOAD r10, (r3)
    0x0142, // 0102 LOAD r4, 2
    0x0350, 0xFF08, // 0103 LOAD r5, #0xff08
    0x2054, // 0105 ADD r5, r4
    0x3004, // 0106 NOT r4
    0x3145, // 0107 AND r4, r5
    0x3345, // 0108 XOR r4, r5
    0x4045, // 0109 CMP r4, r5
    0x5002, // 010a JMPR +2
    0xFFFF, // 010b NOP (skipped)
    0xFFFF, // 010c NOP (skipped)
    0x5100, 0x0110, // 010d JMP #0x0110
    0xFFFF, // 010f NOP (skipped)
    0x5000, // 0110 JMPR +0
    0xF800, // 0111 HALT
];

#[derive(Parser)]
#[command(name = "r16-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of a 16-bit word-addressable register machine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a program image and run it until it halts
    Run {
        /// Path to the image (.cpu hex text, anything else raw binary)
        image: String,
        /// Address to load the image at
        #[arg(long, default_value = "0x100", value_parser = parse_word)]
        load_at: u16,
        /// Memory size in words
        #[arg(long, default_value = "4096")]
        mem_words: usize,
        /// Maximum number of cycles to run
        #[arg(short, long, default_value = "100000")]
        max_cycles: u64,
        /// Show a per-cycle trace
        #[arg(short, long)]
        trace: bool,
        /// Read raw binaries as big-endian words
        #[arg(long)]
        big_endian: bool,
        /// Write the final CPU state as JSON to this path
        #[arg(long)]
        state_json: Option<String>,
    },
    /// Interactive debugger
    #[cfg(feature = "tui")]
    Debug {
        /// Path to the image to debug
        image: String,
        /// Address to load the image at
        #[arg(long, default_value = "0x100", value_parser = parse_word)]
        load_at: u16,
        /// Memory size in words
        #[arg(long, default_value = "4096")]
        mem_words: usize,
        /// Read raw binaries as big-endian words
        #[arg(long)]
        big_endian: bool,
    },
    /// Disassemble an image to readable text
    Disasm {
        /// Path to the image
        image: String,
        /// Address the listing starts at
        #[arg(long, default_value = "0x100", value_parser = parse_word)]
        origin: u16,
        /// Read raw binaries as big-endian words
        #[arg(long)]
        big_endian: bool,
    },
    /// Convert a hex text program to a raw binary image
    Convert {
        /// Input hex text file
        input: String,
        /// Output binary file
        output: String,
        /// Write big-endian words
        #[arg(long)]
        big_endian: bool,
    },
}

/// Parse an address as hex (with `0x`) or decimal.
fn parse_word(s: &str) -> Result<u16, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| format!("invalid 16-bit address: {}", s))
}

fn endian_of(big: bool) -> Endian {
    if big {
        Endian::Big
    } else {
        Endian::Little
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            image,
            load_at,
            mem_words,
            max_cycles,
            trace,
            big_endian,
            state_json,
        }) => {
            let words = load_or_exit(&image, endian_of(big_endian));
            run_program(&words, load_at, mem_words, max_cycles, trace, state_json);
        }
        #[cfg(feature = "tui")]
        Some(Commands::Debug {
            image,
            load_at,
            mem_words,
            big_endian,
        }) => {
            let words = load_or_exit(&image, endian_of(big_endian));
            if let Err(e) = r16::run_debugger(words, load_at, mem_words) {
                eprintln!("debugger error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Disasm {
            image,
            origin,
            big_endian,
        }) => {
            let words = load_or_exit(&image, endian_of(big_endian));
            print!("{}", disassemble(&words, origin));
        }
        Some(Commands::Convert {
            input,
            output,
            big_endian,
        }) => {
            let words = match r16::image::load_hex(&input) {
                Ok(words) => words,
                Err(e) => {
                    eprintln!("could not read {}: {}", input, e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = r16::image::save_binary(&output, &words, endian_of(big_endian)) {
                eprintln!("could not write {}: {}", output, e);
                std::process::exit(1);
            }
            println!("Wrote {} words to {}", words.len(), output);
        }
        None => {
            println!("r16 emulator v0.1.0");
            println!("No image given; running the built-in demo program");
            println!();
            run_program(DEMO_PROGRAM, START_ADDR, 4096, 10_000, true, None);
        }
    }
}

fn load_or_exit(path: &str, endian: Endian) -> Vec<u16> {
    match r16::image::load_image(path, endian) {
        Ok(words) if words.is_empty() => {
            eprintln!("{}: image is empty", path);
            std::process::exit(1);
        }
        Ok(words) => {
            println!("Loaded {} words from {}", words.len(), path);
            words
        }
        Err(e) => {
            eprintln!("could not load {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn run_program(
    words: &[u16],
    load_at: u16,
    mem_words: usize,
    max_cycles: u64,
    trace: bool,
    state_json: Option<String>,
) {
    let mut cpu = Cpu::new(mem_words);
    let placed = cpu.loadmem(words, load_at);
    if placed < words.len() {
        println!(
            "warning: image truncated to {} of {} words",
            placed,
            words.len()
        );
    }
    cpu.reset();

    let mut retired = 0u64;
    while retired < max_cycles {
        match cpu.step() {
            Ok(Some(t)) => {
                if trace {
                    println!("{}", t);
                }
                retired += 1;
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("CPU fault after {} cycles: {}", retired, e);
                break;
            }
        }
    }

    println!();
    println!("Cycles: {}   State: {:?}", cpu.cycles, cpu.state());
    for row in 0..4 {
        let line: Vec<String> = (0..4)
            .map(|col| {
                let idx = row * 4 + col;
                format!("r{:<2}={:04x}", idx, cpu.regs.r[idx])
            })
            .collect();
        println!("{}", line.join("  "));
    }
    println!(
        "PC={:04x}  FLAGS={} ({:04x})",
        cpu.regs.pc,
        cpu.regs.flags.summary(),
        cpu.regs.flags.bits()
    );

    if retired >= max_cycles && !cpu.halted() {
        println!();
        println!(
            "Reached the cycle limit ({}). Use --max-cycles to raise it.",
            max_cycles
        );
    }

    if let Some(path) = state_json {
        match serde_json::to_string_pretty(&cpu) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    eprintln!("could not write {}: {}", path, e);
                    std::process::exit(1);
                }
                println!("State snapshot written to {}", path);
            }
            Err(e) => {
                eprintln!("could not serialize CPU state: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Width-aware disassembly listing of a whole image.
fn disassemble(words: &[u16], origin: u16) -> String {
    use r16::cpu::decode;

    let mut out = String::new();
    let mut idx = 0;

    while idx < words.len() {
        let ir = words[idx];
        let (opcode, _) = decode::split(ir);
        let operand = if decode::takes_operand_word(opcode) {
            words.get(idx + 1).copied().unwrap_or(0)
        } else {
            0
        };
        let instr = decode::decode(ir, operand);
        let addr = origin.wrapping_add(idx as u16);

        let raw = if instr.width() == 2 {
            format!("{:04x} {:04x}", ir, operand)
        } else {
            format!("{:04x}     ", ir)
        };
        out.push_str(&format!("{:04x}: {}  {}\n", addr, raw, instr));

        idx += instr.width() as usize;
    }

    out
}
