use env_logger::Env;
use mipsim_assembler::Assembler;
use mipsim_types::constants::{DATA_BASE, MEMORY_SIZE};
use mipsim_types::{Instruction, Memory};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::{fs, io};
use structopt::StructOpt;

#[derive(StructOpt)]
struct CliArgs {
    /// MIPS assembly source file
    #[structopt(parse(from_os_str))]
    source_file: PathBuf,

    /// Address the encoded text is loaded at
    #[structopt(long, default_value = "0", parse(try_from_str = parse_address))]
    base_address: u32,

    /// Base address of the data segment
    #[structopt(long, parse(try_from_str = parse_address))]
    data_base: Option<u32>,

    /// Size of the memory image in bytes
    #[structopt(long)]
    memory_size: Option<usize>,

    /// Write the raw text-segment bytes here instead of printing a listing
    #[structopt(long = "output", short = "o", parse(from_os_str))]
    output_file: Option<PathBuf>,
}

fn parse_address(s: &str) -> Result<u32, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
    let args = CliArgs::from_args();

    let source = fs::read_to_string(&args.source_file)?;
    let mut memory = Memory::new(args.memory_size.unwrap_or(MEMORY_SIZE));

    let mut assembler =
        Assembler::new(&mut memory).with_data_base(args.data_base.unwrap_or(DATA_BASE));
    let base = assembler.assemble(&source, args.base_address)?;
    let words = assembler.text_words();
    log::info!("assembled {} words at 0x{:08x}", words, base);

    match &args.output_file {
        Some(path) => {
            let mut bytes = Vec::with_capacity(4 * words);
            for offset in 0..4 * words as u32 {
                bytes.push(memory.read_byte(base + offset)?);
            }
            fs::write(path, &bytes)?;
            log::info!("wrote text segment to {}", path.display());
        }
        None => print_listing(&memory, base, words)?,
    }

    Ok(())
}

/// Print one line per encoded word: address, raw word, and disassembly.
fn print_listing(memory: &Memory, base: u32, words: usize) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for index in 0..words {
        let address = base + 4 * index as u32;
        let word = u32::from_le_bytes([
            memory.read_byte(address)?,
            memory.read_byte(address + 1)?,
            memory.read_byte(address + 2)?,
            memory.read_byte(address + 3)?,
        ]);
        writeln!(
            out,
            "0x{:08x}  {:08x}  {}",
            address,
            word,
            Instruction(word)
        )?;
    }

    Ok(())
}
