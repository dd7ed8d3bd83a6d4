use env_logger::Env;
use mipsim_assembler::Assembler;
use mipsim_datapath::{Datapath, ProcessorError};
use mipsim_types::constants::{DATA_BASE, MEMORY_SIZE, REGISTER_NAMES};
use mipsim_types::Memory;
use std::cell::RefCell;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::fs;
use structopt::StructOpt;

#[derive(StructOpt)]
struct CliArgs {
    /// MIPS assembly source file to assemble and execute
    #[structopt(parse(from_os_str))]
    source_file: PathBuf,

    /// Number of clock ticks to run
    #[structopt(long, default_value = "16")]
    ticks: usize,

    /// Address the text is loaded at and execution starts from
    #[structopt(long, default_value = "0", parse(try_from_str = parse_address))]
    base_address: u32,

    /// Base address of the data segment
    #[structopt(long, parse(try_from_str = parse_address))]
    data_base: Option<u32>,

    /// Size of the memory image in bytes
    #[structopt(long)]
    memory_size: Option<usize>,

    /// Registers to print after every tick, e.g. --watch '$t0' '$v0'
    #[structopt(long)]
    watch: Vec<String>,
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
    run(&source, &args)?;

    Ok(())
}

fn run(source: &str, args: &CliArgs) -> Result<(), ProcessorError> {
    let mut memory = Memory::new(args.memory_size.unwrap_or(MEMORY_SIZE));

    let entry = Assembler::new(&mut memory)
        .with_data_base(args.data_base.unwrap_or(DATA_BASE))
        .assemble(source, args.base_address)?;

    let memory = Rc::new(RefCell::new(memory));
    let mut datapath = Datapath::new(memory, entry);

    for tick in 0..args.ticks {
        datapath.tick()?;

        for name in &args.watch {
            let value = datapath.register_by_name(name)?;
            println!("tick {:>4}: {} = 0x{:08x}", tick + 1, name, value);
        }
    }

    println!("pc = 0x{:08x}", datapath.pc());
    for (index, name) in REGISTER_NAMES.iter().enumerate() {
        print!("{:>5} = 0x{:08x}", name, datapath.register(index as u8));
        if index % 4 == 3 {
            println!();
        }
    }

    Ok(())
}
