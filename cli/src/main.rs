#[macro_use]
extern crate clap;

use clap::{Arg, ArgGroup};
use mos6502::{AudioSink, Bus, ConsolePeripherals, Framebuffer, InputSource, LogSink, OutputSink};
use mos6502::{Processor, Scheduler, TickOutcome};
use std::fmt;
use std::fs;

#[derive(Debug)]
enum Error {
    Io(std::io::Error),
    Assemble(mos6502_asm::Error),
    Clap(clap::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{}", e),
            Error::Assemble(e) => write!(f, "{}", e),
            Error::Clap(e) => write!(f, "{}", e),
        }
    }
}

fn main() -> Result<(), Error> {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("Raw binary memory image, loaded starting at address 0x0000")
                .index(1),
        )
        .arg(
            Arg::with_name("assembly")
                .short("a")
                .long("assembly")
                .takes_value(true)
                .value_name("ASSEMBLY")
                .help("Assembles a 6502 assembly source file and runs the result"),
        )
        .arg(
            Arg::with_name("steps")
                .short("s")
                .long("steps-per-tick")
                .takes_value(true)
                .value_name("STEPS")
                .default_value("1000000")
                .help("Instructions executed per scheduler tick"),
        )
        .group(
            ArgGroup::with_name("input")
                .args(&["PROGRAM", "assembly"])
                .required(true),
        )
        .get_matches();

    let steps_per_tick = value_t!(matches.value_of("steps"), u32).map_err(Error::Clap)?;

    let bus = Bus::new(
        ConsolePeripherals,
        ConsolePeripherals,
        ConsolePeripherals,
        ConsolePeripherals,
    );
    let mut processor = Processor::new(bus);

    if let Some(assembly_path) = matches.value_of("assembly") {
        let source = fs::read_to_string(assembly_path).map_err(Error::Io)?;
        match mos6502_asm::assemble(&source) {
            Ok(assembled) => processor.bus.memory = assembled.memory,
            Err(err) => {
                let message = format!("{}", err);
                processor.bus.log.log_error(&message);
                processor.bus.audio.beep();
                eprintln!("{}", message);
                eprintln!("Could not assemble code.");
                std::process::exit(1);
            }
        }
    } else {
        let program_path = matches.value_of("PROGRAM").unwrap();
        let bytes = fs::read(program_path).map_err(Error::Io)?;
        for (offset, byte) in bytes.iter().enumerate() {
            processor.bus.write(offset as u16, *byte);
        }
    }

    processor.reset();

    let scheduler = Scheduler::new(steps_per_tick);
    let mut input = ConsolePeripherals;
    let outcome = scheduler.run_until_stopped(&mut processor, &mut input);

    print_state(&processor);

    match outcome {
        TickOutcome::Halted => println!("Halted."),
        TickOutcome::Suspended => println!("Suspended (WAI)."),
        TickOutcome::Cancelled => println!("Cancelled."),
        TickOutcome::BudgetExhausted => println!("Step budget exhausted without halting."),
        TickOutcome::Error(err) => {
            println!("Runtime error: {}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_state<F, A, O, L>(processor: &Processor<F, A, O, L>)
where
    F: Framebuffer,
    A: AudioSink,
    O: OutputSink,
    L: LogSink,
{
    let r = &processor.registers;
    println!(
        "A={:02X} X={:02X} Y={:02X} SP={:02X} PC={:04X} P={:02X} ({:?})",
        r.a,
        r.x,
        r.y,
        r.sp,
        r.pc,
        r.p.bits(),
        r.p
    );
}
