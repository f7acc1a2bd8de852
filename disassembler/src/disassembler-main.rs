#[macro_use]
extern crate log;

use std::fs;
use std::process::exit;

use clap::{Arg, App};
use log::LevelFilter;

use sim86::config::Config;
use sim86::cpu::Decoder;
use sim86::machine::{Machine, State};
use sim86::string::parse_number_string;

mod listing;

use crate::listing::{Snapshot, describe_changes, execution_line, final_registers};

const VERSION: &str = "0.1";

const DEFAULT_MAX_STEPS: usize = 100_000;

fn main() {
    let matches = App::new("sim86")
            .version(VERSION)
            .about("Disassembles or simulates raw 8086 machine code")
            .arg(Arg::with_name("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .index(1))
            .arg(Arg::with_name("exec")
                .long("exec")
                .help("Executes the program instead of disassembling it"))
            .arg(Arg::with_name("clocks")
                .long("clocks")
                .help("Shows estimated clocks for each executed instruction"))
            .arg(Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("Reads settings from a TOML file"))
            .arg(Arg::with_name("steps")
                .long("steps")
                .value_name("N")
                .takes_value(true)
                .help("Stops executing after N instructions"))
            .arg(Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"))
            .get_matches();

    let config = match matches.value_of("config") {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => match Config::from_toml_str(&s) {
                Ok(config) => config,
                Err(e) => fail(&e.to_string()),
            },
            Err(e) => fail(&format!("ERROR: could not read {}: {}", path, e)),
        },
        None => Config::default(),
    };

    let level = match (matches.occurrences_of("v"), config.trace) {
        (_, true) => LevelFilter::Trace,
        (0, _) => LevelFilter::Warn,
        (1, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    colog::default_builder().filter(None, level).init();

    let max_steps = match matches.value_of("steps") {
        Some(s) => match parse_number_string(s) {
            Some(n) => n as usize,
            None => fail(&format!("ERROR: invalid step count {}", s)),
        },
        None => DEFAULT_MAX_STEPS,
    };

    let filename = matches.value_of("INPUT").unwrap_or_default();
    let data = match fs::read(filename) {
        Ok(data) => data,
        Err(e) => fail(&format!("ERROR: could not read {}: {}", filename, e)),
    };

    let ok = if matches.is_present("exec") {
        let mut machine = match Machine::new(config) {
            Ok(machine) => machine,
            Err(e) => fail(&e.to_string()),
        };
        if let Err(e) = machine.load(&data) {
            fail(&e.to_string());
        }
        println!("--- {} execution ---", filename);
        simulate(&mut machine, matches.is_present("clocks"), max_steps)
    } else {
        disassemble(&data)
    };
    if !ok {
        exit(1);
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", msg);
    exit(1);
}

fn disassemble(data: &[u8]) -> bool {
    println!("bits 16");
    let decoder = Decoder::default();
    for op in decoder.decode_to_block(data, 0) {
        match op {
            Ok(info) => println!("{}", info.instruction),
            Err(e) => {
                println!(";;; {}", e);
                return false;
            }
        }
    }
    true
}

fn simulate(machine: &mut Machine, clocks: bool, max_steps: usize) -> bool {
    let mut steps = 0;
    while machine.state() != State::Halted {
        if steps == max_steps {
            warn!("stopped after {} instructions", steps);
            break;
        }
        steps += 1;

        let before = Snapshot::of(machine);
        let cycles = machine.cpu.cycle_count;
        let op = match machine.decode() {
            Ok(Some(op)) => op,
            Ok(None) => break,
            Err(e) => {
                println!(";;; {}", e);
                return false;
            }
        };
        if let Err(e) = machine.execute(&op) {
            println!("{} ;;; {}", op, e);
            return false;
        }

        let spent = if clocks {
            Some((machine.cpu.cycle_count - cycles, machine.cpu.cycle_count))
        } else {
            None
        };
        let changes = describe_changes(&before, &Snapshot::of(machine));
        println!("{}", execution_line(&op, &changes, spent));
    }

    println!();
    println!("{}", final_registers(&Snapshot::of(machine)));
    true
}
