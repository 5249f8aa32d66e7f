//! tripwire-replay: run a trigger-device scenario and print its event log.
//!
//! Usage:
//!   tripwire-replay run scenarios/corridor.json --duration 8 -v
//!   tripwire-replay check scenarios/corridor.json

mod logging;
mod scenario;

use std::io::Write;
use std::path::PathBuf;
use std::process;

use scenario::{Scenario, ScenarioError};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    logging::init_logging(parse_verbosity(&args[2..]));

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "tripwire-replay: TRIPWIRE scenario runner\n\
         \n\
         Commands:\n\
         \n\
         run <scenario.json>    Run a scenario and print events as JSON lines\n\
         \n\
           --duration <secs>    Sim time to run (default: scenario's, else 10)\n\
           -v, -vv              Log at info / debug level (or set TRIPWIRE_LOG)\n\
         \n\
         check <scenario.json>  Load and validate a scenario without running it\n\
         \n\
         Examples:\n\
         \n\
           tripwire-replay run scenarios/corridor.json --duration 8\n\
           TRIPWIRE_LOG=tripwire_device=debug tripwire-replay run corridor.json\n"
    );
}

fn parse_verbosity(args: &[String]) -> u8 {
    args.iter()
        .map(|arg| match arg.as_str() {
            "-v" => 1,
            "-vv" => 2,
            "-vvv" => 3,
            _ => 0,
        })
        .fold(0u8, u8::saturating_add)
}

fn parse_duration(args: &[String]) -> Result<Option<f64>, String> {
    for i in 0..args.len() {
        if args[i] == "--duration" {
            let value = args
                .get(i + 1)
                .ok_or("--duration needs a value")?
                .parse::<f64>()
                .map_err(|e| format!("invalid --duration: {e}"))?;
            if !(value >= 0.0) {
                return Err(format!("--duration must be non-negative, got {value}"));
            }
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn scenario_path(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--duration" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with('-') {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn require_path(args: &[String]) -> PathBuf {
    match scenario_path(args) {
        Some(path) => path,
        None => {
            eprintln!("Error: <scenario.json> is required");
            print_usage();
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) -> Result<(), ScenarioError> {
    let path = require_path(args);
    let duration = match parse_duration(args) {
        Ok(duration) => duration,
        Err(msg) => {
            eprintln!("Error: {msg}");
            process::exit(1);
        }
    };

    let scenario = Scenario::load(&path)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    scenario.play(duration, |event| {
        let line = serde_json::to_string(event)?;
        writeln!(out, "{line}").map_err(|source| ScenarioError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })
    })?;
    Ok(())
}

// --- Check command ---

fn cmd_check(args: &[String]) -> Result<(), ScenarioError> {
    let path = require_path(args);
    let scenario = Scenario::load(&path)?;
    eprintln!(
        "{}: ok ({} boxes, {} surfaces, {} agents, {} devices, {} actions)",
        path.display(),
        scenario.boxes.len(),
        scenario.surfaces.len(),
        scenario.agents.len(),
        scenario.devices.len(),
        scenario.actions.len()
    );
    Ok(())
}
