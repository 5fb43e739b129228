//! CLI entry point for the register-file simulator binary.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use log as _;
use regfile_core as _;
use regfile_sim::{describe_table, load_map, load_script, SimError, Simulation};
use serde_json as _;
use thiserror as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: regfile-sim <command> [options]

Commands:
  check <map.json>                      Validate a register map and list it
  run   <map.json> <script> [--verbose] Run a transaction script

Options:
  -v, --verbose  Log every handshake (RUST_LOG overrides)
  -h, --help     Show this help message

Examples:
  regfile-sim check regs.json
  regfile-sim run regs.json smoke.txt -v
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Check(CheckArgs),
    Run(RunArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    map: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    map: PathBuf,
    script: PathBuf,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut map: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if map.is_some() {
            return Err("multiple map paths provided".to_string());
        }
        map = Some(PathBuf::from(arg));
    }

    let map = map.ok_or_else(|| "missing map path".to_string())?;
    Ok(CheckArgs { map })
}

fn parse_run_args(args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut verbose = false;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        positional.push(PathBuf::from(arg));
    }

    let mut positional = positional.into_iter();
    let map = positional
        .next()
        .ok_or_else(|| "missing map path".to_string())?;
    let script = positional
        .next()
        .ok_or_else(|| "missing script path".to_string())?;
    if positional.next().is_some() {
        return Err("too many paths provided".to_string());
    }

    Ok(RunArgs {
        map,
        script,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn report_error(error: &SimError) {
    eprintln!("error: {error}");
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    let (map, table) = load_map(&args.map).map_err(|e| {
        report_error(&e);
        1
    })?;

    for line in describe_table(&map, &table) {
        println!("{line}");
    }
    println!("{}: {} registers OK", args.map.display(), table.len());
    Ok(())
}

fn run_script(args: &RunArgs) -> Result<(), i32> {
    let (map, table) = load_map(&args.map).map_err(|e| {
        report_error(&e);
        1
    })?;
    let script = load_script(&args.script).map_err(|e| {
        report_error(&e);
        1
    })?;

    let mut simulation = Simulation::new(map, table);
    let report = simulation.run(&script);

    for result in &report.results {
        println!("{result}");
    }

    println!();
    println!("Run Summary: {}", report.summary());

    if report.all_passed() {
        Ok(())
    } else {
        Err(1)
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Check(args))) => {
            init_logging(false);
            match run_check(&args) {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Ok(ParseResult::Command(Command::Run(args))) => {
            init_logging(args.verbose);
            match run_script(&args) {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_check_command() {
        let result = parse_args(os(&["check", "regs.json"]).into_iter())
            .expect("valid check args should parse");
        assert!(matches!(
            result,
            ParseResult::Command(Command::Check(CheckArgs { map })) if map == PathBuf::from("regs.json")
        ));
    }

    #[test]
    fn parses_run_command() {
        let result = parse_run_args(os(&["regs.json", "-v", "smoke.txt"]).into_iter())
            .expect("valid run args should parse");

        assert_eq!(
            result,
            RunArgs {
                map: PathBuf::from("regs.json"),
                script: PathBuf::from("smoke.txt"),
                verbose: true,
            }
        );
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os(&["--help"]).into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args(os(&["simulate"]).into_iter())
            .expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn run_requires_both_paths() {
        let error = parse_run_args(os(&["regs.json"]).into_iter())
            .expect_err("missing script should fail");
        assert!(error.contains("missing script path"));

        let error = parse_run_args(os(&["a", "b", "c"]).into_iter())
            .expect_err("extra path should fail");
        assert!(error.contains("too many paths"));
    }

    #[test]
    fn check_rejects_options() {
        let error = parse_check_args(os(&["--verbose"]).into_iter())
            .expect_err("check should reject options");
        assert!(error.contains("unknown option"));
    }

    #[test]
    fn subcommand_help_returns_usage() {
        let error = parse_check_args(os(&["-h"]).into_iter()).expect_err("help short-circuits");
        assert!(error.starts_with("Usage:"));
    }
}
