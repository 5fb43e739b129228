//! Executes parsed scripts against a [`RegisterFile`].
//!
//! Each command runs to completion through a [`Requester`] before the next
//! one starts. Handshakes are forwarded to the `log` facade.

use std::fmt;

use regfile_core::{
    LogTraceSink, RegisterFile, RegisterMap, RegisterTable, Requester, ResponseStatus,
};

use crate::script::{Command, RegisterRef, ScriptLine};

/// Outcome of one script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// 1-indexed script line.
    pub line: usize,
    /// Executed command.
    pub command: Command,
    /// Whether every expectation held.
    pub passed: bool,
    /// What was observed.
    pub detail: String,
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed { "PASS" } else { "FAIL" };
        write!(
            f,
            "{verdict} line {}: {} ({})",
            self.line, self.command, self.detail
        )
    }
}

/// Pass and fail counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands whose expectations held.
    pub passed: usize,
    /// Commands with a failed expectation.
    pub failed: usize,
    /// Total commands executed.
    pub total: usize,
    /// Steps simulated.
    pub steps: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed (total: {}, steps: {})",
            self.passed, self.failed, self.total, self.steps
        )
    }
}

/// Result of a complete script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Per-command results in script order.
    pub results: Vec<CommandResult>,
    /// Steps simulated.
    pub steps: u64,
}

impl RunReport {
    /// Returns `true` when every command passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|result| result.passed)
    }

    /// Counts passes and failures.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let passed = self.results.iter().filter(|result| result.passed).count();
        RunSummary {
            passed,
            failed: self.results.len() - passed,
            total: self.results.len(),
            steps: self.steps,
        }
    }
}

/// Responder plus the names it was built from.
#[derive(Debug, Clone)]
pub struct Simulation {
    map: RegisterMap,
    file: RegisterFile,
}

impl Simulation {
    /// Creates a responder in reset state.
    #[must_use]
    pub fn new(map: RegisterMap, table: RegisterTable) -> Self {
        Self {
            map,
            file: RegisterFile::new(table),
        }
    }

    /// Responder being driven.
    #[must_use]
    pub const fn file(&self) -> &RegisterFile {
        &self.file
    }

    /// Runs every line in order. Failed expectations do not stop the run.
    pub fn run(&mut self, script: &[ScriptLine]) -> RunReport {
        let results = script
            .iter()
            .map(|line| {
                let outcome = self.execute(&line.command);
                let (passed, detail) = match outcome {
                    Ok(detail) => (true, detail),
                    Err(detail) => (false, detail),
                };
                let result = CommandResult {
                    line: line.line,
                    command: line.command.clone(),
                    passed,
                    detail,
                };
                if passed {
                    log::debug!("{result}");
                } else {
                    log::warn!("{result}");
                }
                result
            })
            .collect();

        RunReport {
            results,
            steps: self.file.steps(),
        }
    }

    fn address_of(&self, target: &RegisterRef) -> Result<u32, String> {
        match target {
            RegisterRef::Address(address) => Ok(*address),
            RegisterRef::Name(name) => self
                .map
                .index_of(name)
                .map(|index| self.map.registers[index].address)
                .ok_or_else(|| format!("unknown register '{name}'")),
        }
    }

    fn index_of(&self, target: &RegisterRef) -> Result<usize, String> {
        match target {
            RegisterRef::Address(address) => self
                .file
                .table()
                .decode(*address)
                .index()
                .ok_or_else(|| format!("no register at {address:#010x}")),
            RegisterRef::Name(name) => self
                .map
                .index_of(name)
                .ok_or_else(|| format!("unknown register '{name}'")),
        }
    }

    /// Executes one command; `Err` carries the failure detail.
    fn execute(&mut self, command: &Command) -> Result<String, String> {
        match command {
            Command::Write {
                target,
                value,
                status,
            } => {
                let address = self.address_of(target)?;
                let mut sink = LogTraceSink;
                let outcome = Requester::new(&mut self.file)
                    .with_trace(&mut sink)
                    .write(address, *value)
                    .map_err(|error| error.to_string())?;
                let detail = format!("resp={:?}, {} steps", outcome.status, outcome.steps);
                check_status(*status, outcome.status, detail)
            }
            Command::Read {
                target,
                status,
                value,
            } => {
                let address = self.address_of(target)?;
                let mut sink = LogTraceSink;
                let outcome = Requester::new(&mut self.file)
                    .with_trace(&mut sink)
                    .read(address)
                    .map_err(|error| error.to_string())?;
                let detail = format!(
                    "data={:#010x} resp={:?}, {} steps",
                    outcome.data, outcome.status, outcome.steps
                );
                let expected_status = status.or_else(|| value.map(|_| ResponseStatus::Okay));
                let detail = check_status(expected_status, outcome.status, detail)?;
                match value {
                    Some(expected) if *expected != outcome.data => {
                        Err(format!("expected data {expected:#010x}, got {detail}"))
                    }
                    _ => Ok(detail),
                }
            }
            Command::Drive { target, value } => {
                let index = self.index_of(target)?;
                self.file
                    .set_fabric_input(index, *value)
                    .map_err(|error| error.to_string())?;
                Ok(format!("fabric[{index}]={value:#010x}"))
            }
            Command::Idle { steps } => {
                Requester::new(&mut self.file).idle(*steps);
                Ok(format!("{steps} steps"))
            }
            Command::Expect { target, value } => {
                let index = self.index_of(target)?;
                let actual = self
                    .file
                    .register_output(index)
                    .ok_or_else(|| format!("no register output {index}"))?;
                let detail = format!("output[{index}]={actual:#010x}");
                if actual == *value {
                    Ok(detail)
                } else {
                    Err(format!("expected {value:#010x}, got {detail}"))
                }
            }
        }
    }
}

fn check_status(
    expected: Option<ResponseStatus>,
    actual: ResponseStatus,
    detail: String,
) -> Result<String, String> {
    match expected {
        Some(expected) if expected != actual => {
            Err(format!("expected resp={expected:?}, got {detail}"))
        }
        _ => Ok(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::Simulation;
    use crate::map::parse_map;
    use crate::script::parse_script;

    const MAP: &str = r#"{
        "registers": [
            { "name": "ctrl", "address": 0, "mode": "read_write" },
            { "name": "kick", "address": 4, "mode": "write_only_pulse" },
            { "name": "irq", "address": 8, "mode": "read_only_fabric_value", "default": 3 }
        ]
    }"#;

    fn simulation() -> Simulation {
        let map = parse_map(MAP).expect("valid map json");
        let table = map.build().expect("valid table");
        Simulation::new(map, table)
    }

    fn run(script: &str) -> super::RunReport {
        let script = parse_script(script).expect("script should parse");
        simulation().run(&script)
    }

    #[test]
    fn passing_script() {
        let report = run("\
write kick 7 => okay
expect kick == 0
read 0x20 => slverr
write ctrl 5
read ctrl == 5
read irq == 3
drive irq 9
read 8 => okay == 9
idle 2
");
        assert!(report.all_passed(), "{:#?}", report.results);
        let summary = report.summary();
        assert_eq!(summary.total, 9);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.steps, 3 + 2 + 3 + 2 + 2 + 2 + 2);
    }

    #[test]
    fn failed_expectations_do_not_stop_the_run() {
        let report = run("\
read ctrl == 1
write irq 1 => okay
read kick
expect ctrl == 0
");
        let verdicts: Vec<_> = report.results.iter().map(|result| result.passed).collect();
        assert_eq!(verdicts, vec![false, false, true, true]);
        assert!(report.results[0].detail.starts_with("expected data 0x00000001"));
        assert!(report.results[1].detail.starts_with("expected resp=Okay"));
    }

    #[test]
    fn value_expectation_implies_okay() {
        let report = run("read kick == 0\n");
        assert!(!report.all_passed());
    }

    #[test]
    fn unresolved_targets_fail() {
        let report = run("write nope 1\ndrive ctrl 1\nexpect 0x40 == 0\n");
        assert!(report.results.iter().all(|result| !result.passed));
        assert!(report.results[0].detail.contains("unknown register 'nope'"));
        assert!(report.results[1].detail.contains("does not read a fabric value"));
        assert!(report.results[2].detail.contains("no register at 0x00000040"));
    }

    #[test]
    fn result_lines_show_verdict_and_source_line() {
        let report = run("\n\nidle 1\n");
        assert_eq!(report.results[0].to_string(), "PASS line 3: idle 1 (1 steps)");
    }
}
