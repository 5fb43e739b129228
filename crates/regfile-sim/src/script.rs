//! Parsing for transaction scripts.
//!
//! One command per line:
//!
//! - `write <reg> <value> [=> okay|slverr]`
//! - `read <reg> [=> okay|slverr] [== <value>]`
//! - `drive <reg> <value>` sets a fabric input
//! - `idle <steps>`
//! - `expect <reg> == <value>` checks a register output
//!
//! `<reg>` is a register name or a numeric address. Literals are decimal,
//! `0x` hex or `0b` binary. `;` starts a comment.

use std::fmt;
use std::fs;
use std::path::Path;

use regfile_core::ResponseStatus;
use thiserror::Error;

use crate::SimError;

/// Register selected by name or by bus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterRef {
    /// Name from the register map.
    Name(String),
    /// Bus address.
    Address(u32),
}

impl fmt::Display for RegisterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Address(address) => write!(f, "{address:#x}"),
        }
    }
}

/// A parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write transaction.
    Write {
        /// Target register.
        target: RegisterRef,
        /// Data to write.
        value: u32,
        /// Expected response status, any status passes when absent.
        status: Option<ResponseStatus>,
    },
    /// Read transaction.
    Read {
        /// Target register.
        target: RegisterRef,
        /// Expected response status.
        status: Option<ResponseStatus>,
        /// Expected data. Implies `OKAY` unless a status is given.
        value: Option<u32>,
    },
    /// Drive a fabric input.
    Drive {
        /// Fabric-value register.
        target: RegisterRef,
        /// Value to drive.
        value: u32,
    },
    /// Step with every requester signal low.
    Idle {
        /// Number of steps.
        steps: u32,
    },
    /// Check a register output.
    Expect {
        /// Register whose output is checked.
        target: RegisterRef,
        /// Expected output value.
        value: u32,
    },
}

fn status_keyword(status: ResponseStatus) -> &'static str {
    match status {
        ResponseStatus::Okay => "okay",
        ResponseStatus::SlvErr => "slverr",
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write {
                target,
                value,
                status,
            } => {
                write!(f, "write {target} {value:#x}")?;
                if let Some(status) = status {
                    write!(f, " => {}", status_keyword(*status))?;
                }
                Ok(())
            }
            Self::Read {
                target,
                status,
                value,
            } => {
                write!(f, "read {target}")?;
                if let Some(status) = status {
                    write!(f, " => {}", status_keyword(*status))?;
                }
                if let Some(value) = value {
                    write!(f, " == {value:#x}")?;
                }
                Ok(())
            }
            Self::Drive { target, value } => write!(f, "drive {target} {value:#x}"),
            Self::Idle { steps } => write!(f, "idle {steps}"),
            Self::Expect { target, value } => write!(f, "expect {target} == {value:#x}"),
        }
    }
}

/// A command with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-indexed line number.
    pub line: usize,
    /// Parsed command.
    pub command: Command,
}

/// Syntax error in a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message} (in '{text}')")]
pub struct ScriptError {
    /// 1-indexed line number.
    pub line: usize,
    /// Offending text with the comment stripped.
    pub text: String,
    /// Description of the problem.
    pub message: String,
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns the first [`ScriptError`] encountered.
pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let stripped = strip_comment(raw).trim();
        if stripped.is_empty() {
            continue;
        }

        let command = parse_command(stripped).map_err(|message| ScriptError {
            line: idx + 1,
            text: stripped.to_string(),
            message,
        })?;
        lines.push(ScriptLine {
            line: idx + 1,
            command,
        });
    }

    Ok(lines)
}

/// Reads and parses a script file.
///
/// # Errors
///
/// Returns [`SimError::Io`] when the file cannot be read and
/// [`SimError::Script`] for syntax errors.
pub fn load_script(path: &Path) -> Result<Vec<ScriptLine>, SimError> {
    let content = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_script(&content)?)
}

fn strip_comment(line: &str) -> &str {
    line.find(';').map_or(line, |pos| &line[..pos])
}

fn parse_command(text: &str) -> Result<Command, String> {
    let mut tokens = text.split_whitespace();
    let keyword = tokens
        .next()
        .ok_or_else(|| "expected a command".to_string())?;
    let rest: Vec<&str> = tokens.collect();

    match keyword.to_ascii_lowercase().as_str() {
        "write" => parse_write(&rest),
        "read" => parse_read(&rest),
        "drive" => match rest.as_slice() {
            [target, value] => Ok(Command::Drive {
                target: parse_register_ref(target)?,
                value: parse_u32(value)?,
            }),
            _ => Err("expected 'drive <reg> <value>'".to_string()),
        },
        "idle" => match rest.as_slice() {
            [steps] => Ok(Command::Idle {
                steps: parse_u32(steps)?,
            }),
            _ => Err("expected 'idle <steps>'".to_string()),
        },
        "expect" => match rest.as_slice() {
            [target, "==", value] => Ok(Command::Expect {
                target: parse_register_ref(target)?,
                value: parse_u32(value)?,
            }),
            _ => Err("expected 'expect <reg> == <value>'".to_string()),
        },
        other => Err(format!("unknown command '{other}'")),
    }
}

fn parse_write(tokens: &[&str]) -> Result<Command, String> {
    let (target, value, tail) = match tokens {
        [target, value, tail @ ..] => (target, value, tail),
        _ => return Err("expected 'write <reg> <value>'".to_string()),
    };
    let status = match tail {
        [] => None,
        ["=>", status] => Some(parse_status(status)?),
        _ => return Err("expected '=> okay' or '=> slverr' after the value".to_string()),
    };

    Ok(Command::Write {
        target: parse_register_ref(target)?,
        value: parse_u32(value)?,
        status,
    })
}

fn parse_read(tokens: &[&str]) -> Result<Command, String> {
    let (target, mut tail) = match tokens {
        [target, tail @ ..] => (parse_register_ref(target)?, tail),
        [] => return Err("expected 'read <reg>'".to_string()),
    };

    let mut status = None;
    let mut value = None;
    while let [operator, operand, remaining @ ..] = tail {
        match *operator {
            "=>" if status.is_none() && value.is_none() => {
                status = Some(parse_status(operand)?);
            }
            "==" if value.is_none() => value = Some(parse_u32(operand)?),
            _ => return Err(format!("unexpected '{operator}'")),
        }
        tail = remaining;
    }
    if let [dangling] = tail {
        return Err(format!("missing operand after '{dangling}'"));
    }

    Ok(Command::Read {
        target,
        status,
        value,
    })
}

fn parse_status(text: &str) -> Result<ResponseStatus, String> {
    match text.to_ascii_lowercase().as_str() {
        "okay" | "ok" => Ok(ResponseStatus::Okay),
        "slverr" => Ok(ResponseStatus::SlvErr),
        _ => Err(format!("unknown response status '{text}'")),
    }
}

fn parse_register_ref(text: &str) -> Result<RegisterRef, String> {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        parse_u32(text).map(RegisterRef::Address)
    } else if text
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        Ok(RegisterRef::Name(text.to_string()))
    } else {
        Err(format!("invalid register '{text}'"))
    }
}

/// Parses an unsigned 32-bit value (decimal, hex, or binary).
fn parse_u32(text: &str) -> Result<u32, String> {
    let text = text.trim().replace('_', "");
    if text.is_empty() {
        return Err("expected a value".to_string());
    }

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex value '{text}'"))
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).map_err(|_| format!("invalid binary value '{text}'"))
    } else {
        text.parse::<u32>()
            .map_err(|_| format!("invalid decimal value '{text}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_script, parse_u32, Command, RegisterRef, ScriptError};
    use regfile_core::ResponseStatus;

    fn single(text: &str) -> Command {
        let mut lines = parse_script(text).expect("script should parse");
        assert_eq!(lines.len(), 1);
        lines.remove(0).command
    }

    #[test]
    fn parses_write_with_status() {
        assert_eq!(
            single("write ctrl 0x5 => okay"),
            Command::Write {
                target: RegisterRef::Name("ctrl".into()),
                value: 5,
                status: Some(ResponseStatus::Okay),
            }
        );
    }

    #[test]
    fn parses_read_with_status_and_value() {
        assert_eq!(
            single("read 0x8 => slverr"),
            Command::Read {
                target: RegisterRef::Address(8),
                status: Some(ResponseStatus::SlvErr),
                value: None,
            }
        );
        assert_eq!(
            single("READ status == 0b101"),
            Command::Read {
                target: RegisterRef::Name("status".into()),
                status: None,
                value: Some(5),
            }
        );
        assert_eq!(
            single("read id => okay == 0xC0DE"),
            Command::Read {
                target: RegisterRef::Name("id".into()),
                status: Some(ResponseStatus::Okay),
                value: Some(0xC0DE),
            }
        );
    }

    #[test]
    fn parses_side_band_commands() {
        assert_eq!(
            single("drive irq 1"),
            Command::Drive {
                target: RegisterRef::Name("irq".into()),
                value: 1,
            }
        );
        assert_eq!(single("idle 10"), Command::Idle { steps: 10 });
        assert_eq!(
            single("expect kick == 0"),
            Command::Expect {
                target: RegisterRef::Name("kick".into()),
                value: 0,
            }
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let lines = parse_script("; header\n\nidle 1 ; settle\n  \nidle 2\n")
            .expect("script should parse");
        let numbers: Vec<_> = lines.iter().map(|line| line.line).collect();
        assert_eq!(numbers, vec![3, 5]);
    }

    #[test]
    fn reports_line_of_first_error() {
        let error = parse_script("idle 1\nwrite ctrl\n").expect_err("should fail");
        assert_eq!(
            error,
            ScriptError {
                line: 2,
                text: "write ctrl".into(),
                message: "expected 'write <reg> <value>'".into(),
            }
        );
        assert!(error.to_string().starts_with("line 2:"));
    }

    #[test]
    fn rejects_malformed_reads() {
        assert!(parse_script("read ctrl ==").is_err());
        assert!(parse_script("read ctrl == 1 => okay").is_err());
        assert!(parse_script("read ctrl => maybe").is_err());
        assert!(parse_script("fetch ctrl").is_err());
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse_u32("42"), Ok(42));
        assert_eq!(parse_u32("0xFFFF_FFFF"), Ok(u32::MAX));
        assert_eq!(parse_u32("0b1010"), Ok(10));
        assert!(parse_u32("0x1_0000_0000").is_err());
        assert!(parse_u32("twelve").is_err());
    }

    #[test]
    fn display_round_trips_through_parser() {
        let text = "read 0x10 => slverr == 0x0";
        let command = single(text);
        assert_eq!(command.to_string(), text);
        assert_eq!(single(&command.to_string()), command);
    }
}
