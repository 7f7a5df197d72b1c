//! Branch trace records and the text trace format
//!
//! One record per line:
//!
//! ```text
//! B 0x00401a2c T 0x00401a00    # conditional branch, taken
//! B 0x00401a40 N 0x00401b00    # conditional branch, not taken
//! O 0x00401a44 load 0x00000000 # any other instruction
//! ```
//!
//! Blank lines and `#` comments are ignored.

use std::path::Path;
use std::str::FromStr;

use crate::error::SimulatorResult;
use crate::error::TraceError;

/// Class of a non conditional-branch instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpType {
    Alu,
    Load,
    Store,
    Jump,
    Call,
    Return,
    Other,
}

impl FromStr for OpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alu" => Ok(OpType::Alu),
            "load" => Ok(OpType::Load),
            "store" => Ok(OpType::Store),
            "jump" => Ok(OpType::Jump),
            "call" => Ok(OpType::Call),
            "ret" => Ok(OpType::Return),
            "other" => Ok(OpType::Other),
            _ => Err(format!(
                "Invalid instruction class: '{}'. \
                 Expected one of alu, load, store, jump, call, ret, other.",
                s
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceRecord {
    /// A resolved conditional branch
    Branch { pc: u32, taken: bool, target: u32 },
    /// Any other instruction
    Other { pc: u32, op_type: OpType, target: u32 },
}

fn parse_error(
    trace_path: &Path,
    line_num: usize,
    message: &str,
) -> TraceError {
    TraceError::ParseError(
        trace_path.into(),
        format!("{} at line {}", message, line_num + 1),
    )
}

fn parse_address(
    token: &str,
    trace_path: &Path,
    line_num: usize,
) -> SimulatorResult<u32> {
    let digits = token.strip_prefix("0x").ok_or_else(|| {
        parse_error(
            trace_path,
            line_num,
            "Invalid address format: expected hexadecimal starting with '0x'",
        )
    })?;

    let address = u32::from_str_radix(digits, 16).map_err(|_| {
        parse_error(trace_path, line_num, "Invalid hexadecimal address")
    })?;
    Ok(address)
}

/// Parse trace text read from `trace_path`
pub fn parse_records(
    content: &str,
    trace_path: &Path,
) -> SimulatorResult<Vec<TraceRecord>> {
    let mut records: Vec<TraceRecord> = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        // Strip comments and skip empty lines
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(parse_error(
                trace_path,
                line_num,
                "Invalid format: expected 'kind pc outcome target'",
            )
            .into());
        }

        let pc = parse_address(parts[1], trace_path, line_num)?;
        let target = parse_address(parts[3], trace_path, line_num)?;

        let record = match parts[0] {
            "B" => {
                let taken = match parts[2] {
                    "T" => true,
                    "N" => false,
                    other => {
                        return Err(parse_error(
                            trace_path,
                            line_num,
                            &format!(
                                "Invalid outcome '{}': expected 'T' or 'N'",
                                other
                            ),
                        )
                        .into())
                    }
                };
                TraceRecord::Branch { pc, taken, target }
            }
            "O" => {
                let op_type = parts[2].parse::<OpType>().map_err(|e| {
                    parse_error(trace_path, line_num, &e)
                })?;
                TraceRecord::Other {
                    pc,
                    op_type,
                    target,
                }
            }
            other => {
                return Err(parse_error(
                    trace_path,
                    line_num,
                    &format!(
                        "Invalid record kind '{}': expected 'B' or 'O'",
                        other
                    ),
                )
                .into())
            }
        };

        records.push(record);
    }

    Ok(records)
}

/// Fetch records from the trace file
pub fn fetch_records(trace_path: &str) -> SimulatorResult<Vec<TraceRecord>> {
    let path = Path::new(trace_path);
    let content = std::fs::read_to_string(path)
        .map_err(|e| TraceError::FileReadError(path.into(), e))?;
    parse_records(&content, path)
}
