//! Interactive step-count prompt

use std::io::{BufRead, Write};

use crate::error::{McError, Result};

/// Parse a step count; zero is a valid no-op run
pub fn parse_step_count(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    trimmed.parse::<u64>().map_err(|_| McError::StepCount {
        input: trimmed.to_string(),
    })
}

/// Ask for the number of Monte Carlo steps and read one line of input
pub fn prompt_step_count<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<u64> {
    writeln!(output, "How many tries do you want to do?")
        .and_then(|_| output.flush())
        .map_err(|e| McError::io("stdout", e))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| McError::io("stdin", e))?;
    parse_step_count(&line)
}
