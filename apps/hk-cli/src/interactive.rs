//! Console prompts for the `pipe` command.

use crate::error::CliResult;
use std::io::{BufRead, Write};

/// One set of pipe parameters in US customary units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeQuery {
    pub diameter_in: f64,
    pub roughness_microinch: f64,
    pub flow_gpm: f64,
}

/// Ask until a finite number is entered. `None` on end of input.
pub fn prompt_number<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> CliResult<Option<f64>> {
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => return Ok(Some(v)),
            _ => writeln!(out, "Invalid input. Please enter a numerical value.")?,
        }
    }
}

pub fn read_query<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> CliResult<Option<PipeQuery>> {
    writeln!(out, "\n--- Enter Pipe Parameters ---")?;
    let Some(diameter_in) = prompt_number(input, out, "Pipe diameter (in): ")? else {
        return Ok(None);
    };
    let Some(roughness_microinch) = prompt_number(input, out, "Pipe roughness (micro-inches): ")?
    else {
        return Ok(None);
    };
    let Some(flow_gpm) = prompt_number(input, out, "Flow rate (gpm): ")? else {
        return Ok(None);
    };
    Ok(Some(PipeQuery {
        diameter_in,
        roughness_microinch,
        flow_gpm,
    }))
}

/// Anything but `y`/`yes` ends the session.
pub fn ask_again<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> CliResult<bool> {
    write!(out, "\nEnter another set? (y/n): ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Prompt, evaluate and report until the user stops. Evaluation errors are
/// reported and the session carries on. Returns the number of sets entered.
pub fn run_session<R, W, F>(input: &mut R, out: &mut W, mut evaluate: F) -> CliResult<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&PipeQuery) -> CliResult<String>,
{
    let mut count = 0;
    while let Some(query) = read_query(input, out)? {
        count += 1;
        match evaluate(&query) {
            Ok(report) => writeln!(out, "\n{report}")?,
            Err(e) => writeln!(out, "\nError: {e}")?,
        }
        if !ask_again(input, out)? {
            break;
        }
    }
    writeln!(out, "Exiting.")?;
    Ok(count)
}
