use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::mode::RunMode;

/// Input-provider seam for the questions the supervisor asks the operator.
///
/// Implementations show `label` and return one line of input, so the state
/// machine can be driven by a scripted queue of answers in tests.
pub trait Prompt {
    fn read_line(&mut self, label: &str) -> io::Result<String>;
}

/// [`Prompt`] reading from the process's standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn read_line(&mut self, label: &str) -> io::Result<String> {
        print!("{label}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Ask for a run mode until the operator supplies a valid token.
pub fn ask_mode(prompt: &mut impl Prompt) -> io::Result<RunMode> {
    loop {
        let line = prompt.read_line("Run mode [lite/full/archive]: ")?;
        match RunMode::parse(&line) {
            Some(mode) => return Ok(mode),
            None => println!("Please answer lite, full or archive."),
        }
    }
}

/// Ask for a block-retention count; blank or invalid input falls back to
/// `default`.
pub fn ask_retention(prompt: &mut impl Prompt, default: u32) -> io::Result<u32> {
    let line = prompt.read_line(&format!("Blocks to retain [{default}]: "))?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    match trimmed.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => {
            warn!(input = trimmed, default, "not a positive block count, using default");
            Ok(default)
        }
    }
}

/// Yes/no confirmation; only an explicit `y`/`yes` counts as yes.
pub fn ask_confirm(prompt: &mut impl Prompt, question: &str) -> io::Result<bool> {
    let line = prompt.read_line(&format!("{question} [y/N]: "))?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Ask how many log lines to show; blank or invalid input falls back to
/// `default`.
pub fn ask_line_count(prompt: &mut impl Prompt, default: usize) -> io::Result<usize> {
    let line = prompt.read_line(&format!("Lines to show [{default}]: "))?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    match trimmed.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => {
            warn!(input = trimmed, default, "not a positive line count, using default");
            Ok(default)
        }
    }
}
