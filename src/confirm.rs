use colored::*;
use eyre::{Result, WrapErr, bail};
use std::io::{BufRead, IsTerminal, Write};

use crate::helpers;

/// Operator approval of a fully built transaction
pub trait Confirm {
    fn confirm(&mut self, description: &str) -> Result<bool>;
}

/// Interactive prompt, only a literal "y" confirms
///
/// The line editor needs a terminal, piped answers (`echo y | eth-deposit ..`)
/// are read straight from stdin.
#[derive(Debug, Default)]
pub struct Prompt;

impl Confirm for Prompt {
    fn confirm(&mut self, description: &str) -> Result<bool> {
        let prompt = format!(
            "\n{}\n\n{} {} {}\n",
            description,
            "Please type".green(),
            "y".red().bold(),
            "to confirm sending the transaction, anything else cancels.".green()
        );
        match std::io::stdin().is_terminal() {
            true => helpers::reedline::confirm(prompt.as_str(), "y"),
            false => {
                print!("{}", prompt);
                std::io::stdout().flush()?;
                Ok(read_answer(&mut std::io::stdin().lock())? == "y")
            }
        }
    }
}

/// Next line without its line terminator, EOF cancels
fn read_answer<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader
        .read_line(&mut line)
        .wrap_err("Failed to read confirmation")?
        == 0
    {
        bail!("Cancelled");
    }
    let answer = line.strip_suffix('\n').unwrap_or(&line);
    Ok(answer.strip_suffix('\r').unwrap_or(answer).to_string())
}

/// `--yes`, print the transaction and carry on
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, description: &str) -> Result<bool> {
        println!("{}", description);
        Ok(true)
    }
}
