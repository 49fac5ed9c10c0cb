use eyre::{Result, eyre};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

pub fn read_line(prompt: &str) -> Result<String> {
    let mut rl = Reedline::create();
    match rl.read_line(&DefaultPrompt::new(
        DefaultPromptSegment::Basic(prompt.to_owned()),
        DefaultPromptSegment::Empty,
    ))? {
        Signal::Success(x) => Ok(x),
        _ => Err(eyre!("Cancelled")),
    }
}

/// Case sensitive, surrounding whitespace is not trimmed
pub fn confirm(prompt: &str, expected: &str) -> Result<bool> {
    Ok(read_line(prompt)? == expected)
}
