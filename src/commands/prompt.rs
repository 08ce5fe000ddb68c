use anyhow::Result;
use dialoguer::Confirm;

/// Asks the user a yes/no question before a destructive step.
pub trait Prompt {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interactive terminal prompt. Anything but an explicit yes declines.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}
