//! Interactive terminal prompts
//!
//! Everything that asks the user a question goes through [`Prompter`], so
//! credential gathering and zip selection can be driven by a script in tests.

use dialoguer::{Confirm, Input, Password, Select};

use crate::errors::{PromptError, PromptResult};

/// Asks the user questions
pub trait Prompter: Send + Sync {
    /// Free-text answer; empty answers are rejected
    fn input(&self, prompt: &str) -> PromptResult<String>;

    /// Free-text answer without echo; empty answers are rejected
    fn secret(&self, prompt: &str) -> PromptResult<String>;

    /// Index of the chosen item
    fn select(&self, prompt: &str, items: &[String]) -> PromptResult<usize>;

    fn confirm(&self, prompt: &str, default: bool) -> PromptResult<bool>;
}

/// Prompter backed by the controlling terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ensure_interactive(what: &str) -> PromptResult<()> {
        if atty::is(atty::Stream::Stdin) {
            Ok(())
        } else {
            Err(PromptError::NotInteractive {
                what: what.to_string(),
            })
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> PromptResult<String> {
        Self::ensure_interactive(prompt)?;
        let answer: String = Input::new().with_prompt(prompt).interact_text()?;
        non_empty(answer, prompt)
    }

    fn secret(&self, prompt: &str) -> PromptResult<String> {
        Self::ensure_interactive(prompt)?;
        let answer = Password::new().with_prompt(prompt).interact()?;
        non_empty(answer, prompt)
    }

    fn select(&self, prompt: &str, items: &[String]) -> PromptResult<usize> {
        Self::ensure_interactive(prompt)?;
        Ok(Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> PromptResult<bool> {
        Self::ensure_interactive(prompt)?;
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

fn non_empty(answer: String, what: &str) -> PromptResult<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        Err(PromptError::Empty {
            what: what.to_string(),
        })
    } else {
        Ok(trimmed.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Answer, ScriptedPrompter};
    use super::*;

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  abc \n".to_string(), "x").unwrap(), "abc");
        assert!(matches!(
            non_empty("   ".to_string(), "x"),
            Err(PromptError::Empty { .. })
        ));
    }

    #[test]
    fn test_scripted_prompter_records_questions() {
        let prompter = ScriptedPrompter::new(vec![Answer::Text("abc".to_string()), Answer::Yes]);

        assert_eq!(prompter.input("First?").unwrap(), "abc");
        assert!(prompter.confirm("Second?", false).unwrap());
        assert!(prompter.input("Third?").is_err());
        assert_eq!(prompter.asked(), vec!["First?", "Second?", "Third?"]);
    }
}
