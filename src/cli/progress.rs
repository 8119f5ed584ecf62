//! Spinner shown while the server processes the package
//!
//! Falls back to plain lines when stderr is not a terminal, so logs and
//! redirected output stay readable.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Tick interval of the spinner animation
const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Spinner with a success marker
#[derive(Debug)]
pub struct ProcessingSpinner {
    bar: ProgressBar,
    is_terminal: bool,
}

impl ProcessingSpinner {
    /// Start a spinner showing `message`
    pub fn start(message: &str) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);
        Self::with_terminal(message, is_terminal)
    }

    fn with_terminal(message: &str, is_terminal: bool) -> Self {
        let bar = if is_terminal {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["◐", "◓", "◑", "◒", "●"]),
            );
            bar.enable_steady_tick(TICK_INTERVAL);
            bar
        } else {
            eprintln!("{}", message);
            ProgressBar::hidden()
        };
        bar.set_message(message.to_string());

        Self { bar, is_terminal }
    }

    /// Replace the spinner with a success line
    pub fn succeed(self, message: &str) {
        self.bar.finish_and_clear();
        println!("{} {}", "✔".green(), message);
    }

    /// Remove the spinner without a marker
    pub fn stop(self) {
        self.bar.finish_and_clear();
    }

    /// Whether the spinner is animated
    pub fn is_animated(&self) -> bool {
        self.is_terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner_outside_terminal() {
        let spinner =
            ProcessingSpinner::with_terminal("The extension package is being processed...", false);
        assert!(!spinner.is_animated());
        assert!(spinner.bar.is_hidden());
        spinner.succeed("The extension package was successfully processed.");
    }

    #[test]
    fn test_stop_clears_spinner() {
        let spinner = ProcessingSpinner::with_terminal("Working", false);
        let bar = spinner.bar.clone();
        spinner.stop();
        assert!(bar.is_finished());
    }
}
