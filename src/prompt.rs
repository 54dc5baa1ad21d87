//! Interactive correction boundary.
//!
//! Extraction code never calls `stdin` directly; when OCR output is too
//! ambiguous to use, it asks a [`Resolver`] for the value. The CLI installs
//! a blocking console prompt, tests install scripted answers, and headless
//! runs can install a default-answer policy.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

/// A blocking prompt-for-string interface used when automatic extraction
/// cannot resolve a value on its own.
pub trait Resolver {
    /// Asks for a value. `prompt` is shown to the user; `context` names the
    /// extraction step for logging.
    fn resolve(&self, prompt: &str, context: &str) -> Result<String>;
}

/// Console resolver: prints the prompt and blocks on one line of stdin.
pub struct ConsoleResolver;

impl Resolver for ConsoleResolver {
    fn resolve(&self, prompt: &str, context: &str) -> Result<String> {
        log::info!("Manual input requested ({})", context);
        print!("{} ", prompt);
        io::stdout().flush().context("Failed to flush stdout")?;
        let mut answer = String::new();
        io::stdin()
            .read_line(&mut answer)
            .context("Failed to read manual input")?;
        Ok(answer.trim().to_string())
    }
}

/// Scripted resolver for tests and replays: answers are consumed in order.
/// Runs out of answers → error, so a test that prompts more than expected
/// fails loudly instead of hanging.
pub struct ScriptedResolver {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedResolver {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of unconsumed answers.
    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }
}

impl Resolver for ScriptedResolver {
    fn resolve(&self, prompt: &str, context: &str) -> Result<String> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .with_context(|| format!("No scripted answer left for '{}' ({})", prompt, context))
    }
}

/// Headless resolver: always answers with a fixed default and logs the
/// prompt it swallowed.
pub struct DefaultResolver {
    default: String,
}

impl DefaultResolver {
    pub fn new(default: impl Into<String>) -> Self {
        Self { default: default.into() }
    }
}

impl Resolver for DefaultResolver {
    fn resolve(&self, prompt: &str, context: &str) -> Result<String> {
        log::warn!(
            "Unattended run, answering '{}' to prompt '{}' ({})",
            self.default, prompt, context
        );
        Ok(self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_resolver_in_order() {
        let resolver = ScriptedResolver::new(["Jett", "Ascent"]);
        assert_eq!(resolver.resolve("agent?", "test").unwrap(), "Jett");
        assert_eq!(resolver.resolve("map?", "test").unwrap(), "Ascent");
        assert_eq!(resolver.remaining(), 0);
    }

    #[test]
    fn test_scripted_resolver_exhausted_errors() {
        let resolver = ScriptedResolver::new(Vec::<String>::new());
        assert!(resolver.resolve("agent?", "test").is_err());
    }

    #[test]
    fn test_default_resolver() {
        let resolver = DefaultResolver::new("unknown");
        assert_eq!(resolver.resolve("anything?", "test").unwrap(), "unknown");
    }
}
