//! Prompt value object

use serde::{Deserialize, Serialize};

/// A prompt sent to every provider in one execution (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    content: String,
}

impl Prompt {
    /// Try to create a prompt, returning None if it is empty or only whitespace
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the prompt text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner text
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_creation() {
        let p = Prompt::try_new("Is the sky blue?").unwrap();
        assert_eq!(p.content(), "Is the sky blue?");
        assert_eq!(p.to_string(), "Is the sky blue?");
    }

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(Prompt::try_new("").is_none());
        assert!(Prompt::try_new(" \n\t ").is_none());
    }
}
