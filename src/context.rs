use crate::traits::{InquireUserInput, Output, TerminalOutput, UserInput};
#[cfg(test)]
use crate::traits::{MockOutput, MockUserInput};
use std::sync::Arc;

/// Application context that holds the terminal-facing dependencies
pub struct Context {
    pub input: Arc<dyn UserInput>,
    pub output: Arc<dyn Output>,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new() -> Self {
        Self {
            input: Arc::new(InquireUserInput),
            output: Arc::new(TerminalOutput),
        }
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(input: Arc<MockUserInput>, output: Arc<MockOutput>) -> Self {
        Self { input, output }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            input: Arc::clone(&self.input),
            output: Arc::clone(&self.output),
        }
    }
}
