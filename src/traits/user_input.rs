use anyhow::Result;
#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

/// Trait for user input operations to enable testing with mocks
pub trait UserInput: Send + Sync {
    /// Display a confirmation prompt (yes/no)
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Real user input implementation using inquire crate
pub struct InquireUserInput;

impl UserInput for InquireUserInput {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        use inquire::Confirm;
        let answer = Confirm::new(prompt).with_default(default).prompt()?;
        Ok(answer)
    }
}

/// Mock user input answering confirmations from a queue
#[cfg(test)]
pub struct MockUserInput {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockUserInput {
    /// Create mock with no pre-configured answers
    pub fn new() -> Self {
        Self::with_answers(Vec::new())
    }

    /// Create mock with pre-configured answers
    pub fn with_answers(answers: Vec<bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl UserInput for MockUserInput {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No more mock responses available"))
    }
}
