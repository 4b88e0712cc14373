pub mod output;
pub mod user_input;

pub use output::{Output, TerminalOutput};
pub use user_input::{InquireUserInput, UserInput};

#[cfg(test)]
pub use output::{MockOutput, OutputMessage};
#[cfg(test)]
pub use user_input::MockUserInput;
