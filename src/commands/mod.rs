pub mod apply;
pub mod config;
pub mod plan;
pub mod send_test_email;
pub mod status;
pub mod teardown;

pub use apply::ApplyCommand;
pub use config::ConfigCommand;
pub use plan::PlanCommand;
pub use send_test_email::SendTestEmailCommand;
pub use status::StatusCommand;
pub use teardown::TeardownCommand;

use clap::ValueEnum;

/// Rendering of a run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Rendering of the resource plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Text,
    Json,
    Yaml,
}
