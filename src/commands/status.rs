use super::ReportFormat;
use crate::api::ApiClient;
use crate::context::Context;
use crate::reconcile::Reconciler;
use crate::resources::catalog;
use anyhow::{Context as _, Result};

/// Handles the 'status' command - checks what exists without changing anything
pub struct StatusCommand;

impl StatusCommand {
    pub fn execute(ctx: &Context, client: &dyn ApiClient, format: ReportFormat) -> Result<()> {
        let plan = catalog::launch_plan().context("Failed to build the launch plan")?;
        let run = Reconciler::new(client).preview(&plan);
        let report = run.report();

        match format {
            ReportFormat::Text => report.render(ctx.output.as_ref()),
            ReportFormat::Json => ctx
                .output
                .plain(&report.to_json().context("Failed to serialize report")?),
        }

        Ok(())
    }
}
