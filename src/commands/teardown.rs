use super::ReportFormat;
use crate::api::ApiClient;
use crate::context::Context;
use crate::reconcile::TeardownCoordinator;
use crate::resources::catalog;
use anyhow::{Context as _, Result};

/// Handles the 'teardown' command - deletes the launch resources
pub struct TeardownCommand;

impl TeardownCommand {
    /// Execute the teardown command.
    ///
    /// Individual delete failures are reported but do not make the command fail.
    pub fn execute(
        ctx: &Context,
        client: &dyn ApiClient,
        assume_yes: bool,
        format: ReportFormat,
    ) -> Result<()> {
        let plan = catalog::launch_plan().context("Failed to build the launch plan")?;
        let targets = plan.teardown_targets();

        if !assume_yes {
            let confirmed = ctx.input.confirm(
                &format!(
                    "Delete {} provisioned resources (campaign '{}' and everything it uses)?",
                    targets.len(),
                    catalog::CAMPAIGN_NAME
                ),
                false,
            )?;
            if !confirmed {
                ctx.output.info("Teardown cancelled");
                return Ok(());
            }
        }

        let report = TeardownCoordinator::new(client).teardown(&targets);

        match format {
            ReportFormat::Text => {
                report.render(ctx.output.as_ref());
                if report.has_failures() {
                    ctx.output
                        .warning("Some resources could not be removed; see the errors above");
                } else {
                    ctx.output.success("Teardown complete");
                }
            }
            ReportFormat::Json => ctx
                .output
                .plain(&report.to_json().context("Failed to serialize report")?),
        }

        Ok(())
    }
}
