use super::PlanFormat;
use crate::context::Context;
use crate::resources::{Plan, catalog};
use anyhow::{Context as _, Result};

/// Handles the 'plan' command - shows the ordered resource plan offline
pub struct PlanCommand;

impl PlanCommand {
    pub fn execute(ctx: &Context, format: PlanFormat) -> Result<()> {
        let plan = catalog::launch_plan().context("Failed to build the launch plan")?;
        Self::show(ctx, &plan, format)
    }

    fn show(ctx: &Context, plan: &Plan, format: PlanFormat) -> Result<()> {
        match format {
            PlanFormat::Text => {
                ctx.output.section("Resource Plan");
                ctx.output.plain(plan.format_tree().trim_end());
                ctx.output.blank();
                ctx.output.key_value("Resources", &plan.len().to_string());
                ctx.output
                    .key_value("Removed on teardown", &plan.teardown_targets().len().to_string());
            }
            PlanFormat::Json => ctx.output.plain(
                &serde_json::to_string_pretty(plan).context("Failed to serialize plan")?,
            ),
            PlanFormat::Yaml => ctx
                .output
                .plain(&serde_yaml::to_string(plan).context("Failed to serialize plan")?),
        }
        Ok(())
    }
}
