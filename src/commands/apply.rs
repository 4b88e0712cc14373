use super::ReportFormat;
use crate::api::ApiClient;
use crate::config::Config;
use crate::context::Context;
use crate::reconcile::Reconciler;
use crate::report::RunReport;
use crate::resources::{HandleKey, ResourceType, catalog};
use anyhow::{Context as _, Result};

/// Handles the 'apply' command - provisions the launch resources
pub struct ApplyCommand;

impl ApplyCommand {
    /// Execute the apply command
    pub fn execute(
        ctx: &Context,
        client: &dyn ApiClient,
        config: &Config,
        format: ReportFormat,
    ) -> Result<()> {
        let plan = catalog::launch_plan().context("Failed to build the launch plan")?;

        if format == ReportFormat::Text {
            ctx.output.info(&format!(
                "Provisioning {} resources on {}",
                plan.len(),
                config.base_url
            ));
        }

        match Reconciler::new(client).reconcile(&plan) {
            Ok(run) => {
                Self::show(ctx, run.report(), format)?;
                if format == ReportFormat::Text {
                    let form = HandleKey::new(ResourceType::Form, catalog::FORM_NAME);
                    if let Some(id) = run.remote_id(&form) {
                        ctx.output.subsection("Landing Page");
                        ctx.output.key_value("Form ID", &id.to_string());
                        ctx.output
                            .key_value_highlight("Form URL", &config.form_url(catalog::FORM_ALIAS));
                    }
                    ctx.output.success("Provisioning complete");
                }
                Ok(())
            }
            Err(failure) => {
                Self::show(ctx, failure.context.report(), format)?;
                Err(anyhow::Error::new(*failure))
            }
        }
    }

    fn show(ctx: &Context, report: &RunReport, format: ReportFormat) -> Result<()> {
        match format {
            ReportFormat::Text => report.render(ctx.output.as_ref()),
            ReportFormat::Json => ctx
                .output
                .plain(&report.to_json().context("Failed to serialize report")?),
        }
        Ok(())
    }
}
