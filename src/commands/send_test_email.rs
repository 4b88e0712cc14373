use crate::api::{ApiClient, Method};
use crate::context::Context;
use crate::error::ProvisionError;
use crate::reconcile::Reconciler;
use crate::report::Operation;
use crate::resources::{HandleKey, RemoteId, ResourceType, catalog};
use anyhow::{Context as _, Result};
use serde_json::json;

/// Handles the 'send-test-email' command - checks the mailer end to end
pub struct SendTestEmailCommand;

impl SendTestEmailCommand {
    pub fn execute(
        ctx: &Context,
        client: &dyn ApiClient,
        to: &str,
        mobile: Option<&str>,
    ) -> Result<()> {
        if !to.contains('@') {
            anyhow::bail!("'{}' is not an email address", to);
        }

        ctx.output.section("Test Email");

        let contact = Self::create_contact(client, to, mobile)?;
        ctx.output
            .success(&format!("Test contact created (ID: {})", contact));

        let plan = catalog::test_email_plan().context("Failed to build the test email plan")?;
        let run = Reconciler::new(client)
            .reconcile_as(&plan, Operation::TestEmail)
            .map_err(|failure| anyhow::Error::new(*failure))?;
        let email = run
            .remote_id(&HandleKey::new(ResourceType::Email, catalog::TEST_EMAIL_NAME))
            .context("Test email was not provisioned")?;
        ctx.output
            .info(&format!("Using email '{}' (ID: {})", catalog::TEST_EMAIL_NAME, email));

        client
            .execute(
                Method::Post,
                "emails/send",
                Some(&json!({"email": email.get(), "contact": contact.get()})),
            )
            .context("Failed to send the test email; check the mailer settings")?;

        ctx.output.success(&format!("Test email sent to {}", to));
        ctx.output
            .dimmed("Check the mail provider dashboard and the platform's email log for delivery");
        Ok(())
    }

    fn create_contact(client: &dyn ApiClient, to: &str, mobile: Option<&str>) -> Result<RemoteId> {
        let mut payload = json!({
            "firstname": "Test",
            "lastname": "Recipient",
            "email": to,
        });
        if let Some(mobile) = mobile {
            payload["mobile"] = json!(mobile);
        }

        let response = client
            .execute(Method::Post, "contacts/new", Some(&payload))
            .context("Failed to create the test contact")?;

        let id = response
            .get("contact")
            .and_then(|contact| contact.get("id"))
            .and_then(RemoteId::from_json)
            .ok_or_else(|| ProvisionError::MalformedResponse {
                path: "contacts/new".to_string(),
                message: "created contact carries no id".to_string(),
            })?;
        Ok(id)
    }
}
