use super::resolver::{Resolution, Resolver};
use crate::api::{ApiClient, Method};
use crate::report::{Operation, Outcome, RunReport};
use crate::resources::HandleKey;

/// Best-effort deletion of previously provisioned resources
pub struct TeardownCoordinator<'a> {
    client: &'a dyn ApiClient,
    resolver: Resolver<'a>,
}

impl<'a> TeardownCoordinator<'a> {
    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self {
            client,
            resolver: Resolver::new(client),
        }
    }

    /// Delete each target in the given order.
    ///
    /// Every target is attempted regardless of earlier failures. Targets
    /// that cannot be found are reported as absent.
    pub fn teardown(&self, targets: &[HandleKey]) -> RunReport {
        let mut report = RunReport::new(Operation::Teardown);

        for key in targets {
            let outcome = self.remove(key);
            if outcome.is_failure() {
                tracing::warn!(%key, ?outcome, "teardown step failed");
            }
            report.record(key, outcome);
        }

        report
    }

    fn remove(&self, key: &HandleKey) -> Outcome {
        let id = match self
            .resolver
            .resolve(key.resource_type, &key.natural_key, None)
        {
            Ok(Resolution::Found(id)) => id,
            Ok(Resolution::NotFound) => return Outcome::Absent,
            Err(error) => {
                return Outcome::Failed {
                    error: error.to_string(),
                };
            }
        };

        let Some(path) = key.resource_type.delete_path(id) else {
            return Outcome::Failed {
                error: format!("{} resources cannot be deleted directly", key.resource_type),
            };
        };

        match self.client.execute(Method::Delete, &path, None) {
            Ok(_) => {
                tracing::info!(%key, %id, "resource deleted");
                Outcome::Deleted { id }
            }
            Err(error) => Outcome::DeleteFailed {
                id,
                error: error.to_string(),
            },
        }
    }
}
