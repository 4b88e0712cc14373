use crate::api::{ApiClient, Pages};
use crate::error::{ProvisionError, ProvisionResult};
use crate::resources::{RemoteId, ResourceType};
use serde_json::Value;

/// Result of looking a resource up by natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(RemoteId),
    NotFound,
}

/// Finds existing platform resources by natural key
pub struct Resolver<'a> {
    client: &'a dyn ApiClient,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self { client }
    }

    /// Look up `natural_key` among the existing resources of `resource_type`.
    ///
    /// Matching is exact and case-sensitive; the first match wins. A failed
    /// listing is reported as `AmbiguousState`, never as NotFound.
    pub fn resolve(
        &self,
        resource_type: ResourceType,
        natural_key: &str,
        scope: Option<RemoteId>,
    ) -> ProvisionResult<Resolution> {
        let endpoint = resource_type.list_endpoint(scope)?;
        let attribute = resource_type.natural_key_attribute();

        let ambiguous = |source: ProvisionError| ProvisionError::AmbiguousState {
            resource_type,
            natural_key: natural_key.to_string(),
            source: Box::new(source),
        };

        for page in Pages::new(self.client, endpoint.clone()) {
            let records = page.map_err(ambiguous)?;

            let matched = records
                .iter()
                .find(|record| record.get(attribute).and_then(Value::as_str) == Some(natural_key));

            if let Some(record) = matched {
                let id = record
                    .get("id")
                    .and_then(RemoteId::from_json)
                    .ok_or_else(|| {
                        ambiguous(ProvisionError::MalformedResponse {
                            path: endpoint.path.clone(),
                            message: format!("matching record for '{}' has no id", natural_key),
                        })
                    })?;

                tracing::debug!(%resource_type, natural_key, %id, "resolved existing resource");
                return Ok(Resolution::Found(id));
            }
        }

        tracing::debug!(%resource_type, natural_key, "resource not found");
        Ok(Resolution::NotFound)
    }
}
