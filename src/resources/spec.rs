use super::types::ResourceType;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Design-time identifier of a resource spec
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SpecId(String);

impl SpecId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative description of one resource to provision
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSpec {
    pub id: SpecId,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub natural_key: String,
    /// Creation payload; may contain placeholders
    pub attributes: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<SpecId>,
    /// Parent whose remote id scopes the list and create paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SpecId>,
}

impl ResourceSpec {
    pub fn new(
        id: impl Into<String>,
        resource_type: ResourceType,
        natural_key: impl Into<String>,
        attributes: Value,
    ) -> Self {
        Self {
            id: SpecId::new(id),
            resource_type,
            natural_key: natural_key.into(),
            attributes,
            dependencies: Vec::new(),
            scope: None,
        }
    }

    /// Declare a dependency (kept in declaration order, without duplicates)
    pub fn depends_on(mut self, id: &str) -> Self {
        let id = SpecId::new(id);
        if !self.dependencies.contains(&id) {
            self.dependencies.push(id);
        }
        self
    }

    /// Scope this spec under a parent, which also becomes a dependency
    pub fn scoped_to(mut self, id: &str) -> Self {
        self.scope = Some(SpecId::new(id));
        self.depends_on(id)
    }

    pub fn handle_key(&self) -> HandleKey {
        let key = HandleKey::new(self.resource_type, &self.natural_key);
        match &self.scope {
            Some(parent) => key.within(parent.clone()),
            None => key,
        }
    }
}

/// Identity of a resource on the platform: its type plus natural key.
///
/// Scoped resources are only unique under their parent, so their key also
/// carries the parent's spec id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleKey {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub natural_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SpecId>,
}

impl HandleKey {
    pub fn new(resource_type: ResourceType, natural_key: &str) -> Self {
        Self {
            resource_type,
            natural_key: natural_key.to_string(),
            scope: None,
        }
    }

    pub fn within(mut self, parent: SpecId) -> Self {
        self.scope = Some(parent);
        self
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.resource_type, self.natural_key)?;
        if let Some(parent) = &self.scope {
            write!(f, " under '{}'", parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scoped_to_adds_dependency_once() {
        let spec = ResourceSpec::new(
            "event_d1",
            ResourceType::CampaignEvent,
            "Send email (D+1)",
            json!({}),
        )
        .depends_on("campaign")
        .scoped_to("campaign")
        .depends_on("email_d1");

        assert_eq!(spec.scope, Some(SpecId::new("campaign")));
        assert_eq!(
            spec.dependencies,
            vec![SpecId::new("campaign"), SpecId::new("email_d1")]
        );
    }

    #[test]
    fn test_handle_key_display() {
        let spec = ResourceSpec::new("tag", ResourceType::Tag, "Semente1", json!({}));
        assert_eq!(spec.handle_key().to_string(), "tag 'Semente1'");
    }

    #[test]
    fn test_scoped_handle_keys_differ_by_parent() {
        let event = |parent: &str| {
            ResourceSpec::new(
                "event",
                ResourceType::CampaignEvent,
                "Send email (D+1)",
                json!({}),
            )
            .scoped_to(parent)
        };

        let first = event("campaign_a").handle_key();
        let second = event("campaign_b").handle_key();
        assert_ne!(first, second);
        assert_eq!(first.scope, Some(SpecId::new("campaign_a")));
        assert!(first.to_string().ends_with("under 'campaign_a'"));
    }
}
