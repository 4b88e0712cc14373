use crate::error::{ProvisionError, ProvisionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kinds of platform resources the provisioner manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    CustomField,
    Category,
    Email,
    Tag,
    Segment,
    Campaign,
    CampaignEvent,
    Form,
}

/// Where the records of a list response live inside its envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionLocation {
    /// `{ "<member>": [...] | {...}, "total": n }`
    Member(&'static str),
    /// `{ "<object>": { "<member>": [...] | {...} } }`
    Nested {
        object: &'static str,
        member: &'static str,
    },
}

/// A fully built list endpoint for one resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEndpoint {
    pub path: String,
    pub collection: CollectionLocation,
}

impl ListEndpoint {
    /// Only top-level collections are paginated by the platform
    pub fn is_paginated(&self) -> bool {
        matches!(self.collection, CollectionLocation::Member(_))
    }
}

impl ResourceType {
    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::CustomField => "custom field",
            ResourceType::Category => "category",
            ResourceType::Email => "email",
            ResourceType::Tag => "tag",
            ResourceType::Segment => "segment",
            ResourceType::Campaign => "campaign",
            ResourceType::CampaignEvent => "campaign event",
            ResourceType::Form => "form",
        }
    }

    /// Attribute holding the natural key on remote records
    pub fn natural_key_attribute(&self) -> &'static str {
        match self {
            ResourceType::CustomField => "alias",
            ResourceType::Category => "title",
            ResourceType::Tag => "tag",
            _ => "name",
        }
    }

    /// Envelope key the created object is nested under
    pub fn created_key(&self) -> &'static str {
        match self {
            ResourceType::CustomField => "field",
            ResourceType::Category => "category",
            ResourceType::Email => "email",
            ResourceType::Tag => "tag",
            ResourceType::Segment => "list",
            ResourceType::Campaign => "campaign",
            ResourceType::CampaignEvent => "event",
            ResourceType::Form => "form",
        }
    }

    /// Whether list and create paths need the remote id of a parent resource
    pub fn requires_scope(&self) -> bool {
        matches!(self, ResourceType::CampaignEvent)
    }

    /// Whether the resource can be deleted on its own
    pub fn is_deletable(&self) -> bool {
        !matches!(self, ResourceType::CampaignEvent)
    }

    fn collection_path(&self) -> &'static str {
        match self {
            ResourceType::CustomField => "fields/contact",
            ResourceType::Category => "categories",
            ResourceType::Email => "emails",
            ResourceType::Tag => "tags",
            ResourceType::Segment => "segments",
            ResourceType::Campaign | ResourceType::CampaignEvent => "campaigns",
            ResourceType::Form => "forms",
        }
    }

    fn list_member(&self) -> &'static str {
        match self {
            ResourceType::CustomField => "fields",
            ResourceType::Category => "categories",
            ResourceType::Email => "emails",
            ResourceType::Tag => "tags",
            ResourceType::Segment => "lists",
            ResourceType::Campaign => "campaigns",
            ResourceType::CampaignEvent => "events",
            ResourceType::Form => "forms",
        }
    }

    fn check_scope(&self, scope: Option<RemoteId>) -> ProvisionResult<Option<RemoteId>> {
        match (self.requires_scope(), scope) {
            (true, None) => Err(ProvisionError::InvalidPlan(format!(
                "{} resources need a parent scope",
                self.label()
            ))),
            (false, Some(_)) => Err(ProvisionError::InvalidPlan(format!(
                "{} resources cannot be scoped",
                self.label()
            ))),
            (_, scope) => Ok(scope),
        }
    }

    /// Endpoint listing existing resources of this type
    pub fn list_endpoint(&self, scope: Option<RemoteId>) -> ProvisionResult<ListEndpoint> {
        match self.check_scope(scope)? {
            Some(parent) => Ok(ListEndpoint {
                path: format!("{}/{}", self.collection_path(), parent),
                collection: CollectionLocation::Nested {
                    object: "campaign",
                    member: self.list_member(),
                },
            }),
            None => Ok(ListEndpoint {
                path: self.collection_path().to_string(),
                collection: CollectionLocation::Member(self.list_member()),
            }),
        }
    }

    /// Path a creation payload is posted to
    pub fn create_path(&self, scope: Option<RemoteId>) -> ProvisionResult<String> {
        match self.check_scope(scope)? {
            Some(parent) => Ok(format!("{}/{}/events/add", self.collection_path(), parent)),
            None => Ok(format!("{}/new", self.collection_path())),
        }
    }

    /// Path deleting one resource, if the type can be deleted individually
    pub fn delete_path(&self, id: RemoteId) -> Option<String> {
        if !self.is_deletable() {
            return None;
        }
        Some(format!("{}/{}/delete", self.collection_path(), id))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier assigned to a resource by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(u64);

impl RemoteId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Read an id from a JSON number or a numeric string
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::String(s) => s.trim().parse().ok().map(Self),
            _ => None,
        }
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RemoteId> for Value {
    fn from(id: RemoteId) -> Self {
        Value::from(id.0)
    }
}
