//! Test helpers standing in for the platform API
//!
//! `ScriptedClient` answers exact (method, path) pairs from a script.
//! `FakeRemote` keeps an in-memory copy of the platform's collections and
//! routes list/create/edit/delete calls the way the real API lays them out, with
//! call recording and failure injection.

#![cfg(test)]

use crate::api::{ApiClient, Method};
use crate::error::{ProvisionError, ProvisionResult};
use crate::resources::{CollectionLocation, RemoteId, ResourceType};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A call received by one of the fake clients
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
}

/// How an injected failure surfaces
#[derive(Debug, Clone, Copy)]
pub enum FailureKind {
    Transport,
    Status(u16),
}

impl FailureKind {
    fn to_error(self, path: &str) -> ProvisionError {
        match self {
            FailureKind::Transport => ProvisionError::Transport {
                path: path.to_string(),
                message: "connection refused".to_string(),
            },
            FailureKind::Status(status) => ProvisionError::Api {
                path: path.to_string(),
                status,
                body: Some(format!("{{\"errors\":[{{\"code\":{}}}]}}", status)),
            },
        }
    }
}

/// Client answering from a fixed script of responses
pub struct ScriptedClient {
    script: Mutex<HashMap<(Method, String), VecDeque<ProvisionResult<Value>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response for `method path`
    pub fn respond(self, method: Method, path: &str, body: Value) -> Self {
        self.push(method, path, Ok(body));
        self
    }

    /// Queue a failure for `method path`
    pub fn fail(self, method: Method, path: &str, error: ProvisionError) -> Self {
        self.push(method, path, Err(error));
        self
    }

    fn push(&self, method: Method, path: &str, result: ProvisionResult<Value>) {
        self.script
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ApiClient for ScriptedClient {
    fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> ProvisionResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            payload: payload.cloned(),
        });

        self.script
            .lock()
            .unwrap()
            .get_mut(&(method, path.to_string()))
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(ProvisionError::Api {
                    path: path.to_string(),
                    status: 404,
                    body: None,
                })
            })
    }
}

const TOP_LEVEL: [ResourceType; 7] = [
    ResourceType::CustomField,
    ResourceType::Category,
    ResourceType::Email,
    ResourceType::Tag,
    ResourceType::Segment,
    ResourceType::Campaign,
    ResourceType::Form,
];

#[derive(Default)]
struct FakeState {
    records: HashMap<ResourceType, Vec<Value>>,
    /// Campaign events keyed by campaign id
    events: HashMap<u64, Vec<Value>>,
    contacts: Vec<Value>,
    next_id: u64,
    failures: Vec<(Method, String, FailureKind)>,
    calls: Vec<RecordedCall>,
}

/// In-memory platform
pub struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..FakeState::default()
            }),
        }
    }

    /// Seed an existing record; it must carry its own `id`
    pub fn with_record(self, resource_type: ResourceType, record: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .entry(resource_type)
            .or_default()
            .push(record);
        self
    }

    /// Make every `method` call whose path starts with `path_prefix` fail
    pub fn with_failure(self, method: Method, path_prefix: &str, kind: FailureKind) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, path_prefix.to_string(), kind));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Paths of all POST calls, in order
    pub fn posts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == Method::Post)
            .map(|c| c.path)
            .collect()
    }

    /// Payload of the first POST to `path`
    pub fn payload_posted_to(&self, path: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .find(|c| c.method == Method::Post && c.path == path)
            .and_then(|c| c.payload)
    }

    pub fn count(&self, resource_type: ResourceType) -> usize {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&resource_type)
            .map_or(0, Vec::len)
    }

    pub fn event_count(&self, campaign: RemoteId) -> usize {
        self.state
            .lock()
            .unwrap()
            .events
            .get(&campaign.get())
            .map_or(0, Vec::len)
    }

    pub fn contact_count(&self) -> usize {
        self.state.lock().unwrap().contacts.len()
    }

    fn not_found(path: &str) -> ProvisionError {
        ProvisionError::Api {
            path: path.to_string(),
            status: 404,
            body: Some("{\"errors\":[{\"message\":\"Item was not found.\"}]}".to_string()),
        }
    }
}

impl FakeState {
    fn assign_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn list(&self, resource_type: ResourceType) -> Value {
        let records = self.records.get(&resource_type).cloned().unwrap_or_default();
        let total = records.len();
        let collection = match resource_type {
            // Keyed by internal id, as the platform does for these collections
            ResourceType::CustomField | ResourceType::Segment => {
                let mut map = serde_json::Map::new();
                for record in records {
                    map.insert(record["id"].to_string(), record);
                }
                Value::Object(map)
            }
            _ => Value::Array(records),
        };

        let endpoint = resource_type
            .list_endpoint(None)
            .unwrap_or_else(|e| panic!("{}", e));
        let member = match endpoint.collection {
            CollectionLocation::Member(member) => member,
            CollectionLocation::Nested { member, .. } => member,
        };

        let mut envelope = serde_json::Map::new();
        envelope.insert("total".to_string(), json!(total));
        envelope.insert(member.to_string(), collection);
        Value::Object(envelope)
    }

    fn create(&mut self, resource_type: ResourceType, payload: Option<&Value>) -> Value {
        let id = self.assign_id();
        let mut record = payload.cloned().unwrap_or_else(|| json!({}));
        record["id"] = json!(id);

        if resource_type == ResourceType::Campaign {
            let embedded = record
                .get("events")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let mut events = Vec::new();
            for mut event in embedded {
                event["id"] = json!(self.assign_id());
                events.push(event);
            }
            self.events.insert(id, events);
        }

        self.records
            .entry(resource_type)
            .or_default()
            .push(record.clone());
        json!({ (resource_type.created_key()): record })
    }

    fn delete(
        &mut self,
        resource_type: ResourceType,
        id: u64,
        path: &str,
    ) -> ProvisionResult<Value> {
        let records = self.records.entry(resource_type).or_default();
        let position = records
            .iter()
            .position(|r| RemoteId::from_json(&r["id"]) == Some(RemoteId::new(id)))
            .ok_or_else(|| FakeRemote::not_found(path))?;
        let record = records.remove(position);
        if resource_type == ResourceType::Campaign {
            self.events.remove(&id);
        }
        Ok(json!({ (resource_type.created_key()): record }))
    }

    fn edit(
        &mut self,
        resource_type: ResourceType,
        id: u64,
        payload: Option<&Value>,
        path: &str,
    ) -> ProvisionResult<Value> {
        let record = self
            .records
            .entry(resource_type)
            .or_default()
            .iter_mut()
            .find(|r| RemoteId::from_json(&r["id"]) == Some(RemoteId::new(id)))
            .ok_or_else(|| FakeRemote::not_found(path))?;
        if let Some(Value::Object(fields)) = payload {
            for (key, value) in fields {
                record[key.as_str()] = value.clone();
            }
        }
        record["id"] = json!(id);
        Ok(json!({ (resource_type.created_key()): record.clone() }))
    }

    fn campaign_with_events(&self, id: u64, path: &str) -> ProvisionResult<Value> {
        let campaign = self
            .records
            .get(&ResourceType::Campaign)
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| RemoteId::from_json(&r["id"]) == Some(RemoteId::new(id)))
            })
            .cloned()
            .ok_or_else(|| FakeRemote::not_found(path))?;

        let mut campaign = campaign;
        campaign["events"] = Value::Array(self.events.get(&id).cloned().unwrap_or_default());
        Ok(json!({ "campaign": campaign }))
    }

    fn add_event(
        &mut self,
        campaign: u64,
        payload: Option<&Value>,
        path: &str,
    ) -> ProvisionResult<Value> {
        if !self.events.contains_key(&campaign) {
            return Err(FakeRemote::not_found(path));
        }
        let id = self.assign_id();
        let mut event = payload.cloned().unwrap_or_else(|| json!({}));
        event["id"] = json!(id);
        self.events.entry(campaign).or_default().push(event.clone());
        Ok(json!({ "event": event }))
    }

    fn route(
        &mut self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> ProvisionResult<Value> {
        let bare = path.split('?').next().unwrap_or(path);

        for resource_type in TOP_LEVEL {
            let list_path = resource_type.list_endpoint(None)?.path;
            if method == Method::Get && bare == list_path {
                return Ok(self.list(resource_type));
            }
            if method == Method::Post && bare == resource_type.create_path(None)? {
                return Ok(self.create(resource_type, payload));
            }
            if method == Method::Delete {
                let id = bare
                    .strip_prefix(&format!("{}/", list_path))
                    .and_then(|rest| rest.strip_suffix("/delete"))
                    .and_then(|id| id.parse::<u64>().ok());
                if let Some(id) = id {
                    return self.delete(resource_type, id, path);
                }
            }
            if method == Method::Put {
                let id = bare
                    .strip_prefix(&format!("{}/", list_path))
                    .and_then(|rest| rest.strip_suffix("/edit"))
                    .and_then(|id| id.parse::<u64>().ok());
                if let Some(id) = id {
                    return self.edit(resource_type, id, payload, path);
                }
            }
        }

        if let Some(rest) = bare.strip_prefix("campaigns/") {
            if method == Method::Get {
                if let Ok(id) = rest.parse::<u64>() {
                    return self.campaign_with_events(id, path);
                }
            }
            if method == Method::Post {
                let campaign = rest
                    .strip_suffix("/events/add")
                    .and_then(|id| id.parse::<u64>().ok());
                if let Some(campaign) = campaign {
                    return self.add_event(campaign, payload, path);
                }
            }
        }

        if method == Method::Post && bare == "contacts/new" {
            let id = self.assign_id();
            let mut contact = payload.cloned().unwrap_or_else(|| json!({}));
            contact["id"] = json!(id);
            self.contacts.push(contact.clone());
            return Ok(json!({ "contact": contact }));
        }

        if method == Method::Post && bare == "emails/send" {
            return Ok(json!({ "success": true }));
        }

        Err(FakeRemote::not_found(path))
    }
}

impl ApiClient for FakeRemote {
    fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> ProvisionResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            payload: payload.cloned(),
        });

        let failure = state
            .failures
            .iter()
            .find(|(m, prefix, _)| *m == method && path.starts_with(prefix.as_str()))
            .map(|(_, _, kind)| *kind);
        if let Some(kind) = failure {
            return Err(kind.to_error(path));
        }

        state.route(method, path, payload)
    }
}
