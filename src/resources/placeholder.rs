//! Forward references inside resource attributes.
//!
//! A placeholder is a JSON string of the exact form `{{id:<spec>}}` or
//! `{{key:<spec>}}`. Just before a spec is reconciled every placeholder is
//! replaced by the remote id (as a number) or the natural key (as a string)
//! of the referenced spec.

use super::spec::SpecId;
use crate::error::ProvisionResult;
use serde_json::Value;

/// A reference from one spec's attributes to another spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    RemoteId(SpecId),
    NaturalKey(SpecId),
}

impl Placeholder {
    /// Parse a placeholder token, returning None for ordinary strings
    pub fn parse(text: &str) -> Option<Self> {
        let inner = text.strip_prefix("{{")?.strip_suffix("}}")?;
        let (kind, target) = inner.split_once(':')?;
        if target.is_empty() {
            return None;
        }
        match kind {
            "id" => Some(Placeholder::RemoteId(SpecId::new(target))),
            "key" => Some(Placeholder::NaturalKey(SpecId::new(target))),
            _ => None,
        }
    }

    /// The spec this placeholder points at
    pub fn target(&self) -> &SpecId {
        match self {
            Placeholder::RemoteId(id) | Placeholder::NaturalKey(id) => id,
        }
    }

    pub fn token(&self) -> String {
        match self {
            Placeholder::RemoteId(id) => format!("{{{{id:{}}}}}", id),
            Placeholder::NaturalKey(id) => format!("{{{{key:{}}}}}", id),
        }
    }
}

/// Placeholder value standing for the remote id of `spec`
pub fn id_of(spec: &str) -> Value {
    Value::String(Placeholder::RemoteId(SpecId::new(spec)).token())
}

/// Placeholder value standing for the natural key of `spec`
pub fn key_of(spec: &str) -> Value {
    Value::String(Placeholder::NaturalKey(SpecId::new(spec)).token())
}

/// Collect every placeholder found anywhere in `value`
pub fn references(value: &Value) -> Vec<Placeholder> {
    let mut found = Vec::new();
    collect(value, &mut found);
    found
}

fn collect(value: &Value, found: &mut Vec<Placeholder>) {
    match value {
        Value::String(text) => {
            if let Some(placeholder) = Placeholder::parse(text) {
                found.push(placeholder);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect(item, found)),
        Value::Object(map) => map.values().for_each(|item| collect(item, found)),
        _ => {}
    }
}

/// Return a copy of `value` with every placeholder replaced by `resolve`'s answer
pub fn substitute<F>(value: &Value, resolve: &mut F) -> ProvisionResult<Value>
where
    F: FnMut(&Placeholder) -> ProvisionResult<Value>,
{
    match value {
        Value::String(text) => match Placeholder::parse(text) {
            Some(placeholder) => resolve(&placeholder),
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| substitute(item, resolve))
            .collect::<ProvisionResult<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), substitute(item, resolve)?);
            }
            Ok(Value::Object(out))
        }
        _ => Ok(value.clone()),
    }
}
