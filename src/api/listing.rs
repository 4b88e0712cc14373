//! Normalization of list responses.
//!
//! The platform returns collections either as an ordered sequence or as a
//! mapping keyed by internal id, depending on the endpoint. Both are folded
//! into a plain sequence of records here so callers never inspect the shape.

use super::client::{ApiClient, Method};
use crate::error::{ProvisionError, ProvisionResult};
use crate::resources::{CollectionLocation, ListEndpoint};
use serde_json::{Map, Value};

/// Records requested per page on paginated endpoints
pub const PAGE_SIZE: usize = 100;

/// A collection as returned by the platform
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Mapping(Map<String, Value>),
    Sequence(Vec<Value>),
}

impl Listing {
    /// Interpret a collection value; `null` is an empty collection
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Listing::Mapping(map)),
            Value::Array(items) => Some(Listing::Sequence(items)),
            Value::Null => Some(Listing::Sequence(Vec::new())),
            _ => None,
        }
    }

    /// Records in response order; mapping keys are discarded
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Listing::Mapping(map) => map.into_iter().map(|(_, record)| record).collect(),
            Listing::Sequence(items) => items,
        }
    }
}

/// One page of records plus the total the platform reported, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub records: Vec<Value>,
    pub total: Option<u64>,
}

impl ListPage {
    /// Extract the records of a list envelope
    pub fn from_envelope(
        path: &str,
        mut envelope: Value,
        location: CollectionLocation,
    ) -> ProvisionResult<Self> {
        let total = envelope.get("total").and_then(as_count);

        let collection = match location {
            CollectionLocation::Member(member) => envelope.get_mut(member).map(Value::take),
            CollectionLocation::Nested { object, member } => envelope
                .get_mut(object)
                .and_then(|inner| inner.get_mut(member))
                .map(Value::take),
        };

        let collection = collection.ok_or_else(|| ProvisionError::MalformedResponse {
            path: path.to_string(),
            message: format!("response has no '{}' collection", describe(location)),
        })?;

        let listing = Listing::from_value(collection).ok_or_else(|| {
            ProvisionError::MalformedResponse {
                path: path.to_string(),
                message: format!("'{}' is neither a list nor a mapping", describe(location)),
            }
        })?;

        Ok(Self {
            records: listing.into_records(),
            total,
        })
    }
}

fn describe(location: CollectionLocation) -> String {
    match location {
        CollectionLocation::Member(member) => member.to_string(),
        CollectionLocation::Nested { object, member } => format!("{}.{}", object, member),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Iterator over the pages of a list endpoint.
///
/// Paginated endpoints are walked until the reported total has been seen or a
/// page comes back empty. Without a reported total, paging continues while
/// pages come back full. Iteration ends after the first error.
pub struct Pages<'a> {
    client: &'a dyn ApiClient,
    endpoint: ListEndpoint,
    start: usize,
    done: bool,
}

impl<'a> Pages<'a> {
    pub fn new(client: &'a dyn ApiClient, endpoint: ListEndpoint) -> Self {
        Self {
            client,
            endpoint,
            start: 0,
            done: false,
        }
    }

    fn page_path(&self) -> String {
        if self.endpoint.is_paginated() {
            format!(
                "{}?start={}&limit={}",
                self.endpoint.path, self.start, PAGE_SIZE
            )
        } else {
            self.endpoint.path.clone()
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = ProvisionResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let path = self.page_path();
        let location = self.endpoint.collection;
        let page = self
            .client
            .execute(Method::Get, &path, None)
            .and_then(|envelope| ListPage::from_envelope(&path, envelope, location));

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.start += page.records.len();
        let exhausted = match page.total {
            Some(total) => self.start as u64 >= total,
            None => page.records.len() < PAGE_SIZE,
        };
        if !self.endpoint.is_paginated() || page.records.is_empty() || exhausted {
            self.done = true;
        }

        Some(Ok(page.records))
    }
}
