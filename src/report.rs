//! Per-resource outcomes of a run, for the end-of-run summary

use crate::resources::{HandleKey, RemoteId, ResourceType, SpecId};
use crate::traits::Output;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What kind of run produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Apply,
    Status,
    Teardown,
    TestEmail,
}

impl Operation {
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Apply => "Provisioning",
            Operation::Status => "Status",
            Operation::Teardown => "Teardown",
            Operation::TestEmail => "Test Email",
        }
    }
}

/// What happened to one resource
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Already present on the platform
    Found { id: RemoteId },
    Created { id: RemoteId },
    Failed { error: String },
    /// Absent; a real run would create it
    WouldCreate,
    /// Cannot be checked until its dependencies exist
    Pending { waiting_on: Vec<String> },
    /// Nothing to delete
    Absent,
    Deleted { id: RemoteId },
    DeleteFailed { id: RemoteId, error: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. } | Outcome::DeleteFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub natural_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SpecId>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Accumulated outcomes of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub operation: Operation,
    pub started_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, key: &HandleKey, outcome: Outcome) {
        self.entries.push(ReportEntry {
            resource_type: key.resource_type,
            natural_key: key.natural_key.clone(),
            scope: key.scope.clone(),
            outcome,
        });
    }

    /// Latest outcome recorded for `key`
    pub fn outcome(&self, key: &HandleKey) -> Option<&Outcome> {
        self.entries
            .iter()
            .rev()
            .find(|e| {
                e.resource_type == key.resource_type
                    && e.natural_key == key.natural_key
                    && e.scope == key.scope
            })
            .map(|e| &e.outcome)
    }

    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.outcome.is_failure())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print every outcome followed by a summary
    pub fn render(&self, output: &dyn Output) {
        output.section(self.operation.title());

        for entry in &self.entries {
            let subject = format!("{} '{}'", entry.resource_type, entry.natural_key);
            match &entry.outcome {
                Outcome::Found { id } => {
                    output.info(&format!("{} already exists (ID: {})", subject, id))
                }
                Outcome::Created { id } => {
                    output.success(&format!("Created {} (ID: {})", subject, id))
                }
                Outcome::Failed { error } => {
                    output.error(&format!("Failed on {}: {}", subject, error))
                }
                Outcome::WouldCreate => output.warning(&format!("{} would be created", subject)),
                Outcome::Pending { waiting_on } => output.dimmed(&format!(
                    "  {} waits for {}",
                    subject,
                    waiting_on.join(", ")
                )),
                Outcome::Absent => output.dimmed(&format!("  {} does not exist", subject)),
                Outcome::Deleted { id } => {
                    output.success(&format!("Deleted {} (ID: {})", subject, id))
                }
                Outcome::DeleteFailed { id, error } => output.error(&format!(
                    "Failed to delete {} (ID: {}): {}",
                    subject, id, error
                )),
            }
        }

        output.subsection("Summary");
        let counts: [(&str, fn(&Outcome) -> bool); 8] = [
            ("Found", |o| matches!(o, Outcome::Found { .. })),
            ("Created", |o| matches!(o, Outcome::Created { .. })),
            ("Would create", |o| matches!(o, Outcome::WouldCreate)),
            ("Pending", |o| matches!(o, Outcome::Pending { .. })),
            ("Deleted", |o| matches!(o, Outcome::Deleted { .. })),
            ("Absent", |o| matches!(o, Outcome::Absent)),
            ("Failed", |o| matches!(o, Outcome::Failed { .. })),
            ("Delete failed", |o| matches!(o, Outcome::DeleteFailed { .. })),
        ];
        for (label, predicate) in counts {
            let count = self.count(predicate);
            if count > 0 {
                output.key_value(label, &count.to_string());
            }
        }
    }
}
