use super::placeholder;
use super::spec::{HandleKey, ResourceSpec, SpecId};
use crate::error::{ProvisionError, ProvisionResult};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A validated set of resource specs in dependency order
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Plan {
    specs: Vec<ResourceSpec>,
    #[serde(skip)]
    index: HashMap<SpecId, usize>,
}

impl Plan {
    /// Validate `specs` and order them so every dependency comes first.
    ///
    /// Specs that are already correctly ordered keep their declaration order.
    pub fn new(specs: Vec<ResourceSpec>) -> ProvisionResult<Self> {
        let mut by_id: HashMap<SpecId, &ResourceSpec> = HashMap::new();
        let mut keys = HashSet::new();

        for spec in &specs {
            if by_id.insert(spec.id.clone(), spec).is_some() {
                return Err(invalid(format!("duplicate spec id '{}'", spec.id)));
            }
            if !keys.insert(spec.handle_key()) {
                return Err(invalid(format!("duplicate natural key for {}", spec.handle_key())));
            }
        }

        for spec in &specs {
            Self::validate_spec(spec, &by_id)?;
        }

        let mut order = Vec::with_capacity(specs.len());
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();
        for spec in &specs {
            Self::topological_sort(spec, &by_id, &mut order, &mut visited, &mut visiting)?;
        }

        let mut remaining: HashMap<SpecId, ResourceSpec> =
            specs.into_iter().map(|spec| (spec.id.clone(), spec)).collect();
        let specs: Vec<ResourceSpec> = order
            .iter()
            .filter_map(|id| remaining.remove(id))
            .collect();
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.id.clone(), i))
            .collect();

        Ok(Self { specs, index })
    }

    fn validate_spec(
        spec: &ResourceSpec,
        by_id: &HashMap<SpecId, &ResourceSpec>,
    ) -> ProvisionResult<()> {
        for dep in &spec.dependencies {
            if !by_id.contains_key(dep) {
                return Err(invalid(format!(
                    "'{}' depends on unknown spec '{}'",
                    spec.id, dep
                )));
            }
        }

        match (&spec.scope, spec.resource_type.requires_scope()) {
            (None, true) => {
                return Err(invalid(format!(
                    "'{}' is a {} and needs a parent scope",
                    spec.id, spec.resource_type
                )));
            }
            (Some(parent), false) => {
                return Err(invalid(format!(
                    "'{}' cannot be scoped under '{}'",
                    spec.id, parent
                )));
            }
            (Some(parent), true) if !spec.dependencies.contains(parent) => {
                return Err(invalid(format!(
                    "'{}' is scoped under '{}' without depending on it",
                    spec.id, parent
                )));
            }
            _ => {}
        }

        for reference in placeholder::references(&spec.attributes) {
            if !spec.dependencies.contains(reference.target()) {
                return Err(invalid(format!(
                    "'{}' references '{}' without declaring it as a dependency",
                    spec.id,
                    reference.target()
                )));
            }
        }

        let key_attribute = spec.resource_type.natural_key_attribute();
        match spec.attributes.get(key_attribute).and_then(|v| v.as_str()) {
            Some(value) if value == spec.natural_key => Ok(()),
            _ => Err(invalid(format!(
                "'{}' must carry its natural key '{}' in attribute '{}'",
                spec.id, spec.natural_key, key_attribute
            ))),
        }
    }

    /// Depth-first topological sort
    fn topological_sort(
        spec: &ResourceSpec,
        by_id: &HashMap<SpecId, &ResourceSpec>,
        order: &mut Vec<SpecId>,
        visited: &mut HashSet<SpecId>,
        visiting: &mut HashSet<SpecId>,
    ) -> ProvisionResult<()> {
        if visited.contains(&spec.id) {
            return Ok(());
        }

        if !visiting.insert(spec.id.clone()) {
            return Err(invalid(format!(
                "circular dependency detected involving '{}'",
                spec.id
            )));
        }

        for dep in &spec.dependencies {
            if let Some(dep_spec) = by_id.get(dep) {
                Self::topological_sort(dep_spec, by_id, order, visited, visiting)?;
            }
        }

        visiting.remove(&spec.id);
        visited.insert(spec.id.clone());
        order.push(spec.id.clone());

        Ok(())
    }

    /// Specs in the order they must be reconciled
    pub fn specs(&self) -> &[ResourceSpec] {
        &self.specs
    }

    pub fn get(&self, id: &SpecId) -> Option<&ResourceSpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Resources to delete on teardown: reverse declaration order, skipping
    /// anything removed together with its parent
    pub fn teardown_targets(&self) -> Vec<HandleKey> {
        self.specs
            .iter()
            .rev()
            .filter(|spec| spec.resource_type.is_deletable())
            .map(|spec| spec.handle_key())
            .collect()
    }

    /// Format the plan as a dependency list for display
    pub fn format_tree(&self) -> String {
        let mut output = String::new();

        for (i, spec) in self.specs.iter().enumerate() {
            output.push_str(&format!(
                "{:>2}. {} ({}) [{}]\n",
                i + 1,
                spec.natural_key,
                spec.resource_type,
                spec.id
            ));

            let dep_count = spec.dependencies.len();
            for (j, dep) in spec.dependencies.iter().enumerate() {
                let connector = if j == dep_count - 1 { "└── " } else { "├── " };
                let marker = if spec.scope.as_ref() == Some(dep) {
                    " (scope)"
                } else {
                    ""
                };
                output.push_str(&format!("    {}{}{}\n", connector, dep, marker));
            }
        }

        output
    }
}

fn invalid(message: String) -> ProvisionError {
    ProvisionError::InvalidPlan(message)
}
