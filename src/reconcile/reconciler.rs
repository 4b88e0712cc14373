use super::context::RunContext;
use super::resolver::{Resolution, Resolver};
use crate::api::{ApiClient, Method};
use crate::error::{ProvisionError, ProvisionResult};
use crate::report::{Operation, Outcome};
use crate::resources::placeholder::{self, Placeholder};
use crate::resources::{Plan, RemoteId, ResourceSpec, SpecId};
use serde_json::Value;

/// A reconcile run that stopped at an unrecoverable spec
#[derive(Debug, thiserror::Error)]
#[error("Provisioning stopped at '{spec}': {error}")]
pub struct ReconcileFailure {
    pub spec: SpecId,
    #[source]
    pub error: ProvisionError,
    /// Everything resolved or created before the failure
    pub context: RunContext,
}

/// Resolve-then-create driver over a plan
pub struct Reconciler<'a> {
    client: &'a dyn ApiClient,
    resolver: Resolver<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self {
            client,
            resolver: Resolver::new(client),
        }
    }

    /// Bring every spec of `plan` into existence, in order.
    ///
    /// Existing resources are adopted as they are. The first failure aborts
    /// the run, since every later spec may depend on the failed one.
    pub fn reconcile(&self, plan: &Plan) -> Result<RunContext, Box<ReconcileFailure>> {
        self.reconcile_as(plan, Operation::Apply)
    }

    pub fn reconcile_as(
        &self,
        plan: &Plan,
        operation: Operation,
    ) -> Result<RunContext, Box<ReconcileFailure>> {
        let mut context = RunContext::new(operation);

        for spec in plan.specs() {
            let key = spec.handle_key();
            context.track(&key);

            if let Err(error) = self.reconcile_spec(plan, spec, &mut context) {
                tracing::error!(spec = %spec.id, %key, %error, "provisioning failed");
                context.mark_failed(&key, &error);
                return Err(Box::new(ReconcileFailure {
                    spec: spec.id.clone(),
                    error,
                    context,
                }));
            }
        }

        Ok(context)
    }

    fn reconcile_spec(
        &self,
        plan: &Plan,
        spec: &ResourceSpec,
        context: &mut RunContext,
    ) -> ProvisionResult<()> {
        let key = spec.handle_key();
        let payload = materialize(plan, spec, context)?;
        let scope = scope_id(plan, spec, context)?;

        match self
            .resolver
            .resolve(spec.resource_type, &spec.natural_key, scope)?
        {
            Resolution::Found(id) => {
                tracing::info!(%key, %id, "resource already exists");
                context.mark_found(&key, id)
            }
            Resolution::NotFound => {
                let id = self.create(spec, scope, &payload)?;
                tracing::info!(%key, %id, "resource created");
                context.mark_created(&key, id)
            }
        }
    }

    fn create(
        &self,
        spec: &ResourceSpec,
        scope: Option<RemoteId>,
        payload: &Value,
    ) -> ProvisionResult<RemoteId> {
        let path = spec.resource_type.create_path(scope)?;
        let response = self.client.execute(Method::Post, &path, Some(payload))?;

        response
            .get(spec.resource_type.created_key())
            .and_then(|created| created.get("id"))
            .and_then(RemoteId::from_json)
            .ok_or_else(|| ProvisionError::MissingRemoteId {
                resource_type: spec.resource_type,
                natural_key: spec.natural_key.clone(),
            })
    }

    /// Resolve every spec without creating anything.
    ///
    /// Specs whose dependencies do not exist yet are reported as pending.
    /// Lookup failures are reported per spec and do not stop the preview.
    pub fn preview(&self, plan: &Plan) -> RunContext {
        let mut context = RunContext::new(Operation::Status);

        for spec in plan.specs() {
            let key = spec.handle_key();
            context.track(&key);

            let waiting_on: Vec<String> = spec
                .dependencies
                .iter()
                .filter(|dep| {
                    plan.get(dep)
                        .and_then(|d| context.remote_id(&d.handle_key()))
                        .is_none()
                })
                .map(|dep| dep.to_string())
                .collect();
            if !waiting_on.is_empty() {
                context.note(&key, Outcome::Pending { waiting_on });
                continue;
            }

            let resolution = materialize(plan, spec, &context)
                .and_then(|_| scope_id(plan, spec, &context))
                .and_then(|scope| {
                    self.resolver
                        .resolve(spec.resource_type, &spec.natural_key, scope)
                });

            let recorded = match resolution {
                Ok(Resolution::Found(id)) => context.mark_found(&key, id),
                Ok(Resolution::NotFound) => {
                    context.note(&key, Outcome::WouldCreate);
                    Ok(())
                }
                Err(error) => Err(error),
            };
            if let Err(error) = recorded {
                tracing::warn!(%key, %error, "could not check resource");
                context.mark_failed(&key, &error);
            }
        }

        context
    }
}

/// The spec's attributes with every placeholder replaced
pub fn materialize(
    plan: &Plan,
    spec: &ResourceSpec,
    context: &RunContext,
) -> ProvisionResult<Value> {
    placeholder::substitute(&spec.attributes, &mut |reference: &Placeholder| {
        let dependency = dependency_of(plan, spec, reference.target())?;
        let id = resolved_id(spec, dependency, context)?;
        Ok(match reference {
            Placeholder::RemoteId(_) => Value::from(id),
            Placeholder::NaturalKey(_) => Value::String(dependency.natural_key.clone()),
        })
    })
}

fn scope_id(
    plan: &Plan,
    spec: &ResourceSpec,
    context: &RunContext,
) -> ProvisionResult<Option<RemoteId>> {
    spec.scope
        .as_ref()
        .map(|parent| {
            let dependency = dependency_of(plan, spec, parent)?;
            resolved_id(spec, dependency, context)
        })
        .transpose()
}

fn dependency_of<'p>(
    plan: &'p Plan,
    spec: &ResourceSpec,
    id: &SpecId,
) -> ProvisionResult<&'p ResourceSpec> {
    plan.get(id).ok_or_else(|| ProvisionError::UnresolvedDependency {
        spec: spec.id.to_string(),
        dependency: id.to_string(),
    })
}

fn resolved_id(
    spec: &ResourceSpec,
    dependency: &ResourceSpec,
    context: &RunContext,
) -> ProvisionResult<RemoteId> {
    context
        .remote_id(&dependency.handle_key())
        .ok_or_else(|| ProvisionError::UnresolvedDependency {
            spec: spec.id.to_string(),
            dependency: dependency.id.to_string(),
        })
}
