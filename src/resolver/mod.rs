//! Super-type attribute resolution.
//!
//! Starting from one type, fetch its definition, append its attributes and
//! fetch every super-type the same way. All fetches of a run live in one
//! task group that the run drains; the `PendingFetches` barrier fires the
//! completion callback when the last of them settles.
//!
//! Failed lookups are swallowed: that branch's attributes are simply absent.
//!
//! Each lookup carries the chain of type names that led to it. A super-type
//! already on its own chain is a cycle and is not fetched again; a shared
//! ancestor reached on two separate paths still is.

mod barrier;

pub use barrier::{PendingFetches, ResolutionState};

use crate::catalog::CatalogTypeService;
use crate::config::{ResolverOptions, SuperTypePolicy};
use crate::error::Result;
use crate::types::{AttributeDefinition, TypeDefinition, TypeName};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;

/// Outcome of one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedAttributes {
    /// Attributes of the root type and every reached super-type, in the
    /// order their lookups settled.
    pub attributes: Vec<AttributeDefinition>,
    pub fetches_issued: usize,
    pub fetches_failed: usize,
    /// Super-types not fetched because they lay below `max_depth`.
    pub depth_limited: usize,
    /// Super-types not fetched because they already appear on their own
    /// inheritance chain.
    pub cycle_skipped: usize,
}

impl ResolvedAttributes {
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

/// A settled lookup: the chain from the root down to the fetched type, and
/// what came back.
struct Settled {
    chain: Vec<TypeName>,
    outcome: Result<TypeDefinition>,
}


pub struct AttributeResolver<S> {
    service: S,
    options: ResolverOptions,
}

impl<S: CatalogTypeService> AttributeResolver<S> {
    pub fn new(service: S) -> Self {
        Self::with_options(service, ResolverOptions::default())
    }

    pub fn with_options(service: S, options: ResolverOptions) -> Self {
        Self { service, options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Resolve without a completion callback.
    ///
    /// Returns `None`, without fetching anything, when `type_name` is absent
    /// or blank.
    pub async fn resolve(&self, type_name: Option<&str>) -> Option<ResolvedAttributes> {
        self.resolve_with(type_name, |_| {}).await
    }

    /// Resolve and call `on_complete` once, when the last issued lookup has
    /// settled, with the attributes accumulated so far.
    ///
    /// Absent or blank `type_name` is a no-op: no lookup, no callback, `None`.
    #[tracing::instrument(skip(self, on_complete))]
    pub async fn resolve_with<F>(
        &self,
        type_name: Option<&str>,
        on_complete: F,
    ) -> Option<ResolvedAttributes>
    where
        F: FnOnce(&[AttributeDefinition]) + Send,
    {
        let root = match type_name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(root) => root.to_string(),
            None => {
                tracing::debug!("no type name, nothing to resolve");
                return None;
            }
        };

        let mut state = ResolutionState::new();
        let mut seen: HashSet<TypeName> = HashSet::new();
        let mut on_complete = Some(on_complete);
        let mut in_flight = FuturesUnordered::new();

        seen.insert(root.clone());
        state.barrier_mut().issue();
        in_flight.push(self.fetch(vec![root]));

        while let Some(Settled { chain, outcome }) = in_flight.next().await {
            let type_name = chain.last().map(String::as_str).unwrap_or_default();
            let depth = chain.len().saturating_sub(1);

            match outcome {
                Ok(definition) => {
                    tracing::debug!(
                        type_name = %type_name,
                        depth,
                        attributes = definition.attribute_definitions.len(),
                        super_types = definition.super_types.len(),
                        "type settled"
                    );
                    state.append(definition.attribute_definitions);
                    for super_type in definition.super_types {
                        if chain.contains(&super_type) {
                            tracing::warn!(
                                type_name = %type_name,
                                super_type = %super_type,
                                "super-type already on its own chain, cycle cut"
                            );
                            state.record_cycle_skipped();
                            continue;
                        }
                        if depth + 1 > self.options.max_depth {
                            tracing::warn!(
                                type_name = %type_name,
                                super_type = %super_type,
                                max_depth = self.options.max_depth,
                                "super-type below max depth, not fetched"
                            );
                            state.record_depth_limited();
                            continue;
                        }
                        if self.options.super_type_policy == SuperTypePolicy::OncePerType
                            && !seen.insert(super_type.clone())
                        {
                            continue;
                        }
                        let mut chain = chain.clone();
                        chain.push(super_type);
                        state.barrier_mut().issue();
                        in_flight.push(self.fetch(chain));
                    }
                }
                Err(e) => {
                    tracing::warn!(type_name = %type_name, error = %e, "type lookup failed, branch omitted");
                    state.record_failure();
                }
            }

            let drained = state.barrier_mut().settle();
            debug_assert_eq!(state.pending(), in_flight.len());
            if drained {
                if let Some(callback) = on_complete.take() {
                    callback(state.accumulated());
                }
            }
        }

        tracing::debug!(
            issued = state.issued(),
            failed = state.failed(),
            attributes = state.accumulated().len(),
            "resolution complete"
        );

        Some(ResolvedAttributes {
            fetches_issued: state.issued(),
            fetches_failed: state.failed(),
            depth_limited: state.depth_limited(),
            cycle_skipped: state.cycle_skipped(),
            attributes: state.into_accumulated(),
        })
    }

    fn fetch(&self, chain: Vec<TypeName>) -> impl Future<Output = Settled> + Send + '_ {
        async move {
            let outcome = match chain.last() {
                Some(type_name) => self.service.get_type_definition(type_name).await,
                None => Ok(TypeDefinition::default()),
            };
            Settled { chain, outcome }
        }
    }
}
