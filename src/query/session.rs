// Mon Oct 19 2026 - Alex

use crate::abi::AbiProfile;
use crate::error::LayoutError;
use crate::layout::{CacheStats, LayoutCache, LayoutEngine, LayoutResult, PolicyKind};
use crate::query::expression::TypeExpression;
use crate::query::report::LayoutReport;
use crate::registry::{Definition, TypeRegistry};
use crate::resolver::{resolve_declarations, ResolveOutcome, SourceUnit};
use crate::types::{TypeDescriptor, TypeId};
use crate::utils::logging::ScopedTimer;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::Arc;

/// A frozen registry together with the layouts computed against it.
#[derive(Debug)]
pub struct Snapshot {
    registry: TypeRegistry,
    cache: LayoutCache,
    generation: u64,
}

impl Snapshot {
    fn new(registry: TypeRegistry, generation: u64) -> Self {
        Self {
            registry,
            cache: LayoutCache::new(),
            generation,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn engine<'s>(&'s self, profile: &'s AbiProfile, options: QueryOptions) -> LayoutEngine<'s> {
        let engine = LayoutEngine::new(&self.registry, profile).with_policy(options.policy.policy());
        if options.cache_layouts {
            engine.with_cache(&self.cache)
        } else {
            engine
        }
    }

    fn resolve(&self, expression: &str) -> Result<(TypeExpression, TypeDescriptor), LayoutError> {
        let parsed = TypeExpression::parse(expression)?;
        let ty = parsed.resolve(&self.registry)?;
        Ok((parsed, ty))
    }

    fn layout(&self, expression: &str, profile: &AbiProfile, options: QueryOptions) -> Result<Arc<LayoutResult>, LayoutError> {
        let (_, ty) = self.resolve(expression)?;
        self.engine(profile, options).layout(&ty)
    }

    fn report(&self, expression: &str, profile: &AbiProfile, options: QueryOptions) -> Result<LayoutReport, LayoutError> {
        let (parsed, ty) = self.resolve(expression)?;
        let layout = self.engine(profile, options).layout(&ty)?;
        let name = match &ty {
            TypeDescriptor::NamedRef(id) => self.registry.display_name(*id),
            _ => parsed.to_string(),
        };
        Ok(LayoutReport::new(&name, &layout, profile, self.describe(&ty)))
    }

    fn report_named(&self, id: TypeId, profile: &AbiProfile, options: QueryOptions) -> Result<LayoutReport, LayoutError> {
        let layout = self.engine(profile, options).layout_named(id)?;
        Ok(LayoutReport::new(&self.registry.display_name(id), &layout, profile, None))
    }

    /// Hover text for fundamentals, looking through typedefs such as `size_t`.
    fn describe(&self, ty: &TypeDescriptor) -> Option<&'static str> {
        let mut ty = ty;
        loop {
            match ty {
                TypeDescriptor::Fundamental(kind) => return Some(kind.description()),
                TypeDescriptor::NamedRef(id) => match self.registry.entry(*id).definition() {
                    Some(Definition::Typedef(target)) => ty = target,
                    _ => return None,
                },
                _ => return None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueryOptions {
    policy: PolicyKind,
    cache_layouts: bool,
}

/// Query surface over copy-on-write registry snapshots.
///
/// Queries clone the current snapshot `Arc` and run without further locking;
/// [`install`](Self::install) swaps in a new snapshot with an empty cache
/// while in-flight queries finish against the one they started with.
pub struct LayoutSession {
    current: RwLock<Arc<Snapshot>>,
    options: QueryOptions,
}

impl LayoutSession {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::new(registry, 0))),
            options: QueryOptions {
                policy: PolicyKind::default(),
                cache_layouts: true,
            },
        }
    }

    /// Resolve `unit` into a fresh session; resolution errors are returned, not fatal.
    pub fn from_unit(unit: &SourceUnit) -> (Self, ResolveOutcome) {
        let (registry, outcome) = resolve_declarations(&unit.declarations);
        (Self::new(registry), outcome)
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.options.policy = policy;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.options.cache_layouts = enabled;
        self
    }

    pub fn policy(&self) -> PolicyKind {
        self.options.policy
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Swap in a new registry; returns the new generation.
    pub fn install(&self, registry: TypeRegistry) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation + 1;
        *current = Arc::new(Snapshot::new(registry, generation));
        log::info!("installed registry snapshot {}", generation);
        generation
    }

    /// Re-resolve an edited unit and install the result.
    pub fn reload(&self, unit: &SourceUnit) -> ResolveOutcome {
        let (registry, outcome) = resolve_declarations(&unit.declarations);
        self.install(registry);
        outcome
    }

    pub fn layout_of(&self, expression: &str, profile: &AbiProfile) -> Result<LayoutReport, LayoutError> {
        self.snapshot().report(expression, profile, self.options)
    }

    /// The engine result behind [`layout_of`](Self::layout_of); named
    /// aggregates come back as the shared cached value.
    pub fn layout_result(&self, expression: &str, profile: &AbiProfile) -> Result<Arc<LayoutResult>, LayoutError> {
        self.snapshot().layout(expression, profile, self.options)
    }

    /// Run many queries in parallel against one snapshot, preserving input order.
    pub fn layout_many<S>(&self, expressions: &[S], profile: &AbiProfile) -> Vec<Result<LayoutReport, LayoutError>>
    where
        S: AsRef<str> + Sync,
    {
        let snapshot = self.snapshot();
        let options = self.options;
        expressions
            .par_iter()
            .map(|expression| snapshot.report(expression.as_ref(), profile, options))
            .collect()
    }

    /// Reports for every defined named aggregate, in declaration order.
    pub fn dump(&self, profile: &AbiProfile) -> Vec<(String, Result<LayoutReport, LayoutError>)> {
        let _timer = ScopedTimer::new("dump aggregates");
        let snapshot = self.snapshot();
        let options = self.options;
        snapshot
            .registry()
            .defined_aggregates()
            .into_par_iter()
            .map(|id| (snapshot.registry().qualified_name(id), snapshot.report_named(id, profile, options)))
            .collect()
    }
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new(TypeRegistry::with_prelude())
    }
}
