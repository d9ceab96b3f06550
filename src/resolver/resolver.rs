// Mon Oct 19 2026 - Alex

use crate::abi::FundamentalKind;
use crate::error::LayoutError;
use crate::registry::{Definition, ScopeId, TagKind, TypeRegistry};
use crate::resolver::declarator::{Declaration, Declarator, EnumDecl, RecordDecl};
use crate::types::{AggregateType, BaseSpec, EnumType, Member, TypeDescriptor, TypeId};
use crate::utils::logging::ScopedTimer;

/// What a best-effort pass over a source unit produced.
#[derive(Debug, Default)]
pub struct ResolveOutcome {
    /// Ids of the top-level declarations that resolved, in source order.
    pub resolved: Vec<TypeId>,
    pub errors: Vec<LayoutError>,
}

impl ResolveOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Turns declarator trees into descriptors bound in a [`TypeRegistry`].
pub struct DeclarationResolver<'r> {
    registry: &'r mut TypeRegistry,
    /// Named aggregates whose bodies are being resolved, outermost first.
    defining: Vec<TypeId>,
    /// Failures inside nested declarations that did not abort their parent.
    deferred: Vec<LayoutError>,
}

impl<'r> DeclarationResolver<'r> {
    pub fn new(registry: &'r mut TypeRegistry) -> Self {
        Self {
            registry,
            defining: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Resolve a whole unit. A failing declaration is logged and left
    /// incomplete; independent declarations still resolve.
    pub fn resolve_unit(&mut self, declarations: &[Declaration]) -> ResolveOutcome {
        let _timer = ScopedTimer::new("resolve unit");
        let mut outcome = ResolveOutcome::default();

        for declaration in declarations {
            if let Err(err) = self.predeclare(ScopeId::GLOBAL, declaration) {
                log::warn!("forward declaration failed: {}", err);
                outcome.errors.push(err);
            }
        }

        for declaration in declarations {
            match self.resolve_declaration(ScopeId::GLOBAL, declaration) {
                Ok(Some(id)) => outcome.resolved.push(id),
                Ok(None) => {}
                Err(err) => {
                    log::warn!("skipping declaration {}: {}", declaration.name().unwrap_or("(anonymous)"), err);
                    outcome.errors.push(err);
                }
            }
            outcome.errors.append(&mut self.deferred);
        }

        log::debug!(
            "resolved {} of {} declarations ({} errors)",
            outcome.resolved.len(),
            declarations.len(),
            outcome.errors.len()
        );
        outcome
    }

    /// First pass: bind every named record and enum as a forward tag so
    /// pointers can refer to types declared later in the unit.
    fn predeclare(&mut self, scope: ScopeId, declaration: &Declaration) -> Result<(), LayoutError> {
        match declaration {
            Declaration::Record(record) => self.predeclare_record(scope, record),
            Declaration::Forward { tag, name } => self.registry.declare(scope, name, (*tag).into()).map(|_| ()),
            Declaration::Enum(EnumDecl { name: Some(name), .. }) => {
                self.registry.declare(scope, name, TagKind::Enum).map(|_| ())
            }
            Declaration::Enum(_) => Ok(()),
            Declaration::Typedef { target, .. } => self.predeclare_declarator(scope, target),
        }
    }

    fn predeclare_record(&mut self, scope: ScopeId, record: &RecordDecl) -> Result<(), LayoutError> {
        let body = match &record.name {
            Some(name) => {
                let id = self.registry.declare(scope, name, TagKind::Aggregate(record.tag))?;
                self.registry.entry(id).body_scope().unwrap_or(scope)
            }
            None => scope,
        };
        for nested in &record.nested {
            self.predeclare(body, nested)?;
        }
        for member in &record.members {
            self.predeclare_declarator(body, &member.ty)?;
        }
        Ok(())
    }

    fn predeclare_declarator(&mut self, scope: ScopeId, declarator: &Declarator) -> Result<(), LayoutError> {
        match declarator {
            Declarator::Record(record) => self.predeclare_record(scope, record),
            Declarator::Enum(EnumDecl { name: Some(name), .. }) => {
                self.registry.declare(scope, name, TagKind::Enum).map(|_| ())
            }
            Declarator::Pointer { pointee: inner } | Declarator::Array { element: inner, .. } => {
                self.predeclare_declarator(scope, inner)
            }
            _ => Ok(()),
        }
    }

    /// Second pass for one declaration. Returns the id it bound, if named.
    pub fn resolve_declaration(&mut self, scope: ScopeId, declaration: &Declaration) -> Result<Option<TypeId>, LayoutError> {
        match declaration {
            Declaration::Record(record) => match self.resolve_record(scope, record)? {
                TypeDescriptor::NamedRef(id) => Ok(Some(id)),
                _ => Ok(None),
            },
            Declaration::Forward { tag, name } => self.registry.declare(scope, name, (*tag).into()).map(Some),
            Declaration::Enum(decl) => match self.resolve_enum(scope, decl)? {
                TypeDescriptor::NamedRef(id) => Ok(Some(id)),
                _ => Ok(None),
            },
            Declaration::Typedef { name, target } => {
                let ty = self.resolve_declarator(scope, target)?;
                log::trace!("typedef {} = {}", name, self.registry.type_name(&ty));
                self.registry.define(scope, name, Definition::Typedef(ty)).map(Some)
            }
        }
    }

    /// Resolve a declarator to a descriptor. Pointers and arrays do not
    /// require their target to be complete.
    pub fn resolve_declarator(&mut self, scope: ScopeId, declarator: &Declarator) -> Result<TypeDescriptor, LayoutError> {
        match declarator {
            Declarator::Fundamental { spelling } => FundamentalKind::from_spelling(spelling)
                .map(TypeDescriptor::Fundamental)
                .ok_or_else(|| LayoutError::UnknownType(spelling.clone())),
            Declarator::Named { name } => match self.registry.find(scope, name) {
                Ok(id) => Ok(TypeDescriptor::NamedRef(id)),
                Err(err) => FundamentalKind::from_spelling(name)
                    .map(TypeDescriptor::Fundamental)
                    .ok_or(err),
            },
            Declarator::Pointer { pointee } => Ok(TypeDescriptor::pointer_to(self.resolve_declarator(scope, pointee)?)),
            Declarator::Array { element, count } => {
                Ok(TypeDescriptor::array_of(self.resolve_declarator(scope, element)?, *count))
            }
            Declarator::Record(record) => self.resolve_record(scope, record),
            Declarator::Enum(decl) => self.resolve_enum(scope, decl),
        }
    }

    fn resolve_enum(&mut self, scope: ScopeId, decl: &EnumDecl) -> Result<TypeDescriptor, LayoutError> {
        let underlying = match &decl.underlying {
            Some(spelling) => match FundamentalKind::from_spelling(spelling) {
                Some(kind) if kind.is_integral() => Some(kind),
                _ => return Err(LayoutError::UnknownType(format!("enum underlying type `{}`", spelling))),
            },
            None => None,
        };
        let ty = EnumType::new(decl.name.clone(), underlying);
        match &decl.name {
            Some(name) => self.registry.define(scope, name, Definition::Enum(ty)).map(TypeDescriptor::NamedRef),
            None => Ok(TypeDescriptor::Enum(ty)),
        }
    }

    fn resolve_record(&mut self, scope: ScopeId, record: &RecordDecl) -> Result<TypeDescriptor, LayoutError> {
        let (id, body) = match &record.name {
            Some(name) => {
                let id = self.registry.declare(scope, name, TagKind::Aggregate(record.tag))?;
                if self.registry.entry(id).is_complete() {
                    return Err(LayoutError::DuplicateDefinition(self.registry.qualified_name(id)));
                }
                (Some(id), self.registry.entry(id).body_scope().unwrap_or(scope))
            }
            None => (None, scope),
        };

        if let Some(id) = id {
            self.defining.push(id);
        }
        let body_result = self.resolve_body(scope, body, record);
        if id.is_some() {
            self.defining.pop();
        }
        let aggregate = body_result?;

        match &record.name {
            Some(name) => {
                let id = self.registry.define(scope, name, Definition::Aggregate(aggregate))?;
                log::trace!("defined {}", self.registry.display_name(id));
                Ok(TypeDescriptor::NamedRef(id))
            }
            None => Ok(TypeDescriptor::Aggregate(Box::new(aggregate))),
        }
    }

    fn resolve_body(&mut self, scope: ScopeId, body: ScopeId, record: &RecordDecl) -> Result<AggregateType, LayoutError> {
        for nested in &record.nested {
            if let Err(err) = self.resolve_declaration(body, nested) {
                log::warn!("nested declaration {} failed: {}", nested.name().unwrap_or("(anonymous)"), err);
                self.deferred.push(err);
            }
        }

        let mut aggregate = AggregateType::new(record.tag, record.name.as_deref());
        aggregate.virtual_functions = record.virtual_functions.clone();

        for base in &record.bases {
            let base_id = self.registry.find(scope, &base.name)?;
            let target = self.follow_typedefs(TypeDescriptor::NamedRef(base_id));
            match target {
                TypeDescriptor::NamedRef(target_id) => match self.registry.definition(target_id)? {
                    Definition::Aggregate(agg) if !agg.kind.is_union() => {}
                    _ => return Err(LayoutError::UnknownType(format!("base class `{}`", base.name))),
                },
                _ => return Err(LayoutError::UnknownType(format!("base class `{}`", base.name))),
            }
            let ty = TypeDescriptor::NamedRef(base_id);
            aggregate.bases.push(if base.is_virtual { BaseSpec::virtual_base(ty) } else { BaseSpec::new(ty) });
        }

        for member in &record.members {
            let ty = self
                .resolve_declarator(body, &member.ty)
                .map_err(|err| err.in_member(&member.name))?;
            self.check_member(&ty, &member.name)?;
            aggregate.members.push(Member {
                name: member.name.clone(),
                ty,
                bit_width: member.bit_width,
            });
        }
        Ok(aggregate)
    }

    /// Reject by-value self containment and by-value members of forward-only types.
    fn check_member(&self, ty: &TypeDescriptor, member: &str) -> Result<(), LayoutError> {
        let element = self.follow_typedefs(ty.innermost_element().clone());
        let element = self.follow_typedefs(element.innermost_element().clone());
        if let TypeDescriptor::NamedRef(id) = element {
            if self.defining.contains(&id) {
                return Err(LayoutError::CyclicAggregate {
                    aggregate: self.registry.qualified_name(id),
                    member: member.to_string(),
                });
            }
        }

        if matches!(ty, TypeDescriptor::Array(..)) {
            return Ok(());
        }
        match self.follow_typedefs(ty.clone()) {
            TypeDescriptor::NamedRef(id) => self.registry.definition(id).map(|_| ()).map_err(|err| err.in_member(member)),
            TypeDescriptor::Fundamental(FundamentalKind::Void) => Err(LayoutError::incomplete_member("void", member)),
            _ => Ok(()),
        }
    }

    /// Peel typedef indirections off a descriptor, stopping at anything else.
    fn follow_typedefs(&self, mut ty: TypeDescriptor) -> TypeDescriptor {
        while let TypeDescriptor::NamedRef(id) = ty {
            match self.registry.entry(id).definition() {
                Some(Definition::Typedef(target)) => ty = target.clone(),
                _ => break,
            }
        }
        ty
    }
}

/// Build a registry (with the standard typedef prelude) from `declarations`.
pub fn resolve_declarations(declarations: &[Declaration]) -> (TypeRegistry, ResolveOutcome) {
    let mut registry = TypeRegistry::with_prelude();
    let outcome = DeclarationResolver::new(&mut registry).resolve_unit(declarations);
    (registry, outcome)
}
