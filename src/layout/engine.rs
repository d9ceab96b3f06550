// Mon Oct 19 2026 - Alex

use crate::abi::{AbiProfile, Alignment, FundamentalKind, ProfileKey};
use crate::error::LayoutError;
use crate::layout::bitfield::{BitfieldPacker, StorageUnit};
use crate::layout::cache::LayoutCache;
use crate::layout::policy::{BaseLayoutPolicy, PolicyKind};
use crate::layout::result::{
    BaseSubobject, FieldLayout, LayoutFlags, LayoutResult, PaddingRegion, StorageNote, VtablePointer,
};
use crate::registry::{Definition, TypeRegistry};
use crate::types::{AggregateType, Member, TypeDescriptor, TypeId};
use std::sync::Arc;

/// Running placement state of one aggregate.
#[derive(Debug, Default)]
struct Cursor {
    offset: u64,
    align: Alignment,
    padding: Vec<PaddingRegion>,
}

impl Cursor {
    /// Move to `target`, recording the skipped bytes as padding.
    fn pad_to(&mut self, target: u64) {
        if target > self.offset {
            self.padding.push(PaddingRegion { offset: self.offset, size: target - self.offset });
            self.offset = target;
        }
    }

    fn raise(&mut self, align: Alignment) {
        self.align = self.align.max(align);
    }
}

fn overflow(aggregate: &str, member: &str) -> LayoutError {
    LayoutError::SizeOverflow { aggregate: aggregate.to_string(), member: member.to_string() }
}

/// Aggregate on the in-progress stack, with the member being laid out.
#[derive(Debug)]
struct Frame {
    id: TypeId,
    member: Option<String>,
}

struct BaseInfo {
    id: TypeId,
    name: String,
    is_virtual: bool,
    layout: Arc<LayoutResult>,
}

/// Computes sizes, alignments and offsets for descriptors of one registry
/// under one ABI profile.
///
/// The engine only reads the registry; it may be created per query and
/// shares results through an optional [`LayoutCache`].
pub struct LayoutEngine<'a> {
    registry: &'a TypeRegistry,
    profile: &'a AbiProfile,
    profile_key: ProfileKey,
    policy: &'a dyn BaseLayoutPolicy,
    cache: Option<&'a LayoutCache>,
    in_progress: Vec<Frame>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(registry: &'a TypeRegistry, profile: &'a AbiProfile) -> Self {
        Self {
            registry,
            profile,
            profile_key: profile.key(),
            policy: PolicyKind::default().policy(),
            cache: None,
            in_progress: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: &'a dyn BaseLayoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache(mut self, cache: &'a LayoutCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn profile(&self) -> &AbiProfile {
        self.profile
    }

    pub fn policy(&self) -> &dyn BaseLayoutPolicy {
        self.policy
    }

    pub fn layout(&mut self, ty: &TypeDescriptor) -> Result<Arc<LayoutResult>, LayoutError> {
        match ty {
            TypeDescriptor::Fundamental(kind) => self.fundamental(*kind).map(Arc::new),
            TypeDescriptor::Pointer(_) => Ok(Arc::new(LayoutResult::scalar(
                self.profile.pointer_size(),
                self.profile.pointer_align(),
            ))),
            TypeDescriptor::Array(element, count) => {
                let element_layout = self.layout(element)?;
                if element_layout.size == 0 {
                    return Err(LayoutError::InvalidArrayElement(self.registry.type_name(element)));
                }
                let size = element_layout
                    .size
                    .checked_mul(*count)
                    .ok_or_else(|| LayoutError::InvalidArrayElement(self.registry.type_name(ty)))?;
                Ok(Arc::new(LayoutResult::scalar(size, element_layout.alignment)))
            }
            TypeDescriptor::Enum(e) => self.fundamental(e.underlying).map(Arc::new),
            TypeDescriptor::Aggregate(agg) => {
                let owner = agg.display_name();
                self.aggregate(agg, owner).map(Arc::new)
            }
            TypeDescriptor::NamedRef(id) => self.layout_named(*id),
        }
    }

    /// Layout of a registry entry. Aggregates are cached when a cache is attached.
    pub fn layout_named(&mut self, id: TypeId) -> Result<Arc<LayoutResult>, LayoutError> {
        let registry = self.registry;
        match registry.definition(id)? {
            Definition::Typedef(target) => self.layout(target),
            Definition::Enum(e) => self.fundamental(e.underlying).map(Arc::new),
            Definition::Aggregate(agg) => {
                // The recurring aggregate's own frame holds the member that leads into the cycle.
                if let Some(frame) = self.in_progress.iter().find(|frame| frame.id == id) {
                    return Err(LayoutError::CyclicAggregate {
                        aggregate: registry.qualified_name(id),
                        member: frame.member.clone().unwrap_or_default(),
                    });
                }

                let key = (id, self.profile_key, self.policy.name());
                if let Some(hit) = self.cache.and_then(|cache| cache.get(&key)) {
                    return Ok(hit);
                }

                self.in_progress.push(Frame { id, member: None });
                let result = self.aggregate(agg, registry.qualified_name(id));
                self.in_progress.pop();

                let layout = Arc::new(result?);
                Ok(match self.cache {
                    Some(cache) => cache.insert(key, layout),
                    None => layout,
                })
            }
        }
    }

    fn fundamental(&self, kind: FundamentalKind) -> Result<LayoutResult, LayoutError> {
        match (self.profile.size_of(kind), self.profile.align_of(kind)) {
            (Some(size), Some(align)) => Ok(LayoutResult::scalar(size, align)),
            _ => Err(LayoutError::incomplete(kind.spelling())),
        }
    }

    fn enter_member(&mut self, name: &str) {
        if let Some(frame) = self.in_progress.last_mut() {
            frame.member = Some(name.to_string());
        }
    }

    /// Follow typedef entries until a non-typedef descriptor is reached.
    fn strip_typedefs<'t>(&self, mut ty: &'t TypeDescriptor) -> &'t TypeDescriptor
    where
        'a: 't,
    {
        let registry: &'a TypeRegistry = self.registry;
        while let TypeDescriptor::NamedRef(id) = ty {
            match registry.entry(*id).definition() {
                Some(Definition::Typedef(target)) => ty = target,
                _ => break,
            }
        }
        ty
    }

    /// Storage unit of a bit-field's declared type; enums use their underlying type.
    fn storage_unit(&self, member: &Member) -> Result<StorageUnit, LayoutError> {
        let unsupported = || LayoutError::UnsupportedBitfieldType {
            member: member.name.clone(),
            ty: self.registry.type_name(&member.ty),
        };
        let kind = match self.strip_typedefs(&member.ty) {
            TypeDescriptor::Fundamental(kind) => *kind,
            TypeDescriptor::Enum(e) => e.underlying,
            TypeDescriptor::NamedRef(id) => match self.registry.definition(*id).map_err(|e| e.in_member(&member.name))? {
                Definition::Enum(e) => e.underlying,
                _ => return Err(unsupported()),
            },
            _ => return Err(unsupported()),
        };
        if !kind.is_integral() {
            return Err(unsupported());
        }
        let class = self.profile.class_of(kind).ok_or_else(unsupported)?;
        let layout = self.profile.layout_of(class);
        Ok(StorageUnit { class, size: layout.size, align: layout.align })
    }

    fn aggregate(&mut self, agg: &AggregateType, owner: String) -> Result<LayoutResult, LayoutError> {
        let layout = if agg.kind.is_union() {
            self.union(agg, &owner)?
        } else {
            self.record(agg, &owner)?
        };
        log::debug!(
            "{} {}: size {} align {} ({} fields, {} vptrs, {} padding bytes)",
            agg.kind,
            owner,
            layout.size,
            layout.alignment,
            layout.fields.len(),
            layout.vtable_pointers.len(),
            layout.padding_bytes()
        );
        Ok(layout)
    }

    fn union(&mut self, agg: &AggregateType, owner: &str) -> Result<LayoutResult, LayoutError> {
        if !agg.bases.is_empty() || agg.declares_virtual() {
            log::warn!("{}: bases and virtual functions are ignored on unions", agg.display_name());
        }
        let mut flags = LayoutFlags::UNION;
        if agg.members.iter().all(|m| m.bit_width == Some(0)) {
            flags |= LayoutFlags::EMPTY;
            let mut layout = LayoutResult::scalar(1, Alignment::ONE);
            layout.flags = flags;
            return Ok(layout);
        }

        let mut fields = Vec::with_capacity(agg.members.len());
        let mut max_size = 0u64;
        let mut widest = "";
        let mut align = Alignment::ONE;
        for member in &agg.members {
            self.enter_member(&member.name);
            let field = match member.bit_width {
                Some(width) => {
                    let unit = self.storage_unit(member)?;
                    check_width(member, width, &unit)?;
                    if width == 0 {
                        continue;
                    }
                    flags |= LayoutFlags::HAS_BITFIELDS;
                    FieldLayout {
                        name: member.name.clone(),
                        type_name: self.registry.type_name(&member.ty),
                        offset: 0,
                        size: unit.size,
                        alignment: unit.align,
                        storage: StorageNote::Bitfield { unit_size: unit.size, bit_offset: 0, bit_width: width },
                    }
                }
                None => {
                    let layout = self.layout(&member.ty).map_err(|e| e.in_member(&member.name))?;
                    FieldLayout {
                        name: member.name.clone(),
                        type_name: self.registry.type_name(&member.ty),
                        offset: 0,
                        size: layout.size,
                        alignment: layout.alignment,
                        storage: StorageNote::Plain,
                    }
                }
            };
            if field.size >= max_size {
                max_size = field.size;
                widest = member.name.as_str();
            }
            align = align.max(field.alignment);
            fields.push(field);
        }

        let size = align.align(max_size).ok_or_else(|| overflow(owner, widest))?;
        let mut layout = LayoutResult::scalar(size, align);
        if size > max_size {
            layout.padding.push(PaddingRegion { offset: max_size, size: size - max_size });
        }
        layout.fields = fields;
        layout.flags = flags;
        Ok(layout)
    }

    fn record(&mut self, agg: &AggregateType, owner: &str) -> Result<LayoutResult, LayoutError> {
        let registry = self.registry;

        let mut bases = Vec::with_capacity(agg.bases.len());
        for spec in &agg.bases {
            let id = match self.strip_typedefs(&spec.ty) {
                TypeDescriptor::NamedRef(id) => *id,
                other => return Err(LayoutError::UnknownType(format!("base class `{}`", registry.type_name(other)))),
            };
            let name = registry.qualified_name(id);
            self.enter_member(&name);
            let layout = self.layout_named(id)?;
            bases.push(BaseInfo { id, name, is_virtual: spec.is_virtual, layout });
        }

        let polymorphic = agg.declares_virtual() || bases.iter().any(|b| b.layout.is_polymorphic());
        let mut virtual_bases: Vec<TypeId> = Vec::new();
        for base in &bases {
            if base.is_virtual && !virtual_bases.contains(&base.id) {
                virtual_bases.push(base.id);
            }
            for id in &base.layout.virtual_bases {
                if !virtual_bases.contains(id) {
                    virtual_bases.push(*id);
                }
            }
        }
        let dynamic = polymorphic || !virtual_bases.is_empty();
        let primary = bases.iter().find(|b| !b.is_virtual && b.layout.is_dynamic());
        let empty = !dynamic
            && agg.members.iter().all(|m| m.bit_width == Some(0))
            && bases.iter().all(|b| self.policy.is_empty_base(&b.layout));

        let mut flags = LayoutFlags::empty();
        flags.set(LayoutFlags::POLYMORPHIC, polymorphic);
        flags.set(LayoutFlags::DYNAMIC, dynamic);
        flags.set(LayoutFlags::EMPTY, empty);
        flags.set(LayoutFlags::HAS_VIRTUAL_BASES, !virtual_bases.is_empty());

        let mut cursor = Cursor::default();
        let mut last = owner.to_string();
        let mut vtable_pointers = Vec::new();
        let mut subobjects = Vec::new();

        if dynamic && primary.is_none() {
            log::trace!("{}: own vtable pointer at 0", owner);
            vtable_pointers.push(VtablePointer { offset: 0, owner: owner.to_string(), in_virtual_base: false });
            cursor.offset = self.profile.vtable_pointer_size();
            cursor.raise(self.profile.pointer_align());
        } else if let Some(primary) = primary {
            log::trace!("{}: reuses vtable pointer of {}", owner, primary.name);
        }

        for base in bases.iter().filter(|b| !b.is_virtual) {
            let placement = self
                .policy
                .place_base(cursor.offset, &base.layout)
                .ok_or_else(|| overflow(owner, &base.name))?;
            let end = placement.end().ok_or_else(|| overflow(owner, &base.name))?;
            cursor.pad_to(placement.offset);
            vtable_pointers.extend(base.layout.non_virtual_vtable_pointers().map(|vp| VtablePointer {
                offset: placement.offset + vp.offset,
                owner: vp.owner.clone(),
                in_virtual_base: false,
            }));
            subobjects.push(BaseSubobject {
                name: base.name.clone(),
                offset: placement.offset,
                size: placement.size,
                is_virtual: false,
            });
            cursor.raise(placement.align);
            cursor.offset = cursor.offset.max(end);
            last.clone_from(&base.name);
        }

        let mut fields = Vec::with_capacity(agg.members.len());
        let mut packer = BitfieldPacker::new();
        for member in &agg.members {
            self.enter_member(&member.name);
            last.clone_from(&member.name);
            match member.bit_width {
                Some(width) => {
                    let unit = self.storage_unit(member)?;
                    check_width(member, width, &unit)?;
                    if width == 0 {
                        packer.close();
                        let next = unit.align.align(cursor.offset).ok_or_else(|| overflow(owner, &member.name))?;
                        cursor.pad_to(next);
                        continue;
                    }
                    let placement = packer
                        .place(cursor.offset, unit, width)
                        .ok_or_else(|| overflow(owner, &member.name))?;
                    let end = placement.unit_end().ok_or_else(|| overflow(owner, &member.name))?;
                    if placement.opened {
                        cursor.pad_to(placement.unit_offset);
                    }
                    log::trace!(
                        "{}::{} bit-field at {}+{} bits",
                        owner,
                        member.name,
                        placement.unit_offset,
                        placement.bit_offset
                    );
                    fields.push(FieldLayout {
                        name: member.name.clone(),
                        type_name: registry.type_name(&member.ty),
                        offset: placement.unit_offset,
                        size: unit.size,
                        alignment: unit.align,
                        storage: StorageNote::Bitfield {
                            unit_size: unit.size,
                            bit_offset: placement.bit_offset,
                            bit_width: width,
                        },
                    });
                    flags |= LayoutFlags::HAS_BITFIELDS;
                    cursor.raise(unit.align);
                    cursor.offset = cursor.offset.max(end);
                }
                None => {
                    packer.close();
                    let layout = self.layout(&member.ty).map_err(|e| e.in_member(&member.name))?;
                    let offset = layout.alignment.align(cursor.offset).ok_or_else(|| overflow(owner, &member.name))?;
                    let end = offset.checked_add(layout.size).ok_or_else(|| overflow(owner, &member.name))?;
                    cursor.pad_to(offset);
                    log::trace!("{}::{} at {} ({} bytes)", owner, member.name, offset, layout.size);
                    fields.push(FieldLayout {
                        name: member.name.clone(),
                        type_name: registry.type_name(&member.ty),
                        offset,
                        size: layout.size,
                        alignment: layout.alignment,
                        storage: StorageNote::Plain,
                    });
                    cursor.raise(layout.alignment);
                    cursor.offset = end;
                }
            }
        }

        let nv_align = cursor.align;
        let nv_size = nv_align.align(cursor.offset).ok_or_else(|| overflow(owner, &last))?;

        if !virtual_bases.is_empty() {
            cursor.pad_to(nv_size);
            for id in &virtual_bases {
                let name = registry.qualified_name(*id);
                self.enter_member(&name);
                let base_layout = self.layout_named(*id)?;
                let placement = self
                    .policy
                    .place_base(cursor.offset, &base_layout)
                    .ok_or_else(|| overflow(owner, &name))?;
                let end = placement.end().ok_or_else(|| overflow(owner, &name))?;
                cursor.pad_to(placement.offset);
                vtable_pointers.extend(base_layout.non_virtual_vtable_pointers().map(|vp| VtablePointer {
                    offset: placement.offset + vp.offset,
                    owner: vp.owner.clone(),
                    in_virtual_base: true,
                }));
                subobjects.push(BaseSubobject {
                    name: name.clone(),
                    offset: placement.offset,
                    size: placement.size,
                    is_virtual: true,
                });
                cursor.raise(placement.align);
                cursor.offset = cursor.offset.max(end);
                last = name;
            }
        }

        let size = if empty && cursor.offset == 0 {
            1
        } else {
            let size = cursor.align.align(cursor.offset).ok_or_else(|| overflow(owner, &last))?;
            cursor.pad_to(size);
            size
        };
        vtable_pointers.sort_by_key(|vp| vp.offset);

        Ok(LayoutResult {
            size,
            alignment: cursor.align,
            nv_size,
            nv_align,
            fields,
            bases: subobjects,
            vtable_pointers,
            padding: cursor.padding,
            virtual_bases,
            flags,
        })
    }
}

fn check_width(member: &Member, width: u32, unit: &StorageUnit) -> Result<(), LayoutError> {
    if width > unit.bits() {
        return Err(LayoutError::InvalidBitfieldWidth {
            member: member.name.clone(),
            width,
            max_bits: unit.bits(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::policy::StrictSequentialPolicy;
    use crate::registry::ScopeId;
    use crate::resolver::{resolve_declarations, Declarator, RecordDecl, SourceUnit};
    use crate::types::{AggregateKind, AggregateType, Member};

    fn ty(spelling: &str) -> Declarator {
        Declarator::fundamental(spelling)
    }

    fn record(tag: AggregateKind, name: &str) -> RecordDecl {
        RecordDecl::new(tag, Some(name))
    }

    fn build(unit: SourceUnit) -> TypeRegistry {
        let (registry, outcome) = resolve_declarations(&unit.declarations);
        assert!(outcome.is_clean(), "{:?}", outcome.errors);
        registry
    }

    fn layout_of(registry: &TypeRegistry, profile: &AbiProfile, name: &str) -> Result<Arc<LayoutResult>, LayoutError> {
        let id = registry.find(ScopeId::GLOBAL, name)?;
        LayoutEngine::new(registry, profile).layout_named(id)
    }

    fn offsets(layout: &LayoutResult) -> Vec<(&str, u64)> {
        layout.fields.iter().map(|f| (f.name.as_str(), f.offset)).collect()
    }

    fn regions(layout: &LayoutResult) -> Vec<(u64, u64)> {
        layout.padding.iter().map(|p| (p.offset, p.size)).collect()
    }

    #[test]
    fn test_fundamentals_follow_profile() {
        let registry = TypeRegistry::new();
        for profile in [AbiProfile::ilp32(), AbiProfile::lp64(), AbiProfile::llp64()] {
            let mut engine = LayoutEngine::new(&registry, &profile);
            for kind in [
                FundamentalKind::Bool,
                FundamentalKind::Char,
                FundamentalKind::UnsignedShort,
                FundamentalKind::Int,
                FundamentalKind::Long,
                FundamentalKind::UnsignedLongLong,
                FundamentalKind::Float,
                FundamentalKind::Double,
                FundamentalKind::LongDouble,
                FundamentalKind::WChar,
            ] {
                let layout = engine.layout(&TypeDescriptor::Fundamental(kind)).unwrap();
                assert_eq!(Some(layout.size), profile.size_of(kind), "{} on {}", kind, profile.name());
                assert_eq!(Some(layout.alignment), profile.align_of(kind));
            }
            let pointer = engine
                .layout(&TypeDescriptor::pointer_to(TypeDescriptor::Fundamental(FundamentalKind::Void)))
                .unwrap();
            assert_eq!(pointer.size, profile.pointer_size());
            assert_eq!(
                engine.layout(&TypeDescriptor::Fundamental(FundamentalKind::Void)).unwrap_err(),
                LayoutError::incomplete("void")
            );
        }
    }

    #[test]
    fn test_padding_example() {
        let registry = build(SourceUnit::new().with(
            record(AggregateKind::Struct, "PaddingExample")
                .member("a", ty("char"))
                .member("b", ty("int"))
                .member("c", ty("char"))
                .member("d", ty("short"))
                .member("e", ty("char"))
                .member("f", ty("double")),
        ));
        let layout = layout_of(&registry, &AbiProfile::lp64(), "PaddingExample").unwrap();
        assert_eq!(layout.size, 24);
        assert_eq!(layout.alignment.as_u64(), 8);
        assert_eq!(offsets(&layout), vec![("a", 0), ("b", 4), ("c", 8), ("d", 10), ("e", 12), ("f", 16)]);
        assert_eq!(regions(&layout), vec![(1, 3), (9, 1), (13, 3)]);
        assert_eq!(layout.padding_bytes(), 7);
    }

    #[test]
    fn test_union_rounds_to_alignment() {
        let registry = build(SourceUnit::new().with(
            record(AggregateKind::Union, "Data")
                .member("c", ty("char"))
                .member("i", ty("int"))
                .member("d", ty("double"))
                .member("arr", ty("float").array(3)),
        ));
        let layout = layout_of(&registry, &AbiProfile::lp64(), "Data").unwrap();
        // raw maximum is 12 (float[3]); rounded up to the union's alignment of 8
        assert_eq!(layout.size, 16);
        assert_eq!(layout.alignment.as_u64(), 8);
        assert!(layout.fields.iter().all(|f| f.offset == 0));
        assert_eq!(regions(&layout), vec![(12, 4)]);

        let ilp32 = layout_of(&registry, &AbiProfile::ilp32(), "Data").unwrap();
        assert_eq!(ilp32.size, 16);
    }

    #[test]
    fn test_empty_aggregates_have_minimum_size() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "Empty"))
                .with(record(AggregateKind::Union, "Nothing"))
                .with(record(AggregateKind::Class, "AlsoEmpty").base("Empty")),
        );
        for name in ["Empty", "Nothing", "AlsoEmpty"] {
            let layout = layout_of(&registry, &AbiProfile::lp64(), name).unwrap();
            assert_eq!((layout.size, layout.alignment.as_u64()), (1, 1), "{}", name);
            assert!(layout.is_empty());
            assert!(layout.padding.is_empty());
        }
    }

    #[test]
    fn test_single_virtual_class() {
        let registry = build(SourceUnit::new().with(
            record(AggregateKind::Class, "Shape").virtual_function("draw").member("color", ty("int")),
        ));
        let lp64 = layout_of(&registry, &AbiProfile::lp64(), "Shape").unwrap();
        assert_eq!(lp64.size, 16);
        assert_eq!(lp64.vtable_pointers, vec![VtablePointer { offset: 0, owner: "Shape".into(), in_virtual_base: false }]);
        assert_eq!(offsets(&lp64), vec![("color", 8)]);
        assert_eq!(regions(&lp64), vec![(12, 4)]);
        assert!(lp64.is_polymorphic());

        let ilp32 = layout_of(&registry, &AbiProfile::ilp32(), "Shape").unwrap();
        assert_eq!(ilp32.size, 8);
        assert_eq!(offsets(&ilp32), vec![("color", 4)]);
    }

    #[test]
    fn test_single_inheritance_reuses_vptr() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Class, "Shape").virtual_function("draw").member("color", ty("int")))
                .with(
                    record(AggregateKind::Class, "Rectangle")
                        .base("Shape")
                        .virtual_function("draw")
                        .member("width", ty("double"))
                        .member("height", ty("double")),
                ),
        );
        let layout = layout_of(&registry, &AbiProfile::lp64(), "Rectangle").unwrap();
        assert_eq!(layout.vtable_pointers.len(), 1);
        assert_eq!(layout.vtable_pointers[0].owner, "Shape");
        assert_eq!(layout.bases, vec![BaseSubobject { name: "Shape".into(), offset: 0, size: 16, is_virtual: false }]);
        assert_eq!(offsets(&layout), vec![("width", 16), ("height", 24)]);
        assert_eq!(layout.size, 32);
    }

    #[test]
    fn test_two_polymorphic_bases_keep_two_vptrs() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Class, "Base1").virtual_function("f").member("a", ty("int")))
                .with(record(AggregateKind::Class, "Base2").virtual_function("g").member("b", ty("int")))
                .with(record(AggregateKind::Class, "Derived").base("Base1").base("Base2").member("c", ty("int"))),
        );
        let lp64 = layout_of(&registry, &AbiProfile::lp64(), "Derived").unwrap();
        let slots: Vec<(u64, &str)> = lp64.vtable_pointers.iter().map(|v| (v.offset, v.owner.as_str())).collect();
        assert_eq!(slots, vec![(0, "Base1"), (16, "Base2")]);
        assert_eq!(offsets(&lp64), vec![("c", 32)]);
        assert_eq!(lp64.size, 40);

        let ilp32 = layout_of(&registry, &AbiProfile::ilp32(), "Derived").unwrap();
        let slots: Vec<u64> = ilp32.vtable_pointers.iter().map(|v| v.offset).collect();
        assert_eq!(slots, vec![0, 8]);
        assert_eq!(ilp32.size, 20);
    }

    #[test]
    fn test_polymorphic_second_base_only() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "Plain").member("x", ty("int")))
                .with(record(AggregateKind::Struct, "Poly").virtual_function("f"))
                .with(record(AggregateKind::Struct, "Mixed").base("Plain").base("Poly")),
        );
        let layout = layout_of(&registry, &AbiProfile::lp64(), "Mixed").unwrap();
        // no own slot: the vptr of Poly stays inside its subobject
        assert_eq!(layout.vtable_pointers.len(), 1);
        assert_eq!(layout.vtable_pointers[0].offset, 8);
        assert_eq!(layout.size, 16);
    }

    #[test]
    fn test_virtual_diamond_places_shared_base_once() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "V").member("v", ty("int")))
                .with(record(AggregateKind::Struct, "A").virtual_base("V").member("a", ty("int")))
                .with(record(AggregateKind::Struct, "B").virtual_base("V").member("b", ty("int")))
                .with(record(AggregateKind::Struct, "D").base("A").base("B").member("d", ty("int"))),
        );
        let profile = AbiProfile::lp64();
        let a = layout_of(&registry, &profile, "A").unwrap();
        assert_eq!((a.nv_size, a.size), (16, 24));
        assert!(a.is_dynamic() && !a.is_polymorphic());

        let d = layout_of(&registry, &profile, "D").unwrap();
        let placed: Vec<(&str, u64, bool)> = d.bases.iter().map(|b| (b.name.as_str(), b.offset, b.is_virtual)).collect();
        assert_eq!(placed, vec![("A", 0, false), ("B", 16, false), ("V", 40, true)]);
        assert_eq!(offsets(&d), vec![("d", 32)]);
        assert_eq!(d.size, 48);
        assert_eq!(d.vtable_pointers.iter().map(|v| v.offset).collect::<Vec<_>>(), vec![0, 16]);
        assert_eq!(d.virtual_bases.len(), 1);
    }

    #[test]
    fn test_empty_base_policies() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "Tag"))
                .with(record(AggregateKind::Struct, "Tagged").base("Tag").member("x", ty("int"))),
        );
        let profile = AbiProfile::lp64();
        let itanium = layout_of(&registry, &profile, "Tagged").unwrap();
        assert_eq!(itanium.size, 4);
        assert_eq!(itanium.bases[0].size, 0);
        assert_eq!(offsets(&itanium), vec![("x", 0)]);

        let id = registry.find(ScopeId::GLOBAL, "Tagged").unwrap();
        let strict = LayoutEngine::new(&registry, &profile)
            .with_policy(&StrictSequentialPolicy)
            .layout_named(id)
            .unwrap();
        assert_eq!(strict.bases[0].size, 1);
        assert_eq!(offsets(&strict), vec![("x", 4)]);
        assert_eq!(strict.size, 8);
    }

    #[test]
    fn test_bitfield_packing() {
        let registry = build(
            SourceUnit::new()
                .with(
                    record(AggregateKind::Struct, "Flags")
                        .bitfield("a", ty("unsigned int"), 3)
                        .bitfield("b", ty("int"), 5)
                        .bitfield("c", ty("unsigned int"), 30)
                        .member("d", ty("char")),
                )
                .with(
                    record(AggregateKind::Struct, "Split")
                        .bitfield("a", ty("char"), 3)
                        .bitfield("", ty("int"), 0)
                        .bitfield("b", ty("char"), 2),
                ),
        );
        let profile = AbiProfile::lp64();
        let flags = layout_of(&registry, &profile, "Flags").unwrap();
        assert_eq!(offsets(&flags), vec![("a", 0), ("b", 0), ("c", 4), ("d", 8)]);
        assert_eq!(flags.fields[1].storage, StorageNote::Bitfield { unit_size: 4, bit_offset: 3, bit_width: 5 });
        assert_eq!((flags.size, flags.alignment.as_u64()), (12, 4));
        assert!(flags.flags.contains(LayoutFlags::HAS_BITFIELDS));

        let split = layout_of(&registry, &profile, "Split").unwrap();
        assert_eq!(offsets(&split), vec![("a", 0), ("b", 4)]);
        assert_eq!(regions(&split), vec![(1, 3)]);
        assert_eq!((split.size, split.alignment.as_u64()), (5, 1));
    }

    #[test]
    fn test_bitfield_errors() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "Floaty").bitfield("f", ty("float"), 3))
                .with(record(AggregateKind::Struct, "Wide").bitfield("c", ty("char"), 9))
                .with(record(AggregateKind::Struct, "Pointy").bitfield("p", ty("int").pointer(), 1)),
        );
        let profile = AbiProfile::lp64();
        assert_eq!(
            layout_of(&registry, &profile, "Floaty").unwrap_err(),
            LayoutError::UnsupportedBitfieldType { member: "f".into(), ty: "float".into() }
        );
        assert_eq!(
            layout_of(&registry, &profile, "Wide").unwrap_err(),
            LayoutError::InvalidBitfieldWidth { member: "c".into(), width: 9, max_bits: 8 }
        );
        assert!(matches!(
            layout_of(&registry, &profile, "Pointy").unwrap_err(),
            LayoutError::UnsupportedBitfieldType { .. }
        ));
    }

    #[test]
    fn test_enum_bitfield_uses_underlying() {
        let registry = build(
            SourceUnit::new()
                .with(crate::resolver::Declaration::enumeration("Small", Some("unsigned char")))
                .with(record(AggregateKind::Struct, "Packed").bitfield("s", Declarator::named("Small"), 4).bitfield("t", ty("unsigned char"), 4)),
        );
        let layout = layout_of(&registry, &AbiProfile::lp64(), "Packed").unwrap();
        assert_eq!(layout.size, 1);
        assert_eq!(offsets(&layout), vec![("s", 0), ("t", 0)]);
    }

    #[test]
    fn test_arrays() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "Matrix").member("m", ty("float").array(4).array(4)))
                .with(record(AggregateKind::Struct, "Flexible").member("len", ty("int")).member("data", ty("char").array(0)))
                .with(record(AggregateKind::Struct, "Broken").member("bad", ty("int").array(0).array(3))),
        );
        let profile = AbiProfile::lp64();
        assert_eq!(layout_of(&registry, &profile, "Matrix").unwrap().size, 64);
        let flexible = layout_of(&registry, &profile, "Flexible").unwrap();
        assert_eq!((flexible.size, flexible.field("data").unwrap().offset), (4, 4));
        assert_eq!(
            layout_of(&registry, &profile, "Broken").unwrap_err(),
            LayoutError::InvalidArrayElement("int[0]".into())
        );
    }

    #[test]
    fn test_direct_self_containment_detected_at_layout() {
        let mut registry = TypeRegistry::new();
        let id = registry
            .declare(ScopeId::GLOBAL, "Loop", crate::registry::TagKind::Aggregate(AggregateKind::Struct))
            .unwrap();
        registry
            .define(
                ScopeId::GLOBAL,
                "Loop",
                Definition::Aggregate(
                    AggregateType::new(AggregateKind::Struct, Some("Loop"))
                        .with_member(Member::new("x", TypeDescriptor::Fundamental(FundamentalKind::Int)))
                        .with_member(Member::new("again", TypeDescriptor::NamedRef(id))),
                ),
            )
            .unwrap();
        let profile = AbiProfile::lp64();
        let err = LayoutEngine::new(&registry, &profile).layout_named(id).unwrap_err();
        assert_eq!(err, LayoutError::CyclicAggregate { aggregate: "Loop".into(), member: "again".into() });
    }

    #[test]
    fn test_mutual_containment_names_member_of_recurring_aggregate() {
        let mut registry = TypeRegistry::new();
        let tag = crate::registry::TagKind::Aggregate(AggregateKind::Struct);
        let a = registry.declare(ScopeId::GLOBAL, "A", tag).unwrap();
        let b = registry.declare(ScopeId::GLOBAL, "B", tag).unwrap();
        registry
            .define(
                ScopeId::GLOBAL,
                "A",
                Definition::Aggregate(
                    AggregateType::new(AggregateKind::Struct, Some("A")).with_member(Member::new("b", TypeDescriptor::NamedRef(b))),
                ),
            )
            .unwrap();
        registry
            .define(
                ScopeId::GLOBAL,
                "B",
                Definition::Aggregate(
                    AggregateType::new(AggregateKind::Struct, Some("B")).with_member(Member::new("a", TypeDescriptor::NamedRef(a))),
                ),
            )
            .unwrap();
        let profile = AbiProfile::lp64();
        let mut engine = LayoutEngine::new(&registry, &profile);
        assert_eq!(
            engine.layout_named(a).unwrap_err(),
            LayoutError::CyclicAggregate { aggregate: "A".into(), member: "b".into() }
        );
        assert_eq!(
            engine.layout_named(b).unwrap_err(),
            LayoutError::CyclicAggregate { aggregate: "B".into(), member: "a".into() }
        );
    }

    #[test]
    fn test_huge_members_report_overflow() {
        let registry = build(
            SourceUnit::new()
                .with(record(AggregateKind::Struct, "Huge").member("big", ty("char").array(u64::MAX)).member("x", ty("int")))
                .with(record(AggregateKind::Union, "HugeUnion").member("big", ty("char").array(u64::MAX)).member("x", ty("int")))
                .with(record(AggregateKind::Struct, "Tail").member("x", ty("int")).member("big", ty("char").array(u64::MAX - 3)))
                .with(
                    record(AggregateKind::Struct, "Holder")
                        .member("flag", ty("char"))
                        .member("inner", Declarator::named("Huge").array(1)),
                ),
        );
        for profile in [AbiProfile::ilp32(), AbiProfile::lp64(), AbiProfile::llp64()] {
            assert_eq!(
                layout_of(&registry, &profile, "Huge").unwrap_err(),
                LayoutError::SizeOverflow { aggregate: "Huge".into(), member: "x".into() }
            );
            assert_eq!(
                layout_of(&registry, &profile, "HugeUnion").unwrap_err(),
                LayoutError::SizeOverflow { aggregate: "HugeUnion".into(), member: "big".into() }
            );
            assert_eq!(
                layout_of(&registry, &profile, "Tail").unwrap_err(),
                LayoutError::SizeOverflow { aggregate: "Tail".into(), member: "big".into() }
            );
            assert!(layout_of(&registry, &profile, "Holder").is_err());
        }
    }

    #[test]
    fn test_nested_type_and_typedef_fixtures() {
        let registry = build(
            SourceUnit::new()
                .with(
                    record(AggregateKind::Class, "Container")
                        .nested(record(AggregateKind::Class, "InnerClass").member("value", ty("int")).member("ratio", ty("double")).into())
                        .member("inner", Declarator::named("InnerClass"))
                        .member("count", ty("int")),
                )
                .with(
                    record(AggregateKind::Struct, "Person")
                        .member("name", ty("char").array(50))
                        .member("age", ty("int"))
                        .member("height", ty("float")),
                )
                .with(
                    record(AggregateKind::Struct, "Node")
                        .member("data", ty("int"))
                        .member("next", Declarator::named("Node").pointer()),
                )
                .with(crate::resolver::Declaration::typedef(
                    "Vector3D",
                    Declarator::Record(
                        RecordDecl::new(AggregateKind::Struct, None)
                            .member("x", ty("float"))
                            .member("y", ty("float"))
                            .member("z", ty("float")),
                    ),
                )),
        );
        let profile = AbiProfile::lp64();
        let inner = layout_of(&registry, &profile, "Container::InnerClass").unwrap();
        assert_eq!(inner.size, 16);
        let container = layout_of(&registry, &profile, "Container").unwrap();
        assert_eq!(offsets(&container), vec![("inner", 0), ("count", 16)]);
        assert_eq!(container.size, 24);

        let person = layout_of(&registry, &profile, "Person").unwrap();
        assert_eq!(offsets(&person), vec![("name", 0), ("age", 52), ("height", 56)]);
        assert_eq!(person.size, 60);

        assert_eq!(layout_of(&registry, &profile, "Node").unwrap().size, 16);
        assert_eq!(layout_of(&registry, &AbiProfile::ilp32(), "Node").unwrap().size, 8);
        assert_eq!(layout_of(&registry, &profile, "Vector3D").unwrap().size, 12);
    }

    #[test]
    fn test_incomplete_named_type() {
        let mut registry = TypeRegistry::new();
        let id = registry
            .declare(ScopeId::GLOBAL, "Opaque", crate::registry::TagKind::Aggregate(AggregateKind::Struct))
            .unwrap();
        let profile = AbiProfile::lp64();
        let mut engine = LayoutEngine::new(&registry, &profile);
        assert_eq!(engine.layout_named(id).unwrap_err(), LayoutError::incomplete("struct Opaque"));
        assert_eq!(engine.layout(&TypeDescriptor::pointer_to(TypeDescriptor::NamedRef(id))).unwrap().size, 8);
    }

    #[test]
    fn test_cache_returns_shared_result() {
        let registry = build(SourceUnit::new().with(record(AggregateKind::Struct, "Point").member("x", ty("int")).member("y", ty("int"))));
        let profile = AbiProfile::lp64();
        let cache = LayoutCache::new();
        let id = registry.find(ScopeId::GLOBAL, "Point").unwrap();
        let first = LayoutEngine::new(&registry, &profile).with_cache(&cache).layout_named(id).unwrap();
        let second = LayoutEngine::new(&registry, &profile).with_cache(&cache).layout_named(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_llp64_long() {
        let registry = build(SourceUnit::new().with(record(AggregateKind::Struct, "Longs").member("a", ty("char")).member("b", ty("long"))));
        assert_eq!(layout_of(&registry, &AbiProfile::llp64(), "Longs").unwrap().size, 8);
        assert_eq!(layout_of(&registry, &AbiProfile::lp64(), "Longs").unwrap().size, 16);
    }

    #[test]
    fn test_pointer_sized_bitfields_use_pointer_wide_unit() {
        let registry = build(
            SourceUnit::new().with(
                record(AggregateKind::Struct, "Handles")
                    .bitfield("a", Declarator::named("size_t"), 40)
                    .bitfield("b", Declarator::named("uintptr_t"), 20)
                    .member("c", ty("char")),
            ),
        );
        let layout = layout_of(&registry, &AbiProfile::llp64(), "Handles").unwrap();
        assert_eq!(offsets(&layout), vec![("a", 0), ("b", 0), ("c", 8)]);
        assert_eq!((layout.size, layout.alignment.as_u64()), (16, 8));
        assert_eq!(
            layout_of(&registry, &AbiProfile::ilp32(), "Handles").unwrap_err(),
            LayoutError::InvalidBitfieldWidth { member: "a".into(), width: 40, max_bits: 32 }
        );
    }
}
