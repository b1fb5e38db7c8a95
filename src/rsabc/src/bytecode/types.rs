use super::{InstanceFlags, MethodFlags, MultinameKind, TraitAttributes, TraitKind};

/// # 4.2 abcFile
///
/// The root of a parsed ABC file. Field order matches the on-wire layout:
/// version, constant pool, methods, metadata, instances paired with classes,
/// scripts, method bodies.
///
/// `instances` and `classes` always have the same length; index *i* in each
/// describes the runtime and static sides of the same class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AbcFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub methods: Vec<MethodInfo>,
    pub metadatas: Vec<MetadataInfo>,
    pub instances: Vec<InstanceInfo>,
    pub classes: Vec<ClassInfo>,
    pub scripts: Vec<ScriptInfo>,
    pub method_bodies: Vec<MethodBodyInfo>,
}

/// # 4.4 Constant pool
///
/// Seven independent tables referenced by 1-based index from the rest of the
/// file. Slot 0 of each table is the implicit "any" / "undefined" sentinel:
/// it is never serialized, and a table of on-wire count `n` holds `n`
/// entries including it (an on-wire count of zero means a fully empty
/// table).
///
/// Strings are kept as raw byte strings; the wire format does not guarantee
/// UTF-8 and round-tripping must not depend on it. See
/// [`string`](ConstantPool::string) for text access.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstantPool {
    pub integers: Vec<i32>,
    pub uintegers: Vec<u32>,
    pub doubles: Vec<f64>,
    pub strings: Vec<Vec<u8>>,
    pub namespaces: Vec<NamespaceInfo>,
    pub ns_sets: Vec<NsSetInfo>,
    pub multinames: Vec<Multiname>,
}

/// # 4.4.2 Namespace
///
/// The kind byte is kept opaque; the format defines several namespace kinds
/// but none of them changes the payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NamespaceInfo {
    pub kind: u8,
    pub name: u32,
}

/// # 4.4.3 Namespace set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NsSetInfo {
    pub namespaces: Vec<u32>,
}

/// # 4.4.4 Multiname
///
/// A name reference, tagged by [`MultinameKind`]. Each variant carries only
/// the payload its kind defines. The `A` variants are the attribute forms
/// and share their payload shape with the plain ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Multiname {
    QName { ns: u32, name: u32 },
    QNameA { ns: u32, name: u32 },
    RTQName { name: u32 },
    RTQNameA { name: u32 },
    RTQNameL,
    RTQNameLA,
    Multiname { name: u32, ns_set: u32 },
    MultinameA { name: u32, ns_set: u32 },
    MultinameL { ns_set: u32 },
    MultinameLA { ns_set: u32 },
    Typename { name: u32, params: Vec<u32> },
}

impl Multiname {
    pub fn kind(&self) -> MultinameKind {
        match self {
            Multiname::QName { .. } => MultinameKind::QName,
            Multiname::QNameA { .. } => MultinameKind::QNameA,
            Multiname::RTQName { .. } => MultinameKind::RTQName,
            Multiname::RTQNameA { .. } => MultinameKind::RTQNameA,
            Multiname::RTQNameL => MultinameKind::RTQNameL,
            Multiname::RTQNameLA => MultinameKind::RTQNameLA,
            Multiname::Multiname { .. } => MultinameKind::Multiname,
            Multiname::MultinameA { .. } => MultinameKind::MultinameA,
            Multiname::MultinameL { .. } => MultinameKind::MultinameL,
            Multiname::MultinameLA { .. } => MultinameKind::MultinameLA,
            Multiname::Typename { .. } => MultinameKind::Typename,
        }
    }
}

impl Default for Multiname {
    /// The sentinel occupying slot 0 of the multiname table. A bare name
    /// pointing at string 0, so that resolving it yields the empty string.
    fn default() -> Multiname {
        Multiname::Multiname { name: 0, ns_set: 0 }
    }
}

/// # 4.5 Method signature (method_info)
///
/// `options` is present on the wire only when `HAS_OPTIONAL` is set, and
/// `param_names` only when `HAS_PARAM_NAMES` is set; the flags byte alone
/// decides, so both lists stay empty for methods without those blocks. The
/// on-wire param_count is `param_types.len()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodInfo {
    pub return_type: u32,
    pub param_types: Vec<u32>,
    pub name: u32,
    pub flags: MethodFlags,
    pub options: Vec<OptionDetail>,
    pub param_names: Vec<u32>,
}

/// # 4.5.1 Optional parameters (option_detail)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OptionDetail {
    pub value: u32,
    pub kind: u8,
}

/// # 4.6 Metadata (metadata_info)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataInfo {
    pub name: u32,
    pub items: Vec<ItemInfo>,
}

/// # 4.6 Metadata item (item_info)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemInfo {
    pub key: u32,
    pub value: u32,
}

/// # 4.12 Trait (traits_info)
///
/// The kind byte packs a [`TraitKind`] in its low 4 bits and
/// [`TraitAttributes`] in its high 4 bits; [`trait_type`](Self::trait_type)
/// and [`attributes`](Self::attributes) separate them. Which of the payload
/// fields are meaningful depends on the trait type:
///
/// | Type                    | Fields                                     |
/// | ----------------------- | ------------------------------------------ |
/// | slot, const             | `slot_id`, `typename`, `vindex`, `vkind`   |
/// | class                   | `slot_id`, `class_i`                       |
/// | function                | `slot_id`, `function`                      |
/// | method, getter, setter  | `disp_id`, `method`                        |
///
/// `vkind` is only on the wire when `vindex != 0`, and `metadatas` only when
/// the `METADATA` attribute is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraitsInfo {
    pub name: u32,
    pub kind: u8,
    pub slot_id: u32,
    pub typename: u32,
    pub vindex: u32,
    pub vkind: u8,
    pub class_i: u32,
    pub function: u32,
    pub disp_id: u32,
    pub method: u32,
    pub metadatas: Vec<u32>,
}

impl TraitsInfo {
    /// The trait type from the low 4 bits of the kind byte, or `None` for a
    /// value outside the defined set.
    pub fn trait_type(&self) -> Option<TraitKind> {
        TraitKind::try_from(self.kind & 0x0f).ok()
    }

    /// The attribute flags from the high 4 bits of the kind byte.
    pub fn attributes(&self) -> TraitAttributes {
        TraitAttributes::from(self.kind >> 4)
    }
}

/// # 4.7 Instance (instance_info)
///
/// `protected_ns` sits between the flags and the interface count on the
/// wire, and only when `CLASS_PROTECTED_NS` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceInfo {
    pub name: u32,
    pub super_name: u32,
    pub flags: InstanceFlags,
    pub protected_ns: u32,
    pub interfaces: Vec<u32>,
    pub iinit: u32,
    pub traits: Vec<TraitsInfo>,
}

/// # 4.8 Class (class_info)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassInfo {
    pub cinit: u32,
    pub traits: Vec<TraitsInfo>,
}

/// # 4.9 Script (script_info)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptInfo {
    pub init: u32,
    pub traits: Vec<TraitsInfo>,
}

/// # 4.10 Method body (method_body_info)
///
/// `method` is the back-index of the method_info this body belongs to. The
/// code blob is opaque at this layer; see
/// [`disassemble`](MethodBodyInfo::disassemble).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBodyInfo {
    pub method: u32,
    pub max_stack: u32,
    pub local_count: u32,
    pub init_scope_length: u32,
    pub max_scope_length: u32,
    pub code: Vec<u8>,
    pub exceptions: Vec<ExceptionInfo>,
    pub traits: Vec<TraitsInfo>,
}

/// # 4.11 Exception (exception_info)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExceptionInfo {
    pub from: u32,
    pub to: u32,
    pub target: u32,
    pub exc_type: u32,
    pub var_name: u32,
}
