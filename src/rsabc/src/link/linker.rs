use thiserror::Error;

use crate::bytecode::{AbcFile, TraitKind, TraitsInfo};

use super::{Class, LinkedAbcFile, Method, Trait, TraitsObject};

/// Errors raised while linking a parsed ABC file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    /// A traits record's type cannot be routed to a bucket.
    #[error("unknown trait kind 0x{0:02x}")]
    UnknownTrait(u8),
}

/// Produces a linked view of `abc`:
///
/// - pairs each instance_info with its class_info and resolves the class
///   name, super class name and interface names,
/// - resolves method names, parameter types and return types, and attaches
///   each method body to its method,
/// - buckets every trait list by trait type.
pub fn link(abc: &AbcFile) -> Result<LinkedAbcFile<'_>, LinkError> {
    Linker { abc }.link()
}

struct Linker<'a> {
    abc: &'a AbcFile,
}

impl<'a> Linker<'a> {
    fn link(&self) -> Result<LinkedAbcFile<'a>, LinkError> {
        let classes = self.link_classes()?;
        let methods = self.link_methods();
        Ok(LinkedAbcFile::new(self.abc, classes, methods))
    }

    fn link_classes(&self) -> Result<Vec<Class<'a>>, LinkError> {
        (0..self.abc.classes.len())
            .map(|i| self.link_class(i))
            .collect()
    }

    fn link_class(&self, index: usize) -> Result<Class<'a>, LinkError> {
        let cpool = &self.abc.constant_pool;
        let instance_info = &self.abc.instances[index];
        let class_info = &self.abc.classes[index];
        Ok(Class {
            instance_info,
            class_info,
            name: cpool.multiname_string(instance_info.name),
            super_name: cpool.multiname_string(instance_info.super_name),
            interfaces: instance_info
                .interfaces
                .iter()
                .map(|&i| cpool.multiname_string(i))
                .collect(),
            instance_traits: self.build_traits(&instance_info.traits)?,
            class_traits: self.build_traits(&class_info.traits)?,
        })
    }

    fn build_traits(&self, info: &'a [TraitsInfo]) -> Result<TraitsObject<'a>, LinkError> {
        let cpool = &self.abc.constant_pool;
        let mut o = TraitsObject::default();
        for t in info {
            let kind = t
                .trait_type()
                .ok_or(LinkError::UnknownTrait(t.kind & 0x0f))?;
            let bucket = match kind {
                TraitKind::Slot | TraitKind::Const => &mut o.slots,
                TraitKind::Class => &mut o.classes,
                TraitKind::Function => &mut o.functions,
                TraitKind::Method | TraitKind::Getter | TraitKind::Setter => &mut o.methods,
            };
            let typename = match kind {
                TraitKind::Slot | TraitKind::Const => Some(cpool.multiname_string(t.typename)),
                _ => None,
            };
            bucket.push(Trait {
                source: t,
                name: cpool.multiname_string(t.name),
                typename,
            });
        }
        Ok(o)
    }

    fn link_methods(&self) -> Vec<Method<'a>> {
        let cpool = &self.abc.constant_pool;
        let mut methods: Vec<Method<'a>> = self
            .abc
            .methods
            .iter()
            .map(|info| Method {
                info,
                body: None,
                name: cpool.multiname_string(info.name),
                return_type: cpool.multiname_string(info.return_type),
                param_types: info
                    .param_types
                    .iter()
                    .map(|&t| cpool.multiname_string(t))
                    .collect(),
            })
            .collect();

        // last body wins on a duplicate back-index; well-formed files have
        // at most one body per method
        for body in &self.abc.method_bodies {
            methods[body.method as usize].body = Some(body);
        }
        methods
    }
}
