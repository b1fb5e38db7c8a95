use std::io::Write;

use tracing::trace;

use super::writer::CountWriter;
use super::{
    AbcFile, AbcWrite, ClassInfo, ExceptionInfo, InstanceFlags, InstanceInfo, MetadataInfo,
    MethodBodyInfo, MethodFlags, MethodInfo, Multiname, NamespaceInfo, NsSetInfo, Result,
    ScriptInfo, TraitAttributes, TraitKind, TraitsInfo,
};

/// Serializes an [`AbcFile`] to a byte sink.
///
/// The exact inverse of [`parse`](super::parse): for any file that parsed
/// without error, extraction reproduces the original bytes exactly. The
/// first sink error aborts and surfaces unchanged.
pub fn extract<W: Write>(w: &mut W, abc: &AbcFile) -> Result<()> {
    Extractor {
        w: CountWriter::new(w),
        abc,
    }
    .extract_abc()
}

struct Extractor<'a, W> {
    w: CountWriter<&'a mut W>,
    abc: &'a AbcFile,
}

impl<W: Write> Extractor<'_, W> {
    fn extract_abc(mut self) -> Result<()> {
        self.w.write_u16(self.abc.minor_version)?;
        self.w.write_u16(self.abc.major_version)?;
        self.extract_cpool()?;
        trace!(offset = self.w.written(), "constant pool extracted");
        self.extract_methods()?;
        trace!(offset = self.w.written(), "methods extracted");
        self.extract_metadatas()?;
        trace!(offset = self.w.written(), "metadatas extracted");
        self.extract_instances_classes()?;
        trace!(offset = self.w.written(), "instances and classes extracted");
        self.extract_scripts()?;
        trace!(offset = self.w.written(), "scripts extracted");
        self.extract_method_bodies()?;
        trace!(offset = self.w.written(), "method bodies extracted");
        Ok(())
    }

    fn extract_cpool(&mut self) -> Result<()> {
        let cpool = &self.abc.constant_pool;

        self.w.write_u30(cpool.integers.len() as u32)?;
        for &v in cpool.integers.iter().skip(1) {
            self.w.write_s32(v)?;
        }

        self.w.write_u30(cpool.uintegers.len() as u32)?;
        for &v in cpool.uintegers.iter().skip(1) {
            self.w.write_u32(v)?;
        }

        self.w.write_u30(cpool.doubles.len() as u32)?;
        for &v in cpool.doubles.iter().skip(1) {
            self.w.write_d64(v)?;
        }

        self.w.write_u30(cpool.strings.len() as u32)?;
        for v in cpool.strings.iter().skip(1) {
            self.w.write_u30(v.len() as u32)?;
            self.w.write_all(v)?;
        }

        self.w.write_u30(cpool.namespaces.len() as u32)?;
        for v in cpool.namespaces.iter().skip(1) {
            self.extract_namespace(v)?;
        }

        self.w.write_u30(cpool.ns_sets.len() as u32)?;
        for v in cpool.ns_sets.iter().skip(1) {
            self.extract_ns_set(v)?;
        }

        self.w.write_u30(cpool.multinames.len() as u32)?;
        for v in cpool.multinames.iter().skip(1) {
            self.extract_multiname(v)?;
        }
        Ok(())
    }

    fn extract_namespace(&mut self, v: &NamespaceInfo) -> Result<()> {
        self.w.write_u8(v.kind)?;
        self.w.write_u30(v.name)
    }

    fn extract_ns_set(&mut self, v: &NsSetInfo) -> Result<()> {
        self.w.write_u30(v.namespaces.len() as u32)?;
        for &ns in &v.namespaces {
            self.w.write_u30(ns)?;
        }
        Ok(())
    }

    fn extract_multiname(&mut self, v: &Multiname) -> Result<()> {
        self.w.write_u8(v.kind().into())?;
        match v {
            Multiname::QName { ns, name } | Multiname::QNameA { ns, name } => {
                self.w.write_u30(*ns)?;
                self.w.write_u30(*name)
            }
            Multiname::RTQName { name } | Multiname::RTQNameA { name } => self.w.write_u30(*name),
            Multiname::RTQNameL | Multiname::RTQNameLA => Ok(()),
            Multiname::Multiname { name, ns_set } | Multiname::MultinameA { name, ns_set } => {
                self.w.write_u30(*name)?;
                self.w.write_u30(*ns_set)
            }
            Multiname::MultinameL { ns_set } | Multiname::MultinameLA { ns_set } => {
                self.w.write_u30(*ns_set)
            }
            Multiname::Typename { name, params } => {
                self.w.write_u30(*name)?;
                self.w.write_u30(params.len() as u32)?;
                for &param in params {
                    self.w.write_u30(param)?;
                }
                Ok(())
            }
        }
    }

    fn extract_method(&mut self, v: &MethodInfo) -> Result<()> {
        self.w.write_u30(v.param_types.len() as u32)?;
        self.w.write_u30(v.return_type)?;
        for &param_type in &v.param_types {
            self.w.write_u30(param_type)?;
        }
        self.w.write_u30(v.name)?;
        self.w.write_u8(v.flags.into_raw())?;
        if v.flags.check_flag(MethodFlags::HAS_OPTIONAL) {
            self.w.write_u30(v.options.len() as u32)?;
            for detail in &v.options {
                self.w.write_u30(detail.value)?;
                self.w.write_u8(detail.kind)?;
            }
        }
        if v.flags.check_flag(MethodFlags::HAS_PARAM_NAMES) {
            for &name in &v.param_names {
                self.w.write_u30(name)?;
            }
        }
        Ok(())
    }

    fn extract_methods(&mut self) -> Result<()> {
        self.w.write_u30(self.abc.methods.len() as u32)?;
        for method in &self.abc.methods {
            self.extract_method(method)?;
        }
        Ok(())
    }

    fn extract_metadata(&mut self, v: &MetadataInfo) -> Result<()> {
        self.w.write_u30(v.name)?;
        self.w.write_u30(v.items.len() as u32)?;
        for item in &v.items {
            self.w.write_u30(item.key)?;
            self.w.write_u30(item.value)?;
        }
        Ok(())
    }

    fn extract_metadatas(&mut self) -> Result<()> {
        self.w.write_u30(self.abc.metadatas.len() as u32)?;
        for metadata in &self.abc.metadatas {
            self.extract_metadata(metadata)?;
        }
        Ok(())
    }

    fn extract_trait(&mut self, v: &TraitsInfo) -> Result<()> {
        self.w.write_u30(v.name)?;
        self.w.write_u8(v.kind)?;

        // the parser only produces known kinds; a hand-built trait with an
        // unknown type nibble has no defined wire shape
        match v.trait_type().expect("unknown traits_info kind") {
            TraitKind::Slot | TraitKind::Const => {
                self.w.write_u30(v.slot_id)?;
                self.w.write_u30(v.typename)?;
                self.w.write_u30(v.vindex)?;
                if v.vindex != 0 {
                    self.w.write_u8(v.vkind)?;
                }
            }
            TraitKind::Class => {
                self.w.write_u30(v.slot_id)?;
                self.w.write_u30(v.class_i)?;
            }
            TraitKind::Function => {
                self.w.write_u30(v.slot_id)?;
                self.w.write_u30(v.function)?;
            }
            TraitKind::Method | TraitKind::Getter | TraitKind::Setter => {
                self.w.write_u30(v.disp_id)?;
                self.w.write_u30(v.method)?;
            }
        }
        if v.attributes().check_flag(TraitAttributes::METADATA) {
            self.w.write_u30(v.metadatas.len() as u32)?;
            for &metadata in &v.metadatas {
                self.w.write_u30(metadata)?;
            }
        }
        Ok(())
    }

    fn extract_traits(&mut self, v: &[TraitsInfo]) -> Result<()> {
        self.w.write_u30(v.len() as u32)?;
        for t in v {
            self.extract_trait(t)?;
        }
        Ok(())
    }

    fn extract_instance(&mut self, v: &InstanceInfo) -> Result<()> {
        self.w.write_u30(v.name)?;
        self.w.write_u30(v.super_name)?;
        self.w.write_u8(v.flags.into_raw())?;

        if v.flags.check_flag(InstanceFlags::CLASS_PROTECTED_NS) {
            self.w.write_u30(v.protected_ns)?;
        }

        self.w.write_u30(v.interfaces.len() as u32)?;
        for &interface in &v.interfaces {
            self.w.write_u30(interface)?;
        }

        self.w.write_u30(v.iinit)?;
        self.extract_traits(&v.traits)
    }

    fn extract_class(&mut self, v: &ClassInfo) -> Result<()> {
        self.w.write_u30(v.cinit)?;
        self.extract_traits(&v.traits)
    }

    fn extract_instances_classes(&mut self) -> Result<()> {
        self.w.write_u30(self.abc.instances.len() as u32)?;
        for instance in &self.abc.instances {
            self.extract_instance(instance)?;
        }
        for class in &self.abc.classes {
            self.extract_class(class)?;
        }
        Ok(())
    }

    fn extract_script(&mut self, v: &ScriptInfo) -> Result<()> {
        self.w.write_u30(v.init)?;
        self.extract_traits(&v.traits)
    }

    fn extract_scripts(&mut self) -> Result<()> {
        self.w.write_u30(self.abc.scripts.len() as u32)?;
        for script in &self.abc.scripts {
            self.extract_script(script)?;
        }
        Ok(())
    }

    fn extract_exception(&mut self, v: &ExceptionInfo) -> Result<()> {
        self.w.write_u30(v.from)?;
        self.w.write_u30(v.to)?;
        self.w.write_u30(v.target)?;
        self.w.write_u30(v.exc_type)?;
        self.w.write_u30(v.var_name)
    }

    fn extract_method_body(&mut self, v: &MethodBodyInfo) -> Result<()> {
        self.w.write_u30(v.method)?;
        self.w.write_u30(v.max_stack)?;
        self.w.write_u30(v.local_count)?;
        self.w.write_u30(v.init_scope_length)?;
        self.w.write_u30(v.max_scope_length)?;
        self.w.write_u30(v.code.len() as u32)?;
        self.w.write_all(&v.code)?;

        self.w.write_u30(v.exceptions.len() as u32)?;
        for exception in &v.exceptions {
            self.extract_exception(exception)?;
        }
        self.extract_traits(&v.traits)
    }

    fn extract_method_bodies(&mut self) -> Result<()> {
        self.w.write_u30(self.abc.method_bodies.len() as u32)?;
        for method_body in &self.abc.method_bodies {
            self.extract_method_body(method_body)?;
        }
        Ok(())
    }
}
