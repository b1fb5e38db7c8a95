use std::io::Read;

use tracing::trace;

use super::{
    AbcFile, AbcRead, ClassInfo, ConstantPool, Error, ExceptionInfo, InstanceFlags, InstanceInfo,
    ItemInfo, MetadataInfo, MethodBodyInfo, MethodFlags, MethodInfo, Multiname, MultinameKind,
    NamespaceInfo, NsSetInfo, OptionDetail, Result, ScriptInfo, TraitAttributes, TraitKind,
    TraitsInfo,
};

/// Parses an ABC byte stream into an [`AbcFile`].
///
/// The stream is consumed in the fixed ABC layout order: version, constant
/// pool, methods, metadata, instances/classes, scripts, method bodies.
/// Parsing stops at the first error.
pub fn parse<R: Read>(r: &mut R) -> Result<AbcFile> {
    Parser { r }.parse_abc()
}

struct Parser<'a, R> {
    r: &'a mut R,
}

impl<R: Read> Parser<'_, R> {
    fn parse_abc(mut self) -> Result<AbcFile> {
        let minor_version = self.r.read_u16()?;
        let major_version = self.r.read_u16()?;

        let constant_pool = self.parse_cpool()?;
        trace!(
            strings = constant_pool.strings.len(),
            multinames = constant_pool.multinames.len(),
            "constant pool parsed"
        );

        let methods = self.parse_seq(|p| p.parse_method())?;
        trace!(count = methods.len(), "methods parsed");

        let metadatas = self.parse_seq(|p| p.parse_metadata())?;
        trace!(count = metadatas.len(), "metadatas parsed");

        let (instances, classes) = self.parse_instances_classes()?;
        trace!(count = classes.len(), "instances and classes parsed");

        let scripts = self.parse_seq(|p| p.parse_script())?;
        trace!(count = scripts.len(), "scripts parsed");

        let method_bodies = self.parse_seq(|p| p.parse_method_body())?;
        trace!(count = method_bodies.len(), "method bodies parsed");

        Ok(AbcFile {
            minor_version,
            major_version,
            constant_pool,
            methods,
            metadatas,
            instances,
            classes,
            scripts,
            method_bodies,
        })
    }

    /// Reads a pooled constant table: an on-wire count `n` followed by
    /// bodies for indices 1..n. Slot 0 is the implicit sentinel and keeps
    /// the element's default value; a count of zero yields an empty table.
    fn parse_pool<T: Default>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let n = self.r.read_u30()?;
        let mut slice = Vec::with_capacity(n as usize);
        if n > 0 {
            slice.push(T::default());
            for _ in 1..n {
                slice.push(f(self)?);
            }
        }
        Ok(slice)
    }

    /// Reads a plain sequence: an on-wire count that is the literal number
    /// of records following.
    fn parse_seq<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.r.read_u30()?;
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(f(self)?);
        }
        Ok(items)
    }

    fn parse_cpool(&mut self) -> Result<ConstantPool> {
        let integers = self.parse_cpool_int()?;
        let uintegers = self.parse_cpool_uint()?;
        let doubles = self.parse_cpool_double()?;
        let strings = self.parse_cpool_string()?;
        let namespaces = self.parse_cpool_namespace()?;
        let ns_sets = self.parse_cpool_ns_set()?;
        let multinames = self.parse_cpool_multiname()?;
        Ok(ConstantPool {
            integers,
            uintegers,
            doubles,
            strings,
            namespaces,
            ns_sets,
            multinames,
        })
    }

    fn parse_cpool_int(&mut self) -> Result<Vec<i32>> {
        self.parse_pool(|p| p.r.read_s32())
    }

    fn parse_cpool_uint(&mut self) -> Result<Vec<u32>> {
        self.parse_pool(|p| p.r.read_u32())
    }

    fn parse_cpool_double(&mut self) -> Result<Vec<f64>> {
        self.parse_pool(|p| p.r.read_d64())
    }

    fn parse_cpool_string(&mut self) -> Result<Vec<Vec<u8>>> {
        self.parse_pool(|p| p.parse_string())
    }

    fn parse_cpool_namespace(&mut self) -> Result<Vec<NamespaceInfo>> {
        self.parse_pool(|p| p.parse_namespace())
    }

    fn parse_cpool_ns_set(&mut self) -> Result<Vec<NsSetInfo>> {
        self.parse_pool(|p| p.parse_ns_set())
    }

    fn parse_cpool_multiname(&mut self) -> Result<Vec<Multiname>> {
        self.parse_pool(|p| p.parse_multiname())
    }

    fn parse_string(&mut self) -> Result<Vec<u8>> {
        let length = self.r.read_u30()?;
        self.r.read_bytes(length)
    }

    fn parse_namespace(&mut self) -> Result<NamespaceInfo> {
        let kind = self.r.read_u8()?;
        let name = self.r.read_u30()?;
        Ok(NamespaceInfo { kind, name })
    }

    fn parse_ns_set(&mut self) -> Result<NsSetInfo> {
        let namespaces = self.parse_seq(|p| p.r.read_u30())?;
        Ok(NsSetInfo { namespaces })
    }

    fn parse_multiname(&mut self) -> Result<Multiname> {
        let kind = self.r.read_u8()?;
        let kind =
            MultinameKind::try_from(kind).map_err(|_| Error::UnknownMultinameKind(kind))?;
        Ok(match kind {
            MultinameKind::QName | MultinameKind::QNameA => {
                let ns = self.r.read_u30()?;
                let name = self.r.read_u30()?;
                match kind {
                    MultinameKind::QName => Multiname::QName { ns, name },
                    _ => Multiname::QNameA { ns, name },
                }
            }
            MultinameKind::RTQName | MultinameKind::RTQNameA => {
                let name = self.r.read_u30()?;
                match kind {
                    MultinameKind::RTQName => Multiname::RTQName { name },
                    _ => Multiname::RTQNameA { name },
                }
            }
            MultinameKind::RTQNameL => Multiname::RTQNameL,
            MultinameKind::RTQNameLA => Multiname::RTQNameLA,
            MultinameKind::Multiname | MultinameKind::MultinameA => {
                let name = self.r.read_u30()?;
                let ns_set = self.r.read_u30()?;
                match kind {
                    MultinameKind::Multiname => Multiname::Multiname { name, ns_set },
                    _ => Multiname::MultinameA { name, ns_set },
                }
            }
            MultinameKind::MultinameL | MultinameKind::MultinameLA => {
                let ns_set = self.r.read_u30()?;
                match kind {
                    MultinameKind::MultinameL => Multiname::MultinameL { ns_set },
                    _ => Multiname::MultinameLA { ns_set },
                }
            }
            MultinameKind::Typename => {
                let name = self.r.read_u30()?;
                let params = self.parse_seq(|p| p.r.read_u30())?;
                Multiname::Typename { name, params }
            }
        })
    }

    fn parse_method(&mut self) -> Result<MethodInfo> {
        let param_count = self.r.read_u30()?;
        let return_type = self.r.read_u30()?;
        let mut param_types = Vec::with_capacity(param_count as usize);
        for _ in 0..param_count {
            param_types.push(self.r.read_u30()?);
        }
        let name = self.r.read_u30()?;
        let flags = MethodFlags::from(self.r.read_u8()?);

        let mut options = Vec::new();
        if flags.check_flag(MethodFlags::HAS_OPTIONAL) {
            options = self.parse_seq(|p| p.parse_option_detail())?;
        }
        let mut param_names = Vec::new();
        if flags.check_flag(MethodFlags::HAS_PARAM_NAMES) {
            param_names = Vec::with_capacity(param_count as usize);
            for _ in 0..param_count {
                param_names.push(self.r.read_u30()?);
            }
        }
        Ok(MethodInfo {
            return_type,
            param_types,
            name,
            flags,
            options,
            param_names,
        })
    }

    fn parse_option_detail(&mut self) -> Result<OptionDetail> {
        let value = self.r.read_u30()?;
        let kind = self.r.read_u8()?;
        Ok(OptionDetail { value, kind })
    }

    fn parse_metadata(&mut self) -> Result<MetadataInfo> {
        let name = self.r.read_u30()?;
        let items = self.parse_seq(|p| {
            let key = p.r.read_u30()?;
            let value = p.r.read_u30()?;
            Ok(ItemInfo { key, value })
        })?;
        Ok(MetadataInfo { name, items })
    }

    fn parse_trait(&mut self) -> Result<TraitsInfo> {
        let mut t = TraitsInfo {
            name: self.r.read_u30()?,
            kind: self.r.read_u8()?,
            ..TraitsInfo::default()
        };

        let kind = TraitKind::try_from(t.kind & 0x0f)
            .map_err(|_| Error::UnknownTraitsInfoKind(t.kind & 0x0f))?;
        match kind {
            TraitKind::Slot | TraitKind::Const => {
                t.slot_id = self.r.read_u30()?;
                t.typename = self.r.read_u30()?;
                t.vindex = self.r.read_u30()?;
                if t.vindex != 0 {
                    t.vkind = self.r.read_u8()?;
                }
            }
            TraitKind::Class => {
                t.slot_id = self.r.read_u30()?;
                t.class_i = self.r.read_u30()?;
            }
            TraitKind::Function => {
                t.slot_id = self.r.read_u30()?;
                t.function = self.r.read_u30()?;
            }
            TraitKind::Method | TraitKind::Getter | TraitKind::Setter => {
                t.disp_id = self.r.read_u30()?;
                t.method = self.r.read_u30()?;
            }
        }
        if t.attributes().check_flag(TraitAttributes::METADATA) {
            t.metadatas = self.parse_seq(|p| p.r.read_u30())?;
        }
        Ok(t)
    }

    fn parse_instance(&mut self) -> Result<InstanceInfo> {
        let name = self.r.read_u30()?;
        let super_name = self.r.read_u30()?;
        let flags = InstanceFlags::from(self.r.read_u8()?);

        let mut protected_ns = 0;
        if flags.check_flag(InstanceFlags::CLASS_PROTECTED_NS) {
            protected_ns = self.r.read_u30()?;
        }

        let interfaces = self.parse_seq(|p| p.r.read_u30())?;
        let iinit = self.r.read_u30()?;
        let traits = self.parse_seq(|p| p.parse_trait())?;
        Ok(InstanceInfo {
            name,
            super_name,
            flags,
            protected_ns,
            interfaces,
            iinit,
            traits,
        })
    }

    fn parse_class(&mut self) -> Result<ClassInfo> {
        let cinit = self.r.read_u30()?;
        let traits = self.parse_seq(|p| p.parse_trait())?;
        Ok(ClassInfo { cinit, traits })
    }

    /// Instances and classes share one count: `count` instance_info records
    /// followed immediately by `count` class_info records.
    fn parse_instances_classes(&mut self) -> Result<(Vec<InstanceInfo>, Vec<ClassInfo>)> {
        let count = self.r.read_u30()?;
        let mut instances = Vec::with_capacity(count as usize);
        for _ in 0..count {
            instances.push(self.parse_instance()?);
        }
        let mut classes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            classes.push(self.parse_class()?);
        }
        Ok((instances, classes))
    }

    fn parse_script(&mut self) -> Result<ScriptInfo> {
        let init = self.r.read_u30()?;
        let traits = self.parse_seq(|p| p.parse_trait())?;
        Ok(ScriptInfo { init, traits })
    }

    fn parse_exception(&mut self) -> Result<ExceptionInfo> {
        let from = self.r.read_u30()?;
        let to = self.r.read_u30()?;
        let target = self.r.read_u30()?;
        let exc_type = self.r.read_u30()?;
        let var_name = self.r.read_u30()?;
        Ok(ExceptionInfo {
            from,
            to,
            target,
            exc_type,
            var_name,
        })
    }

    fn parse_method_body(&mut self) -> Result<MethodBodyInfo> {
        let method = self.r.read_u30()?;
        let max_stack = self.r.read_u30()?;
        let local_count = self.r.read_u30()?;
        let init_scope_length = self.r.read_u30()?;
        let max_scope_length = self.r.read_u30()?;
        let code_length = self.r.read_u30()?;
        let code = self.r.read_bytes(code_length)?;
        let exceptions = self.parse_seq(|p| p.parse_exception())?;
        let traits = self.parse_seq(|p| p.parse_trait())?;
        Ok(MethodBodyInfo {
            method,
            max_stack,
            local_count,
            init_scope_length,
            max_scope_length,
            code,
            exceptions,
            traits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use super::super::{Error, Multiname};

    /// Writes the minimal file frame: version, the seven pool counts, and
    /// the five section counts, with `pool` spliced in as the constant pool
    /// bytes and `rest` replacing everything after the pool.
    fn file_with_pool(pool: &[u8], rest: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x10, 0x00, 0x2e, 0x00];
        bytes.extend_from_slice(pool);
        bytes.extend_from_slice(rest);
        bytes
    }

    const EMPTY_POOL: &[u8] = &[0, 0, 0, 0, 0, 0, 0];
    const EMPTY_SECTIONS: &[u8] = &[0, 0, 0, 0, 0];

    #[test]
    fn parses_empty_file() {
        let bytes = file_with_pool(EMPTY_POOL, EMPTY_SECTIONS);
        let abc = parse(&mut bytes.as_slice()).unwrap();
        assert_eq!(abc.minor_version, 16);
        assert_eq!(abc.major_version, 46);
        assert!(abc.constant_pool.integers.is_empty());
        assert!(abc.methods.is_empty());
    }

    #[test]
    fn pool_count_includes_implicit_sentinel() {
        // three integers on the wire: count 4, bodies for slots 1..=3
        let pool = [&[4, 1, 2, 3][..], &[0, 0, 0, 0, 0, 0][..]].concat();
        let bytes = file_with_pool(&pool, EMPTY_SECTIONS);
        let abc = parse(&mut bytes.as_slice()).unwrap();
        assert_eq!(abc.constant_pool.integers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn pool_count_one_is_only_the_sentinel() {
        let pool = [&[1][..], &[0, 0, 0, 0, 0, 0][..]].concat();
        let bytes = file_with_pool(&pool, EMPTY_SECTIONS);
        let abc = parse(&mut bytes.as_slice()).unwrap();
        assert_eq!(abc.constant_pool.integers, vec![0]);
    }

    #[test]
    fn parses_string_and_multiname_tables() {
        let pool = [
            &[0, 0, 0][..],                      // ints, uints, doubles
            &[3, 1, b'a', 2, b'n', b's'][..],    // strings "a", "ns"
            &[2, 0x16, 2][..],                   // namespace kind 0x16 name 2
            &[0][..],                            // ns sets
            &[3, 0x07, 1, 1, 0x1d, 1, 1, 1][..], // QName(ns 1, name 1), Typename a<a>
        ]
        .concat();
        let bytes = file_with_pool(&pool, EMPTY_SECTIONS);
        let abc = parse(&mut bytes.as_slice()).unwrap();
        let cpool = &abc.constant_pool;
        assert_eq!(cpool.strings[1], b"a");
        assert_eq!(cpool.namespaces[1].name, 2);
        assert_eq!(cpool.multinames[1], Multiname::QName { ns: 1, name: 1 });
        assert_eq!(
            cpool.multinames[2],
            Multiname::Typename { name: 1, params: vec![1] }
        );
    }

    #[test]
    fn rejects_unknown_multiname_kind() {
        let pool = [&[0, 0, 0, 0, 0, 0][..], &[2, 0x42][..]].concat();
        let bytes = file_with_pool(&pool, EMPTY_SECTIONS);
        assert!(matches!(
            parse(&mut bytes.as_slice()),
            Err(Error::UnknownMultinameKind(0x42))
        ));
    }

    #[test]
    fn rejects_unknown_trait_kind() {
        // one script with one trait whose kind nibble is 7
        let rest = [&[0, 0, 0][..], &[1, 0, 1, 0, 0x07][..], &[0][..]].concat();
        let bytes = file_with_pool(EMPTY_POOL, &rest);
        assert!(matches!(
            parse(&mut bytes.as_slice()),
            Err(Error::UnknownTraitsInfoKind(0x07))
        ));
    }

    #[test]
    fn truncated_file_is_unexpected_eof() {
        let bytes = [0x10, 0x00, 0x2e];
        assert!(matches!(
            parse(&mut bytes.as_slice()),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn parses_method_with_optional_and_param_names() {
        // one method: 2 params, return 0, types [1, 2], name 3,
        // flags HAS_OPTIONAL | HAS_PARAM_NAMES, one option (value 5 kind 1),
        // two param names
        let rest = [
            &[1][..],
            &[2, 0, 1, 2, 3, 0x88][..],
            &[1, 5, 1][..],
            &[4, 5][..],
            &[0, 0, 0, 0][..],
        ]
        .concat();
        let bytes = file_with_pool(EMPTY_POOL, &rest);
        let abc = parse(&mut bytes.as_slice()).unwrap();
        let m = &abc.methods[0];
        assert_eq!(m.param_types, vec![1, 2]);
        assert_eq!(m.name, 3);
        assert_eq!(m.options.len(), 1);
        assert_eq!(m.options[0].value, 5);
        assert_eq!(m.param_names, vec![4, 5]);
    }

    #[test]
    fn shared_count_pairs_instances_and_classes() {
        // one instance (name 0, super 0, flags 0x08 -> protected ns 7,
        // no interfaces, iinit 0, no traits) and one class (cinit 0, no traits)
        let rest = [
            &[0, 0][..],                      // methods, metadatas
            &[1][..],                         // class count
            &[0, 0, 0x08, 7, 0, 0, 0][..],    // instance
            &[0, 0][..],                      // class
            &[0, 0][..],                      // scripts, method bodies
        ]
        .concat();
        let bytes = file_with_pool(EMPTY_POOL, &rest);
        let abc = parse(&mut bytes.as_slice()).unwrap();
        assert_eq!(abc.instances.len(), abc.classes.len());
        assert_eq!(abc.instances[0].protected_ns, 7);
    }

    #[test]
    #[ignore = "requires the frame1.abc reference fixture"]
    fn parses_frame1_fixture() {
        let bytes = std::fs::read("tests/fixtures/frame1.abc").unwrap();
        let abc = parse(&mut bytes.as_slice()).unwrap();
        let cpool = &abc.constant_pool;
        assert_eq!(cpool.integers.len(), 2926);
        assert_eq!(cpool.uintegers.len(), 15);
        assert_eq!(cpool.doubles.len(), 857);
        assert_eq!(cpool.strings.len(), 51453);
        assert_eq!(cpool.namespaces.len(), 11524);
        assert_eq!(cpool.ns_sets.len(), 2226);
        assert_eq!(cpool.multinames.len(), 48187);
        assert_eq!(abc.methods.len(), 46498);
        assert_eq!(abc.metadatas.len(), 104);
        assert_eq!(abc.instances.len(), 5143);
        assert_eq!(abc.classes.len(), abc.instances.len());
        assert_eq!(abc.scripts.len(), 4442);
        assert_eq!(abc.method_bodies.len(), 45243);
    }
}
