use std::borrow::Cow;

use super::{ConstantPool, Multiname};

impl ConstantPool {
    /// Returns pool string `idx` as text. Ill-formed UTF-8 is replaced
    /// lossily; the raw bytes stay untouched in the pool.
    pub fn string(&self, idx: u32) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.strings[idx as usize])
    }

    /// Resolves a namespace index to the name of the namespace.
    pub fn namespace_string(&self, idx: u32) -> String {
        self.string(self.namespaces[idx as usize].name).into_owned()
    }

    /// Resolves a multiname index to its canonical textual form.
    ///
    /// Qualified names render as `[namespace].name`, runtime-qualified ones
    /// substitute `[*]` for the parts bound at runtime, and parameterized
    /// names render as `name<param, param>`. Late-bound multinames carry no
    /// name on the wire and resolve to the empty string, as does the slot-0
    /// sentinel of any table.
    pub fn multiname_string(&self, idx: u32) -> String {
        let info = &self.multinames[idx as usize];
        match info {
            Multiname::QName { ns, name } | Multiname::QNameA { ns, name } => {
                format!("[{}].{}", self.namespace_string(*ns), self.string(*name))
            }
            Multiname::RTQName { name } | Multiname::RTQNameA { name } => {
                format!("[*].{}", self.string(*name))
            }
            Multiname::RTQNameL | Multiname::RTQNameLA => "[*].[*]".to_string(),
            Multiname::Multiname { name, .. } | Multiname::MultinameA { name, .. } => {
                self.string(*name).into_owned()
            }
            Multiname::MultinameL { .. } | Multiname::MultinameLA { .. } => String::new(),
            Multiname::Typename { name, params } => self.typename_string(*name, params),
        }
    }

    fn typename_string(&self, name: u32, params: &[u32]) -> String {
        let mut str = String::new();
        str.push_str(&self.string(name));
        str.push('<');
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                str.push_str(", ");
            }
            str.push_str(&self.multiname_string(*p));
        }
        str.push('>');
        str
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ConstantPool, Multiname, NamespaceInfo};

    fn pool() -> ConstantPool {
        ConstantPool {
            strings: vec![
                b"".to_vec(),
                b"flash.display".to_vec(),
                b"Sprite".to_vec(),
                b"Vector".to_vec(),
            ],
            namespaces: vec![
                NamespaceInfo::default(),
                NamespaceInfo { kind: 0x16, name: 1 },
            ],
            multinames: vec![
                Multiname::default(),
                Multiname::QName { ns: 1, name: 2 },
                Multiname::RTQName { name: 2 },
                Multiname::RTQNameL,
                Multiname::Multiname { name: 2, ns_set: 1 },
                Multiname::MultinameL { ns_set: 1 },
                Multiname::Typename { name: 3, params: vec![1, 1] },
            ],
            ..ConstantPool::default()
        }
    }

    #[test]
    fn namespace_resolves_to_its_name() {
        assert_eq!(pool().namespace_string(1), "flash.display");
        assert_eq!(pool().namespace_string(0), "");
    }

    #[test]
    fn qname_renders_namespace_and_name() {
        assert_eq!(pool().multiname_string(1), "[flash.display].Sprite");
    }

    #[test]
    fn runtime_qualified_names_render_stars() {
        assert_eq!(pool().multiname_string(2), "[*].Sprite");
        assert_eq!(pool().multiname_string(3), "[*].[*]");
    }

    #[test]
    fn multiname_renders_bare_name() {
        assert_eq!(pool().multiname_string(4), "Sprite");
    }

    #[test]
    fn late_bound_multiname_has_no_name() {
        assert_eq!(pool().multiname_string(5), "");
    }

    #[test]
    fn typename_renders_parameter_list() {
        assert_eq!(
            pool().multiname_string(6),
            "Vector<[flash.display].Sprite, [flash.display].Sprite>"
        );
    }

    #[test]
    fn sentinel_slot_resolves_empty() {
        assert_eq!(pool().multiname_string(0), "");
    }
}
