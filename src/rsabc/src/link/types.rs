use crate::bytecode::{
    AbcFile, ClassInfo, InstanceInfo, MethodBodyInfo, MethodInfo, TraitsInfo,
};

/// A linked view over a parsed [`AbcFile`].
///
/// Linking resolves constant-pool indices into names and pairs related
/// records; the view borrows the parsed file and cannot outlive it.
#[derive(Debug, Clone)]
pub struct LinkedAbcFile<'a> {
    src: &'a AbcFile,
    pub classes: Vec<Class<'a>>,
    pub methods: Vec<Method<'a>>,
}

impl<'a> LinkedAbcFile<'a> {
    pub(crate) fn new(
        src: &'a AbcFile,
        classes: Vec<Class<'a>>,
        methods: Vec<Method<'a>>,
    ) -> LinkedAbcFile<'a> {
        LinkedAbcFile {
            src,
            classes,
            methods,
        }
    }

    /// The parsed file this view was linked from.
    pub fn source(&self) -> &'a AbcFile {
        self.src
    }

    /// Finds a class by its resolved name.
    ///
    /// If several classes share a name (under different namespaces), the
    /// first occurrence is returned.
    pub fn class_by_name(&self, name: &str) -> Option<&Class<'a>> {
        self.classes.iter().find(|c| c.name == name)
    }
}

/// An ActionScript class: an instance_info/class_info pair with its names
/// resolved and its traits bucketed.
#[derive(Debug, Clone)]
pub struct Class<'a> {
    pub instance_info: &'a InstanceInfo,
    pub class_info: &'a ClassInfo,
    pub name: String,
    pub super_name: String,
    pub interfaces: Vec<String>,
    pub instance_traits: TraitsObject<'a>,
    pub class_traits: TraitsObject<'a>,
}

/// The traits of one side of a class, partitioned by trait type.
///
/// Slot and const traits land in `slots`; method, getter and setter traits
/// land in `methods`. Order within each bucket follows the source order.
#[derive(Debug, Clone, Default)]
pub struct TraitsObject<'a> {
    pub slots: Vec<Trait<'a>>,
    pub classes: Vec<Trait<'a>>,
    pub functions: Vec<Trait<'a>>,
    pub methods: Vec<Trait<'a>>,
}

/// A single trait with its name resolved.
///
/// `typename` is resolved only for slot and const traits.
#[derive(Debug, Clone)]
pub struct Trait<'a> {
    pub source: &'a TraitsInfo,
    pub name: String,
    pub typename: Option<String>,
}

/// A method with its signature resolved and its body attached, when one
/// exists. Natives and interface methods have no body.
#[derive(Debug, Clone)]
pub struct Method<'a> {
    pub info: &'a MethodInfo,
    pub body: Option<&'a MethodBodyInfo>,
    pub name: String,
    pub return_type: String,
    pub param_types: Vec<String>,
}

impl Method<'_> {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
