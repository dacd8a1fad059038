//! Declaration graph consumed by the generators.
//!
//! The graph is an arena: translation units, classes and enumerations live in
//! flat vectors and refer to each other through typed ids. A class refers to
//! its bases weakly (by id), and owns its properties and repeated-child
//! accessors.
//!
//! # Traversal order
//!
//! Every ordering the generators rely on derives from [`DeclGraph::traverse`]:
//! units in the order given, declarations in unit order, and nested
//! declarations pre-order right after their owner. Storage order of the arena
//! vectors is never observable in generated output.
//!
//! # Lookups
//!
//! [`DeclGraph::find_unit`], [`DeclGraph::find_class`] and
//! [`DeclGraph::find_enum`] fail with a [`BootstrapError`] when nothing
//! matches. When several declarations match, the first one in traversal order
//! wins.

use crate::error::{BootstrapError, BootstrapResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Index of a translation unit in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub usize);

/// Index of a class in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub usize);

/// Index of an enumeration in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumId(pub usize);

/// Reference to a top-level or nested declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DeclRef {
    Class(ClassId),
    Enum(EnumId),
}

/// Builtin scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Void,
    Bool,
    Char,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    /// String-like value type that default-constructs to empty.
    String,
}

/// Static type of a property or repeated-child element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Builtin(Primitive),
    Enum(EnumId),
    Class(ClassId),
    Pointer(Box<TypeRef>),
    /// A type the graph does not model, known only by its spelled name.
    Named(String),
}

impl TypeRef {
    /// Pointer to a class declaration.
    pub fn class_ptr(id: ClassId) -> Self {
        TypeRef::Pointer(Box::new(TypeRef::Class(id)))
    }

    /// Opaque named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn is_primitive(&self, primitive: Primitive) -> bool {
        matches!(self, TypeRef::Builtin(p) if *p == primitive)
    }

    /// The type with all pointer layers removed.
    pub fn pointee(&self) -> &TypeRef {
        let mut ty = self;
        while let TypeRef::Pointer(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// The enumeration this type names directly, if any.
    pub fn as_enum(&self) -> Option<EnumId> {
        match self {
            TypeRef::Enum(id) => Some(*id),
            _ => None,
        }
    }

    /// The class this type names by value, if any.
    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            TypeRef::Class(id) => Some(*id),
            _ => None,
        }
    }

    /// The class this type refers to, by value or through pointers.
    pub fn referenced_class(&self) -> Option<ClassId> {
        self.pointee().as_class()
    }
}

/// A property of a class (a native getter exposed as a field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Name of the native getter, when it differs from the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<String>,

    #[serde(default)]
    pub ignored: bool,

    /// Injected by normalization rather than read from source.
    #[serde(default)]
    pub synthetic: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            getter: None,
            ignored: false,
            synthetic: false,
        }
    }
}

/// A repeated-child accessor: a native "count + indexed getter" pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,

    /// Type of one element of the repeated child.
    pub element: TypeRef,

    #[serde(default)]
    pub ignored: bool,
}

impl Method {
    pub fn new(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            name: name.into(),
            element,
            ignored: false,
        }
    }
}

/// One entry of a class's base list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSpecifier {
    pub class: ClassId,

    #[serde(default)]
    pub ignored: bool,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,

    /// Enclosing scopes, outermost first (`["clang"]`).
    #[serde(default)]
    pub namespace: Vec<String>,

    /// Where the declaration came from, for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default)]
    pub bases: Vec<BaseSpecifier>,

    #[serde(default)]
    pub properties: Vec<Property>,

    #[serde(default)]
    pub methods: Vec<Method>,

    /// Declarations nested in the class body.
    #[serde(default)]
    pub nested: Vec<DeclRef>,

    #[serde(default)]
    pub is_abstract: bool,

    /// Forward-declared only; never emitted.
    #[serde(default)]
    pub is_incomplete: bool,

    #[serde(default)]
    pub ignored: bool,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
            origin: None,
            bases: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            is_abstract: false,
            is_incomplete: false,
            ignored: false,
        }
    }

    #[must_use]
    pub fn in_namespace(mut self, namespace: &[&str]) -> Self {
        self.namespace = namespace.iter().map(|s| s.to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: ClassId) -> Self {
        self.bases.push(BaseSpecifier {
            class: base,
            ignored: false,
        });
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: &str, ty: TypeRef) -> Self {
        self.properties.push(Property::new(name, ty));
        self
    }

    #[must_use]
    pub fn with_method(mut self, name: &str, element: TypeRef) -> Self {
        self.methods.push(Method::new(name, element));
        self
    }

    #[must_use]
    pub fn incomplete(mut self) -> Self {
        self.is_incomplete = true;
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties that take part in generation.
    pub fn generated_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.ignored)
    }

    /// Repeated-child accessors that take part in generation.
    pub fn generated_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|m| !m.ignored)
    }
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumItem {
    pub name: String,

    #[serde(default)]
    pub value: i64,

    #[serde(default)]
    pub ignored: bool,
}

/// An enumeration declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumeration {
    pub name: String,

    #[serde(default)]
    pub namespace: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default)]
    pub items: Vec<EnumItem>,

    #[serde(default)]
    pub is_scoped: bool,

    #[serde(default)]
    pub ignored: bool,
}

impl Enumeration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
            origin: None,
            items: Vec::new(),
            is_scoped: false,
            ignored: false,
        }
    }

    #[must_use]
    pub fn in_namespace(mut self, namespace: &[&str]) -> Self {
        self.namespace = namespace.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append items valued by position.
    #[must_use]
    pub fn with_items(mut self, names: &[&str]) -> Self {
        let start = self.items.len() as i64;
        self.items
            .extend(names.iter().enumerate().map(|(i, name)| EnumItem {
                name: name.to_string(),
                value: start + i as i64,
                ignored: false,
            }));
        self
    }

    /// Items that take part in generation.
    pub fn generated_items(&self) -> impl Iterator<Item = &EnumItem> {
        self.items.iter().filter(|i| !i.ignored)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.generated_items().any(|i| i.name == name)
    }
}

/// A source file grouping top-level declarations. Used for lookup only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub file_name: String,

    #[serde(default)]
    pub decls: Vec<DeclRef>,
}

/// The full declaration graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclGraph {
    #[serde(default)]
    units: Vec<TranslationUnit>,

    #[serde(default)]
    classes: Vec<Class>,

    #[serde(default)]
    enums: Vec<Enumeration>,
}

impl DeclGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph from JSON and check its ids.
    pub fn from_json(json: &str) -> BootstrapResult<Self> {
        let graph: DeclGraph = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn to_json_pretty(&self) -> BootstrapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_unit(&mut self, file_name: impl Into<String>) -> UnitId {
        self.units.push(TranslationUnit {
            file_name: file_name.into(),
            decls: Vec::new(),
        });
        UnitId(self.units.len() - 1)
    }

    /// Add a class at the top level of a unit.
    pub fn add_class(&mut self, unit: UnitId, class: Class) -> ClassId {
        let id = self.push_class(class);
        self.units[unit.0].decls.push(DeclRef::Class(id));
        id
    }

    /// Add a class nested in another class.
    pub fn add_nested_class(&mut self, owner: ClassId, class: Class) -> ClassId {
        let id = self.push_class(class);
        self.classes[owner.0].nested.push(DeclRef::Class(id));
        id
    }

    /// Add an enumeration at the top level of a unit.
    pub fn add_enum(&mut self, unit: UnitId, enumeration: Enumeration) -> EnumId {
        let id = self.push_enum(enumeration);
        self.units[unit.0].decls.push(DeclRef::Enum(id));
        id
    }

    /// Add an enumeration nested in a class.
    pub fn add_nested_enum(&mut self, owner: ClassId, enumeration: Enumeration) -> EnumId {
        let id = self.push_enum(enumeration);
        self.classes[owner.0].nested.push(DeclRef::Enum(id));
        id
    }

    fn push_class(&mut self, class: Class) -> ClassId {
        self.classes.push(class);
        ClassId(self.classes.len() - 1)
    }

    fn push_enum(&mut self, enumeration: Enumeration) -> EnumId {
        self.enums.push(enumeration);
        EnumId(self.enums.len() - 1)
    }

    pub fn unit(&self, id: UnitId) -> &TranslationUnit {
        &self.units[id.0]
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.0]
    }

    pub fn enumeration(&self, id: EnumId) -> &Enumeration {
        &self.enums[id.0]
    }

    pub fn enumeration_mut(&mut self, id: EnumId) -> &mut Enumeration {
        &mut self.enums[id.0]
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.units.len()).map(UnitId)
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(ClassId)
    }

    pub fn enum_ids(&self) -> impl Iterator<Item = EnumId> + '_ {
        (0..self.enums.len()).map(EnumId)
    }

    /// Check that every id in the graph points at an existing declaration
    /// and that no class inherits from itself through its bases.
    pub fn validate(&self) -> BootstrapResult<()> {
        let check_decl = |decl: &DeclRef, owner: &str| -> BootstrapResult<()> {
            let ok = match decl {
                DeclRef::Class(id) => id.0 < self.classes.len(),
                DeclRef::Enum(id) => id.0 < self.enums.len(),
            };
            if ok {
                Ok(())
            } else {
                Err(BootstrapError::InvalidGraph(format!(
                    "{owner} refers to missing declaration {decl:?}"
                )))
            }
        };

        for unit in &self.units {
            for decl in &unit.decls {
                check_decl(decl, &unit.file_name)?;
            }
        }

        for class in &self.classes {
            for decl in &class.nested {
                check_decl(decl, &class.name)?;
            }
            for base in &class.bases {
                check_decl(&DeclRef::Class(base.class), &class.name)?;
            }
            let types = class
                .properties
                .iter()
                .map(|p| &p.ty)
                .chain(class.methods.iter().map(|m| &m.element));
            for ty in types {
                match ty.pointee() {
                    TypeRef::Class(id) => check_decl(&DeclRef::Class(*id), &class.name)?,
                    TypeRef::Enum(id) => check_decl(&DeclRef::Enum(*id), &class.name)?,
                    _ => {}
                }
            }
        }

        let mut state = vec![VisitState::New; self.classes.len()];
        for id in self.class_ids() {
            self.check_bases(id, &mut state)?;
        }
        Ok(())
    }

    /// Depth-first walk over every base specifier, ignored or not.
    fn check_bases(&self, id: ClassId, state: &mut [VisitState]) -> BootstrapResult<()> {
        match state[id.0] {
            VisitState::Done => return Ok(()),
            VisitState::Active => {
                return Err(BootstrapError::InvalidGraph(format!(
                    "base cycle through {}",
                    self.qualified_name(DeclRef::Class(id))
                )));
            }
            VisitState::New => {}
        }
        state[id.0] = VisitState::Active;
        for base in &self.classes[id.0].bases {
            self.check_bases(base.class, state)?;
        }
        state[id.0] = VisitState::Done;
        Ok(())
    }

    /// Declarations reachable from `units`, in traversal order.
    ///
    /// Each declaration appears once, at its first visit.
    pub fn traverse(&self, units: &[UnitId]) -> Vec<DeclRef> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        for unit in units {
            for decl in &self.units[unit.0].decls {
                self.traverse_decl(*decl, &mut visited, &mut order);
            }
        }
        order
    }

    fn traverse_decl(
        &self,
        decl: DeclRef,
        visited: &mut HashSet<DeclRef>,
        order: &mut Vec<DeclRef>,
    ) {
        if !visited.insert(decl) {
            return;
        }
        order.push(decl);
        if let DeclRef::Class(id) = decl {
            for nested in &self.classes[id.0].nested {
                self.traverse_decl(*nested, visited, order);
            }
        }
    }

    /// Find the first unit whose file name matches `pattern`.
    ///
    /// A unit matches when its file name equals the pattern or ends with
    /// `/pattern`, so `Stmt.h` matches `clang/AST/Stmt.h` but not
    /// `clang/AST/OpenMPStmt.h`.
    pub fn find_unit(&self, pattern: &str) -> BootstrapResult<UnitId> {
        let mut matches = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| unit_matches(&unit.file_name, pattern));
        let (index, unit) = matches
            .next()
            .ok_or_else(|| BootstrapError::UnitNotFound(pattern.to_string()))?;
        if matches.next().is_some() {
            debug!(pattern, unit = %unit.file_name, "Several units match, using the first");
        }
        Ok(UnitId(index))
    }

    /// Find a class by qualified name (`clang::Stmt`) within one unit.
    pub fn find_class(&self, unit: UnitId, qualified: &str) -> BootstrapResult<ClassId> {
        self.find_in(&[unit], qualified, |decl| match decl {
            DeclRef::Class(id) => Some(id),
            DeclRef::Enum(_) => None,
        })
        .ok_or_else(|| BootstrapError::ClassNotFound {
            scope: self.units[unit.0].file_name.clone(),
            name: qualified.to_string(),
        })
    }

    /// Find an enumeration by qualified name within one unit.
    pub fn find_enum(&self, unit: UnitId, qualified: &str) -> BootstrapResult<EnumId> {
        self.find_in(&[unit], qualified, |decl| match decl {
            DeclRef::Enum(id) => Some(id),
            DeclRef::Class(_) => None,
        })
        .ok_or_else(|| BootstrapError::EnumNotFound {
            scope: self.units[unit.0].file_name.clone(),
            name: qualified.to_string(),
        })
    }

    /// Find a class by qualified name anywhere in the graph.
    ///
    /// Same-named classes resolve to the first in traversal order.
    pub fn find_class_anywhere(&self, qualified: &str) -> BootstrapResult<ClassId> {
        let units: Vec<_> = self.unit_ids().collect();
        self.find_in(&units, qualified, |decl| match decl {
            DeclRef::Class(id) => Some(id),
            DeclRef::Enum(_) => None,
        })
        .ok_or_else(|| BootstrapError::ClassNotFound {
            scope: "declaration graph".to_string(),
            name: qualified.to_string(),
        })
    }

    /// Find an enumeration by qualified name anywhere in the graph.
    pub fn find_enum_anywhere(&self, qualified: &str) -> BootstrapResult<EnumId> {
        let units: Vec<_> = self.unit_ids().collect();
        self.find_in(&units, qualified, |decl| match decl {
            DeclRef::Enum(id) => Some(id),
            DeclRef::Class(_) => None,
        })
        .ok_or_else(|| BootstrapError::EnumNotFound {
            scope: "declaration graph".to_string(),
            name: qualified.to_string(),
        })
    }

    fn find_in<T>(
        &self,
        units: &[UnitId],
        qualified: &str,
        select: impl Fn(DeclRef) -> Option<T>,
    ) -> Option<T> {
        let mut matches = self
            .traverse(units)
            .into_iter()
            .filter(|decl| self.qualified_name(*decl) == qualified)
            .filter_map(select);
        let first = matches.next()?;
        let others = matches.count();
        if others > 0 {
            debug!(
                name = qualified,
                candidates = others + 1,
                "Ambiguous lookup, using first match in traversal order"
            );
        }
        Some(first)
    }

    pub fn name_of(&self, decl: DeclRef) -> &str {
        match decl {
            DeclRef::Class(id) => &self.classes[id.0].name,
            DeclRef::Enum(id) => &self.enums[id.0].name,
        }
    }

    pub fn namespace_of(&self, decl: DeclRef) -> &[String] {
        match decl {
            DeclRef::Class(id) => &self.classes[id.0].namespace,
            DeclRef::Enum(id) => &self.enums[id.0].namespace,
        }
    }

    /// `::`-joined name including enclosing scopes.
    pub fn qualified_name(&self, decl: DeclRef) -> String {
        let mut parts: Vec<&str> = self
            .namespace_of(decl)
            .iter()
            .map(String::as_str)
            .collect();
        parts.push(self.name_of(decl));
        parts.join("::")
    }

    /// Remove a nested declaration from its owner's body.
    ///
    /// The declaration stays in the arena and can still be referenced.
    pub fn detach_nested(&mut self, owner: ClassId, decl: DeclRef) {
        self.classes[owner.0].nested.retain(|d| *d != decl);
    }

    /// The first non-ignored base of a class.
    pub fn base_class(&self, id: ClassId) -> Option<ClassId> {
        self.classes[id.0]
            .bases
            .iter()
            .find(|b| !b.ignored)
            .map(|b| b.class)
    }

    /// Whether `sub` reaches `sup` by following base classes (or is `sup`).
    ///
    /// A base cycle ends the walk without a match.
    pub fn is_derived_from(&self, sub: ClassId, sup: ClassId) -> bool {
        self.base_chain(sub).any(|id| id == sup)
    }

    /// The topmost class reached by following base classes.
    pub fn root_base(&self, id: ClassId) -> ClassId {
        self.base_chain(id).last().unwrap_or(id)
    }

    /// The class followed by its bases, nearest first.
    pub fn base_chain(&self, id: ClassId) -> BaseChain<'_> {
        BaseChain {
            graph: self,
            next: Some(id),
            remaining: self.classes.len(),
        }
    }

    /// The class preceded by its bases, root first.
    pub fn lineage(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain: Vec<_> = self.base_chain(id).collect();
        chain.reverse();
        chain
    }

    /// Classes whose first non-ignored base is `id`.
    pub fn direct_subclasses(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.class_ids()
            .filter(move |sub| *sub != id && self.base_class(*sub) == Some(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    New,
    Active,
    Done,
}

/// Iterator over a class and its bases, nearest first.
///
/// Bounded by the number of classes, so it also terminates on graphs that
/// skipped [`DeclGraph::validate`].
pub struct BaseChain<'g> {
    graph: &'g DeclGraph,
    next: Option<ClassId>,
    remaining: usize,
}

impl Iterator for BaseChain<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.graph.base_class(current);
        Some(current)
    }
}

fn unit_matches(file_name: &str, pattern: &str) -> bool {
    file_name == pattern
        || file_name
            .strip_suffix(pattern)
            .is_some_and(|head| head.ends_with('/') || head.ends_with('\\'))
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

impl fmt::Display for EnumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enum#{}", self.0)
    }
}
