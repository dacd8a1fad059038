//! Type name rendering for native and managed output.
//!
//! A [`TypePrinter`] renders [`TypeRef`]s and declaration names for one
//! [`Flavor`]. How much qualification a name gets is controlled by a stack of
//! [`PrintScope`]s. Scopes are pushed through [`TypePrinter::push_scope`],
//! which returns a [`ScopeGuard`]; the previous scope is restored when the
//! guard drops, whichever way the enclosing code exits.
//!
//! ```
//! use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
//!
//! let mut printer = TypePrinter::new(Flavor::Native, "clang");
//! {
//!     let local = printer.push_scope(PrintScope::Local);
//!     assert_eq!(local.scope(), PrintScope::Local);
//! }
//! assert_eq!(printer.scope(), PrintScope::Qualified);
//! ```

use crate::decl::{DeclGraph, DeclRef, Primitive, TypeRef};
use std::ops::{Deref, DerefMut};

/// Target object model of the rendered names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// C++ declarations (`::` separators, raw pointers).
    Native,
    /// C# declarations (`.` separators, references).
    Managed,
}

/// How much qualification rendered names carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintScope {
    /// Bare declaration names.
    Local,
    /// Names prefixed with their enclosing scopes, minus the origin namespace.
    Qualified,
}

/// Renders type and declaration names.
#[derive(Debug, Clone)]
pub struct TypePrinter {
    flavor: Flavor,
    scopes: Vec<PrintScope>,
    origin_namespace: String,
}

impl TypePrinter {
    /// Create a printer whose base scope is [`PrintScope::Qualified`].
    ///
    /// `origin_namespace` is the top-level namespace of the parsed headers;
    /// it never appears in rendered names.
    pub fn new(flavor: Flavor, origin_namespace: impl Into<String>) -> Self {
        Self {
            flavor,
            scopes: vec![PrintScope::Qualified],
            origin_namespace: origin_namespace.into(),
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// The innermost active scope.
    pub fn scope(&self) -> PrintScope {
        self.scopes
            .last()
            .copied()
            .unwrap_or(PrintScope::Qualified)
    }

    /// Number of scopes currently pushed, including the base scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Enter `scope` until the returned guard drops.
    pub fn push_scope(&mut self, scope: PrintScope) -> ScopeGuard<'_> {
        self.scopes.push(scope);
        ScopeGuard { printer: self }
    }

    fn separator(&self) -> &'static str {
        match self.flavor {
            Flavor::Native => "::",
            Flavor::Managed => ".",
        }
    }

    /// Name of a declaration under the current scope.
    pub fn decl_name(&self, graph: &DeclGraph, decl: DeclRef) -> String {
        let name = graph.name_of(decl);
        match self.scope() {
            PrintScope::Local => name.to_string(),
            PrintScope::Qualified => {
                let mut parts: Vec<&str> = self
                    .strip_origin(graph.namespace_of(decl))
                    .iter()
                    .map(String::as_str)
                    .collect();
                parts.push(name);
                parts.join(self.separator())
            }
        }
    }

    fn strip_origin<'n>(&self, namespace: &'n [String]) -> &'n [String] {
        match namespace.split_first() {
            Some((head, rest)) if *head == self.origin_namespace => rest,
            _ => namespace,
        }
    }

    /// Remove a leading origin namespace token from an already rendered name.
    ///
    /// `clang.Stmt` and `clang::Stmt` both become `Stmt`.
    pub fn strip_origin_prefix<'a>(&self, name: &'a str) -> &'a str {
        if self.origin_namespace.is_empty() {
            return name;
        }
        name.strip_prefix(self.origin_namespace.as_str())
            .and_then(|rest| rest.strip_prefix("::").or_else(|| rest.strip_prefix('.')))
            .unwrap_or(name)
    }

    /// Render a type under the current scope.
    pub fn print(&self, graph: &DeclGraph, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Builtin(primitive) => self.primitive(*primitive).to_string(),
            TypeRef::Enum(id) => self.decl_name(graph, DeclRef::Enum(*id)),
            TypeRef::Class(id) => self.decl_name(graph, DeclRef::Class(*id)),
            TypeRef::Named(name) => self.named(name),
            TypeRef::Pointer(inner) => match self.flavor {
                Flavor::Native => format!("{}*", self.print(graph, inner)),
                Flavor::Managed => match inner.as_ref() {
                    TypeRef::Builtin(_) => "IntPtr".to_string(),
                    other => self.print(graph, other),
                },
            },
        }
    }

    fn named(&self, name: &str) -> String {
        let name = self.strip_origin_prefix(name);
        let name = match self.scope() {
            PrintScope::Local => name.rsplit("::").next().unwrap_or(name),
            PrintScope::Qualified => name,
        };
        match self.flavor {
            Flavor::Native => name.to_string(),
            Flavor::Managed => name.replace("::", "."),
        }
    }

    fn primitive(&self, primitive: Primitive) -> &'static str {
        match self.flavor {
            Flavor::Native => match primitive {
                Primitive::Void => "void",
                Primitive::Bool => "bool",
                Primitive::Char => "char",
                Primitive::Short => "short",
                Primitive::UShort => "unsigned short",
                Primitive::Int => "int",
                Primitive::UInt => "unsigned int",
                Primitive::Long => "long",
                Primitive::ULong => "unsigned long",
                Primitive::LongLong => "long long",
                Primitive::ULongLong => "unsigned long long",
                Primitive::Float => "float",
                Primitive::Double => "double",
                Primitive::LongDouble => "long double",
                Primitive::String => "std::string",
            },
            Flavor::Managed => match primitive {
                Primitive::Void => "void",
                Primitive::Bool => "bool",
                Primitive::Char => "sbyte",
                Primitive::Short => "short",
                Primitive::UShort => "ushort",
                Primitive::Int | Primitive::Long => "int",
                Primitive::UInt | Primitive::ULong => "uint",
                Primitive::LongLong => "long",
                Primitive::ULongLong => "ulong",
                Primitive::Float => "float",
                Primitive::Double | Primitive::LongDouble => "double",
                Primitive::String => "string",
            },
        }
    }
}

/// Keeps a pushed [`PrintScope`] active; pops it on drop.
///
/// Derefs to the printer, so nested scopes are pushed through the guard.
pub struct ScopeGuard<'p> {
    printer: &'p mut TypePrinter,
}

impl Deref for ScopeGuard<'_> {
    type Target = TypePrinter;

    fn deref(&self) -> &TypePrinter {
        self.printer
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut TypePrinter {
        self.printer
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.printer.scopes.pop();
    }
}
