//! Marshaling rules for copying native values into managed nodes.
//!
//! [`Marshaler::classify`] picks the first matching [`MarshalRule`] in
//! priority order. Rules 2 to 8 match on the rendered managed type name;
//! with structural classification enabled, a class-typed value also matches
//! the statement, expression and declaration rules through its base chain.

use crate::normalize::NormalizedGraph;
use astbridge_core::config::{MarshalConfig, RoutineNames};
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{BootstrapConfig, ClassId, DeclRef, Primitive, TypeRef};
use std::fmt;
use tracing::warn;

/// A conversion from a native value to its managed counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarshalRule {
    EnumCast,
    SourceLocation,
    SourceRange,
    Statement,
    Expression,
    Declaration,
    QualifiedType,
    TemplateArgument,
    /// Pass the value through unchanged.
    Identity,
}

impl MarshalRule {
    /// Rules in the order they are tried.
    pub const PRIORITY: [MarshalRule; 9] = [
        MarshalRule::EnumCast,
        MarshalRule::SourceLocation,
        MarshalRule::SourceRange,
        MarshalRule::Statement,
        MarshalRule::Expression,
        MarshalRule::Declaration,
        MarshalRule::QualifiedType,
        MarshalRule::TemplateArgument,
        MarshalRule::Identity,
    ];

    /// Substrings of the managed type name selecting this rule.
    fn name_patterns(self) -> &'static [&'static str] {
        match self {
            MarshalRule::SourceLocation => &["SourceLocation"],
            MarshalRule::SourceRange => &["SourceRange"],
            MarshalRule::Statement => &["Stmt"],
            MarshalRule::Expression => &["Expr"],
            MarshalRule::Declaration => &["Decl", "Function", "Method", "Field"],
            MarshalRule::QualifiedType => &["QualifiedType"],
            MarshalRule::TemplateArgument => &["TemplateArgument"],
            MarshalRule::EnumCast | MarshalRule::Identity => &[],
        }
    }

    /// Whether the value is converted as a polymorphic node and downcast.
    pub fn is_node(self) -> bool {
        matches!(
            self,
            MarshalRule::Statement | MarshalRule::Expression | MarshalRule::Declaration
        )
    }

    fn routine(self, routines: &RoutineNames) -> Option<&str> {
        match self {
            MarshalRule::SourceLocation => Some(&routines.source_location),
            MarshalRule::SourceRange => Some(&routines.source_range),
            MarshalRule::Statement => Some(&routines.statement),
            MarshalRule::Expression => Some(&routines.expression),
            MarshalRule::Declaration => Some(&routines.declaration),
            MarshalRule::QualifiedType => Some(&routines.qualified_type),
            MarshalRule::TemplateArgument => Some(&routines.template_argument),
            MarshalRule::EnumCast | MarshalRule::Identity => None,
        }
    }
}

impl fmt::Display for MarshalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarshalRule::EnumCast => "enum-cast",
            MarshalRule::SourceLocation => "source-location",
            MarshalRule::SourceRange => "source-range",
            MarshalRule::Statement => "statement",
            MarshalRule::Expression => "expression",
            MarshalRule::Declaration => "declaration",
            MarshalRule::QualifiedType => "qualified-type",
            MarshalRule::TemplateArgument => "template-argument",
            MarshalRule::Identity => "identity",
        };
        f.write_str(name)
    }
}

/// Selects and renders marshaling rules for one normalized graph.
pub struct Marshaler<'a> {
    graph: &'a NormalizedGraph,
    config: &'a MarshalConfig,
    structural: bool,
    statement_root: Option<ClassId>,
    expression_root: Option<ClassId>,
    declaration_roots: Vec<ClassId>,
    origin_namespace: &'a str,
}

impl<'a> Marshaler<'a> {
    pub fn new(graph: &'a NormalizedGraph, config: &'a BootstrapConfig) -> Self {
        let marshal = &config.marshal;
        let by_name = |name: &str| {
            graph
                .find_class_anywhere(name)
                .ok()
                .filter(|id| !graph.class(*id).ignored)
        };
        Self {
            graph,
            config: marshal,
            structural: config.structural_classification,
            statement_root: by_name(marshal.statement_root.as_str()),
            expression_root: by_name(marshal.expression_root.as_str()),
            declaration_roots: marshal
                .declaration_roots
                .iter()
                .filter_map(|name| by_name(name.as_str()))
                .collect(),
            origin_namespace: &config.origin_namespace,
        }
    }

    /// Pick the rule for a value of type `ty`.
    pub fn classify(&self, ty: &TypeRef) -> MarshalRule {
        if ty.pointee().as_enum().is_some() {
            return MarshalRule::EnumCast;
        }

        let type_name = format!("AST.{}", self.managed_type_name(ty));
        let class = ty.referenced_class();
        MarshalRule::PRIORITY[1..]
            .iter()
            .copied()
            .find(|rule| {
                rule.name_patterns()
                    .iter()
                    .any(|pattern| type_name.contains(pattern))
                    || class.is_some_and(|c| self.structurally_matches(*rule, c))
            })
            .unwrap_or(MarshalRule::Identity)
    }

    fn structurally_matches(&self, rule: MarshalRule, class: ClassId) -> bool {
        if !self.structural {
            return false;
        }
        let derived = |root: Option<ClassId>| {
            root.is_some_and(|root| self.graph.is_derived_from(class, root))
        };
        match rule {
            MarshalRule::Statement => {
                derived(self.statement_root) && !derived(self.expression_root)
            }
            MarshalRule::Expression => derived(self.expression_root),
            MarshalRule::Declaration => self
                .declaration_roots
                .iter()
                .any(|root| self.graph.is_derived_from(class, *root)),
            _ => false,
        }
    }

    fn managed_type_name(&self, ty: &TypeRef) -> String {
        let mut printer = TypePrinter::new(Flavor::Managed, self.origin_namespace);
        let local = printer.push_scope(PrintScope::Local);
        local.print(self.graph, ty)
    }

    fn native_type_name(&self, ty: &TypeRef) -> String {
        let mut printer = TypePrinter::new(Flavor::Native, self.origin_namespace);
        let local = printer.push_scope(PrintScope::Local);
        local.print(self.graph, ty)
    }

    fn qualified_enum(&self, ty: &TypeRef, flavor: Flavor) -> Option<String> {
        let id = ty.pointee().as_enum()?;
        let printer = TypePrinter::new(flavor, self.origin_namespace);
        Some(printer.decl_name(self.graph, DeclRef::Enum(id)))
    }

    /// Managed expression converting `value` of type `ty`.
    ///
    /// `context` names the member for the warning logged when no rule
    /// beyond identity applies to a non-builtin type.
    pub fn managed(&self, ty: &TypeRef, value: &str, context: &str) -> String {
        let rule = self.classify(ty);
        match rule {
            MarshalRule::EnumCast => match self.qualified_enum(ty, Flavor::Managed) {
                Some(name) => format!("(AST.{name}) {value}"),
                None => value.to_string(),
            },
            MarshalRule::Identity => {
                self.report_identity(ty, context);
                value.to_string()
            }
            _ => {
                let routine = rule.routine(&self.config.managed).unwrap_or_default();
                if rule.is_node() {
                    format!(
                        "{routine}({value}) as AST.{}",
                        self.managed_type_name(ty)
                    )
                } else {
                    format!("{routine}({value})")
                }
            }
        }
    }

    /// Native expression converting `value`, read from the source AST, into
    /// the generated native node.
    pub fn native(&self, ty: &TypeRef, value: &str) -> String {
        let rule = self.classify(ty);
        match rule {
            MarshalRule::EnumCast => match self.qualified_enum(ty, Flavor::Native) {
                Some(name) => format!("(AST::{name}) {value}"),
                None => value.to_string(),
            },
            MarshalRule::Identity => {
                if ty.is_primitive(Primitive::String) {
                    format!("{value}.str()")
                } else {
                    value.to_string()
                }
            }
            _ => {
                let routine = rule.routine(&self.config.native).unwrap_or_default();
                if rule.is_node() {
                    format!(
                        "static_cast<AST::{}*>({routine}({value}))",
                        self.native_type_name(ty.pointee())
                    )
                } else {
                    format!("{routine}({value})")
                }
            }
        }
    }

    fn report_identity(&self, ty: &TypeRef, context: &str) {
        if matches!(ty.pointee(), TypeRef::Builtin(_)) {
            return;
        }
        warn!(
            member = %context,
            ty = %self.managed_type_name(ty),
            "No marshaling rule matched, passing value through unchanged"
        );
    }
}
