//! Generation families and the context shared by the generators.

use crate::collect::SubclassSet;
use crate::normalize::NormalizedGraph;
use astbridge_core::config::FamilyConfig;
use astbridge_core::{
    BootstrapConfig, BootstrapError, BootstrapResult, ClassId, DeclRef, EnumId, UnitId,
};
use std::collections::HashSet;
use tracing::debug;

/// One generation pass: a root class, its derived classes and the enums
/// emitted alongside them.
#[derive(Debug, Clone)]
pub struct Family<'c> {
    pub config: &'c FamilyConfig,
    pub root: ClassId,
    pub units: Vec<UnitId>,
    pub classes: SubclassSet,
    pub enums: Vec<EnumId>,
    /// Whether this family's root is the managed dispatch root
    pub is_dispatch: bool,
}

impl<'c> Family<'c> {
    /// Look up the family's anchors and collect its classes.
    ///
    /// Every unit, the root class and each listed enum must exist.
    pub fn resolve(
        graph: &NormalizedGraph,
        config: &'c FamilyConfig,
        bootstrap: &BootstrapConfig,
    ) -> BootstrapResult<Self> {
        let units = config
            .units
            .iter()
            .map(|pattern| graph.find_unit(pattern))
            .collect::<BootstrapResult<Vec<_>>>()?;
        let Some(first) = units.first() else {
            return Err(BootstrapError::Config(format!(
                "family '{}' has no units",
                config.name
            )));
        };
        let root = graph.find_class(*first, &config.root)?;
        let is_dispatch = bootstrap.is_dispatch(config);

        let mut enums = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |id: EnumId, enums: &mut Vec<EnumId>| {
            if seen.insert(id) {
                enums.push(id);
            }
        };

        if is_dispatch && let Some(discriminant) = graph.discriminant() {
            push(discriminant.enumeration, &mut enums);
        }
        for pattern in &config.enum_units {
            let unit = graph.find_unit(pattern)?;
            for decl in graph.traverse(&[unit]) {
                if let DeclRef::Enum(id) = decl
                    && !graph.enumeration(id).ignored
                {
                    push(id, &mut enums);
                }
            }
        }
        for source in &config.enums {
            let unit = graph.find_unit(&source.unit)?;
            push(graph.find_enum(unit, &source.name)?, &mut enums);
        }

        let classes = SubclassSet::collect(graph, root, &units);
        debug!(
            family = %config.name,
            classes = classes.len(),
            enums = enums.len(),
            "Collected family"
        );

        Ok(Self {
            config,
            root,
            units,
            classes,
            enums,
            is_dispatch,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Parameter name used in generated routines (`stmt`, `expr`).
    pub fn param_name(&self) -> String {
        self.config.name.to_lowercase()
    }
}

/// Read-only inputs shared by every generator.
pub struct GenContext<'a> {
    pub graph: &'a NormalizedGraph,
    pub config: &'a BootstrapConfig,
    pub families: &'a [Family<'a>],
}

impl<'a> GenContext<'a> {
    pub fn new(
        graph: &'a NormalizedGraph,
        config: &'a BootstrapConfig,
        families: &'a [Family<'a>],
    ) -> Self {
        Self {
            graph,
            config,
            families,
        }
    }

    /// Other families holding a base class of one of `family`'s classes.
    pub fn dependencies(&self, family: &Family<'_>) -> Vec<&'a Family<'a>> {
        self.families
            .iter()
            .filter(|other| other.name() != family.name())
            .filter(|other| {
                family.classes.iter().any(|id| {
                    self.graph.base_class(id).is_some_and(|base| {
                        !family.classes.contains(base) && other.classes.contains(base)
                    })
                })
            })
            .collect()
    }

    /// Classes of every family, dispatch family first.
    pub fn all_classes(&self) -> SubclassSet {
        let mut ordered: Vec<&Family<'_>> =
            self.families.iter().filter(|f| f.is_dispatch).collect();
        ordered.extend(self.families.iter().filter(|f| !f.is_dispatch));

        let mut all = SubclassSet::from_members(std::iter::empty());
        for family in ordered {
            all.extend(&family.classes);
        }
        all
    }

    /// Whether another generated class derives directly from `id`.
    pub fn is_inherited(&self, id: ClassId) -> bool {
        self.graph.direct_subclasses(id).any(|sub| {
            let class = self.graph.class(sub);
            !class.ignored && !class.is_incomplete
        })
    }

    /// Name of the interface concrete managed classes dispatch to.
    pub fn dispatch_interface(&self) -> String {
        format!("I{}Visitor", self.config.dispatch_root)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::normalize::normalize;
    use astbridge_core::config::{EnumSource, NormalizeConfig};
    use astbridge_core::{Class, DeclGraph, Enumeration};

    fn graph() -> NormalizedGraph {
        let mut graph = DeclGraph::new();
        let stmt_h = graph.add_unit("clang/AST/Stmt.h");
        let expr_h = graph.add_unit("clang/AST/Expr.h");
        let ops_h = graph.add_unit("clang/AST/OperationKinds.h");
        let ns = &["clang"];
        let stmt = graph.add_class(stmt_h, Class::new("Stmt").in_namespace(ns));
        let value = graph.add_class(stmt_h, Class::new("ValueStmt").in_namespace(ns).with_base(stmt));
        graph.add_class(stmt_h, Class::new("NullStmt").in_namespace(ns).with_base(stmt));
        let expr = graph.add_class(expr_h, Class::new("Expr").in_namespace(ns).with_base(value));
        graph.add_class(expr_h, Class::new("ParenExpr").in_namespace(ns).with_base(expr));
        graph.add_enum(
            ops_h,
            Enumeration::new("CastKind").in_namespace(ns).with_items(&["CK_A", "CK_B", "CK_C"]),
        );
        graph.add_enum(ops_h, Enumeration::new("").with_items(&["X"]));
        let config = NormalizeConfig {
            enum_overrides: Vec::new(),
            discriminant: None,
            ..NormalizeConfig::default()
        };
        normalize(graph, &config).unwrap()
    }

    fn family(name: &str, root: &str, units: &[&str]) -> FamilyConfig {
        FamilyConfig {
            name: name.to_string(),
            root: root.to_string(),
            units: units.iter().map(|s| s.to_string()).collect(),
            enum_units: Vec::new(),
            enums: Vec::new(),
            walker: format!("Walk{name}"),
        }
    }

    fn bootstrap(families: &[&FamilyConfig]) -> BootstrapConfig {
        BootstrapConfig {
            families: families.iter().map(|f| (*f).clone()).collect(),
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn Family___resolve___collects_root_and_subclasses() {
        let graph = graph();
        let config = family("Stmt", "clang::Stmt", &["Stmt.h"]);

        let family = Family::resolve(&graph, &config, &bootstrap(&[&config])).unwrap();

        let names: Vec<_> = family.classes.iter().map(|id| graph.class(id).name.as_str()).collect();
        assert_eq!(names, vec!["Stmt", "ValueStmt", "NullStmt"]);
        assert!(family.is_dispatch);
        assert_eq!(family.param_name(), "stmt");
    }

    #[test]
    fn Family___resolve___enum_units_skip_ignored_enums() {
        let graph = graph();
        let mut config = family("Expr", "clang::Expr", &["Expr.h"]);
        config.enum_units = vec!["OperationKinds.h".to_string()];

        let family = Family::resolve(&graph, &config, &bootstrap(&[&config])).unwrap();

        assert_eq!(family.enums.len(), 1);
        assert_eq!(graph.enumeration(family.enums[0]).name, "CastKind");
        assert!(!family.is_dispatch);
    }

    #[test]
    fn Family___resolve___missing_enum_is_fatal() {
        let graph = graph();
        let mut config = family("Expr", "clang::Expr", &["Expr.h"]);
        config.enums = vec![EnumSource {
            unit: "OperationKinds.h".to_string(),
            name: "clang::UnaryOperatorKind".to_string(),
        }];

        let err = Family::resolve(&graph, &config, &bootstrap(&[&config])).unwrap_err();

        assert!(err.is_lookup_failure());
    }

    #[test]
    fn Family___resolve___root_outside_first_unit_is_fatal() {
        let graph = graph();
        let config = family("Expr", "clang::Expr", &["Stmt.h"]);

        assert!(Family::resolve(&graph, &config, &bootstrap(&[&config])).is_err());
    }

    #[test]
    fn GenContext___dependencies___follow_base_classes() {
        let graph = graph();
        let stmt_config = family("Stmt", "clang::Stmt", &["Stmt.h"]);
        let expr_config = family("Expr", "clang::Expr", &["Expr.h"]);
        let bootstrap = bootstrap(&[&expr_config, &stmt_config]);
        let families = vec![
            Family::resolve(&graph, &expr_config, &bootstrap).unwrap(),
            Family::resolve(&graph, &stmt_config, &bootstrap).unwrap(),
        ];
        let ctx = GenContext::new(&graph, &bootstrap, &families);

        let expr_deps: Vec<_> = ctx.dependencies(&families[0]).iter().map(|f| f.name()).collect();
        let stmt_deps = ctx.dependencies(&families[1]);

        assert_eq!(expr_deps, vec!["Stmt"]);
        assert!(stmt_deps.is_empty());
        let all: Vec<_> = ctx.all_classes().iter().map(|id| graph.class(id).name.as_str()).collect();
        assert_eq!(all, vec!["Stmt", "ValueStmt", "NullStmt", "Expr", "ParenExpr"]);
    }
}
