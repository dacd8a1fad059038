//! Declaration normalization.
//!
//! [`normalize`] runs once over the whole graph before any generator. It
//! marks declarations ignored, erases packed-storage bases in favor of a
//! synthetic `value` property, infers abstract classes, cleans up the
//! node-kind discriminant and applies enum renames. The result is a
//! [`NormalizedGraph`]; generators only accept that type.

use crate::enums::strip_item_prefix;
use astbridge_core::config::{DiscriminantConfig, NormalizeConfig};
use astbridge_core::naming::remove_suffix;
use astbridge_core::{BootstrapResult, ClassId, DeclGraph, DeclRef, EnumId, Property, TypeRef};
use std::ops::Deref;
use tracing::{debug, trace};

/// The node-kind enumeration after cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminant {
    /// Class the enumeration was declared in
    pub owner: ClassId,
    pub enumeration: EnumId,
    /// Root property holding the node kind
    pub property: String,
    /// Qualified source name of the owner (`clang::Stmt`)
    pub owner_source_name: String,
    /// Suffix removed from every item, restored when naming source items
    pub item_suffix: String,
}

/// A declaration graph that went through [`normalize`].
///
/// Ignored bases are gone from every class, so base-chain walks never see
/// erased storage types.
#[derive(Debug, Clone)]
pub struct NormalizedGraph {
    graph: DeclGraph,
    discriminant: Option<Discriminant>,
}

impl NormalizedGraph {
    pub fn graph(&self) -> &DeclGraph {
        &self.graph
    }

    pub fn discriminant(&self) -> Option<&Discriminant> {
        self.discriminant.as_ref()
    }

    /// Whether the discriminant has a generated item naming `class`.
    pub fn has_kind(&self, class: ClassId) -> bool {
        self.discriminant.as_ref().is_some_and(|d| {
            self.graph
                .enumeration(d.enumeration)
                .has_item(&self.graph.class(class).name)
        })
    }
}

impl Deref for NormalizedGraph {
    type Target = DeclGraph;

    fn deref(&self) -> &DeclGraph {
        &self.graph
    }
}

/// Normalize a declaration graph.
///
/// Fails when an enum override or the discriminant names a unit, class or
/// enumeration that is not in the graph.
pub fn normalize(
    mut graph: DeclGraph,
    config: &NormalizeConfig,
) -> BootstrapResult<NormalizedGraph> {
    apply_enum_overrides(&mut graph, config)?;

    let enum_ids: Vec<_> = graph.enum_ids().collect();
    for id in enum_ids {
        normalize_enum(&mut graph, id, config);
    }

    let discriminant = match &config.discriminant {
        Some(discriminant) => Some(clean_discriminant(&mut graph, discriminant)?),
        None => None,
    };

    let class_ids: Vec<_> = graph.class_ids().collect();
    for id in &class_ids {
        normalize_class(&mut graph, *id, config);
    }
    for id in &class_ids {
        graph.class_mut(*id).bases.retain(|b| !b.ignored);
    }

    let normalized = NormalizedGraph {
        graph,
        discriminant,
    };
    let inferred = infer_abstract(&normalized);
    let mut graph = normalized.graph;
    for id in inferred {
        debug!(class = %graph.class(id).name, "Inferred abstract class");
        graph.class_mut(id).is_abstract = true;
    }

    Ok(NormalizedGraph {
        graph,
        discriminant: normalized.discriminant,
    })
}

fn apply_enum_overrides(graph: &mut DeclGraph, config: &NormalizeConfig) -> BootstrapResult<()> {
    for o in &config.enum_overrides {
        let unit = graph.find_unit(&o.unit)?;
        let id = graph.find_enum(unit, &o.name)?;
        let enumeration = graph.enumeration_mut(id);
        if let Some(rename) = &o.rename {
            enumeration.name = rename.clone();
        }
        let keep = enumeration.namespace.len().saturating_sub(o.hoist);
        enumeration.namespace.truncate(keep);
        debug!(from = %o.name, to = %graph.qualified_name(DeclRef::Enum(id)), "Relocated enum");
    }
    Ok(())
}

fn normalize_enum(graph: &mut DeclGraph, id: EnumId, config: &NormalizeConfig) {
    let enumeration = graph.enumeration_mut(id);
    if enumeration.name.trim().is_empty() {
        trace!(enumeration = %id, "Ignoring anonymous enum");
        enumeration.ignored = true;
    }
    if config.ignored_enums.contains(&enumeration.name) {
        trace!(enumeration = %enumeration.name, "Ignoring enum");
        enumeration.ignored = true;
    }
    enumeration.is_scoped = true;
    strip_item_prefix(enumeration);
}

fn clean_discriminant(
    graph: &mut DeclGraph,
    config: &DiscriminantConfig,
) -> BootstrapResult<Discriminant> {
    let unit = graph.find_unit(&config.unit)?;
    let owner = graph.find_class(unit, &config.owner)?;
    let id = graph.find_enum(unit, &format!("{}::{}", config.owner, config.enum_name))?;

    graph.detach_nested(owner, DeclRef::Enum(id));
    let namespace = graph.class(owner).namespace.clone();

    let enumeration = graph.enumeration_mut(id);
    enumeration.namespace = namespace;
    for item in &mut enumeration.items {
        if config
            .ignored_prefixes
            .iter()
            .any(|prefix| item.name.starts_with(prefix.as_str()))
        {
            trace!(item = %item.name, "Ignoring discriminant item");
            item.ignored = true;
        }
        if !config.strip_suffix.is_empty() {
            item.name = remove_suffix(&item.name, &config.strip_suffix).to_string();
        }
    }

    Ok(Discriminant {
        owner,
        enumeration: id,
        property: config.property.clone(),
        owner_source_name: config.owner.clone(),
        item_suffix: config.strip_suffix.clone(),
    })
}

fn is_ignored_class_name(name: &str, config: &NormalizeConfig) -> bool {
    name.trim().is_empty()
        || config
            .ignored_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
        || config.ignored_names.iter().any(|n| n == name)
}

fn normalize_class(graph: &mut DeclGraph, id: ClassId, config: &NormalizeConfig) {
    let base_names: Vec<String> = graph
        .class(id)
        .bases
        .iter()
        .map(|b| graph.class(b.class).name.clone())
        .collect();

    let class = graph.class_mut(id);

    if config.abstract_classes.contains(&class.name) {
        class.is_abstract = true;
    }

    if is_ignored_class_name(&class.name, config) {
        trace!(class = %class.name, "Ignoring class");
        class.ignored = true;
    }

    for (base, base_name) in class.bases.iter_mut().zip(&base_names) {
        if config
            .ignored_base_patterns
            .iter()
            .any(|pattern| base_name.contains(pattern.as_str()))
        {
            trace!(class = %class.name, base = %base_name, "Ignoring base");
            base.ignored = true;
        }

        let Some(storage) = config.storage_bases.iter().find(|s| s.class == *base_name) else {
            continue;
        };
        trace!(class = %class.name, base = %base_name, "Erasing storage base");
        base.ignored = true;
        if !class.properties.iter().any(|p| p.name == storage.property) {
            let mut value =
                Property::new(storage.property.clone(), TypeRef::Builtin(storage.primitive));
            value.synthetic = true;
            class.properties.push(value);
        }
    }

    let excluded: Vec<&String> = config
        .excluded_properties
        .iter()
        .filter(|e| e.class == class.name)
        .flat_map(|e| e.properties.iter())
        .collect();

    for property in &mut class.properties {
        let ignore = property.name.trim().is_empty()
            || config.ignored_properties.contains(&property.name)
            || excluded.contains(&&property.name);
        if ignore && !property.ignored {
            trace!(class = %class.name, property = %property.name, "Ignoring property");
            property.ignored = true;
        }
    }

    for method in &mut class.methods {
        if method.name.trim().is_empty() {
            method.ignored = true;
        }
    }
}

/// Classes with two or more generated direct subclasses and no node kind of
/// their own name.
fn infer_abstract(graph: &NormalizedGraph) -> Vec<ClassId> {
    if graph.discriminant().is_none() {
        return Vec::new();
    }

    graph
        .class_ids()
        .filter(|id| {
            let class = graph.class(*id);
            !class.ignored && !class.is_abstract && !class.is_incomplete
        })
        .filter(|id| {
            let subclasses = graph
                .direct_subclasses(*id)
                .filter(|sub| {
                    let sub = graph.class(*sub);
                    !sub.ignored && !sub.is_incomplete
                })
                .count();
            subclasses >= 2 && !graph.has_kind(*id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use astbridge_core::config::StorageBase;
    use astbridge_core::{Class, Enumeration, Primitive};

    fn config() -> NormalizeConfig {
        NormalizeConfig {
            enum_overrides: Vec::new(),
            discriminant: None,
            ..NormalizeConfig::default()
        }
    }

    #[test]
    fn normalize___ignores_marker_names() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Stmt.h");
        let stmt = graph.add_class(unit, Class::new("Stmt"));
        let bits = graph.add_nested_class(stmt, Class::new("StmtBitfields"));
        let iter = graph.add_class(unit, Class::new("ChildIterator"));
        let shell = graph.add_class(unit, Class::new("EmptyShell"));
        let blank = graph.add_class(unit, Class::new(" "));

        let graph = normalize(graph, &config()).unwrap();

        for id in [bits, iter, shell, blank] {
            assert!(graph.class(id).ignored, "{} not ignored", graph.class(id).name);
        }
        assert!(!graph.class(stmt).ignored);
    }

    #[test]
    fn normalize___erases_integer_storage_base() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Expr.h");
        let storage = graph.add_class(unit, Class::new("APIntStorage"));
        let expr = graph.add_class(unit, Class::new("Expr"));
        let literal = graph.add_class(
            unit,
            Class::new("IntegerLiteral").with_base(storage).with_base(expr),
        );

        let graph = normalize(graph, &config()).unwrap();

        let literal = graph.class(literal);
        assert_eq!(literal.bases.len(), 1);
        assert_eq!(literal.bases[0].class, expr);
        let value = literal.property("value").unwrap();
        assert!(value.ty.is_primitive(Primitive::ULongLong));
        assert!(value.synthetic);
        assert!(graph.class(storage).ignored);
    }

    #[test]
    fn normalize___storage_base_keeps_existing_value_property() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Expr.h");
        let storage = graph.add_class(unit, Class::new("APFloatStorage"));
        let literal = graph.add_class(
            unit,
            Class::new("FloatingLiteral")
                .with_base(storage)
                .with_property("value", TypeRef::Builtin(Primitive::Double)),
        );

        let graph = normalize(graph, &config()).unwrap();

        let literal = graph.class(literal);
        assert_eq!(literal.properties.len(), 1);
        assert!(literal.properties[0].ty.is_primitive(Primitive::Double));
        assert!(literal.bases.is_empty());
    }

    #[test]
    fn normalize___custom_storage_base_primitive() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("A.h");
        let storage = graph.add_class(unit, Class::new("Packed"));
        let node = graph.add_class(unit, Class::new("Node").with_base(storage));
        let config = NormalizeConfig {
            storage_bases: vec![StorageBase {
                class: "Packed".to_string(),
                property: "bits".to_string(),
                primitive: Primitive::UInt,
            }],
            ..config()
        };

        let graph = normalize(graph, &config).unwrap();

        assert!(graph.class(node).property("bits").is_some());
    }

    #[test]
    fn normalize___drops_trailing_objects_base() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Expr.h");
        let expr = graph.add_class(unit, Class::new("Expr"));
        let trailing = graph.add_class(unit, Class::new("TrailingObjects"));
        let call = graph.add_class(
            unit,
            Class::new("CallExpr").with_base(trailing).with_base(expr),
        );

        let graph = normalize(graph, &config()).unwrap();

        assert_eq!(graph.base_class(call), Some(expr));
    }

    #[test]
    fn normalize___excludes_root_family_properties() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Expr.h");
        let expr = graph.add_class(
            unit,
            Class::new("Expr")
                .with_property("isObjCSelfExpr", TypeRef::Builtin(Primitive::Bool))
                .with_property("isValueDependent", TypeRef::Builtin(Primitive::Bool)),
        );
        let other = graph.add_class(
            unit,
            Class::new("Other")
                .with_property("isObjCSelfExpr", TypeRef::Builtin(Primitive::Bool))
                .with_property("stripLabelLikeStatements", TypeRef::Builtin(Primitive::Bool)),
        );

        let graph = normalize(graph, &config()).unwrap();

        let names: Vec<_> = graph
            .class(expr)
            .generated_properties()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["isValueDependent"]);
        let other: Vec<_> = graph
            .class(other)
            .generated_properties()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(other, vec!["isObjCSelfExpr"]);
    }

    #[test]
    fn normalize___marks_abstract_markers() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Stmt.h");
        let stmt = graph.add_class(unit, Class::new("Stmt"));
        let null = graph.add_class(unit, Class::new("NullStmt").with_base(stmt));

        let graph = normalize(graph, &config()).unwrap();

        assert!(graph.class(stmt).is_abstract);
        assert!(!graph.class(null).is_abstract);
    }

    #[test]
    fn normalize___enums_become_scoped_and_anonymous_ignored() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("OperationKinds.h");
        let kind = graph.add_enum(
            unit,
            Enumeration::new("BinaryOperatorKind").with_items(&["BO_Add", "BO_Sub", "BO_Mul"]),
        );
        let anonymous = graph.add_enum(unit, Enumeration::new(""));
        let semantics = graph.add_enum(unit, Enumeration::new("APFloatSemantics"));

        let graph = normalize(graph, &config()).unwrap();

        let kind = graph.enumeration(kind);
        assert!(kind.is_scoped);
        assert_eq!(kind.items[0].name, "Add");
        assert!(graph.enumeration(anonymous).ignored);
        assert!(graph.enumeration(semantics).ignored);
    }

    fn discriminant_graph() -> (DeclGraph, ClassId, EnumId) {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("clang/AST/Stmt.h");
        let stmt = graph.add_class(unit, Class::new("Stmt").in_namespace(&["clang"]));
        let kind = graph.add_nested_enum(
            stmt,
            Enumeration::new("StmtClass")
                .in_namespace(&["clang", "Stmt"])
                .with_items(&[
                    "NoStmtClass",
                    "firstStmtConstant",
                    "NullStmtClass",
                    "OMPParallelDirectiveClass",
                    "ObjCAtTryStmtClass",
                    "lastStmtConstant",
                ]),
        );
        (graph, stmt, kind)
    }

    #[test]
    fn normalize___cleans_discriminant() {
        let (graph, stmt, kind) = discriminant_graph();
        let config = NormalizeConfig {
            enum_overrides: Vec::new(),
            ..NormalizeConfig::default()
        };

        let graph = normalize(graph, &config).unwrap();

        let discriminant = graph.discriminant().unwrap();
        assert_eq!(discriminant.enumeration, kind);
        assert_eq!(discriminant.owner, stmt);
        let enumeration = graph.enumeration(kind);
        let items: Vec<_> = enumeration.generated_items().map(|i| i.name.as_str()).collect();
        assert_eq!(items, vec!["NoStmt", "NullStmt"]);
        assert_eq!(enumeration.namespace, vec!["clang".to_string()]);
        assert!(graph.class(stmt).nested.is_empty());
    }

    #[test]
    fn normalize___missing_discriminant_is_lookup_failure() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("Stmt.h");
        graph.add_class(unit, Class::new("Stmt").in_namespace(&["clang"]));
        let config = NormalizeConfig {
            enum_overrides: Vec::new(),
            ..NormalizeConfig::default()
        };

        let err = normalize(graph, &config).unwrap_err();

        assert!(err.is_lookup_failure());
    }

    #[test]
    fn normalize___infers_abstract_without_own_kind() {
        let (mut graph, stmt, _) = discriminant_graph();
        let unit = graph.find_unit("Stmt.h").unwrap();
        let switch = graph.add_class(
            unit,
            Class::new("SwitchLike").in_namespace(&["clang"]).with_base(stmt),
        );
        graph.add_class(unit, Class::new("CaseA").in_namespace(&["clang"]).with_base(switch));
        graph.add_class(unit, Class::new("CaseB").in_namespace(&["clang"]).with_base(switch));
        let config = NormalizeConfig {
            enum_overrides: Vec::new(),
            ..NormalizeConfig::default()
        };

        let graph = normalize(graph, &config).unwrap();

        assert!(graph.class(switch).is_abstract);
    }

    #[test]
    fn normalize___applies_enum_override() {
        let mut graph = DeclGraph::new();
        let unit = graph.add_unit("llvm/ADT/APFloat.h");
        let base = graph.add_class(unit, Class::new("APFloatBase").in_namespace(&["llvm"]));
        let semantics = graph.add_nested_enum(
            base,
            Enumeration::new("Semantics").in_namespace(&["llvm", "APFloatBase"]),
        );
        let config = NormalizeConfig {
            enum_overrides: NormalizeConfig::default()
                .enum_overrides
                .into_iter()
                .filter(|o| o.unit == "APFloat.h")
                .collect(),
            discriminant: None,
            ..NormalizeConfig::default()
        };

        let graph = normalize(graph, &config).unwrap();

        assert_eq!(graph.qualified_name(DeclRef::Enum(semantics)), "FloatSemantics");
        assert_eq!(graph.find_enum_anywhere("FloatSemantics").unwrap(), semantics);
    }
}
