//! Bootstrap configuration
//!
//! Every field has a default reproducing the clang statement/expression
//! bootstrap, so an empty TOML file is a valid configuration.

use crate::decl::Primitive;
use crate::error::{BootstrapError, BootstrapResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level configuration of one bootstrap run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Top-level namespace of the parsed headers, stripped from emitted names
    #[serde(default = "default_origin_namespace")]
    pub origin_namespace: String,

    /// Namespace of the generated native declarations
    #[serde(default = "default_native_namespace")]
    pub native_namespace: String,

    /// Namespace of the generated managed declarations
    #[serde(default = "default_managed_namespace")]
    pub managed_namespace: String,

    /// Namespace of the generated converters
    #[serde(default = "default_converter_namespace")]
    pub converter_namespace: String,

    /// Export macro placed on every native class
    #[serde(default = "default_export_macro")]
    pub export_macro: String,

    /// Root class whose family carries managed `Visit` dispatch
    #[serde(default = "default_dispatch_root")]
    pub dispatch_root: String,

    /// Classify marshaled types by the referenced declaration as well as by name
    #[serde(default = "default_true")]
    pub structural_classification: bool,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub marshal: MarshalConfig,

    /// Generation passes, in the order their classes are collected
    #[serde(default = "default_families", rename = "family")]
    pub families: Vec<FamilyConfig>,
}

/// Rules applied by the declaration normalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Classes whose name ends with one of these are ignored
    pub ignored_suffixes: Vec<String>,

    /// Declarations with exactly these names are ignored
    pub ignored_names: Vec<String>,

    /// Base specifiers whose class name contains one of these are ignored
    pub ignored_base_patterns: Vec<String>,

    /// Properties with these names are ignored on every class
    pub ignored_properties: Vec<String>,

    /// Enumerations with these names are ignored
    pub ignored_enums: Vec<String>,

    /// Classes always marked abstract
    pub abstract_classes: Vec<String>,

    /// Implementation-only bases replaced by a `value` property
    pub storage_bases: Vec<StorageBase>,

    /// Properties excluded on specific root-family classes
    pub excluded_properties: Vec<ExcludedProperties>,

    /// Renames and relocations of specific enumerations
    pub enum_overrides: Vec<EnumOverride>,

    /// Node-kind enumeration used as the dispatch discriminant
    pub discriminant: Option<DiscriminantConfig>,
}

/// A packed-storage base class and the scalar that replaces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageBase {
    pub class: String,

    #[serde(default = "default_value_property")]
    pub property: String,

    pub primitive: Primitive,
}

/// Properties removed from one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedProperties {
    pub class: String,
    pub properties: Vec<String>,
}

/// Rename and/or hoist one enumeration out of its enclosing scopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOverride {
    /// Unit holding the enumeration
    pub unit: String,

    /// Qualified name before the override (`llvm::APFloatBase::Semantics`)
    pub name: String,

    #[serde(default)]
    pub rename: Option<String>,

    /// Number of enclosing scopes to drop
    #[serde(default)]
    pub hoist: usize,
}

/// The node-kind enumeration nested in a root class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscriminantConfig {
    /// Unit holding the owner class
    pub unit: String,

    /// Qualified name of the class owning the enumeration
    pub owner: String,

    /// Name of the enumeration inside the owner
    pub enum_name: String,

    /// Root property holding the discriminant value
    pub property: String,

    /// Items starting with one of these are ignored
    #[serde(default)]
    pub ignored_prefixes: Vec<String>,

    /// Suffix removed from every item name
    #[serde(default)]
    pub strip_suffix: String,
}

/// One generation pass over a root class and its derived classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Family name, used in artifact names (`Stmt`, `Expr`)
    pub name: String,

    /// Qualified name of the root class
    pub root: String,

    /// Units traversed by the subclass collector; the root is looked up in the first
    pub units: Vec<String>,

    /// Units whose enumerations are all emitted with the family
    #[serde(default)]
    pub enum_units: Vec<String>,

    /// Individual enumerations emitted with the family
    #[serde(default)]
    pub enums: Vec<EnumSource>,

    /// Native parser routine walking nodes of this family
    pub walker: String,
}

/// A single enumeration looked up in a specific unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSource {
    pub unit: String,
    pub name: String,
}

/// Conversion routines referenced by the marshaling rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarshalConfig {
    #[serde(default = "RoutineNames::managed")]
    pub managed: RoutineNames,

    #[serde(default = "RoutineNames::native")]
    pub native: RoutineNames,

    /// Qualified root class of statements, for structural classification
    #[serde(default = "default_statement_root")]
    pub statement_root: String,

    /// Qualified root class of expressions, for structural classification
    #[serde(default = "default_expression_root")]
    pub expression_root: String,

    /// Qualified root classes of declarations, for structural classification
    #[serde(default = "default_declaration_roots")]
    pub declaration_roots: Vec<String>,
}

/// Routine names, one per non-trivial marshaling rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineNames {
    pub source_location: String,
    pub source_range: String,
    pub statement: String,
    pub expression: String,
    pub declaration: String,
    pub qualified_type: String,
    pub template_argument: String,
}

impl RoutineNames {
    /// Routines of the managed converter
    pub fn managed() -> Self {
        Self {
            source_location: "VisitSourceLocation".to_string(),
            source_range: "VisitSourceRange".to_string(),
            statement: "VisitStatement".to_string(),
            expression: "VisitExpression".to_string(),
            declaration: "VisitDeclaration".to_string(),
            qualified_type: "VisitQualifiedType".to_string(),
            template_argument: "VisitTemplateArgument".to_string(),
        }
    }

    /// Routines of the native parser
    pub fn native() -> Self {
        Self {
            source_location: "WalkSourceLocation".to_string(),
            source_range: "WalkSourceRange".to_string(),
            statement: "WalkStatement".to_string(),
            expression: "WalkExpression".to_string(),
            declaration: "WalkDeclaration".to_string(),
            qualified_type: "GetQualifiedType".to_string(),
            template_argument: "WalkTemplateArgument".to_string(),
        }
    }

    fn all(&self) -> [&str; 7] {
        [
            &self.source_location,
            &self.source_range,
            &self.statement,
            &self.expression,
            &self.declaration,
            &self.qualified_type,
            &self.template_argument,
        ]
    }
}

fn default_origin_namespace() -> String {
    "clang".to_string()
}

fn default_native_namespace() -> String {
    "CppSharp::CppParser::AST".to_string()
}

fn default_managed_namespace() -> String {
    "CppSharp.AST".to_string()
}

fn default_converter_namespace() -> String {
    "CppSharp".to_string()
}

fn default_export_macro() -> String {
    "CS_API".to_string()
}

fn default_dispatch_root() -> String {
    "Stmt".to_string()
}

fn default_true() -> bool {
    true
}

fn default_value_property() -> String {
    "value".to_string()
}

fn default_statement_root() -> String {
    "clang::Stmt".to_string()
}

fn default_expression_root() -> String {
    "clang::Expr".to_string()
}

fn default_declaration_roots() -> Vec<String> {
    vec!["clang::Decl".to_string()]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_families() -> Vec<FamilyConfig> {
    vec![
        FamilyConfig {
            name: "Expr".to_string(),
            root: "clang::Expr".to_string(),
            units: strings(&["Expr.h", "ExprCXX.h"]),
            enum_units: strings(&["OperationKinds.h", "OperatorKinds.h"]),
            enums: vec![
                EnumSource {
                    unit: "TypeTraits.h".to_string(),
                    name: "clang::UnaryExprOrTypeTrait".to_string(),
                },
                EnumSource {
                    unit: "Specifiers.h".to_string(),
                    name: "clang::NonOdrUseReason".to_string(),
                },
                EnumSource {
                    unit: "DependenceFlags.h".to_string(),
                    name: "ExprDependence".to_string(),
                },
                EnumSource {
                    unit: "APFloat.h".to_string(),
                    name: "FloatSemantics".to_string(),
                },
            ],
            walker: "WalkExpression".to_string(),
        },
        FamilyConfig {
            name: "Stmt".to_string(),
            root: "clang::Stmt".to_string(),
            units: strings(&["Stmt.h", "StmtCXX.h"]),
            enum_units: Vec::new(),
            enums: vec![EnumSource {
                unit: "Specifiers.h".to_string(),
                name: "clang::IfStatementKind".to_string(),
            }],
            walker: "WalkStatement".to_string(),
        },
    ]
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            ignored_suffixes: strings(&["Bitfields", "Iterator", "EvalStatus", "EvalResult"]),
            ignored_names: strings(&[
                "AssociationTy",
                "AssociationIteratorTy",
                "EmptyShell",
                "DecomposedForm",
                "APIntStorage",
                "APFloatStorage",
            ]),
            ignored_base_patterns: strings(&["TrailingObjects"]),
            ignored_properties: strings(&["stripLabelLikeStatements"]),
            ignored_enums: strings(&["APFloatSemantics"]),
            abstract_classes: strings(&[
                "Stmt",
                "ValueStmt",
                "NoStmt",
                "NoInit",
                "SwitchCase",
                "AsmStmt",
                "Expr",
                "FullExpr",
                "CastExpr",
                "ExplicitCastExpr",
                "AbstractConditionalOperator",
                "CXXNamedCastExpr",
                "OverloadExpr",
                "CoroutineSuspendExpr",
            ]),
            storage_bases: vec![
                StorageBase {
                    class: "APIntStorage".to_string(),
                    property: default_value_property(),
                    primitive: Primitive::ULongLong,
                },
                StorageBase {
                    class: "APFloatStorage".to_string(),
                    property: default_value_property(),
                    primitive: Primitive::LongDouble,
                },
            ],
            excluded_properties: vec![ExcludedProperties {
                class: "Expr".to_string(),
                properties: strings(&[
                    "isObjCSelfExpr",
                    "refersToVectorElement",
                    "refersToGlobalRegisterVar",
                    "isKnownToHaveBooleanValue",
                    "isDefaultArgument",
                    "isImplicitCXXThis",
                    "bestDynamicClassTypeExpr",
                    "refersToBitField",
                ]),
            }],
            enum_overrides: vec![
                EnumOverride {
                    unit: "DependenceFlags.h".to_string(),
                    name: "clang::ExprDependenceScope::ExprDependence".to_string(),
                    rename: None,
                    hoist: 2,
                },
                EnumOverride {
                    unit: "APFloat.h".to_string(),
                    name: "llvm::APFloatBase::Semantics".to_string(),
                    rename: Some("FloatSemantics".to_string()),
                    hoist: 2,
                },
            ],
            discriminant: Some(DiscriminantConfig {
                unit: "Stmt.h".to_string(),
                owner: "clang::Stmt".to_string(),
                enum_name: "StmtClass".to_string(),
                property: "stmtClass".to_string(),
                ignored_prefixes: strings(&["first", "last", "OMP", "ObjC"]),
                strip_suffix: "Class".to_string(),
            }),
        }
    }
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            managed: RoutineNames::managed(),
            native: RoutineNames::native(),
            statement_root: default_statement_root(),
            expression_root: default_expression_root(),
            declaration_roots: default_declaration_roots(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            origin_namespace: default_origin_namespace(),
            native_namespace: default_native_namespace(),
            managed_namespace: default_managed_namespace(),
            converter_namespace: default_converter_namespace(),
            export_macro: default_export_macro(),
            dispatch_root: default_dispatch_root(),
            structural_classification: true,
            normalize: NormalizeConfig::default(),
            marshal: MarshalConfig::default(),
            families: default_families(),
        }
    }
}

impl BootstrapConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> BootstrapResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| BootstrapError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> BootstrapResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The family whose root is the dispatch root, if configured
    pub fn dispatch_family(&self) -> Option<&FamilyConfig> {
        self.families
            .iter()
            .find(|f| simple_name(&f.root) == self.dispatch_root)
    }

    /// Whether `family` is the dispatch family
    pub fn is_dispatch(&self, family: &FamilyConfig) -> bool {
        self.dispatch_family()
            .is_some_and(|dispatch| dispatch.name == family.name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> BootstrapResult<()> {
        if self.families.is_empty() {
            return Err(BootstrapError::Config(
                "at least one [[family]] is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for family in &self.families {
            if !is_identifier(&family.name) {
                return Err(BootstrapError::Config(format!(
                    "family name '{}' is not an identifier",
                    family.name
                )));
            }
            if !seen.insert(family.name.as_str()) {
                return Err(BootstrapError::Config(format!(
                    "duplicate family '{}'",
                    family.name
                )));
            }
            if family.root.trim().is_empty() {
                return Err(BootstrapError::Config(format!(
                    "family '{}' has no root class",
                    family.name
                )));
            }
            if family.units.is_empty() {
                return Err(BootstrapError::Config(format!(
                    "family '{}' has no units",
                    family.name
                )));
            }
            if !is_identifier(&family.walker) {
                return Err(BootstrapError::Config(format!(
                    "family '{}' walker '{}' is not an identifier",
                    family.name, family.walker
                )));
            }
        }

        let routines = self
            .marshal
            .managed
            .all()
            .into_iter()
            .chain(self.marshal.native.all());
        for routine in routines {
            if !is_identifier(routine) {
                return Err(BootstrapError::Config(format!(
                    "marshal routine '{routine}' is not an identifier"
                )));
            }
        }

        for storage in &self.normalize.storage_bases {
            if storage.property.trim().is_empty() {
                return Err(BootstrapError::Config(format!(
                    "storage base '{}' has an empty property name",
                    storage.class
                )));
            }
        }

        Ok(())
    }
}

/// Last `::` segment of a qualified name
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
