//! A small clang-shaped declaration graph for tests.
#![allow(dead_code)]

use astbridge_core::config::{EnumSource, FamilyConfig, NormalizeConfig};
use astbridge_core::{
    BootstrapConfig, Class, DeclGraph, Enumeration, Method, Primitive, Property, TypeRef,
};

const NS: &[&str] = &["clang"];

fn loc() -> TypeRef {
    TypeRef::named("clang::SourceLocation")
}

/// Statements and expressions with a `StmtClass` discriminant.
///
/// Stmt.h: `Stmt` (nested `StmtClass`, `StmtBitfields`), `ValueStmt`,
/// `NullStmt`, `IfStmt`, `CompoundStmt`, forward-declared `ForwardStmt`.
/// Expr.h: `APIntStorage`, `Expr`, `ParenExpr`, `BinaryOperator`,
/// `IntegerLiteral`.
pub fn clang_subset() -> DeclGraph {
    let mut graph = DeclGraph::new();
    let stmt_h = graph.add_unit("clang/AST/Stmt.h");
    let expr_h = graph.add_unit("clang/AST/Expr.h");
    let specifiers_h = graph.add_unit("clang/Basic/Specifiers.h");
    let operations_h = graph.add_unit("clang/AST/OperationKinds.h");

    let stmt = graph.add_class(stmt_h, Class::new("Stmt").in_namespace(NS));
    let stmt_class = graph.add_nested_enum(
        stmt,
        Enumeration::new("StmtClass")
            .in_namespace(&["clang", "Stmt"])
            .with_items(&[
                "NoStmtClass",
                "NullStmtClass",
                "IfStmtClass",
                "CompoundStmtClass",
                "firstExprConstant",
                "ParenExprClass",
                "BinaryOperatorClass",
                "IntegerLiteralClass",
                "lastExprConstant",
                "OMPParallelDirectiveClass",
            ]),
    );
    graph.add_nested_class(stmt, Class::new("StmtBitfields").in_namespace(&["clang", "Stmt"]));
    let children = TypeRef::class_ptr(stmt);
    let root = graph.class_mut(stmt);
    root.properties.push(Property::new("stmtClass", TypeRef::Enum(stmt_class)));
    root.properties.push(Property::new("sourceRange", TypeRef::named("clang::SourceRange")));
    root.methods.push(Method::new("children", children));

    let if_kind = graph.add_enum(
        specifiers_h,
        Enumeration::new("IfStatementKind")
            .in_namespace(NS)
            .with_items(&["Ordinary", "Constexpr", "ConstevalNonNegated"]),
    );
    let binary_kind = graph.add_enum(
        operations_h,
        Enumeration::new("BinaryOperatorKind")
            .in_namespace(NS)
            .with_items(&["BO_Mul", "BO_Div", "BO_Add"]),
    );

    let value_stmt = graph.add_class(
        stmt_h,
        Class::new("ValueStmt").in_namespace(NS).with_base(stmt),
    );
    graph.add_class(
        stmt_h,
        Class::new("NullStmt")
            .in_namespace(NS)
            .with_base(stmt)
            .with_property("semiLoc", loc())
            .with_property("hasLeadingEmptyMacro", TypeRef::Builtin(Primitive::Bool)),
    );

    // Expr is declared in Expr.h but referenced from IfStmt.
    let expr = graph.add_class(
        expr_h,
        Class::new("Expr")
            .in_namespace(NS)
            .with_base(value_stmt)
            .with_property("isValueDependent", TypeRef::Builtin(Primitive::Bool))
            .with_property("isObjCSelfExpr", TypeRef::Builtin(Primitive::Bool))
            .with_property("exprLoc", loc()),
    );

    graph.add_class(
        stmt_h,
        Class::new("IfStmt")
            .in_namespace(NS)
            .with_base(stmt)
            .with_property("cond", TypeRef::class_ptr(expr))
            .with_property("then", TypeRef::class_ptr(stmt))
            .with_property("isConstexpr", TypeRef::Builtin(Primitive::Bool))
            .with_property("statementKind", TypeRef::Enum(if_kind))
            .with_property("ifLoc", loc()),
    );
    graph.add_class(
        stmt_h,
        Class::new("CompoundStmt")
            .in_namespace(NS)
            .with_base(stmt)
            .with_method("body", TypeRef::class_ptr(stmt)),
    );
    graph.add_class(
        stmt_h,
        Class::new("ForwardStmt").in_namespace(NS).with_base(stmt).incomplete(),
    );

    let storage = graph.add_class(expr_h, Class::new("APIntStorage").in_namespace(NS));
    graph.add_class(
        expr_h,
        Class::new("ParenExpr")
            .in_namespace(NS)
            .with_base(expr)
            .with_property("subExpr", TypeRef::class_ptr(expr))
            .with_property("lParen", loc()),
    );
    graph.add_class(
        expr_h,
        Class::new("BinaryOperator")
            .in_namespace(NS)
            .with_base(expr)
            .with_property("opcode", TypeRef::Enum(binary_kind))
            .with_property("lHS", TypeRef::class_ptr(expr)),
    );
    graph.add_class(
        expr_h,
        Class::new("IntegerLiteral")
            .in_namespace(NS)
            .with_base(storage)
            .with_base(expr)
            .with_property("location", loc()),
    );

    graph
}

/// Configuration matching [`clang_subset`].
pub fn config() -> BootstrapConfig {
    let mut config = BootstrapConfig::default();
    config.normalize = NormalizeConfig {
        enum_overrides: Vec::new(),
        ..NormalizeConfig::default()
    };
    config.families = vec![
        FamilyConfig {
            name: "Expr".to_string(),
            root: "clang::Expr".to_string(),
            units: vec!["Expr.h".to_string()],
            enum_units: vec!["OperationKinds.h".to_string()],
            enums: Vec::new(),
            walker: "WalkExpression".to_string(),
        },
        FamilyConfig {
            name: "Stmt".to_string(),
            root: "clang::Stmt".to_string(),
            units: vec!["Stmt.h".to_string()],
            enum_units: Vec::new(),
            enums: vec![EnumSource {
                unit: "Specifiers.h".to_string(),
                name: "clang::IfStatementKind".to_string(),
            }],
            walker: "WalkStatement".to_string(),
        },
    ];
    config
}
