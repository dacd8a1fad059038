//! Native walkers building generated nodes from source nodes
//! (`CppParser/Parse<Family>.cpp`).

use crate::family::{Family, GenContext};
use crate::marshal::Marshaler;
use crate::writer::CodeWriter;
use astbridge_core::naming::native_getter;
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{BootstrapResult, ClassId, DeclRef};
use tracing::debug;

pub fn generate(ctx: &GenContext<'_>, family: &Family<'_>) -> BootstrapResult<String> {
    let mut printer = TypePrinter::new(Flavor::Native, &ctx.config.origin_namespace);
    let printer = printer.push_scope(PrintScope::Local);
    let marshaler = Marshaler::new(ctx.graph, ctx.config);
    let graph = ctx.graph;
    let name = family.name();
    let root = printer.decl_name(graph, DeclRef::Class(family.root));
    let source_root = graph.qualified_name(DeclRef::Class(family.root));
    let mut w = CodeWriter::new();

    w.preamble();
    w.blank();
    w.line("#include \"AST.h\"");
    w.line("#include \"Parser.h\"");
    w.blank();
    w.line("namespace CppSharp::CppParser {");
    w.blank();

    w.line(format!(
        "AST::{root}* Parser::{}(const {source_root}* {name})",
        family.config.walker
    ));
    w.open_brace();
    w.line(format!("if (!{name})"));
    w.line_indented("return nullptr;");
    w.blank();
    w.line(format!("AST::{root}* _{name} = 0;"));
    w.blank();

    if let Some(discriminant) = graph.discriminant() {
        let kind_getter = native_getter(&discriminant.property);
        w.line(format!("switch ({name}->{kind_getter}())"));
        w.line("{");
        for id in family.classes.concrete(graph) {
            let class = graph.class(id);
            if !graph.has_kind(id) {
                debug!(class = %class.name, "No node kind for class, skipping walker case");
                continue;
            }
            w.line(format!(
                "case {}::{}{}:",
                discriminant.owner_source_name, class.name, discriminant.item_suffix
            ));
            w.line("{");
            w.indent();
            write_case(&mut w, ctx, &marshaler, &printer, id, name);
            w.dedent();
            w.line("}");
        }
        w.line("default:");
        w.line_indented(format!(
            "printf(\"Unhandled node kind: %s\\n\", {name}->{kind_getter}Name());"
        ));
        w.line("}");
        w.blank();
    }

    w.line(format!("return _{name};"));
    w.close_brace("");
    w.blank();
    w.line("}");
    Ok(w.finish())
}

fn write_case(
    w: &mut CodeWriter,
    ctx: &GenContext<'_>,
    marshaler: &Marshaler<'_>,
    printer: &TypePrinter,
    id: ClassId,
    family: &str,
) {
    let graph = ctx.graph;
    let source = graph.qualified_name(DeclRef::Class(id));
    let target = printer.decl_name(graph, DeclRef::Class(id));

    w.line(format!(
        "auto S = const_cast<{source}*>(llvm::cast<{source}>({family}));"
    ));
    w.line(format!("auto _S = new AST::{target}();"));

    for class in graph.lineage(id) {
        let class = graph.class(class);
        for property in class.generated_properties() {
            let getter = property
                .getter
                .clone()
                .unwrap_or_else(|| native_getter(&property.name));
            let value = marshaler.native(&property.ty, &format!("S->{getter}()"));
            w.line(format!("_S->{} = {value};", property.name));
        }
        for method in class.generated_methods() {
            w.line(format!("for (auto _E : S->{}())", method.name));
            w.open_brace();
            w.line(format!(
                "auto _ES = {};",
                marshaler.native(&method.element, "_E")
            ));
            w.line(format!("_S->add{}(_ES);", method.name));
            w.close_brace("");
        }
    }

    w.line(format!("_{family} = _S;"));
    w.line("break;");
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::test_support;

    #[test]
    fn generate___walker_signature() {
        let out = test_support::generate(generate, "Stmt");

        let expected = "\
namespace CppSharp::CppParser {

AST::Stmt* Parser::WalkStatement(const clang::Stmt* Stmt)
{
    if (!Stmt)
        return nullptr;

    AST::Stmt* _Stmt = 0;

    switch (Stmt->getStmtClass())
    {
";
        assert!(out.contains("#include \"AST.h\"\n#include \"Parser.h\"\n"));
        assert!(out.contains(expected), "{out}");
        assert!(out.ends_with("    return _Stmt;\n}\n\n}\n"));
    }

    #[test]
    fn generate___case_builds_node_from_lineage() {
        let out = test_support::generate(generate, "Stmt");

        let expected = "\
    case clang::Stmt::IfStmtClass:
    {
        auto S = const_cast<clang::IfStmt*>(llvm::cast<clang::IfStmt>(Stmt));
        auto _S = new AST::IfStmt();
        _S->stmtClass = (AST::StmtClass) S->getStmtClass();
        _S->sourceRange = WalkSourceRange(S->getSourceRange());
        for (auto _E : S->children())
        {
            auto _ES = static_cast<AST::Stmt*>(WalkStatement(_E));
            _S->addchildren(_ES);
        }
        _S->cond = static_cast<AST::Expr*>(WalkExpression(S->getCond()));
        _S->then = static_cast<AST::Stmt*>(WalkStatement(S->getThen()));
        _S->isConstexpr = S->isConstexpr();
        _S->statementKind = (AST::IfStatementKind) S->getStatementKind();
        _S->ifLoc = WalkSourceLocation(S->getIfLoc());
        _Stmt = _S;
        break;
    }
";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn generate___abstract_classes_have_no_case() {
        let out = test_support::generate(generate, "Stmt");

        assert!(!out.contains("ValueStmtClass"));
        assert!(!out.contains("case clang::Stmt::StmtClass"));
        assert!(out.contains(
            "    default:\n        printf(\"Unhandled node kind: %s\\n\", Stmt->getStmtClassName());\n    }\n"
        ));
    }

    #[test]
    fn generate___explicit_getter_wins() {
        let mut graph = crate::fixtures::clang_subset();
        let id = graph
            .class_ids()
            .find(|id| graph.class(*id).name == "NullStmt")
            .unwrap();
        graph.class_mut(id).properties[0].getter = Some("getSemiLocation".to_string());
        let config = crate::fixtures::config();
        let graph = crate::normalize::normalize(graph, &config.normalize).unwrap();

        let out = test_support::generate_in(&graph, &config, generate, "Stmt").unwrap();

        assert!(out.contains("_S->semiLoc = WalkSourceLocation(S->getSemiLocation());"));
    }

    #[test]
    fn generate___expression_walker() {
        let out = test_support::generate(generate, "Expr");

        assert!(out.contains("AST::Expr* Parser::WalkExpression(const clang::Expr* Expr)\n"));
        assert!(out.contains("    case clang::Stmt::ParenExprClass:\n"));
        assert!(out.contains("        auto S = const_cast<clang::ParenExpr*>(llvm::cast<clang::ParenExpr>(Expr));\n"));
        assert!(out.contains("        _S->opcode = (AST::BinaryOperatorKind) S->getOpcode();\n"));
        assert!(out.contains("        _Expr = _S;\n"));
    }

    #[test]
    fn generate___no_discriminant_means_no_switch() {
        let mut config = crate::fixtures::config();
        config.normalize.discriminant = None;
        let (graph, config) = test_support::prepared_with(config);

        let out = test_support::generate_in(&graph, &config, generate, "Stmt").unwrap();

        assert!(!out.contains("switch"));
        assert!(out.contains("    AST::Stmt* _Stmt = 0;\n\n    return _Stmt;\n"));
    }
}
