//! Managed class declarations (`AST/<Family>.cs`).

use crate::enums;
use crate::family::{Family, GenContext};
use crate::writer::CodeWriter;
use astbridge_core::naming::{NameKind, to_upper_camel_case};
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{BootstrapResult, ClassId, DeclRef, EnumId};

pub fn generate(ctx: &GenContext<'_>, family: &Family<'_>) -> BootstrapResult<String> {
    let mut printer = TypePrinter::new(Flavor::Managed, &ctx.config.origin_namespace);
    let printer = printer.push_scope(PrintScope::Local);
    let mut w = CodeWriter::new();

    w.preamble();
    w.blank();
    w.line("using System;");
    w.line("using System.Collections.Generic;");
    w.blank();
    w.line(format!("namespace {}", ctx.config.managed_namespace));
    w.open_brace();

    let mut first = true;
    let mut separate = |w: &mut CodeWriter| {
        if !first {
            w.blank();
        }
        first = false;
    };

    for id in &family.enums {
        separate(&mut w);
        write_enum(&mut w, ctx, *id, &printer);
    }
    for id in family.classes.iter() {
        separate(&mut w);
        write_class(&mut w, ctx, id, &printer);
    }

    w.close_brace("");
    Ok(w.finish())
}

fn write_enum(w: &mut CodeWriter, ctx: &GenContext<'_>, id: EnumId, printer: &TypePrinter) {
    w.line(format!(
        "public enum {}",
        printer.decl_name(ctx.graph, DeclRef::Enum(id))
    ));
    w.open_brace();
    enums::write_items(w, ctx.graph.enumeration(id));
    w.close_brace("");
}

fn write_class(w: &mut CodeWriter, ctx: &GenContext<'_>, id: ClassId, printer: &TypePrinter) {
    let graph = ctx.graph;
    let class = graph.class(id);
    let name = printer.decl_name(graph, DeclRef::Class(id));
    let modifier = if class.is_abstract { "abstract " } else { "" };

    match graph.base_class(id) {
        Some(base) => w.line(format!(
            "public {modifier}class {name} : {}",
            printer.decl_name(graph, DeclRef::Class(base))
        )),
        None => w.line(format!("public {modifier}class {name}")),
    }
    w.open_brace();

    for nested in &class.nested {
        if let DeclRef::Enum(nested) = nested
            && !graph.enumeration(*nested).ignored
        {
            write_enum(w, ctx, *nested, printer);
            w.blank();
        }
    }

    w.line(format!("public {name}()"));
    w.open_brace();
    w.close_brace("");
    w.blank();

    for method in class.generated_methods() {
        let element = printer.print(graph, &method.element);
        w.line(format!(
            "public List<{element}> {} {{ get; private set; }} = new List<{element}>();",
            to_upper_camel_case(&method.name, NameKind::Declaration)
        ));
    }
    for property in class.generated_properties() {
        w.line(format!(
            "public {} {} {{ get; set; }}",
            printer.print(graph, &property.ty),
            to_upper_camel_case(&property.name, NameKind::Declaration)
        ));
    }

    write_accept(w, ctx, id);
    w.close_brace("");
}

/// `Visit<T>` dispatch for classes rooted at the dispatch root.
///
/// Abstract classes below the root get none; the abstract root declares it.
fn write_accept(w: &mut CodeWriter, ctx: &GenContext<'_>, id: ClassId) {
    let graph = ctx.graph;
    let dispatch_root = &ctx.config.dispatch_root;
    let class = graph.class(id);
    let root = graph.root_base(id);
    if graph.class(root).name != *dispatch_root {
        return;
    }
    let is_root = root == id;
    if class.is_abstract && !is_root {
        return;
    }

    let interface = ctx.dispatch_interface();
    w.blank();
    if class.is_abstract {
        w.line(format!(
            "public abstract T Visit<T>({interface}<T> visitor);"
        ));
        return;
    }
    let modifier = if is_root { "virtual" } else { "override" };
    w.line(format!(
        "public {modifier} T Visit<T>({interface}<T> visitor) =>"
    ));
    w.line_indented(format!("visitor.Visit{}(this);", class.name));
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::test_support;

    #[test]
    fn generate___file_layout() {
        let out = test_support::generate(generate, "Stmt");

        assert!(out.contains(
            "using System;\nusing System.Collections.Generic;\n\nnamespace CppSharp.AST\n{\n    public enum StmtClass\n"
        ));
        assert!(out.ends_with("    }\n}\n"));
    }

    #[test]
    fn generate___abstract_root_declares_visit() {
        let out = test_support::generate(generate, "Stmt");

        let expected = "\
    public abstract class Stmt
    {
        public Stmt()
        {
        }

        public List<Stmt> Children { get; private set; } = new List<Stmt>();
        public StmtClass StmtClass { get; set; }
        public SourceRange SourceRange { get; set; }

        public abstract T Visit<T>(IStmtVisitor<T> visitor);
    }
";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn generate___concrete_class_overrides_visit() {
        let out = test_support::generate(generate, "Stmt");

        let expected = "\
    public class IfStmt : Stmt
    {
        public IfStmt()
        {
        }

        public Expr Cond { get; set; }
        public Stmt Then { get; set; }
        public bool IsConstexpr { get; set; }
        public IfStatementKind StatementKind { get; set; }
        public SourceLocation IfLoc { get; set; }

        public override T Visit<T>(IStmtVisitor<T> visitor) =>
            visitor.VisitIfStmt(this);
    }
";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn generate___abstract_intermediate_has_no_visit() {
        let out = test_support::generate(generate, "Stmt");

        assert!(out.contains(
            "    public abstract class ValueStmt : Stmt\n    {\n        public ValueStmt()\n        {\n        }\n\n    }\n"
        ));
    }

    #[test]
    fn generate___other_family_still_dispatches_through_root() {
        let out = test_support::generate(generate, "Expr");

        assert!(out.contains("    public abstract class Expr : ValueStmt\n"));
        assert!(out.contains("        public ulong Value { get; set; }\n"));
        assert!(out.contains("visitor.VisitIntegerLiteral(this);"));
        assert!(out.contains("    public enum BinaryOperatorKind\n    {\n        Mul,\n"));
    }

    #[test]
    fn generate___no_visit_outside_dispatch_root() {
        let (graph, mut config) = test_support::prepared();
        config.dispatch_root = "Decl".to_string();

        let out = test_support::generate_in(&graph, &config, generate, "Stmt").unwrap();

        assert!(!out.contains("Visit<T>"));
    }
}
