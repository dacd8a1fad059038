//! Managed visitor base and dispatch interface (`AST/<Family>Visitor.cs`).
//!
//! Emitted for the dispatch family only, but covers the classes of every
//! family so the interface has one method per concrete node.

use crate::family::{Family, GenContext};
use crate::writer::CodeWriter;
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{BootstrapResult, DeclRef};

pub fn generate(ctx: &GenContext<'_>, _family: &Family<'_>) -> BootstrapResult<String> {
    let mut printer = TypePrinter::new(Flavor::Managed, &ctx.config.origin_namespace);
    let printer = printer.push_scope(PrintScope::Local);
    let graph = ctx.graph;
    let classes = ctx.all_classes();
    let param = ctx.config.dispatch_root.to_lowercase();
    let mut w = CodeWriter::new();

    w.preamble();
    w.blank();
    w.line(format!("namespace {}", ctx.config.managed_namespace));
    w.open_brace();

    w.line("public abstract partial class AstVisitor");
    w.open_brace();
    let mut first = true;
    for id in classes.iter() {
        let Some(base) = graph.base_class(id) else {
            continue;
        };
        if !first {
            w.blank();
        }
        first = false;

        let name = printer.decl_name(graph, DeclRef::Class(id));
        let base = printer.decl_name(graph, DeclRef::Class(base));
        w.line(format!("public virtual bool Visit{name}({name} {param})"));
        w.open_brace();
        w.line(format!("if (!Visit{base}({param}))"));
        w.line_indented("return false;");
        w.blank();
        w.line("return true;");
        w.close_brace("");
    }
    w.close_brace("");
    w.blank();

    w.line(format!("public interface {}<out T>", ctx.dispatch_interface()));
    w.open_brace();
    for id in classes.concrete(graph) {
        let name = printer.decl_name(graph, DeclRef::Class(id));
        w.line(format!("T Visit{name}({name} {param});"));
    }
    w.close_brace("");

    w.close_brace("");
    Ok(w.finish())
}
