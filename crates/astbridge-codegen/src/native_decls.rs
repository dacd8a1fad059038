//! Native class declarations (`CppParser/<Family>.h`).

use crate::enums;
use crate::family::{Family, GenContext};
use crate::writer::CodeWriter;
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{BootstrapResult, ClassId, DeclRef, EnumId};
use std::collections::HashSet;

pub fn generate(ctx: &GenContext<'_>, family: &Family<'_>) -> BootstrapResult<String> {
    let mut printer = TypePrinter::new(Flavor::Native, &ctx.config.origin_namespace);
    let printer = printer.push_scope(PrintScope::Local);
    let graph = ctx.graph;
    let mut w = CodeWriter::new();

    w.preamble();
    w.blank();
    w.line("#pragma once");
    w.blank();
    w.line("#include \"Sources.h\"");
    w.line("#include \"Types.h\"");
    for dependency in ctx.dependencies(family) {
        w.line(format!("#include \"{}.h\"", dependency.name()));
    }
    w.blank();
    w.line(format!("namespace {} {{", ctx.config.native_namespace));
    w.blank();

    for id in forward_declarations(ctx, family) {
        w.line(format!(
            "class {};",
            printer.decl_name(graph, DeclRef::Class(id))
        ));
    }
    w.blank();

    for id in &family.enums {
        write_enum(&mut w, ctx, *id, &printer);
        w.blank();
    }

    let kind_enum = graph
        .discriminant()
        .map(|d| printer.decl_name(graph, DeclRef::Enum(d.enumeration)));

    for id in family.classes.iter() {
        let class = graph.class(id);
        let name = printer.decl_name(graph, DeclRef::Class(id));
        match graph.base_class(id) {
            Some(base) => w.line(format!(
                "class {} {name} : public {}",
                ctx.config.export_macro,
                printer.decl_name(graph, DeclRef::Class(base))
            )),
            None => w.line(format!("class {} {name}", ctx.config.export_macro)),
        }
        w.open_brace();
        w.line("public:");

        for nested in &class.nested {
            if let DeclRef::Enum(nested) = nested
                && !graph.enumeration(*nested).ignored
            {
                write_enum(&mut w, ctx, *nested, &printer);
                w.blank();
            }
        }

        w.line(format!("{name}();"));
        if let Some(kind_enum) = &kind_enum
            && ctx.is_inherited(id)
        {
            w.line(format!("{name}({kind_enum} klass);"));
        }

        for property in class.generated_properties() {
            w.line(format!(
                "{} {};",
                printer.print(graph, &property.ty),
                property.name
            ));
        }
        for method in class.generated_methods() {
            w.line(format!(
                "VECTOR({}, {})",
                printer.print(graph, &method.element),
                method.name
            ));
        }
        w.close_brace(";");
        w.blank();
    }

    w.line("}");
    Ok(w.finish())
}

/// Family classes followed by classes their members point at.
fn forward_declarations(ctx: &GenContext<'_>, family: &Family<'_>) -> Vec<ClassId> {
    let graph = ctx.graph;
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for id in family.classes.iter() {
        if seen.insert(id) {
            order.push(id);
        }
    }
    for id in family.classes.iter() {
        let class = graph.class(id);
        let referenced = class
            .generated_properties()
            .map(|p| &p.ty)
            .chain(class.generated_methods().map(|m| &m.element))
            .filter_map(|ty| ty.referenced_class());
        for target in referenced {
            if !graph.class(target).ignored && seen.insert(target) {
                order.push(target);
            }
        }
    }
    order
}

fn write_enum(w: &mut CodeWriter, ctx: &GenContext<'_>, id: EnumId, printer: &TypePrinter) {
    let enumeration = ctx.graph.enumeration(id);
    let keyword = if enumeration.is_scoped {
        "enum class"
    } else {
        "enum"
    };
    w.line(format!(
        "{keyword} {}",
        printer.decl_name(ctx.graph, DeclRef::Enum(id))
    ));
    w.open_brace();
    enums::write_items(w, enumeration);
    w.close_brace(";");
}
