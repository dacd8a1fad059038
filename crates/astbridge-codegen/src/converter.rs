//! Managed converters from parser bindings to managed nodes
//! (`Parser/ASTConverter.<Family>.cs`).
//!
//! Each family gets an abstract visitor over the binding types, with a
//! `Visit` entry point switching on the node kind, and a converter
//! implementing it by copying every property and repeated child of the
//! class and its bases.

use crate::family::{Family, GenContext};
use crate::marshal::Marshaler;
use crate::writer::CodeWriter;
use astbridge_core::naming::{NameKind, to_lower_camel_case, to_upper_camel_case};
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{BootstrapResult, ClassId, DeclRef};
use tracing::warn;

pub fn generate(ctx: &GenContext<'_>, family: &Family<'_>) -> BootstrapResult<String> {
    let mut printer = TypePrinter::new(Flavor::Managed, &ctx.config.origin_namespace);
    let printer = printer.push_scope(PrintScope::Local);
    let marshaler = Marshaler::new(ctx.graph, ctx.config);
    let emitter = Converter {
        ctx,
        family,
        printer: &printer,
        marshaler,
        param: family.param_name(),
    };
    let mut w = CodeWriter::new();

    w.preamble();
    w.blank();
    w.line("using CppSharp.Parser.AST;");
    w.blank();
    w.line(format!("using static {}.ConversionUtils;", ctx.config.converter_namespace));
    w.blank();
    w.line(format!("namespace {}", ctx.config.converter_namespace));
    w.open_brace();

    emitter.visitor(&mut w);
    w.blank();
    emitter.converter(&mut w);

    w.close_brace("");
    Ok(w.finish())
}

struct Converter<'a> {
    ctx: &'a GenContext<'a>,
    family: &'a Family<'a>,
    printer: &'a TypePrinter,
    marshaler: Marshaler<'a>,
    param: String,
}

impl Converter<'_> {
    fn class_name(&self, id: ClassId) -> String {
        self.printer.decl_name(self.ctx.graph, DeclRef::Class(id))
    }

    fn concrete(&self) -> Vec<ClassId> {
        self.family.classes.concrete(self.ctx.graph).collect()
    }

    fn visitor(&self, w: &mut CodeWriter) {
        let family = self.family.name();
        let param = &self.param;

        w.line("/// <summary>");
        w.line(format!(
            "/// Implements the visitor pattern for the generated {param} bindings."
        ));
        w.line("/// </summary>");
        w.line(format!("public abstract class {family}Visitor<TRet>"));
        w.line_indented("where TRet : class");
        w.open_brace();

        for id in self.concrete() {
            let name = self.class_name(id);
            w.line(format!("public abstract TRet Visit{name}({name} {param});"));
        }

        if self.ctx.graph.discriminant().is_some() {
            w.blank();
            self.dispatcher(w);
        }

        w.close_brace("");
    }

    fn dispatcher(&self, w: &mut CodeWriter) {
        let graph = self.ctx.graph;
        let Some(discriminant) = graph.discriminant() else {
            return;
        };
        let family = self.family.name();
        let param = &self.param;
        let kind_enum = self
            .printer
            .decl_name(graph, DeclRef::Enum(discriminant.enumeration));
        let kind_property = to_upper_camel_case(&discriminant.property, NameKind::Declaration);

        w.line(format!("public virtual TRet Visit(Parser.AST.{family} {param})"));
        w.open_brace();
        w.line(format!("if ({param} == null)"));
        w.line_indented("return default(TRet);");
        w.blank();

        w.line(format!("switch ({param}.{kind_property})"));
        w.open_brace();
        for id in self.concrete() {
            let name = self.class_name(id);
            if !graph.has_kind(id) {
                warn!(class = %name, "No node kind for class, leaving it out of the dispatch switch");
                continue;
            }
            w.line(format!("case {kind_enum}.{name}:"));
            w.open_brace();
            w.line(format!(
                "var _{param} = {name}.__CreateInstance({param}.__Instance);"
            ));
            w.line(format!("return Visit{name}(_{param});"));
            w.close_brace("");
        }
        w.line("default:");
        w.line_indented(format!(
            "throw new System.NotImplementedException({param}.{kind_property}.ToString());"
        ));
        w.close_brace("");

        w.close_brace("");
    }

    fn converter(&self, w: &mut CodeWriter) {
        let family = self.family.name();
        let param = &self.param;

        w.line(format!(
            "public unsafe class {family}Converter : {family}Visitor<AST.{family}>"
        ));
        w.open_brace();

        let mut first = true;
        for id in self.concrete() {
            if !first {
                w.blank();
            }
            first = false;

            let name = self.class_name(id);
            let qualified = TypePrinter::new(Flavor::Managed, &self.ctx.config.origin_namespace)
                .decl_name(self.ctx.graph, DeclRef::Class(id));
            w.line(format!(
                "public override AST.{family} Visit{name}({name} {param})"
            ));
            w.open_brace();
            w.line(format!("var _{param} = new AST.{qualified}();"));
            for class in self.ctx.graph.lineage(id) {
                self.members(w, class);
            }
            w.line(format!("return _{param};"));
            w.close_brace("");
        }

        w.close_brace("");
    }

    fn members(&self, w: &mut CodeWriter, id: ClassId) {
        let class = self.ctx.graph.class(id);
        let param = &self.param;

        for property in class.generated_properties() {
            let managed = to_upper_camel_case(&property.name, NameKind::Declaration);
            let value = self.marshaler.managed(
                &property.ty,
                &format!("{param}.{managed}"),
                &format!("{}.{}", class.name, property.name),
            );
            w.line(format!("_{param}.{managed} = {value};"));
        }

        for method in class.generated_methods() {
            let managed = to_upper_camel_case(&method.name, NameKind::Declaration);
            let native = to_lower_camel_case(&method.name, NameKind::Declaration);
            w.line(format!(
                "for (uint i = 0; i < {param}.Get{native}Count; i++)"
            ));
            w.open_brace();
            w.line(format!("var _E = {param}.Get{native}(i);"));
            let element = self.marshaler.managed(
                &method.element,
                "_E",
                &format!("{}.{}", class.name, method.name),
            );
            w.line(format!("_{param}.{managed}.Add({element});"));
            w.close_brace("");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::test_support;
    use astbridge_logging::RecordingLayer;
    use tracing::Level;

    #[test]
    fn generate___header() {
        let out = test_support::generate(generate, "Stmt");

        assert!(out.contains(
            "using CppSharp.Parser.AST;\n\nusing static CppSharp.ConversionUtils;\n\nnamespace CppSharp\n{\n"
        ));
    }

    #[test]
    fn generate___visitor_declares_concrete_classes() {
        let out = test_support::generate(generate, "Stmt");

        let expected = "\
    /// <summary>
    /// Implements the visitor pattern for the generated stmt bindings.
    /// </summary>
    public abstract class StmtVisitor<TRet>
        where TRet : class
    {
        public abstract TRet VisitNullStmt(NullStmt stmt);
        public abstract TRet VisitIfStmt(IfStmt stmt);
        public abstract TRet VisitCompoundStmt(CompoundStmt stmt);

        public virtual TRet Visit(Parser.AST.Stmt stmt)
        {
            if (stmt == null)
                return default(TRet);

            switch (stmt.StmtClass)
            {
                case StmtClass.NullStmt:
                {
                    var _stmt = NullStmt.__CreateInstance(stmt.__Instance);
                    return VisitNullStmt(_stmt);
                }
";
        assert!(out.contains(expected), "{out}");
        assert!(out.contains(
            "                default:\n                    throw new System.NotImplementedException(stmt.StmtClass.ToString());\n            }\n        }\n    }\n"
        ));
    }

    #[test]
    fn generate___converter_copies_lineage_members() {
        let out = test_support::generate(generate, "Stmt");

        let expected = "\
        public override AST.Stmt VisitIfStmt(IfStmt stmt)
        {
            var _stmt = new AST.IfStmt();
            _stmt.StmtClass = (AST.StmtClass) stmt.StmtClass;
            _stmt.SourceRange = VisitSourceRange(stmt.SourceRange);
            for (uint i = 0; i < stmt.GetchildrenCount; i++)
            {
                var _E = stmt.Getchildren(i);
                _stmt.Children.Add(VisitStatement(_E) as AST.Stmt);
            }
            _stmt.Cond = VisitExpression(stmt.Cond) as AST.Expr;
            _stmt.Then = VisitStatement(stmt.Then) as AST.Stmt;
            _stmt.IsConstexpr = stmt.IsConstexpr;
            _stmt.StatementKind = (AST.IfStatementKind) stmt.StatementKind;
            _stmt.IfLoc = VisitSourceLocation(stmt.IfLoc);
            return _stmt;
        }
";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn generate___expression_family_uses_its_own_names() {
        let out = test_support::generate(generate, "Expr");

        assert!(out.contains("public unsafe class ExprConverter : ExprVisitor<AST.Expr>\n"));
        assert!(out.contains("public override AST.Expr VisitParenExpr(ParenExpr expr)\n"));
        assert!(out.contains("            _expr.SubExpr = VisitExpression(expr.SubExpr) as AST.Expr;\n"));
        assert!(out.contains("            _expr.Opcode = (AST.BinaryOperatorKind) expr.Opcode;\n"));
        assert!(out.contains("            _expr.Value = expr.Value;\n"));
        assert!(!out.contains("VisitExpr(Expr expr)"));
    }

    #[test]
    fn generate___class_without_kind_is_left_out_of_switch() {
        let mut graph = crate::fixtures::clang_subset();
        let id = graph
            .class_ids()
            .find(|id| graph.class(*id).name == "CompoundStmt")
            .unwrap();
        graph.class_mut(id).name = "UnlistedStmt".to_string();
        let config = crate::fixtures::config();
        let graph = crate::normalize::normalize(graph, &config.normalize).unwrap();
        let layer = RecordingLayer::new();

        let out = tracing::subscriber::with_default(layer.subscriber(), || {
            test_support::generate_in(&graph, &config, generate, "Stmt").unwrap()
        });

        assert!(out.contains("public abstract TRet VisitUnlistedStmt(UnlistedStmt stmt);"));
        assert!(!out.contains("case StmtClass.UnlistedStmt:"));
        assert!(layer.contains("No node kind for class"));
        assert_eq!(layer.events_at(Level::WARN).len(), 1);
    }

    #[test]
    fn generate___no_discriminant_means_no_switch() {
        let mut config = crate::fixtures::config();
        config.normalize.discriminant = None;
        let (graph, config) = test_support::prepared_with(config);

        let out = test_support::generate_in(&graph, &config, generate, "Stmt").unwrap();

        assert!(!out.contains("switch"));
        assert!(out.contains("public abstract TRet VisitCompoundStmt(CompoundStmt stmt);\n    }\n"));
    }
}
