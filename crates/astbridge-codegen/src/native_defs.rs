//! Native constructor definitions (`CppParser/<Family>.cpp`).
//!
//! Every generated class gets a default constructor that passes its node
//! kind to the base and zero-initializes each field. Classes other generated
//! classes derive from also get a constructor taking the kind explicitly.

use crate::family::{Family, GenContext};
use crate::writer::CodeWriter;
use astbridge_core::printer::{Flavor, PrintScope, TypePrinter};
use astbridge_core::{
    BootstrapError, BootstrapResult, ClassId, DeclRef, EnumId, Primitive, Property, TypeRef,
};

pub fn generate(ctx: &GenContext<'_>, family: &Family<'_>) -> BootstrapResult<String> {
    let mut printer = TypePrinter::new(Flavor::Native, &ctx.config.origin_namespace);
    let printer = printer.push_scope(PrintScope::Local);
    let mut w = CodeWriter::new();

    w.preamble();
    w.blank();
    w.line("#include \"Sources.h\"");
    w.line(format!("#include \"{}.h\"", family.name()));
    w.blank();
    w.line(format!("namespace {} {{", ctx.config.native_namespace));
    w.blank();

    for id in family.classes.iter() {
        let defs = Definitions {
            ctx,
            printer: &printer,
            class: id,
        };
        defs.default_constructor(&mut w)?;
        w.blank();
        if ctx.graph.discriminant().is_some() && ctx.is_inherited(id) {
            defs.kind_constructor(&mut w)?;
            w.blank();
        }
    }

    w.line("}");
    Ok(w.finish())
}

struct Definitions<'a> {
    ctx: &'a GenContext<'a>,
    printer: &'a TypePrinter,
    class: ClassId,
}

impl Definitions<'_> {
    fn name(&self) -> String {
        self.printer
            .decl_name(self.ctx.graph, DeclRef::Class(self.class))
    }

    fn default_constructor(&self, w: &mut CodeWriter) -> BootstrapResult<()> {
        let name = self.name();
        w.line(format!("{name}::{name}()"));

        let mut inits = Vec::new();
        if let Some(base) = self.ctx.graph.base_class(self.class) {
            let base = self.printer.decl_name(self.ctx.graph, DeclRef::Class(base));
            match self.own_kind()? {
                Some(kind) => inits.push(format!("{base}({kind})")),
                None => inits.push(format!("{base}()")),
            }
        }
        inits.extend(self.member_inits(None)?);

        write_inits(w, &inits);
        w.line("{");
        w.line("}");
        Ok(())
    }

    fn kind_constructor(&self, w: &mut CodeWriter) -> BootstrapResult<()> {
        let graph = self.ctx.graph;
        let Some(discriminant) = graph.discriminant() else {
            return Ok(());
        };
        let name = self.name();
        let kind_enum = self
            .printer
            .decl_name(graph, DeclRef::Enum(discriminant.enumeration));
        w.line(format!("{name}::{name}({kind_enum} klass)"));

        let mut inits = Vec::new();
        let mut kind_property = None;
        match graph.base_class(self.class) {
            Some(base) => {
                let base = self.printer.decl_name(graph, DeclRef::Class(base));
                inits.push(format!("{base}(klass)"));
            }
            None => {
                inits.push(format!("{}(klass)", discriminant.property));
                kind_property = Some(discriminant.property.as_str());
            }
        }
        inits.extend(self.member_inits(kind_property)?);

        write_inits(w, &inits);
        w.line("{");
        w.line("}");
        Ok(())
    }

    /// The qualified discriminant item naming this class, or the first item
    /// when the class has none of its own.
    fn own_kind(&self) -> BootstrapResult<Option<String>> {
        let graph = self.ctx.graph;
        let Some(discriminant) = graph.discriminant() else {
            return Ok(None);
        };
        let enumeration = graph.enumeration(discriminant.enumeration);
        let qualified = self.qualified_enum(discriminant.enumeration);
        let class_name = &graph.class(self.class).name;
        if graph.has_kind(self.class) {
            return Ok(Some(format!("{qualified}::{class_name}")));
        }
        let first = enumeration
            .generated_items()
            .next()
            .ok_or_else(|| BootstrapError::EmptyEnum(enumeration.name.clone()))?;
        Ok(Some(format!("{qualified}::{}", first.name)))
    }

    /// Enum name with its enclosing scopes, as needed to spell an item.
    fn qualified_enum(&self, id: EnumId) -> String {
        TypePrinter::new(Flavor::Native, &self.ctx.config.origin_namespace)
            .decl_name(self.ctx.graph, DeclRef::Enum(id))
    }

    fn member_inits(&self, skip: Option<&str>) -> BootstrapResult<Vec<String>> {
        let class = self.ctx.graph.class(self.class);
        let mut inits = Vec::new();
        for property in class.generated_properties() {
            if skip == Some(property.name.as_str()) {
                continue;
            }
            if self.printer.print(self.ctx.graph, &property.ty) == "std::string" {
                continue;
            }
            inits.push(format!("{}({})", property.name, self.init_value(property)?));
        }
        Ok(inits)
    }

    fn init_value(&self, property: &Property) -> BootstrapResult<String> {
        let graph = self.ctx.graph;
        match &property.ty {
            TypeRef::Pointer(_) => Ok("nullptr".to_string()),
            TypeRef::Builtin(Primitive::Bool) => Ok("false".to_string()),
            ty @ (TypeRef::Class(_) | TypeRef::Named(_)) => {
                Ok(format!("{}()", self.printer.print(graph, ty)))
            }
            TypeRef::Enum(id) => {
                let enumeration = graph.enumeration(*id);
                let first = enumeration
                    .generated_items()
                    .next()
                    .ok_or_else(|| BootstrapError::EmptyEnum(enumeration.name.clone()))?;
                Ok(format!("{}::{}", self.qualified_enum(*id), first.name))
            }
            TypeRef::Builtin(_) => Ok("0".to_string()),
        }
    }
}

fn write_inits(w: &mut CodeWriter, inits: &[String]) {
    for (i, init) in inits.iter().enumerate() {
        let lead = if i == 0 { ":" } else { "," };
        w.line_indented(format!("{lead} {init}"));
    }
}
