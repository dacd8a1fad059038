//! One bootstrap pass: normalize, resolve families, generate artifacts.

use crate::family::{Family, GenContext};
use crate::normalize::normalize;
use crate::{converter, managed, native_decls, native_defs, native_parser, visitor};
use astbridge_core::{BootstrapConfig, BootstrapResult, DeclGraph};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// The six kinds of generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    NativeDeclarations,
    NativeDefinitions,
    NativeParser,
    ManagedDeclarations,
    ManagedVisitor,
    Converter,
}

impl ArtifactKind {
    /// Kinds in the order a family's artifacts are produced.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::NativeDeclarations,
        ArtifactKind::NativeDefinitions,
        ArtifactKind::NativeParser,
        ArtifactKind::ManagedDeclarations,
        ArtifactKind::ManagedVisitor,
        ArtifactKind::Converter,
    ];

    /// Output path relative to the output root for family `family`.
    pub fn default_path(self, family: &str) -> PathBuf {
        match self {
            ArtifactKind::NativeDeclarations => PathBuf::from(format!("CppParser/{family}.h")),
            ArtifactKind::NativeDefinitions => PathBuf::from(format!("CppParser/{family}.cpp")),
            ArtifactKind::NativeParser => PathBuf::from(format!("CppParser/Parse{family}.cpp")),
            ArtifactKind::ManagedDeclarations => PathBuf::from(format!("AST/{family}.cs")),
            ArtifactKind::ManagedVisitor => PathBuf::from(format!("AST/{family}Visitor.cs")),
            ArtifactKind::Converter => PathBuf::from(format!("Parser/ASTConverter.{family}.cs")),
        }
    }

    /// Whether a family produces this artifact.
    fn applies_to(self, family: &Family<'_>) -> bool {
        self != ArtifactKind::ManagedVisitor || family.is_dispatch
    }

    fn generate(self, ctx: &GenContext<'_>, family: &Family<'_>) -> BootstrapResult<String> {
        match self {
            ArtifactKind::NativeDeclarations => native_decls::generate(ctx, family),
            ArtifactKind::NativeDefinitions => native_defs::generate(ctx, family),
            ArtifactKind::NativeParser => native_parser::generate(ctx, family),
            ArtifactKind::ManagedDeclarations => managed::generate(ctx, family),
            ArtifactKind::ManagedVisitor => visitor::generate(ctx, family),
            ArtifactKind::Converter => converter::generate(ctx, family),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::NativeDeclarations => "native-declarations",
            ArtifactKind::NativeDefinitions => "native-definitions",
            ArtifactKind::NativeParser => "native-parser",
            ArtifactKind::ManagedDeclarations => "managed-declarations",
            ArtifactKind::ManagedVisitor => "managed-visitor",
            ArtifactKind::Converter => "converter",
        };
        f.write_str(name)
    }
}

/// A complete generated file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub family: String,
    pub relative_path: PathBuf,
    pub contents: String,
}

/// Runs bootstrap passes for one configuration.
pub struct Bootstrap<'c> {
    config: &'c BootstrapConfig,
}

impl<'c> Bootstrap<'c> {
    pub fn new(config: &'c BootstrapConfig) -> Self {
        Self { config }
    }

    /// Generate every artifact for `graph`.
    ///
    /// Any failure aborts the pass and no artifact is returned.
    pub fn run(&self, graph: DeclGraph) -> BootstrapResult<Vec<Artifact>> {
        self.config.validate()?;
        graph.validate()?;
        info!(families = self.config.families.len(), "Starting bootstrap pass");

        let graph = normalize(graph, &self.config.normalize)?;
        let families = self
            .config
            .families
            .iter()
            .map(|family| Family::resolve(&graph, family, self.config))
            .collect::<BootstrapResult<Vec<_>>>()?;
        let ctx = GenContext::new(&graph, self.config, &families);

        let mut artifacts = Vec::new();
        for family in &families {
            for kind in ArtifactKind::ALL {
                if !kind.applies_to(family) {
                    continue;
                }
                let contents = kind.generate(&ctx, family)?;
                debug!(family = %family.name(), %kind, bytes = contents.len(), "Generated artifact");
                artifacts.push(Artifact {
                    kind,
                    family: family.name().to_string(),
                    relative_path: kind.default_path(family.name()),
                    contents,
                });
            }
        }

        info!(artifacts = artifacts.len(), "Finished bootstrap pass");
        Ok(artifacts)
    }
}
