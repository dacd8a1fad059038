//! Shared setup for generator tests.

use crate::family::{Family, GenContext};
use crate::fixtures;
use crate::normalize::{NormalizedGraph, normalize};
use astbridge_core::{BootstrapConfig, BootstrapResult};

pub(crate) type Generator = fn(&GenContext<'_>, &Family<'_>) -> BootstrapResult<String>;

/// The normalized fixture graph and its configuration.
pub(crate) fn prepared() -> (NormalizedGraph, BootstrapConfig) {
    prepared_with(fixtures::config())
}

pub(crate) fn prepared_with(config: BootstrapConfig) -> (NormalizedGraph, BootstrapConfig) {
    let graph = normalize(fixtures::clang_subset(), &config.normalize).unwrap();
    (graph, config)
}

pub(crate) fn families<'a>(
    graph: &'a NormalizedGraph,
    config: &'a BootstrapConfig,
) -> Vec<Family<'a>> {
    config
        .families
        .iter()
        .map(|family| Family::resolve(graph, family, config))
        .collect::<BootstrapResult<_>>()
        .unwrap()
}

/// Run `generator` for the family named `name` over the fixture.
pub(crate) fn generate(generator: Generator, name: &str) -> String {
    let (graph, config) = prepared();
    generate_in(&graph, &config, generator, name).unwrap()
}

pub(crate) fn generate_in(
    graph: &NormalizedGraph,
    config: &BootstrapConfig,
    generator: Generator,
    name: &str,
) -> BootstrapResult<String> {
    let families = families(graph, config);
    let ctx = GenContext::new(graph, config, &families);
    let family = families
        .iter()
        .find(|family| family.name() == name)
        .unwrap();
    generator(&ctx, family)
}
