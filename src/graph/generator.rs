//! Backend graph generation: collect every layer, infer edges, stamp the
//! snapshot.

use std::path::Path;

use crate::config::ToolConfig;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;

use super::collect::SourceTree;
use super::relations::build_edges;
use super::{BackendGraph, BackendSummary, GRAPH_VERSION};

/// Builds the backend graph for the project at `root`.
///
/// Collection never fails: missing directories and unreadable files are
/// logged and leave gaps. Apart from `generated_at`, the output is a pure
/// function of the source tree.
#[must_use]
pub fn generate(
    fs: &dyn FileSystem,
    clock: &dyn Clock,
    root: &Path,
    config: &ToolConfig,
) -> BackendGraph {
    let source = SourceTree::new(fs, root, &config.layout, &config.collectors);

    log::info!("Processing entities...");
    let entities = source.entities();
    log::info!("  Found {} entities", entities.len());

    log::info!("Processing DTOs...");
    let (dtos, mut edges) = source.dtos(&entities);
    log::info!("  Found {} DTOs", dtos.len());

    log::info!("Processing services...");
    let services = source.services();
    log::info!("  Found {} services", services.len());

    log::info!("Processing controllers...");
    let controllers = source.controllers();
    log::info!("  Found {} controllers", controllers.len());

    log::info!("Building relationships...");
    edges.extend(build_edges(&entities, &dtos, &services, &controllers));
    log::info!("  Found {} relationships", edges.len());

    let summary = BackendSummary {
        total_entities: entities.len(),
        total_dtos: dtos.len(),
        total_services: services.len(),
        total_controllers: controllers.len(),
        total_relationships: edges.len(),
    };

    BackendGraph {
        version: GRAPH_VERSION.to_string(),
        generated_at: clock.now().to_rfc3339(),
        entities,
        dtos,
        services,
        controllers,
        edges,
        summary,
    }
}
