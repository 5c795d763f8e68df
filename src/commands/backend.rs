//! `koinon-graph backend` command.

use std::path::Path;
use std::process::ExitCode;

use crate::cli::BackendArgs;
use crate::config::ToolConfig;
use crate::context::GraphContext;
use crate::error::{GraphError, Result};
use crate::graph::{generator, save_json};

/// Execute the `backend` command against the live filesystem.
///
/// # Errors
///
/// Returns [`GraphError::MissingInput`] when the source directory does not
/// exist and [`GraphError::Write`] when the graph cannot be saved.
pub fn run(args: &BackendArgs) -> Result<ExitCode> {
    let ctx = GraphContext::live();
    let config = super::load_config(ctx.fs.as_ref(), &args.project_root)?;
    run_with_context(&ctx, &config, &args.project_root, &args.output)
}

/// Generate the backend graph under `root` and write it to `output`
/// (resolved against `root` when relative).
///
/// # Errors
///
/// See [`run`].
pub fn run_with_context(
    ctx: &GraphContext,
    config: &ToolConfig,
    root: &Path,
    output: &Path,
) -> Result<ExitCode> {
    let source_dir = root.join(&config.layout.source_dir);
    if !ctx.fs.exists(&source_dir) {
        return Err(GraphError::MissingInput(source_dir));
    }

    let graph = generator::generate(ctx.fs.as_ref(), ctx.clock.as_ref(), root, config);
    let output = root.join(output);
    save_json(ctx.fs.as_ref(), &output, &graph)?;

    println!("Backend graph saved to: {}", output.display());
    println!(
        "Summary: {} entities, {} DTOs, {} services, {} controllers, {} relationships",
        graph.summary.total_entities,
        graph.summary.total_dtos,
        graph.summary.total_services,
        graph.summary.total_controllers,
        graph.summary.total_relationships
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use crate::graph::BackendGraph;
    use crate::graph::load_json;

    #[test]
    fn missing_source_dir_is_missing_input() {
        let ctx = GraphContext::in_memory(MemoryFileSystem::new());
        let err = run_with_context(&ctx, &ToolConfig::default(), Path::new("/p"), Path::new("out.json"))
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingInput(path) if path == Path::new("/p/src")));
    }

    #[test]
    fn writes_graph_relative_to_root() {
        let fs = MemoryFileSystem::new().with_file(
            "/p/src/Koinon.Domain/Entities/Person.cs",
            "namespace Koinon.Domain.Entities;\npublic class Person : Entity\n{\n    public string FirstName { get; set; } = string.Empty;\n}\n",
        );
        let ctx = GraphContext::in_memory(fs);
        run_with_context(&ctx, &ToolConfig::default(), Path::new("/p"), Path::new("tools/graph/backend-graph.json"))
            .unwrap();

        let graph: BackendGraph =
            load_json(ctx.fs.as_ref(), Path::new("/p/tools/graph/backend-graph.json")).unwrap();
        assert!(graph.entities.contains_key("Person"));
        assert_eq!(graph.generated_at, "2025-01-01T00:00:00+00:00");
    }
}
