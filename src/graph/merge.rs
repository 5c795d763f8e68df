//! Graph merger: load the backend and frontend snapshots, detect cross-layer
//! drift, and produce the merged baseline.

use std::fmt::Write as _;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::text::lower_first;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;

use super::matching::{dto_for_type, type_for_dto};
use super::{load_json, BackendGraph, FrontendGraph, MergeStats, MergedGraph, GRAPH_VERSION};

/// Backend snapshot file name inside the graph directory.
pub const BACKEND_FILE: &str = "backend-graph.json";
/// Frontend snapshot file name inside the graph directory.
pub const FRONTEND_FILE: &str = "frontend-graph.json";
/// Default merged baseline file name inside the graph directory.
pub const BASELINE_FILE: &str = "graph-baseline.json";

static ROUTE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("invalid route placeholder regex"));

const RULE: &str = "============================================================";

/// Drift between the backend and frontend graphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InconsistencyReport {
    /// DTOs with no matching frontend type.
    pub dtos_without_types: Vec<String>,
    /// Frontend types with no matching DTO.
    pub types_without_dtos: Vec<String>,
    /// `{Dto}.{Prop} missing in {Type}` lines.
    pub property_mismatches: Vec<String>,
    /// `METHOD route (no frontend api_function)` lines.
    pub missing_endpoints: Vec<String>,
}

impl InconsistencyReport {
    /// Number of issues across all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.dtos_without_types.len()
            + self.types_without_dtos.len()
            + self.property_mismatches.len()
            + self.missing_endpoints.len()
    }
}

/// Loads both snapshots from `graph_dir`.
///
/// # Errors
///
/// Fails if either file is missing or is not valid graph JSON.
pub fn load_graphs(fs: &dyn FileSystem, graph_dir: &Path) -> Result<(BackendGraph, FrontendGraph)> {
    let backend = load_json(fs, &graph_dir.join(BACKEND_FILE))?;
    let frontend = load_json(fs, &graph_dir.join(FRONTEND_FILE))?;
    Ok((backend, frontend))
}

/// Compares routes after collapsing `//`, trimming `/` and treating every
/// `{placeholder}` as the same parameter.
#[must_use]
pub fn routes_match(backend_route: &str, frontend_route: &str) -> bool {
    let backend = normalize_route(backend_route);
    let frontend = normalize_route(frontend_route);
    backend == frontend
        || ROUTE_PLACEHOLDER.replace_all(&backend, "{param}")
            == ROUTE_PLACEHOLDER.replace_all(&frontend, "{param}")
}

fn normalize_route(route: &str) -> String {
    route.replace("//", "/").trim_matches('/').to_string()
}

/// Finds DTO/type drift and endpoints the frontend never calls.
#[must_use]
pub fn detect(backend: &BackendGraph, frontend: &FrontendGraph) -> InconsistencyReport {
    let mut report = InconsistencyReport::default();

    for (dto_name, dto) in &backend.dtos {
        let Some(type_name) = type_for_dto(dto_name, &frontend.types) else {
            report.dtos_without_types.push(dto_name.clone());
            continue;
        };
        let type_props = &frontend.types[type_name].properties;
        for prop in dto.properties.keys() {
            if !type_props.contains_key(&lower_first(prop)) && !type_props.contains_key(prop) {
                report.property_mismatches.push(format!("{dto_name}.{prop} missing in {type_name}"));
            }
        }
    }

    report.types_without_dtos = frontend
        .types
        .keys()
        .filter(|name| dto_for_type(name, &backend.dtos).is_none())
        .cloned()
        .collect();

    for controller in backend.controllers.values() {
        for endpoint in &controller.endpoints {
            let method = endpoint.http_method.to_uppercase();
            let full_route =
                format!("{}/{}", controller.route, endpoint.route_fragment).replace("//", "/");
            let covered = frontend.api_functions.values().any(|function| {
                function.method.to_uppercase() == method && routes_match(&full_route, &function.endpoint)
            });
            if !covered {
                report.missing_endpoints.push(format!("{method} {full_route} (no frontend api_function)"));
            }
        }
    }

    report
}

/// Builds the merged baseline. Registries are copied verbatim and edges are
/// concatenated, backend first.
#[must_use]
pub fn merge(backend: BackendGraph, frontend: FrontendGraph, clock: &dyn Clock) -> MergedGraph {
    let cross_layer_mappings = backend
        .dtos
        .keys()
        .filter_map(|dto| {
            type_for_dto(dto, &frontend.types).map(|ty| (format!("dto:{dto}"), format!("type:{ty}")))
        })
        .collect();

    let mut edges = backend.edges;
    edges.extend(frontend.edges);

    let stats = MergeStats {
        entities: backend.entities.len(),
        dtos: backend.dtos.len(),
        services: backend.services.len(),
        controllers: backend.controllers.len(),
        types: frontend.types.len(),
        api_functions: frontend.api_functions.len(),
        hooks: frontend.hooks.len(),
        components: frontend.components.len(),
        total_edges: edges.len(),
    };

    MergedGraph {
        version: GRAPH_VERSION.to_string(),
        generated_at: clock.now().to_rfc3339(),
        entities: backend.entities,
        dtos: backend.dtos,
        services: backend.services,
        controllers: backend.controllers,
        types: frontend.types,
        hooks: frontend.hooks,
        api_functions: frontend.api_functions,
        components: frontend.components,
        edges,
        cross_layer_mappings,
        stats,
    }
}

/// Renders the human-readable drift report.
#[must_use]
pub fn format_report(report: &InconsistencyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}\nCross-Layer Inconsistency Report\n{RULE}\n");

    let sections: [(&str, &Vec<String>); 4] = [
        ("DTOs without frontend types", &report.dtos_without_types),
        ("Frontend types without backend DTOs", &report.types_without_dtos),
        ("Property mismatches", &report.property_mismatches),
        ("Backend endpoints without frontend API functions", &report.missing_endpoints),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title} ({}):", items.len());
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{RULE}");
    match report.total() {
        0 => out.push_str("No inconsistencies detected!\n"),
        total => {
            let _ = writeln!(out, "Total issues: {total}");
        }
    }
    let _ = writeln!(out, "{RULE}");
    out
}

/// Renders the closing lines printed after a successful save.
#[must_use]
pub fn format_summary(merged: &MergedGraph, output: &Path) -> String {
    format!(
        "Merged graph saved to: {}\nSummary: {} entities, {} DTOs, {} types, {} components",
        output.display(),
        merged.stats.entities,
        merged.stats.dtos,
        merged.stats.types,
        merged.stats.components
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, MemoryFileSystem};
    use crate::error::GraphError;
    use serde_json::json;

    fn backend() -> BackendGraph {
        serde_json::from_value(json!({
            "version": "1.0",
            "generated_at": "2025-01-01T00:00:00+00:00",
            "entities": {"Person": {"name": "Person", "namespace": "Koinon.Domain.Entities", "table": "person"}},
            "dtos": {
                "PersonDto": {"name": "PersonDto", "namespace": "N", "properties": {"IdKey": "string", "FirstName": "string", "NickName": "string?"}},
                "CampusDto": {"name": "CampusDto", "namespace": "N", "properties": {}}
            },
            "services": {},
            "controllers": {
                "PeopleController": {
                    "name": "PeopleController",
                    "namespace": "Koinon.Api.Controllers",
                    "route": "api/v1/people",
                    "endpoints": [
                        {"name": "GetByIdKey", "method": "GET", "route": "{idKey}"},
                        {"name": "Delete", "method": "DELETE", "route": "{idKey}"}
                    ]
                }
            },
            "edges": [
                {"source": "PersonDto", "target": "Person", "relationship": "maps_to"},
                {"source": "PeopleController", "target": "PersonService", "relationship": "depends_on"}
            ]
        }))
        .unwrap()
    }

    fn frontend() -> FrontendGraph {
        serde_json::from_value(json!({
            "types": {
                "PersonDto": {"name": "PersonDto", "kind": "interface", "properties": {"idKey": "string", "firstName": "string"}},
                "ButtonProps": {"name": "ButtonProps", "kind": "interface"}
            },
            "api_functions": {
                "getPerson": {"name": "getPerson", "endpoint": "/api/v1/people/{id}", "method": "get"}
            },
            "hooks": {"usePerson": {"name": "usePerson", "dependencies": ["getPerson"]}},
            "components": {"PersonCard": {"name": "PersonCard", "dependencies": ["usePerson"]}},
            "edges": [{"from": "usePerson", "to": "getPerson", "type": "calls"}]
        }))
        .unwrap()
    }

    #[test]
    fn routes_match_ignores_placeholder_names_and_slashes() {
        assert!(routes_match("api/v1/people/{idKey}", "/api/v1/people/{id}/"));
        assert!(routes_match("api//v1/groups", "api/v1/groups"));
        assert!(!routes_match("api/v1/people/{idKey}", "api/v1/people"));
    }

    #[test]
    fn detect_reports_each_category() {
        let report = detect(&backend(), &frontend());
        assert_eq!(report.dtos_without_types, vec!["CampusDto"]);
        assert_eq!(report.types_without_dtos, vec!["ButtonProps"]);
        assert_eq!(report.property_mismatches, vec!["PersonDto.NickName missing in PersonDto"]);
        assert_eq!(report.missing_endpoints, vec!["DELETE api/v1/people/{idKey} (no frontend api_function)"]);
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn merge_concatenates_edges_and_maps_layers() {
        let (backend, frontend) = (backend(), frontend());
        let expected_edges = backend.edges.len() + frontend.edges.len();
        let merged = merge(backend, frontend, &FixedClock::default());

        assert_eq!(merged.edges.len(), expected_edges);
        assert_eq!(merged.stats.total_edges, expected_edges);
        assert_eq!(merged.stats.types, 2);
        assert_eq!(merged.types.len(), 2);
        assert_eq!(merged.cross_layer_mappings["dto:PersonDto"], "type:PersonDto");
        assert!(!merged.cross_layer_mappings.contains_key("dto:CampusDto"));
    }

    #[test]
    fn merge_keeps_generator_fields_outside_the_schema() {
        let mut frontend = frontend();
        let person = frontend.types.get_mut("PersonDto").unwrap();
        person.extra.insert("extends".to_string(), json!(["Base"]));
        let mut backend = backend();
        backend.dtos.get_mut("PersonDto").unwrap().extra.insert("attributes".to_string(), json!(["Serializable"]));

        let merged = merge(backend, frontend, &FixedClock::default());
        let written = serde_json::to_value(&merged).unwrap();
        assert_eq!(written["types"]["PersonDto"]["extends"], json!(["Base"]));
        assert_eq!(written["dtos"]["PersonDto"]["attributes"], json!(["Serializable"]));

        let reread: MergedGraph = serde_json::from_value(written).unwrap();
        assert_eq!(reread.types["PersonDto"], merged.types["PersonDto"]);
    }

    #[test]
    fn report_lists_sections_and_total() {
        let text = format_report(&detect(&backend(), &frontend()));
        assert!(text.contains("Cross-Layer Inconsistency Report"));
        assert!(text.contains("DTOs without frontend types (1):\n  - CampusDto"));
        assert!(text.contains("Total issues: 4"));
        assert!(format_report(&InconsistencyReport::default()).contains("No inconsistencies detected!"));
    }

    #[test]
    fn load_graphs_distinguishes_missing_and_malformed() {
        let dir = Path::new("/p/tools/graph");
        let fs = MemoryFileSystem::new().with_file("/p/tools/graph/backend-graph.json", "{}");
        assert!(matches!(load_graphs(&fs, dir), Err(GraphError::MissingInput(_))));

        let fs = fs.with_file("/p/tools/graph/frontend-graph.json", "{not json");
        assert!(matches!(load_graphs(&fs, dir), Err(GraphError::MalformedInput { .. })));
    }
}
