//! Architecture graph: backend registries, the frontend graph consumed from
//! the TypeScript generator, and the merged baseline.

pub mod collect;
pub mod generator;
pub mod matching;
pub mod merge;
pub mod naming;
pub mod relations;

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::extract::{Endpoint, MethodSignature, Navigation};
use crate::ports::filesystem::FileSystem;

/// Schema version written into every snapshot.
pub const GRAPH_VERSION: &str = "1.0";

/// Name -> record registry. Ordered so heuristics and snapshots are stable.
pub type Registry<T> = BTreeMap<String, T>;

/// Property name -> declared type. Extracted types are JSON strings;
/// graphs from other generators may hold any JSON value.
pub type PropertyMap = BTreeMap<String, Value>;

/// Generator fields outside the typed schema, kept verbatim.
pub type ExtraFields = BTreeMap<String, Value>;

/// Wraps extracted property types as JSON strings.
#[must_use]
pub fn property_map(properties: BTreeMap<String, String>) -> PropertyMap {
    properties.into_iter().map(|(name, ty)| (name, Value::String(ty))).collect()
}

/// Kind of relationship an [`Edge`] expresses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// DTO maps to an entity.
    MapsTo,
    /// Controller depends on a service.
    DependsOn,
    /// Service method returns a DTO.
    Returns,
    /// Service (or component) uses an entity (or hook).
    Uses,
    /// Hook calls an API function.
    Calls,
}

/// A directed edge between two named nodes. Multiplicity is meaningful.
///
/// The legacy `{from, to, type}` shape is accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    /// Source node name.
    #[serde(alias = "from")]
    pub source: String,
    /// Target node name.
    #[serde(alias = "to")]
    pub target: String,
    /// Relationship kind.
    #[serde(alias = "type")]
    pub relationship: Relationship,
}

impl Edge {
    /// Creates an edge.
    #[must_use]
    pub fn new(source: &str, target: &str, relationship: Relationship) -> Self {
        Self { source: source.to_string(), target: target.to_string(), relationship }
    }
}

/// A domain entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRecord {
    /// Type name (from the file name).
    pub name: String,
    /// Dotted namespace.
    pub namespace: String,
    /// Storage table name.
    #[serde(default)]
    pub table: String,
    /// Property name -> raw type.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Navigation properties in declaration order.
    #[serde(default)]
    pub navigations: Vec<Navigation>,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A data transfer object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DtoRecord {
    /// Type name.
    pub name: String,
    /// Dotted namespace.
    pub namespace: String,
    /// Property name -> raw type.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Entity the DTO was linked to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_entity: Option<String>,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// An application service or service interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRecord {
    /// Type name.
    pub name: String,
    /// Dotted namespace.
    pub namespace: String,
    /// Public method signatures.
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
    /// Primary-constructor dependency types.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// An API controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerRecord {
    /// Type name.
    pub name: String,
    /// Dotted namespace.
    pub namespace: String,
    /// Base route, possibly with `{param}` placeholders.
    #[serde(default)]
    pub route: String,
    /// Declared endpoints.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Convention flags (`response_envelope`, `idkey_routes`, ...). Only
    /// key presence is meaningful to the verifier.
    #[serde(default)]
    pub patterns: BTreeMap<String, Value>,
    /// Primary-constructor dependency types.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Counts written alongside a backend graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendSummary {
    /// Number of entities.
    pub total_entities: usize,
    /// Number of DTOs.
    pub total_dtos: usize,
    /// Number of services.
    pub total_services: usize,
    /// Number of controllers.
    pub total_controllers: usize,
    /// Number of edges.
    pub total_relationships: usize,
}

/// Snapshot produced by the backend generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendGraph {
    /// Schema version.
    #[serde(default)]
    pub version: String,
    /// ISO-8601 UTC generation time.
    #[serde(default)]
    pub generated_at: String,
    /// Entities by name.
    #[serde(default)]
    pub entities: Registry<EntityRecord>,
    /// DTOs by name.
    #[serde(default)]
    pub dtos: Registry<DtoRecord>,
    /// Services by name.
    #[serde(default)]
    pub services: Registry<ServiceRecord>,
    /// Controllers by name.
    #[serde(default)]
    pub controllers: Registry<ControllerRecord>,
    /// Inferred edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Counts.
    #[serde(default)]
    pub summary: BackendSummary,
}

/// A TypeScript type or interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrontendTypeRecord {
    /// Type name.
    pub name: String,
    /// `interface`, `type`, `enum`, ...
    #[serde(default)]
    pub kind: String,
    /// Property name -> TypeScript type.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Source path relative to the web root.
    #[serde(default)]
    pub path: String,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A frontend API client function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiFunctionRecord {
    /// Function name.
    #[serde(default)]
    pub name: String,
    /// Route the function calls.
    #[serde(default)]
    pub endpoint: String,
    /// HTTP verb.
    #[serde(default)]
    pub method: String,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A React hook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HookRecord {
    /// Hook name.
    #[serde(default)]
    pub name: String,
    /// Names the hook depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A React component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentRecord {
    /// Component name.
    #[serde(default)]
    pub name: String,
    /// Names the component depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Set by the frontend generator when the component calls the API itself.
    #[serde(rename = "apiCallsDirectly", default, skip_serializing_if = "std::ops::Not::not")]
    pub api_calls_directly: bool,
    /// Remaining generator fields, kept verbatim.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Snapshot produced by the frontend generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrontendGraph {
    /// Schema version.
    #[serde(default)]
    pub version: String,
    /// Generation time as written by the generator.
    #[serde(default)]
    pub generated_at: String,
    /// Types by name.
    #[serde(default)]
    pub types: Registry<FrontendTypeRecord>,
    /// API functions by name.
    #[serde(default)]
    pub api_functions: Registry<ApiFunctionRecord>,
    /// Hooks by name.
    #[serde(default)]
    pub hooks: Registry<HookRecord>,
    /// Components by name.
    #[serde(default)]
    pub components: Registry<ComponentRecord>,
    /// Frontend edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Counts written alongside a merged graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of entities.
    pub entities: usize,
    /// Number of DTOs.
    pub dtos: usize,
    /// Number of services.
    pub services: usize,
    /// Number of controllers.
    pub controllers: usize,
    /// Number of frontend types.
    pub types: usize,
    /// Number of API functions.
    pub api_functions: usize,
    /// Number of hooks.
    pub hooks: usize,
    /// Number of components.
    pub components: usize,
    /// Number of edges from both sides.
    pub total_edges: usize,
}

/// Unified baseline produced by the merger and read by the verifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedGraph {
    /// Schema version.
    #[serde(default)]
    pub version: String,
    /// ISO-8601 UTC merge time.
    #[serde(default)]
    pub generated_at: String,
    /// Backend entities.
    #[serde(default)]
    pub entities: Registry<EntityRecord>,
    /// Backend DTOs.
    #[serde(default)]
    pub dtos: Registry<DtoRecord>,
    /// Backend services.
    #[serde(default)]
    pub services: Registry<ServiceRecord>,
    /// Backend controllers.
    #[serde(default)]
    pub controllers: Registry<ControllerRecord>,
    /// Frontend types.
    #[serde(default)]
    pub types: Registry<FrontendTypeRecord>,
    /// Frontend hooks.
    #[serde(default)]
    pub hooks: Registry<HookRecord>,
    /// Frontend API functions.
    #[serde(default)]
    pub api_functions: Registry<ApiFunctionRecord>,
    /// Frontend components.
    #[serde(default)]
    pub components: Registry<ComponentRecord>,
    /// Backend edges followed by frontend edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// `dto:<Name>` -> `type:<Name>`.
    #[serde(default)]
    pub cross_layer_mappings: BTreeMap<String, String>,
    /// Counts.
    #[serde(default)]
    pub stats: MergeStats,
}

/// Reads a JSON snapshot.
///
/// # Errors
///
/// [`GraphError::MissingInput`] when the file does not exist,
/// [`GraphError::MalformedInput`] when it cannot be read or decoded.
pub fn load_json<T: DeserializeOwned>(fs: &dyn FileSystem, path: &Path) -> Result<T> {
    if !fs.exists(path) {
        return Err(GraphError::MissingInput(path.to_path_buf()));
    }
    let text = fs.read_to_string(path).map_err(|e| GraphError::malformed(path, e))?;
    serde_json::from_str(&text).map_err(|e| GraphError::malformed(path, e))
}

/// Writes a snapshot as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// [`GraphError::Write`] when serialization or the write fails.
pub fn save_json<T: Serialize>(fs: &dyn FileSystem, path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| GraphError::write(path, e))?;
    fs.write(path, &text).map_err(|e| GraphError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_reads_legacy_shape_and_writes_canonical() {
        let edge: Edge =
            serde_json::from_value(json!({"from": "PersonDto", "to": "Person", "type": "maps_to"}))
                .unwrap();
        assert_eq!(edge, Edge::new("PersonDto", "Person", Relationship::MapsTo));
        let written = serde_json::to_value(&edge).unwrap();
        assert_eq!(written, json!({"source": "PersonDto", "target": "Person", "relationship": "maps_to"}));
    }

    #[test]
    fn edge_rejects_unknown_relationship() {
        let result: std::result::Result<Edge, serde_json::Error> =
            serde_json::from_value(json!({"source": "A", "target": "B", "relationship": "owns"}));
        assert!(result.is_err());
    }

    #[test]
    fn sparse_service_record_uses_defaults() {
        let service: ServiceRecord = serde_json::from_value(
            json!({"name": "IPersonService", "namespace": "Koinon.Application.Interfaces"}),
        )
        .unwrap();
        assert!(service.methods.is_empty());
        assert!(service.dependencies.is_empty());
    }

    #[test]
    fn component_keeps_unknown_fields() {
        let value = json!({
            "name": "PersonCard",
            "path": "components/PersonCard.tsx",
            "dependencies": ["usePerson"],
            "apiCallsDirectly": true
        });
        let component: ComponentRecord = serde_json::from_value(value.clone()).unwrap();
        assert!(component.api_calls_directly);
        assert_eq!(component.extra["path"], json!("components/PersonCard.tsx"));
        assert_eq!(serde_json::to_value(&component).unwrap(), value);
    }
}
