//! Naming-convention edges between collected records.
//!
//! Every rule is a best-effort string heuristic. Registries iterate in name
//! order, so "first match" is deterministic.

use super::{
    ControllerRecord, DtoRecord, Edge, EntityRecord, Registry, Relationship, ServiceRecord,
};

/// Builds `depends_on`, `returns` and `uses` edges, in that order.
#[must_use]
pub fn build_edges(
    entities: &Registry<EntityRecord>,
    dtos: &Registry<DtoRecord>,
    services: &Registry<ServiceRecord>,
    controllers: &Registry<ControllerRecord>,
) -> Vec<Edge> {
    let mut edges = controller_dependencies(services, controllers);
    edges.extend(service_returns(services, dtos));
    edges.extend(service_uses(services, entities));
    edges
}

/// Controller -> service, directly or across the `I` interface prefix.
fn controller_dependencies(
    services: &Registry<ServiceRecord>,
    controllers: &Registry<ControllerRecord>,
) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (controller, record) in controllers {
        for dependency in &record.dependencies {
            let target = if services.contains_key(dependency) {
                Some(dependency.as_str())
            } else {
                services
                    .keys()
                    .map(String::as_str)
                    .find(|service| {
                        dependency.trim_start_matches('I') == *service
                            || dependency.strip_prefix('I') == Some(*service)
                    })
            };
            if let Some(service) = target {
                edges.push(Edge::new(controller, service, Relationship::DependsOn));
            }
        }
    }
    edges
}

/// Service -> first DTO named inside each method's return type.
fn service_returns(services: &Registry<ServiceRecord>, dtos: &Registry<DtoRecord>) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (service, record) in services {
        for method in &record.methods {
            if let Some(dto) = dtos.keys().find(|dto| method.return_type.contains(dto.as_str())) {
                edges.push(Edge::new(service, dto, Relationship::Returns));
            }
        }
    }
    edges
}

/// Service -> first entity named inside each dependency type.
fn service_uses(services: &Registry<ServiceRecord>, entities: &Registry<EntityRecord>) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (service, record) in services {
        for dependency in &record.dependencies {
            if let Some(entity) = entities.keys().find(|entity| dependency.contains(entity.as_str())) {
                edges.push(Edge::new(service, entity, Relationship::Uses));
            }
        }
    }
    edges
}
