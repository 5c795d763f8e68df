//! Collectors: walk the layer directories and turn each C# file into
//! registry records.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{CollectorConfig, LayoutConfig};
use crate::extract::csharp;
use crate::extract::text::camel_to_snake;
use crate::ports::filesystem::FileSystem;

use super::naming::infer_linked_entity;
use super::{
    property_map, ControllerRecord, DtoRecord, Edge, EntityRecord, ExtraFields, Registry,
    Relationship, ServiceRecord,
};

/// Source file extension every collector looks for.
const SOURCE_EXTENSION: &str = "cs";

/// Reads the C# sources of one project through a [`FileSystem`].
pub struct SourceTree<'a> {
    fs: &'a dyn FileSystem,
    root: &'a Path,
    layout: &'a LayoutConfig,
    collectors: &'a CollectorConfig,
}

/// A source file that was read successfully.
struct SourceFile {
    stem: String,
    content: String,
}

impl<'a> SourceTree<'a> {
    /// Creates a tree rooted at `root`.
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystem,
        root: &'a Path,
        layout: &'a LayoutConfig,
        collectors: &'a CollectorConfig,
    ) -> Self {
        Self { fs, root, layout, collectors }
    }

    /// `IEntity`, `IAuditable`: `I` followed by an uppercase letter, unless
    /// listed as an exception.
    fn is_marker_interface(&self, stem: &str) -> bool {
        let mut chars = stem.chars();
        chars.next() == Some('I')
            && chars.next().is_some_and(char::is_uppercase)
            && !self.collectors.interface_exceptions.iter().any(|name| name == stem)
    }

    /// `*.cs` directly inside `dir`, sorted. `None` when the directory is missing.
    fn list_sources(&self, dir: &Path) -> Option<Vec<PathBuf>> {
        let dir = self.root.join(dir);
        if !self.fs.exists(&dir) {
            return None;
        }
        match self.fs.list_dir(&dir) {
            Ok(names) => Some(
                names
                    .into_iter()
                    .map(|name| dir.join(name))
                    .filter(|path| has_source_extension(path))
                    .collect(),
            ),
            Err(err) => {
                log::warn!("Could not list {}: {err}", dir.display());
                Some(Vec::new())
            }
        }
    }

    /// `**/*.cs` below `dir`, sorted. `None` when the directory is missing.
    fn walk_sources(&self, dir: &Path) -> Option<Vec<PathBuf>> {
        let dir = self.root.join(dir);
        if !self.fs.exists(&dir) {
            return None;
        }
        match self.fs.walk_files(&dir, &[]) {
            Ok(files) => Some(files.into_iter().filter(|path| has_source_extension(path)).collect()),
            Err(err) => {
                log::warn!("Could not walk {}: {err}", dir.display());
                Some(Vec::new())
            }
        }
    }

    /// Reads one file. Unreadable and empty files are skipped.
    fn read(&self, path: &Path) -> Option<SourceFile> {
        let stem = path.file_stem()?.to_str()?.to_string();
        match self.fs.read_to_string(path) {
            Ok(content) if !content.is_empty() => Some(SourceFile { stem, content }),
            Ok(_) => None,
            Err(err) => {
                log::warn!("Could not read {}: {err}", path.display());
                None
            }
        }
    }

    /// Collects domain entities.
    #[must_use]
    pub fn entities(&self) -> Registry<EntityRecord> {
        let mut entities = Registry::new();
        let Some(files) = self.list_sources(&self.layout.entities_dir) else {
            log::warn!(
                "Entity directory not found: {}",
                self.root.join(&self.layout.entities_dir).display()
            );
            return entities;
        };

        for path in files {
            let Some(file) = self.read_unless_marker(&path) else {
                continue;
            };
            let Some(namespace) = csharp::extract_namespace(&file.content) else {
                continue;
            };
            let record = EntityRecord {
                table: csharp::extract_table_name(&file.stem, &file.content),
                properties: csharp::extract_properties(&file.content),
                navigations: csharp::extract_navigations(&file.content),
                name: file.stem.clone(),
                namespace,
                extra: ExtraFields::new(),
            };
            entities.insert(file.stem, record);
        }
        entities
    }

    /// Collects DTOs (several per file) and links each to an entity,
    /// returning one `maps_to` edge per link.
    #[must_use]
    pub fn dtos(&self, entities: &Registry<EntityRecord>) -> (Registry<DtoRecord>, Vec<Edge>) {
        let mut dtos = Registry::new();
        let mut edges = Vec::new();
        let Some(files) = self.walk_sources(&self.layout.dtos_dir) else {
            log::warn!("DTO directory not found: {}", self.root.join(&self.layout.dtos_dir).display());
            return (dtos, edges);
        };

        for path in files {
            let Some(file) = self.read_unless_marker(&path) else {
                continue;
            };
            let Some(namespace) = csharp::extract_namespace(&file.content) else {
                continue;
            };
            for name in csharp::dto_declarations(&file.content) {
                let linked_entity = infer_linked_entity(&name, entities);
                if let Some(entity) = &linked_entity {
                    edges.push(Edge::new(&name, entity, Relationship::MapsTo));
                }
                let record = DtoRecord {
                    properties: property_map(csharp::extract_record_properties(&file.content, &name)),
                    name: name.clone(),
                    namespace: namespace.clone(),
                    linked_entity,
                    extra: ExtraFields::new(),
                };
                dtos.insert(name, record);
            }
        }
        (dtos, edges)
    }

    /// Collects services and service interfaces. Either directory may be absent.
    #[must_use]
    pub fn services(&self) -> Registry<ServiceRecord> {
        let mut services = Registry::new();
        for dir in &self.layout.services_dirs {
            let Some(files) = self.list_sources(dir) else {
                continue;
            };
            for path in files {
                let Some(file) = self.read(&path) else {
                    continue;
                };
                if !file.stem.ends_with("Service") {
                    continue;
                }
                let Some(namespace) = csharp::extract_namespace(&file.content) else {
                    continue;
                };
                let record = ServiceRecord {
                    methods: csharp::extract_methods(&file.content),
                    dependencies: csharp::extract_constructor_dependencies(&file.content),
                    name: file.stem.clone(),
                    namespace,
                    extra: ExtraFields::new(),
                };
                services.insert(file.stem, record);
            }
        }
        services
    }

    /// Collects API controllers.
    #[must_use]
    pub fn controllers(&self) -> Registry<ControllerRecord> {
        let mut controllers = Registry::new();
        let Some(files) = self.list_sources(&self.layout.controllers_dir) else {
            log::warn!(
                "Controller directory not found: {}",
                self.root.join(&self.layout.controllers_dir).display()
            );
            return controllers;
        };

        for path in files {
            let Some(file) = self.read_unless_marker(&path) else {
                continue;
            };
            let Some(base) = file.stem.strip_suffix("Controller") else {
                continue;
            };
            let Some(namespace) = csharp::extract_namespace(&file.content) else {
                continue;
            };
            let route = csharp::extract_route_attribute(&file.content)
                .unwrap_or_else(|| format!("api/v1/{}", camel_to_snake(base)));
            let record = ControllerRecord {
                route,
                endpoints: csharp::extract_endpoints(&file.content),
                patterns: csharp::extract_patterns(&file.content)
                    .into_iter()
                    .map(|(flag, found)| (flag, Value::Bool(found)))
                    .collect(),
                dependencies: csharp::extract_constructor_dependencies(&file.content),
                name: file.stem.clone(),
                namespace,
                extra: ExtraFields::new(),
            };
            controllers.insert(file.stem, record);
        }
        controllers
    }

    fn read_unless_marker(&self, path: &Path) -> Option<SourceFile> {
        let stem = path.file_stem()?.to_str()?;
        if self.is_marker_interface(stem) {
            return None;
        }
        self.read(path)
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}
