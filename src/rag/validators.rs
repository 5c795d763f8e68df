//! Semantic architecture validators.
//!
//! Each validator runs an embedding search restricted by payload filter
//! and confirms every hit with a text heuristic, so a hit only becomes a
//! violation when the chunk really shows the pattern.

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

use log::info;

use super::heuristics::{extract_api_call, has_business_logic, has_sync_query, injects_repository, is_n_plus_one_pattern};
use super::query::embed_query;
use super::snippet;
use crate::context::ServiceContext;
use crate::error::{GraphError, Result};
use crate::ports::vector_store::{ChunkPayload, FieldCondition, PayloadFilter, ScoredPoint, SearchRequest};

const SEARCH_LIMIT: usize = 50;
const SCORE_THRESHOLD: f32 = 0.7;
const SCROLL_LIMIT: usize = 100;
const SNIPPET_CHARS: usize = 200;
const REPORT_SNIPPET_CHARS: usize = 100;

/// How serious a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationSeverity {
    /// Must be fixed before merging.
    High,
    /// Should be fixed.
    Medium,
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        })
    }
}

/// A confirmed architecture violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Severity.
    pub severity: ViolationSeverity,
    /// File path, or a label such as `Entity: Person`.
    pub file: String,
    /// What is wrong and how to fix it.
    pub message: String,
    /// Leading part of the offending chunk; empty when not chunk-based.
    pub snippet: String,
    /// Similarity of the hit, when search-based.
    pub score: Option<f32>,
}

/// The semantic checks run by `rag validate`, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Controllers doing calculations, loops or string handling.
    BusinessLogicInControllers,
    /// Components calling `fetch`/`axios` instead of a hook.
    DirectApiCallsInComponents,
    /// Queries issued inside loops.
    NPlusOneQueries,
    /// Synchronous EF Core materialization.
    SyncQueries,
    /// Entities with no matching DTO file.
    DtoCoverage,
    /// Controllers injecting repositories.
    ControllersUseServices,
}

impl Validator {
    /// Every validator, in run order.
    pub const ALL: [Self; 6] = [
        Self::BusinessLogicInControllers,
        Self::DirectApiCallsInComponents,
        Self::NPlusOneQueries,
        Self::SyncQueries,
        Self::DtoCoverage,
        Self::ControllersUseServices,
    ];

    /// Progress line shown while the validator runs.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::BusinessLogicInControllers => "Checking for business logic in controllers...",
            Self::DirectApiCallsInComponents => "Checking for direct API calls in components...",
            Self::NPlusOneQueries => "Detecting N+1 query patterns...",
            Self::SyncQueries => "Detecting missing async/await...",
            Self::DtoCoverage => "Validating DTO coverage...",
            Self::ControllersUseServices => "Validating controllers use services...",
        }
    }

    fn search_text(self) -> &'static str {
        match self {
            Self::BusinessLogicInControllers => {
                "controller method with calculations, loops over data, or business rules"
            }
            Self::DirectApiCallsInComponents => "React component making HTTP request with fetch or axios",
            Self::NPlusOneQueries => "foreach loop with database query or repository call inside",
            Self::SyncQueries => "EF Core query without async or await like ToList FirstOrDefault Single",
            Self::DtoCoverage => "",
            Self::ControllersUseServices => {
                "controller constructor with repository injection instead of service"
            }
        }
    }

    fn filter(self) -> PayloadFilter {
        let condition = match self {
            Self::BusinessLogicInControllers => FieldCondition::equals("layer", "API"),
            Self::DirectApiCallsInComponents => FieldCondition::equals("layer", "Frontend"),
            Self::NPlusOneQueries => {
                FieldCondition::any_of("layer", &["Application", "Infrastructure", "API"])
            }
            Self::SyncQueries => FieldCondition::any_of("layer", &["Application", "Infrastructure"]),
            Self::DtoCoverage => FieldCondition::equals("type", "Entity"),
            Self::ControllersUseServices => FieldCondition::equals("type", "Controller"),
        };
        PayloadFilter::default().with(condition)
    }

    /// Confirms a search hit, returning the violation it shows.
    fn inspect(self, hit: &ScoredPoint) -> Option<Violation> {
        let content = hit.payload.content.as_str();
        let (severity, message) = match self {
            Self::BusinessLogicInControllers => has_business_logic(content).then(|| {
                (ViolationSeverity::High, "Controller contains business logic - move to service layer".to_string())
            })?,
            Self::DirectApiCallsInComponents => {
                let call = extract_api_call(content)?;
                (ViolationSeverity::Medium, format!("Component makes direct API call: {call} - use a hook instead"))
            }
            Self::NPlusOneQueries => is_n_plus_one_pattern(content).then(|| {
                (ViolationSeverity::High, "N+1 query pattern detected - use Include() or join".to_string())
            })?,
            Self::SyncQueries => has_sync_query(content).then(|| {
                (ViolationSeverity::Medium, "Synchronous EF Core query detected - use async methods".to_string())
            })?,
            Self::ControllersUseServices => injects_repository(content).then(|| {
                (
                    ViolationSeverity::High,
                    "Controller injects Repository directly - should use Service layer".to_string(),
                )
            })?,
            Self::DtoCoverage => return None,
        };
        Some(Violation {
            severity,
            file: hit.payload.path.clone(),
            message,
            snippet: snippet(content, SNIPPET_CHARS).to_string(),
            score: Some(hit.score),
        })
    }

    /// Runs this validator against the index.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Remote`] if embedding, search or scroll fails.
    pub async fn run(self, ctx: &ServiceContext) -> Result<Vec<Violation>> {
        if self == Self::DtoCoverage {
            return dto_coverage(ctx).await;
        }
        let vector = embed_query(ctx, self.search_text()).await?;
        let hits = ctx
            .vector_store
            .search(SearchRequest {
                vector,
                filter: Some(self.filter()),
                limit: SEARCH_LIMIT,
                score_threshold: Some(SCORE_THRESHOLD),
            })
            .await
            .map_err(|e| GraphError::remote("search", e))?;
        Ok(hits.iter().filter_map(|hit| self.inspect(hit)).collect())
    }
}

/// File stem of `path` with `suffix` removed.
fn file_name_without<'a>(path: &'a str, suffix: &str) -> &'a str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(suffix).unwrap_or(name)
}

async fn scroll_kind(ctx: &ServiceContext, kind: &str) -> Result<Vec<ChunkPayload>> {
    ctx.vector_store
        .scroll(PayloadFilter::default().with(FieldCondition::equals("type", kind)), SCROLL_LIMIT)
        .await
        .map_err(|e| GraphError::remote(&format!("scroll {kind}"), e))
}

async fn dto_coverage(ctx: &ServiceContext) -> Result<Vec<Violation>> {
    let entities = scroll_kind(ctx, "Entity").await?;
    let dtos = scroll_kind(ctx, "DTO").await?;

    let entity_names: BTreeSet<&str> = entities
        .iter()
        .filter(|p| format!("/{}", p.path).contains("/Entities/") && p.path.ends_with(".cs"))
        .map(|p| file_name_without(&p.path, ".cs"))
        .collect();
    let dto_names: BTreeSet<&str> = dtos
        .iter()
        .filter(|p| p.path.contains("Dto.cs"))
        .map(|p| file_name_without(&p.path, "Dto.cs"))
        .collect();

    Ok(entity_names
        .difference(&dto_names)
        .map(|name| Violation {
            severity: ViolationSeverity::Medium,
            file: format!("Entity: {name}"),
            message: format!("Entity \"{name}\" has no corresponding DTO - DTOs provide API isolation"),
            snippet: String::new(),
            score: None,
        })
        .collect())
}

/// Runs every validator in order and collects their violations.
///
/// # Errors
///
/// Returns the first validator failure.
pub async fn run_all(ctx: &ServiceContext) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    for validator in Validator::ALL {
        info!("🔍 {}", validator.description());
        violations.extend(validator.run(ctx).await?);
    }
    Ok(violations)
}

/// Renders the validation verdict for the terminal.
#[must_use]
pub fn format_report(violations: &[Violation]) -> String {
    let rule = "=".repeat(60);
    if violations.is_empty() {
        return format!("\n{rule}\n✅ RAG validation passed - no violations detected\n{rule}\n");
    }
    let mut out = format!("\n{rule}\n❌ BLOCKED: {} violations detected\n{rule}\n", violations.len());
    for (i, violation) in violations.iter().enumerate() {
        let _ = writeln!(out, "\n{}. [{}] {}", i + 1, violation.severity, violation.file);
        let _ = writeln!(out, "   {}", violation.message);
        if !violation.snippet.is_empty() {
            let _ = writeln!(out, "   Snippet: {}...", snippet(&violation.snippet, REPORT_SNIPPET_CHARS));
        }
    }
    let _ = write!(out, "\n{rule}\nFix these violations before creating PR.\n{rule}\n");
    out
}
