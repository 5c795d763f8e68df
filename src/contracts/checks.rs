//! The five contract checks run over a merged baseline.

use crate::extract::text::lower_first;
use crate::graph::matching::{dto_for_type, type_for_dto};
use crate::graph::{MergedGraph, PropertyMap};

use super::{CheckOutcome, Finding, Severity};

/// DTOs that intentionally have no frontend type, or whose frontend
/// counterpart has a different name.
pub const FRONTEND_ALLOWLIST: &[&str] = &[
    "CreateNotificationDto",
    "BatchCheckinResultDto",
    "BulkUpdatePreferencesDto",
    "BulkMarkAttendanceResultDto",
    "BatchLabelRequestDto",
    "CapacityOverrideRequestDto",
    "AttendanceAnalyticsDto",
    "AttendanceTrendDto",
    "AttendanceByGroupDto",
    "AttendanceSummaryDto",
    "CreateGroupMemberDto",
    "UpdateGroupMemberDto",
    "ImportFamilyResultDto",
    "OfflineCheckinDto",
    "SystemStatisticsDto",
    "AuditLogExportRequest",
    "ExportJobDto",
    "StartExportRequest",
    "EmailAttachmentDto",
    "QueuedSmsDto",
    "TwilioWebhookDto",
    "BatchStatementRequest",
    "BatchFilterRequest",
    "ReportDefinitionDto",
    "CreateReportDefinitionRequest",
    "UpdateReportDefinitionRequest",
    "ReportRunDto",
    "RunReportRequest",
    "ReportScheduleDto",
    "CreateReportScheduleRequest",
    "UpdateReportScheduleRequest",
    "SecurityRoleDto",
    "SupervisorReprintRequest",
    "MyFamilyMemberDto",
    "MyInvolvementGroupDto",
    "PersonGroupMembershipDto",
    "DashboardBatchDto",
    "CreateFamilyAddressRequest",
];

/// Base-entity properties never expected on frontend types.
const IGNORED_PROPERTIES: &[&str] = &["Id", "IdKey", "Guid", "CreatedDateTime", "ModifiedDateTime"];

/// Property types sent as form data rather than JSON.
const STREAM_TYPES: &[&str] = &["Stream", "FileStream", "IFormFile"];

fn fail(check: u8, item: impl Into<String>, detail: impl Into<String>) -> Finding {
    Finding { check, severity: Severity::Fail, item: item.into(), detail: detail.into() }
}

/// Check 1: every controller documents `response_envelope` in its patterns.
#[must_use]
pub fn response_envelopes(graph: &MergedGraph) -> CheckOutcome {
    let findings = graph
        .controllers
        .iter()
        .filter(|(_, controller)| !controller.patterns.contains_key("response_envelope"))
        .map(|(name, _)| fail(1, name, "Missing response_envelope documentation in patterns"))
        .collect();
    CheckOutcome::new(1, "Response Envelope Documentation", "Response envelope documentation", findings)
}

/// Check 2: no DTO exposes an integer `Id`.
#[must_use]
pub fn integer_ids(graph: &MergedGraph) -> CheckOutcome {
    let findings = graph
        .dtos
        .iter()
        .filter_map(|(name, dto)| {
            let id_type = dto.properties.get("Id")?.as_str()?;
            id_type.to_lowercase().contains("int").then(|| {
                fail(2, name, format!("Exposes integer ID: Id: {id_type} (should use IdKey string)"))
            })
        })
        .collect();
    CheckOutcome::new(2, "No Integer IDs in DTOs", "Integer IDs in DTOs", findings)
}

/// Check 3: endpoint routes use `{idKey}`, never `{id}`.
#[must_use]
pub fn idkey_routes(graph: &MergedGraph) -> CheckOutcome {
    let mut findings = Vec::new();
    for (name, controller) in &graph.controllers {
        for endpoint in &controller.endpoints {
            if endpoint.route_fragment.contains("{id}") {
                findings.push(fail(
                    3,
                    format!("{name}.{}", endpoint.name),
                    format!("Route uses {{id}} instead of {{idKey}}: {}", endpoint.route_fragment),
                ));
            }
        }
    }
    CheckOutcome::new(3, "IdKey Routes", "IdKey route patterns", findings)
}

/// Check 4: components reach the API only through hooks.
#[must_use]
pub fn hook_wrapping(graph: &MergedGraph) -> CheckOutcome {
    let findings = graph
        .components
        .iter()
        .filter(|(_, component)| component.api_calls_directly)
        .map(|(name, _)| fail(4, name, "Component makes direct API calls instead of using hooks"))
        .collect();
    CheckOutcome::new(4, "Hook Wrapping", "Hook wrapping pattern", findings)
}

fn is_exempt_dto(name: &str) -> bool {
    FRONTEND_ALLOWLIST.contains(&name) || name.ends_with("RequestDto") || name.ends_with("ResponseDto")
}

/// DTO properties missing from the frontend type, compared case-insensitively
/// after lowering the first letter. Types that are not strings are shown as
/// raw JSON and never count as stream types.
fn missing_properties(dto_properties: &PropertyMap, type_properties: &PropertyMap) -> Vec<String> {
    dto_properties
        .iter()
        .filter(|(prop, ty)| {
            !IGNORED_PROPERTIES.contains(&prop.as_str())
                && !ty.as_str().is_some_and(|ty| STREAM_TYPES.contains(&ty))
        })
        .filter_map(|(prop, ty)| {
            let expected = lower_first(prop);
            let found = type_properties.keys().any(|ts| ts.eq_ignore_ascii_case(&expected));
            (!found).then(|| {
                let ty = ty.as_str().map_or_else(|| ty.to_string(), ToString::to_string);
                format!("Missing property: DTO has {prop} ({ty}) but frontend type lacks {expected}")
            })
        })
        .collect()
}

/// Check 5: DTOs and frontend types line up by name and properties.
#[must_use]
pub fn type_alignment(graph: &MergedGraph) -> CheckOutcome {
    const TITLE: &str = "Type Alignment (Frontend \u{2194} Backend)";
    const LABEL: &str = "Type alignment";

    if graph.types.is_empty() {
        let mut outcome = CheckOutcome::new(5, TITLE, LABEL, Vec::new());
        outcome.informational = true;
        outcome.notes = vec![
            "[INFO] Frontend types not yet generated in graph".to_string(),
            format!("       Backend has {} DTOs", graph.dtos.len()),
            "       Run 'npm run graph:frontend' to generate frontend type information.".to_string(),
        ];
        return outcome;
    }

    let mut findings = Vec::new();
    let mut without_types = 0usize;
    let mut with_mismatches = 0usize;

    for (dto_name, dto) in graph.dtos.iter().filter(|(name, _)| !is_exempt_dto(name)) {
        let Some(type_name) = type_for_dto(dto_name, &graph.types) else {
            findings.push(fail(5, dto_name, "No corresponding frontend type found"));
            without_types += 1;
            continue;
        };
        let mismatches = missing_properties(&dto.properties, &graph.types[type_name].properties);
        if !mismatches.is_empty() {
            with_mismatches += 1;
        }
        let item = format!("{dto_name} \u{2194} {type_name}");
        findings.extend(mismatches.into_iter().map(|detail| fail(5, item.clone(), detail)));
    }

    for type_name in graph.types.keys() {
        if type_name.starts_with('_') || type_name.contains("Enum") {
            continue;
        }
        if dto_for_type(type_name, &graph.dtos).is_none() {
            findings.push(Finding {
                check: 5,
                severity: Severity::Warn,
                item: type_name.clone(),
                detail: "Frontend type has no corresponding backend DTO (may be frontend-only)".to_string(),
            });
        }
    }

    let mut outcome = CheckOutcome::new(5, TITLE, LABEL, findings);
    if without_types > 0 || with_mismatches > 0 {
        let checked = graph.dtos.keys().filter(|name| !is_exempt_dto(name)).count();
        outcome.notes.push("[INFO] Type alignment analysis:".to_string());
        outcome.notes.push(format!("       DTOs checked: {checked}"));
        outcome.notes.push(format!("       Frontend types available: {}", graph.types.len()));
        if without_types > 0 {
            outcome.notes.push(format!("       DTOs without frontend types: {without_types}"));
        }
        if with_mismatches > 0 {
            outcome.notes.push(format!("       DTOs with property mismatches: {with_mismatches}"));
        }
    }
    outcome
}
