//! DTO-to-entity linking by naming convention and a curated override table.

use super::{EntityRecord, Registry};

/// Marker target for cross-cutting DTOs that belong to no single entity.
pub const SYSTEM_ENTITY: &str = "System";

/// Verb prefixes stripped from `...Request` names.
const REQUEST_VERBS: &[&str] =
    &["Create", "Update", "Add", "Remove", "Delete", "Upload", "Import", "Export", "Validate"];

/// DTOs whose names do not follow the convention.
const MANUAL_LINKS: &[(&str, &str)] = &[
    ("MyProfileDto", "Person"),
    ("UpdateMyProfileRequest", "Person"),
    ("DuplicateMatchDto", "Person"),
    ("FirstTimeVisitorDto", "Person"),
    ("UpdateFollowUpStatusRequest", "Person"),
    ("AssignFollowUpRequest", "Person"),
    ("CreatePhoneNumberRequest", "Person"),
    ("UpdatePhoneNumberRequest", "Person"),
    ("ChangePasswordRequest", "Person"),
    ("LoginRequest", "UserSession"),
    ("TokenResponse", "UserSession"),
    ("TwoFactorVerifyRequest", "TwoFactorConfig"),
    ("TwoFactorSetupDto", "TwoFactorConfig"),
    ("TwoFactorStatusDto", "TwoFactorConfig"),
    ("GlobalSearchResultDto", SYSTEM_ENTITY),
    ("GlobalSearchResponse", SYSTEM_ENTITY),
    ("DashboardStatsDto", SYSTEM_ENTITY),
    ("CsvPreviewDto", "ImportJob"),
    ("ImportJobDto", "ImportJob"),
    ("StartImportRequest", "ImportJob"),
    ("ValidateImportRequest", "ImportJob"),
    ("ImportTemplateDto", "ImportTemplate"),
    ("CreateImportTemplateRequest", "ImportTemplate"),
    ("ExportFieldDto", "ExportJob"),
    ("StartExportRequest", "ExportJob"),
    ("AuditLogExportRequest", "AuditLog"),
    ("LabelSetDto", "LabelTemplate"),
    ("LabelDto", "LabelTemplate"),
    ("LabelRequestDto", "LabelTemplate"),
    ("BatchLabelRequestDto", "LabelTemplate"),
    ("LabelPreviewRequestDto", "LabelTemplate"),
    ("LabelPreviewDto", "LabelTemplate"),
    ("MergeFieldDto", "LabelTemplate"),
    ("DashboardBatchDto", "ContributionBatch"),
    ("UpcomingScheduleDto", "Schedule"),
    ("FileMetadataDto", "BinaryFile"),
    ("UploadFileRequest", "BinaryFile"),
    ("PickupVerificationResultDto", "PickupLog"),
    ("VerifyPickupRequest", "PickupLog"),
    ("RecordPickupRequest", "PickupLog"),
];

/// Returns the manual link for `dto_name`, if one is listed.
#[must_use]
pub fn manual_link(dto_name: &str) -> Option<&'static str> {
    MANUAL_LINKS.iter().find(|(dto, _)| *dto == dto_name).map(|(_, entity)| *entity)
}

/// Links a DTO name to an entity.
///
/// Tried in order: the manual table (only when its target is a known entity
/// or [`SYSTEM_ENTITY`]), `<Verb><Entity>Request`, then `<Entity>Dto` and
/// `<Entity><Suffix>Dto`. Prefix fallbacks take the first entity in
/// registry order.
#[must_use]
pub fn infer_linked_entity(dto_name: &str, entities: &Registry<EntityRecord>) -> Option<String> {
    if let Some(target) = manual_link(dto_name) {
        if target == SYSTEM_ENTITY || entities.contains_key(target) {
            return Some(target.to_string());
        }
    }

    if let Some(base) = dto_name.strip_suffix("Request") {
        for verb in REQUEST_VERBS {
            let Some(candidate) = base.strip_prefix(verb) else {
                continue;
            };
            if entities.contains_key(candidate) {
                return Some(candidate.to_string());
            }
            if let Some(entity) = entities.keys().find(|entity| candidate.starts_with(entity.as_str())) {
                return Some(entity.clone());
            }
        }
    }

    if let Some(base) = dto_name.strip_suffix("Dto") {
        if entities.contains_key(base) {
            return Some(base.to_string());
        }
        return entities
            .keys()
            .find(|entity| entity.as_str() != base && base.starts_with(entity.as_str()))
            .cloned();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entities(names: &[&str]) -> Registry<EntityRecord> {
        names
            .iter()
            .map(|name| {
                let record = EntityRecord {
                    name: (*name).to_string(),
                    namespace: "Koinon.Domain.Entities".to_string(),
                    table: String::new(),
                    properties: BTreeMap::new(),
                    navigations: Vec::new(),
                    extra: BTreeMap::new(),
                };
                ((*name).to_string(), record)
            })
            .collect()
    }

    #[test]
    fn dto_suffix_links_exact_and_prefixed_names() {
        let known = entities(&["Group", "Person"]);
        assert_eq!(infer_linked_entity("PersonDto", &known).as_deref(), Some("Person"));
        assert_eq!(infer_linked_entity("PersonSummaryDto", &known).as_deref(), Some("Person"));
        assert_eq!(infer_linked_entity("CampusDto", &known), None);
    }

    #[test]
    fn request_verbs_are_stripped() {
        let known = entities(&["Group", "Person"]);
        assert_eq!(infer_linked_entity("CreateGroupRequest", &known).as_deref(), Some("Group"));
        assert_eq!(infer_linked_entity("UpdatePersonPhotoRequest", &known).as_deref(), Some("Person"));
        assert_eq!(infer_linked_entity("SearchPeopleRequest", &known), None);
    }

    #[test]
    fn manual_table_requires_known_target() {
        let known = entities(&["Person"]);
        assert_eq!(infer_linked_entity("MyProfileDto", &known).as_deref(), Some("Person"));
        assert_eq!(infer_linked_entity("LoginRequest", &known), None);
        assert_eq!(infer_linked_entity("DashboardStatsDto", &known).as_deref(), Some(SYSTEM_ENTITY));
    }

    #[test]
    fn manual_table_wins_over_convention() {
        let known = entities(&["Person", "PhoneNumber"]);
        assert_eq!(infer_linked_entity("CreatePhoneNumberRequest", &known).as_deref(), Some("Person"));
    }

    #[test]
    fn response_names_only_link_through_the_table() {
        let known = entities(&["Person"]);
        assert_eq!(infer_linked_entity("PersonResponse", &known), None);
    }
}
