//! Name matching between backend DTOs and frontend types.
//!
//! Shared by the merger and the contract verifier so both agree on which
//! pairs correspond.

use super::Registry;

/// `PersonDto` -> `Person`; other names unchanged.
#[must_use]
pub fn strip_dto_suffix(name: &str) -> &str {
    name.strip_suffix("Dto").unwrap_or(name)
}

/// Finds the frontend type for a DTO: exact name, then the name without
/// `Dto`, then a case-insensitive match on the name without `Dto`.
#[must_use]
pub fn type_for_dto<'a, T>(dto_name: &str, types: &'a Registry<T>) -> Option<&'a str> {
    if let Some((name, _)) = types.get_key_value(dto_name) {
        return Some(name);
    }
    let base = strip_dto_suffix(dto_name);
    if let Some((name, _)) = types.get_key_value(base) {
        return Some(name);
    }
    types.keys().find(|name| name.eq_ignore_ascii_case(base)).map(String::as_str)
}

/// Finds the DTO for a frontend type: exact name, then `<Type>Dto`, then a
/// DTO whose name without `Dto` matches case-insensitively.
#[must_use]
pub fn dto_for_type<'a, T>(type_name: &str, dtos: &'a Registry<T>) -> Option<&'a str> {
    if let Some((name, _)) = dtos.get_key_value(type_name) {
        return Some(name);
    }
    if let Some((name, _)) = dtos.get_key_value(&format!("{type_name}Dto")) {
        return Some(name);
    }
    dtos.keys().find(|name| strip_dto_suffix(name).eq_ignore_ascii_case(type_name)).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> Registry<()> {
        names.iter().map(|name| ((*name).to_string(), ())).collect()
    }

    #[test]
    fn dto_matches_exact_then_stripped_then_case_insensitive() {
        let types = registry(&["GroupDto", "Person", "familyMember"]);
        assert_eq!(type_for_dto("GroupDto", &types), Some("GroupDto"));
        assert_eq!(type_for_dto("PersonDto", &types), Some("Person"));
        assert_eq!(type_for_dto("FamilyMemberDto", &types), Some("familyMember"));
        assert_eq!(type_for_dto("CampusDto", &types), None);
    }

    #[test]
    fn type_matches_dto_with_suffix() {
        let dtos = registry(&["PersonDto", "GROUPDto", "LoginRequest"]);
        assert_eq!(dto_for_type("Person", &dtos), Some("PersonDto"));
        assert_eq!(dto_for_type("Group", &dtos), Some("GROUPDto"));
        assert_eq!(dto_for_type("LoginRequest", &dtos), Some("LoginRequest"));
        assert_eq!(dto_for_type("ButtonProps", &dtos), None);
    }
}
