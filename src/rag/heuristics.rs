//! Text heuristics that confirm a similarity hit is a real violation.

/// Calculations, loops, branching or string manipulation.
#[must_use]
pub fn has_business_logic(code: &str) -> bool {
    let assignments = code.matches('=').count();
    if assignments > 5 && code.contains(['*', '/', '+']) {
        return true;
    }
    if code.contains("foreach") || code.contains("for (") {
        return true;
    }
    if code.matches("if").count() > 3 {
        return true;
    }
    [".Split(", ".Substring(", ".Replace("].iter().any(|call| code.contains(call))
}

/// A loop whose body awaits or queries before its first closing brace.
#[must_use]
pub fn is_n_plus_one_pattern(code: &str) -> bool {
    let mut in_loop = false;
    for line in code.split('\n') {
        if line.contains("foreach") || line.contains("for (") {
            in_loop = true;
        }
        if in_loop && (line.contains("await") || line.contains("FirstOrDefault") || line.contains("Where(")) {
            return true;
        }
        if in_loop && line.contains('}') {
            in_loop = false;
        }
    }
    false
}

/// First line calling `fetch(` or `axios.`, trimmed.
#[must_use]
pub fn extract_api_call(code: &str) -> Option<&str> {
    code.lines().find(|line| line.contains("fetch(") || line.contains("axios.")).map(str::trim)
}

/// Synchronous EF Core materialization without any `await` and not
/// marked `// SYNC OK`.
#[must_use]
pub fn has_sync_query(code: &str) -> bool {
    const SYNC_CALLS: &[&str] =
        &[".ToList()", ".FirstOrDefault()", ".First()", ".Single()", ".SingleOrDefault()"];
    SYNC_CALLS.iter().any(|call| code.contains(call))
        && !code.contains("await")
        && !code.contains("// SYNC OK")
}

/// A `private readonly` field of a repository type whose first mention is
/// not commented out.
#[must_use]
pub fn injects_repository(code: &str) -> bool {
    let Some(idx) = code.find("Repository") else {
        return false;
    };
    if !code.contains("private readonly") {
        return false;
    }
    let line_start = code[..idx].rfind('\n').map_or(0, |pos| pos + 1);
    !code[line_start..idx].contains("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_logic_signals() {
        assert!(has_business_logic("foreach (var p in people) { }"));
        assert!(has_business_logic("var parts = name.Split(',');"));
        assert!(has_business_logic("a = 1; b = 2; c = 3; d = 4; e = 5; f = a * b;"));
        assert!(!has_business_logic("return Ok(await _service.GetAsync(idKey));"));
    }

    #[test]
    fn n_plus_one_needs_query_inside_loop() {
        let inside = "foreach (var person in people)\n{\n    var family = await _db.Families.FirstOrDefaultAsync();\n}";
        assert!(is_n_plus_one_pattern(inside));
        let after = "foreach (var person in people) { total++; }\nvar x = await _db.SaveChangesAsync();";
        assert!(!is_n_plus_one_pattern(after));
    }

    #[test]
    fn api_call_absent_is_none() {
        assert_eq!(extract_api_call("  const r = await fetch('/api/v1/people');\n"), Some("const r = await fetch('/api/v1/people');"));
        assert_eq!(extract_api_call("const { data } = usePeople();"), None);
    }

    #[test]
    fn sync_query_respects_await_and_marker() {
        assert!(has_sync_query("var people = _db.People.ToList();"));
        assert!(!has_sync_query("var people = await _db.People.ToListAsync();\nvar first = list.First();"));
        assert!(!has_sync_query("var people = _db.People.ToList(); // SYNC OK"));
    }

    #[test]
    fn repository_injection_ignores_comments() {
        assert!(injects_repository("private readonly IPersonRepository _repo;"));
        assert!(!injects_repository("// private readonly IPersonRepository _repo;\nprivate readonly IPersonService _svc;"));
        assert!(!injects_repository("public PeopleController(IPersonRepository repo)"));
    }
}
