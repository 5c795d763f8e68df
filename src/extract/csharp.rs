//! Regex extraction rules for C# declarations.
//!
//! The rules are heuristics over raw text, not a parser. Known gaps:
//! - only primary-constructor dependencies are seen;
//! - `virtual` and `override` stay in property types and block navigation
//!   inference for those properties;
//! - endpoints need an explicit route argument (`[HttpGet("")]`), a bare
//!   `[HttpGet]` is ignored.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::text::{
    camel_to_snake, extract_balanced, is_primitive, split_parameters, strip_line_comments, window,
};
use super::{Cardinality, Endpoint, MethodSignature, Navigation};

/// How far past an `[HttpXxx("...")]` attribute to look for the action signature.
const ENDPOINT_SEARCH_WINDOW: usize = 1000;

/// Words that make a "property" match a type declaration instead.
const DECLARATION_KEYWORDS: &[&str] = &["class", "record", "enum", "struct", "interface"];

/// Names a property regex can pick up from accessor blocks.
const ACCESSOR_NAMES: &[&str] = &["get", "set"];

/// HTTP verb attributes in the order endpoints are reported.
const HTTP_VERBS: &[&str] = &["Get", "Post", "Put", "Patch", "Delete", "Head", "Options"];

mod patterns {
    use super::{Lazy, Regex};

    pub static NAMESPACE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"namespace\s+([A-Za-z0-9._]+)\s*[;{]").expect("invalid namespace regex")
    });

    pub static PROPERTY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"public\s+(?:required\s+)?(.+?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*[{;]")
            .expect("invalid property regex")
    });

    pub static NAVIGATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"public\s+(?:ICollection<([A-Za-z0-9_]+)>|([A-Za-z0-9_]+))\s+([A-Za-z_][A-Za-z0-9_]*)\s*[{;]",
        )
        .expect("invalid navigation regex")
    });

    pub static TABLE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"Table\s*\(\s*["']([^"']+)["']"#).expect("invalid table regex")
    });

    pub static METHOD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"public\s+(async\s+)?(?:override\s+)?(?:virtual\s+)?([^\s(]+(?:<[^>]+(?:<[^>]+>)?[^>]*>)?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(",
        )
        .expect("invalid method regex")
    });

    pub static PRIMARY_CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:class|record|struct)\s+\w+\s*\(").expect("invalid constructor regex")
    });

    pub static PARAMETER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?s)^(?:required\s+)?([A-Za-z0-9_.?<>,\[\]\s]+?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:=.*)?$",
        )
        .expect("invalid parameter regex")
    });

    pub static ROUTE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"\[Route\s*\(\s*["']([^"']+)["']"#).expect("invalid route regex")
    });

    pub static HTTP_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r#"\[Http(Get|Post|Put|Patch|Delete|Head|Options)\s*\(\s*["']?([^"'\]]*)["']?\s*\)\]"#,
        )
        .expect("invalid http attribute regex")
    });

    pub static ACTION_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"public\s+(?:async\s+)?(?:IActionResult|ActionResult|Task|Result)[^(]*?([A-Za-z_][A-Za-z0-9_]*)\s*\(",
        )
        .expect("invalid action signature regex")
    });

    pub static DTO_DECLARATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?:public\s+)?(?:sealed\s+)?(?:record|class|struct)\s+([A-Za-z0-9]+(?:Dto|Request|Response))\b",
        )
        .expect("invalid dto declaration regex")
    });

    pub static RESPONSE_ENVELOPE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"new\s*\{\s*(?:data|Data)\s*=").expect("invalid envelope regex")
    });
}

/// Returns the dotted namespace of a file-scoped or block-scoped declaration.
#[must_use]
pub fn extract_namespace(content: &str) -> Option<String> {
    patterns::NAMESPACE.captures(content).map(|caps| caps[1].to_string())
}

/// Extracts `public <type> <Name> {` / `;` declarations as name -> raw type.
#[must_use]
pub fn extract_properties(content: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for caps in patterns::PROPERTY.captures_iter(content) {
        let prop_type = caps[1].trim();
        if prop_type.split_whitespace().any(|word| DECLARATION_KEYWORDS.contains(&word)) {
            continue;
        }
        properties.insert(caps[2].to_string(), prop_type.to_string());
    }
    properties
}

/// Returns the body of the `class`, `record` or `struct` named `type_name`.
///
/// A primary-constructor parameter list and a base list may sit between the
/// name and the body. Positional records that end in `;` have no body.
#[must_use]
pub fn extract_class_body<'a>(content: &'a str, type_name: &str) -> Option<&'a str> {
    let declaration =
        Regex::new(&format!(r"(?:record|class|struct)\s+{}\b", regex::escape(type_name))).ok()?;
    let found = declaration.find(content)?;

    let mut pos = found.end();
    let rest = &content[pos..];
    let skipped = rest.len() - rest.trim_start().len();
    pos += skipped;
    if content[pos..].starts_with('(') {
        let params = extract_balanced(content, pos)?;
        pos += params.len() + 2;
    }

    let open = pos + content[pos..].find(['{', ';'])?;
    if content.as_bytes()[open] == b';' {
        return None;
    }
    extract_balanced(content, open)
}

/// Extracts the properties of one record or class: primary-constructor
/// parameters first, then body properties (which win on name clashes).
#[must_use]
pub fn extract_record_properties(content: &str, type_name: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();

    let record_start =
        Regex::new(&format!(r"(?:public\s+)?(?:sealed\s+)?record\s+{}\s*\(", regex::escape(type_name)));
    if let Ok(record_start) = record_start {
        if let Some(found) = record_start.find(content) {
            if let Some(params) = extract_balanced(content, found.end() - 1) {
                for (prop_type, prop_name) in parse_parameters(params) {
                    properties.insert(prop_name, prop_type);
                }
            }
        }
    }

    if let Some(body) = extract_class_body(content, type_name) {
        properties.extend(extract_properties(body));
    }
    properties
}

/// Extracts entity navigations: `ICollection<X>` (many) and single
/// capitalized non-primitive types (one).
#[must_use]
pub fn extract_navigations(content: &str) -> Vec<Navigation> {
    let mut navigations = Vec::new();
    for caps in patterns::NAVIGATION.captures_iter(content) {
        let name = caps[3].to_string();
        if let Some(target) = caps.get(1) {
            navigations.push(Navigation {
                name,
                target_entity: target.as_str().to_string(),
                cardinality: Cardinality::Many,
            });
        } else if let Some(target) = caps.get(2) {
            let target = target.as_str();
            if target.starts_with(|c: char| c.is_ascii_uppercase()) && !is_primitive(target) {
                navigations.push(Navigation {
                    name,
                    target_entity: target.to_string(),
                    cardinality: Cardinality::One,
                });
            }
        }
    }
    navigations
}

/// Returns the `[Table("...")]` value, or the snake-cased class name.
#[must_use]
pub fn extract_table_name(class_name: &str, content: &str) -> String {
    patterns::TABLE
        .captures(content)
        .map_or_else(|| camel_to_snake(class_name), |caps| caps[1].to_string())
}

/// Extracts public method signatures, skipping `get`/`set` accessors and
/// primary-constructor declarations (`public class Name(`).
#[must_use]
pub fn extract_methods(content: &str) -> Vec<MethodSignature> {
    patterns::METHOD
        .captures_iter(content)
        .filter(|caps| !ACCESSOR_NAMES.contains(&&caps[3]))
        .filter(|caps| !DECLARATION_KEYWORDS.contains(&&caps[2]))
        .map(|caps| MethodSignature {
            name: caps[3].to_string(),
            return_type: caps[2].trim().to_string(),
            is_async: caps.get(1).is_some(),
        })
        .collect()
}

/// Extracts the non-primitive parameter types of the first primary
/// constructor (`class Name(IFoo foo, ...)`).
#[must_use]
pub fn extract_constructor_dependencies(content: &str) -> Vec<String> {
    let Some(found) = patterns::PRIMARY_CONSTRUCTOR.find(content) else {
        return Vec::new();
    };
    let Some(params) = extract_balanced(content, found.end() - 1) else {
        return Vec::new();
    };
    parse_parameters(params)
        .into_iter()
        .map(|(param_type, _)| param_type)
        .filter(|param_type| !is_primitive(param_type))
        .collect()
}

/// Returns the controller-level `[Route("...")]` value.
#[must_use]
pub fn extract_route_attribute(content: &str) -> Option<String> {
    patterns::ROUTE.captures(content).map(|caps| caps[1].to_string())
}

/// Extracts endpoints from `[HttpXxx("route")]` attributes and the action
/// signature that follows each one.
#[must_use]
pub fn extract_endpoints(content: &str) -> Vec<Endpoint> {
    let mut found: Vec<(usize, Endpoint)> = Vec::new();
    for caps in patterns::HTTP_ATTRIBUTE.captures_iter(content) {
        let verb = &caps[1];
        let Some(attribute) = caps.get(0) else {
            continue;
        };
        let following = window(content, attribute.end(), ENDPOINT_SEARCH_WINDOW);
        let Some(action) = patterns::ACTION_SIGNATURE.captures(following) else {
            continue;
        };
        let order = HTTP_VERBS.iter().position(|v| *v == verb).unwrap_or(HTTP_VERBS.len());
        found.push((
            order,
            Endpoint {
                name: action[1].to_string(),
                http_method: verb.to_uppercase(),
                route_fragment: caps[2].trim().to_string(),
                request_type: None,
                response_type: None,
                requires_auth: true,
                required_roles: Vec::new(),
            },
        ));
    }
    found.sort_by_key(|(order, _)| *order);
    found.into_iter().map(|(_, endpoint)| endpoint).collect()
}

/// Detects controller conventions as named boolean flags.
#[must_use]
pub fn extract_patterns(content: &str) -> BTreeMap<String, bool> {
    BTreeMap::from([
        ("response_envelope".to_string(), patterns::RESPONSE_ENVELOPE.is_match(content)),
        ("idkey_routes".to_string(), content.contains("{idKey}")),
        (
            "problem_details".to_string(),
            content.contains("Problem(") || content.contains("ProblemDetails"),
        ),
        ("result_pattern".to_string(), content.contains("Result<")),
    ])
}

/// Names of every `record`/`class`/`struct` ending in `Dto`, `Request` or
/// `Response`, in declaration order.
#[must_use]
pub fn dto_declarations(content: &str) -> Vec<String> {
    patterns::DTO_DECLARATION.captures_iter(content).map(|caps| caps[1].to_string()).collect()
}

/// Parses a parameter list into `(type, name)` pairs.
///
/// Comments are stripped first so commented-out commas do not split, and
/// default values are dropped.
fn parse_parameters(params: &str) -> Vec<(String, String)> {
    let cleaned = strip_line_comments(params);
    split_parameters(&cleaned)
        .into_iter()
        .filter_map(|param| {
            let param = param.trim();
            let caps = patterns::PARAMETER.captures(param)?;
            let param_type = caps[1].trim();
            if param_type.is_empty() {
                return None;
            }
            Some((param_type.to_string(), caps[2].to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEOPLE_CONTROLLER: &str = r#"
using Microsoft.AspNetCore.Mvc;

namespace Koinon.Api.Controllers;

[ApiController]
[Route("api/v1/people")]
public class PeopleController(IPersonService personService, ILogger<PeopleController> logger) : ControllerBase
{
    [HttpGet("{idKey}")]
    public async Task<IActionResult> GetByIdKey(string idKey)
    {
        var person = await personService.GetByIdKeyAsync(idKey);
        return Ok(new { data = person });
    }

    [HttpPost("")]
    public async Task<IActionResult> Create([FromBody] CreatePersonRequest request)
    {
        var result = await personService.CreateAsync(request);
        if (!result.IsSuccess) return Problem(result.Error);
        return Ok(new { data = result.Value });
    }

    [HttpGet]
    public IActionResult Untracked() => Ok();
}
"#;

    #[test]
    fn namespace_file_scoped_and_block_forms() {
        assert_eq!(extract_namespace("namespace Koinon.Domain.Entities;").as_deref(), Some("Koinon.Domain.Entities"));
        assert_eq!(extract_namespace("namespace   Koinon.Api\n{\n}").as_deref(), Some("Koinon.Api"));
        assert_eq!(extract_namespace("\n\t namespace\tA.B_C.D1 {").as_deref(), Some("A.B_C.D1"));
        assert_eq!(extract_namespace("public class NoNamespace {}"), None);
    }

    #[test]
    fn properties_simple_nullable_and_generic() {
        let content = r"
public class Test
{
    public string FirstName { get; set; }
    public string? NickName { get; set; }
    public ICollection<PhoneNumber> PhoneNumbers { get; set; }
    public IDictionary<string, string> Settings { get; set; }
    public required int Age { get; init; }
}
";
        let props = extract_properties(content);
        assert_eq!(props["FirstName"], "string");
        assert_eq!(props["NickName"], "string?");
        assert_eq!(props["PhoneNumbers"], "ICollection<PhoneNumber>");
        assert_eq!(props["Settings"], "IDictionary<string, string>");
        assert_eq!(props["Age"], "int");
        assert!(!props.contains_key("Test"));
    }

    #[test]
    fn properties_skip_type_declarations() {
        let content = "public class Person : Entity\n{\n    public string Name { get; set; }\n}";
        let props = extract_properties(content);
        assert_eq!(props.len(), 1);
        assert_eq!(props["Name"], "string");
    }

    #[test]
    fn properties_keep_virtual_in_type() {
        let props = extract_properties("public virtual Family Family { get; set; }");
        assert_eq!(props["Family"], "virtual Family");
    }

    #[test]
    fn class_body_skips_primary_constructor_and_bases() {
        let content = "public record PersonDto(string Name) : BaseDto(Name)\n{\n    public int Age { get; init; }\n}";
        let body = extract_class_body(content, "PersonDto").unwrap();
        assert!(body.contains("public int Age"));
    }

    #[test]
    fn class_body_absent_for_positional_record() {
        assert_eq!(extract_class_body("public record PersonDto(string Name);", "PersonDto"), None);
        assert_eq!(extract_class_body("public class Other { }", "PersonDto"), None);
    }

    #[test]
    fn record_properties_from_primary_constructor() {
        let content = r"
public record PersonDto(
    string IdKey,
    required string FirstName, // given name, not legal name
    string? Email,
    IDictionary<string, int> Counts,
    int Age = 0
);
";
        let props = extract_record_properties(content, "PersonDto");
        assert_eq!(props["IdKey"], "string");
        assert_eq!(props["FirstName"], "string");
        assert_eq!(props["Email"], "string?");
        assert_eq!(props["Counts"], "IDictionary<string, int>");
        assert_eq!(props["Age"], "int");
        assert_eq!(props.len(), 5);
    }

    #[test]
    fn record_properties_only_for_named_type() {
        let content = r"
public record PersonDto(string Name);
public record PersonSummaryDto(string FullName)
{
    public string? PhotoUrl { get; init; }
}
";
        let summary = extract_record_properties(content, "PersonSummaryDto");
        assert_eq!(summary.len(), 2);
        assert!(summary.contains_key("FullName"));
        assert!(summary.contains_key("PhotoUrl"));
        let person = extract_record_properties(content, "PersonDto");
        assert_eq!(person.keys().collect::<Vec<_>>(), vec!["Name"]);
    }

    #[test]
    fn navigations_collection_and_single() {
        let content = r"
public class PhoneNumber : Entity
{
    public Person Person { get; set; }
    public ICollection<Call> Calls { get; set; }
    public string Number { get; set; }
    public DateTime CreatedDateTime { get; set; }
    public virtual Family Family { get; set; }
}
";
        let navs = extract_navigations(content);
        assert_eq!(navs.len(), 2);
        assert_eq!(navs[0].target_entity, "Person");
        assert_eq!(navs[0].cardinality, Cardinality::One);
        assert_eq!(navs[1].name, "Calls");
        assert_eq!(navs[1].cardinality, Cardinality::Many);
    }

    #[test]
    fn table_name_attribute_or_snake_case() {
        assert_eq!(extract_table_name("GroupMember", "[Table(\"group_members\")]\npublic class GroupMember"), "group_members");
        assert_eq!(extract_table_name("GroupMember", "public class GroupMember"), "group_member");
    }

    #[test]
    fn methods_with_async_and_generic_returns() {
        let content = r"
public class PersonService
{
    public async Task<PersonDto?> GetByIdKeyAsync(string idKey) { }
    public async Task<Result<PersonDto>> CreateAsync(CreatePersonRequest request) { }
    public IDictionary<string, int> Counts() { }
    public string Name { get; set; }
}
";
        let methods = extract_methods(content);
        let get = methods.iter().find(|m| m.name == "GetByIdKeyAsync").unwrap();
        assert!(get.is_async);
        assert_eq!(get.return_type, "Task<PersonDto?>");
        let create = methods.iter().find(|m| m.name == "CreateAsync").unwrap();
        assert!(create.return_type.contains("Result"));
        let counts = methods.iter().find(|m| m.name == "Counts").unwrap();
        assert!(!counts.is_async);
        assert_eq!(counts.return_type, "IDictionary<string, int>");
        assert!(!methods.iter().any(|m| m.name == "get" || m.name == "set" || m.name == "Name"));
    }

    #[test]
    fn methods_skip_primary_constructor_declaration() {
        let content = "public class PersonService(IRepository repo)\n{\n    public int Count() { }\n}";
        let names: Vec<_> = extract_methods(content).into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Count"]);
    }

    #[test]
    fn methods_override_and_virtual() {
        let content = "public virtual string GetName() { }\npublic override string GetLabel() { }";
        let names: Vec<_> = extract_methods(content).into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["GetName", "GetLabel"]);
    }

    #[test]
    fn dependencies_from_primary_constructor() {
        let deps = extract_constructor_dependencies(PEOPLE_CONTROLLER);
        assert_eq!(deps, vec!["IPersonService", "ILogger<PeopleController>"]);
    }

    #[test]
    fn dependencies_skip_primitive_record_members() {
        let deps = extract_constructor_dependencies(
            "public record PersonDto(required string Name, required IService Svc);",
        );
        assert_eq!(deps, vec!["IService"]);
    }

    #[test]
    fn dependencies_ignore_traditional_constructor() {
        let content = r"
public class PersonService : IPersonService
{
    private readonly IRepository _repo;
    public PersonService(IRepository repo) { _repo = repo; }
}
";
        assert!(extract_constructor_dependencies(content).is_empty());
    }

    #[test]
    fn route_and_endpoints() {
        assert_eq!(extract_route_attribute(PEOPLE_CONTROLLER).as_deref(), Some("api/v1/people"));
        let endpoints = extract_endpoints(PEOPLE_CONTROLLER);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].name, "GetByIdKey");
        assert_eq!(endpoints[0].http_method, "GET");
        assert_eq!(endpoints[0].route_fragment, "{idKey}");
        assert!(endpoints[0].requires_auth);
        assert!(endpoints[0].required_roles.is_empty());
        assert_eq!(endpoints[1].name, "Create");
        assert_eq!(endpoints[1].http_method, "POST");
        assert_eq!(endpoints[1].route_fragment, "");
    }

    #[test]
    fn patterns_flags() {
        let flags = extract_patterns(PEOPLE_CONTROLLER);
        assert!(flags["response_envelope"]);
        assert!(flags["idkey_routes"]);
        assert!(flags["problem_details"]);
        assert!(!flags["result_pattern"]);
    }

    #[test]
    fn dto_declarations_in_file_order() {
        let content = r"
public record PersonDto(string Name);
public record PersonSummaryDto(string Name);
public record CreatePersonRequest(string Name);
public class PersonHelper { }
";
        assert_eq!(dto_declarations(content), vec!["PersonDto", "PersonSummaryDto", "CreatePersonRequest"]);
    }

    #[test]
    fn malformed_input_yields_absence() {
        let content = "public class Broken {{{ public string";
        assert_eq!(extract_namespace(content), None);
        assert!(extract_properties(content).is_empty());
        assert_eq!(extract_class_body(content, "Broken"), None);
        assert!(extract_endpoints(content).is_empty());
    }
}
