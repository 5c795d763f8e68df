//! Integration tests for top-level CLI behavior.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn run_graph(args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_koinon-graph");
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run koinon-graph binary")
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "src/Koinon.Domain/Entities/Person.cs",
        "namespace Koinon.Domain.Entities;\n\npublic class Person : Entity\n{\n    public required string FirstName { get; set; }\n    public Family? Family { get; set; }\n}\n",
    );
    write(
        root,
        "src/Koinon.Domain/Entities/Family.cs",
        "namespace Koinon.Domain.Entities;\n\npublic class Family : Entity\n{\n    public required string Name { get; set; }\n    public ICollection<Person> Members { get; set; } = new List<Person>();\n}\n",
    );
    write(
        root,
        "src/Koinon.Application/DTOs/PersonDtos.cs",
        "namespace Koinon.Application.DTOs;\n\npublic record PersonDto\n{\n    public required string IdKey { get; init; }\n    public required string FirstName { get; init; }\n}\n\npublic record PersonSummaryDto(string IdKey, string FullName);\n",
    );
    write(
        root,
        "src/Koinon.Application/Services/PersonService.cs",
        "namespace Koinon.Application.Services;\n\npublic class PersonService(IApplicationDbContext context) : IPersonService\n{\n    public async Task<PersonDto?> GetByIdKeyAsync(string idKey) { return null; }\n}\n",
    );
    write(
        root,
        "src/Koinon.Api/Controllers/PeopleController.cs",
        "namespace Koinon.Api.Controllers;\n\n[Route(\"api/v1/people\")]\npublic class PeopleController(IPersonService personService) : ControllerBase\n{\n    [HttpGet(\"{idKey}\")]\n    public async Task<IActionResult> GetByIdKey(string idKey) { return Ok(new { data = 1 }); }\n}\n",
    );
    dir
}

fn backend(root: &Path) -> Output {
    run_graph(&["backend", "--project-root", root.to_str().unwrap()])
}

fn edges_of(graph: &Value) -> Vec<(String, String, String)> {
    graph["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["source"].as_str().unwrap().to_string(),
                e["target"].as_str().unwrap().to_string(),
                e["relationship"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn backend_extracts_entities_and_links_dtos() {
    let dir = project();
    let output = backend(dir.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let graph = read_json(&dir.path().join("tools/graph/backend-graph.json"));
    assert_eq!(graph["entities"]["Person"]["table"], "person");
    assert_eq!(graph["summary"]["total_entities"], 2);
    assert_eq!(graph["dtos"]["PersonSummaryDto"]["linked_entity"], "Person");

    let edges = edges_of(&graph);
    let edge = |s: &str, t: &str, r: &str| (s.to_string(), t.to_string(), r.to_string());
    assert!(edges.contains(&edge("PersonSummaryDto", "Person", "maps_to")));
    assert!(edges.contains(&edge("PeopleController", "PersonService", "depends_on")));
    assert!(edges.contains(&edge("PersonService", "PersonDto", "returns")));
}

#[test]
fn backend_is_idempotent_apart_from_timestamp() {
    let dir = project();
    let path = dir.path().join("tools/graph/backend-graph.json");
    assert!(backend(dir.path()).status.success());
    let mut first = read_json(&path);
    assert!(backend(dir.path()).status.success());
    let mut second = read_json(&path);

    first["generated_at"] = Value::Null;
    second["generated_at"] = Value::Null;
    assert_eq!(first, second);
}

#[test]
fn backend_without_src_fails() {
    let dir = TempDir::new().unwrap();
    let output = backend(dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("src"));
}

#[test]
fn merge_concatenates_edges_and_reports_drift() {
    let dir = project();
    assert!(backend(dir.path()).status.success());
    write(
        dir.path(),
        "tools/graph/frontend-graph.json",
        r#"{
            "types": {"PersonDto": {"name": "PersonDto", "kind": "interface", "properties": {"idKey": "string"}}},
            "api_functions": {}, "hooks": {}, "components": {},
            "edges": [{"from": "usePerson", "to": "getPerson", "type": "calls"}]
        }"#,
    );

    let output = run_graph(&["merge", "--project-root", dir.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PersonDto.FirstName missing in PersonDto"));
    assert!(stdout.contains("GET api/v1/people/{idKey}"));

    let backend = read_json(&dir.path().join("tools/graph/backend-graph.json"));
    let merged = read_json(&dir.path().join("tools/graph/graph-baseline.json"));
    assert_eq!(
        merged["edges"].as_array().unwrap().len(),
        backend["edges"].as_array().unwrap().len() + 1
    );
}

#[test]
fn merge_without_frontend_graph_fails() {
    let dir = project();
    assert!(backend(dir.path()).status.success());
    let output = run_graph(&["merge", "--project-root", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn verify_exit_codes() {
    let dir = TempDir::new().unwrap();
    let clean = r#"{
        "controllers": {"PeopleController": {"name": "PeopleController", "namespace": "N",
            "route": "api/v1/people", "patterns": {"response_envelope": true},
            "endpoints": [{"name": "Get", "method": "GET", "route": "{idKey}"}]}},
        "dtos": {}, "components": {}, "hooks": {}
    }"#;
    write(dir.path(), "clean.json", clean);
    write(dir.path(), "bad.json", &clean.replace("{idKey}", "{id}"));
    write(dir.path(), "partial.json", r#"{"controllers": {}}"#);

    let verify = |name: &str| {
        run_graph(&["verify", dir.path().join(name).to_str().unwrap()]).status.code()
    };
    assert_eq!(verify("clean.json"), Some(0));
    assert_eq!(verify("bad.json"), Some(1));
    assert_eq!(verify("partial.json"), Some(2));
    assert_eq!(verify("missing.json"), Some(2));
}

#[test]
fn verify_prints_summary() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "g.json", r#"{"controllers": {}, "dtos": {}, "components": {}, "hooks": {}}"#);
    let output = run_graph(&["verify", dir.path().join("g.json").to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("VERIFICATION PASSED"));
}

#[test]
fn help_goes_to_stdout() {
    let output = run_graph(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("backend"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let output = run_graph(&["nonsense"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}
