use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const STORE_GO: &str = r#"package store

// Store keeps todos.
type Store struct{}

// NewStore opens the store.
func NewStore() *Store {
	return &Store{}
}
"#;

const SERVICE_GO: &str = r#"package todos

import (
	"context"

	"example.com/todo/store"
)

// TodoService handles todos.
type TodoService struct {
	store *store.Store
}

func NewTodoService(s *store.Store) *TodoService {
	return &TodoService{store: s}
}

// Create adds a todo.
//
//ease:api method=POST path=/api/todos
func (s *TodoService) Create(ctx context.Context, text string) (string, error) {
	return text, nil
}

//ease:api path=/api/todos/:id
func (s *TodoService) Get(ctx context.Context, id string) (string, error) {
	return id, nil
}
"#;

fn setup_module() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("go.mod"), "module example.com/todo\n\ngo 1.21\n").unwrap();
    fs::create_dir_all(root.join("store")).unwrap();
    fs::create_dir_all(root.join("todos")).unwrap();
    fs::write(root.join("store/store.go"), STORE_GO).unwrap();
    fs::write(root.join("todos/service.go"), SERVICE_GO).unwrap();
    temp
}

#[allow(deprecated)]
fn ease(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ease").expect("binary");
    cmd.current_dir(workdir).arg("--quiet");
    cmd
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn strings(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string"))
        .collect()
}

#[test]
fn api_lists_endpoints_and_constructors() {
    let temp = setup_module();
    let body = run_json(ease(temp.path()).arg("api"));

    let endpoints = body["endpoints"].as_array().expect("endpoints");
    assert_eq!(endpoints.len(), 2);

    assert_eq!(endpoints[0]["method"], "POST");
    assert_eq!(endpoints[0]["path"], "/api/todos");
    assert_eq!(endpoints[0]["handler"], "example.com/todo/todos.TodoService.Create");
    assert_eq!(endpoints[0]["params"][0]["name"], "text");
    assert_eq!(endpoints[0]["params"][0]["source"], "body");
    assert_eq!(endpoints[0]["response"]["type"], "string");

    assert_eq!(endpoints[1]["method"], "GET");
    assert_eq!(endpoints[1]["params"][0]["name"], "id");
    assert_eq!(endpoints[1]["params"][0]["source"], "path");

    assert_eq!(
        strings(&body["services"]),
        vec!["example.com/todo/todos.TodoService"]
    );

    let constructors: Vec<&str> = body["constructors"]
        .as_array()
        .expect("constructors")
        .iter()
        .map(|step| step["func"].as_str().expect("fqn"))
        .collect();
    assert_eq!(
        constructors,
        vec![
            "example.com/todo/store.NewStore",
            "example.com/todo/todos.NewTodoService"
        ]
    );
    assert_eq!(
        strings(&body["constructors"][1]["depends_on"]),
        vec!["example.com/todo/store.NewStore"]
    );
}

#[test]
fn resolve_prints_dependency_order() {
    let temp = setup_module();
    let body = run_json(
        ease(temp.path())
            .arg("resolve")
            .arg("--type")
            .arg("example.com/todo/todos.TodoService"),
    );

    assert_eq!(
        strings(&body["targets"]),
        vec!["example.com/todo/todos.TodoService"]
    );
    assert_eq!(body["constructors"][0]["func"], "example.com/todo/store.NewStore");
    assert_eq!(
        strings(&body["constructors"][0]["produces"]),
        vec!["example.com/todo/store.Store"]
    );
    assert_eq!(
        body["constructors"][1]["func"],
        "example.com/todo/todos.NewTodoService"
    );
}

#[test]
fn resolve_fails_for_unknown_type() {
    let temp = setup_module();
    ease(temp.path())
        .arg("resolve")
        .arg("--type")
        .arg("example.com/todo/todos.Missing")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "could not find a valid constructor for example.com/todo/todos.Missing",
        ));
}

#[test]
fn inspect_reports_docs_and_directives() {
    let temp = setup_module();
    let body = run_json(ease(temp.path()).arg("inspect").arg("./..."));

    let funcs = body["funcs"].as_array().expect("funcs");
    let create = funcs
        .iter()
        .find(|f| f["name"] == "Create")
        .expect("Create listed");
    assert_eq!(create["doc"], "Create adds a todo.");
    assert_eq!(create["directives"]["api"]["method"], "POST");
    assert_eq!(create["receiver"]["type"], "example.com/todo/todos.TodoService");
    assert_eq!(create["receiver"]["kind"]["pointer"], true);
    assert_eq!(create["params"][0]["type"], "context.Context");

    let types = body["types"].as_array().expect("types");
    let store = types
        .iter()
        .find(|t| t["fqn"] == "example.com/todo/store.Store")
        .expect("Store listed");
    assert_eq!(store["declared"], true);
    assert_eq!(store["kind"], "struct");
    assert_eq!(store["doc"], "Store keeps todos.");

    let packages: Vec<&str> = body["packages"]
        .as_array()
        .expect("packages")
        .iter()
        .map(|p| p["path"].as_str().expect("path"))
        .collect();
    assert!(packages.contains(&"context"));
    assert!(packages.contains(&"example.com/todo/store"));
}

#[test]
fn units_file_replaces_scanning() {
    let temp = tempdir().unwrap();
    let units = r#"[
      {
        "package_path": "example.com/app",
        "funcs": [
          {
            "name": "NewLogger",
            "exported": true,
            "returns": [{"shape": {"kind": "pointer", "elem": {"kind": "named", "name": "Logger"}}}]
          },
          {
            "name": "NewServer",
            "exported": true,
            "params": [{"name": "l", "shape": {"kind": "pointer", "elem": {"kind": "named", "name": "Logger"}}}],
            "returns": [{"shape": {"kind": "pointer", "elem": {"kind": "named", "name": "Server"}}}]
          }
        ]
      }
    ]"#;
    fs::write(temp.path().join("units.json"), units).unwrap();

    let body = run_json(
        ease(temp.path())
            .arg("resolve")
            .arg("--units")
            .arg("units.json")
            .arg("--type")
            .arg("example.com/app.Server"),
    );

    let order: Vec<&str> = body["constructors"]
        .as_array()
        .expect("constructors")
        .iter()
        .map(|step| step["func"].as_str().expect("fqn"))
        .collect();
    assert_eq!(order, vec!["example.com/app.NewLogger", "example.com/app.NewServer"]);
}

#[test]
fn prefix_flag_changes_directive_namespace() {
    let temp = setup_module();
    let body = run_json(ease(temp.path()).arg("api").arg("--prefix").arg("gen"));

    assert_eq!(body["endpoints"].as_array().expect("endpoints").len(), 0);
    assert_eq!(body["constructors"].as_array().expect("constructors").len(), 0);
}

#[test]
fn strict_policy_from_config_file() {
    let temp = setup_module();
    fs::write(
        temp.path().join("store/alt.go"),
        "package store\n\nfunc NewMemoryStore() *Store {\n\treturn &Store{}\n}\n",
    )
    .unwrap();

    run_json(ease(temp.path()).arg("api"));

    fs::write(
        temp.path().join("ease.toml"),
        "jobs = 2\n\n[parser]\nproducer_policy = \"reject_ambiguous\"\n",
    )
    .unwrap();

    ease(temp.path())
        .arg("api")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous constructor"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = setup_module();
    fs::write(temp.path().join("custom.toml"), "jobs = 0\n").unwrap();

    ease(temp.path())
        .arg("inspect")
        .arg("--config")
        .arg("custom.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("jobs must be > 0"));
}

#[test]
fn missing_go_mod_is_an_error() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("main.go"), "package main\n").unwrap();

    ease(temp.path())
        .arg("inspect")
        .arg(".")
        .assert()
        .failure();
}
