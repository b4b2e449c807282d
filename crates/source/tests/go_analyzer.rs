use ease_source::{FieldDecl, GoAnalyzer, ImportSpec, Shape, TypeKind};
use pretty_assertions::assert_eq;

const SERVICE: &str = r#"// Package todo keeps a list of things to do.
package todo

import (
	stdctx "context"
	"errors"
	_ "embed"
	"example.com/todo/internal/store"
)

var ErrNotFound = errors.New("not found")

type (
	// Logger writes diagnostics.
	Logger interface {
		Log(...any)
	}

	TodoService struct {
		store *store.Store
	}
)

// Todo is a single item.
type Todo struct {
	ID   uint
	Text string
}

type ID = uint

// NewTodoService builds the service.
func NewTodoService(s *store.Store, logger Logger) *TodoService {
	return &TodoService{store: s}
}

// Creates a new todo with the given text content.
//
//ease:api method=POST path=/api/todos
func (s *TodoService) Create(ctx stdctx.Context, cmd *CreateCommand) (*Todo, error) {
	return nil, nil
}

func (s *TodoService) List(stdctx.Context) ([]*Todo, error) { return nil, nil }
"#;

#[test]
fn extracts_imports_with_aliases() {
    let mut analyzer = GoAnalyzer::new().expect("go grammar");
    let unit = analyzer
        .analyze(SERVICE, "example.com/todo", Some("service.go"))
        .expect("analysis failed");

    assert_eq!(unit.package_path, "example.com/todo");
    assert_eq!(unit.file_path.as_deref(), Some("service.go"));
    assert_eq!(
        unit.imports,
        vec![
            ImportSpec::aliased("stdctx", "context"),
            ImportSpec::new("errors"),
            ImportSpec::new("example.com/todo/internal/store"),
        ]
    );
}

#[test]
fn extracts_types_with_group_and_own_docs() {
    let mut analyzer = GoAnalyzer::new().expect("go grammar");
    let unit = analyzer.analyze(SERVICE, "example.com/todo", None).unwrap();

    let summary: Vec<_> = unit
        .types
        .iter()
        .map(|t| (t.name.as_str(), t.kind, t.doc.clone()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Logger", TypeKind::Interface, vec!["// Logger writes diagnostics.".to_string()]),
            ("TodoService", TypeKind::Struct, vec![]),
            ("Todo", TypeKind::Struct, vec!["// Todo is a single item.".to_string()]),
            ("ID", TypeKind::Alias, vec![]),
        ]
    );
}

#[test]
fn extracts_functions_and_methods() {
    let mut analyzer = GoAnalyzer::new().expect("go grammar");
    let unit = analyzer.analyze(SERVICE, "example.com/todo", None).unwrap();

    let names: Vec<_> = unit.funcs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["NewTodoService", "Create", "List"]);

    let ctor = &unit.funcs[0];
    assert!(ctor.receiver.is_none());
    assert_eq!(
        ctor.params,
        vec![
            FieldDecl::named("s", Shape::pointer(Shape::qualified("store", "Store"))),
            FieldDecl::named("logger", Shape::named("Logger")),
        ]
    );
    assert_eq!(ctor.doc, vec!["// NewTodoService builds the service.".to_string()]);

    let create = &unit.funcs[1];
    assert_eq!(
        create.receiver,
        Some(FieldDecl::named("s", Shape::pointer(Shape::named("TodoService"))))
    );
    assert_eq!(create.params[0].shape, Shape::qualified("stdctx", "Context"));
    assert_eq!(create.returns.len(), 2);
    assert_eq!(
        create.doc,
        vec![
            "// Creates a new todo with the given text content.".to_string(),
            "//".to_string(),
            "//ease:api method=POST path=/api/todos".to_string(),
        ]
    );

    let list = &unit.funcs[2];
    assert_eq!(list.params, vec![FieldDecl::unnamed(Shape::qualified("stdctx", "Context"))]);
    assert_eq!(
        list.returns[0].shape,
        Shape::slice(Shape::pointer(Shape::named("Todo")))
    );
    assert!(list.doc.is_empty());
}
