use ease_parser::{DeclOrdinal, ParserConfig, Registry, VarKind};
use ease_source::{DeclarationUnit, FieldDecl, FuncDecl, ImportSpec, Shape, TypeDecl, TypeKind};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

const APP: &str = "github.com/acme/todo/app";
const STORE: &str = "github.com/acme/todo/store";

fn registry() -> Registry {
    Registry::new(ParserConfig::default()).expect("default config is valid")
}

fn store_unit() -> DeclarationUnit {
    DeclarationUnit::new(STORE)
        .file_path("store/store.go")
        .type_decl(
            TypeDecl::new("Store", TypeKind::Struct)
                .doc("// Store keeps todos in memory.")
                .doc("//ease:service scope=singleton"),
        )
        .func(
            FuncDecl::new("NewStore")
                .returns(FieldDecl::unnamed(Shape::pointer(Shape::named("Store")))),
        )
}

fn app_unit() -> DeclarationUnit {
    DeclarationUnit::new(APP)
        .file_path("app/app.go")
        .import(ImportSpec::new("context"))
        .import(ImportSpec::aliased("db", STORE))
        .func(
            FuncDecl::new("ListTodos")
                .receiver(FieldDecl::named(
                    "s",
                    Shape::pointer(Shape::named("Service")),
                ))
                .param(FieldDecl::named("ctx", Shape::qualified("context", "Context")))
                .param(FieldDecl::named(
                    "stores",
                    Shape::slice(Shape::pointer(Shape::qualified("db", "Store"))),
                ))
                .param(FieldDecl::named(
                    "index",
                    Shape::map(Shape::named("string"), Shape::pointer(Shape::named("Todo"))),
                ))
                .returns(FieldDecl::unnamed(Shape::slice(Shape::named("Todo"))))
                .returns(FieldDecl::unnamed(Shape::named("error")))
                .doc("// ListTodos returns every todo.")
                .doc("//ease:api method=GET path=/api/todos"),
        )
        .func(
            FuncDecl::new("Broken")
                .param(FieldDecl::named("cb", Shape::unsupported("func()")))
                .param(FieldDecl::named("x", Shape::qualified("missing", "Thing"))),
        )
}

#[test]
fn same_fqn_yields_same_instance() {
    let registry = registry();
    registry.load(&store_unit());
    registry.load(&app_unit());

    let store_pkg = registry.package(STORE);
    assert!(Arc::ptr_eq(&store_pkg, &registry.package(&format!("\"{STORE}\""))));
    assert!(Arc::ptr_eq(&store_pkg, &registry.package(&format!("`{STORE}`"))));

    let declared = registry.find_type(&format!("{STORE}.Store")).expect("declared");
    assert!(Arc::ptr_eq(&declared, &registry.ty(Some(&store_pkg), "Store")));

    let list = registry.find_func(&format!("{APP}.Service.ListTodos")).expect("method");
    let stores = &list.params()[1];
    assert!(Arc::ptr_eq(stores.ty().expect("resolved"), &declared));

    let new_store = registry.find_func(&format!("{STORE}.NewStore")).expect("func");
    assert!(Arc::ptr_eq(new_store.returns()[0].ty().expect("resolved"), &declared));
    assert!(Arc::ptr_eq(new_store.package(), &store_pkg));
}

#[test]
fn builtins_ignore_the_package_argument() {
    let registry = registry();
    let app = registry.package(APP);
    let store = registry.package(STORE);

    let a = registry.ty(Some(&app), "string");
    let b = registry.ty(Some(&store), "string");
    let c = registry.ty(None, "string");

    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
    assert!(a.is_builtin());
    assert_eq!(a.fqn(), "string");
    assert!(registry.ty(Some(&app), "error").is_error());
}

#[test]
fn type_declaration_is_attached_to_forward_reference() {
    let registry = registry();
    registry.load(&app_unit());

    let list = registry.find_func(&format!("{APP}.Service.ListTodos")).expect("method");
    let stub = list.params()[1].ty().expect("resolved").clone();
    assert!(!stub.is_declared());

    registry.load(&store_unit());

    assert!(stub.is_declared());
    assert_eq!(stub.kind(), Some(TypeKind::Struct));
    assert_eq!(stub.doc(), "Store keeps todos in memory.");
    assert_eq!(
        stub.directive("service").and_then(|d| d.param("scope")),
        Some("singleton")
    );
}

#[test]
fn qualifiers_accumulate_outside_in() {
    let registry = registry();
    registry.load(&store_unit());
    registry.load(&app_unit());

    let list = registry.find_func(&format!("{APP}.Service.ListTodos")).expect("method");
    let params = list.params();

    assert!(params[0].is_context());
    assert_eq!(params[0].kind(), VarKind::default().with_ident());

    assert_eq!(params[1].name(), "stores");
    assert_eq!(
        params[1].kind(),
        VarKind::default().with_slice().with_slice_of_pointer().with_ident()
    );
    assert!(!params[1].kind().pointer);

    assert_eq!(params[2].ty().map(|t| t.fqn()), Some(format!("{APP}.Todo").as_str()));
    assert_eq!(
        params[2].kind(),
        VarKind::default().with_map().with_pointer().with_ident()
    );

    let returns = list.returns();
    assert_eq!(returns[0].kind(), VarKind::default().with_slice().with_ident());
    assert!(returns[1].is_error());
    assert_eq!(returns[1].kind(), VarKind::default().with_builtin());
    assert!(list.returns_error());

    let receiver = list.receiver().expect("receiver");
    assert_eq!(receiver.ty().map(|t| t.fqn()), Some(format!("{APP}.Service").as_str()));
    assert_eq!(receiver.kind(), VarKind::default().with_pointer().with_ident());
}

#[test]
fn unresolvable_shapes_degrade_to_unknown() {
    let registry = registry();
    registry.load(&app_unit());

    let broken = registry.find_func(&format!("{APP}.Broken")).expect("func");
    for param in broken.params() {
        assert!(param.ty().is_none());
        assert!(param.kind().is_unknown());
    }
    assert_eq!(broken.params()[1].shape().to_string(), "missing.Thing");
}

#[test]
fn methods_are_keyed_by_receiver() {
    let unit = DeclarationUnit::new(APP)
        .func(
            FuncDecl::new("Close")
                .receiver(FieldDecl::named("a", Shape::pointer(Shape::named("A")))),
        )
        .func(
            FuncDecl::new("Close")
                .receiver(FieldDecl::named("b", Shape::named("B"))),
        )
        .func(FuncDecl::new("Close"));

    let registry = registry();
    let stats = registry.load(&unit);
    assert_eq!(stats.funcs, 3);

    let fqns: Vec<String> = registry.funcs().iter().map(|f| f.fqn().to_string()).collect();
    assert_eq!(
        fqns,
        vec![
            format!("{APP}.A.Close"),
            format!("{APP}.B.Close"),
            format!("{APP}.Close"),
        ]
    );
    assert_eq!(registry.funcs()[0].receiver_type(), Some("A"));
    assert!(!registry.funcs()[2].is_method());
}

#[test]
fn duplicate_registration_keeps_first() {
    let registry = registry();
    registry.load(&store_unit());
    let first = registry.find_func(&format!("{STORE}.NewStore")).expect("func");

    registry.load(&store_unit());
    let again = registry.find_func(&format!("{STORE}.NewStore")).expect("func");

    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(registry.funcs().len(), 1);
}

#[test]
fn func_docs_and_directives() {
    let registry = registry();
    registry.load(&app_unit());

    let list = registry.find_func(&format!("{APP}.Service.ListTodos")).expect("method");
    assert_eq!(list.doc(), "ListTodos returns every todo.");
    let api = list.directive("api").expect("api directive");
    assert_eq!(api.param("method"), Some("GET"));
    assert_eq!(api.param("path"), Some("/api/todos"));
    assert!(list.is_exported());
    assert_eq!(list.file(), Some("app/app.go"));
}

#[test]
fn custom_prefix() {
    let config = ParserConfig {
        directive_prefix: "gen".to_string(),
        ..Default::default()
    };
    let registry = Registry::new(config).expect("valid");
    registry.load(
        &DeclarationUnit::new(APP).func(
            FuncDecl::new("Ping")
                .doc("//gen:api path=/ping")
                .doc("//ease:api path=/ignored"),
        ),
    );

    let ping = registry.find_func(&format!("{APP}.Ping")).expect("func");
    assert_eq!(ping.directive("api").and_then(|d| d.param("path")), Some("/ping"));
    assert_eq!(ping.doc(), "ease:api path=/ignored");
}

#[test]
fn invalid_prefix_is_rejected() {
    let config = ParserConfig {
        directive_prefix: String::new(),
        ..Default::default()
    };
    assert!(Registry::new(config).is_err());
}

#[test]
fn signature_resolved_once_across_threads() {
    let registry = registry();
    registry.load(&store_unit());
    registry.load(&app_unit());
    let list = registry.find_func(&format!("{APP}.Service.ListTodos")).expect("method");

    let list = &list;
    let addresses: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || list.params().as_ptr() as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn signatures_survive_registry_drop() {
    let registry = registry();
    registry.load(&store_unit());
    let new_store = registry.find_func(&format!("{STORE}.NewStore")).expect("func");
    drop(registry);

    let returns = new_store.returns();
    assert_eq!(returns.len(), 1);
    assert_eq!(
        returns[0].ty().map(|t| t.fqn()),
        Some(format!("{STORE}.Store").as_str())
    );
    assert_eq!(returns[0].kind(), VarKind::default().with_pointer().with_ident());
}

fn handler_unit() -> DeclarationUnit {
    DeclarationUnit::new(APP)
        .import(ImportSpec::new("context"))
        .import(ImportSpec::aliased("db", STORE))
        .func(
            FuncDecl::new("Handle")
                .param(FieldDecl::named("ctx", Shape::qualified("context", "Context")))
                .param(FieldDecl::named("limit", Shape::named("int")))
                .param(FieldDecl::named("store", Shape::pointer(Shape::qualified("db", "Store"))))
                .returns(FieldDecl::unnamed(Shape::pointer(Shape::named("Reply")))),
        )
}

fn type_fqns(registry: &Registry) -> Vec<String> {
    registry.types().iter().map(|t| t.fqn().to_string()).collect()
}

#[test]
fn signature_types_are_listed_after_load() {
    let expected = vec![
        "context.Context".to_string(),
        "int".to_string(),
        format!("{STORE}.Store"),
        format!("{APP}.Reply"),
    ];

    let registry = registry();
    registry.load(&handler_unit());
    assert_eq!(type_fqns(&registry), expected);

    let batch = self::registry();
    batch.load_all(&[handler_unit()], 2);
    assert_eq!(type_fqns(&batch), expected);

    let handle = batch.find_func(&format!("{APP}.Handle")).expect("func");
    assert_eq!(handle.params().len(), 3);
    assert_eq!(handle.returns().len(), 1);
    assert_eq!(type_fqns(&batch), expected);
}

#[test]
fn duplicate_declarations_keep_lowest_ordinal_under_parallel_load() {
    let units: Vec<DeclarationUnit> = (0..32)
        .map(|i| {
            let file = if i == 0 {
                "fs_first.go".to_string()
            } else {
                format!("fs_{i}.go")
            };
            DeclarationUnit::new(APP)
                .file_path(file.clone())
                .type_decl(TypeDecl::new("FS", TypeKind::Struct).doc(format!("// FS from {file}.")))
                .func(
                    FuncDecl::new("NewFS")
                        .returns(FieldDecl::unnamed(Shape::pointer(Shape::named("FS"))))
                        .doc(format!("// NewFS from {file}.")),
                )
        })
        .collect();

    let sequential = registry();
    sequential.load_all(&units, 1);
    let expected_types = type_fqns(&sequential);

    for _ in 0..50 {
        let parallel = registry();
        parallel.load_all(&units, 8);

        let new_fs = parallel.find_func(&format!("{APP}.NewFS")).expect("func");
        assert_eq!(new_fs.file(), Some("fs_first.go"));
        assert_eq!(new_fs.doc(), "NewFS from fs_first.go.");
        assert_eq!(new_fs.ordinal(), DeclOrdinal { unit: 0, index: 0 });
        assert_eq!(parallel.funcs().len(), 1);

        let fs = parallel.find_type(&format!("{APP}.FS")).expect("type");
        assert_eq!(fs.doc(), "FS from fs_first.go.");
        assert_eq!(
            fs.declaration().and_then(|d| d.file.as_deref()),
            Some("fs_first.go")
        );

        assert_eq!(type_fqns(&parallel), expected_types);
    }
}

#[test]
fn parallel_load_is_deterministic() {
    let units: Vec<DeclarationUnit> = (0..24)
        .map(|i| {
            DeclarationUnit::new(format!("example.com/m/p{i}"))
                .import(ImportSpec::new("example.com/m/log"))
                .func(
                    FuncDecl::new("NewLogger").returns(FieldDecl::unnamed(Shape::pointer(
                        Shape::qualified("log", "Logger"),
                    ))),
                )
                .func(FuncDecl::new(format!("Helper{i}")))
        })
        .collect();

    let sequential = registry();
    sequential.load_all(&units, 1);
    let expected: Vec<String> = sequential.funcs().iter().map(|f| f.fqn().to_string()).collect();

    for _ in 0..4 {
        let parallel = registry();
        let stats = parallel.load_all(&units, 6);
        assert_eq!(stats.units, 24);
        assert_eq!(stats.funcs, 48);

        let fqns: Vec<String> = parallel.funcs().iter().map(|f| f.fqn().to_string()).collect();
        assert_eq!(fqns, expected);

        let logger = parallel.ty(Some(&parallel.package("example.com/m/log")), "Logger");
        let chosen = parallel.resolver().producer_for(&logger).expect("producer");
        assert_eq!(chosen.fqn(), "example.com/m/p0.NewLogger");
    }
}

#[test]
fn declare_type_keeps_first_declaration() {
    let registry = registry();
    let app = registry.package(APP);

    let declared = registry.declare_type(
        &app,
        &TypeDecl::new("Config", TypeKind::Struct).doc("// Config holds settings."),
    );
    let again = registry.declare_type(&app, &TypeDecl::new("Config", TypeKind::Alias));

    assert!(Arc::ptr_eq(&declared, &again));
    assert_eq!(again.kind(), Some(TypeKind::Struct));
    assert_eq!(again.doc(), "Config holds settings.");
    assert!(again.declaration().and_then(|d| d.file.as_deref()).is_none());
}
