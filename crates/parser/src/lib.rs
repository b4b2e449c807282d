//! # Ease Parser
//!
//! Semantic model of declared packages, types and functions, plus the
//! constructor resolver that orders the calls needed to build a set of
//! services.
//!
//! ## Architecture
//!
//! ```text
//! DeclarationUnit[]
//!     │
//!     ├──> Registry (one per session)
//!     │      ├─ Packages: one per import path
//!     │      ├─ Types: one per fully-qualified name, declared lazily
//!     │      └─ Funcs: signatures resolved once, at load time
//!     │
//!     ├──> Directive Parser
//!     │      └─ `//ease:api method=POST path=/x` → Directive
//!     │
//!     └──> Resolver
//!            ├─ Pick a producer per target type (ProducerPolicy)
//!            ├─ Resolve its parameters first (post-order)
//!            └─ Detect missing producers and cycles
//! ```
//!
//! ```
//! use ease_parser::{ParserConfig, Registry};
//! use ease_source::{DeclarationUnit, FieldDecl, FuncDecl, Shape};
//!
//! let unit = DeclarationUnit::new("example.com/app")
//!     .func(FuncDecl::new("NewLogger").returns(FieldDecl::unnamed(Shape::pointer(Shape::named("Logger")))))
//!     .func(
//!         FuncDecl::new("NewService")
//!             .param(FieldDecl::named("logger", Shape::pointer(Shape::named("Logger"))))
//!             .returns(FieldDecl::unnamed(Shape::pointer(Shape::named("Service")))),
//!     );
//!
//! let registry = Registry::new(ParserConfig::default()).unwrap();
//! registry.load(&unit);
//!
//! let app = registry.package("example.com/app");
//! let service = registry.ty(Some(&app), "Service");
//! let resolution = registry.resolve(&[service]).unwrap();
//! let order: Vec<&str> = resolution.funcs().iter().map(|f| f.name()).collect();
//! assert_eq!(order, ["NewLogger", "NewService"]);
//! ```

mod builtin;
mod config;
mod decl;
mod directive;
mod error;
mod func;
mod hash;
mod package;
mod registry;
mod resolver;
mod types;
mod var;

pub use builtin::is_builtin;
pub use config::{ParserConfig, ProducerPolicy};
pub use decl::Decl;
pub use directive::{sanitize_comment, Directive, DirectiveParser, Documentation};
pub use error::{ParserError, Result};
pub use func::{DeclOrdinal, Func, Signature};
pub use package::Package;
pub use registry::{LoadStats, Registry};
pub use resolver::{Resolution, Resolver};
pub use types::{Type, TypeDeclaration};
pub use var::{Var, VarKind};
