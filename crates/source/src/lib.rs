//! # Ease Source
//!
//! Declaration source for the ease model builder.
//!
//! Go files are parsed with tree-sitter and reduced to [`DeclarationUnit`]s:
//! the package path, the import table and the signatures and doc comments of
//! every top-level function, method and type. Function bodies are never
//! looked at.
//!
//! ```text
//! pattern (dir or dir/...)
//!     │
//!     ├──> go.mod lookup → module path
//!     │
//!     ├──> package directories → import paths
//!     │
//!     └──> Tree-sitter parse per file → DeclarationUnit
//! ```
//!
//! Units are plain serde data, so they can also be produced by other tools
//! and loaded with [`DeclarationUnit::load_json`].

mod analyzer;
mod config;
mod error;
mod module;
mod scanner;
mod types;

pub use analyzer::GoAnalyzer;
pub use config::SourceConfig;
pub use error::{Result, SourceError};
pub use module::{parse_module_path, GoModule};
pub use scanner::Scanner;
pub use types::{
    is_exported, DeclarationUnit, FieldDecl, FuncDecl, ImportSpec, Shape, TypeDecl, TypeKind,
};
