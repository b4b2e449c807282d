use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Declarations of one source file, scoped to the package it belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationUnit {
    /// Import path of the owning package
    pub package_path: String,

    /// Source file the declarations come from, when known
    #[serde(default)]
    pub file_path: Option<String>,

    /// Imports visible in this unit
    #[serde(default)]
    pub imports: Vec<ImportSpec>,

    /// Type declarations, in source order
    #[serde(default)]
    pub types: Vec<TypeDecl>,

    /// Function and method declarations, in source order
    #[serde(default)]
    pub funcs: Vec<FuncDecl>,
}

impl DeclarationUnit {
    pub fn new(package_path: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            ..Default::default()
        }
    }

    /// Builder: set source file path
    #[must_use]
    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Builder: add an import
    #[must_use]
    pub fn import(mut self, import: ImportSpec) -> Self {
        self.imports.push(import);
        self
    }

    /// Builder: add a type declaration
    #[must_use]
    pub fn type_decl(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    /// Builder: add a function declaration
    #[must_use]
    pub fn func(mut self, decl: FuncDecl) -> Self {
        self.funcs.push(decl);
        self
    }

    /// Total number of declarations carried by the unit
    pub fn declaration_count(&self) -> usize {
        self.types.len() + self.funcs.len()
    }

    /// Read units serialized as a JSON array
    pub fn load_json(path: &Path) -> crate::error::Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Import of a package, optionally under a local alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    #[serde(default)]
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,

    /// Visible outside its package
    pub exported: bool,

    /// Receiver slot, only set for methods
    #[serde(default)]
    pub receiver: Option<FieldDecl>,

    #[serde(default)]
    pub params: Vec<FieldDecl>,

    #[serde(default)]
    pub returns: Vec<FieldDecl>,

    /// Raw doc comment lines, markers included
    #[serde(default)]
    pub doc: Vec<String>,
}

impl FuncDecl {
    /// Create a declaration, deriving visibility from the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            exported: is_exported(&name),
            name,
            receiver: None,
            params: Vec::new(),
            returns: Vec::new(),
            doc: Vec::new(),
        }
    }

    /// Builder: set receiver
    #[must_use]
    pub fn receiver(mut self, receiver: FieldDecl) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Builder: add a parameter
    #[must_use]
    pub fn param(mut self, param: FieldDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Builder: add a return slot
    #[must_use]
    pub fn returns(mut self, ret: FieldDecl) -> Self {
        self.returns.push(ret);
        self
    }

    /// Builder: add a doc comment line
    #[must_use]
    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// One parameter, return or receiver slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub name: Option<String>,
    pub shape: Shape,
    #[serde(default)]
    pub doc: Vec<String>,
}

impl FieldDecl {
    pub fn named(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: Some(name.into()),
            shape,
            doc: Vec::new(),
        }
    }

    pub fn unnamed(shape: Shape) -> Self {
        Self {
            name: None,
            shape,
            doc: Vec::new(),
        }
    }
}

/// Type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub doc: Vec<String>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            doc: Vec::new(),
        }
    }

    /// Builder: add a doc comment line
    #[must_use]
    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Interface,
    /// `type A = B`
    Alias,
    #[default]
    Other,
}

impl TypeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Alias => "alias",
            Self::Other => "other",
        }
    }
}

/// Syntactic shape of a declared value, innermost type last
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// `Name` or `pkg.Name`, where `pkg` is a local import name
    Named {
        #[serde(default)]
        package: Option<String>,
        name: String,
    },
    /// `*T`
    Pointer { elem: Box<Shape> },
    /// `[]T`, `[N]T` and variadic `...T`
    Slice { elem: Box<Shape> },
    /// `map[K]V`
    Map { key: Box<Shape>, value: Box<Shape> },
    /// Anything the model does not track (func, chan, inline struct...)
    Unsupported { text: String },
}

impl Shape {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            package: None,
            name: name.into(),
        }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            package: Some(package.into()),
            name: name.into(),
        }
    }

    pub fn pointer(elem: Shape) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: Shape) -> Self {
        Self::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn unsupported(text: impl Into<String>) -> Self {
        Self::Unsupported { text: text.into() }
    }

    /// Name of the innermost named type, following pointers and containers
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Pointer { elem } | Self::Slice { elem } => elem.base_name(),
            Self::Map { value, .. } => value.base_name(),
            Self::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named {
                package: Some(package),
                name,
            } => write!(f, "{package}.{name}"),
            Self::Named {
                package: None,
                name,
            } => f.write_str(name),
            Self::Pointer { elem } => write!(f, "*{elem}"),
            Self::Slice { elem } => write!(f, "[]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Unsupported { text } => f.write_str(text),
        }
    }
}

/// Go visibility rule: exported names start with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
