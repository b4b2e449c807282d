use crate::decl::Decl;
use crate::directive::Directive;
use crate::hash::hex_prefix;
use crate::package::{sanitize_ident, Package};
use ease_source::TypeKind;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Where a type was declared
#[derive(Debug)]
pub struct TypeDeclaration {
    pub kind: TypeKind,
    pub decl: Decl,
    pub file: Option<String>,
}

/// A named type, built-in or owned by a package
///
/// Types are created on first reference. The declaration is attached later,
/// when the declaring unit is loaded, and never replaced afterwards.
#[derive(Debug)]
pub struct Type {
    name: String,
    package: Option<Arc<Package>>,
    fqn: String,
    declaration: OnceLock<TypeDeclaration>,
    alias: OnceLock<String>,
}

impl Type {
    pub(crate) fn new(package: Option<Arc<Package>>, name: impl Into<String>) -> Self {
        let name = name.into();
        let fqn = fqn(package.as_deref(), &name);

        Self {
            name,
            package,
            fqn,
            declaration: OnceLock::new(),
            alias: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> Option<&Arc<Package>> {
        self.package.as_ref()
    }

    /// `path.Name`, or the bare name for built-ins
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn is_builtin(&self) -> bool {
        self.package.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.fqn == "error"
    }

    pub fn is_context(&self) -> bool {
        self.fqn == "context.Context"
    }

    pub fn is_exported(&self) -> bool {
        ease_source::is_exported(&self.name)
    }

    /// Attach the declaration, returns `false` when one is already attached
    pub(crate) fn declare(&self, declaration: TypeDeclaration) -> bool {
        self.declaration.set(declaration).is_ok()
    }

    pub fn declaration(&self) -> Option<&TypeDeclaration> {
        self.declaration.get()
    }

    pub fn is_declared(&self) -> bool {
        self.declaration.get().is_some()
    }

    pub fn kind(&self) -> Option<TypeKind> {
        self.declaration.get().map(|d| d.kind)
    }

    pub fn doc(&self) -> &str {
        self.declaration.get().map_or("", |d| d.decl.doc())
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.declaration.get()?.decl.directive(name)
    }

    /// Identifier unique per fqn, e.g. `todoservice_9c2e`, the bare name
    /// for built-ins
    pub fn alias(&self) -> &str {
        self.alias.get_or_init(|| {
            if self.is_builtin() {
                return self.name.clone();
            }
            format!(
                "{}_{}",
                sanitize_ident(&self.name.to_lowercase()),
                hex_prefix(&self.fqn, 4)
            )
        })
    }

    /// `<package alias>.<Name>`, or the bare name for built-ins
    pub fn qualified_reference(&self) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package.alias(), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn)
    }
}

pub(crate) fn fqn(package: Option<&Package>, name: &str) -> String {
    match package {
        Some(package) => format!("{}.{}", package.path(), name),
        None => name.to_string(),
    }
}
