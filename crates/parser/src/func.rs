use crate::decl::Decl;
use crate::directive::Directive;
use crate::package::Package;
use crate::registry::FileScope;
use crate::types::Type;
use crate::var::Var;
use ease_source::FuncDecl;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Position of a declaration in load order
///
/// `unit` is the index the registry gave the declaring unit, `index` the
/// position of the function inside that unit. Ordering by it reproduces
/// source order even when units were loaded in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclOrdinal {
    pub unit: usize,
    pub index: usize,
}

/// Resolved receiver, parameters and returns of a function
#[derive(Debug, Default)]
pub struct Signature {
    pub receiver: Option<Var>,
    pub params: Vec<Var>,
    pub returns: Vec<Var>,
}

/// A function or method
///
/// The signature is resolved once, through the import table of the declaring
/// file. Loading forces it, so every referenced type is registered by then.
pub struct Func {
    decl: Decl,
    package: Arc<Package>,
    receiver_type: Option<String>,
    fqn: String,
    ordinal: DeclOrdinal,
    source: FuncDecl,
    scope: Arc<FileScope>,
    signature: OnceLock<Signature>,
}

impl Func {
    pub(crate) fn new(
        source: FuncDecl,
        scope: Arc<FileScope>,
        ordinal: DeclOrdinal,
    ) -> Self {
        let package = scope.package().clone();
        let receiver_type = source
            .receiver
            .as_ref()
            .and_then(|receiver| receiver.shape.base_name())
            .map(str::to_string);
        let fqn = func_fqn(&package, receiver_type.as_deref(), &source.name);
        let decl = Decl::new(source.name.clone(), source.doc.clone(), scope.directives());

        Self {
            decl,
            package,
            receiver_type,
            fqn,
            ordinal,
            source,
            scope,
            signature: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.decl.name()
    }

    /// `path.Name` for functions, `path.Recv.Name` for methods
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn package(&self) -> &Arc<Package> {
        &self.package
    }

    pub fn ordinal(&self) -> DeclOrdinal {
        self.ordinal
    }

    pub fn is_exported(&self) -> bool {
        self.source.exported
    }

    pub fn is_method(&self) -> bool {
        self.source.receiver.is_some()
    }

    /// Base type name of the receiver, `Service` for `(s *Service)`
    pub fn receiver_type(&self) -> Option<&str> {
        self.receiver_type.as_deref()
    }

    /// File the function was declared in, when known
    pub fn file(&self) -> Option<&str> {
        self.scope.file()
    }

    pub fn doc(&self) -> &str {
        self.decl.doc()
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.decl.directive(name)
    }

    pub fn decl(&self) -> &Decl {
        &self.decl
    }

    pub fn signature(&self) -> &Signature {
        self.signature
            .get_or_init(|| self.scope.resolve_signature(&self.source))
    }

    pub fn receiver(&self) -> Option<&Var> {
        self.signature().receiver.as_ref()
    }

    pub fn params(&self) -> &[Var] {
        &self.signature().params
    }

    pub fn returns(&self) -> &[Var] {
        &self.signature().returns
    }

    /// Whether a non-error return slot resolves to exactly `ty`
    pub fn produces(&self, ty: &Arc<Type>) -> bool {
        !ty.is_error()
            && self
                .returns()
                .iter()
                .any(|ret| ret.ty().is_some_and(|t| Arc::ptr_eq(t, ty)))
    }

    /// Types this function can construct, in return order
    pub fn produced_types(&self) -> Vec<Arc<Type>> {
        self.returns()
            .iter()
            .filter(|ret| !ret.is_error())
            .filter_map(|ret| ret.ty().cloned())
            .collect()
    }

    pub fn returns_error(&self) -> bool {
        self.returns().iter().any(Var::is_error)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("fqn", &self.fqn)
            .field("ordinal", &self.ordinal)
            .field("resolved", &self.signature.get().is_some())
            .finish()
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn)
    }
}

pub(crate) fn func_fqn(package: &Package, receiver: Option<&str>, name: &str) -> String {
    match receiver {
        Some(receiver) => format!("{}.{}.{}", package.path(), receiver, name),
        None => format!("{}.{}", package.path(), name),
    }
}
