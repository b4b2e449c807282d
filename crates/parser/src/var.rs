use crate::decl::Decl;
use crate::types::Type;
use ease_source::Shape;
use serde::Serialize;
use std::sync::Arc;

/// Structural qualifiers collected while walking a declared shape
///
/// Flags only accumulate: `[]*T` walks the slice first and the pointer second,
/// so it ends up with `slice` and `slice_of_pointer` but not `pointer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct VarKind {
    /// Refers to a named type owned by a package
    pub ident: bool,
    /// Refers to a built-in type
    pub builtin: bool,
    pub pointer: bool,
    pub slice: bool,
    pub slice_of_pointer: bool,
    pub map: bool,
}

impl VarKind {
    /// No qualifier at all, the shape could not be resolved
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            ident: false,
            builtin: false,
            pointer: false,
            slice: false,
            slice_of_pointer: false,
            map: false,
        }
    }

    pub const fn is_unknown(self) -> bool {
        !self.ident && !self.builtin
    }

    #[must_use]
    pub const fn with_ident(mut self) -> Self {
        self.ident = true;
        self
    }

    #[must_use]
    pub const fn with_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    #[must_use]
    pub const fn with_pointer(mut self) -> Self {
        self.pointer = true;
        self
    }

    #[must_use]
    pub const fn with_slice(mut self) -> Self {
        self.slice = true;
        self
    }

    #[must_use]
    pub const fn with_slice_of_pointer(mut self) -> Self {
        self.slice_of_pointer = true;
        self
    }

    #[must_use]
    pub const fn with_map(mut self) -> Self {
        self.map = true;
        self
    }
}

/// A receiver, parameter or return slot
#[derive(Debug)]
pub struct Var {
    decl: Decl,
    shape: Shape,
    ty: Option<Arc<Type>>,
    kind: VarKind,
}

impl Var {
    pub(crate) fn new(decl: Decl, shape: Shape, ty: Option<Arc<Type>>, kind: VarKind) -> Self {
        Self {
            decl,
            shape,
            ty,
            kind,
        }
    }

    /// Declared name, empty for unnamed slots
    pub fn name(&self) -> &str {
        self.decl.name()
    }

    pub fn decl(&self) -> &Decl {
        &self.decl
    }

    /// Shape as written in the source
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Innermost named type, `None` when the shape is not understood
    pub fn ty(&self) -> Option<&Arc<Type>> {
        self.ty.as_ref()
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    pub fn is_error(&self) -> bool {
        self.ty.as_ref().is_some_and(|ty| ty.is_error())
    }

    pub fn is_context(&self) -> bool {
        self.ty.as_ref().is_some_and(|ty| ty.is_context())
    }
}
