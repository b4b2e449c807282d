use crate::builtin::is_builtin;
use crate::config::ParserConfig;
use crate::decl::Decl;
use crate::directive::DirectiveParser;
use crate::error::{ParserError, Result};
use crate::func::{DeclOrdinal, Func, Signature};
use crate::package::{package_name, Package};
use crate::resolver::{Resolution, Resolver};
use crate::types::{fqn, Type, TypeDeclaration};
use crate::var::{Var, VarKind};
use ease_collection::Set;
use ease_source::{DeclarationUnit, FieldDecl, FuncDecl, Shape, TypeDecl};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

/// Counts of what one or more units added to the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub units: usize,
    pub types: usize,
    pub funcs: usize,
}

impl std::ops::AddAssign for LoadStats {
    fn add_assign(&mut self, other: Self) {
        self.units += other.units;
        self.types += other.types;
        self.funcs += other.funcs;
    }
}

/// Session-wide store of packages, types and functions
///
/// Every reference to the same import path or fully-qualified name yields the
/// same `Arc`. The registry is cheap to clone and safe to share between
/// loader threads.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    config: ParserConfig,
    directives: Arc<DirectiveParser>,
    packages: Set<Arc<Package>>,
    types: Set<Arc<Type>>,
    funcs: Set<Arc<Func>>,
    next_unit: AtomicUsize,
}

impl Registry {
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate().map_err(ParserError::InvalidConfig)?;
        let directives = Arc::new(DirectiveParser::new(&config.directive_prefix)?);

        Ok(Self {
            inner: Arc::new(RegistryInner {
                config,
                directives,
                packages: Set::new(),
                types: Set::new(),
                funcs: Set::new(),
                next_unit: AtomicUsize::new(0),
            }),
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.inner.config
    }

    pub fn directive_parser(&self) -> &Arc<DirectiveParser> {
        &self.inner.directives
    }

    /// Canonical package for an import path, quotes are trimmed
    pub fn package(&self, path: &str) -> Arc<Package> {
        self.inner.package(path)
    }

    /// Canonical type `package.name`
    ///
    /// Built-in names always live in the global namespace, whatever package
    /// is passed.
    pub fn ty(&self, package: Option<&Arc<Package>>, name: &str) -> Arc<Type> {
        self.inner.ty(package, name)
    }

    /// Canonical type for a declaration, attaching it unless already declared
    pub fn declare_type(&self, package: &Arc<Package>, decl: &TypeDecl) -> Arc<Type> {
        self.inner.declare_type(package, decl, None)
    }

    /// Load one unit and resolve the signatures it declares
    ///
    /// A declaration already registered by an earlier call is kept. Racing
    /// `load` calls from several threads register in arrival order, use
    /// [`Registry::load_all`] when the winner must not depend on scheduling.
    pub fn load(&self, unit: &DeclarationUnit) -> LoadStats {
        let index = self.inner.next_unit.fetch_add(1, Ordering::SeqCst);
        let (stats, funcs) = self.inner.load_unit(unit, index, None);
        resolve_signatures(&funcs);
        stats
    }

    /// Load units on up to `jobs` threads
    ///
    /// Units keep the ordinals of their position in `units`. When several
    /// units declare the same fqn, the lowest ordinal wins, and signatures are
    /// resolved in declaration order once every unit is in. The resulting
    /// model does not depend on thread scheduling.
    pub fn load_all(&self, units: &[DeclarationUnit], jobs: usize) -> LoadStats {
        let base = self.inner.next_unit.fetch_add(units.len(), Ordering::SeqCst);
        let workers = jobs.clamp(1, units.len().max(1));
        let claims = self.inner.claim(units, base);

        let stats = if workers == 1 {
            let mut stats = LoadStats::default();
            for (offset, unit) in units.iter().enumerate() {
                stats += self.inner.load_unit(unit, base + offset, Some(&claims)).0;
            }
            stats
        } else {
            let cursor = AtomicUsize::new(0);
            let cursor = &cursor;
            let inner = &self.inner;
            let claims = &claims;
            thread::scope(|scope| {
                let handles: Vec<_> = (0..workers)
                    .map(|_| {
                        scope.spawn(move || {
                            let mut stats = LoadStats::default();
                            loop {
                                let offset = cursor.fetch_add(1, Ordering::Relaxed);
                                let Some(unit) = units.get(offset) else {
                                    break;
                                };
                                stats += inner.load_unit(unit, base + offset, Some(claims)).0;
                            }
                            stats
                        })
                    })
                    .collect();

                let mut stats = LoadStats::default();
                for handle in handles {
                    match handle.join() {
                        Ok(worker) => stats += worker,
                        Err(_) => log::error!("Loader thread panicked"),
                    }
                }
                stats
            })
        };

        resolve_signatures(&self.funcs());

        log::info!(
            "Loaded {} units: {} types, {} funcs ({} workers)",
            stats.units,
            stats.types,
            stats.funcs,
            workers
        );

        stats
    }

    /// Packages in first-reference order
    pub fn packages(&self) -> Vec<Arc<Package>> {
        self.inner.packages.items()
    }

    /// Types in first-reference order
    ///
    /// Signatures are resolved while loading, so types only mentioned by a
    /// parameter or a return are listed too.
    pub fn types(&self) -> Vec<Arc<Type>> {
        self.inner.types.items()
    }

    /// Functions and methods in declaration order
    pub fn funcs(&self) -> Vec<Arc<Func>> {
        let mut funcs = self.inner.funcs.items();
        funcs.sort_by_key(|func| func.ordinal());
        funcs
    }

    pub fn find_package(&self, path: &str) -> Option<Arc<Package>> {
        self.inner.packages.get(path)
    }

    pub fn find_type(&self, fqn: &str) -> Option<Arc<Type>> {
        self.inner.types.get(fqn)
    }

    pub fn find_func(&self, fqn: &str) -> Option<Arc<Func>> {
        self.inner.funcs.get(fqn)
    }

    /// Resolver over every free function, methods are never constructors
    pub fn resolver(&self) -> Resolver {
        let candidates = self
            .funcs()
            .into_iter()
            .filter(|func| !func.is_method())
            .collect();

        Resolver::new(candidates, self.inner.config.producer_policy)
    }

    /// Shorthand for `resolver().resolve(targets)`
    pub fn resolve(&self, targets: &[Arc<Type>]) -> Result<Resolution> {
        self.resolver().resolve(targets)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.inner.directives.prefix())
            .field("packages", &self.inner.packages.len())
            .field("types", &self.inner.types.len())
            .field("funcs", &self.inner.funcs.len())
            .finish()
    }
}

impl RegistryInner {
    fn package(&self, path: &str) -> Arc<Package> {
        let path = path.trim().trim_matches(|c| c == '"' || c == '`');
        self.packages
            .set_lazy(path, || Arc::new(Package::new(path)))
    }

    fn ty(&self, package: Option<&Arc<Package>>, name: &str) -> Arc<Type> {
        let package = if is_builtin(name) { None } else { package };
        let key = fqn(package.map(|p| p.as_ref()), name);

        self.types
            .set_lazy(&key, || Arc::new(Type::new(package.cloned(), name)))
    }

    /// Sequential pass over a batch: creates packages and declared types in
    /// unit order and records which unit owns every declared fqn
    fn claim(&self, units: &[DeclarationUnit], base: usize) -> Claims {
        let mut claims = Claims::default();

        for (offset, unit) in units.iter().enumerate() {
            let unit_index = base + offset;
            let package = self.package(&unit.package_path);
            for import in &unit.imports {
                self.package(&import.path);
            }

            for decl in &unit.types {
                let ty = self.ty(Some(&package), &decl.name);
                claims.types.entry(ty.fqn().to_string()).or_insert(unit_index);
            }

            for (index, decl) in unit.funcs.iter().enumerate() {
                let ordinal = DeclOrdinal {
                    unit: unit_index,
                    index,
                };
                claims.funcs.entry(func_key(&package, decl)).or_insert(ordinal);
            }
        }

        claims
    }

    fn load_unit(
        self: &Arc<Self>,
        unit: &DeclarationUnit,
        unit_index: usize,
        claims: Option<&Claims>,
    ) -> (LoadStats, Vec<Arc<Func>>) {
        let scope = Arc::new(self.scope(unit));
        let mut funcs = Vec::with_capacity(unit.funcs.len());
        let mut stats = LoadStats {
            units: 1,
            ..Default::default()
        };

        for decl in &unit.types {
            let ty = self.ty(Some(&scope.package), &decl.name);
            if claims.map_or(true, |claims| claims.owns_type(ty.fqn(), unit_index)) {
                self.attach(&ty, decl, scope.file.as_deref());
            } else {
                log::debug!("Type {} declared by an earlier unit, skipping", ty.fqn());
            }
            stats.types += 1;
        }

        for (index, decl) in unit.funcs.iter().enumerate() {
            let ordinal = DeclOrdinal {
                unit: unit_index,
                index,
            };
            let key = func_key(&scope.package, decl);
            if claims.map_or(true, |claims| claims.owns_func(&key, ordinal)) {
                funcs.push(self.register_func(&scope, decl, key, ordinal));
            } else {
                log::debug!("Func {key} declared by an earlier unit, skipping");
            }
            stats.funcs += 1;
        }

        log::debug!(
            "Loaded {} ({}): {} types, {} funcs",
            unit.package_path,
            unit.file_path.as_deref().unwrap_or("-"),
            stats.types,
            stats.funcs
        );

        (stats, funcs)
    }

    fn scope(self: &Arc<Self>, unit: &DeclarationUnit) -> FileScope {
        let package = self.package(&unit.package_path);

        let mut imports = HashMap::new();
        for import in &unit.imports {
            let imported = self.package(&import.path);
            let local = match import.alias.as_deref() {
                Some("_" | ".") => continue,
                Some(alias) => alias.to_string(),
                None => package_name(imported.path()).to_string(),
            };
            imports.insert(local, imported);
        }

        FileScope {
            registry: Arc::downgrade(self),
            directives: self.directives.clone(),
            package,
            imports,
            file: unit.file_path.clone(),
        }
    }

    fn declare_type(&self, package: &Arc<Package>, decl: &TypeDecl, file: Option<&str>) -> Arc<Type> {
        let ty = self.ty(Some(package), &decl.name);
        self.attach(&ty, decl, file);
        ty
    }

    fn attach(&self, ty: &Type, decl: &TypeDecl, file: Option<&str>) {
        let declared = ty.declare(TypeDeclaration {
            kind: decl.kind,
            decl: Decl::new(decl.name.clone(), decl.doc.clone(), self.directives.clone()),
            file: file.map(str::to_string),
        });

        if !declared {
            log::debug!("Type {} declared more than once, keeping the first", ty.fqn());
        }
    }

    fn register_func(
        &self,
        scope: &Arc<FileScope>,
        decl: &FuncDecl,
        key: String,
        ordinal: DeclOrdinal,
    ) -> Arc<Func> {
        let mut created = false;
        let func = self.funcs.set_lazy(&key, || {
            created = true;
            Arc::new(Func::new(decl.clone(), scope.clone(), ordinal))
        });

        if !created {
            log::debug!("Func {key} registered more than once, keeping the first");
        }

        func
    }
}

/// Owner of every fqn declared in a `load_all` batch, the lowest ordinal
#[derive(Default)]
struct Claims {
    types: HashMap<String, usize>,
    funcs: HashMap<String, DeclOrdinal>,
}

impl Claims {
    fn owns_type(&self, fqn: &str, unit: usize) -> bool {
        self.types.get(fqn).map_or(true, |&owner| owner == unit)
    }

    fn owns_func(&self, fqn: &str, ordinal: DeclOrdinal) -> bool {
        self.funcs.get(fqn).map_or(true, |&owner| owner == ordinal)
    }
}

fn func_key(package: &Package, decl: &FuncDecl) -> String {
    let receiver = decl
        .receiver
        .as_ref()
        .and_then(|receiver| receiver.shape.base_name());
    crate::func::func_fqn(package, receiver, &decl.name)
}

fn resolve_signatures(funcs: &[Arc<Func>]) {
    for func in funcs {
        func.signature();
    }
}

/// Import table and package of the file a declaration came from
pub(crate) struct FileScope {
    registry: Weak<RegistryInner>,
    directives: Arc<DirectiveParser>,
    package: Arc<Package>,
    imports: HashMap<String, Arc<Package>>,
    file: Option<String>,
}

impl FileScope {
    pub(crate) fn package(&self) -> &Arc<Package> {
        &self.package
    }

    pub(crate) fn directives(&self) -> Arc<DirectiveParser> {
        self.directives.clone()
    }

    pub(crate) fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub(crate) fn resolve_signature(&self, decl: &FuncDecl) -> Signature {
        let Some(registry) = self.registry.upgrade() else {
            log::warn!(
                "Registry dropped before {} was resolved, its signature stays unknown",
                decl.name
            );
            return Signature {
                receiver: decl.receiver.as_ref().map(|field| self.unknown_var(field)),
                params: decl.params.iter().map(|field| self.unknown_var(field)).collect(),
                returns: decl.returns.iter().map(|field| self.unknown_var(field)).collect(),
            };
        };

        Signature {
            receiver: decl.receiver.as_ref().map(|field| self.var(&registry, field)),
            params: decl.params.iter().map(|field| self.var(&registry, field)).collect(),
            returns: decl.returns.iter().map(|field| self.var(&registry, field)).collect(),
        }
    }

    fn var(&self, registry: &RegistryInner, field: &FieldDecl) -> Var {
        let (ty, kind) = self.walk(registry, &field.shape, &self.package, VarKind::default());
        Var::new(self.field_decl(field), field.shape.clone(), ty, kind)
    }

    fn unknown_var(&self, field: &FieldDecl) -> Var {
        Var::new(self.field_decl(field), field.shape.clone(), None, VarKind::unknown())
    }

    fn field_decl(&self, field: &FieldDecl) -> Decl {
        Decl::new(
            field.name.clone().unwrap_or_default(),
            field.doc.clone(),
            self.directives.clone(),
        )
    }

    /// Walk a shape outside-in, accumulating qualifiers until a named type
    fn walk(
        &self,
        registry: &RegistryInner,
        shape: &Shape,
        package: &Arc<Package>,
        kind: VarKind,
    ) -> (Option<Arc<Type>>, VarKind) {
        match shape {
            Shape::Named {
                package: Some(qualifier),
                name,
            } => match self.imports.get(qualifier) {
                Some(imported) => self.walk(registry, &Shape::named(name.as_str()), imported, kind),
                None => {
                    log::debug!("Unknown package qualifier {qualifier} in {shape}");
                    (None, VarKind::unknown())
                }
            },
            Shape::Named {
                package: None,
                name,
            } => {
                let ty = registry.ty(Some(package), name);
                let kind = if ty.is_builtin() {
                    kind.with_builtin()
                } else {
                    kind.with_ident()
                };
                (Some(ty), kind)
            }
            Shape::Pointer { elem } => {
                let kind = if kind.slice {
                    kind.with_slice_of_pointer()
                } else {
                    kind.with_pointer()
                };
                self.walk(registry, elem, package, kind)
            }
            Shape::Slice { elem } => self.walk(registry, elem, package, kind.with_slice()),
            Shape::Map { value, .. } => self.walk(registry, value, package, kind.with_map()),
            Shape::Unsupported { text } => {
                log::debug!("Unsupported shape {text:?}");
                (None, VarKind::unknown())
            }
        }
    }
}
