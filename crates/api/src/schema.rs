use crate::endpoint::Endpoint;
use crate::error::Result;
use ease_collection::Set;
use ease_parser::{Package, Registry, Resolution, Type};
use std::sync::Arc;

/// Name of the directive marking a handler
pub const API_DIRECTIVE: &str = "api";

/// Every annotated endpoint of a registry
#[derive(Debug, Clone, Default)]
pub struct Api {
    endpoints: Vec<Endpoint>,
}

/// What an emitter needs to build the services behind the endpoints
#[derive(Debug, Clone)]
pub struct ServicePlan {
    /// Receiver types of the handlers, first-seen order
    pub services: Vec<Arc<Type>>,

    /// Constructor calls building every service
    pub resolution: Resolution,

    /// Packages referenced by handlers and constructors
    pub imports: Vec<Arc<Package>>,
}

impl Api {
    /// Collect every exported function carrying an `api` directive
    pub fn from_registry(registry: &Registry) -> Result<Self> {
        let mut endpoints = Vec::new();

        for func in registry.funcs() {
            if !func.is_exported() {
                continue;
            }

            let Some(directive) = func.directive(API_DIRECTIVE).cloned() else {
                continue;
            };

            let endpoint = Endpoint::parse(func, &directive)?;
            log::debug!("Endpoint {endpoint} -> {}", endpoint.handler().fqn());
            endpoints.push(endpoint);
        }

        log::info!("Found {} endpoints", endpoints.len());
        Ok(Self { endpoints })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Receiver types of method handlers, deduplicated
    pub fn services(&self) -> Vec<Arc<Type>> {
        let services = Set::new();

        for endpoint in &self.endpoints {
            if let Some(ty) = endpoint.handler().receiver().and_then(|recv| recv.ty()) {
                services.set(ty.fqn(), ty.clone());
            }
        }

        services.items()
    }

    /// Packages of handler params and receivers, deduplicated
    pub fn imports(&self) -> Vec<Arc<Package>> {
        let imports = Set::new();

        for endpoint in &self.endpoints {
            let handler = endpoint.handler();
            let types = handler
                .params()
                .iter()
                .chain(handler.receiver())
                .filter_map(|var| var.ty());

            for ty in types {
                if let Some(package) = ty.package() {
                    imports.set(package.path(), package.clone());
                }
            }
        }

        imports.items()
    }

    /// Resolve the constructors of every service
    pub fn plan(&self, registry: &Registry) -> Result<ServicePlan> {
        let services = self.services();
        let resolution = registry.resolve(&services)?;

        let imports = Set::new();
        for package in self.imports() {
            imports.set(package.path(), package.clone());
        }
        for func in resolution.funcs() {
            imports.set(func.package().path(), func.package().clone());
        }

        Ok(ServicePlan {
            services,
            resolution,
            imports: imports.items(),
        })
    }
}
