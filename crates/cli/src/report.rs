use ease_api::{Api, Endpoint, Method, ParamSource, ServicePlan};
use ease_parser::{Decl, Func, Package, Registry, Resolution, Type, Var, VarKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub packages: Vec<PackageView>,
    pub types: Vec<TypeView>,
    pub funcs: Vec<FuncView>,
}

#[derive(Debug, Serialize)]
pub struct PackageView {
    pub path: String,
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Serialize)]
pub struct TypeView {
    pub fqn: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub declared: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub directives: Directives,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FuncView {
    pub fqn: String,
    pub name: String,
    pub package: String,
    pub exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<VarView>,
    pub params: Vec<VarView>,
    pub returns: Vec<VarView>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub directives: Directives,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VarView {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub shape: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    pub kind: VarKind,
}

/// Directive params by directive name, sorted for stable output
pub type Directives = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub targets: Vec<String>,
    pub constructors: Vec<StepView>,
}

/// One constructor call of a resolution
#[derive(Debug, Serialize)]
pub struct StepView {
    pub func: String,
    pub produces: Vec<String>,
    pub depends_on: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiReport {
    pub endpoints: Vec<EndpointView>,
    pub services: Vec<String>,
    pub imports: Vec<PackageView>,
    pub constructors: Vec<StepView>,
}

#[derive(Debug, Serialize)]
pub struct EndpointView {
    pub method: Method,
    pub path: String,
    pub handler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub params: Vec<EndpointParamView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<VarView>,
}

#[derive(Debug, Serialize)]
pub struct EndpointParamView {
    pub name: String,
    pub source: ParamSource,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

impl InspectReport {
    pub fn build(registry: &Registry) -> Self {
        let funcs: Vec<FuncView> = registry
            .funcs()
            .iter()
            .map(|f| FuncView::from_func(f))
            .collect();

        let mut packages: Vec<PackageView> = registry
            .packages()
            .iter()
            .map(|p| PackageView::from_package(p))
            .collect();
        packages.sort_by(|a, b| a.path.cmp(&b.path));

        let mut types: Vec<TypeView> = registry
            .types()
            .iter()
            .map(|t| TypeView::from_type(t))
            .collect();
        types.sort_by(|a, b| a.fqn.cmp(&b.fqn));

        Self {
            packages,
            types,
            funcs,
        }
    }
}

impl PackageView {
    fn from_package(package: &Package) -> Self {
        Self {
            path: package.path().to_string(),
            name: package.name().to_string(),
            alias: package.alias().to_string(),
        }
    }
}

impl TypeView {
    fn from_type(ty: &Type) -> Self {
        let declaration = ty.declaration();
        Self {
            fqn: ty.fqn().to_string(),
            name: ty.name().to_string(),
            package: ty.package().map(|p| p.path().to_string()),
            kind: ty.kind().map(|k| k.as_str()),
            declared: declaration.is_some(),
            doc: ty.doc().to_string(),
            directives: declaration.map(|d| directives(&d.decl)).unwrap_or_default(),
            file: declaration.and_then(|d| d.file.clone()),
        }
    }
}

impl FuncView {
    fn from_func(func: &Func) -> Self {
        Self {
            fqn: func.fqn().to_string(),
            name: func.name().to_string(),
            package: func.package().path().to_string(),
            exported: func.is_exported(),
            receiver: func.receiver().map(VarView::from_var),
            params: func.params().iter().map(VarView::from_var).collect(),
            returns: func.returns().iter().map(VarView::from_var).collect(),
            doc: func.doc().to_string(),
            directives: directives(func.decl()),
            file: func.file().map(str::to_string),
        }
    }
}

impl VarView {
    fn from_var(var: &Var) -> Self {
        Self {
            name: var.name().to_string(),
            shape: var.shape().to_string(),
            ty: var.ty().map(|t| t.fqn().to_string()),
            kind: var.kind(),
        }
    }
}

impl ResolveReport {
    pub fn build(targets: &[Arc<Type>], resolution: &Resolution) -> Self {
        Self {
            targets: targets.iter().map(|t| t.fqn().to_string()).collect(),
            constructors: steps(resolution),
        }
    }
}

impl ApiReport {
    pub fn build(api: &Api, plan: &ServicePlan) -> Self {
        Self {
            endpoints: api.endpoints().iter().map(EndpointView::from_endpoint).collect(),
            services: plan.services.iter().map(|t| t.fqn().to_string()).collect(),
            imports: plan.imports.iter().map(|p| PackageView::from_package(p)).collect(),
            constructors: steps(&plan.resolution),
        }
    }
}

impl EndpointView {
    fn from_endpoint(endpoint: &Endpoint) -> Self {
        let handler = endpoint.handler();
        Self {
            method: endpoint.method(),
            path: endpoint.path().to_string(),
            handler: handler.fqn().to_string(),
            service: handler
                .receiver()
                .and_then(|r| r.ty())
                .map(|t| t.fqn().to_string()),
            params: endpoint
                .params()
                .iter()
                .map(|param| EndpointParamView {
                    name: param.name.clone(),
                    source: param.source,
                    ty: endpoint
                        .param_var(param)
                        .and_then(|v| v.ty())
                        .map(|t| t.fqn().to_string()),
                })
                .collect(),
            response: endpoint.response().map(VarView::from_var),
        }
    }
}

fn steps(resolution: &Resolution) -> Vec<StepView> {
    resolution
        .funcs()
        .iter()
        .map(|func| StepView {
            func: func.fqn().to_string(),
            produces: func
                .produced_types()
                .iter()
                .map(|t| t.fqn().to_string())
                .collect(),
            depends_on: resolution.dependencies(func.fqn()).to_vec(),
        })
        .collect()
}

fn directives(decl: &Decl) -> Directives {
    decl.directives()
        .iter()
        .map(|(name, directive)| {
            let params = directive
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            (name.clone(), params)
        })
        .collect()
}
