use crate::error::{ApiError, Result};
use ease_parser::{Directive, Func, Var};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const METHOD_PARAM: &str = "method";
const PATH_PARAM: &str = "path";

/// HTTP method accepted by the `api` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Options,
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    /// Parse an upper-case method name
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPTIONS" => Some(Self::Options),
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PATCH" => Some(Self::Patch),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a handler parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    /// Route segment, `:id` or `{id}`
    Path,
    /// Query string, GET handlers only
    Query,
    /// Request body
    Body,
}

/// A handler parameter bound to a request part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointParam {
    pub name: String,
    pub source: ParamSource,
    /// Position in the handler parameter list
    pub position: usize,
}

/// One annotated handler
#[derive(Debug, Clone)]
pub struct Endpoint {
    handler: Arc<Func>,
    method: Method,
    path: String,
    params: Vec<EndpointParam>,
    response: Option<usize>,
}

impl Endpoint {
    /// Build an endpoint from a handler and its `api` directive
    pub fn parse(handler: Arc<Func>, directive: &Directive) -> Result<Self> {
        let method = match directive.param(METHOD_PARAM) {
            None => Method::Get,
            Some(value) => Method::parse(value).ok_or_else(|| ApiError::InvalidMethod {
                handler: handler.fqn().to_string(),
                method: value.to_string(),
            })?,
        };

        let path = match directive.param(PATH_PARAM) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => {
                return Err(ApiError::InvalidPath {
                    handler: handler.fqn().to_string(),
                })
            }
        };

        let params = handler
            .params()
            .iter()
            .enumerate()
            .filter(|(_, param)| !param.is_context())
            .map(|(position, param)| EndpointParam {
                name: param.name().to_string(),
                source: param_source(&path, method, param.name()),
                position,
            })
            .collect();

        let response = handler.returns().iter().position(|ret| !ret.is_error());

        Ok(Self {
            handler,
            method,
            path,
            params,
            response,
        })
    }

    pub fn handler(&self) -> &Arc<Func> {
        &self.handler
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request-bound parameters, `context.Context` excluded
    pub fn params(&self) -> &[EndpointParam] {
        &self.params
    }

    /// Handler variable behind an endpoint parameter
    pub fn param_var(&self, param: &EndpointParam) -> Option<&Var> {
        self.handler.params().get(param.position)
    }

    /// First non-error return of the handler
    pub fn response(&self) -> Option<&Var> {
        self.response
            .and_then(|position| self.handler.returns().get(position))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

fn param_source(path: &str, method: Method, name: &str) -> ParamSource {
    if !name.is_empty() && path_has_param(path, name) {
        ParamSource::Path
    } else if method == Method::Get {
        ParamSource::Query
    } else {
        ParamSource::Body
    }
}

/// Whether a path segment is `:name` or `{name}`
fn path_has_param(path: &str, name: &str) -> bool {
    path.split('/').any(|segment| {
        segment.strip_prefix(':') == Some(name)
            || segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                == Some(name)
    })
}
