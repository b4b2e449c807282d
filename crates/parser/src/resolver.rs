use crate::config::ProducerPolicy;
use crate::error::{ParserError, Result};
use crate::func::Func;
use crate::types::Type;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered constructor calls satisfying a set of target types
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    ordered: Vec<Arc<Func>>,
    producers: HashMap<String, Arc<Func>>,
    dependencies: HashMap<String, Vec<String>>,
}

impl Resolution {
    /// Producers in call order, dependencies first
    pub fn funcs(&self) -> &[Arc<Func>] {
        &self.ordered
    }

    /// Producer chosen for a type fqn
    pub fn producer(&self, ty: &str) -> Option<&Arc<Func>> {
        self.producers.get(ty)
    }

    /// Fqns of the producers a producer consumes
    pub fn dependencies(&self, func: &str) -> &[String] {
        self.dependencies.get(func).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, func: &str) -> bool {
        self.ordered.iter().any(|f| f.fqn() == func)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Producer graph, edges point from a dependency to its consumer
    pub fn dependency_graph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for func in &self.ordered {
            nodes.insert(func.fqn(), graph.add_node(func.fqn().to_string()));
        }

        for func in &self.ordered {
            for dependency in self.dependencies(func.fqn()) {
                if let (Some(&from), Some(&to)) =
                    (nodes.get(dependency.as_str()), nodes.get(func.fqn()))
                {
                    graph.update_edge(from, to, ());
                }
            }
        }

        graph
    }
}

/// Finds constructors for types and orders them dependency-first
#[derive(Debug, Clone)]
pub struct Resolver {
    funcs: Vec<Arc<Func>>,
    policy: ProducerPolicy,
}

impl Resolver {
    /// `funcs` is the candidate set, in the order used by
    /// [`ProducerPolicy::FirstRegistered`]
    pub fn new(funcs: Vec<Arc<Func>>, policy: ProducerPolicy) -> Self {
        Self { funcs, policy }
    }

    pub fn policy(&self) -> ProducerPolicy {
        self.policy
    }

    /// Every candidate returning `ty`
    pub fn candidates(&self, ty: &Arc<Type>) -> Vec<&Arc<Func>> {
        self.funcs.iter().filter(|func| func.produces(ty)).collect()
    }

    /// Producer for `ty` under the configured policy
    pub fn producer_for(&self, ty: &Arc<Type>) -> Result<Arc<Func>> {
        self.pick(ty, None)
    }

    pub fn resolve(&self, targets: &[Arc<Type>]) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        self.resolve_into(&mut resolution, targets)?;
        Ok(resolution)
    }

    /// Extend an existing resolution
    ///
    /// On error `resolution` is left exactly as it was passed in.
    pub fn resolve_into(&self, resolution: &mut Resolution, targets: &[Arc<Type>]) -> Result<()> {
        let mut working = resolution.clone();
        let mut stack = Vec::new();

        for target in targets {
            self.visit(target, None, &mut working, &mut stack)?;
        }

        log::info!(
            "Resolved {} targets with {} constructors",
            targets.len(),
            working.len()
        );

        *resolution = working;
        Ok(())
    }

    fn visit(
        &self,
        ty: &Arc<Type>,
        required_by: Option<&Func>,
        resolution: &mut Resolution,
        stack: &mut Vec<Arc<Type>>,
    ) -> Result<()> {
        if resolution.producers.contains_key(ty.fqn()) {
            return Ok(());
        }

        if let Some(position) = stack.iter().position(|seen| Arc::ptr_eq(seen, ty)) {
            let mut chain: Vec<String> = stack[position..]
                .iter()
                .map(|seen| seen.fqn().to_string())
                .collect();
            chain.push(ty.fqn().to_string());
            return Err(ParserError::CircularDependency { chain });
        }

        let producer = self.pick(ty, required_by)?;
        log::debug!("{} is produced by {}", ty.fqn(), producer.fqn());

        stack.push(ty.clone());
        let mut dependencies = Vec::new();
        for param in producer.params() {
            let Some(param_ty) = param.ty() else {
                return Err(ParserError::missing_constructor(
                    param.shape().to_string(),
                    Some(producer.fqn()),
                ));
            };

            self.visit(param_ty, Some(&producer), resolution, stack)?;

            if let Some(dependency) = resolution.producers.get(param_ty.fqn()) {
                if !dependencies.iter().any(|d: &String| d == dependency.fqn()) {
                    dependencies.push(dependency.fqn().to_string());
                }
            }
        }
        stack.pop();

        resolution
            .producers
            .insert(ty.fqn().to_string(), producer.clone());
        if !resolution.contains(producer.fqn()) {
            resolution
                .dependencies
                .insert(producer.fqn().to_string(), dependencies);
            resolution.ordered.push(producer);
        }

        Ok(())
    }

    fn pick(&self, ty: &Arc<Type>, required_by: Option<&Func>) -> Result<Arc<Func>> {
        let candidates = self.candidates(ty);

        match (candidates.as_slice(), self.policy) {
            ([], _) => Err(ParserError::missing_constructor(
                ty.fqn(),
                required_by.map(Func::fqn),
            )),
            ([only], _) => Ok((*only).clone()),
            ([first, ..], ProducerPolicy::FirstRegistered) => {
                log::debug!(
                    "{} candidates for {}, using {}",
                    candidates.len(),
                    ty.fqn(),
                    first.fqn()
                );
                Ok((*first).clone())
            }
            (_, ProducerPolicy::RejectAmbiguous) => Err(ParserError::AmbiguousConstructor {
                ty: ty.fqn().to_string(),
                candidates: candidates.iter().map(|f| f.fqn().to_string()).collect(),
            }),
        }
    }
}
