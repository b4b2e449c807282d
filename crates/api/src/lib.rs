//! # Ease API
//!
//! Reads `api` directives off exported handlers and turns them into
//! [`Endpoint`]s: HTTP method, route, where each parameter comes from and the
//! response slot.
//!
//! ```text
//! //ease:api method=POST path=/api/todos/:id
//! func (s *TodoService) Update(ctx context.Context, id string, cmd UpdateCmd) (Todo, error)
//!
//!   POST /api/todos/:id
//!     id  ← path
//!     cmd ← body
//!     → Todo
//! ```
//!
//! [`Api::plan`] resolves the constructors of every handler receiver so an
//! emitter can build the services before wiring routes.

mod endpoint;
mod error;
mod schema;

pub use endpoint::{Endpoint, EndpointParam, Method, ParamSource};
pub use error::{ApiError, Result};
pub use schema::{Api, ServicePlan, API_DIRECTIVE};
