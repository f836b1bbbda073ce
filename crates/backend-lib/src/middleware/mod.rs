// crates/backend-lib/src/middleware/mod.rs

//! Request middleware: token authentication and route-policy enforcement.
//!
//! Order on every request: [`authenticate`] attaches an [`AuthContext`](crate::auth::AuthContext),
//! then [`enforce_route_policy`] turns an unauthenticated request for a protected
//! path into the entry-point 401.

pub mod authenticate;
pub mod extract;
pub mod policy;

pub use authenticate::{authenticate, bearer_token};
pub use extract::CurrentUser;
pub use policy::enforce_route_policy;

#[cfg(test)]
mod middleware_tests;
