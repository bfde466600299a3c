//! Reconciliation of local pages against remote posts.
//!
//! Pages are matched to posts by their (slug, collection) key. Planning is
//! pure: it reads a listing snapshot and produces actions, and executing
//! them is left to [`crate::sync`].

pub mod equality;
pub mod plan;
pub mod pool;

pub use equality::{eq_params, eq_post};
pub use plan::{Action, DuplicateSlug, PagePlan, Plan, Planner, PostRef};
pub use pool::RemotePool;
