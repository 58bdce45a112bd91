//! The Hess assignment model: cost oracle, variable-fixing tables, and
//! the restricted/full MIP builders.

mod cost;
mod fixing;
mod model;

pub use cost::cost_matrix;
pub use fixing::{FixingStats, FixingTables};
pub(crate) use model::{Cell, Column, FullModel, RestrictedModel};
