mod plan;

pub use plan::Plan;
pub(crate) use plan::{assignment_cost, centers_of, districts_of, is_feasible};
