//! Lagrangian relaxation of the Hess model: multiplier evaluation,
//! subgradient ascent, and bound-based safe variable fixing.

mod ascent;
mod fixing;
mod relax;

pub(crate) use ascent::{AscentReport, ascend};
pub(crate) use fixing::deduce_fixings;
pub(crate) use relax::{Evaluation, Relaxation};
