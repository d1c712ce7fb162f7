//! Plan model and the fragment merger.
//!
//! A plan is assembled from [`PlanFragment`]s produced by independent
//! creators; [`PlanAccumulator`] folds them into one consistent node set,
//! layout, patch set, and shared context.

mod accumulator;
mod fragment;
mod layout;
mod node;

pub use accumulator::{AssembledPlan, PlanAccumulator};
pub use fragment::{Dependency, PlanFragment};
pub use layout::{GraphLayout, LayoutNode};
pub use node::PlanNode;
