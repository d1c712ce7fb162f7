//! Plan assembly: the creator seam, registries, and the fixpoint driver.

mod creator;
mod driver;
mod registry;

pub use creator::{CreatorContext, PlanCreator};
pub use driver::{AssemblyDriver, AssemblyOptions};
pub use registry::CreatorRegistry;
