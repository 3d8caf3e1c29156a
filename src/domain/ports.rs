use crate::domain::definition::Definition;
use crate::domain::entity::{Function, Inspection};
use anyhow::Result;

/// Inspection source port (implemented by Infrastructure)
pub trait InspectionSource: Send + Sync {
    fn load(&self) -> Result<Inspection>;

    /// Human-readable origin, e.g. a file path.
    fn describe(&self) -> String;
}

/// Generator callback bound to one directive identifier (e.g. `chariot.route`).
pub trait Processor: Send + Sync {
    fn identifier(&self) -> &str;

    /// Renders output for one definition found on `function`.
    fn process(&self, definition: &Definition, function: &Function) -> Result<String>;
}
