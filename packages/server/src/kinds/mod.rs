//! Per-kind wiring of the dual-write lifecycle: field structs and the
//! relational operations for each resource kind.

pub mod assignment;
pub mod attempt;
pub mod template;

pub use assignment::Assignment;
pub use attempt::Attempt;
pub use template::Template;
