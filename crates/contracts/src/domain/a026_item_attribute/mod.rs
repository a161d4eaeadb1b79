pub mod aggregate;
pub mod catalog;

pub use aggregate::{AttributeMeta, AttributeSlot, AttributeType, AttributeTypeId, AttributeValue};
pub use catalog::AttributeCatalog;
