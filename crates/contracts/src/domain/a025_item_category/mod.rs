pub mod aggregate;
pub mod tree;

pub use aggregate::{Category, CategoryId, GrammaticalGender, ItemKind, DEFAULT_UNIT};
pub use tree::{CategoryTree, DeepLinkTarget};
