pub mod options;
pub mod path;
pub mod proof;
pub mod tree;

pub use options::TreeOptions;
pub use path::{LEFT, Path, RIGHT, Step};
pub use proof::Proof;
pub use tree::Tree;
