pub mod controller;
pub mod node;

pub use controller::{ModalResponse, OperationUi};
pub use node::{AccountNode, TreeNode};
