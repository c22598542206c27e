pub mod domain;
pub mod tool;

pub use domain::*;
pub use tool::*;
