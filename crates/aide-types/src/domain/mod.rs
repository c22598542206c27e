pub mod ingest;
pub mod message;
pub mod session;
pub mod usage;

pub use ingest::*;
pub use message::*;
pub use session::*;
pub use usage::*;
