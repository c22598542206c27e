pub mod discovery;
pub mod io;
pub mod parser;
pub(crate) mod schema;
pub mod tool_mapping;
