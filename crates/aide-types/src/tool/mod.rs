mod call;
mod kind;

pub use call::ToolCall;
pub use kind::ToolKind;
