pub mod common;
pub mod items;
pub mod response;
pub mod tools;

pub use common::{ArbitraryJson, DEFAULT_MODEL, ItemStatus, JsonSchema, Metadata, Role};
pub use items::{ContentPart, Item};
pub use response::{Response, ResponseStatus, ResponseStatusDetails};
pub use tools::{Tool, ToolChoice, ToolChoiceMode};
