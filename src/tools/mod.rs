pub mod doc;
pub mod executor;
pub mod registry;

pub use doc::{DocClient, DocResponse, LinuxDocTool, SearchInDocTool};
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry};
