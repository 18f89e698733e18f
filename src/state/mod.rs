pub mod directory;
pub mod graph;
pub mod session;

pub use directory::ChannelDirectory;
pub use graph::WorkflowGraph;
pub use session::{ChatSession, PendingSend};
