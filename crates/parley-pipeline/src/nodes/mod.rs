//! The five pipeline nodes, in their fixed execution order.

mod context;
mod generate;
mod history;
mod postprocess;
mod validate;

pub use context::PrepareContext;
pub use generate::Generate;
pub use history::UpdateHistory;
pub use postprocess::Postprocess;
pub use validate::Validate;
