//! Reusable widget components.

pub mod detail;
pub mod filter;
pub mod graph;
pub mod skeleton;
pub mod status;

pub use detail::DetailPanel;
pub use filter::{FilterBar, FilterOption};
pub use graph::GraphCanvas;
pub use skeleton::Skeleton;
pub use status::StatusIndicator;
