pub mod apartment;
pub mod cluster;
pub mod dashboard;
pub mod history;
pub mod metrics;
pub mod prediction;
pub mod settings;
pub mod visualization;

pub use apartment::*;
pub use cluster::*;
pub use dashboard::*;
pub use history::*;
pub use metrics::*;
pub use prediction::*;
pub use settings::*;
pub use visualization::*;
