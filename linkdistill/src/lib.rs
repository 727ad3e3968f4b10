pub mod config;
pub mod errors;
pub mod extract;
pub mod filters;
pub mod metrics;
pub mod output;
pub mod results;

pub use config::{ConfigOverrides, DistillConfig};
pub use errors::{DistillError, DistillResult};
pub use extract::{distill, DistillSummary};
pub use results::{Record, ResultSet};
