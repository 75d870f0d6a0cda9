pub mod record;
pub mod store;

pub use record::{StatsRecord, VisitorRecord};
pub use store::{Recorded, StatsError, StatsStore};
