pub mod delivery_stats;

pub use delivery_stats::{DeliveryStats, DeliveryStatsSnapshot};
