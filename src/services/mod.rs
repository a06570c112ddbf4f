pub mod comparison;
pub mod favorites;
pub mod metrics;
pub mod providers;

pub use comparison::{ComparisonSlotStore, Slot, SlotPair};
pub use favorites::FavoritesStore;
pub use metrics::ComparisonReport;
pub use providers::{MovieProvider, OmdbProvider};
