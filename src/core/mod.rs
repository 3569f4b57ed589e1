pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod state;

pub use config::Config;
pub use error::{FetchError, StorageError};
pub use health::{HealthStatus, SourceHealth, SourceOutcome};
pub use state::{BuyReady, ListingState, StopSignal};
