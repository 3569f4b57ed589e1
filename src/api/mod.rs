pub mod gateio;
pub mod types;

pub use gateio::{CurrencyProvider, GateIoClient};
pub use types::*;
