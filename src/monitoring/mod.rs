pub mod currency_registry;

pub use currency_registry::CurrencyRegistry;
