pub mod fact_provider;

pub use fact_provider::{
    FactError, FactOutcome, FactProvider, HttpFactProvider, MockFactProvider, FALLBACK_FACT,
};
