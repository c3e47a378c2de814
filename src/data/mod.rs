pub mod loader;
pub mod types;

pub use loader::{DailyInputs, DataStore, LoadError};
