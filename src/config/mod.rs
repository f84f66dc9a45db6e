//! Configuration document model and persistence.

mod store;
mod types;

pub use store::{ConfigSource, FileConfigSource, LoadedConfig, StoreError};
pub use types::{
    canonical_key, keys_match, ConfigEntry, ConfigFile, ConfigGroup, DefaultConfig, ModelEntry,
    Provider, ProviderEnv,
};
