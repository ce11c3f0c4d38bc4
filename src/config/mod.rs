/// Application settings loaded from config.toml and the environment
pub mod settings;

pub use settings::{
    DisplaySettings, Settings, StorageSettings, load_default_settings, load_settings,
};
