pub mod settings_struct;
pub mod toml_settings;

pub use settings_struct::{
    update_settings_from_content, update_settings_from_file, Settings, SettingsError,
};
