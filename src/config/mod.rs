//! # Configuration
//!
//! Decoding, binding and locating the build configuration.
//!
//! ## Formats
//!
//! | Format | Extensions | Decoder |
//! |--------|------------|---------|
//! | TOML | `.toml` | [`TomlDecoder`] |
//! | JSON | `.json` | [`JsonDecoder`] |
//!
//! ## Document Shape
//!
//! ```text
//! budg
//! ├── rules[]            ordered build steps
//! │   ├── plugin         name of a plugins entry
//! │   └── options        per-rule options (plugin-defined)
//! └── plugins.<name>
//!     ├── source         reference string, e.g. budg.plugins.copier:CopierPlugin
//!     └── config         plugin config (plugin-defined)
//! ```
//!
//! ## Key Types
//!
//! - [`ConfigLoader`] - Resolves `--config` / `--config-format` to a [`LoadedConfig`]
//! - [`DecoderRegistry`] - Available decoders, in probing order
//! - [`Config`] - Typed root of the document

mod decoder;
mod loader;
mod model;

pub use decoder::{Decoder, DecoderError, DecoderRegistry, JsonDecoder, TomlDecoder};
pub use loader::{
    ConfigError, ConfigLoader, LoadedConfig, CONFIG_STEM, DEFAULT_CONFIG_FORMAT, STDIN_PATH,
};
pub use model::{BudgConfig, BudgConfigPlugin, BudgConfigRule, Config};
