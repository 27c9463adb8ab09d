// OAL - OpenAL-style audio bindings

pub mod config;
pub mod logging;
pub mod oal;
pub mod sound;

#[doc(hidden)]
pub use log as __log;

pub use config::{load_config, OalConfig, SetErrorPolicy};
pub use logging::LogLevel;
pub use oal::{
    BufferHandle, HandleKind, InitError, Oal, OalError, PcmInfo, PlaybackParams, SourceHandle,
};
pub use sound::{AlError, BufferFormat, DeviceKind, MixerQuality, SourceState};
