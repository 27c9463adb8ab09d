//! Native audio layer.
//!
//! - `mixer` - OpenAL-like object model and software mixer
//! - `context` - Output device and rendering context
//! - `rodio_output` - Default-device output via rodio (feature `playback`)

pub mod context;
pub mod mixer;
#[cfg(feature = "playback")]
pub mod rodio_output;

pub use context::{Context, Device, DeviceError, DeviceKind};
pub use mixer::{AlError, BufferFormat, MixerQuality, SourceState};
