// mod.rs - Audio mixer module

//! OpenAL-like software audio library.
//!
//! This is the "native" layer the handle bindings in [`crate::oal`] sit on.
//! It keeps the OpenAL object model: integer source and buffer names, a
//! sticky error slot, and the per-source state machine.
//!
//! # Architecture
//!
//! - `types` - Error codes, formats, states and property tokens
//! - `buffer` - PCM buffer objects
//! - `source` - Source objects and their state machine
//! - `resample` - Fractional-position sample readers
//! - `mix` - Object tables and the mixing loop

pub mod buffer;
pub mod mix;
pub mod resample;
pub mod source;
pub mod types;

pub use buffer::MixerBuffer;
pub use mix::{pan_gains, MixerState, OUTPUT_CHANNELS};
pub use source::MixerSource;
pub use types::{
    AlError, BufferFormat, BufferProp, MixerQuality, SourceProp, SourceState,
    DEFAULT_MAX_SOURCES, RATE_BASIC, RATE_DEFAULT, RATE_HIGH, RATE_LOW, RATE_MID,
};
