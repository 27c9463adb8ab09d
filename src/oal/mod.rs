//! OpenAL-subset bindings for an embedding runtime.
//!
//! [`Oal`] brings up a device and context; [`SourceHandle`] and
//! [`BufferHandle`] own native object ids and give them back on drop.
//! The `ffi` module exposes the same operations to C.

pub mod binding;
pub mod error;
pub mod ffi;
pub mod handle;

pub use binding::{Oal, PcmInfo, PlaybackParams};
pub use error::{HandleKind, InitError, OalError};
pub use handle::{BufferHandle, SourceHandle};
