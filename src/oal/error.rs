//! Error types surfaced to callers of the bindings.

use std::fmt;

use crate::sound::mixer::AlError;

/// Device/context bring-up failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("no device: {0}")]
    NoDevice(String),

    #[error("openal context error: {0}")]
    Context(String),
}

/// Which kind of handle a creation call was making
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Source,
    Buffer,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Source => f.write_str("source"),
            HandleKind::Buffer => f.write_str("bufferid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OalError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error("create {kind} error[{code}]")]
    Create { kind: HandleKind, code: AlError },

    #[error("bind buffer error[{code}]")]
    Bind { code: AlError },

    #[error("clear error source id[{id}]")]
    Clear { id: u32 },

    #[error("posting bad OpenAL context message")]
    ContextLost,

    #[error("set error source id[{id}]: {code}")]
    Set { id: u32, code: AlError },

    #[error("free error {kind} id[{id}]")]
    Free { kind: HandleKind, id: u32 },

    #[error("buffer id[{id}] is still bound to a source")]
    BufferInUse { id: u32 },
}

impl OalError {
    /// Status code used by the C surface
    pub fn status(&self) -> i32 {
        match self {
            OalError::Init(_) => -1,
            OalError::Create { .. } => -2,
            OalError::Bind { .. } => -3,
            OalError::Clear { .. } => -4,
            OalError::ContextLost => -5,
            OalError::Set { .. } => -6,
            OalError::Free { .. } => -7,
            OalError::BufferInUse { .. } => -8,
        }
    }
}
