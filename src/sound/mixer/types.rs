// types.rs - Core types and enums for the audio mixer

//! Core types and enumerations for the OpenAL-like audio mixer.
//!
//! Enum discriminants carry the OpenAL token values so they can cross the
//! C surface unchanged.

use std::fmt;

/// Named mixer output rates
pub const RATE_HIGH: u32 = 44100;
pub const RATE_MID: u32 = 22050;
pub const RATE_LOW: u32 = 16000;
pub const RATE_BASIC: u32 = 8000;
pub const RATE_DEFAULT: u32 = RATE_HIGH;

/// Default upper bound on live sources per context
pub const DEFAULT_MAX_SOURCES: usize = 256;

/// Scale factor from i16 samples to [-1.0, 1.0]
pub const SINT16_SCALE: f32 = 32768.0;

/// Mixer error codes (compatible with OpenAL error codes)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlError {
    NoError = 0,
    InvalidName = 0xA001,
    InvalidEnum = 0xA002,
    InvalidValue = 0xA003,
    InvalidOperation = 0xA004,
    OutOfMemory = 0xA005,
}

impl AlError {
    /// Convert to raw u32 error code
    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            AlError::NoError => "AL_NO_ERROR",
            AlError::InvalidName => "AL_INVALID_NAME",
            AlError::InvalidEnum => "AL_INVALID_ENUM",
            AlError::InvalidValue => "AL_INVALID_VALUE",
            AlError::InvalidOperation => "AL_INVALID_OPERATION",
            AlError::OutOfMemory => "AL_OUT_OF_MEMORY",
        }
    }
}

impl fmt::Display for AlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.to_u32())
    }
}

/// PCM buffer format
///
/// 8-bit data is unsigned, 16-bit data is signed little-endian.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFormat {
    Mono8 = 0x1100,
    Mono16 = 0x1101,
    Stereo8 = 0x1102,
    Stereo16 = 0x1103,
}

impl BufferFormat {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x1100 => Some(BufferFormat::Mono8),
            0x1101 => Some(BufferFormat::Mono16),
            0x1102 => Some(BufferFormat::Stereo8),
            0x1103 => Some(BufferFormat::Stereo16),
            _ => None,
        }
    }

    /// Bytes per channel sample
    pub fn bytes_per_channel(self) -> u32 {
        match self {
            BufferFormat::Mono8 | BufferFormat::Stereo8 => 1,
            BufferFormat::Mono16 | BufferFormat::Stereo16 => 2,
        }
    }

    pub fn channels(self) -> u32 {
        match self {
            BufferFormat::Mono8 | BufferFormat::Mono16 => 1,
            BufferFormat::Stereo8 | BufferFormat::Stereo16 => 2,
        }
    }

    /// Size of one frame (all channels) in bytes
    pub fn frame_size(self) -> usize {
        (self.bytes_per_channel() * self.channels()) as usize
    }
}

/// Source playback state
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Initial = 0x1011,
    Playing = 0x1012,
    Paused = 0x1013,
    Stopped = 0x1014,
}

impl SourceState {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x1011 => Some(SourceState::Initial),
            0x1012 => Some(SourceState::Playing),
            0x1013 => Some(SourceState::Paused),
            0x1014 => Some(SourceState::Stopped),
            _ => None,
        }
    }
}

/// Mixer quality level (affects resampling algorithm)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixerQuality {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

/// Source properties (compatible with OpenAL)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceProp {
    Pitch = 0x1003,
    Position = 0x1004,
    Looping = 0x1007,
    Buffer = 0x1009,
    Gain = 0x100A,
    SourceState = 0x1010,
    SampleOffset = 0x1025,
}

/// Buffer properties (compatible with OpenAL)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferProp {
    Frequency = 0x2001,
    Bits = 0x2002,
    Channels = 0x2003,
    Size = 0x2004,
}
