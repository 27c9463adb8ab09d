// buffer.rs - Audio buffer management

//! Audio buffer objects for the mixer.
//!
//! A buffer holds PCM data converted to interleaved signed 16-bit samples.
//! Buffers are filled once and may then be attached to any number of sources.

use crate::sound::mixer::types::*;

/// Largest upload `AL_SIZE` can report
pub const MAX_UPLOAD_BYTES: usize = i32::MAX as usize;

/// Audio buffer containing PCM data
#[derive(Debug, Clone, Default)]
pub struct MixerBuffer {
    /// Format of the last upload, `None` until filled
    pub format: Option<BufferFormat>,
    /// Sample rate of the data in Hz
    pub frequency: u32,
    /// Interleaved samples, converted to i16
    pub samples: Vec<i16>,
    /// Original byte size of the upload
    pub size: u32,
    /// Number of sources that currently have this buffer attached
    pub attached: u32,
}

impl MixerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> u32 {
        self.format.map(BufferFormat::channels).unwrap_or(1)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels() as usize
    }

    pub fn is_filled(&self) -> bool {
        self.format.is_some()
    }

    /// Upload `size` bytes of `data` in `format` at `freq` Hz.
    pub fn fill(
        &mut self,
        format: BufferFormat,
        data: &[u8],
        size: usize,
        freq: u32,
    ) -> Result<(), AlError> {
        if self.attached > 0 {
            return Err(AlError::InvalidOperation);
        }
        // Sizes are reported back through a signed 32-bit query.
        if freq == 0 || size > MAX_UPLOAD_BYTES || size > data.len() {
            return Err(AlError::InvalidValue);
        }
        if size % format.frame_size() != 0 {
            return Err(AlError::InvalidValue);
        }

        self.samples = convert_pcm(format, &data[..size]);
        self.format = Some(format);
        self.frequency = freq;
        self.size = size as u32;
        Ok(())
    }

    /// Get a buffer property
    pub fn get_i(&self, prop: BufferProp) -> i32 {
        match prop {
            BufferProp::Frequency => self.frequency as i32,
            BufferProp::Bits => self
                .format
                .map(|f| (f.bytes_per_channel() << 3) as i32)
                .unwrap_or(16),
            BufferProp::Channels => self.channels() as i32,
            BufferProp::Size => self.size as i32,
        }
    }
}

/// Convert raw PCM bytes to interleaved i16 samples.
///
/// 8-bit input is unsigned and is re-centred and widened.
pub fn convert_pcm(format: BufferFormat, data: &[u8]) -> Vec<i16> {
    if format.bytes_per_channel() == 2 {
        data.chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    } else {
        data.iter().map(|&b| ((b as i16) - 128) << 8).collect()
    }
}
