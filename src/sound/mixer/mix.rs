// mix.rs - Mixer object tables and mixing logic

//! Per-context mixer state and the main mixing loop.
//!
//! `MixerState` owns every source and buffer of one context. Its operations
//! return `Result`; recording the sticky OpenAL error is left to the caller
//! (see `sound::context::Context`).

use std::collections::HashMap;

use crate::sound::mixer::buffer::MixerBuffer;
use crate::sound::mixer::resample::resample;
use crate::sound::mixer::source::MixerSource;
use crate::sound::mixer::types::*;

/// Number of interleaved output channels produced by the mixer
pub const OUTPUT_CHANNELS: usize = 2;

/// Mixer state for one context
#[derive(Debug)]
pub struct MixerState {
    last_error: AlError,
    freq: u32,
    quality: MixerQuality,
    max_sources: usize,
    next_id: u32,
    sources: HashMap<u32, MixerSource>,
    buffers: HashMap<u32, MixerBuffer>,
}

impl MixerState {
    pub fn new(freq: u32, quality: MixerQuality, max_sources: usize) -> Self {
        MixerState {
            last_error: AlError::NoError,
            freq,
            quality,
            max_sources,
            next_id: 1,
            sources: HashMap::new(),
            buffers: HashMap::new(),
        }
    }

    pub fn frequency(&self) -> u32 {
        self.freq
    }

    pub fn quality(&self) -> MixerQuality {
        self.quality
    }

    /// Record an error unless an earlier one is still pending
    pub fn set_error(&mut self, error: AlError) {
        if self.last_error == AlError::NoError {
            self.last_error = error;
        }
    }

    /// Get and clear the pending error
    pub fn get_error(&mut self) -> AlError {
        std::mem::replace(&mut self.last_error, AlError::NoError)
    }

    /// Ids are never reused within a context.
    fn alloc_id(&mut self) -> Result<u32, AlError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(AlError::OutOfMemory)?;
        Ok(id)
    }

    pub fn live_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Drop every object, used when the context is destroyed
    pub fn clear(&mut self) {
        self.sources.clear();
        self.buffers.clear();
    }

    // ---------------------------------------------------------------------
    // Sources
    // ---------------------------------------------------------------------

    pub fn gen_source(&mut self) -> Result<u32, AlError> {
        if self.sources.len() >= self.max_sources {
            return Err(AlError::OutOfMemory);
        }
        let id = self.alloc_id()?;
        self.sources.insert(id, MixerSource::new());
        Ok(id)
    }

    /// Delete a source, releasing its buffer attachment
    pub fn delete_source(&mut self, id: u32) -> Result<(), AlError> {
        let src = self.sources.remove(&id).ok_or(AlError::InvalidName)?;
        if let Some(buf_id) = src.buffer {
            self.detach(buf_id);
        }
        Ok(())
    }

    pub fn is_source(&self, id: u32) -> bool {
        self.sources.contains_key(&id)
    }

    fn source(&self, id: u32) -> Result<&MixerSource, AlError> {
        self.sources.get(&id).ok_or(AlError::InvalidName)
    }

    fn source_mut(&mut self, id: u32) -> Result<&mut MixerSource, AlError> {
        self.sources.get_mut(&id).ok_or(AlError::InvalidName)
    }

    fn detach(&mut self, buf_id: u32) {
        if let Some(buf) = self.buffers.get_mut(&buf_id) {
            buf.attached = buf.attached.saturating_sub(1);
        }
    }

    /// Set an integer property on a source
    pub fn source_i(&mut self, id: u32, prop: SourceProp, value: i32) -> Result<(), AlError> {
        if prop != SourceProp::Buffer {
            return self.source_mut(id)?.set_i(prop, value);
        }

        let new_buffer = match value as u32 {
            0 => None,
            buf_id if self.buffers.contains_key(&buf_id) => Some(buf_id),
            _ => return Err(AlError::InvalidName),
        };

        let src = self.sources.get_mut(&id).ok_or(AlError::InvalidName)?;
        if !src.can_rebind() {
            return Err(AlError::InvalidOperation);
        }
        let old_buffer = std::mem::replace(&mut src.buffer, new_buffer);
        src.cursor = 0.0;

        if let Some(old) = old_buffer {
            self.detach(old);
        }
        if let Some(buf) = new_buffer.and_then(|b| self.buffers.get_mut(&b)) {
            buf.attached += 1;
        }
        Ok(())
    }

    /// Set a float property on a source
    pub fn source_f(&mut self, id: u32, prop: SourceProp, value: f32) -> Result<(), AlError> {
        self.source_mut(id)?.set_f(prop, value)
    }

    /// Set a float vector property on a source
    pub fn source_fv(&mut self, id: u32, prop: SourceProp, values: [f32; 3]) -> Result<(), AlError> {
        self.source_mut(id)?.set_fv(prop, values)
    }

    /// Get an integer property from a source
    pub fn get_source_i(&self, id: u32, prop: SourceProp) -> Result<i32, AlError> {
        self.source(id)?.get_i(prop)
    }

    /// Get a float property from a source
    pub fn get_source_f(&self, id: u32, prop: SourceProp) -> Result<f32, AlError> {
        self.source(id)?.get_f(prop)
    }

    pub fn source_state(&self, id: u32) -> Result<SourceState, AlError> {
        Ok(self.source(id)?.state)
    }

    /// Start playback on a source
    pub fn source_play(&mut self, id: u32) -> Result<(), AlError> {
        let src = self.sources.get_mut(&id).ok_or(AlError::InvalidName)?;
        let has_data = src
            .buffer
            .and_then(|b| self.buffers.get(&b))
            .map(|b| b.frames() > 0)
            .unwrap_or(false);
        src.play(has_data);
        Ok(())
    }

    pub fn source_pause(&mut self, id: u32) -> Result<(), AlError> {
        self.source_mut(id)?.pause();
        Ok(())
    }

    pub fn source_stop(&mut self, id: u32) -> Result<(), AlError> {
        self.source_mut(id)?.stop();
        Ok(())
    }

    pub fn source_rewind(&mut self, id: u32) -> Result<(), AlError> {
        self.source_mut(id)?.rewind();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Buffers
    // ---------------------------------------------------------------------

    pub fn gen_buffer(&mut self) -> Result<u32, AlError> {
        let id = self.alloc_id()?;
        self.buffers.insert(id, MixerBuffer::new());
        Ok(id)
    }

    /// Delete a buffer. Id 0 is accepted and ignored.
    pub fn delete_buffer(&mut self, id: u32) -> Result<(), AlError> {
        if id == 0 {
            return Ok(());
        }
        let buf = self.buffers.get(&id).ok_or(AlError::InvalidName)?;
        if buf.attached > 0 {
            return Err(AlError::InvalidOperation);
        }
        self.buffers.remove(&id);
        Ok(())
    }

    pub fn is_buffer(&self, id: u32) -> bool {
        self.buffers.contains_key(&id)
    }

    /// Load PCM data into a buffer
    pub fn buffer_data(
        &mut self,
        id: u32,
        format: u32,
        data: &[u8],
        size: usize,
        freq: u32,
    ) -> Result<(), AlError> {
        let buf = self.buffers.get_mut(&id).ok_or(AlError::InvalidName)?;
        let format = BufferFormat::from_raw(format).ok_or(AlError::InvalidEnum)?;
        buf.fill(format, data, size, freq)
    }

    /// Get a buffer property
    pub fn get_buffer_i(&self, id: u32, prop: BufferProp) -> Result<i32, AlError> {
        self.buffers
            .get(&id)
            .map(|b| b.get_i(prop))
            .ok_or(AlError::InvalidName)
    }

    // ---------------------------------------------------------------------
    // Mixing
    // ---------------------------------------------------------------------

    /// Mix all playing sources into `out`, interleaved stereo f32.
    ///
    /// `out` is overwritten. Sources that run off the end of a non-looping
    /// buffer are stopped.
    pub fn mix_channels(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let quality = self.quality;
        let out_freq = self.freq as f64;

        for src in self.sources.values_mut() {
            if src.state != SourceState::Playing {
                continue;
            }
            let buf = match src.buffer.and_then(|b| self.buffers.get(&b)) {
                Some(b) if b.frames() > 0 => b,
                _ => {
                    src.stop();
                    continue;
                }
            };

            let total = buf.frames() as f64;
            let step = src.pitch as f64 * buf.frequency as f64 / out_freq;
            let gain = src.gain / SINT16_SCALE;
            let mono = buf.channels() == 1;
            let (pan_left, pan_right) = pan_gains(src.position[0]);

            for frame in out.chunks_exact_mut(OUTPUT_CHANNELS) {
                let (left, right) = if mono {
                    let s = resample(quality, buf, src.cursor, 0, src.looping);
                    (s * pan_left, s * pan_right)
                } else {
                    (
                        resample(quality, buf, src.cursor, 0, src.looping),
                        resample(quality, buf, src.cursor, 1, src.looping),
                    )
                };
                frame[0] += left * gain;
                frame[1] += right * gain;

                src.cursor += step;
                if src.cursor >= total {
                    if src.looping {
                        src.cursor %= total;
                    } else {
                        src.stop();
                        break;
                    }
                }
            }
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    /// Advance playing sources by `frames` output frames without producing
    /// any audio. Used for timing when no output device is attached.
    pub fn mix_fake(&mut self, frames: usize) {
        let out_freq = self.freq as f64;

        for src in self.sources.values_mut() {
            if src.state != SourceState::Playing {
                continue;
            }
            let (total, buf_freq) = match src.buffer.and_then(|b| self.buffers.get(&b)) {
                Some(b) if b.frames() > 0 => (b.frames() as f64, b.frequency as f64),
                _ => {
                    src.stop();
                    continue;
                }
            };

            src.cursor += src.pitch as f64 * buf_freq / out_freq * frames as f64;
            if src.cursor >= total {
                if src.looping {
                    src.cursor %= total;
                } else {
                    src.stop();
                }
            }
        }
    }
}

/// Left/right gains for a horizontal position, clamped to [-1, 1]
pub fn pan_gains(x: f32) -> (f32, f32) {
    let x = x.clamp(-1.0, 1.0);
    ((1.0 - x).min(1.0), (1.0 + x).min(1.0))
}
