// source.rs - Audio source management

//! Audio source objects for the mixer.
//!
//! A source plays at most one attached buffer and follows the OpenAL state
//! machine: `Initial`, `Playing`, `Paused`, `Stopped`. Buffer attachment is
//! tracked by the owning context because it touches buffer reference counts.

use crate::sound::mixer::types::*;

/// Audio source for playback
#[derive(Debug, Clone)]
pub struct MixerSource {
    /// Current playback state
    pub state: SourceState,
    /// Whether playback should loop
    pub looping: bool,
    /// Linear volume gain
    pub gain: f32,
    /// Playback rate multiplier
    pub pitch: f32,
    /// Position relative to the listener; only x is used for panning
    pub position: [f32; 3],
    /// Attached buffer id
    pub buffer: Option<u32>,
    /// Fractional read position in frames
    pub cursor: f64,
}

impl MixerSource {
    /// Create a new source in the initial state
    pub fn new() -> Self {
        MixerSource {
            state: SourceState::Initial,
            looping: false,
            gain: 1.0,
            pitch: 1.0,
            position: [0.0; 3],
            buffer: None,
            cursor: 0.0,
        }
    }

    /// Whether the attached buffer may be changed
    pub fn can_rebind(&self) -> bool {
        matches!(self.state, SourceState::Initial | SourceState::Stopped)
    }

    /// Start or restart playback. `has_data` tells whether the attached
    /// buffer holds any frames.
    pub fn play(&mut self, has_data: bool) {
        if self.state != SourceState::Paused {
            self.cursor = 0.0;
        }
        self.state = if has_data {
            SourceState::Playing
        } else {
            SourceState::Stopped
        };
    }

    pub fn pause(&mut self) {
        if self.state == SourceState::Playing {
            self.state = SourceState::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.state = SourceState::Stopped;
        self.cursor = 0.0;
    }

    pub fn rewind(&mut self) {
        self.state = SourceState::Initial;
        self.cursor = 0.0;
    }

    /// Set an integer property. `Buffer` is handled by the context.
    pub fn set_i(&mut self, prop: SourceProp, value: i32) -> Result<(), AlError> {
        match prop {
            SourceProp::Looping => match value {
                0 | 1 => {
                    self.looping = value != 0;
                    Ok(())
                }
                _ => Err(AlError::InvalidValue),
            },
            SourceProp::Pitch | SourceProp::Gain => self.set_f(prop, value as f32),
            _ => Err(AlError::InvalidEnum),
        }
    }

    /// Set a float property
    pub fn set_f(&mut self, prop: SourceProp, value: f32) -> Result<(), AlError> {
        match prop {
            SourceProp::Pitch => {
                if !(value.is_finite() && value > 0.0) {
                    return Err(AlError::InvalidValue);
                }
                self.pitch = value;
                Ok(())
            }
            SourceProp::Gain => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(AlError::InvalidValue);
                }
                self.gain = value;
                Ok(())
            }
            _ => Err(AlError::InvalidEnum),
        }
    }

    /// Set a float vector property
    pub fn set_fv(&mut self, prop: SourceProp, values: [f32; 3]) -> Result<(), AlError> {
        match prop {
            SourceProp::Position => {
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(AlError::InvalidValue);
                }
                self.position = values;
                Ok(())
            }
            _ => Err(AlError::InvalidEnum),
        }
    }

    /// Get an integer property
    pub fn get_i(&self, prop: SourceProp) -> Result<i32, AlError> {
        match prop {
            SourceProp::Looping => Ok(self.looping as i32),
            SourceProp::SourceState => Ok(self.state as i32),
            SourceProp::Buffer => Ok(self.buffer.unwrap_or(0) as i32),
            SourceProp::SampleOffset => Ok(self.cursor as i32),
            _ => Err(AlError::InvalidEnum),
        }
    }

    /// Get a float property
    pub fn get_f(&self, prop: SourceProp) -> Result<f32, AlError> {
        match prop {
            SourceProp::Gain => Ok(self.gain),
            SourceProp::Pitch => Ok(self.pitch),
            _ => Err(AlError::InvalidEnum),
        }
    }
}

impl Default for MixerSource {
    fn default() -> Self {
        Self::new()
    }
}
