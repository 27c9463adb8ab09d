//! Script-facing operations: bring-up, handle creation, upload and the
//! combined "configure source for playback" call.

use std::time::Duration;

use crate::config::{OalConfig, SetErrorPolicy};
use crate::logging::init_logging;
use crate::oal::error::{HandleKind, InitError, OalError};
use crate::oal::handle::{BufferHandle, SourceHandle};
use crate::sound::mixer::{AlError, BufferFormat, SourceProp, SourceState};
use crate::sound::{Context, Device};

/// Decoded PCM as handed over by an audio decoder
#[derive(Debug, Clone, Copy)]
pub struct PcmInfo<'a> {
    /// Raw format tag (`AL_FORMAT_*`)
    pub format: u32,
    pub data: &'a [u8],
    /// Number of bytes of `data` to upload
    pub size: usize,
    pub frequency: u32,
}

impl<'a> PcmInfo<'a> {
    pub fn new(format: BufferFormat, data: &'a [u8], frequency: u32) -> Self {
        Self {
            format: format as u32,
            data,
            size: data.len(),
            frequency,
        }
    }

    /// Playing time of the upload, if the format and rate are valid
    pub fn duration(&self) -> Option<Duration> {
        let format = BufferFormat::from_raw(self.format)?;
        if self.frequency == 0 {
            return None;
        }
        let frames = self.size / format.frame_size();
        Some(Duration::from_secs_f64(frames as f64 / self.frequency as f64))
    }
}

/// Parameters applied by [`Oal::source_set`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParams {
    pub pitch: f32,
    /// Stereo pan, -1.0 (left) to 1.0 (right)
    pub pan: f32,
    pub gain: f32,
    pub looping: bool,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            pan: 0.0,
            gain: 1.0,
            looping: false,
        }
    }
}

/// An initialized audio device plus its current context
pub struct Oal {
    device: Option<Device>,
    context: Context,
    config: OalConfig,
}

impl Oal {
    /// Open the configured device, create a context and make it current.
    ///
    /// The global log filter is only touched when `config.log_level` is set.
    pub fn initialize(config: &OalConfig) -> Result<Self, OalError> {
        if let Some(level) = config.log_level {
            init_logging(level);
        }

        let device = Device::open(config.device, config.output_rate)
            .map_err(|e| InitError::NoDevice(e.to_string()))?;
        let context = device
            .create_context(config.quality, config.max_sources)
            .map_err(|e| InitError::Context(e.to_string()))?;
        context.make_current();

        crate::log_info!(
            "audio initialized on '{}' ({} Hz, {:?} quality)",
            device.specifier(),
            config.output_rate,
            config.quality
        );

        Ok(Self {
            device: Some(device),
            context,
            config: config.clone(),
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn config(&self) -> &OalConfig {
        &self.config
    }

    pub fn device_specifier(&self) -> &str {
        self.device.as_ref().map(Device::specifier).unwrap_or("")
    }

    /// Generate a fresh source with no buffer attached
    pub fn create_source(&self) -> Result<SourceHandle, OalError> {
        let ctx = &self.context;
        ctx.get_error();

        let id = ctx.gen_source().map_err(|code| OalError::Create {
            kind: HandleKind::Source,
            code,
        })?;
        if let Err(code) = ctx.source_i(id, SourceProp::Buffer, 0) {
            let _ = ctx.delete_source(id);
            return Err(OalError::Create {
                kind: HandleKind::Source,
                code,
            });
        }

        crate::log_debug!("created source {}", id);
        Ok(SourceHandle::new(id, ctx.clone()))
    }

    /// Generate a fresh, empty buffer
    pub fn create_bufferid(&self) -> Result<BufferHandle, OalError> {
        let ctx = &self.context;
        ctx.get_error();

        let id = ctx.gen_buffer().map_err(|code| OalError::Create {
            kind: HandleKind::Buffer,
            code,
        })?;

        crate::log_debug!("created buffer {}", id);
        Ok(BufferHandle::new(id, ctx.clone()))
    }

    /// Upload decoded PCM into `buffer`
    pub fn buffer_bind(&self, buffer: &BufferHandle, pcm: &PcmInfo<'_>) -> Result<(), OalError> {
        let ctx = buffer.context();
        ctx.get_error();

        ctx.buffer_data(buffer.id(), pcm.format, pcm.data, pcm.size, pcm.frequency)
            .map_err(|code| OalError::Bind { code })
    }

    /// Attach `buffer` to `source` and apply the playback parameters.
    ///
    /// A playing source is stopped first. Returns the same source so calls
    /// can be chained.
    pub fn source_set<'a>(
        &self,
        source: &'a SourceHandle,
        buffer: &BufferHandle,
        params: PlaybackParams,
    ) -> Result<&'a SourceHandle, OalError> {
        let ctx = source.context();
        let id = source.id();
        ctx.get_error();

        if ctx.source_state(id) == Ok(SourceState::Playing) {
            let _ = ctx.source_stop(id);
        }

        // A buffer from another context names an unrelated object here, so
        // only the bind step fails and the remaining parameters still apply.
        let bind_error = if ctx.same_as(buffer.context()) {
            if ctx.source_i(id, SourceProp::Buffer, buffer.id() as i32).is_ok() {
                source.set_bound(Some(buffer.clone()));
            }
            None
        } else {
            Some(AlError::InvalidName)
        };
        let _ = ctx.source_f(id, SourceProp::Pitch, params.pitch);
        let _ = ctx.source_i(id, SourceProp::Looping, params.looping as i32);
        let _ = ctx.source_f(id, SourceProp::Gain, params.gain);
        let _ = ctx.source_fv(id, SourceProp::Position, [params.pan, 0.0, 0.0]);

        let code = ctx.get_error();
        match bind_error.unwrap_or(code) {
            AlError::NoError => Ok(source),
            code => self.set_failed(ctx, id, code).map(|_| source),
        }
    }

    fn set_failed(&self, ctx: &Context, id: u32, code: AlError) -> Result<(), OalError> {
        if !ctx.is_current() {
            return Err(OalError::ContextLost);
        }
        match self.config.set_error_policy {
            SetErrorPolicy::Lenient => {
                crate::log_warning!("set error source id[{}]: {}", id, code);
                Ok(())
            }
            SetErrorPolicy::Strict => Err(OalError::Set { id, code }),
        }
    }

    /// Destroy the context and close the device. Handles still alive
    /// afterwards are inert.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(device) = self.device.take() {
            device.close();
        }
    }
}

impl Drop for Oal {
    fn drop(&mut self) {
        self.close();
    }
}
