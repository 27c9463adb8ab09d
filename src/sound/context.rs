//! Output device and rendering context.
//!
//! A [`Device`] stands for one opened output. A [`Context`] is created on a
//! device and owns the mixer state; every object call goes through it and
//! records failures in the sticky OpenAL error slot. Once a context is
//! destroyed it is no longer current and all calls fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::sound::mixer::{
    AlError, BufferProp, MixerQuality, MixerState, SourceProp, SourceState,
};

/// Which output a device renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// The system default output device
    #[default]
    Default,
    /// No output; the caller pulls mixed frames explicitly
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("no default output device")]
    NoOutputDevice,

    #[error("output stream failed: {0}")]
    Stream(String),

    #[error("audio output support is not compiled in")]
    Unsupported,

    #[error("invalid output rate: {0}")]
    InvalidRate(u32),

    #[error("device already has a context")]
    ContextExists,
}

struct ContextShared {
    state: Mutex<MixerState>,
    current: AtomicBool,
}

/// Rendering context. Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Context {
    shared: Arc<ContextShared>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("current", &self.is_current())
            .finish()
    }
}

/// An opened output device
pub struct Device {
    kind: DeviceKind,
    specifier: String,
    output_rate: u32,
    context: Mutex<Option<Context>>,
    #[cfg(feature = "playback")]
    output: Mutex<Option<crate::sound::rodio_output::OutputThread>>,
}

impl Device {
    /// Open an output device mixing at `output_rate` Hz.
    pub fn open(kind: DeviceKind, output_rate: u32) -> Result<Device, DeviceError> {
        if output_rate == 0 {
            return Err(DeviceError::InvalidRate(output_rate));
        }

        let specifier = match kind {
            DeviceKind::Null => "null".to_string(),
            DeviceKind::Default => default_output_name()?,
        };
        log::info!("opened audio device '{}' at {} Hz", specifier, output_rate);

        Ok(Device {
            kind,
            specifier,
            output_rate,
            context: Mutex::new(None),
            #[cfg(feature = "playback")]
            output: Mutex::new(None),
        })
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Human-readable device name
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Create the rendering context for this device.
    ///
    /// For the default device this also starts the output stream.
    pub fn create_context(
        &self,
        quality: MixerQuality,
        max_sources: usize,
    ) -> Result<Context, DeviceError> {
        let mut slot = self.context.lock();
        if slot.as_ref().map(Context::is_current).unwrap_or(false) {
            return Err(DeviceError::ContextExists);
        }

        let context = Context {
            shared: Arc::new(ContextShared {
                state: Mutex::new(MixerState::new(self.output_rate, quality, max_sources)),
                current: AtomicBool::new(false),
            }),
        };

        #[cfg(feature = "playback")]
        if self.kind == DeviceKind::Default {
            let thread =
                crate::sound::rodio_output::OutputThread::start(context.clone(), self.output_rate)?;
            *self.output.lock() = Some(thread);
        }

        *slot = Some(context.clone());
        Ok(context)
    }

    /// Destroy the device's context (if any) and stop output.
    pub fn close(self) {
        if let Some(context) = self.context.lock().take() {
            context.destroy();
        }
        #[cfg(feature = "playback")]
        drop(self.output.lock().take());
        log::info!("closed audio device '{}'", self.specifier);
    }
}

#[cfg(feature = "playback")]
fn default_output_name() -> Result<String, DeviceError> {
    use cpal::traits::{DeviceTrait, HostTrait};

    let device = cpal::default_host()
        .default_output_device()
        .ok_or(DeviceError::NoOutputDevice)?;
    Ok(device.name().unwrap_or_else(|_| "default".to_string()))
}

#[cfg(not(feature = "playback"))]
fn default_output_name() -> Result<String, DeviceError> {
    Err(DeviceError::Unsupported)
}

impl Context {
    pub fn make_current(&self) {
        self.shared.current.store(true, Ordering::Release);
    }

    pub fn is_current(&self) -> bool {
        self.shared.current.load(Ordering::Acquire)
    }

    /// True when both refer to the same native context
    pub fn same_as(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Mark the context gone and release every object it holds.
    pub fn destroy(&self) {
        self.shared.current.store(false, Ordering::Release);
        self.shared.state.lock().clear();
    }

    /// Run `f` on the mixer state, recording any error in the sticky slot.
    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut MixerState) -> Result<T, AlError>,
    ) -> Result<T, AlError> {
        if !self.is_current() {
            return Err(AlError::InvalidOperation);
        }
        let mut state = self.shared.state.lock();
        let result = f(&mut state);
        if let Err(e) = &result {
            state.set_error(*e);
        }
        result
    }

    /// Read and clear the sticky error
    pub fn get_error(&self) -> AlError {
        if !self.is_current() {
            return AlError::InvalidOperation;
        }
        self.shared.state.lock().get_error()
    }

    pub fn frequency(&self) -> u32 {
        self.shared.state.lock().frequency()
    }

    pub fn live_sources(&self) -> usize {
        self.shared.state.lock().live_sources()
    }

    pub fn live_buffers(&self) -> usize {
        self.shared.state.lock().live_buffers()
    }

    pub fn gen_source(&self) -> Result<u32, AlError> {
        self.with_state(|s| s.gen_source())
    }

    pub fn delete_source(&self, id: u32) -> Result<(), AlError> {
        self.with_state(|s| s.delete_source(id))
    }

    pub fn is_source(&self, id: u32) -> bool {
        self.is_current() && self.shared.state.lock().is_source(id)
    }

    pub fn source_i(&self, id: u32, prop: SourceProp, value: i32) -> Result<(), AlError> {
        self.with_state(|s| s.source_i(id, prop, value))
    }

    pub fn source_f(&self, id: u32, prop: SourceProp, value: f32) -> Result<(), AlError> {
        self.with_state(|s| s.source_f(id, prop, value))
    }

    pub fn source_fv(&self, id: u32, prop: SourceProp, values: [f32; 3]) -> Result<(), AlError> {
        self.with_state(|s| s.source_fv(id, prop, values))
    }

    pub fn get_source_i(&self, id: u32, prop: SourceProp) -> Result<i32, AlError> {
        self.with_state(|s| s.get_source_i(id, prop))
    }

    pub fn get_source_f(&self, id: u32, prop: SourceProp) -> Result<f32, AlError> {
        self.with_state(|s| s.get_source_f(id, prop))
    }

    pub fn source_state(&self, id: u32) -> Result<SourceState, AlError> {
        self.with_state(|s| s.source_state(id))
    }

    pub fn source_play(&self, id: u32) -> Result<(), AlError> {
        self.with_state(|s| s.source_play(id))
    }

    pub fn source_pause(&self, id: u32) -> Result<(), AlError> {
        self.with_state(|s| s.source_pause(id))
    }

    pub fn source_stop(&self, id: u32) -> Result<(), AlError> {
        self.with_state(|s| s.source_stop(id))
    }

    pub fn source_rewind(&self, id: u32) -> Result<(), AlError> {
        self.with_state(|s| s.source_rewind(id))
    }

    pub fn gen_buffer(&self) -> Result<u32, AlError> {
        self.with_state(|s| s.gen_buffer())
    }

    pub fn delete_buffer(&self, id: u32) -> Result<(), AlError> {
        self.with_state(|s| s.delete_buffer(id))
    }

    pub fn is_buffer(&self, id: u32) -> bool {
        self.is_current() && self.shared.state.lock().is_buffer(id)
    }

    pub fn buffer_data(
        &self,
        id: u32,
        format: u32,
        data: &[u8],
        size: usize,
        freq: u32,
    ) -> Result<(), AlError> {
        self.with_state(|s| s.buffer_data(id, format, data, size, freq))
    }

    pub fn get_buffer_i(&self, id: u32, prop: BufferProp) -> Result<i32, AlError> {
        self.with_state(|s| s.get_buffer_i(id, prop))
    }

    /// Render interleaved stereo frames into `out`. Silence when the
    /// context is not current.
    pub fn mix_channels(&self, out: &mut [f32]) {
        if !self.is_current() {
            out.fill(0.0);
            return;
        }
        self.shared.state.lock().mix_channels(out);
    }

    /// Advance playback by `frames` without rendering
    pub fn mix_fake(&self, frames: usize) {
        if self.is_current() {
            self.shared.state.lock().mix_fake(frames);
        }
    }
}
