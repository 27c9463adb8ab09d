//! Rodio output stream for the default device.
//!
//! rodio's `OutputStream` must stay on the thread that created it, so a
//! dedicated thread opens the stream, hands it a [`MixerStream`] that pulls
//! frames from the context, and then parks until shutdown.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Sender};
use rodio::{OutputStream, Source};

use crate::sound::context::{Context, DeviceError};
use crate::sound::mixer::OUTPUT_CHANNELS;

/// Frames rendered per mixer pull
const CHUNK_FRAMES: usize = 512;

/// Rodio source that renders the context's mix on demand
pub struct MixerStream {
    context: Context,
    rate: u32,
    chunk: Vec<f32>,
    pos: usize,
}

impl MixerStream {
    pub fn new(context: Context, rate: u32) -> Self {
        let chunk = vec![0.0; CHUNK_FRAMES * OUTPUT_CHANNELS];
        let pos = chunk.len();
        Self {
            context,
            rate,
            chunk,
            pos,
        }
    }
}

impl Iterator for MixerStream {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.chunk.len() {
            self.context.mix_channels(&mut self.chunk);
            self.pos = 0;
        }
        let sample = self.chunk[self.pos];
        self.pos += 1;
        Some(sample)
    }
}

impl Source for MixerStream {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.chunk.len() - self.pos)
    }

    fn channels(&self) -> u16 {
        OUTPUT_CHANNELS as u16
    }

    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Owns the thread keeping the output stream alive
pub struct OutputThread {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl OutputThread {
    /// Open the default output and start pulling from `context`.
    ///
    /// Returns once the stream is playing or has failed to open.
    pub fn start(context: Context, rate: u32) -> Result<Self, DeviceError> {
        let (ready_tx, ready_rx) = channel::bounded::<Result<(), String>>(1);
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("oal-output".to_string())
            .spawn(move || {
                let (stream, stream_handle) = match OutputStream::try_default() {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                if let Err(e) = stream_handle.play_raw(MixerStream::new(context, rate)) {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // Either a shutdown message or a dropped sender ends playback.
                let _ = shutdown_rx.recv();
                drop(stream);
                log::debug!("output thread exited");
            })
            .map_err(|e| DeviceError::Stream(e.to_string()))?;

        let mut output = OutputThread {
            shutdown: shutdown_tx,
            handle: Some(handle),
        };

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(output),
            Ok(Err(msg)) => {
                output.join();
                Err(DeviceError::Stream(msg))
            }
            Err(_) => {
                output.join();
                Err(DeviceError::Stream("output thread exited early".to_string()))
            }
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown.send(());
            if handle.join().is_err() {
                log::warn!("output thread panicked");
            }
        }
    }
}

impl Drop for OutputThread {
    fn drop(&mut self) {
        self.join();
    }
}
