//! Source and buffer handles.
//!
//! Each handle wraps one native object id and releases it when dropped.
//! `release` does the same eagerly and reports failures, which `Drop`
//! can only log.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::oal::error::{HandleKind, OalError};
use crate::sound::mixer::{AlError, BufferProp, SourceProp, SourceState};
use crate::sound::Context;

/// Shared handle to a native buffer.
///
/// Clones refer to the same buffer. Sources keep a clone while the buffer
/// is bound, so the native buffer is deleted only after the last clone and
/// the last binding are gone.
#[derive(Clone)]
pub struct BufferHandle {
    inner: Arc<BufferInner>,
}

struct BufferInner {
    id: u32,
    context: Context,
    deleted: bool,
}

impl BufferInner {
    fn delete(&mut self) -> Result<(), AlError> {
        self.deleted = true;
        self.context.delete_buffer(self.id)
    }
}

impl Drop for BufferInner {
    fn drop(&mut self) {
        if self.deleted {
            return;
        }
        if !self.context.is_current() {
            crate::log_debug!("buffer {} dropped after context teardown", self.id);
            return;
        }
        if let Err(e) = self.delete() {
            crate::log_warning!("free error bufferid id[{}]: {}", self.id, e);
        }
    }
}

impl BufferHandle {
    pub(crate) fn new(id: u32, context: Context) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                id,
                context,
                deleted: false,
            }),
        }
    }

    /// Native buffer id
    pub fn id(&self) -> u32 {
        self.inner.id
    }

    pub(crate) fn context(&self) -> &Context {
        &self.inner.context
    }

    fn prop(&self, prop: BufferProp) -> Result<i32, AlError> {
        self.inner.context.get_buffer_i(self.inner.id, prop)
    }

    pub fn frequency(&self) -> Result<u32, AlError> {
        self.prop(BufferProp::Frequency).map(|v| v as u32)
    }

    pub fn channels(&self) -> Result<u32, AlError> {
        self.prop(BufferProp::Channels).map(|v| v as u32)
    }

    pub fn bits(&self) -> Result<u32, AlError> {
        self.prop(BufferProp::Bits).map(|v| v as u32)
    }

    /// Size in bytes of the last upload
    pub fn size(&self) -> Result<usize, AlError> {
        self.prop(BufferProp::Size).map(|v| v as usize)
    }

    /// Delete the native buffer now.
    ///
    /// Fails with `BufferInUse` when another clone exists, e.g. because a
    /// source still has it bound; the deletion then happens once the last
    /// clone goes away.
    pub fn release(self) -> Result<(), OalError> {
        let id = self.inner.id;
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => inner.delete().map_err(|_| OalError::Free {
                kind: HandleKind::Buffer,
                id,
            }),
            Err(_shared) => Err(OalError::BufferInUse { id }),
        }
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.id)
    }
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BufferHandle").field(&self.inner.id).finish()
    }
}

/// Exclusively owned handle to a native source
pub struct SourceHandle {
    id: u32,
    context: Context,
    bound: Mutex<Option<BufferHandle>>,
    released: bool,
}

impl SourceHandle {
    pub(crate) fn new(id: u32, context: Context) -> Self {
        Self {
            id,
            context,
            bound: Mutex::new(None),
            released: false,
        }
    }

    /// Native source id
    pub fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn set_bound(&self, buffer: Option<BufferHandle>) {
        *self.bound.lock() = buffer;
    }

    /// Id of the buffer currently bound through this handle
    pub fn bound_buffer(&self) -> Option<u32> {
        self.bound.lock().as_ref().map(BufferHandle::id)
    }

    pub fn play(&self) {
        self.fire(self.context.source_play(self.id), "play");
    }

    pub fn pause(&self) {
        self.fire(self.context.source_pause(self.id), "pause");
    }

    pub fn stop(&self) {
        self.fire(self.context.source_stop(self.id), "stop");
    }

    pub fn rewind(&self) {
        self.fire(self.context.source_rewind(self.id), "rewind");
    }

    // Transport calls never report failure to the caller.
    fn fire(&self, result: Result<(), AlError>, op: &str) {
        if let Err(e) = result {
            crate::log_debug!("{} on source {} failed: {}", op, self.id, e);
        }
    }

    /// Stop playback and detach the bound buffer
    pub fn clear(&self) -> Result<(), OalError> {
        let stopped = self.context.source_stop(self.id);
        let detached = self.context.source_i(self.id, SourceProp::Buffer, 0);
        if stopped.is_err() || detached.is_err() {
            return Err(OalError::Clear { id: self.id });
        }
        self.set_bound(None);
        Ok(())
    }

    /// Current native playback state
    pub fn state(&self) -> Result<SourceState, AlError> {
        self.context.source_state(self.id)
    }

    fn finalize(&mut self) -> Result<(), AlError> {
        self.released = true;
        let stopped = self.context.source_stop(self.id);
        let detached = self.context.source_i(self.id, SourceProp::Buffer, 0);
        let deleted = self.context.delete_source(self.id);
        self.set_bound(None);
        stopped.and(detached).and(deleted)
    }

    /// Stop, detach and delete the native source now
    pub fn release(mut self) -> Result<(), OalError> {
        let id = self.id;
        self.finalize().map_err(|_| OalError::Free {
            kind: HandleKind::Source,
            id,
        })
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if !self.context.is_current() {
            self.released = true;
            crate::log_debug!("source {} dropped after context teardown", self.id);
            return;
        }
        if let Err(e) = self.finalize() {
            crate::log_warning!("free error source id[{}]: {}", self.id, e);
        }
    }
}

impl PartialEq for SourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.context.same_as(&other.context)
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("id", &self.id)
            .field("bound", &self.bound_buffer())
            .finish()
    }
}
