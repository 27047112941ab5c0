//! Audio output port - the platform abstraction for one playable resource.
//!
//! An output turns a WAV container into an [`AudioHandle`] and drives it.
//! Handles are deliberately not `Clone`: whoever holds the handle owns the
//! resource and must give it back through [`AudioOutput::release`].

use crate::error::OutputError;

/// Invoked once when a started clip drains naturally.
///
/// Never invoked after `halt` or `release`, and never invoked on the caller's
/// thread while inside `start`/`resume`.
pub type EndedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Ownership token for a decoded audio resource.
#[derive(Debug, PartialEq, Eq)]
pub struct AudioHandle {
    id: u64,
}

impl AudioHandle {
    /// Outputs mint handles; ids only need to be unique per output.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// A device (or simulation) that can play WAV containers.
///
/// Methods are synchronous; implementations that need a dedicated thread
/// proxy the calls over a channel.
pub trait AudioOutput: Send + Sync {
    /// Decode `container` into a paused resource.
    fn load(&self, container: Vec<u8>) -> Result<AudioHandle, OutputError>;

    /// Start output from the current position.
    fn start(&self, handle: &AudioHandle, on_ended: EndedCallback) -> Result<(), OutputError>;

    /// Pause output, keeping the position.
    fn pause(&self, handle: &AudioHandle);

    /// Resume a paused resource.
    fn resume(&self, handle: &AudioHandle) -> Result<(), OutputError>;

    /// Halt output and rewind. The pending ended callback is dropped.
    fn halt(&self, handle: &AudioHandle);

    /// Free the resource.
    fn release(&self, handle: AudioHandle);
}
