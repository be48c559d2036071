// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::config;

pub mod buffer;
pub mod cpal;
pub mod decode;
pub mod error;
pub mod mixer;
pub mod mock;
pub mod panner;

pub use buffer::AudioBuffer;
pub use error::AudioError;

/// The pan range every device supports: hard left to hard right.
pub const PAN_RANGE: RangeInclusive<f32> = -1.0..=1.0;

/// Global voice ID counter.
static NEXT_VOICE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a single voice. IDs are never reused, so two voices playing the same
/// sample are still told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(u64);

impl VoiceId {
    /// Allocates the next voice ID.
    pub fn next() -> VoiceId {
        VoiceId(NEXT_VOICE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice-{}", self.0)
    }
}

/// Callback fired once when a voice reaches the end of its buffer.
pub type OnEnded = Box<dyn FnOnce() + Send + 'static>;

/// The signal chain for one voice: buffer -> gain -> stereo panner -> master.
#[derive(Clone)]
pub struct VoiceChain {
    pub id: VoiceId,
    pub buffer: Arc<AudioBuffer>,
    pub gain: f32,
    pub pan: f32,
}

/// Shared state between a started voice and whoever owns it. The device marks the voice
/// finished, the owner may force it to stop.
#[derive(Clone, Default)]
pub struct VoiceHandle {
    stopped: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl VoiceHandle {
    pub fn new() -> VoiceHandle {
        VoiceHandle::default()
    }

    /// Forces the voice to stop. The device drops it on its next render pass.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Returns true if the voice was forcibly stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Marks the voice as having played to the end of its buffer.
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Returns true once the voice is no longer audible, whether it ended or was stopped.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire) || self.is_stopped()
    }
}

/// An output device capable of decoding sample data and playing one-shot voices.
pub trait Device: fmt::Display + Send + Sync {
    /// Opens the shared output graph with the given master gain. Opening an already
    /// open device is a no-op.
    fn open(&self, master_gain: f32) -> Result<(), AudioError>;

    /// Returns true if the output graph has been opened.
    fn is_open(&self) -> bool;

    /// Decodes an encoded audio file into a buffer ready for playback on this device.
    fn decode(&self, encoded: &[u8]) -> Result<AudioBuffer, AudioError>;

    /// Starts a voice immediately. `on_ended` fires when the voice plays to the end of its
    /// buffer; it never fires for a stopped voice and is never called from within `start`.
    fn start(&self, chain: VoiceChain, on_ended: OnEnded) -> Result<VoiceHandle, AudioError>;

    /// The pan positions this device supports.
    fn pan_range(&self) -> RangeInclusive<f32> {
        PAN_RANGE
    }
}

/// Lists devices known to cpal.
pub fn list_devices() -> Result<Vec<Box<dyn Device>>, AudioError> {
    cpal::Device::list()
}

/// Gets the device selected by the given configuration.
pub fn get_device(config: &config::Audio) -> Result<Arc<dyn Device>, AudioError> {
    match config.device() {
        Some(device) if device.starts_with("mock") => Ok(Arc::new(mock::Device::get(device))),
        Some(device) => Ok(Arc::new(cpal::Device::get(device)?)),
        None => Ok(Arc::new(cpal::Device::default_output()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_ids_are_unique() {
        let first = VoiceId::next();
        let second = VoiceId::next();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_voice_handle_states() {
        let handle = VoiceHandle::new();
        assert!(!handle.is_finished());
        assert!(!handle.is_stopped());

        let shared = handle.clone();
        shared.mark_finished();
        assert!(handle.is_finished());
        assert!(!handle.is_stopped());

        let stopped = VoiceHandle::new();
        stopped.stop();
        assert!(stopped.is_stopped());
        assert!(stopped.is_finished());
    }

    #[test]
    fn test_get_mock_device() {
        let device = get_device(&config::Audio::new(Some("mock-device"))).unwrap();
        assert_eq!(device.to_string(), "mock-device (Mock)");
        assert!(!device.is_open());
    }
}
