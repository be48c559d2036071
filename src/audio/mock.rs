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
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Weak,
    },
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::audio::{decode, AudioBuffer, AudioError, OnEnded, VoiceChain, VoiceHandle, VoiceId};

/// How often the completion thread checks for voices that reached their end.
const MOCK_TICK: Duration = Duration::from_millis(5);

struct MockVoice {
    chain: VoiceChain,
    handle: VoiceHandle,
    on_ended: Option<OnEnded>,
    /// When the voice ends by itself. Only set in auto-complete mode.
    ends_at: Option<Instant>,
}

struct Inner {
    open: AtomicBool,
    open_calls: AtomicUsize,
    master_gain: Mutex<Option<f32>>,
    voices: Mutex<Vec<MockVoice>>,
    /// When true, each voice ends by itself after its buffer duration and ended voices
    /// are forgotten.
    auto_complete: bool,
    fail_open: bool,
    fail_start: AtomicBool,
}

impl Inner {
    /// Ends the given voice naturally. Returns false if it was unknown, stopped, or already ended.
    fn finish(&self, id: VoiceId) -> bool {
        let on_ended = {
            let mut voices = self.voices.lock();
            let Some(index) = voices.iter().position(|v| v.chain.id == id) else {
                return false;
            };
            let voice = &mut voices[index];
            let on_ended = if voice.handle.is_stopped() {
                None
            } else {
                voice.on_ended.take()
            };
            if on_ended.is_some() {
                voice.handle.mark_finished();
            }
            if self.auto_complete {
                voices.remove(index);
            } else {
                voices[index].on_ended = None;
            }
            on_ended
        };

        match on_ended {
            Some(on_ended) => {
                on_ended();
                true
            }
            None => false,
        }
    }

    /// Voices that reached their end or were stopped.
    fn due(&self, now: Instant) -> Vec<VoiceId> {
        self.voices
            .lock()
            .iter()
            .filter(|v| v.handle.is_stopped() || v.ends_at.is_some_and(|at| at <= now))
            .map(|v| v.chain.id)
            .collect()
    }
}

/// Ends voices in auto-complete mode. Exits once the device is gone.
fn run_completion(inner: Weak<Inner>) {
    loop {
        thread::sleep(MOCK_TICK);
        let Some(inner) = inner.upgrade() else {
            return;
        };
        for id in inner.due(Instant::now()) {
            inner.finish(id);
        }
    }
}

/// A mock device. Doesn't actually play anything.
#[derive(Clone)]
pub struct Device {
    name: String,
    inner: Arc<Inner>,
}

impl Device {
    /// Gets the given mock device. Voices end on their own after their buffer duration.
    pub fn get(name: &str) -> Device {
        Device::build(name, true, false)
    }

    fn build(name: &str, auto_complete: bool, fail_open: bool) -> Device {
        Device {
            name: name.to_string(),
            inner: Arc::new(Inner {
                open: AtomicBool::new(false),
                open_calls: AtomicUsize::new(0),
                master_gain: Mutex::new(None),
                voices: Mutex::new(Vec::new()),
                auto_complete,
                fail_open,
                fail_start: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the number of voices that have not ended or been stopped.
    pub fn playing_count(&self) -> usize {
        self.inner
            .voices
            .lock()
            .iter()
            .filter(|v| !v.handle.is_finished())
            .count()
    }
}

#[cfg(test)]
impl Device {
    /// A mock device whose voices only end when the test calls `finish`.
    pub fn manual(name: &str) -> Device {
        Device::build(name, false, false)
    }

    /// A mock device that can never be opened.
    pub fn unavailable(name: &str) -> Device {
        Device::build(name, false, true)
    }

    /// Makes every later `start` fail as if the output stream had stopped.
    pub fn fail_starts(&self) {
        self.inner.fail_start.store(true, Ordering::Release);
    }

    /// Ends the given voice as if it had played to the end of its buffer.
    pub fn finish(&self, id: VoiceId) -> bool {
        self.inner.finish(id)
    }

    /// Every voice chain started on this device and still tracked, oldest first.
    pub fn started(&self) -> Vec<VoiceChain> {
        self.inner
            .voices
            .lock()
            .iter()
            .map(|v| v.chain.clone())
            .collect()
    }

    /// The handle of a started voice.
    pub fn handle(&self, id: VoiceId) -> Option<VoiceHandle> {
        self.inner
            .voices
            .lock()
            .iter()
            .find(|v| v.chain.id == id)
            .map(|v| v.handle.clone())
    }

    /// The master gain the device was opened with.
    pub fn master_gain(&self) -> Option<f32> {
        *self.inner.master_gain.lock()
    }

    /// Number of times `open` was called.
    pub fn open_calls(&self) -> usize {
        self.inner.open_calls.load(Ordering::Relaxed)
    }
}

impl crate::audio::Device for Device {
    fn open(&self, master_gain: f32) -> Result<(), AudioError> {
        self.inner.open_calls.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_open {
            return Err(AudioError::Stream(format!("{} cannot be opened", self.name)));
        }
        if self.inner.open.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        *self.inner.master_gain.lock() = Some(master_gain);
        if self.inner.auto_complete {
            let inner = Arc::downgrade(&self.inner);
            thread::spawn(move || run_completion(inner));
        }
        info!(device = self.name, master_gain, "Opened output (mock)");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    fn decode(&self, encoded: &[u8]) -> Result<AudioBuffer, AudioError> {
        decode::decode(encoded, None)
    }

    fn start(&self, chain: VoiceChain, on_ended: OnEnded) -> Result<VoiceHandle, AudioError> {
        if !self.is_open() {
            return Err(AudioError::NotOpen);
        }
        if self.inner.fail_start.load(Ordering::Acquire) {
            return Err(AudioError::Stream("output stream has stopped".to_string()));
        }

        let handle = VoiceHandle::new();
        debug!(
            device = self.name,
            voice = %chain.id,
            pan = chain.pan,
            gain = chain.gain,
            "Starting voice (mock)"
        );

        let ends_at = self
            .inner
            .auto_complete
            .then(|| Instant::now() + chain.buffer.duration());
        self.inner.voices.lock().push(MockVoice {
            chain,
            handle: handle.clone(),
            on_ended: Some(on_ended),
            ends_at,
        });

        Ok(handle)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Device as _;
    use crate::testutil::eventually;

    fn chain(frames: usize) -> VoiceChain {
        VoiceChain {
            id: VoiceId::next(),
            buffer: Arc::new(AudioBuffer::mono(vec![0.1; frames], 44100)),
            gain: 0.5,
            pan: 0.0,
        }
    }

    #[test]
    fn test_start_requires_open() {
        let device = Device::manual("mock-device");
        assert!(matches!(
            device.start(chain(10), Box::new(|| {})),
            Err(AudioError::NotOpen)
        ));
    }

    #[test]
    fn test_manual_finish_fires_once() {
        let device = Device::manual("mock-device");
        device.open(0.5).unwrap();
        assert_eq!(device.master_gain(), Some(0.5));

        let fired = Arc::new(AtomicUsize::new(0));
        let voice = chain(10);
        let id = voice.id;
        let handle = {
            let fired = fired.clone();
            device
                .start(
                    voice,
                    Box::new(move || {
                        fired.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .unwrap()
        };

        assert!(device.finish(id));
        assert!(!device.finish(id));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_stopped_voice_never_fires() {
        let device = Device::manual("mock-device");
        device.open(0.5).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let voice = chain(10);
        let id = voice.id;
        let handle = {
            let fired = fired.clone();
            device
                .start(voice, Box::new(move || fired.store(true, Ordering::SeqCst)))
                .unwrap()
        };

        handle.stop();
        assert!(!device.finish(id));
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_auto_complete_after_duration() {
        let device = Device::get("mock-device");
        device.open(0.5).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        {
            let fired = fired.clone();
            // 441 frames at 44.1kHz is 10ms.
            device
                .start(chain(441), Box::new(move || fired.store(true, Ordering::SeqCst)))
                .unwrap();
        }

        eventually(
            || fired.load(Ordering::SeqCst),
            "Mock voice never completed",
        );
        assert_eq!(device.playing_count(), 0);
    }

    #[test]
    fn test_ended_voices_are_forgotten() {
        let device = Device::get("mock-device");
        device.open(0.5).unwrap();

        device.start(chain(441), Box::new(|| {})).unwrap();
        // Ten seconds of audio, so only the stop can end it.
        let long = device.start(chain(441_000), Box::new(|| {})).unwrap();
        long.stop();
        assert_eq!(device.started().len(), 2);

        eventually(|| device.started().is_empty(), "Ended voices were kept");
        assert_eq!(device.playing_count(), 0);
    }

    #[test]
    fn test_failed_start_is_not_tracked() {
        let device = Device::manual("mock-device");
        device.open(0.5).unwrap();
        device.fail_starts();

        assert!(matches!(
            device.start(chain(10), Box::new(|| {})),
            Err(AudioError::Stream(_))
        ));
        assert!(device.started().is_empty());
    }

    #[test]
    fn test_open_is_idempotent() {
        let device = Device::manual("mock-device");
        device.open(0.5).unwrap();
        device.open(0.9).unwrap();
        assert_eq!(device.master_gain(), Some(0.5));
        assert_eq!(device.open_calls(), 2);
    }

    #[test]
    fn test_unavailable_device() {
        let device = Device::unavailable("mock-device");
        assert!(device.open(0.5).is_err());
        assert!(!device.is_open());
    }
}
