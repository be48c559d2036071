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

//! Main sample engine that coordinates sample loading, voice limiting, and playback.

use std::sync::{Arc, OnceLock};

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use super::bank::{normalize, SampleBank};
use super::sound::{PlayOptions, SampleId, SoundRef};
use super::voice::{Voice, VoicePool};
use super::{MASTER_GAIN, MAX_SIMULTANEOUS_SOUNDS, SAMPLE_COUNT, VOICE_GAIN};
use crate::assets::AssetSource;
use crate::audio::{AudioBuffer, Device, OnEnded, VoiceChain, VoiceId};
use crate::session::SessionTag;

/// The sample player loads the sample bank once and plays one-shot voices from it.
pub struct SamplePlayer {
    /// Where encoded samples are fetched from.
    assets: Arc<dyn AssetSource>,
    /// The output device.
    device: Arc<dyn Device>,
    /// Tag attached to every sample fetch.
    session: SessionTag,
    /// Set once the device open has been attempted, holding whether it succeeded.
    device_opened: OnceLock<bool>,
    /// The bank, set once every fetch has settled.
    bank: OnceCell<SampleBank>,
    /// Active voices. Completion callbacks hold a weak reference to this.
    voices: Arc<Mutex<VoicePool>>,
}

impl SamplePlayer {
    /// Creates a new sample player. Nothing is fetched or opened until the first load.
    pub fn new(
        assets: Arc<dyn AssetSource>,
        device: Arc<dyn Device>,
        session: SessionTag,
    ) -> SamplePlayer {
        SamplePlayer {
            assets,
            device,
            session,
            device_opened: OnceLock::new(),
            bank: OnceCell::new(),
            voices: Arc::new(Mutex::new(VoicePool::new(MAX_SIMULTANEOUS_SOUNDS))),
        }
    }

    /// Opens the output device and loads the sample bank. Only the first call does any work;
    /// concurrent callers wait for that same load to finish.
    pub async fn load(&self) -> &SampleBank {
        self.open_device();
        self.bank.get_or_init(|| self.load_bank()).await
    }

    /// Plays the given sound. Unknown sounds, empty slots, and an unavailable device are
    /// ignored. Returns the ID of the started voice.
    pub async fn play(&self, sound: impl Into<SoundRef>, options: PlayOptions) -> Option<VoiceId> {
        self.load().await;

        let sound = sound.into();
        let Some(id) = sound.resolve() else {
            debug!(sound = ?sound, "Ignoring unknown sound");
            return None;
        };

        self.play_sound(id, options.position.unwrap_or(0.0))
    }

    /// Starts a voice for the given sample immediately, stealing the oldest voice if too many
    /// are playing. Does nothing until the bank is loaded.
    pub fn play_sound(&self, id: SampleId, position: f32) -> Option<VoiceId> {
        if !self.device.is_open() {
            debug!(sample = %id, device = %self.device, "Device not open, ignoring play");
            return None;
        }
        let Some(buffer) = self.bank.get().and_then(|bank| bank.get(id)) else {
            debug!(sample = %id, "Sample not loaded, ignoring play");
            return None;
        };

        let range = self.device.pan_range();
        let pan = if position.is_nan() {
            0.0
        } else {
            position.clamp(*range.start(), *range.end())
        };

        let voice_id = VoiceId::next();
        let chain = VoiceChain {
            id: voice_id,
            buffer,
            gain: VOICE_GAIN,
            pan,
        };

        let pool = Arc::downgrade(&self.voices);
        let on_ended: OnEnded = Box::new(move || {
            if let Some(pool) = pool.upgrade() {
                if pool.lock().remove(voice_id) {
                    debug!(voice = %voice_id, "Voice ended");
                }
            }
        });

        // Starting, stealing, and admitting happen under one lock so concurrent plays
        // can never push the pool past its limit. Nothing is stolen if the start fails.
        let mut voices = self.voices.lock();
        let handle = match self.device.start(chain, on_ended) {
            Ok(handle) => handle,
            Err(e) => {
                error!(sample = %id, err = %e, "Unable to start voice");
                return None;
            }
        };
        voices.admit(Voice::new(voice_id, id, pan, handle));

        debug!(
            sample = %id,
            voice = %voice_id,
            pan,
            active_voices = voices.len(),
            "Playing sample"
        );
        Some(voice_id)
    }

    /// Returns the number of voices still playing.
    pub fn active_voices(&self) -> usize {
        let mut voices = self.voices.lock();
        voices.purge_finished();
        voices.len()
    }

    /// Stops every active voice.
    pub fn stop_all(&self) {
        let stopped = self.voices.lock().clear();
        if stopped > 0 {
            info!(stopped, "Stopped all voices");
        }
    }

    /// The sample bank, once loaded.
    pub fn bank(&self) -> Option<&SampleBank> {
        self.bank.get()
    }

    pub fn session(&self) -> &SessionTag {
        &self.session
    }

    /// Opens the device the first time this is called. A failure leaves the device closed
    /// and every later play is ignored.
    fn open_device(&self) {
        self.device_opened.get_or_init(|| {
            match self.device.open(MASTER_GAIN) {
                Ok(()) => true,
                Err(e) => {
                    error!(device = %self.device, err = %e, "Unable to open output device");
                    false
                }
            }
        });
    }

    /// Fetches and decodes every sample concurrently, keeping whatever succeeded.
    async fn load_bank(&self) -> SampleBank {
        info!(session = %self.session, samples = SAMPLE_COUNT, "Loading samples");

        let slots = join_all(SampleId::all().map(|id| self.load_sample(id))).await;
        let bank = SampleBank::from_slots(slots);

        let loaded = bank.loaded_count();
        if loaded < SAMPLE_COUNT {
            warn!(loaded, failed = SAMPLE_COUNT - loaded, "Some samples failed to load");
        }
        info!(
            loaded,
            memory_kb = bank.memory_size() / 1024,
            "Samples loaded"
        );
        bank
    }

    /// Loads a single sample. Failures are logged and leave the slot empty.
    async fn load_sample(&self, id: SampleId) -> Option<AudioBuffer> {
        let encoded = match self.assets.fetch(id, &self.session).await {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(sample = %id, err = %e, "Unable to fetch sample");
                return None;
            }
        };

        let device = self.device.clone();
        let decoded = tokio::task::spawn_blocking(move || device.decode(&encoded)).await;
        let mut buffer = match decoded {
            Ok(Ok(buffer)) => buffer,
            Ok(Err(e)) => {
                error!(sample = %id, err = %e, "Unable to decode sample");
                return None;
            }
            Err(e) => {
                error!(sample = %id, err = %e, "Sample decode task failed");
                return None;
            }
        };

        normalize(&mut buffer);
        debug!(
            sample = %id,
            frames = buffer.frames(),
            channels = buffer.channel_count(),
            "Sample loaded"
        );
        Some(buffer)
    }
}

impl std::fmt::Debug for SamplePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplePlayer")
            .field("device", &self.device.to_string())
            .field("session", &self.session)
            .field("loaded", &self.bank.initialized())
            .field("voices", &*self.voices.lock())
            .finish()
    }
}
