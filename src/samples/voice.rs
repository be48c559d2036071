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

//! Voice management for one-shot sample playback.
//!
//! Handles the polyphony limit and voice stealing.

use std::collections::VecDeque;

use tracing::debug;

use super::SampleId;
use crate::audio::{VoiceHandle, VoiceId};

/// Represents an active voice playing a sample.
pub struct Voice {
    /// Unique ID for this voice.
    id: VoiceId,
    /// The sample being played.
    sample: SampleId,
    /// Stereo position the voice was started with.
    pan: f32,
    /// Shared with the device; used to stop the voice and to see whether it ended.
    handle: VoiceHandle,
}

impl Voice {
    /// Creates a new voice.
    pub fn new(id: VoiceId, sample: SampleId, pan: f32, handle: VoiceHandle) -> Self {
        Self {
            id,
            sample,
            pan,
            handle,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn sample(&self) -> SampleId {
        self.sample
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Returns true once the voice ended or was stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the voice immediately.
    pub fn stop(&self) {
        self.handle.stop();
    }
}

impl std::fmt::Debug for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voice")
            .field("id", &self.id)
            .field("sample", &self.sample)
            .field("pan", &self.pan)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Active voices in the order they were started, oldest first.
pub struct VoicePool {
    voices: VecDeque<Voice>,
    max_voices: usize,
}

impl VoicePool {
    /// Creates a new voice pool. A limit of zero is treated as one.
    pub fn new(max_voices: usize) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            voices: VecDeque::with_capacity(max_voices),
            max_voices,
        }
    }

    /// Adds a new voice, stealing the oldest voices if the pool is full.
    /// Returns the stolen voices, already stopped.
    pub fn admit(&mut self, voice: Voice) -> Vec<Voice> {
        let stolen = self.make_room();
        self.voices.push_back(voice);
        stolen
    }

    /// Drops finished voices and steals the oldest until a new voice fits.
    /// Returns the stolen voices, already stopped.
    fn make_room(&mut self) -> Vec<Voice> {
        self.purge_finished();

        let mut stolen = Vec::new();
        while self.voices.len() >= self.max_voices {
            let Some(oldest) = self.voices.pop_front() else {
                break;
            };
            oldest.stop();
            debug!(
                voice = %oldest.id,
                sample = %oldest.sample,
                max_voices = self.max_voices,
                "Voice limit reached, stealing oldest"
            );
            stolen.push(oldest);
        }
        stolen
    }

    /// Removes the voice with the given ID. Returns false if it was no longer in the pool.
    pub fn remove(&mut self, id: VoiceId) -> bool {
        match self.voices.iter().position(|v| v.id == id) {
            Some(index) => {
                self.voices.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops voices that have ended or were stopped. Returns how many were dropped.
    pub fn purge_finished(&mut self) -> usize {
        let before = self.voices.len();
        self.voices.retain(|v| !v.is_finished());
        before - self.voices.len()
    }

    /// Returns the current number of active voices.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    /// IDs of the active voices, oldest first.
    pub fn ids(&self) -> Vec<VoiceId> {
        self.voices.iter().map(|v| v.id).collect()
    }

    /// Stops and removes every voice. Returns how many were stopped.
    pub fn clear(&mut self) -> usize {
        let count = self.voices.len();
        for voice in self.voices.drain(..) {
            voice.stop();
        }
        count
    }
}

impl std::fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoicePool")
            .field("active_voices", &self.voices.len())
            .field("max_voices", &self.max_voices)
            .finish()
    }
}
