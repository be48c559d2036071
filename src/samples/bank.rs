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

//! The in-memory sample bank.
//!
//! Samples are decoded and normalized once, then shared between voices.

use std::sync::Arc;

use super::{SampleId, NORMALIZE_CEILING, SAMPLE_COUNT};
use crate::audio::AudioBuffer;

/// Scales the first channel down so its peak magnitude is at most `NORMALIZE_CEILING`.
/// Quieter buffers are left untouched. Only the first channel is measured and scaled.
pub fn normalize(buffer: &mut AudioBuffer) {
    let Some(samples) = buffer.channel_mut(0) else {
        return;
    };

    let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
    if peak > NORMALIZE_CEILING {
        let scale = NORMALIZE_CEILING / peak;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Fixed set of sample slots. A slot is empty when its sample failed to load.
#[derive(Clone, Debug)]
pub struct SampleBank {
    slots: Vec<Option<Arc<AudioBuffer>>>,
}

impl SampleBank {
    /// Creates a bank from per-slot results. Missing trailing slots are empty and
    /// anything past `SAMPLE_COUNT` is ignored.
    pub fn from_slots(slots: impl IntoIterator<Item = Option<AudioBuffer>>) -> SampleBank {
        let mut slots: Vec<Option<Arc<AudioBuffer>>> = slots
            .into_iter()
            .take(SAMPLE_COUNT)
            .map(|slot| slot.map(Arc::new))
            .collect();
        slots.resize(SAMPLE_COUNT, None);
        SampleBank { slots }
    }

    /// Gets the buffer for the given sample, if it loaded.
    pub fn get(&self, id: SampleId) -> Option<Arc<AudioBuffer>> {
        self.slots[id.index()].clone()
    }

    pub fn is_loaded(&self, id: SampleId) -> bool {
        self.slots[id.index()].is_some()
    }

    /// Number of slots holding a sample.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Total memory held by the loaded samples, in bytes.
    pub fn memory_size(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .map(|buffer| buffer.memory_size())
            .sum()
    }
}
