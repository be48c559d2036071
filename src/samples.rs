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

//! Sound-effect playback.
//!
//! This module provides:
//! - Loading a fixed bank of samples from an asset source, normalized and kept in memory
//! - Voice management with a hard polyphony limit (oldest voice is stolen)
//! - Triggering one-shot voices with a stereo position

mod bank;
mod engine;
mod sound;
mod voice;

pub use bank::{normalize, SampleBank};
pub use engine::SamplePlayer;
pub use sound::{PlayOptions, SampleId, SoundRef};
pub use voice::{Voice, VoicePool};

/// Number of samples in the bank.
pub const SAMPLE_COUNT: usize = 16;

/// Maximum number of voices playing at once.
pub const MAX_SIMULTANEOUS_SOUNDS: usize = 4;

/// Gain of the shared output stage.
pub const MASTER_GAIN: f32 = 0.5;

/// Gain applied to each voice before panning.
pub const VOICE_GAIN: f32 = 0.5;

/// Peak level samples are normalized down to.
pub const NORMALIZE_CEILING: f32 = 0.5;
