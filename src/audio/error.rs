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
/// Error types for decoding and output device operations
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Audio file error: {0}")]
    Symphonia(#[from] symphonia::core::errors::Error),

    #[error("No output device found with name {0}")]
    NoDevice(String),

    #[error("Output stream error: {0}")]
    Stream(String),

    #[error("Output device is not open")]
    NotOpen,
}
