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
use std::time::Duration;

/// A decoded audio clip held entirely in memory in planar format.
/// Every channel has the same number of frames.
#[derive(Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Creates a buffer from planar channel data. Channels are truncated to the shortest one.
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> AudioBuffer {
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        for channel in channels.iter_mut() {
            channel.truncate(frames);
        }
        AudioBuffer {
            channels,
            sample_rate,
        }
    }

    /// Creates a single channel buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> AudioBuffer {
        AudioBuffer::new(vec![samples], sample_rate)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(|c| c.as_mut_slice())
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.channels.iter().map(|c| c.len()).sum::<usize>() * std::mem::size_of::<f32>()
    }

    /// Returns a copy of this buffer at the target sample rate, using linear interpolation.
    /// Good enough for one-shot effects; the buffer is returned unchanged if the rates match.
    pub fn resampled(self, target_rate: u32) -> AudioBuffer {
        if target_rate == self.sample_rate || self.sample_rate == 0 || target_rate == 0 {
            return self;
        }

        let ratio = target_rate as f64 / self.sample_rate as f64;
        let source_frames = self.frames();
        let target_frames = (source_frames as f64 * ratio).ceil() as usize;

        let channels = self
            .channels
            .iter()
            .map(|samples| {
                let mut output = Vec::with_capacity(target_frames);
                for target_frame in 0..target_frames {
                    let source_pos = target_frame as f64 / ratio;
                    let source_frame = source_pos.floor() as usize;
                    let frac = source_pos.fract() as f32;

                    let s0 = samples.get(source_frame).copied().unwrap_or(0.0);
                    let s1 = samples.get(source_frame + 1).copied().unwrap_or(s0);
                    output.push(s0 + (s1 - s0) * frac);
                }
                output
            })
            .collect();

        AudioBuffer {
            channels,
            sample_rate: target_rate,
        }
    }
}

impl fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("channels", &self.channel_count())
            .field("frames", &self.frames())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}
