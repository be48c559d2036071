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
// Core voice mixing logic that can be used by both CPAL and test implementations
use crate::audio::panner::{mono_gains, pan_stereo};
use crate::audio::{VoiceChain, VoiceHandle, VoiceId};

/// Reported by the mixer when a voice leaves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The voice played to the end of its buffer.
    Ended(VoiceId),
    /// The voice was stopped before reaching the end.
    Dropped(VoiceId),
}

/// A voice currently being rendered.
struct ActiveVoice {
    chain: VoiceChain,
    handle: VoiceHandle,
    /// Next frame to render.
    position: usize,
}

/// Mixes one-shot voices into an interleaved output buffer.
/// The mixer is owned by the render thread; voices are handed to it, never shared.
pub struct VoiceMixer {
    voices: Vec<ActiveVoice>,
    num_channels: u16,
    master_gain: f32,
}

impl VoiceMixer {
    /// Creates a new mixer with room for `capacity` voices before reallocating.
    pub fn new(num_channels: u16, master_gain: f32, capacity: usize) -> Self {
        Self {
            voices: Vec::with_capacity(capacity),
            num_channels: num_channels.max(1),
            master_gain,
        }
    }

    /// Adds a voice that starts on the next render pass.
    pub fn add_voice(&mut self, chain: VoiceChain, handle: VoiceHandle) {
        self.voices.push(ActiveVoice {
            chain,
            handle,
            position: 0,
        });
    }

    /// Returns the number of voices still rendering.
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Renders as many whole frames as fit in `output`. Voices that end or were stopped are
    /// removed and passed to `report`.
    pub fn render<F>(&mut self, output: &mut [f32], mut report: F)
    where
        F: FnMut(VoiceEvent),
    {
        output.fill(0.0);

        let num_channels = self.num_channels as usize;
        let frames = output.len() / num_channels;

        self.voices.retain_mut(|voice| {
            if voice.handle.is_stopped() {
                report(VoiceEvent::Dropped(voice.chain.id));
                return false;
            }

            let buffer = &voice.chain.buffer;
            let total = buffer.frames();
            let gain = voice.chain.gain;
            let pan = voice.chain.pan;
            let (mono_left, mono_right) = mono_gains(pan);
            let first = buffer.channel(0).unwrap_or(&[]);
            let second = buffer.channel(1);

            for frame in 0..frames {
                if voice.position >= total {
                    break;
                }
                let sample = first[voice.position];
                let (left, right) = match second {
                    Some(second) => pan_stereo(sample, second[voice.position], pan),
                    None => (sample * mono_left, sample * mono_right),
                };

                let offset = frame * num_channels;
                if num_channels == 1 {
                    output[offset] += (left + right) * 0.5 * gain;
                } else {
                    output[offset] += left * gain;
                    output[offset + 1] += right * gain;
                }
                voice.position += 1;
            }

            if voice.position >= total {
                voice.handle.mark_finished();
                report(VoiceEvent::Ended(voice.chain.id));
                return false;
            }
            true
        });

        for sample in output.iter_mut() {
            *sample *= self.master_gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::audio::AudioBuffer;

    fn chain(buffer: AudioBuffer, gain: f32, pan: f32) -> VoiceChain {
        VoiceChain {
            id: VoiceId::next(),
            buffer: Arc::new(buffer),
            gain,
            pan,
        }
    }

    #[test]
    fn test_mono_voice_hard_left() {
        let mut mixer = VoiceMixer::new(2, 1.0, 4);
        mixer.add_voice(
            chain(AudioBuffer::mono(vec![0.5, 0.8], 44100), 1.0, -1.0),
            VoiceHandle::new(),
        );

        let mut output = vec![0.0; 4];
        mixer.render(&mut output, |_| {});

        assert!((output[0] - 0.5).abs() < 1e-6);
        assert!(output[1].abs() < 1e-6);
        assert!((output[2] - 0.8).abs() < 1e-6);
        assert!(output[3].abs() < 1e-6);
    }

    #[test]
    fn test_gain_stages_multiply() {
        let mut mixer = VoiceMixer::new(2, 0.5, 4);
        mixer.add_voice(
            chain(
                AudioBuffer::new(vec![vec![1.0; 8], vec![1.0; 8]], 44100),
                0.5,
                0.0,
            ),
            VoiceHandle::new(),
        );

        let mut output = vec![0.0; 4];
        mixer.render(&mut output, |_| {});

        for sample in output {
            assert!((sample - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_multiple_voices_sum() {
        let mut mixer = VoiceMixer::new(2, 1.0, 4);
        let stereo = |l: f32, r: f32| AudioBuffer::new(vec![vec![l; 4], vec![r; 4]], 44100);
        mixer.add_voice(chain(stereo(0.5, 0.3), 1.0, 0.0), VoiceHandle::new());
        mixer.add_voice(chain(stereo(0.2, 0.1), 1.0, 0.0), VoiceHandle::new());

        let mut output = vec![0.0; 2];
        mixer.render(&mut output, |_| {});

        assert!((output[0] - 0.7).abs() < 1e-6);
        assert!((output[1] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_voice_end_is_reported() {
        let mut mixer = VoiceMixer::new(2, 1.0, 4);
        let voice = chain(AudioBuffer::mono(vec![0.1; 3], 44100), 1.0, 0.0);
        let id = voice.id;
        let handle = VoiceHandle::new();
        mixer.add_voice(voice, handle.clone());

        let mut events = Vec::new();
        let mut output = vec![0.0; 4];
        mixer.render(&mut output, |event| events.push(event));
        assert!(events.is_empty());
        assert_eq!(mixer.active_count(), 1);

        mixer.render(&mut output, |event| events.push(event));
        assert_eq!(events, vec![VoiceEvent::Ended(id)]);
        assert_eq!(mixer.active_count(), 0);
        assert!(handle.is_finished());
        // Only the third frame was left in the second pass.
        assert_eq!(output[2], 0.0);
    }

    #[test]
    fn test_stopped_voice_is_dropped_silently() {
        let mut mixer = VoiceMixer::new(2, 1.0, 4);
        let voice = chain(AudioBuffer::mono(vec![1.0; 64], 44100), 1.0, 0.0);
        let id = voice.id;
        let handle = VoiceHandle::new();
        mixer.add_voice(voice, handle.clone());
        handle.stop();

        let mut events = Vec::new();
        let mut output = vec![0.0; 8];
        mixer.render(&mut output, |event| events.push(event));

        assert_eq!(events, vec![VoiceEvent::Dropped(id)]);
        assert!(output.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_mono_output_folds_stereo() {
        let mut mixer = VoiceMixer::new(1, 1.0, 4);
        mixer.add_voice(
            chain(
                AudioBuffer::new(vec![vec![0.4; 2], vec![0.2; 2]], 44100),
                1.0,
                0.0,
            ),
            VoiceHandle::new(),
        );

        let mut output = vec![0.0; 2];
        mixer.render(&mut output, |_| {});
        assert!((output[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_extra_output_channels_are_silent() {
        let mut mixer = VoiceMixer::new(4, 1.0, 4);
        mixer.add_voice(
            chain(AudioBuffer::mono(vec![1.0; 2], 44100), 1.0, 0.0),
            VoiceHandle::new(),
        );

        let mut output = vec![0.0; 8];
        mixer.render(&mut output, |_| {});
        assert!(output[0] > 0.0 && output[1] > 0.0);
        assert_eq!(output[2], 0.0);
        assert_eq!(output[3], 0.0);
    }
}
