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

//! In-memory decoding of encoded sample files.
//!
//! Samples arrive as complete files (MP3, WAV, FLAC, OGG, ...) and are decoded in one go
//! with symphonia.

use std::io::Cursor;

use symphonia::core::audio::{AudioBuffer as SymphoniaBuffer, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, warn};

use super::buffer::AudioBuffer;
use super::error::AudioError;

/// Decodes a complete encoded audio file held in memory.
/// The format is probed from the content; `extension` is only a hint.
pub fn decode(encoded: &[u8], extension: Option<&str>) -> Result<AudioBuffer, AudioError> {
    if encoded.is_empty() {
        return Err(AudioError::Decode("empty input".to_string()));
    }

    let cursor = Cursor::new(encoded.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("sample rate not specified".to_string()))?;

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&params, &decoder_opts)
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut channels: Vec<Vec<f32>> = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            // Some readers report a decode error at the end of the stream instead of EOF.
            Err(SymphoniaError::DecodeError(_)) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(error = e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let mut converted = SymphoniaBuffer::<f32>::new(decoded.capacity() as u64, spec);
        decoded.convert(&mut converted);

        let channel_count = spec.channels.count();
        if channels.is_empty() {
            channels = vec![Vec::new(); channel_count];
        }
        for (index, channel) in channels.iter_mut().enumerate().take(channel_count) {
            channel.extend_from_slice(converted.chan(index));
        }
    }

    let buffer = AudioBuffer::new(channels, sample_rate);
    if buffer.is_empty() {
        return Err(AudioError::Decode("no audio frames decoded".to_string()));
    }

    debug!(
        channels = buffer.channel_count(),
        frames = buffer.frames(),
        sample_rate,
        "Decoded sample"
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::wav_bytes;

    #[test]
    fn test_decode_mono_wav() {
        let samples: Vec<f32> = (0..441).map(|i| (i as f32 / 441.0) - 0.5).collect();
        let bytes = wav_bytes(&[samples.clone()], 44100);

        let buffer = decode(&bytes, Some("wav")).unwrap();
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.frames(), samples.len());
        for (decoded, original) in buffer.channel(0).unwrap().iter().zip(samples.iter()) {
            assert!((decoded - original).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decode_stereo_wav_without_hint() {
        let left = vec![0.5f32; 100];
        let right = vec![-0.25f32; 100];
        let bytes = wav_bytes(&[left, right], 48000);

        let buffer = decode(&bytes, None).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.sample_rate(), 48000);
        assert_eq!(buffer.frames(), 100);
        assert!((buffer.channel(1).unwrap()[10] + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode(b"definitely not audio data", Some("mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_empty_fails() {
        assert!(matches!(decode(&[], None), Err(AudioError::Decode(_))));
    }
}
