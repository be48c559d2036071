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
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use hound::{SampleFormat, WavSpec, WavWriter};
use parking_lot::Mutex;

use crate::assets::{sample_path, AssetError, AssetSource};
use crate::samples::{SampleId, SAMPLE_COUNT};
use crate::session::SessionTag;

const POLL_TICK: Duration = Duration::from_millis(10);
const POLL_TIMEOUT: Duration = Duration::from_secs(3);

/// Wait for the given predicate to return true or fail.
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    loop {
        if predicate() {
            return;
        }
        if start.elapsed() > POLL_TIMEOUT {
            panic!("{}", error_msg);
        }
        thread::sleep(POLL_TICK);
    }
}

/// Wait for the given predicate to return true or fail, without blocking the runtime.
pub async fn eventually_async<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    loop {
        if predicate() {
            return;
        }
        if start.elapsed() > POLL_TIMEOUT {
            panic!("{}", error_msg);
        }
        tokio::time::sleep(POLL_TICK).await;
    }
}

/// Encodes planar channels as a 32-bit float WAV file.
pub fn wav_bytes(channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
    assert!(!channels.is_empty(), "At least one channel is required");
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(
            &mut cursor,
            WavSpec {
                channels: channels.len() as u16,
                sample_rate,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
        )
        .unwrap();

        for frame in 0..frames {
            for channel in channels {
                writer.write_sample(channel[frame]).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// A mono WAV file holding `frames` frames of a constant level.
pub fn tone(level: f32, frames: usize) -> Bytes {
    Bytes::from(wav_bytes(&[vec![level; frames]], 44100))
}

/// An asset source backed by a map of sample index to file contents. Missing samples answer
/// like an HTTP 404.
pub struct MemoryAssetSource {
    files: HashMap<usize, Bytes>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
    requests: Mutex<Vec<(SampleId, SessionTag)>>,
}

impl MemoryAssetSource {
    pub fn new() -> MemoryAssetSource {
        MemoryAssetSource {
            files: HashMap::new(),
            delay: None,
            fetches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A full bank where every sample is `frames` frames of a loud constant level.
    pub fn full(frames: usize) -> MemoryAssetSource {
        let mut source = MemoryAssetSource::new();
        for index in 0..SAMPLE_COUNT {
            source = source.with(index, tone(0.8, frames));
        }
        source
    }

    pub fn with(mut self, index: usize, file: Bytes) -> MemoryAssetSource {
        self.files.insert(index, file);
        self
    }

    pub fn without(mut self, indices: &[usize]) -> MemoryAssetSource {
        let indices: HashSet<&usize> = indices.iter().collect();
        self.files.retain(|index, _| !indices.contains(index));
        self
    }

    /// Delays every fetch, so concurrent loads overlap.
    pub fn with_delay(mut self, delay: Duration) -> MemoryAssetSource {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Every request made so far.
    pub fn requests(&self) -> Vec<(SampleId, SessionTag)> {
        self.requests.lock().clone()
    }
}

impl Default for MemoryAssetSource {
    fn default() -> Self {
        MemoryAssetSource::new()
    }
}

#[async_trait]
impl AssetSource for MemoryAssetSource {
    async fn fetch(&self, id: SampleId, session: &SessionTag) -> Result<Bytes, AssetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((id, session.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.files
            .get(&id.index())
            .cloned()
            .ok_or_else(|| AssetError::Status {
                url: sample_path(id, "wav"),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}
