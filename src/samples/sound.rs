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

//! Sample identifiers and play requests.

use std::fmt;

use super::SAMPLE_COUNT;

/// Identifies one of the fixed samples. Always in `0..SAMPLE_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(u8);

impl SampleId {
    /// Creates an ID from a zero-based index.
    pub fn new(index: usize) -> Option<SampleId> {
        if index < SAMPLE_COUNT {
            Some(SampleId(index as u8))
        } else {
            None
        }
    }

    /// Creates an ID from the 1-based sample number used in file names.
    pub fn from_number(number: usize) -> Option<SampleId> {
        number.checked_sub(1).and_then(SampleId::new)
    }

    /// Every sample ID in order.
    pub fn all() -> impl Iterator<Item = SampleId> {
        (0..SAMPLE_COUNT as u8).map(SampleId)
    }

    /// The zero-based index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The 1-based sample number.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    /// The zero-padded two digit number, e.g. `07`.
    pub fn padded(self) -> String {
        format!("{:02}", self.number())
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample {}", self.padded())
    }
}

/// A request to play a sound: either a typed ID or a sample file name such as `hit-07.mp3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoundRef {
    Id(SampleId),
    Name(String),
}

impl SoundRef {
    /// Resolves the reference to a sample. Names carry the 1-based number as the two
    /// characters just before a four character extension; anything else resolves to None.
    pub fn resolve(&self) -> Option<SampleId> {
        match self {
            SoundRef::Id(id) => Some(*id),
            SoundRef::Name(name) => {
                let chars: Vec<char> = name.chars().collect();
                if chars.len() < 6 {
                    return None;
                }
                let digits = &chars[chars.len() - 6..chars.len() - 4];
                if !digits.iter().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let number: usize = digits.iter().collect::<String>().parse().ok()?;
                SampleId::from_number(number)
            }
        }
    }
}

impl From<SampleId> for SoundRef {
    fn from(id: SampleId) -> Self {
        SoundRef::Id(id)
    }
}

impl From<&str> for SoundRef {
    fn from(name: &str) -> Self {
        SoundRef::Name(name.to_string())
    }
}

impl From<String> for SoundRef {
    fn from(name: String) -> Self {
        SoundRef::Name(name)
    }
}

/// Options for a single play request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayOptions {
    /// Stereo position, -1.0 (left) to 1.0 (right). Centered when unset.
    pub position: Option<f32>,
}

impl PlayOptions {
    pub fn at(position: f32) -> PlayOptions {
        PlayOptions {
            position: Some(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_id_bounds() {
        assert_eq!(SampleId::new(0).map(SampleId::number), Some(1));
        assert_eq!(SampleId::new(15).map(SampleId::padded), Some("16".to_string()));
        assert_eq!(SampleId::new(16), None);
        assert_eq!(SampleId::from_number(0), None);
        assert_eq!(SampleId::from_number(7).map(SampleId::index), Some(6));
        assert_eq!(SampleId::all().count(), SAMPLE_COUNT);
    }

    #[test]
    fn test_resolve_names() {
        let resolve = |name: &str| SoundRef::from(name).resolve().map(SampleId::index);

        assert_eq!(resolve("samples/07.mp3"), Some(6));
        assert_eq!(resolve("hit-07.mp3"), Some(6));
        assert_eq!(resolve("boom07.wav"), Some(6));
        assert_eq!(resolve("01.ogg"), Some(0));
        assert_eq!(resolve("pad-16.mp3"), Some(15));
    }

    #[test]
    fn test_resolve_out_of_range_names() {
        let resolve = |name: &str| SoundRef::from(name).resolve();

        assert_eq!(resolve("xx-99.mp3"), None);
        assert_eq!(resolve("xx-17.mp3"), None);
        assert_eq!(resolve("xx-00.mp3"), None);
        assert_eq!(resolve("xx-ab.mp3"), None);
        assert_eq!(resolve("7.mp3"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_resolve_id() {
        let id = SampleId::new(3).unwrap();
        assert_eq!(SoundRef::from(id).resolve(), Some(id));
    }
}
