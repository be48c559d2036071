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
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::{sample_path, AssetError, AssetSource};
use crate::samples::SampleId;
use crate::session::SessionTag;

/// Reads samples from `<root>/samples/NN.<ext>`. The session tag is only logged.
pub struct DirAssetSource {
    root: PathBuf,
    extension: String,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> DirAssetSource {
        DirAssetSource {
            root: root.into(),
            extension: extension.to_string(),
        }
    }

    /// The file a sample is read from.
    pub fn sample_file(&self, id: SampleId) -> PathBuf {
        self.root.join(sample_path(id, &self.extension))
    }
}

#[async_trait]
impl AssetSource for DirAssetSource {
    async fn fetch(&self, id: SampleId, session: &SessionTag) -> Result<Bytes, AssetError> {
        let path = self.sample_file(id);
        debug!(sample = %id, path = ?path, session = %session, "Reading sample");
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|source| AssetError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("samples")).unwrap();
        std::fs::write(dir.path().join("samples").join("05.wav"), b"data").unwrap();

        let source = DirAssetSource::new(dir.path(), "wav");
        let session = SessionTag::new("s");

        let bytes = source
            .fetch(SampleId::new(4).unwrap(), &session)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"data");

        let missing = source.fetch(SampleId::new(5).unwrap(), &session).await;
        assert!(matches!(missing, Err(AssetError::Io { .. })));
    }
}
