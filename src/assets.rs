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

//! Sources of encoded sample files.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{self, AssetLocation};
use crate::samples::SampleId;
use crate::session::SessionTag;

mod dir;
mod http;

pub use dir::DirAssetSource;
pub use http::HttpAssetSource;

/// Directory, relative to the asset root, that holds the sample files.
const SAMPLES_DIR: &str = "samples";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid asset URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Fetches the encoded bytes of a sample. Each call is independent; there are no retries.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, id: SampleId, session: &SessionTag) -> Result<Bytes, AssetError>;
}

/// Path of a sample file relative to the asset root, e.g. `samples/07.mp3`.
pub fn sample_path(id: SampleId, extension: &str) -> String {
    format!("{}/{}.{}", SAMPLES_DIR, id.padded(), extension)
}

/// Creates the asset source described by the configuration.
pub fn from_config(config: &config::Player) -> Result<Arc<dyn AssetSource>, AssetError> {
    let extension = config.audio().extension();
    Ok(match config.asset_location() {
        AssetLocation::Url(url) => Arc::new(HttpAssetSource::new(&url, extension)?),
        AssetLocation::Dir(root) => Arc::new(DirAssetSource::new(root, extension)),
    })
}
