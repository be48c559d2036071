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
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{sample_path, AssetError, AssetSource};
use crate::samples::SampleId;
use crate::session::SessionTag;

/// Fetches samples over HTTP from `<base>/samples/NN.<ext>?session=<tag>`.
pub struct HttpAssetSource {
    client: Client,
    base: Url,
    extension: String,
}

impl HttpAssetSource {
    pub fn new(base: &str, extension: &str) -> Result<HttpAssetSource, AssetError> {
        let mut base = Url::parse(base)?;
        // Joining against a base without a trailing slash would replace its last segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(HttpAssetSource {
            client: Client::new(),
            base,
            extension: extension.to_string(),
        })
    }

    /// The full URL for a sample request.
    pub fn sample_url(&self, id: SampleId, session: &SessionTag) -> Result<Url, AssetError> {
        let mut url = self.base.join(&sample_path(id, &self.extension))?;
        url.query_pairs_mut().append_pair("session", session.as_str());
        Ok(url)
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, id: SampleId, session: &SessionTag) -> Result<Bytes, AssetError> {
        let url = self.sample_url(id, session)?;
        debug!(sample = %id, url = %url, "Fetching sample");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?)
    }
}
