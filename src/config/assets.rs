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
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where sample files are fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetLocation {
    /// Base URL of an HTTP server.
    Url(String),
    /// Local directory.
    Dir(PathBuf),
}

/// A YAML representation of the asset configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Assets {
    /// Base URL to fetch samples from. Takes precedence over `path`.
    url: Option<String>,

    /// Local directory to read samples from.
    path: Option<PathBuf>,
}

impl Assets {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
