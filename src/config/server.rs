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

const DEFAULT_ROOT: &str = "public";
const DEFAULT_PORT: u16 = 8000;

/// A YAML representation of the static server configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Server {
    /// Directory of static files to serve (default: public)
    root: Option<PathBuf>,

    /// Port to listen on (default: 8000)
    port: Option<u16>,
}

impl Server {
    pub fn root(&self) -> &Path {
        self.root.as_deref().unwrap_or(Path::new(DEFAULT_ROOT))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Returns true if the port was set explicitly.
    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }
}
