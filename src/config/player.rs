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

use super::assets::{AssetLocation, Assets};
use super::audio::Audio;
use super::server::Server;

const DEFAULT_SESSION_FILE: &str = ".sfxpad-session";

/// The configuration for the sound-effect player.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Player {
    /// The audio configuration.
    #[serde(default)]
    audio: Audio,
    /// Where the samples come from.
    #[serde(default)]
    assets: Assets,
    /// File the session tag is kept in.
    session_file: Option<PathBuf>,
    /// The static server configuration.
    #[serde(default)]
    server: Server,
}

impl Player {
    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn session_file(&self) -> &Path {
        self.session_file
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_SESSION_FILE))
    }

    /// Resolves where samples are fetched from. Without an explicit URL or path, samples are
    /// read from the static server's root directory.
    pub fn asset_location(&self) -> AssetLocation {
        match (self.assets.url(), self.assets.path()) {
            (Some(url), _) => AssetLocation::Url(url.to_string()),
            (None, Some(path)) => AssetLocation::Dir(path.to_path_buf()),
            (None, None) => AssetLocation::Dir(self.server.root().to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    #[test]
    fn test_player_deserialize() {
        let yaml = r#"
            audio:
              device: mock-device
              extension: wav
            assets:
              path: /srv/sfx
            session_file: /tmp/sfx-session
            server:
              root: site
        "#;

        let player: Player = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(player.audio().device(), Some("mock-device"));
        assert_eq!(player.audio().extension(), "wav");
        assert_eq!(
            player.asset_location(),
            AssetLocation::Dir(PathBuf::from("/srv/sfx"))
        );
        assert_eq!(player.session_file(), Path::new("/tmp/sfx-session"));
        assert_eq!(player.server().root(), Path::new("site"));
        assert_eq!(player.server().port(), 8000);
        assert!(!player.server().has_port());
    }

    #[test]
    fn test_assets_default_to_server_root() {
        let yaml = r#"
            server:
              root: site
        "#;

        let player: Player = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            player.asset_location(),
            AssetLocation::Dir(PathBuf::from("site"))
        );
    }
}
