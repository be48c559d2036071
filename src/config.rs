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
use std::path::Path;

use config::{Config, File, FileFormat};
use tracing::info;

mod assets;
mod audio;
mod error;
mod player;
mod server;

pub use self::assets::{AssetLocation, Assets};
pub use self::audio::Audio;
pub use self::error::ConfigError;
pub use self::player::Player;
pub use self::server::Server;

/// Loads the player configuration from the given YAML file. Without a file, every setting
/// takes its default.
pub fn load(path: Option<&Path>) -> Result<Player, ConfigError> {
    let Some(path) = path else {
        return Ok(Player::default());
    };

    info!(path = ?path, "Loading configuration");
    Ok(Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .build()?
        .try_deserialize::<Player>()?)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_load_without_file() {
        let player = load(None).unwrap();
        assert_eq!(player.audio().device(), None);
        assert_eq!(player.audio().extension(), "mp3");
        assert_eq!(player.session_file(), Path::new(".sfxpad-session"));
        assert_eq!(
            player.asset_location(),
            AssetLocation::Dir(PathBuf::from("public"))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfxpad.yaml");
        fs::write(
            &path,
            r#"
audio:
  device: mock-device
assets:
  url: https://sfx.example.com/pad/
server:
  port: 9000
"#,
        )
        .unwrap();

        let player = load(Some(path.as_path())).unwrap();
        assert_eq!(player.audio().device(), Some("mock-device"));
        assert_eq!(
            player.asset_location(),
            AssetLocation::Url("https://sfx.example.com/pad/".to_string())
        );
        assert_eq!(player.server().port(), 9000);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(Some(dir.path().join("nope.yaml").as_path())),
            Err(ConfigError::Load(_))
        ));
    }
}
