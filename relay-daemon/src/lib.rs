/*
    This file is part of the relay-director workspace.

    relay-director is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    relay-director is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with relay-director. If not, see <https://www.gnu.org/licenses/>.
*/

//! Ambient daemon plumbing shared by the `relayd` binary: TOML
//! configuration and console logging.

pub mod config;
pub mod error;
pub mod logger;

pub use config::RelayConfig;
pub use error::ConfigError;
pub use logger::ConsoleLogger;

use std::io::Read;

/// Reads and parses a configuration file, wrapping I/O and TOML
/// errors into a single [`ConfigError`].
pub fn load_config(path: &str) -> Result<RelayConfig, ConfigError> {
    let mut contents = String::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;

    Ok(toml::from_str(&contents)?)
}
