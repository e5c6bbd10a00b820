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

//! TOML configuration schema for the `relayd` binary.

use serde::Deserialize;

/// Sentinel meaning "this socket role is not configured."
pub const UNSPECIFIED: &str = "unspecified";

fn default_unspecified() -> String {
    UNSPECIFIED.to_string()
}

#[derive(Deserialize, PartialEq, Debug, Clone)]
pub struct RelayConfig {
    pub daemon: Daemon,
    pub messagedirector: MessageDirectorConfig,
}

#[derive(Deserialize, PartialEq, Debug, Clone)]
pub struct Daemon {
    pub name: String,
    pub log_level: Option<String>,
}

#[derive(Deserialize, PartialEq, Debug, Clone)]
pub struct MessageDirectorConfig {
    /// `"<host>:<port>"` to accept connections, or `"unspecified"` to
    /// run with no local listener (upstream-only leaf).
    #[serde(default = "default_unspecified")]
    pub bind: String,
    /// `"<host>:<port>"` of a parent director, or `"unspecified"` for
    /// a root director.
    #[serde(default = "default_unspecified")]
    pub connect: String,
}

impl MessageDirectorConfig {
    pub fn wants_bind(&self) -> Option<&str> {
        (self.bind != UNSPECIFIED).then_some(self.bind.as_str())
    }

    pub fn wants_upstream(&self) -> Option<&str> {
        (self.connect != UNSPECIFIED).then_some(self.connect.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let toml_src = r#"
            [daemon]
            name = "relayd"

            [messagedirector]
            bind = "0.0.0.0:7100"
            connect = "unspecified"
        "#;
        let cfg: RelayConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.daemon.name, "relayd");
        assert_eq!(cfg.messagedirector.wants_bind(), Some("0.0.0.0:7100"));
        assert_eq!(cfg.messagedirector.wants_upstream(), None);
    }

    #[test]
    fn bind_and_connect_default_to_unspecified() {
        let toml_src = r#"
            [daemon]
            name = "relayd"

            [messagedirector]
        "#;
        let cfg: RelayConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.messagedirector.bind, UNSPECIFIED);
        assert_eq!(cfg.messagedirector.connect, UNSPECIFIED);
    }
}
