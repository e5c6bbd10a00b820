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

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::{Error, ErrorKind, Result};

pub static ANSI_RESET: &str = "\x1b[0m";
pub static ANSI_RED: &str = "\x1b[31m";
pub static ANSI_ORANGE: &str = "\x1b[33m";
pub static ANSI_CYAN: &str = "\x1b[36m";
pub static ANSI_GRAY: &str = "\x1b[37;2m";
pub static ANSI_MAGENTA: &str = "\x1b[95m";

pub struct ConsoleLogger {
    pub log_level: Level,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.log_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_color = match record.level() {
            Level::Info => ANSI_MAGENTA,
            Level::Debug => ANSI_CYAN,
            Level::Warn => ANSI_ORANGE,
            Level::Error => ANSI_RED,
            Level::Trace => ANSI_GRAY,
        };
        println!(
            "{}[{}]{} {}{}:{} {}: {}",
            ANSI_GRAY,
            chrono::offset::Local::now().format("%Y-%m-%d %H:%M:%S"),
            ANSI_RESET,
            level_color,
            record.level(),
            ANSI_RESET,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

pub fn level_for_verbosity(name: Option<&str>, verbose_count: u32) -> LevelFilter {
    match name {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => match verbose_count {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        },
    }
}

pub fn init_logger(logger: &'static dyn log::Log, max_level: LevelFilter) -> Result<()> {
    let res: core::result::Result<(), SetLoggerError> =
        log::set_logger(logger).map(|()| log::set_max_level(max_level));

    res.map_err(|err| Error::new(ErrorKind::Other, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{debug, error, info, trace, warn};

    #[test]
    fn logger_integrity() {
        static GLOBAL_LOGGER: ConsoleLogger = ConsoleLogger {
            log_level: Level::Trace,
        };
        init_logger(&GLOBAL_LOGGER, LevelFilter::Trace).ok();

        error!("this macro should not panic");
        info!("this macro should not panic");
        debug!("this macro should not panic");
        warn!("this macro should not panic");
        trace!("this macro should not panic");
    }

    #[test]
    fn verbosity_maps_to_level() {
        assert_eq!(level_for_verbosity(None, 0), LevelFilter::Info);
        assert_eq!(level_for_verbosity(None, 2), LevelFilter::Trace);
        assert_eq!(level_for_verbosity(Some("warn"), 0), LevelFilter::Warn);
    }
}
