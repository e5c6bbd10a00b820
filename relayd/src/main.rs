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

//! # relayd
//! Hierarchical publish/subscribe datagram router: reads a TOML
//! configuration file, starts the routing engine, and binds the
//! network adapters it describes.

use log::{error, info};
use relay_daemon::config::RelayConfig;
use relay_daemon::logger::{self, level_for_verbosity, ConsoleLogger};
use relay_director::MessageDirector;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

const BINARY: &str = "relayd";
const DEFAULT_TOML: &str = "daemon.toml";

fn print_help_page() {
    println!(
        "Usage:    {BINARY} [options] ... [CONFIG_FILE]\n\
        \n\
        relayd - hierarchical publish/subscribe datagram router.\n\
        This binary will look for a configuration file (.toml)\n\
        in the current working directory as \"{DEFAULT_TOML}\".\n\
        \n\
        -h, --help       Print the help page.\n\
        -v, --version    Print relayd binary build version & info.\n\
        -c, --config     Path to the TOML configuration file.\n\
        --verbose        Raise the log level; repeat for more detail.\n"
    );
}

#[rustfmt::skip]
fn print_version() {
    let bin_arch: &str = if cfg!(target_arch = "x86") { "x86" }
    else if cfg!(target_arch = "x86_64") { "x86_64" }
    else if cfg!(target_arch = "aarch64") { "aarch64" }
    else { "unknown" };

    let bin_platform: &str = if cfg!(target_os = "linux") { "linux" }
    else if cfg!(target_os = "windows") { "windows" }
    else if cfg!(target_os = "macos") { "macos" }
    else if cfg!(target_os = "freebsd") { "freebsd" }
    else { "unknown" };

    println!(
        "{BINARY}, version {} ({bin_arch}-{bin_platform})\n\n\
        relay-director is free software; you can redistribute it and/or\n\
        modify it under the terms of the GNU Affero General Public\n\
        License, as published by the Free Software Foundation, either\n\
        version 3 of the License, or (at your option) any later version.",
        env!("CARGO_PKG_VERSION")
    );
}

struct Args {
    config_path: String,
    verbose_count: u32,
}

fn parse_args(argv: &[String]) -> Result<Option<Args>, ()> {
    let mut config_path = DEFAULT_TOML.to_string();
    let mut verbose_count = 0u32;

    for arg in &argv[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help_page();
                return Ok(None);
            }
            "-v" | "--version" => {
                print_version();
                return Ok(None);
            }
            "--verbose" => verbose_count += 1,
            other if other.starts_with("-c=") || other.starts_with("--config=") => {
                config_path = other.splitn(2, '=').nth(1).unwrap_or(DEFAULT_TOML).to_string();
            }
            other => {
                println!("{BINARY}: {other}: invalid argument.\n");
                print_help_page();
                return Err(());
            }
        }
    }

    Ok(Some(Args { config_path, verbose_count }))
}

fn main() -> std::io::Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(Some(args)) => args,
        Ok(None) => return Ok(()),
        Err(()) => return Err(Error::new(ErrorKind::InvalidInput, "invalid arguments")),
    };

    let config: RelayConfig = match relay_daemon::load_config(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            println!("relayd cannot start: {err}");
            return Err(Error::new(ErrorKind::InvalidInput, err.to_string()));
        }
    };

    let level_filter = level_for_verbosity(config.daemon.log_level.as_deref(), args.verbose_count);
    static GLOBAL_LOGGER: ConsoleLogger = ConsoleLogger {
        log_level: log::Level::Trace,
    };
    if logger::init_logger(&GLOBAL_LOGGER, level_filter).is_err() {
        println!("failed to initialize logger");
    }

    info!("{} starting, log level {}.", config.daemon.name, level_filter);

    let runtime: Runtime = Builder::new_multi_thread()
        .enable_io()
        .thread_stack_size(2 * 1024 * 1024)
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: RelayConfig) -> std::io::Result<()> {
    let upstream_addr = config.messagedirector.wants_upstream().map(str::to_owned);

    let director = if let Some(addr) = &upstream_addr {
        let (link, pending) = relay_net::connect_upstream(addr).await.map_err(|err| {
            error!("failed to connect to upstream director at {addr}: {err}");
            err
        })?;
        let director = MessageDirector::with_upstream(Arc::new(link));
        tokio::spawn(pending.run(director.clone()));
        director
    } else {
        MessageDirector::new()
    };

    if let Some(bind_addr) = config.messagedirector.wants_bind() {
        let listener = relay_net::Listener::bind(bind_addr).await?;
        info!("message director ready, accepting connections on {bind_addr}.");
        listener.run(director).await?;
    } else {
        info!("message director ready with no local listener; running upstream-only.");
        std::future::pending::<()>().await;
    }

    Ok(())
}
