use clap::{Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::codec::DEFAULT_MAX_FRAME_SIZE;

pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_AOF_PATH: &str = "database.aof";

/// When appended entries are flushed to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppendFsync {
    /// Sync after every appended entry, before the client gets its reply.
    Always,
    /// Leave flushing to the operating system.
    No,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "redlog", version, about)]
pub struct Config {
    /// The address to listen on
    #[arg(long, env = "REDLOG_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// The port to listen on
    #[arg(short, long, env = "REDLOG_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path of the append-only file, created when missing
    #[arg(long, env = "REDLOG_AOF", default_value = DEFAULT_AOF_PATH)]
    pub aof: PathBuf,

    /// When to fsync the append-only file
    #[arg(long, value_enum, env = "REDLOG_APPENDFSYNC", default_value_t = AppendFsync::Always)]
    pub appendfsync: AppendFsync,

    /// Largest frame accepted from a client, in bytes
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            aof: PathBuf::from(DEFAULT_AOF_PATH),
            appendfsync: AppendFsync::Always,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let config = Config::try_parse_from([
            "redlog",
            "--bind",
            "0.0.0.0",
            "-p",
            "7000",
            "--aof",
            "/tmp/x.aof",
            "--appendfsync",
            "no",
            "--max-frame-size",
            "1024",
        ])
        .unwrap();

        assert_eq!(config.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 7000);
        assert_eq!(config.aof, PathBuf::from("/tmp/x.aof"));
        assert_eq!(config.appendfsync, AppendFsync::No);
        assert_eq!(config.max_frame_size, 1024);
    }

    #[test]
    fn rejects_unknown_fsync_policy() {
        let res = Config::try_parse_from(["redlog", "--appendfsync", "sometimes"]);

        assert!(res.is_err());
    }
}
