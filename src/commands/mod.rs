pub mod append;
pub mod command;
pub mod decr;
pub mod decrby;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod get;
pub mod getdel;
pub mod getrange;
pub mod hdel;
pub mod hexists;
pub mod hget;
pub mod hgetall;
pub mod hincrby;
pub mod hkeys;
pub mod hlen;
pub mod hset;
pub mod hstrlen;
pub mod incr;
pub mod incrby;
pub mod keys;
pub mod ping;
pub mod rename;
pub mod set;
pub mod strlen;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

use append::Append;
use command::Command as Command_;
use decr::Decr;
use decrby::DecrBy;
use del::Del;
use echo::Echo;
use exists::Exists;
use get::Get;
use getdel::Getdel;
use getrange::Getrange;
use hdel::Hdel;
use hexists::Hexists;
use hget::Hget;
use hgetall::Hgetall;
use hincrby::HincrBy;
use hkeys::Hkeys;
use hlen::Hlen;
use hset::Hset;
use hstrlen::Hstrlen;
use incr::Incr;
use incrby::IncrBy;
use keys::Keys;
use ping::Ping;
use rename::Rename;
use set::Set;
use strlen::Strlen;

/// Number of arguments a command accepts, not counting the command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, argc: usize) -> bool {
        match *self {
            Arity::Exact(n) => argc == n,
            Arity::AtLeast(n) => argc >= n,
        }
    }
}

/// One entry of the command table.
#[derive(Debug, PartialEq)]
pub struct CommandSpec {
    /// Canonical, upper-case name.
    pub name: &'static str,
    pub arity: Arity,
    /// Write commands mutate the store and are recorded in the append-only file.
    pub write: bool,
}

const fn spec(name: &'static str, arity: Arity, write: bool) -> CommandSpec {
    CommandSpec { name, arity, write }
}

/// Every supported command. Immutable, so it is shared by all connections and by the log
/// replay without any locking.
pub static COMMAND_TABLE: &[CommandSpec] = &[
    spec("APPEND", Arity::Exact(2), true),
    spec("COMMAND", Arity::AtLeast(0), false),
    spec("DECR", Arity::Exact(1), true),
    spec("DECRBY", Arity::Exact(2), true),
    spec("DEL", Arity::AtLeast(1), true),
    spec("ECHO", Arity::Exact(1), false),
    spec("EXISTS", Arity::AtLeast(1), false),
    spec("GET", Arity::Exact(1), false),
    spec("GETDEL", Arity::Exact(1), true),
    spec("GETRANGE", Arity::Exact(3), false),
    spec("HDEL", Arity::AtLeast(2), true),
    spec("HEXISTS", Arity::AtLeast(2), false),
    spec("HGET", Arity::Exact(2), false),
    spec("HGETALL", Arity::Exact(1), false),
    spec("HINCRBY", Arity::Exact(3), true),
    spec("HKEYS", Arity::Exact(1), false),
    spec("HLEN", Arity::Exact(1), false),
    spec("HSET", Arity::Exact(3), true),
    spec("HSTRLEN", Arity::Exact(2), false),
    spec("INCR", Arity::Exact(1), true),
    spec("INCRBY", Arity::Exact(2), true),
    spec("KEYS", Arity::Exact(1), false),
    spec("PING", Arity::Exact(0), false),
    spec("RENAME", Arity::Exact(2), true),
    spec("SET", Arity::Exact(2), true),
    spec("STRLEN", Arity::Exact(1), false),
];

/// Looks up a command by its canonical (upper-case) name.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_TABLE.iter().find(|spec| spec.name == name)
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Append(Append),
    Decr(Decr),
    DecrBy(DecrBy),
    Del(Del),
    Exists(Exists),
    Get(Get),
    Getdel(Getdel),
    Getrange(Getrange),
    Incr(Incr),
    IncrBy(IncrBy),
    Keys(Keys),
    Rename(Rename),
    Set(Set),
    Strlen(Strlen),

    Hdel(Hdel),
    Hexists(Hexists),
    Hget(Hget),
    Hgetall(Hgetall),
    HincrBy(HincrBy),
    Hkeys(Hkeys),
    Hlen(Hlen),
    Hset(Hset),
    Hstrlen(Hstrlen),

    Command(Command_),
    Echo(Echo),
    Ping(Ping),
}

impl Command {
    /// Whether the command mutates the store and therefore belongs in the append-only file.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Append(_)
                | Command::Decr(_)
                | Command::DecrBy(_)
                | Command::Del(_)
                | Command::Getdel(_)
                | Command::Incr(_)
                | Command::IncrBy(_)
                | Command::Rename(_)
                | Command::Set(_)
                | Command::Hdel(_)
                | Command::HincrBy(_)
                | Command::Hset(_)
        )
    }
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        match self {
            Command::Append(cmd) => cmd.exec(store),
            Command::Command(cmd) => cmd.exec(store),
            Command::Decr(cmd) => cmd.exec(store),
            Command::DecrBy(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Echo(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Getdel(cmd) => cmd.exec(store),
            Command::Getrange(cmd) => cmd.exec(store),
            Command::Hdel(cmd) => cmd.exec(store),
            Command::Hexists(cmd) => cmd.exec(store),
            Command::Hget(cmd) => cmd.exec(store),
            Command::Hgetall(cmd) => cmd.exec(store),
            Command::HincrBy(cmd) => cmd.exec(store),
            Command::Hkeys(cmd) => cmd.exec(store),
            Command::Hlen(cmd) => cmd.exec(store),
            Command::Hset(cmd) => cmd.exec(store),
            Command::Hstrlen(cmd) => cmd.exec(store),
            Command::Incr(cmd) => cmd.exec(store),
            Command::IncrBy(cmd) => cmd.exec(store),
            Command::Keys(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Rename(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
            Command::Strlen(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the Redis server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        let spec = lookup(&command_name).ok_or_else(|| CommandParserError::UnknownCommand {
            command: command_name.clone(),
        })?;

        if !spec.arity.accepts(parser.remaining()) {
            return Err(CommandParserError::WrongNumberOfArguments {
                command: command_name.to_lowercase(),
            });
        }

        match spec.name {
            "APPEND" => Append::try_from(parser).map(Command::Append),
            "COMMAND" => Command_::try_from(parser).map(Command::Command),
            "DECR" => Decr::try_from(parser).map(Command::Decr),
            "DECRBY" => DecrBy::try_from(parser).map(Command::DecrBy),
            "DEL" => Del::try_from(parser).map(Command::Del),
            "ECHO" => Echo::try_from(parser).map(Command::Echo),
            "EXISTS" => Exists::try_from(parser).map(Command::Exists),
            "GET" => Get::try_from(parser).map(Command::Get),
            "GETDEL" => Getdel::try_from(parser).map(Command::Getdel),
            "GETRANGE" => Getrange::try_from(parser).map(Command::Getrange),
            "HDEL" => Hdel::try_from(parser).map(Command::Hdel),
            "HEXISTS" => Hexists::try_from(parser).map(Command::Hexists),
            "HGET" => Hget::try_from(parser).map(Command::Hget),
            "HGETALL" => Hgetall::try_from(parser).map(Command::Hgetall),
            "HINCRBY" => HincrBy::try_from(parser).map(Command::HincrBy),
            "HKEYS" => Hkeys::try_from(parser).map(Command::Hkeys),
            "HLEN" => Hlen::try_from(parser).map(Command::Hlen),
            "HSET" => Hset::try_from(parser).map(Command::Hset),
            "HSTRLEN" => Hstrlen::try_from(parser).map(Command::Hstrlen),
            "INCR" => Incr::try_from(parser).map(Command::Incr),
            "INCRBY" => IncrBy::try_from(parser).map(Command::IncrBy),
            "KEYS" => Keys::try_from(parser).map(Command::Keys),
            "PING" => Ping::try_from(parser).map(Command::Ping),
            "RENAME" => Rename::try_from(parser).map(Command::Rename),
            "SET" => Set::try_from(parser).map(Command::Set),
            "STRLEN" => Strlen::try_from(parser).map(Command::Strlen),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }),
        }
    }
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self
            .parts
            .next()
            .ok_or(CommandParserError::EndOfStream)?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_uppercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_uppercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Arguments left to consume.
    fn remaining(&self) -> usize {
        self.parts.len()
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(string) => string
                .parse::<i64>()
                .map_err(|_| CommandParserError::InvalidInteger),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(CommandParserError::InvalidInteger),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Collects every remaining argument as a string.
    fn rest_strings(&mut self) -> Result<Vec<String>, CommandParserError> {
        let mut strings = Vec::with_capacity(self.remaining());
        while self.remaining() > 0 {
            strings.push(self.next_string()?);
        }
        Ok(strings)
    }
}

/// Reasons a request frame could not be turned into a [`Command`]. The messages are sent back to
/// the client as error replies.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("ERR protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("ERR value is not an integer or out of range")]
    InvalidInteger,
    #[error("ERR protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("ERR protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get_command_with_simple_string() {
        let get_frame = Frame::Array(vec![
            Frame::Simple(String::from("GET")),
            Frame::Simple(String::from("foo")),
        ]);

        let get_command = Command::try_from(get_frame).unwrap();

        assert_eq!(
            get_command,
            Command::Get(Get {
                key: String::from("foo")
            })
        );
    }

    #[test]
    fn parse_get_command_with_bulk_string() {
        let get_frame = Frame::Array(vec![
            Frame::Simple(String::from("GET")),
            Frame::Bulk(Bytes::from("foo-from-bytes")),
        ]);

        let get_command = Command::try_from(get_frame).unwrap();

        assert_eq!(
            get_command,
            Command::Get(Get {
                key: String::from("foo-from-bytes")
            })
        );
    }

    #[test]
    fn command_name_is_case_insensitive() {
        for name in ["get", "Get", "gEt"] {
            let frame = Frame::Array(vec![
                Frame::Bulk(Bytes::from(name)),
                Frame::Bulk(Bytes::from("foo")),
            ]);

            assert_eq!(
                Command::try_from(frame),
                Ok(Command::Get(Get {
                    key: String::from("foo")
                }))
            );
        }
    }

    #[test]
    fn parse_set_command() {
        let set_frame = Frame::Array(vec![
            Frame::Simple(String::from("SET")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Simple(String::from("baz")),
        ]);

        let set_command = Command::try_from(set_frame).unwrap();

        assert_eq!(
            set_command,
            Command::Set(Set {
                key: String::from("foo"),
                value: Bytes::from("baz")
            })
        );
    }

    #[test]
    fn unknown_command() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("flushall"))]);

        assert_eq!(
            Command::try_from(frame),
            Err(CommandParserError::UnknownCommand {
                command: "FLUSHALL".to_string()
            })
        );
    }

    #[test]
    fn too_many_arguments() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("b")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::WrongNumberOfArguments {
                command: "get".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'get' command"
        );
    }

    #[test]
    fn not_an_array() {
        let err = Command::try_from(Frame::Simple("PING".to_string())).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::InvalidFrame {
                expected: "array".to_string(),
                actual: Frame::Simple("PING".to_string())
            }
        );
    }

    #[test]
    fn command_name_must_be_a_string() {
        let err = Command::try_from(Frame::Array(vec![Frame::Integer(1)])).unwrap_err();

        assert!(matches!(err, CommandParserError::InvalidFrame { .. }));
    }

    #[test]
    fn table_names_are_canonical_and_unique() {
        for (i, spec) in COMMAND_TABLE.iter().enumerate() {
            assert_eq!(spec.name, spec.name.to_uppercase());
            assert!(
                COMMAND_TABLE[i + 1..].iter().all(|other| other.name != spec.name),
                "{} is registered twice",
                spec.name
            );
        }
    }

    #[test]
    fn write_flags_match_parsed_commands() {
        for spec in COMMAND_TABLE {
            let argc = match spec.arity {
                Arity::Exact(n) | Arity::AtLeast(n) => n,
            };
            let mut parts = vec![Frame::Bulk(Bytes::from(spec.name))];
            parts.extend((0..argc).map(|_| Frame::Bulk(Bytes::from("1"))));

            let cmd = Command::try_from(Frame::Array(parts)).unwrap();

            assert_eq!(cmd.is_write(), spec.write, "{}", spec.name);
        }
    }

    #[test]
    fn arity() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(1));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(1));
        assert!(Arity::AtLeast(1).accepts(10));
        assert!(!Arity::AtLeast(1).accepts(0));
    }
}
