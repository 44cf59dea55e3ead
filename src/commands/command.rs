use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Placeholder for `COMMAND`, which clients such as `redis-cli` send when connecting. Any
/// arguments are ignored and a fixed status is returned.
#[derive(Debug, PartialEq)]
pub struct Command {}

impl Executable for Command {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        Ok(Frame::Simple("COMMAND RESPONSE".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Command {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self {})
    }
}
