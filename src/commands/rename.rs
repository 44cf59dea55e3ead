use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Renames `key` to `newkey`, overwriting `newkey` if it exists.
///
/// Renaming a key that does not exist is not an error: `newkey` ends up holding the empty string.
///
/// Ref: <https://redis.io/docs/latest/commands/rename/>
#[derive(Debug, PartialEq)]
pub struct Rename {
    pub key: String,
    pub newkey: String,
}

impl Executable for Rename {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store.strings_mut().rename(&self.key, self.newkey);

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Rename {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let newkey = parser.next_string()?;

        Ok(Self { key, newkey })
    }
}
