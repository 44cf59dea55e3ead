use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the length of the value associated with `field` in the hash stored at `key`, 0 when
/// either is missing.
///
/// Ref: <https://redis.io/docs/latest/commands/hstrlen/>
#[derive(Debug, PartialEq)]
pub struct Hstrlen {
    pub key: String,
    pub field: String,
}

impl Executable for Hstrlen {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let hashes = store.hashes();
        let len = hashes
            .get_field(&self.key, &self.field)
            .map_or(0, |value| value.len());

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hstrlen {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;

        Ok(Self { key, field })
    }
}
