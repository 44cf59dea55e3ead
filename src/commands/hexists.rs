use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Counts how many of the given fields exist in the hash stored at `key`.
#[derive(Debug, PartialEq)]
pub struct Hexists {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for Hexists {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let hashes = store.hashes();
        let count = self
            .fields
            .iter()
            .filter(|field| hashes.field_exists(&self.key, field))
            .count();

        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Hexists {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.rest_strings()?;

        Ok(Self { key, fields })
    }
}
