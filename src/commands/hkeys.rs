use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the field names of the hash stored at `key`, sorted. A missing hash has no fields.
///
/// Ref: <https://redis.io/docs/latest/commands/hkeys/>
#[derive(Debug, PartialEq)]
pub struct Hkeys {
    pub key: String,
}

impl Executable for Hkeys {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let hashes = store.hashes();

        let fields = hashes
            .get(&self.key)
            .into_iter()
            .flat_map(|fields| fields.keys())
            .sorted()
            .map(|field| Frame::Bulk(Bytes::from(field.clone())))
            .collect();

        Ok(Frame::Array(fields))
    }
}

impl TryFrom<&mut CommandParser> for Hkeys {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
