use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns all fields and values of the hash stored at `key`, as a flat array alternating field
/// and value. The order is unspecified. A missing hash is an error; an existing hash with no
/// fields left gives an empty array.
///
/// Ref: <https://redis.io/docs/latest/commands/hgetall/>
#[derive(Debug, PartialEq)]
pub struct Hgetall {
    pub key: String,
}

impl Executable for Hgetall {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let hashes = store.hashes();

        let fields = match hashes.get(&self.key) {
            Some(fields) => fields,
            None => return Ok(Frame::Error(format!("ERR hash '{}' not found", self.key))),
        };

        let res = fields
            .iter()
            .flat_map(|(field, value)| {
                [
                    Frame::Bulk(Bytes::from(field.clone())),
                    Frame::Bulk(value.clone()),
                ]
            })
            .collect();

        Ok(Frame::Array(res))
    }
}

impl TryFrom<&mut CommandParser> for Hgetall {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
