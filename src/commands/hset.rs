use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Sets `field` in the hash stored at `key` to `value`. The hash is created when it does not
/// exist yet. Only one field is set per call and the reply is `OK`.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hset {
    pub key: String,
    pub field: String,
    pub value: Bytes,
}

impl Executable for Hset {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store
            .hashes_mut()
            .set_field(self.key, self.field, self.value);

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Hset {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn creates_and_updates_fields() {
        let store = Store::new();

        for value in ["v1", "v2"] {
            let frame = Frame::Array(vec![
                Frame::Bulk(Bytes::from("HSET")),
                Frame::Bulk(Bytes::from("h")),
                Frame::Bulk(Bytes::from("f")),
                Frame::Bulk(Bytes::from(value)),
            ]);
            let cmd = Command::try_from(frame).unwrap();

            assert_eq!(
                cmd.exec(store.clone()).unwrap(),
                Frame::Simple("OK".to_string())
            );
        }

        assert_eq!(store.hashes().get_field("h", "f"), Some(&Bytes::from("v2")));
        // Hashes live in their own keyspace.
        assert!(!store.strings().exists("h"));
    }

    #[test]
    fn requires_a_value() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HSET")),
            Frame::Bulk(Bytes::from("h")),
            Frame::Bulk(Bytes::from("f")),
        ]);

        assert_eq!(
            Command::try_from(frame),
            Err(CommandParserError::WrongNumberOfArguments {
                command: "hset".to_string()
            })
        );
    }
}
