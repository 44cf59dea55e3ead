use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Increments the number stored at `field` in the hash stored at `key` by `increment`. Missing
/// hashes and fields start at 0.
///
/// Ref: <https://redis.io/docs/latest/commands/hincrby/>
#[derive(Debug, PartialEq)]
pub struct HincrBy {
    pub key: String,
    pub field: String,
    pub increment: i64,
}

impl Executable for HincrBy {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = store
            .hashes_mut()
            .incr_field_by(&self.key, &self.field, self.increment);

        match res {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(err) => Ok(Frame::Error(err.message().to_string())),
        }
    }
}

impl TryFrom<&mut CommandParser> for HincrBy {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;
        let increment = parser.next_integer()?;

        Ok(Self {
            key,
            field,
            increment,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;

    fn hincrby(store: &Store, increment: &str) -> Frame {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HINCRBY")),
            Frame::Bulk(Bytes::from("h")),
            Frame::Bulk(Bytes::from("f")),
            Frame::Bulk(Bytes::from(increment.to_string())),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        cmd.exec(store.clone()).unwrap()
    }

    #[test]
    fn missing_hash_starts_at_zero() {
        let store = Store::new();

        assert_eq!(hincrby(&store, "5"), Frame::Integer(5));
        assert_eq!(hincrby(&store, "-7"), Frame::Integer(-2));
        assert_eq!(store.hashes().get_field("h", "f"), Some(&Bytes::from("-2")));
    }

    #[test]
    fn non_integer_field() {
        let store = Store::new();
        store
            .hashes_mut()
            .set_field("h".to_string(), "f".to_string(), Bytes::from("abc"));

        assert_eq!(
            hincrby(&store, "1"),
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
        assert_eq!(store.hashes().get_field("h", "f"), Some(&Bytes::from("abc")));
    }
}
