use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Decrements the number stored at key by one.
///
/// Ref: <https://redis.io/docs/latest/commands/decr/>
#[derive(Debug, PartialEq)]
pub struct Decr {
    pub key: String,
}

impl Executable for Decr {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = store.strings_mut().incr_by(&self.key, -1i64);

        match res {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(err) => Ok(Frame::Error(err.message().to_string())),
        }
    }
}

impl TryFrom<&mut CommandParser> for Decr {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn existing_and_missing_keys() {
        let store = Store::new();
        store
            .strings_mut()
            .set(String::from("key1"), Bytes::from("10"));

        for (key, expected) in [("key1", 9), ("key2", -1)] {
            let frame = Frame::Array(vec![
                Frame::Bulk(Bytes::from("DECR")),
                Frame::Bulk(Bytes::from(key)),
            ]);
            let cmd = Command::try_from(frame).unwrap();

            assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(expected));
        }

        assert_eq!(store.strings().get("key2"), Some(&Bytes::from("-1")));
    }

    #[test]
    fn invalid_key_type() {
        let store = Store::new();
        store
            .strings_mut()
            .set(String::from("key1"), Bytes::from("1.5"));

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("DECR")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd.exec(store.clone()).unwrap(),
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
        assert_eq!(store.strings().get("key1"), Some(&Bytes::from("1.5")));
    }
}
