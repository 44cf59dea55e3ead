use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the value associated with `field` in the hash stored at `key`.
///
/// A missing hash or field is answered with an error, not with `nil` as GET does.
///
/// Ref: <https://redis.io/docs/latest/commands/hget/>
#[derive(Debug, PartialEq)]
pub struct Hget {
    pub key: String,
    pub field: String,
}

impl Executable for Hget {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let hashes = store.hashes();

        let res = match hashes.get(&self.key) {
            None => Frame::Error(format!("ERR hash '{}' not found", self.key)),
            Some(fields) => match fields.get(&self.field) {
                Some(value) => Frame::Bulk(value.clone()),
                None => Frame::Error(format!(
                    "ERR field '{}' not found in hash '{}'",
                    self.field, self.key
                )),
            },
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Hget {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;

        Ok(Self { key, field })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;

    fn hget(store: &Store, key: &str, field: &str) -> Frame {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HGET")),
            Frame::Bulk(Bytes::from(key.to_string())),
            Frame::Bulk(Bytes::from(field.to_string())),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        cmd.exec(store.clone()).unwrap()
    }

    #[test]
    fn existing_field() {
        let store = Store::new();
        store
            .hashes_mut()
            .set_field("h".to_string(), "f".to_string(), Bytes::from("v"));

        assert_eq!(hget(&store, "h", "f"), Frame::Bulk(Bytes::from("v")));
    }

    #[test]
    fn missing_field() {
        let store = Store::new();
        store
            .hashes_mut()
            .set_field("h".to_string(), "f".to_string(), Bytes::from("v"));

        assert_eq!(
            hget(&store, "h", "missing"),
            Frame::Error("ERR field 'missing' not found in hash 'h'".to_string())
        );
    }

    #[test]
    fn missing_hash() {
        assert_eq!(
            hget(&Store::new(), "nohash", "f"),
            Frame::Error("ERR hash 'nohash' not found".to_string())
        );
    }
}
