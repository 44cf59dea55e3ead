use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the substring of the string value stored at key, from byte offset `start` (inclusive)
/// up to `end` (exclusive). An `end` of -1 means "up to the end of the string". A missing key
/// reads as the empty string.
///
/// Offsets are not clamped: any other negative offset, a `start` past `end`, or an offset past the
/// end of the value is answered with an error.
///
/// Ref: <https://redis.io/docs/latest/commands/getrange/>
#[derive(Debug, PartialEq)]
pub struct Getrange {
    pub key: String,
    pub start: i64,
    pub end: i64,
}

const OUT_OF_RANGE: &str = "ERR index out of range";

impl Executable for Getrange {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let strings = store.strings();
        let value = strings.get(&self.key).cloned().unwrap_or_default();

        match byte_range(value.len(), self.start, self.end) {
            Some((start, end)) => Ok(Frame::Bulk(value.slice(start..end))),
            None => Ok(Frame::Error(OUT_OF_RANGE.to_string())),
        }
    }
}

fn byte_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let start = usize::try_from(start).ok()?;
    let end = match end {
        -1 => len,
        end => usize::try_from(end).ok()?,
    };

    if start > end || end > len {
        return None;
    }

    Some((start, end))
}

impl TryFrom<&mut CommandParser> for Getrange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let end = parser.next_integer()?;

        Ok(Self { key, start, end })
    }
}
