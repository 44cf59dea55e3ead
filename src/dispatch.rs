//! Request dispatch, shared by client connections and by the append-only file replay, so live
//! traffic and recovery go through exactly the same command table and handlers.

use std::str;
use tracing::{debug, warn};

use crate::commands::executable::Executable;
use crate::commands::{self, Command, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;

/// Reply to a request, plus whether the request has to be appended to the log.
#[derive(Debug, PartialEq)]
pub struct Response {
    pub frame: Frame,
    /// Set for write commands that succeeded. Failed writes leave the store untouched and are
    /// never logged, so every logged entry replays to the same effect.
    pub should_log: bool,
}

/// Runs one client request against the store.
///
/// Returns `None` when the request is not a non-empty array: such requests get no reply at all.
/// Everything else gets a reply, errors included.
pub fn handle(request: &Frame, store: &Store) -> Option<Response> {
    match request {
        Frame::Array(parts) if !parts.is_empty() => {}
        Frame::Array(_) => {
            warn!("Invalid request, expected a non-empty array");
            return None;
        }
        frame => {
            warn!("Invalid request, expected array, got {}", frame);
            return None;
        }
    }

    let cmd = match Command::try_from(request.clone()) {
        Ok(cmd) => cmd,
        Err(err) => {
            debug!("Rejected request: {}", err);
            return Some(Response {
                frame: error_reply(&err.to_string()),
                should_log: false,
            });
        }
    };

    let is_write = cmd.is_write();
    let frame = execute(cmd, store);
    let should_log = is_write && !matches!(frame, Frame::Error(_));

    Some(Response { frame, should_log })
}

/// Re-applies an entry read back from the append-only file. The reply is dropped.
pub fn apply_from_log(entry: Frame, store: &Store) -> Result<(), CommandParserError> {
    let cmd = Command::try_from(entry)?;
    let reply = execute(cmd, store);

    if let Frame::Error(msg) = reply {
        debug!("Replayed entry failed: {}", msg);
    }

    Ok(())
}

/// Tells whether `request` names a write command, without parsing its arguments.
pub fn is_write_request(request: &Frame) -> bool {
    let name = match request {
        Frame::Array(parts) => match parts.first() {
            Some(Frame::Bulk(bytes)) => str::from_utf8(bytes).ok(),
            Some(Frame::Simple(s)) => Some(s.as_str()),
            _ => None,
        },
        _ => None,
    };

    name.and_then(|name| commands::lookup(&name.to_uppercase()))
        .is_some_and(|spec| spec.write)
}

fn execute(cmd: Command, store: &Store) -> Frame {
    match cmd.exec(store.clone()) {
        Ok(Frame::Error(msg)) => error_reply(&msg),
        Ok(frame) => frame,
        Err(err) => error_reply(&format!("ERR {}", err)),
    }
}

/// Error messages may quote keys, fields or command names sent by the client. A CR or LF in
/// them would end the error line early, so both are replaced with spaces.
fn error_reply(msg: &str) -> Frame {
    Frame::Error(msg.replace(['\r', '\n'], " "))
}
