//! Framed text protocol for the service command channel
//!
//! A frame is a sequence of fields separated by a single tab byte and
//! terminated by two consecutive tabs. The first field is the command word,
//! the second the object id; ADD carries free-form trailing arguments:
//!
//! ```text
//! ADD <TAB> object_id <TAB> arg1 <TAB> arg2 <TAB><TAB>
//! RESTORE <TAB> object_id <TAB><TAB>
//! ```
//!
//! Decoding is pure: bytes in, complete commands out, partial frames retained
//! until their terminator arrives.

use crate::errors::{SharedError, SharedResult};
use crate::types::ObjectId;

/// Field separator byte
pub const SEP: u8 = b'\t';

const ADD_WORD: &str = "ADD";
const RESTORE_WORD: &str = "RESTORE";

/// One decoded command from the service control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Spawn a new service for `object_id` with free-form runner arguments
    Add { object_id: ObjectId, args: Vec<String> },
    /// Respawn a known service from the external source of truth
    Restore { object_id: ObjectId },
    /// Well-formed frame with an unrecognized command word; never fatal,
    /// callers decide how loudly to log it
    Unknown { word: String },
}

impl Command {
    fn parse(fields: Vec<String>) -> SharedResult<Command> {
        let mut fields = fields.into_iter();
        let word = fields
            .next()
            .filter(|w| !w.is_empty())
            .ok_or_else(|| SharedError::protocol("empty frame"))?;

        match word.as_str() {
            ADD_WORD => {
                let object_id = fields
                    .next()
                    .ok_or_else(|| SharedError::protocol("ADD frame missing object id"))?;
                Ok(Command::Add {
                    object_id: ObjectId::new(object_id),
                    args: fields.collect(),
                })
            }
            RESTORE_WORD => {
                let object_id = fields
                    .next()
                    .ok_or_else(|| SharedError::protocol("RESTORE frame missing object id"))?;
                Ok(Command::Restore {
                    object_id: ObjectId::new(object_id),
                })
            }
            _ => Ok(Command::Unknown { word }),
        }
    }
}

/// Encode an ADD frame for the wire
pub fn encode_add(object_id: &ObjectId, args: &[String]) -> SharedResult<Vec<u8>> {
    let mut fields = Vec::with_capacity(args.len() + 2);
    fields.push(ADD_WORD);
    fields.push(object_id.as_str());
    fields.extend(args.iter().map(String::as_str));
    encode_fields(&fields)
}

/// Encode a RESTORE frame for the wire
pub fn encode_restore(object_id: &ObjectId) -> SharedResult<Vec<u8>> {
    encode_fields(&[RESTORE_WORD, object_id.as_str()])
}

fn encode_fields(fields: &[&str]) -> SharedResult<Vec<u8>> {
    let mut frame = Vec::new();
    for field in fields {
        if field.as_bytes().contains(&SEP) {
            return Err(SharedError::protocol(format!(
                "field contains separator byte: {field:?}"
            )));
        }
        frame.extend_from_slice(field.as_bytes());
        frame.push(SEP);
    }
    // Second separator completes the two-tab terminator
    frame.push(SEP);
    Ok(frame)
}

/// Incremental decoder retaining partial frames across reads
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed newly read bytes; returns every command completed by them.
    ///
    /// Malformed frames come back as errors in-sequence so the caller can
    /// log and skip them without losing later frames.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SharedResult<Command>> {
        self.buf.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        while let Some(end) = find_terminator(&self.buf) {
            let frame = self.buf[..end].to_vec();
            self.buf.drain(..end + 2);
            decoded.push(decode_frame(&frame));
        }
        decoded
    }

    /// Number of buffered bytes not yet forming a complete frame
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop any buffered partial frame
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == [SEP, SEP])
}

fn decode_frame(frame: &[u8]) -> SharedResult<Command> {
    let text = std::str::from_utf8(frame)
        .map_err(|_| SharedError::protocol("frame is not valid UTF-8"))?;
    let fields: Vec<String> = text.split(SEP as char).map(str::to_string).collect();
    Command::parse(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<SharedResult<Command>> {
        FrameDecoder::new().push(bytes)
    }

    #[test]
    fn test_add_round_trip() {
        let id = ObjectId::new("obj-1");
        let args = vec!["--flag".to_string(), "value with spaces".to_string()];
        let frame = encode_add(&id, &args).unwrap();

        let mut decoder = FrameDecoder::new();
        let commands = decoder.push(&frame);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands.into_iter().next().unwrap().unwrap(),
            Command::Add { object_id: id, args }
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_restore_round_trip() {
        let id = ObjectId::new("obj-42");
        let frame = encode_restore(&id).unwrap();

        let mut decoder = FrameDecoder::new();
        let commands = decoder.push(&frame);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands.into_iter().next().unwrap().unwrap(),
            Command::Restore { object_id: id }
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_partial_frame_at_every_split_point() {
        let frame = b"ADD\tobj-1\t--flag\t\t";

        for split in 1..frame.len() {
            let mut decoder = FrameDecoder::new();
            assert!(
                decoder.push(&frame[..split]).is_empty(),
                "no command should decode before the terminator (split at {split})"
            );
            let commands = decoder.push(&frame[split..]);
            assert_eq!(commands.len(), 1, "exactly one command after split at {split}");
            assert_eq!(decoder.pending(), 0);
        }
    }

    #[test]
    fn test_multiple_frames_in_one_read() {
        let mut bytes = encode_add(&ObjectId::new("a"), &[]).unwrap();
        bytes.extend(encode_restore(&ObjectId::new("b")).unwrap());

        let commands = decode_all(&bytes);
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], Ok(Command::Add { .. })));
        assert!(matches!(commands[1], Ok(Command::Restore { .. })));
    }

    #[test]
    fn test_unknown_command_word() {
        let commands = decode_all(b"EVICT\tobj-1\t\t");
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands.into_iter().next().unwrap().unwrap(),
            Command::Unknown { word: "EVICT".to_string() }
        );
    }

    #[test]
    fn test_missing_object_id_is_an_error() {
        for bytes in [&b"ADD\t\t"[..], &b"RESTORE\t\t"[..]] {
            let commands = decode_all(bytes);
            assert_eq!(commands.len(), 1);
            assert!(commands[0].is_err(), "{bytes:?} should fail to decode");
        }
    }

    #[test]
    fn test_malformed_frame_does_not_lose_later_frames() {
        let mut bytes = b"ADD\t\t".to_vec();
        bytes.extend(encode_restore(&ObjectId::new("ok")).unwrap());

        let commands = decode_all(&bytes);
        assert_eq!(commands.len(), 2);
        assert!(commands[0].is_err());
        assert!(matches!(commands[1], Ok(Command::Restore { .. })));
    }

    #[test]
    fn test_separator_in_field_rejected_at_encode() {
        assert!(encode_add(&ObjectId::new("tab\tbed"), &[]).is_err());
        assert!(encode_add(&ObjectId::new("ok"), &["a\tb".to_string()]).is_err());
    }

    #[test]
    fn test_reset_drops_partial_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"ADD\tobj").is_empty());
        assert!(decoder.pending() > 0);

        decoder.reset();
        assert_eq!(decoder.pending(), 0);

        // A fresh complete frame decodes normally afterwards
        let commands = decoder.push(&encode_restore(&ObjectId::new("x")).unwrap());
        assert_eq!(commands.len(), 1);
    }
}
