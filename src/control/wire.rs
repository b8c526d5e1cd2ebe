//! # Wire format for the control protocol.
//!
//! Outbound commands are single-line JSON objects of the form
//! `{"execute": "<name>"}`. Inbound acknowledgements are any JSON object
//! carrying an array-shaped `"return"` field; everything else is a
//! protocol violation. Undecodable payloads are rendered with [`hex_dump`]
//! so the violation is diagnosable from the error text alone.

use serde::Serialize;
use serde_json::Value;

use crate::error::ControlError;

/// Outbound command frame.
#[derive(Debug, Serialize)]
pub(crate) struct Execute<'a> {
    pub execute: &'a str,
}

/// Encodes one command as a newline-terminated JSON line.
pub(crate) fn encode_command(name: &str) -> Vec<u8> {
    // Serializing a single string field cannot fail.
    let mut line = serde_json::to_vec(&Execute { execute: name }).unwrap_or_default();
    line.push(b'\n');
    line
}

/// Validates one inbound acknowledgement payload.
///
/// Accepts any JSON object whose `"return"` field is an array. The
/// connection is left open on violation; closing is the caller's call.
pub(crate) fn validate_reply(payload: &[u8]) -> Result<(), ControlError> {
    let value: Value = serde_json::from_slice(payload).map_err(|e| ControlError::Protocol {
        detail: format!("undecodable payload ({e}):\n{}", hex_dump(payload)),
    })?;

    match value.get("return") {
        Some(ret) if ret.is_array() => Ok(()),
        Some(ret) => Err(ControlError::Protocol {
            detail: format!("\"return\" field is not array-shaped: {ret}"),
        }),
        None => Err(ControlError::Protocol {
            detail: format!("response lacks a \"return\" field: {value}"),
        }),
    }
}

/// Formats bytes as the classic offset / hex-pairs / printable-ASCII dump.
///
/// ```text
///  000000: 7b22 7265 7475 726e 223a 205b 5d7d 0a2e   {"return": []}..
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, " {:06x}:", row * 16);
        for (i, b) in chunk.iter().enumerate() {
            if i % 2 == 0 {
                out.push(' ');
            }
            let _ = write!(out, "{b:02x}");
        }
        // Pad a partial final row so the gutter columns line up.
        for i in chunk.len()..16 {
            out.push_str(if i % 2 == 0 { "   " } else { "  " });
        }
        out.push_str("  ");
        for &b in chunk {
            out.push(if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command_is_one_json_line() {
        let line = encode_command("system_powerdown");
        assert_eq!(line, b"{\"execute\":\"system_powerdown\"}\n");
    }

    #[test]
    fn test_validate_reply_accepts_array_return() {
        assert!(validate_reply(b"{\"return\": []}").is_ok());
        assert!(validate_reply(b"{\"return\": [1, 2], \"extra\": true}").is_ok());
    }

    #[test]
    fn test_validate_reply_rejects_non_json() {
        let err = validate_reply(b"not json at all").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("undecodable payload"), "got: {text}");
        // The hex dump makes the raw bytes visible in the error.
        assert!(text.contains("6e6f 7420"), "got: {text}");
    }

    #[test]
    fn test_validate_reply_rejects_wrong_shapes() {
        assert!(validate_reply(b"{\"return\": {}}").is_err());
        assert!(validate_reply(b"{\"return\": 0}").is_err());
        assert!(validate_reply(b"{\"event\": \"SHUTDOWN\"}").is_err());
        assert!(validate_reply(b"[]").is_err());
    }

    #[test]
    fn test_hex_dump_rows_and_gutter() {
        let dump = hex_dump(b"ABCDEFGHIJKLMNOPQR\x01");
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 000000:"));
        assert!(lines[1].starts_with(" 000010:"));
        assert!(lines[0].ends_with("ABCDEFGHIJKLMNOP"));
        // Non-printable bytes render as '.'.
        assert!(lines[1].ends_with("QR."));
        assert!(lines[0].contains("4142 4344"));
    }

    #[test]
    fn test_hex_dump_empty_input() {
        assert_eq!(hex_dump(b""), "");
    }
}
