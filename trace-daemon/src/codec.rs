//! Datagram envelope codec
//!
//! Each datagram carries one header line, a newline, then a JSON segment body.
//! The header is not interpreted on receive.

use shared::Segment;

use crate::error::{DaemonError, DaemonResult};

/// Header line written in front of every emitted segment
pub const ENVELOPE_HEADER: &str = r#"{"format": "json", "version": 1}"#;

/// Split a datagram at its first newline and decode the body as a segment
///
/// The returned segment is always marked sampled.
pub fn decode_datagram(datagram: &[u8]) -> DaemonResult<Segment> {
    let newline = datagram
        .iter()
        .position(|b| *b == b'\n')
        .ok_or(DaemonError::MissingHeader)?;

    let mut segment: Segment = serde_json::from_slice(&datagram[newline + 1..])?;
    segment.sampled = true;
    Ok(segment)
}

/// Encode a segment with the standard envelope header
pub fn encode_datagram(segment: &Segment) -> DaemonResult<Vec<u8>> {
    let body = serde_json::to_vec(segment).map_err(|e| DaemonError::Encode {
        message: e.to_string(),
    })?;

    let mut datagram = Vec::with_capacity(ENVELOPE_HEADER.len() + 1 + body.len());
    datagram.extend_from_slice(ENVELOPE_HEADER.as_bytes());
    datagram.push(b'\n');
    datagram.extend_from_slice(&body);
    Ok(datagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TraceId;

    #[test]
    fn test_decode_well_formed_datagram() {
        let datagram =
            b"1234567890\n{\"id\":\"abc\",\"trace_id\":\"1-x\",\"start_time\":1.0,\"end_time\":2.0}";
        let segment = decode_datagram(datagram).unwrap();

        assert_eq!(segment.id, "abc");
        assert_eq!(segment.trace_id, "1-x");
        assert_eq!(segment.start_time, 1.0);
        assert_eq!(segment.end_time, Some(2.0));
        assert!(segment.sampled);
    }

    #[test]
    fn test_decode_forces_sampled() {
        let datagram = b"h\n{\"id\":\"abc\",\"sampled\":false}";
        assert!(decode_datagram(datagram).unwrap().sampled);
    }

    #[test]
    fn test_decode_without_newline_is_missing_header() {
        let result = decode_datagram(b"{\"id\":\"abc\"}");
        assert!(matches!(result, Err(DaemonError::MissingHeader)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let result = decode_datagram(b"header\n{not json}");
        assert!(matches!(result, Err(DaemonError::Decode(_))));
    }

    #[test]
    fn test_decode_splits_on_first_newline_only() {
        // Pretty-printed bodies contain further newlines
        let datagram = b"header\n{\n  \"id\": \"abc\",\n  \"name\": \"pretty\"\n}";
        let segment = decode_datagram(datagram).unwrap();
        assert_eq!(segment.name, "pretty");
    }

    #[test]
    fn test_encoded_datagram_decodes() {
        let mut segment = Segment::begin("handler", &TraceId::new());
        segment.annotate("user", "alice");
        segment.close();

        let datagram = encode_datagram(&segment).unwrap();
        assert!(datagram.starts_with(ENVELOPE_HEADER.as_bytes()));

        let decoded = decode_datagram(&datagram).unwrap();
        assert_eq!(decoded.id, segment.id);
        assert_eq!(decoded.annotations, segment.annotations);
        assert!(decoded.sampled);
    }
}
