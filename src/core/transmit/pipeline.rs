use tracing::{debug, warn};

use crate::core::transmit::literal::{
    decode_byte_list, encode_latin1, segments, RejectedElement, Segment,
};
use crate::domain::config::ByteListPolicy;
use crate::domain::error::SermonResult;

/// Destination for transmitted bytes.
pub trait DeviceWriter {
    /// Write all of `data` or fail; an empty slice is a no-op.
    fn write_bytes(&mut self, data: &[u8]) -> SermonResult<()>;
}

impl DeviceWriter for Vec<u8> {
    fn write_bytes(&mut self, data: &[u8]) -> SermonResult<()> {
        self.extend_from_slice(data);
        Ok(())
    }
}

/// Result of transmitting one processed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmitReport {
    pub bytes_written: usize,
    pub segments_written: usize,
    pub rejected: Vec<RejectedElement>,
}

impl TransmitReport {
    /// Operator-facing summary of rejected byte-list elements, if any.
    pub fn status(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let elements: Vec<String> = self.rejected.iter().map(ToString::to_string).collect();
        Some(format!(
            "Ignored invalid byte literal element(s): {}",
            elements.join(", ")
        ))
    }
}

/// Turns processed commands into device writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transmitter {
    policy: ByteListPolicy,
}

impl Transmitter {
    pub fn new(policy: ByteListPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ByteListPolicy {
        self.policy
    }

    /// Encode every segment of `command` without writing anything.
    ///
    /// Fails only if a literal segment holds a character above U+00FF;
    /// in that case nothing from the command should reach the device.
    pub fn encode(&self, command: &str) -> SermonResult<(Vec<Vec<u8>>, Vec<RejectedElement>)> {
        let mut chunks = Vec::new();
        let mut rejected = Vec::new();

        for segment in segments(command) {
            match segment {
                Segment::Literal(text) => chunks.push(encode_latin1(text)?),
                Segment::ByteList(list) => {
                    let decoded = decode_byte_list(list, self.policy);
                    for element in &decoded.rejected {
                        warn!(
                            policy = ?self.policy,
                            "Rejected byte literal element {}",
                            element
                        );
                    }
                    rejected.extend(decoded.rejected);
                    chunks.push(decoded.bytes);
                }
            }
        }

        Ok((chunks, rejected))
    }

    /// Write `command` segment by segment, left to right.
    ///
    /// Stops at the first failed write; bytes already written stay written.
    pub fn transmit<W>(&self, command: &str, writer: &mut W) -> SermonResult<TransmitReport>
    where
        W: DeviceWriter + ?Sized,
    {
        let (chunks, rejected) = self.encode(command)?;
        let mut report = TransmitReport {
            rejected,
            ..TransmitReport::default()
        };

        for chunk in &chunks {
            writer.write_bytes(chunk)?;
            if !chunk.is_empty() {
                debug!(len = chunk.len(), bytes = %hex::encode(chunk), "Wrote segment");
            }
            report.bytes_written += chunk.len();
            report.segments_written += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::SermonError;

    struct FailingWriter {
        accepted: Vec<u8>,
        fail_on_call: usize,
        calls: usize,
    }

    impl DeviceWriter for FailingWriter {
        fn write_bytes(&mut self, data: &[u8]) -> SermonResult<()> {
            self.calls += 1;
            if self.calls == self.fail_on_call {
                return Err(SermonError::ShortWrite {
                    written: 0,
                    expected: data.len(),
                });
            }
            self.accepted.extend_from_slice(data);
            Ok(())
        }
    }

    fn send(command: &str) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        Transmitter::default().transmit(command, &mut out).unwrap();
        out
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(send("AT\r\n"), b"AT\r\n");
    }

    #[test]
    fn test_prefix_literal_suffix() {
        assert_eq!(send("go$(1,2,0x1F)stop"), b"go\x01\x02\x1fstop");
    }

    #[test]
    fn test_adjacent_literals() {
        assert_eq!(send("$(1)$(2)"), vec![1, 2]);
        assert_eq!(send("${1}$(2)"), vec![1, 2]);
    }

    #[test]
    fn test_writes_every_segment_in_order() {
        let mut out: Vec<u8> = Vec::new();
        let report = Transmitter::default().transmit("$(1)$(2)", &mut out).unwrap();
        // three literal fragments (all empty) plus two byte lists
        assert_eq!(report.segments_written, 5);
        assert_eq!(report.bytes_written, 2);
        assert!(report.status().is_none());
    }

    #[test]
    fn test_skip_policy_reports_rejections() {
        let mut out: Vec<u8> = Vec::new();
        let report = Transmitter::new(ByteListPolicy::SkipInvalid)
            .transmit("<$(1, x, 0x41)>", &mut out)
            .unwrap();
        assert_eq!(out, b"<\x01A>");
        assert_eq!(report.rejected.len(), 1);
        assert!(report.status().unwrap().contains("'x'"));
    }

    #[test]
    fn test_reject_policy_drops_segment_only() {
        let mut out: Vec<u8> = Vec::new();
        let report = Transmitter::new(ByteListPolicy::RejectSegment)
            .transmit("<$(1, x)$(2)>", &mut out)
            .unwrap();
        assert_eq!(out, b"<\x02>");
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_unencodable_text_writes_nothing() {
        let mut out: Vec<u8> = Vec::new();
        let result = Transmitter::default().transmit("$(1)\u{263a}", &mut out);
        assert!(matches!(result, Err(SermonError::Encoding { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_failure_stops_transmission() {
        let mut writer = FailingWriter {
            accepted: Vec::new(),
            fail_on_call: 2,
            calls: 0,
        };
        let result = Transmitter::default().transmit("a$(2)b", &mut writer);
        assert!(matches!(result, Err(SermonError::ShortWrite { .. })));
        assert_eq!(writer.accepted, b"a");
        assert_eq!(writer.calls, 2);
    }
}
