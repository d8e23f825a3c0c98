//! The purpose of the SMPP enquire_link operation is to provide a
//! confidence-check of the communication path between an ESME and an SMSC.
//! On receipt of this request the receiving party should respond with an
//! enquire_link_resp, thus confirming that the application level connection
//! between the SMSC and the ESME is functioning.
//!
//! The command may be sent by either the SMSC or the ESME and is typically
//! used as a keep-alive when no other traffic has been exchanged for an
//! interval.

use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_complete_header_only_pdu;

#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLink {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLinkResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl_complete_header_only_pdu!(EnquireLink, CommandId::EnquireLink);
impl_complete_header_only_pdu!(EnquireLinkResponse, CommandId::EnquireLinkResp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decodable, Encodable, PduHeader};
    use std::io::Cursor;

    #[test]
    fn enquire_link_to_bytes() {
        let pdu = EnquireLink::new(42);
        let bytes = pdu.to_bytes();

        let expected = vec![
            0x00, 0x00, 0x00, 0x10, // command_length (16)
            0x00, 0x00, 0x00, 0x15, // command_id
            0x00, 0x00, 0x00, 0x00, // command_status
            0x00, 0x00, 0x00, 0x2A, // sequence_number (42)
        ];

        assert_eq!(bytes.as_ref(), &expected);
    }

    #[test]
    fn enquire_link_response_roundtrip() {
        let original = EnquireLinkResponse::new(7);
        let bytes = original.to_bytes();

        let mut cursor = Cursor::new(bytes.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = EnquireLinkResponse::decode(header, &mut cursor).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn enquire_link_error_constructor() {
        let pdu = EnquireLink::error(1, CommandStatus::SystemError);
        assert_eq!(pdu.command_status, CommandStatus::SystemError);
    }
}
