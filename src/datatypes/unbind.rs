//! The purpose of the SMPP unbind operation is to deregister an instance of
//! an ESME from the SMSC and inform the SMSC that the ESME no longer wishes
//! to use this network connection for the submission or delivery of
//! messages.
//!
//! Thus, the unbind operation may be viewed as a form of SMSC logoff request
//! to close the current SMPP session.

use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_complete_header_only_pdu;

#[derive(Clone, Debug, PartialEq)]
pub struct Unbind {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnbindResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl_complete_header_only_pdu!(Unbind, CommandId::Unbind);
impl_complete_header_only_pdu!(UnbindResponse, CommandId::UnbindResp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decodable, Encodable, PduHeader};
    use std::io::Cursor;

    #[test]
    fn unbind_to_bytes() {
        let pdu = Unbind::new(1);
        let bytes = pdu.to_bytes();

        let expected = vec![
            0x00, 0x00, 0x00, 0x10, // command_length
            0x00, 0x00, 0x00, 0x06, // command_id
            0x00, 0x00, 0x00, 0x00, // command_status
            0x00, 0x00, 0x00, 0x01, // sequence_number
        ];

        assert_eq!(bytes.as_ref(), &expected);
    }

    #[test]
    fn unbind_response_roundtrip() {
        let original = UnbindResponse::new(99);
        let bytes = original.to_bytes();

        let mut cursor = Cursor::new(bytes.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = UnbindResponse::decode(header, &mut cursor).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn unbind_response_error_status() {
        let pdu = UnbindResponse::error(5, CommandStatus::IncorrectBindStatus);
        assert_eq!(pdu.command_status, CommandStatus::IncorrectBindStatus);
    }
}
