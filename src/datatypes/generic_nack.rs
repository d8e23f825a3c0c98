//! generic_nack is used to acknowledge the receipt of a PDU when the
//! receiving entity cannot process the PDU due to errors such as invalid
//! command_id, invalid command_status, or other format errors.
//!
//! The generic_nack PDU has no message body and only contains the standard
//! SMPP header. It is typically sent in response to a malformed PDU where
//! the command_id cannot be determined or the PDU cannot be parsed
//! correctly.

use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_header_only_pdu;

#[derive(Clone, Debug, PartialEq)]
pub struct GenericNack {
    /// The command_status field indicates the reason for the generic_nack.
    pub command_status: CommandStatus,
    /// The sequence_number from the original PDU that caused the error. If
    /// the original sequence_number cannot be determined, this should be 0.
    pub sequence_number: u32,
}

impl_header_only_pdu!(GenericNack, CommandId::GenericNack);

impl GenericNack {
    pub fn new(command_status: CommandStatus, sequence_number: u32) -> Self {
        Self {
            command_status,
            sequence_number,
        }
    }

    pub fn invalid_command_id(sequence_number: u32) -> Self {
        Self::new(CommandStatus::InvalidCommandId, sequence_number)
    }

    pub fn invalid_command_length(sequence_number: u32) -> Self {
        Self::new(CommandStatus::InvalidCommandLength, sequence_number)
    }

    pub fn invalid_message_length(sequence_number: u32) -> Self {
        Self::new(CommandStatus::InvalidMsgLength, sequence_number)
    }

    pub fn system_error(sequence_number: u32) -> Self {
        Self::new(CommandStatus::SystemError, sequence_number)
    }

    /// Build a generic_nack for a PDU whose sequence number could not be
    /// determined because the header itself failed to parse. `sequence_number`
    /// never equals 0 on the wire, so the caller supplies a value allocated
    /// from its own session counter rather than echoing the unparseable PDU.
    pub fn unknown_sequence(sequence_number: u32) -> Self {
        Self::new(CommandStatus::InvalidCommandLength, sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encodable;

    #[test]
    fn generic_nack_to_bytes() {
        let nack = GenericNack {
            command_status: CommandStatus::InvalidCommandId,
            sequence_number: 42,
        };

        let bytes = nack.to_bytes();

        let expected = vec![
            0x00, 0x00, 0x00, 0x10, // command_length (16)
            0x80, 0x00, 0x00, 0x00, // command_id (GenericNack = 0x80000000)
            0x00, 0x00, 0x00, 0x03, // command_status (InvalidCommandId = 3)
            0x00, 0x00, 0x00, 0x2A, // sequence_number (42)
        ];

        assert_eq!(bytes.as_ref(), &expected);
    }

    #[test]
    fn generic_nack_convenience_constructors() {
        let nack = GenericNack::invalid_command_id(123);
        assert_eq!(nack.command_status, CommandStatus::InvalidCommandId);
        assert_eq!(nack.sequence_number, 123);

        let nack = GenericNack::invalid_command_length(456);
        assert_eq!(nack.command_status, CommandStatus::InvalidCommandLength);
        assert_eq!(nack.sequence_number, 456);

        let nack = GenericNack::invalid_message_length(789);
        assert_eq!(nack.command_status, CommandStatus::InvalidMsgLength);
        assert_eq!(nack.sequence_number, 789);

        let nack = GenericNack::system_error(999);
        assert_eq!(nack.command_status, CommandStatus::SystemError);
        assert_eq!(nack.sequence_number, 999);

        let nack = GenericNack::unknown_sequence(7);
        assert_eq!(nack.command_status, CommandStatus::InvalidCommandLength);
        assert_eq!(nack.sequence_number, 7);
    }

    #[test]
    fn generic_nack_fixed_length() {
        let test_cases = vec![
            GenericNack::new(CommandStatus::Ok, 1),
            GenericNack::new(CommandStatus::InvalidCommandId, 0x7FFF_FFFF),
            GenericNack::new(CommandStatus::SystemError, 12345),
        ];

        for nack in test_cases {
            assert_eq!(nack.to_bytes().len(), 16);
        }
    }
}
