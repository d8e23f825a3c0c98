use crate::codec::{
    decode_cstring, decode_u8, encode_cstring, encode_u8, CodecError, Decodable, Encodable,
    PduHeader,
};
use crate::datatypes::numeric_plan_indicator::NumericPlanIndicator;
use crate::datatypes::tlv::Tlv;
use crate::datatypes::{
    tags, CommandId, CommandStatus, DataCoding, DestinationAddr, EsmClass, MessageId,
    PriorityFlag, ScheduleDeliveryTime, ServiceType, ShortMessage, SourceAddr, TypeOfNumber,
    ValidityPeriod,
};
use bytes::{Buf, BytesMut};
use std::io::Cursor;

/// This operation is used by an ESME to submit a short message to the SMSC
/// for onward transmission to a specified short message entity (SME).
/// submit_sm does not support the transaction message mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitSm {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    pub service_type: ServiceType,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: SourceAddr,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    pub destination_addr: DestinationAddr,
    pub esm_class: EsmClass,
    pub protocol_id: u8,
    pub priority_flag: PriorityFlag,
    pub schedule_delivery_time: ScheduleDeliveryTime,
    pub validity_period: ValidityPeriod,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
    pub sm_length: u8,
    pub short_message: ShortMessage,

    // Optional parameters (TLV format)
    pub user_message_reference: Option<Tlv>,
    pub source_port: Option<Tlv>,
    pub source_addr_submit: Option<Tlv>,
    pub destination_port: Option<Tlv>,
    pub dest_addr_submit: Option<Tlv>,
    pub sar_msg_ref_num: Option<Tlv>,
    pub sar_total_segments: Option<Tlv>,
    pub sar_segment_seqnum: Option<Tlv>,
    pub more_messages_to_send: Option<Tlv>,
    pub payload_type: Option<Tlv>,
    pub message_payload: Option<Tlv>,
    pub privacy_indicator: Option<Tlv>,
    pub callback_num: Option<Tlv>,
    pub callback_num_pres_ind: Option<Tlv>,
    pub callback_num_atag: Option<Tlv>,
    pub source_subaddress: Option<Tlv>,
    pub dest_subaddress: Option<Tlv>,
    pub display_time: Option<Tlv>,
    pub sms_signal: Option<Tlv>,
    pub ms_validity: Option<Tlv>,
    pub ms_msg_wait_facilities: Option<Tlv>,
    pub number_of_messages: Option<Tlv>,
    pub alert_on_msg_delivery: Option<Tlv>,
    pub language_indicator: Option<Tlv>,
    pub its_reply_type: Option<Tlv>,
    pub its_session_info: Option<Tlv>,
    pub ussd_service_op: Option<Tlv>,

    /// TLVs with tags this engine doesn't assign a dedicated field to.
    /// Preserved verbatim and re-emitted in the order they were decoded.
    pub other_tlvs: Vec<Tlv>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitSmValidationError {
    #[error("sm_length ({sm_length}) does not match short_message length ({message_length})")]
    SmLengthMismatch {
        sm_length: u8,
        message_length: usize,
    },

    #[error("Cannot use both short_message and message_payload - they are mutually exclusive")]
    MutualExclusivityViolation,
}

impl SubmitSm {
    /// Validates the mutual exclusivity of short_message/message_payload and
    /// that sm_length always matches the carried message.
    pub fn validate(&self) -> Result<(), SubmitSmValidationError> {
        if self.message_payload.is_some() {
            if self.sm_length != 0 || !self.short_message.is_empty() {
                return Err(SubmitSmValidationError::MutualExclusivityViolation);
            }
        } else if self.sm_length as usize != self.short_message.len() as usize {
            return Err(SubmitSmValidationError::SmLengthMismatch {
                sm_length: self.sm_length,
                message_length: self.short_message.len() as usize,
            });
        }

        Ok(())
    }

    pub fn builder() -> SubmitSmBuilder {
        SubmitSmBuilder::new()
    }
}

pub struct SubmitSmBuilder {
    sequence_number: u32,
    service_type: ServiceType,
    source_addr_ton: TypeOfNumber,
    source_addr_npi: NumericPlanIndicator,
    source_addr: SourceAddr,
    dest_addr_ton: TypeOfNumber,
    dest_addr_npi: NumericPlanIndicator,
    destination_addr: DestinationAddr,
    esm_class: EsmClass,
    protocol_id: u8,
    priority_flag: PriorityFlag,
    schedule_delivery_time: ScheduleDeliveryTime,
    validity_period: ValidityPeriod,
    registered_delivery: u8,
    data_coding: DataCoding,
    short_message: ShortMessage,
    message_payload: Option<Tlv>,
}

impl Default for SubmitSmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitSmBuilder {
    pub fn new() -> Self {
        Self {
            sequence_number: 1,
            service_type: ServiceType::default(),
            source_addr_ton: TypeOfNumber::Unknown,
            source_addr_npi: NumericPlanIndicator::Unknown,
            source_addr: SourceAddr::default(),
            dest_addr_ton: TypeOfNumber::Unknown,
            dest_addr_npi: NumericPlanIndicator::Unknown,
            destination_addr: DestinationAddr::default(),
            esm_class: EsmClass::default(),
            protocol_id: 0,
            priority_flag: PriorityFlag::Level0,
            schedule_delivery_time: ScheduleDeliveryTime::default(),
            validity_period: ValidityPeriod::default(),
            registered_delivery: 0,
            data_coding: DataCoding::default(),
            short_message: ShortMessage::default(),
            message_payload: None,
        }
    }

    pub fn sequence_number(mut self, seq: u32) -> Self {
        self.sequence_number = seq;
        self
    }

    pub fn service_type(mut self, service_type: &str) -> Self {
        self.service_type = ServiceType::from(service_type);
        self
    }

    pub fn source_addr(mut self, addr: &str) -> Self {
        self.source_addr = SourceAddr::new(addr, TypeOfNumber::Unknown).unwrap_or_default();
        self
    }

    pub fn destination_addr(mut self, addr: &str) -> Self {
        self.destination_addr =
            DestinationAddr::new(addr, TypeOfNumber::Unknown).unwrap_or_default();
        self
    }

    pub fn source_addr_ton(mut self, ton: TypeOfNumber) -> Self {
        self.source_addr_ton = ton;
        self
    }

    pub fn source_addr_npi(mut self, npi: NumericPlanIndicator) -> Self {
        self.source_addr_npi = npi;
        self
    }

    pub fn dest_addr_ton(mut self, ton: TypeOfNumber) -> Self {
        self.dest_addr_ton = ton;
        self
    }

    pub fn dest_addr_npi(mut self, npi: NumericPlanIndicator) -> Self {
        self.dest_addr_npi = npi;
        self
    }

    pub fn esm_class(mut self, esm_class: EsmClass) -> Self {
        self.esm_class = esm_class;
        self
    }

    pub fn priority_flag(mut self, priority_flag: PriorityFlag) -> Self {
        self.priority_flag = priority_flag;
        self
    }

    pub fn registered_delivery(mut self, registered_delivery: u8) -> Self {
        self.registered_delivery = registered_delivery;
        self
    }

    pub fn data_coding(mut self, data_coding: DataCoding) -> Self {
        self.data_coding = data_coding;
        self
    }

    pub fn short_message(mut self, message: &str) -> Self {
        self.short_message = ShortMessage::from(message);
        self
    }

    pub fn message_payload(mut self, tlv: Tlv) -> Self {
        self.message_payload = Some(tlv);
        self
    }

    /// Builds the PDU, auto-calculating `sm_length` from `short_message`
    /// unless the message was moved into the `message_payload` TLV.
    pub fn build(self) -> Result<SubmitSm, SubmitSmValidationError> {
        let (sm_length, short_message) = if self.message_payload.is_some() {
            (0, ShortMessage::default())
        } else {
            (self.short_message.len(), self.short_message)
        };

        let submit_sm = SubmitSm {
            command_status: CommandStatus::Ok,
            sequence_number: self.sequence_number,
            service_type: self.service_type,
            source_addr_ton: self.source_addr_ton,
            source_addr_npi: self.source_addr_npi,
            source_addr: self.source_addr,
            dest_addr_ton: self.dest_addr_ton,
            dest_addr_npi: self.dest_addr_npi,
            destination_addr: self.destination_addr,
            esm_class: self.esm_class,
            protocol_id: self.protocol_id,
            priority_flag: self.priority_flag,
            schedule_delivery_time: self.schedule_delivery_time,
            validity_period: self.validity_period,
            registered_delivery: self.registered_delivery,
            replace_if_present_flag: 0,
            data_coding: self.data_coding,
            sm_default_msg_id: 0,
            sm_length,
            short_message,
            user_message_reference: None,
            source_port: None,
            source_addr_submit: None,
            destination_port: None,
            dest_addr_submit: None,
            sar_msg_ref_num: None,
            sar_total_segments: None,
            sar_segment_seqnum: None,
            more_messages_to_send: None,
            payload_type: None,
            message_payload: self.message_payload,
            privacy_indicator: None,
            callback_num: None,
            callback_num_pres_ind: None,
            callback_num_atag: None,
            source_subaddress: None,
            dest_subaddress: None,
            display_time: None,
            sms_signal: None,
            ms_validity: None,
            ms_msg_wait_facilities: None,
            number_of_messages: None,
            alert_on_msg_delivery: None,
            language_indicator: None,
            its_reply_type: None,
            its_session_info: None,
            ussd_service_op: None,
            other_tlvs: Vec::new(),
        };

        submit_sm.validate()?;
        Ok(submit_sm)
    }
}

/// The submit_sm_resp PDU is used to provide a response to a submit_sm request.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitSmResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
    pub message_id: MessageId,
}

impl SubmitSmResponse {
    pub fn new(sequence_number: u32, message_id: MessageId) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
            message_id,
        }
    }

    pub fn error(sequence_number: u32, status: CommandStatus) -> Self {
        Self {
            command_status: status,
            sequence_number,
            message_id: MessageId::default(),
        }
    }
}

/// Matches a decoded TLV's tag against the field this engine assigns it to;
/// tags with no dedicated field fall through to `other_tlvs`.
fn assign_tlv(pdu: &mut SubmitSm, tlv: Tlv) {
    match tlv.tag() {
        tags::USER_MESSAGE_REFERENCE => pdu.user_message_reference = Some(tlv),
        tags::SOURCE_PORT => pdu.source_port = Some(tlv),
        tags::SOURCE_ADDR_SUBMIT => pdu.source_addr_submit = Some(tlv),
        tags::DESTINATION_PORT => pdu.destination_port = Some(tlv),
        tags::DEST_ADDR_SUBMIT => pdu.dest_addr_submit = Some(tlv),
        tags::SAR_MSG_REF_NUM => pdu.sar_msg_ref_num = Some(tlv),
        tags::SAR_TOTAL_SEGMENTS => pdu.sar_total_segments = Some(tlv),
        tags::SAR_SEGMENT_SEQNUM => pdu.sar_segment_seqnum = Some(tlv),
        tags::MORE_MESSAGES_TO_SEND => pdu.more_messages_to_send = Some(tlv),
        tags::PAYLOAD_TYPE => pdu.payload_type = Some(tlv),
        tags::MESSAGE_PAYLOAD => pdu.message_payload = Some(tlv),
        tags::PRIVACY_INDICATOR => pdu.privacy_indicator = Some(tlv),
        tags::CALLBACK_NUM => pdu.callback_num = Some(tlv),
        tags::CALLBACK_NUM_PRES_IND => pdu.callback_num_pres_ind = Some(tlv),
        tags::CALLBACK_NUM_ATAG => pdu.callback_num_atag = Some(tlv),
        tags::SOURCE_SUBADDRESS => pdu.source_subaddress = Some(tlv),
        tags::DEST_SUBADDRESS => pdu.dest_subaddress = Some(tlv),
        tags::DISPLAY_TIME => pdu.display_time = Some(tlv),
        tags::SMS_SIGNAL => pdu.sms_signal = Some(tlv),
        tags::MS_VALIDITY => pdu.ms_validity = Some(tlv),
        tags::MS_MSG_WAIT_FACILITIES => pdu.ms_msg_wait_facilities = Some(tlv),
        tags::NUMBER_OF_MESSAGES => pdu.number_of_messages = Some(tlv),
        tags::ALERT_ON_MSG_DELIVERY => pdu.alert_on_msg_delivery = Some(tlv),
        tags::LANGUAGE_INDICATOR => pdu.language_indicator = Some(tlv),
        tags::ITS_REPLY_TYPE => pdu.its_reply_type = Some(tlv),
        tags::ITS_SESSION_INFO => pdu.its_session_info = Some(tlv),
        tags::USSD_SERVICE_OP => pdu.ussd_service_op = Some(tlv),
        _ => pdu.other_tlvs.push(tlv),
    }
}

fn encode_optional_tlvs(pdu: &SubmitSm, buf: &mut BytesMut) -> Result<(), CodecError> {
    for tlv in [
        &pdu.user_message_reference,
        &pdu.source_port,
        &pdu.source_addr_submit,
        &pdu.destination_port,
        &pdu.dest_addr_submit,
        &pdu.sar_msg_ref_num,
        &pdu.sar_total_segments,
        &pdu.sar_segment_seqnum,
        &pdu.more_messages_to_send,
        &pdu.payload_type,
        &pdu.message_payload,
        &pdu.privacy_indicator,
        &pdu.callback_num,
        &pdu.callback_num_pres_ind,
        &pdu.callback_num_atag,
        &pdu.source_subaddress,
        &pdu.dest_subaddress,
        &pdu.display_time,
        &pdu.sms_signal,
        &pdu.ms_validity,
        &pdu.ms_msg_wait_facilities,
        &pdu.number_of_messages,
        &pdu.alert_on_msg_delivery,
        &pdu.language_indicator,
        &pdu.its_reply_type,
        &pdu.its_session_info,
        &pdu.ussd_service_op,
    ] {
        if let Some(tlv) = tlv {
            tlv.encode(buf)?;
        }
    }

    for tlv in &pdu.other_tlvs {
        tlv.encode(buf)?;
    }

    Ok(())
}

impl Decodable for SubmitSm {
    fn command_id() -> CommandId {
        CommandId::SubmitSm
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let service_type = ServiceType::from_parsed_string(decode_cstring(buf, 6, "service_type")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "service_type",
                reason: e.to_string(),
            })?;
        let source_addr_ton =
            TypeOfNumber::try_from(decode_u8(buf)?).map_err(|_| CodecError::FieldValidation {
                field: "source_addr_ton",
                reason: "invalid type of number".to_string(),
            })?;
        let source_addr_npi = NumericPlanIndicator::try_from(decode_u8(buf)?).map_err(|_| {
            CodecError::FieldValidation {
                field: "source_addr_npi",
                reason: "invalid numbering plan indicator".to_string(),
            }
        })?;
        let source_addr = SourceAddr::from_parsed_string(decode_cstring(buf, 21, "source_addr")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "source_addr",
                reason: e.to_string(),
            })?;
        let dest_addr_ton =
            TypeOfNumber::try_from(decode_u8(buf)?).map_err(|_| CodecError::FieldValidation {
                field: "dest_addr_ton",
                reason: "invalid type of number".to_string(),
            })?;
        let dest_addr_npi = NumericPlanIndicator::try_from(decode_u8(buf)?).map_err(|_| {
            CodecError::FieldValidation {
                field: "dest_addr_npi",
                reason: "invalid numbering plan indicator".to_string(),
            }
        })?;
        let destination_addr =
            DestinationAddr::from_parsed_string(decode_cstring(buf, 21, "destination_addr")?)
                .map_err(|e| CodecError::FieldValidation {
                    field: "destination_addr",
                    reason: e.to_string(),
                })?;
        let esm_class =
            EsmClass::from_byte(decode_u8(buf)?).map_err(|e| CodecError::FieldValidation {
                field: "esm_class",
                reason: e.to_string(),
            })?;
        let protocol_id = decode_u8(buf)?;
        let priority_flag =
            PriorityFlag::try_from(decode_u8(buf)?).map_err(|_| CodecError::FieldValidation {
                field: "priority_flag",
                reason: "invalid priority flag".to_string(),
            })?;
        let schedule_delivery_time = ScheduleDeliveryTime::from_parsed_string(decode_cstring(
            buf,
            17,
            "schedule_delivery_time",
        )?)
        .map_err(|e| CodecError::FieldValidation {
            field: "schedule_delivery_time",
            reason: e.to_string(),
        })?;
        let validity_period =
            ValidityPeriod::from_parsed_string(decode_cstring(buf, 17, "validity_period")?).map_err(
                |e| CodecError::FieldValidation {
                    field: "validity_period",
                    reason: e.to_string(),
                },
            )?;
        let registered_delivery = decode_u8(buf)?;
        let replace_if_present_flag = decode_u8(buf)?;
        let data_coding = DataCoding::from_byte(decode_u8(buf)?);
        let sm_default_msg_id = decode_u8(buf)?;
        let sm_length = decode_u8(buf)?;

        if buf.remaining() < sm_length as usize {
            return Err(CodecError::Incomplete);
        }
        let mut message_bytes = vec![0u8; sm_length as usize];
        buf.copy_to_slice(&mut message_bytes);
        let short_message =
            ShortMessage::new(&message_bytes).map_err(|e| CodecError::FieldValidation {
                field: "short_message",
                reason: e.to_string(),
            })?;

        let mut pdu = SubmitSm {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            service_type,
            source_addr_ton,
            source_addr_npi,
            source_addr,
            dest_addr_ton,
            dest_addr_npi,
            destination_addr,
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present_flag,
            data_coding,
            sm_default_msg_id,
            sm_length,
            short_message,
            user_message_reference: None,
            source_port: None,
            source_addr_submit: None,
            destination_port: None,
            dest_addr_submit: None,
            sar_msg_ref_num: None,
            sar_total_segments: None,
            sar_segment_seqnum: None,
            more_messages_to_send: None,
            payload_type: None,
            message_payload: None,
            privacy_indicator: None,
            callback_num: None,
            callback_num_pres_ind: None,
            callback_num_atag: None,
            source_subaddress: None,
            dest_subaddress: None,
            display_time: None,
            sms_signal: None,
            ms_validity: None,
            ms_msg_wait_facilities: None,
            number_of_messages: None,
            alert_on_msg_delivery: None,
            language_indicator: None,
            its_reply_type: None,
            its_session_info: None,
            ussd_service_op: None,
            other_tlvs: Vec::new(),
        };

        while buf.remaining() > 0 {
            let tlv = Tlv::decode(buf)?;
            assign_tlv(&mut pdu, tlv);
        }

        Ok(pdu)
    }
}

impl Encodable for SubmitSm {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        self.validate().map_err(|e| CodecError::FieldValidation {
            field: "submit_sm",
            reason: e.to_string(),
        })?;

        let header = PduHeader {
            command_length: 0,
            command_id: CommandId::SubmitSm as u32,
            command_status: self.command_status,
            sequence_number: self.sequence_number,
        };
        header.encode(buf)?;

        encode_cstring(buf, self.service_type.as_str(), 6);
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, self.source_addr.as_str().unwrap_or(""), 21);
        encode_u8(buf, self.dest_addr_ton as u8);
        encode_u8(buf, self.dest_addr_npi as u8);
        encode_cstring(buf, self.destination_addr.as_str().unwrap_or(""), 21);
        encode_u8(buf, self.esm_class.to_byte());
        encode_u8(buf, self.protocol_id);
        encode_u8(buf, self.priority_flag as u8);
        encode_cstring(buf, self.schedule_delivery_time.as_str().unwrap_or(""), 17);
        encode_cstring(buf, self.validity_period.as_str().unwrap_or(""), 17);
        encode_u8(buf, self.registered_delivery);
        encode_u8(buf, self.replace_if_present_flag);
        encode_u8(buf, self.data_coding.to_byte());
        encode_u8(buf, self.sm_default_msg_id);
        encode_u8(buf, self.sm_length);
        buf.extend_from_slice(self.short_message.as_bytes());

        encode_optional_tlvs(self, buf)
    }
}

impl Decodable for SubmitSmResponse {
    fn command_id() -> CommandId {
        CommandId::SubmitSmResp
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let message_id = MessageId::from_parsed_string(decode_cstring(buf, 65, "message_id")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "message_id",
                reason: e.to_string(),
            })?;

        Ok(SubmitSmResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            message_id,
        })
    }
}

impl Encodable for SubmitSmResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: 0,
            command_id: CommandId::SubmitSmResp as u32,
            command_status: self.command_status,
            sequence_number: self.sequence_number,
        };
        header.encode(buf)?;

        encode_cstring(buf, self.message_id.as_str().unwrap_or(""), 65);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_sm_roundtrip() {
        let original = SubmitSm::builder()
            .source_addr("1234567890")
            .destination_addr("0987654321")
            .short_message("Hello World")
            .build()
            .unwrap();

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = SubmitSm::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn submit_sm_builder_calculates_sm_length() {
        let pdu = SubmitSm::builder()
            .short_message("Test message")
            .build()
            .unwrap();

        assert_eq!(pdu.sm_length, 12);
    }

    #[test]
    fn submit_sm_with_message_payload_has_zero_sm_length() {
        let pdu = SubmitSm::builder()
            .short_message("ignored")
            .message_payload(Tlv::new(0x0424, vec![0xAA; 10]))
            .build()
            .unwrap();

        assert_eq!(pdu.sm_length, 0);
        assert!(pdu.short_message.is_empty());
        assert!(pdu.message_payload.is_some());
    }

    #[test]
    fn submit_sm_roundtrip_with_tlvs() {
        let mut original = SubmitSm::builder()
            .source_addr("1234567890")
            .destination_addr("0987654321")
            .short_message("Hi")
            .build()
            .unwrap();
        original.user_message_reference = Some(Tlv::new(0x0204, vec![0x00, 0x01]));

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = SubmitSm::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(
            decoded.user_message_reference,
            Some(Tlv::new(0x0204, vec![0x00, 0x01]))
        );
    }

    #[test]
    fn submit_sm_unknown_tlv_preserved_in_other_tlvs() {
        let mut original = SubmitSm::builder()
            .source_addr("123")
            .destination_addr("456")
            .build()
            .unwrap();
        original.other_tlvs.push(Tlv::new(0x9999, vec![0x01]));

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = SubmitSm::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded.other_tlvs, vec![Tlv::new(0x9999, vec![0x01])]);
    }

    #[test]
    fn submit_sm_response_roundtrip() {
        let original = SubmitSmResponse::new(7, MessageId::from("MSG00001"));

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = SubmitSmResponse::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn submit_sm_sm_length_mismatch_rejected() {
        let mut pdu = SubmitSm::builder()
            .short_message("Hello World")
            .build()
            .unwrap();
        pdu.sm_length = 3;

        assert!(matches!(
            pdu.validate(),
            Err(SubmitSmValidationError::SmLengthMismatch { .. })
        ));
    }
}
