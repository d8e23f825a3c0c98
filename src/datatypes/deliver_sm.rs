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

/// This operation is used by the SMSC to deliver a short message to an ESME.
/// The deliver_sm PDU is used to deliver both mobile originated messages and
/// delivery receipts from the SMSC to the ESME.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliverSm {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    // Mandatory parameters
    /// 4.3.1 service_type: The service_type parameter can be used to indicate the SMS
    ///       Application service associated with the message. Set to NULL if not applicable.
    ///       Max length: 5 octets (6 with null terminator).
    pub service_type: ServiceType,

    /// 4.3.2 source_addr_ton: Type of Number for source address.
    pub source_addr_ton: TypeOfNumber,

    /// 4.3.3 source_addr_npi: Numbering Plan Indicator for source address.
    pub source_addr_npi: NumericPlanIndicator,

    /// 4.3.4 source_addr: Address of SME which originated this message.
    ///       Max length: 20 octets (21 with null terminator).
    pub source_addr: SourceAddr,

    /// 4.3.5 dest_addr_ton: Type of Number for destination address.
    pub dest_addr_ton: TypeOfNumber,

    /// 4.3.6 dest_addr_npi: Numbering Plan Indicator for destination address.
    pub dest_addr_npi: NumericPlanIndicator,

    /// 4.3.7 destination_addr: Destination address of this short message.
    ///       Max length: 20 octets (21 with null terminator).
    pub destination_addr: DestinationAddr,

    /// 4.3.8 esm_class: Indicates Message Mode and Message Type. Used to indicate
    ///       special message attributes associated with the short message.
    ///       Strongly-typed bitfield that enforces valid mode/type combinations.
    pub esm_class: EsmClass,

    /// 4.3.9 protocol_id: Protocol Identifier. Network specific field.
    pub protocol_id: u8,

    /// 4.3.10 priority_flag: Designates the priority level of the message.
    ///        Level 0 (lowest) to Level 3 (highest).
    pub priority_flag: PriorityFlag,

    /// 4.3.11 schedule_delivery_time: Not used for deliver_sm. Set to NULL.
    pub schedule_delivery_time: ScheduleDeliveryTime,

    /// 4.3.12 validity_period: Not used for deliver_sm. Set to NULL.
    pub validity_period: ValidityPeriod,

    /// 4.3.13 registered_delivery: Indicator to signify if a delivery receipt or
    ///        acknowledgment is required.
    pub registered_delivery: u8,

    /// 4.3.14 replace_if_present_flag: Not used for deliver_sm. Set to 0.
    pub replace_if_present_flag: u8,

    /// 4.3.15 data_coding: Defines the encoding scheme of the short message user data.
    ///        Strongly-typed enum that validates encoding schemes and provides character set information.
    pub data_coding: DataCoding,

    /// 4.3.16 sm_default_msg_id: Not used for deliver_sm. Set to 0.
    pub sm_default_msg_id: u8,

    /// 4.3.17 sm_length: Length in octets of the short_message user data parameter.
    ///        Range: 0 to 254 octets. If sm_length is 0, then the short_message
    ///        field is not present.
    pub sm_length: u8,

    /// 4.3.18 short_message: Up to 254 octets of short message user data.
    ///        For delivery receipts, this field contains the delivery receipt data.
    pub short_message: ShortMessage,

    // Optional parameters (TLV format)
    pub user_message_reference: Option<Tlv>,
    pub source_port: Option<Tlv>,
    pub destination_port: Option<Tlv>,
    pub sar_msg_ref_num: Option<Tlv>,
    pub sar_total_segments: Option<Tlv>,
    pub sar_segment_seqnum: Option<Tlv>,
    pub user_data_header: Option<Tlv>,
    pub privacy_indicator: Option<Tlv>,
    pub callback_num: Option<Tlv>,
    pub source_subaddress: Option<Tlv>,
    pub dest_subaddress: Option<Tlv>,
    pub language_indicator: Option<Tlv>,
    pub its_session_info: Option<Tlv>,
    pub network_error_code: Option<Tlv>,
    pub message_payload: Option<Tlv>,
    pub delivery_failure_reason: Option<Tlv>,
    pub additional_status_info_text: Option<Tlv>,
    pub dpf_result: Option<Tlv>,
    pub set_dpf: Option<Tlv>,
    pub ms_availability_status: Option<Tlv>,
    pub receipted_message_id: Option<Tlv>,
    pub message_state: Option<Tlv>,

    /// TLVs with tags this engine doesn't assign a dedicated field to.
    /// Preserved verbatim and re-emitted in the order they were decoded.
    pub other_tlvs: Vec<Tlv>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliverSmValidationError {
    #[error("sm_length ({sm_length}) does not match short_message length ({message_length})")]
    SmLengthMismatch {
        sm_length: u8,
        message_length: usize,
    },

    #[error("Cannot use both short_message and message_payload - they are mutually exclusive")]
    MutualExclusivityViolation,
}

impl DeliverSm {
    pub fn validate(&self) -> Result<(), DeliverSmValidationError> {
        if self.message_payload.is_some() {
            if self.sm_length != 0 || !self.short_message.is_empty() {
                return Err(DeliverSmValidationError::MutualExclusivityViolation);
            }
        } else if self.sm_length as usize != self.short_message.len() as usize {
            return Err(DeliverSmValidationError::SmLengthMismatch {
                sm_length: self.sm_length,
                message_length: self.short_message.len() as usize,
            });
        }

        Ok(())
    }

    pub fn builder() -> DeliverSmBuilder {
        DeliverSmBuilder::new()
    }
}

/// Builder for creating DeliverSm PDUs with validation and sensible defaults
pub struct DeliverSmBuilder {
    command_status: CommandStatus,
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
    replace_if_present_flag: u8,
    data_coding: DataCoding,
    sm_default_msg_id: u8,
    short_message: ShortMessage,
    user_message_reference: Option<Tlv>,
    source_port: Option<Tlv>,
    destination_port: Option<Tlv>,
    sar_msg_ref_num: Option<Tlv>,
    sar_total_segments: Option<Tlv>,
    sar_segment_seqnum: Option<Tlv>,
    user_data_header: Option<Tlv>,
    privacy_indicator: Option<Tlv>,
    callback_num: Option<Tlv>,
    source_subaddress: Option<Tlv>,
    dest_subaddress: Option<Tlv>,
    language_indicator: Option<Tlv>,
    its_session_info: Option<Tlv>,
    network_error_code: Option<Tlv>,
    message_payload: Option<Tlv>,
    delivery_failure_reason: Option<Tlv>,
    additional_status_info_text: Option<Tlv>,
    dpf_result: Option<Tlv>,
    set_dpf: Option<Tlv>,
    ms_availability_status: Option<Tlv>,
    receipted_message_id: Option<Tlv>,
    message_state: Option<Tlv>,
}

impl Default for DeliverSmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverSmBuilder {
    pub fn new() -> Self {
        Self {
            command_status: CommandStatus::Ok,
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
            replace_if_present_flag: 0,
            data_coding: DataCoding::default(),
            sm_default_msg_id: 0,
            short_message: ShortMessage::default(),
            user_message_reference: None,
            source_port: None,
            destination_port: None,
            sar_msg_ref_num: None,
            sar_total_segments: None,
            sar_segment_seqnum: None,
            user_data_header: None,
            privacy_indicator: None,
            callback_num: None,
            source_subaddress: None,
            dest_subaddress: None,
            language_indicator: None,
            its_session_info: None,
            network_error_code: None,
            message_payload: None,
            delivery_failure_reason: None,
            additional_status_info_text: None,
            dpf_result: None,
            set_dpf: None,
            ms_availability_status: None,
            receipted_message_id: None,
            message_state: None,
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

    pub fn short_message(mut self, message: &str) -> Self {
        self.short_message = ShortMessage::from(message);
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

    pub fn data_coding(mut self, data_coding: DataCoding) -> Self {
        self.data_coding = data_coding;
        self
    }

    pub fn receipted_message_id(mut self, tlv: Tlv) -> Self {
        self.receipted_message_id = Some(tlv);
        self
    }

    pub fn message_state(mut self, tlv: Tlv) -> Self {
        self.message_state = Some(tlv);
        self
    }

    pub fn message_payload(mut self, tlv: Tlv) -> Self {
        self.message_payload = Some(tlv);
        self
    }

    /// Build the DeliverSm, performing validation and calculating sm_length automatically
    pub fn build(self) -> Result<DeliverSm, DeliverSmValidationError> {
        let (sm_length, short_message) = if self.message_payload.is_some() {
            (0, ShortMessage::default())
        } else {
            (self.short_message.len(), self.short_message)
        };

        let deliver_sm = DeliverSm {
            command_status: self.command_status,
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
            replace_if_present_flag: self.replace_if_present_flag,
            data_coding: self.data_coding,
            sm_default_msg_id: self.sm_default_msg_id,
            sm_length,
            short_message,
            user_message_reference: self.user_message_reference,
            source_port: self.source_port,
            destination_port: self.destination_port,
            sar_msg_ref_num: self.sar_msg_ref_num,
            sar_total_segments: self.sar_total_segments,
            sar_segment_seqnum: self.sar_segment_seqnum,
            user_data_header: self.user_data_header,
            privacy_indicator: self.privacy_indicator,
            callback_num: self.callback_num,
            source_subaddress: self.source_subaddress,
            dest_subaddress: self.dest_subaddress,
            language_indicator: self.language_indicator,
            its_session_info: self.its_session_info,
            network_error_code: self.network_error_code,
            message_payload: self.message_payload,
            delivery_failure_reason: self.delivery_failure_reason,
            additional_status_info_text: self.additional_status_info_text,
            dpf_result: self.dpf_result,
            set_dpf: self.set_dpf,
            ms_availability_status: self.ms_availability_status,
            receipted_message_id: self.receipted_message_id,
            message_state: self.message_state,
            other_tlvs: Vec::new(),
        };

        deliver_sm.validate()?;
        Ok(deliver_sm)
    }
}

/// The deliver_sm_resp PDU is used to provide a response to the deliver_sm request.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliverSmResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    /// 4.4.1 message_id: Set to NULL. Not used for deliver_sm_resp.
    pub message_id: MessageId,
}

impl DeliverSmResponse {
    pub fn new(sequence_number: u32) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
            message_id: MessageId::default(),
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
fn assign_tlv(pdu: &mut DeliverSm, tlv: Tlv) {
    match tlv.tag() {
        tags::USER_MESSAGE_REFERENCE => pdu.user_message_reference = Some(tlv),
        tags::SOURCE_PORT => pdu.source_port = Some(tlv),
        tags::DESTINATION_PORT => pdu.destination_port = Some(tlv),
        tags::SAR_MSG_REF_NUM => pdu.sar_msg_ref_num = Some(tlv),
        tags::SAR_TOTAL_SEGMENTS => pdu.sar_total_segments = Some(tlv),
        tags::SAR_SEGMENT_SEQNUM => pdu.sar_segment_seqnum = Some(tlv),
        tags::USER_DATA_HEADER => pdu.user_data_header = Some(tlv),
        tags::PRIVACY_INDICATOR => pdu.privacy_indicator = Some(tlv),
        tags::CALLBACK_NUM => pdu.callback_num = Some(tlv),
        tags::SOURCE_SUBADDRESS => pdu.source_subaddress = Some(tlv),
        tags::DEST_SUBADDRESS => pdu.dest_subaddress = Some(tlv),
        tags::LANGUAGE_INDICATOR => pdu.language_indicator = Some(tlv),
        tags::ITS_SESSION_INFO => pdu.its_session_info = Some(tlv),
        tags::NETWORK_ERROR_CODE => pdu.network_error_code = Some(tlv),
        tags::MESSAGE_PAYLOAD => pdu.message_payload = Some(tlv),
        tags::DELIVERY_FAILURE_REASON => pdu.delivery_failure_reason = Some(tlv),
        tags::ADDITIONAL_STATUS_INFO_TEXT => pdu.additional_status_info_text = Some(tlv),
        tags::DPF_RESULT => pdu.dpf_result = Some(tlv),
        tags::SET_DPF => pdu.set_dpf = Some(tlv),
        tags::MS_AVAILABILITY_STATUS => pdu.ms_availability_status = Some(tlv),
        tags::RECEIPTED_MESSAGE_ID => pdu.receipted_message_id = Some(tlv),
        tags::MESSAGE_STATE => pdu.message_state = Some(tlv),
        _ => pdu.other_tlvs.push(tlv),
    }
}

fn encode_optional_tlvs(pdu: &DeliverSm, buf: &mut BytesMut) -> Result<(), CodecError> {
    for tlv in [
        &pdu.user_message_reference,
        &pdu.source_port,
        &pdu.destination_port,
        &pdu.sar_msg_ref_num,
        &pdu.sar_total_segments,
        &pdu.sar_segment_seqnum,
        &pdu.user_data_header,
        &pdu.privacy_indicator,
        &pdu.callback_num,
        &pdu.source_subaddress,
        &pdu.dest_subaddress,
        &pdu.language_indicator,
        &pdu.its_session_info,
        &pdu.network_error_code,
        &pdu.message_payload,
        &pdu.delivery_failure_reason,
        &pdu.additional_status_info_text,
        &pdu.dpf_result,
        &pdu.set_dpf,
        &pdu.ms_availability_status,
        &pdu.receipted_message_id,
        &pdu.message_state,
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

impl Decodable for DeliverSm {
    fn command_id() -> CommandId {
        CommandId::DeliverSm
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

        let mut pdu = DeliverSm {
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
            destination_port: None,
            sar_msg_ref_num: None,
            sar_total_segments: None,
            sar_segment_seqnum: None,
            user_data_header: None,
            privacy_indicator: None,
            callback_num: None,
            source_subaddress: None,
            dest_subaddress: None,
            language_indicator: None,
            its_session_info: None,
            network_error_code: None,
            message_payload: None,
            delivery_failure_reason: None,
            additional_status_info_text: None,
            dpf_result: None,
            set_dpf: None,
            ms_availability_status: None,
            receipted_message_id: None,
            message_state: None,
            other_tlvs: Vec::new(),
        };

        while buf.remaining() > 0 {
            let tlv = Tlv::decode(buf)?;
            assign_tlv(&mut pdu, tlv);
        }

        Ok(pdu)
    }
}

impl Encodable for DeliverSm {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        self.validate().map_err(|e| CodecError::FieldValidation {
            field: "deliver_sm",
            reason: e.to_string(),
        })?;

        let header = PduHeader {
            command_length: 0,
            command_id: CommandId::DeliverSm as u32,
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

impl Decodable for DeliverSmResponse {
    fn command_id() -> CommandId {
        CommandId::DeliverSmResp
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let message_id = MessageId::from_parsed_string(decode_cstring(buf, 65, "message_id")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "message_id",
                reason: e.to_string(),
            })?;

        Ok(DeliverSmResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            message_id,
        })
    }
}

impl Encodable for DeliverSmResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: 0,
            command_id: CommandId::DeliverSmResp as u32,
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
    fn deliver_sm_roundtrip() {
        let original = DeliverSm::builder()
            .source_addr("1234567890")
            .destination_addr("0987654321")
            .short_message("Hello World")
            .build()
            .unwrap();

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = DeliverSm::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn deliver_sm_builder_basic() {
        let deliver_sm = DeliverSm::builder()
            .source_addr("1234567890")
            .destination_addr("0987654321")
            .short_message("Test message")
            .build()
            .unwrap();

        assert_eq!(deliver_sm.source_addr, "1234567890");
        assert_eq!(deliver_sm.destination_addr, "0987654321");
        assert_eq!(deliver_sm.short_message.as_str().unwrap(), "Test message");
        assert_eq!(deliver_sm.sm_length, 12);
    }

    #[test]
    fn deliver_sm_delivery_receipt() {
        let receipt_message = "id:1234567890 sub:001 dlvrd:001 submit date:2201011200 done date:2201011205 stat:DELIVRD err:000 text:Hello";

        let deliver_sm = DeliverSm::builder()
            .source_addr("1234567890")
            .destination_addr("0987654321")
            .esm_class(EsmClass::from(0x04))
            .short_message(receipt_message)
            .build()
            .unwrap();

        assert_eq!(deliver_sm.esm_class, EsmClass::from(0x04));
        assert_eq!(deliver_sm.short_message.as_str().unwrap(), receipt_message);
        assert_eq!(deliver_sm.sm_length, receipt_message.len() as u8);
    }

    #[test]
    fn deliver_sm_roundtrip_with_tlvs() {
        let mut original = DeliverSm::builder()
            .source_addr("1234567890")
            .destination_addr("0987654321")
            .build()
            .unwrap();
        original.receipted_message_id = Some(Tlv::new(tags::RECEIPTED_MESSAGE_ID, b"MSG001".to_vec()));

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = DeliverSm::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn deliver_sm_unknown_tlv_preserved_in_other_tlvs() {
        let mut original = DeliverSm::builder()
            .source_addr("123")
            .destination_addr("456")
            .build()
            .unwrap();
        original.other_tlvs.push(Tlv::new(0x9999, vec![0x01]));

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = DeliverSm::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded.other_tlvs, vec![Tlv::new(0x9999, vec![0x01])]);
    }

    #[test]
    fn deliver_sm_response_roundtrip() {
        let original = DeliverSmResponse::new(1);

        let serialized = original.to_bytes();
        let mut cursor = Cursor::new(serialized.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        let decoded = DeliverSmResponse::decode(header, &mut cursor).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(serialized.len(), 81);
    }

    #[test]
    fn deliver_sm_validation_sm_length_mismatch() {
        let mut deliver_sm = DeliverSm::builder()
            .short_message("Hello World")
            .build()
            .unwrap();
        deliver_sm.sm_length = 5;

        assert!(matches!(
            deliver_sm.validate(),
            Err(DeliverSmValidationError::SmLengthMismatch { .. })
        ));
    }
}
