//! Protocol 1.6 messages.

use crate::rpc::Request;
use crate::types::{CiString20, CiString25, CiString50, CiString255, DateTime};

// ── Enumerations ─────────────────────────────────────────────

crate::wire_enum! {
    pub enum RegistrationStatus {
        Accepted => "Accepted",
        Pending => "Pending",
        Rejected => "Rejected",
    }
}

crate::wire_enum! {
    pub enum ChargePointStatus {
        Available => "Available",
        Preparing => "Preparing",
        Charging => "Charging",
        SuspendedEvse => "SuspendedEVSE",
        SuspendedEv => "SuspendedEV",
        Finishing => "Finishing",
        Reserved => "Reserved",
        Unavailable => "Unavailable",
        Faulted => "Faulted",
    }
}

crate::wire_enum! {
    pub enum ChargePointErrorCode {
        ConnectorLockFailure => "ConnectorLockFailure",
        EvCommunicationError => "EVCommunicationError",
        GroundFailure => "GroundFailure",
        HighTemperature => "HighTemperature",
        InternalError => "InternalError",
        LocalListConflict => "LocalListConflict",
        NoError => "NoError",
        OtherError => "OtherError",
        OverCurrentFailure => "OverCurrentFailure",
        OverVoltage => "OverVoltage",
        PowerMeterFailure => "PowerMeterFailure",
        PowerSwitchFailure => "PowerSwitchFailure",
        ReaderFailure => "ReaderFailure",
        ResetFailure => "ResetFailure",
        UnderVoltage => "UnderVoltage",
        WeakSignal => "WeakSignal",
    }
}

crate::wire_enum! {
    pub enum AuthorizationStatus {
        Accepted => "Accepted",
        Blocked => "Blocked",
        Expired => "Expired",
        Invalid => "Invalid",
        ConcurrentTx => "ConcurrentTx",
    }
}

crate::wire_enum! {
    pub enum DataTransferStatus {
        Accepted => "Accepted",
        Rejected => "Rejected",
        UnknownMessageId => "UnknownMessageId",
        UnknownVendorId => "UnknownVendorId",
    }
}

crate::wire_enum! {
    pub enum ResetType {
        Hard => "Hard",
        Soft => "Soft",
    }
}

crate::wire_enum! {
    pub enum ResetStatus {
        Accepted => "Accepted",
        Rejected => "Rejected",
    }
}

// ── Heartbeat ────────────────────────────────────────────────

crate::record! {
    pub struct HeartbeatRequest {}
}

crate::record! {
    pub struct HeartbeatResponse {
        "currentTime" => pub current_time: DateTime,
    }
}

impl Request for HeartbeatRequest {
    const ACTION: &'static str = "Heartbeat";
    type Response = HeartbeatResponse;
}

// ── BootNotification ─────────────────────────────────────────

crate::record! {
    pub struct BootNotificationRequest {
        "chargePointVendor" => pub charge_point_vendor: CiString20,
        "chargePointModel" => pub charge_point_model: CiString20,
        "chargePointSerialNumber" => pub charge_point_serial_number: Option<CiString25>,
        "chargeBoxSerialNumber" => pub charge_box_serial_number: Option<CiString25>,
        "firmwareVersion" => pub firmware_version: Option<CiString50>,
        "iccid" => pub iccid: Option<CiString20>,
        "imsi" => pub imsi: Option<CiString20>,
        "meterType" => pub meter_type: Option<CiString25>,
        "meterSerialNumber" => pub meter_serial_number: Option<CiString25>,
    }
}

crate::record! {
    pub struct BootNotificationResponse {
        "status" => pub status: RegistrationStatus,
        "currentTime" => pub current_time: DateTime,
        /// Heartbeat interval in seconds.
        "interval" => pub interval: i32,
    }
}

impl Request for BootNotificationRequest {
    const ACTION: &'static str = "BootNotification";
    type Response = BootNotificationResponse;
}

// ── StatusNotification ───────────────────────────────────────

crate::record! {
    pub struct StatusNotificationRequest {
        "connectorId" => pub connector_id: i32,
        "errorCode" => pub error_code: ChargePointErrorCode,
        "info" => pub info: Option<CiString50>,
        "status" => pub status: ChargePointStatus,
        "timestamp" => pub timestamp: Option<DateTime>,
        "vendorId" => pub vendor_id: Option<CiString255>,
        "vendorErrorCode" => pub vendor_error_code: Option<CiString50>,
    }
}

crate::record! {
    pub struct StatusNotificationResponse {}
}

impl Request for StatusNotificationRequest {
    const ACTION: &'static str = "StatusNotification";
    type Response = StatusNotificationResponse;
}

// ── Authorize ────────────────────────────────────────────────

crate::record! {
    pub struct IdTagInfo {
        "expiryDate" => pub expiry_date: Option<DateTime>,
        "parentIdTag" => pub parent_id_tag: Option<CiString20>,
        "status" => pub status: AuthorizationStatus,
    }
}

crate::record! {
    pub struct AuthorizeRequest {
        "idTag" => pub id_tag: CiString20,
    }
}

crate::record! {
    pub struct AuthorizeResponse {
        "idTagInfo" => pub id_tag_info: IdTagInfo,
    }
}

impl Request for AuthorizeRequest {
    const ACTION: &'static str = "Authorize";
    type Response = AuthorizeResponse;
}

// ── DataTransfer ─────────────────────────────────────────────

crate::record! {
    pub struct DataTransferRequest {
        "vendorId" => pub vendor_id: CiString255,
        "messageId" => pub message_id: Option<CiString50>,
        /// Vendor-defined text, no length limit.
        "data" => pub data: Option<String>,
    }
}

crate::record! {
    pub struct DataTransferResponse {
        "status" => pub status: DataTransferStatus,
        "data" => pub data: Option<String>,
    }
}

impl Request for DataTransferRequest {
    const ACTION: &'static str = "DataTransfer";
    type Response = DataTransferResponse;
}

// ── Reset (central system → charge point) ────────────────────

crate::record! {
    pub struct ResetRequest {
        "type" => pub kind: ResetType,
    }
}

crate::record! {
    pub struct ResetResponse {
        "status" => pub status: ResetStatus,
    }
}

impl Request for ResetRequest {
    const ACTION: &'static str = "Reset";
    type Response = ResetResponse;
}
