//! Protocol 2.0.1 messages.
//!
//! 2.0.1 schemas use nested device-model records (component, variable,
//! EVSE) and several arrays whose emptiness policy differs: request and
//! result lists of SetVariables are mandatory even when empty, the report
//! data of NotifyReport is dropped when there is nothing to report.

use crate::rpc::Request;
use crate::types::{AlwaysEmit, BoundedString, CiString50, DateTime, IdToken, OmitEmpty};

pub type CiString1000 = BoundedString<1000>;
pub type CiString2500 = BoundedString<2500>;

// ── Enumerations ─────────────────────────────────────────────

crate::wire_enum! {
    pub enum ConnectorType {
        Cccs1 => "cCCS1",
        Cccs2 => "cCCS2",
        Cg105 => "cG105",
        CTesla => "cTesla",
        CType1 => "cType1",
        CType2 => "cType2",
        S309OnePhase16A => "s309-1P-16A",
        S309OnePhase32A => "s309-1P-32A",
        S309ThreePhase16A => "s309-3P-16A",
        S309ThreePhase32A => "s309-3P-32A",
        SBs1361 => "sBS1361",
        SCee77 => "sCEE-7-7",
        SType2 => "sType2",
        SType3 => "sType3",
        Other1PhMax16A => "Other1PhMax16A",
        Other1PhOver16A => "Other1PhOver16A",
        Other3Ph => "Other3Ph",
        Pan => "Pan",
        WInductive => "wInductive",
        WResonant => "wResonant",
        Undetermined => "Undetermined",
        Unknown => "Unknown",
    }
}

crate::wire_enum! {
    pub enum AttributeType {
        Actual => "Actual",
        Target => "Target",
        MinSet => "MinSet",
        MaxSet => "MaxSet",
    }
}

crate::wire_enum! {
    pub enum SetVariableStatus {
        Accepted => "Accepted",
        Rejected => "Rejected",
        UnknownComponent => "UnknownComponent",
        UnknownVariable => "UnknownVariable",
        NotSupportedAttributeType => "NotSupportedAttributeType",
        RebootRequired => "RebootRequired",
    }
}

crate::wire_enum! {
    pub enum Mutability {
        ReadOnly => "ReadOnly",
        WriteOnly => "WriteOnly",
        ReadWrite => "ReadWrite",
    }
}

crate::wire_enum! {
    pub enum ConnectorStatus {
        Available => "Available",
        Occupied => "Occupied",
        Reserved => "Reserved",
        Unavailable => "Unavailable",
        Faulted => "Faulted",
    }
}

crate::wire_enum! {
    pub enum IdTokenType {
        Central => "Central",
        EMaid => "eMAID",
        Iso14443 => "ISO14443",
        Iso15693 => "ISO15693",
        KeyCode => "KeyCode",
        Local => "Local",
        MacAddress => "MacAddress",
        NoAuthorization => "NoAuthorization",
    }
}

crate::wire_enum! {
    pub enum ReserveNowStatus {
        Accepted => "Accepted",
        Faulted => "Faulted",
        Occupied => "Occupied",
        Rejected => "Rejected",
        Unavailable => "Unavailable",
    }
}

// ── Device model ─────────────────────────────────────────────

crate::record! {
    pub struct Evse {
        "id" => pub id: i32,
        "connectorId" => pub connector_id: Option<i32>,
    }
}

crate::record! {
    pub struct Component {
        "name" => pub name: CiString50,
        "instance" => pub instance: Option<CiString50>,
        "evse" => pub evse: Option<Evse>,
    }
}

crate::record! {
    pub struct Variable {
        "name" => pub name: CiString50,
        "instance" => pub instance: Option<CiString50>,
    }
}

// ── SetVariables (central system → charge point) ─────────────

crate::record! {
    pub struct SetVariableData {
        "attributeType" => pub attribute_type: Option<AttributeType>,
        "attributeValue" => pub attribute_value: CiString1000,
        "component" => pub component: Component,
        "variable" => pub variable: Variable,
    }
}

crate::record! {
    pub struct SetVariablesRequest {
        "setVariableData" => pub set_variable_data: AlwaysEmit<SetVariableData>,
    }
}

crate::record! {
    pub struct SetVariableResult {
        "attributeType" => pub attribute_type: Option<AttributeType>,
        "attributeStatus" => pub attribute_status: SetVariableStatus,
        "component" => pub component: Component,
        "variable" => pub variable: Variable,
    }
}

crate::record! {
    pub struct SetVariablesResponse {
        "setVariableResult" => pub set_variable_result: AlwaysEmit<SetVariableResult>,
    }
}

impl Request for SetVariablesRequest {
    const ACTION: &'static str = "SetVariables";
    type Response = SetVariablesResponse;
}

// ── NotifyReport ─────────────────────────────────────────────

crate::record! {
    pub struct VariableAttribute {
        "type" => pub kind: Option<AttributeType>,
        "value" => pub value: Option<CiString2500>,
        "mutability" => pub mutability: Option<Mutability>,
        "persistent" => pub persistent: Option<bool>,
        "constant" => pub constant: Option<bool>,
    }
}

crate::record! {
    pub struct ReportData {
        "component" => pub component: Component,
        "variable" => pub variable: Variable,
        "variableAttribute" => pub variable_attribute: AlwaysEmit<VariableAttribute>,
    }
}

crate::record! {
    pub struct NotifyReportRequest {
        "requestId" => pub request_id: i32,
        "generatedAt" => pub generated_at: DateTime,
        "tbc" => pub tbc: Option<bool>,
        "seqNo" => pub seq_no: i32,
        "reportData" => pub report_data: OmitEmpty<ReportData>,
    }
}

crate::record! {
    pub struct NotifyReportResponse {}
}

impl Request for NotifyReportRequest {
    const ACTION: &'static str = "NotifyReport";
    type Response = NotifyReportResponse;
}

// ── StatusNotification ───────────────────────────────────────

crate::record! {
    pub struct StatusNotificationRequest {
        "timestamp" => pub timestamp: DateTime,
        "connectorStatus" => pub connector_status: ConnectorStatus,
        "evseId" => pub evse_id: i32,
        "connectorId" => pub connector_id: i32,
    }
}

crate::record! {
    pub struct StatusNotificationResponse {}
}

impl Request for StatusNotificationRequest {
    const ACTION: &'static str = "StatusNotification";
    type Response = StatusNotificationResponse;
}

// ── ReserveNow (central system → charge point) ───────────────

crate::record! {
    pub struct IdTokenInfo {
        "idToken" => pub id_token: IdToken,
        "type" => pub kind: IdTokenType,
    }
}

crate::record! {
    pub struct ReserveNowRequest {
        "id" => pub id: i32,
        "expiryDateTime" => pub expiry_date_time: DateTime,
        "connectorType" => pub connector_type: Option<ConnectorType>,
        "idToken" => pub id_token: IdTokenInfo,
        "evseId" => pub evse_id: Option<i32>,
    }
}

crate::record! {
    pub struct ReserveNowResponse {
        "status" => pub status: ReserveNowStatus,
    }
}

impl Request for ReserveNowRequest {
    const ACTION: &'static str = "ReserveNow";
    type Response = ReserveNowResponse;
}
