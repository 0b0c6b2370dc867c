//! Inbound Call dispatch.
//!
//! Handlers are registered per action with their request type. The
//! dispatcher decodes the payload, calls the handler and writes the reply
//! envelope straight to the output; decode failures and unknown actions
//! are answered with a CallError without reaching any handler.

use std::io;

use log::{debug, warn};
use serde_json::Value;

use super::Request;
use super::envelope::{
    CallError, ErrorCode, Message, write_call_error, write_call_result, write_custom_result,
};
use crate::codec::decode_record;
use crate::config::ProtocolVersion;
use crate::error::{DecodeError, FieldFault};

/// Writes a raw CallResult payload (one JSON value) to the transport.
pub type CustomWriter = Box<dyn FnOnce(&mut dyn io::Write) -> io::Result<()> + Send>;

/// A handler's answer to one Call.
pub enum Reply<R> {
    Result(R),
    Error(CallError),
    /// Payload bytes produced by the handler itself, framed as a CallResult.
    Custom(CustomWriter),
}

type Handler = Box<dyn Fn(&str, &Value, &mut dyn io::Write) -> io::Result<()> + Send + Sync>;

pub struct Dispatcher {
    version: ProtocolVersion,
    routes: Vec<(&'static str, Handler)>,
}

impl Dispatcher {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            routes: Vec::new(),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Register `handler` for `Q::ACTION`, replacing any previous handler.
    pub fn on<Q, F>(&mut self, handler: F) -> &mut Self
    where
        Q: Request + 'static,
        F: Fn(Q) -> Reply<Q::Response> + Send + Sync + 'static,
    {
        let version = self.version;
        let route: Handler = Box::new(
            move |unique_id: &str, payload: &Value, out: &mut dyn io::Write| {
                let reply = match decode_record::<Q>(payload) {
                    Ok(request) => handler(request),
                    Err(e) => {
                        warn!("RPC[{}]: {} payload rejected: {}", unique_id, Q::ACTION, e);
                        Reply::Error(decode_failure(version, &e))
                    }
                };
                match reply {
                    Reply::Result(response) => write_call_result(out, unique_id, &response),
                    Reply::Error(error) => write_call_error(out, unique_id, &error),
                    Reply::Custom(writer) => write_custom_result(out, unique_id, writer),
                }
            },
        );

        self.routes.retain(|(action, _)| *action != Q::ACTION);
        self.routes.push((Q::ACTION, route));
        self
    }

    pub fn handles(&self, action: &str) -> bool {
        self.routes.iter().any(|(a, _)| *a == action)
    }

    /// Answer `message` if it is a Call. Returns `false` (and writes
    /// nothing) for responses.
    pub fn dispatch(&self, message: &Message, out: &mut dyn io::Write) -> io::Result<bool> {
        let Message::Call {
            unique_id,
            action,
            payload,
        } = message
        else {
            return Ok(false);
        };

        match self.routes.iter().find(|(a, _)| *a == action.as_str()) {
            Some((_, handler)) => {
                debug!("RPC[{}]: <- {}", unique_id, action);
                handler(unique_id.as_str(), payload, out)?;
            }
            None => {
                warn!("RPC[{}]: no handler for {}", unique_id, action);
                let error = CallError::new(
                    ErrorCode::NotImplemented,
                    format!("action '{action}' is not implemented"),
                );
                write_call_error(out, unique_id, &error)?;
            }
        }
        out.flush()?;
        Ok(true)
    }
}

/// Map a payload decode failure to the CallError the protocol revision
/// expects.
pub fn decode_failure(version: ProtocolVersion, error: &DecodeError) -> CallError {
    let fault = match error {
        DecodeError::InvalidField { fault, .. } | DecodeError::Fault(fault) => Some(fault),
        _ => None,
    };
    let code = match (error, fault) {
        (DecodeError::MissingField(_), _) => match version {
            ProtocolVersion::V16 => ErrorCode::OccurenceConstraintViolation,
            ProtocolVersion::V201 => ErrorCode::OccurrenceConstraintViolation,
        },
        (_, Some(FieldFault::TypeMismatch(_))) => ErrorCode::TypeConstraintViolation,
        (_, Some(FieldFault::String(_) | FieldFault::OutOfRange)) => {
            ErrorCode::PropertyConstraintViolation
        }
        _ => match version {
            ProtocolVersion::V16 => ErrorCode::FormationViolation,
            ProtocolVersion::V201 => ErrorCode::FormatViolation,
        },
    };
    let error_call = CallError::new(code, error.to_string());
    match error.field() {
        Some(field) => error_call.with_details(serde_json::json!({ "field": field })),
        None => error_call,
    }
}
