//! Job payload and its mapping onto the outbound-call request.
//!
//! Callers may spell payload fields in snake_case or camelCase. Each canonical
//! field maps to exactly one wire name; the snake_case spelling is checked
//! first and camelCase is the fallback.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::SchedulerError;

/// Accepted spellings of one payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAlias {
    /// Name sent on the wire; checked first.
    pub wire: &'static str,
    /// camelCase fallback.
    pub camel: &'static str,
}

/// Agent that will run the conversation.
pub const AGENT_ID: FieldAlias = FieldAlias {
    wire: "agent_id",
    camel: "agentId",
};
/// Number the call is placed from.
pub const AGENT_PHONE_NUMBER_ID: FieldAlias = FieldAlias {
    wire: "agent_phone_number_id",
    camel: "agentPhoneNumberId",
};
/// Destination phone number.
pub const TO_NUMBER: FieldAlias = FieldAlias {
    wire: "to_number",
    camel: "toNumber",
};
/// Optional structured context handed to the agent.
pub const CLIENT_DATA: FieldAlias = FieldAlias {
    wire: "conversation_initiation_client_data",
    camel: "conversationInitiationClientData",
};

/// Opaque job payload: any JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallPayload(pub Map<String, Value>);

impl CallPayload {
    /// Value of a field under either spelling, ignoring nulls.
    #[must_use]
    pub fn field(&self, alias: FieldAlias) -> Option<&Value> {
        [alias.wire, alias.camel]
            .into_iter()
            .find_map(|name| self.0.get(name).filter(|v| !v.is_null()))
    }

    fn reference(&self, alias: FieldAlias) -> Option<String> {
        match self.field(alias)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for CallPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Body of the outbound-call request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundCallRequest {
    /// Agent reference.
    pub agent_id: String,
    /// Caller number reference.
    pub agent_phone_number_id: String,
    /// Destination phone number.
    pub to_number: String,
    /// Optional context data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_initiation_client_data: Option<Value>,
}

impl TryFrom<&CallPayload> for OutboundCallRequest {
    type Error = SchedulerError;

    fn try_from(payload: &CallPayload) -> Result<Self, Self::Error> {
        let agent_id = payload.reference(AGENT_ID);
        let agent_phone_number_id = payload.reference(AGENT_PHONE_NUMBER_ID);
        let to_number = payload.reference(TO_NUMBER);

        match (agent_id, agent_phone_number_id, to_number) {
            (Some(agent_id), Some(agent_phone_number_id), Some(to_number)) => Ok(Self {
                agent_id,
                agent_phone_number_id,
                to_number,
                conversation_initiation_client_data: payload.field(CLIENT_DATA).cloned(),
            }),
            (agent_id, phone, to) => {
                let missing: Vec<&str> = [
                    (agent_id.is_none(), AGENT_ID.wire),
                    (phone.is_none(), AGENT_PHONE_NUMBER_ID.wire),
                    (to.is_none(), TO_NUMBER.wire),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Err(SchedulerError::InvalidPayload(format!(
                    "missing required outbound-call fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}
