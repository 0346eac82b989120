use crate::error::ProtocolError;
use crate::utils::{CUSTOMER_ID_PREFIX, CUSTOMER_ID_SUFFIX_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier a participant registers under at the relay.
///
/// Ids coming off the wire go through [`ParticipantId::new`], so a blank `userId`
/// fails to parse. `From` is for ids the program itself spells out.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Result<Self, ProtocolError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ProtocolError::EmptyParticipantId);
        }
        Ok(Self(id))
    }

    /// Fresh `user_xxxxxxxxx` id for a customer session. Never persisted.
    pub fn generate_customer() -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}",
            CUSTOMER_ID_PREFIX,
            &random[..CUSTOMER_ID_SUFFIX_LEN]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
