use crate::model::participant::ParticipantId;
use crate::utils::DEFAULT_SUPPORT_ADDR;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Customer,
}

/// Where each role can be reached on the relay.
///
/// Customers look up the support desk here instead of hard-coding its address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleDirectory {
    pub support: ParticipantId,
}

impl RoleDirectory {
    pub fn new(support: ParticipantId) -> Self {
        Self { support }
    }

    pub fn support(&self) -> &ParticipantId {
        &self.support
    }

    pub fn is_support(&self, id: &ParticipantId) -> bool {
        &self.support == id
    }
}

impl Default for RoleDirectory {
    fn default() -> Self {
        Self {
            support: ParticipantId::from(DEFAULT_SUPPORT_ADDR),
        }
    }
}
