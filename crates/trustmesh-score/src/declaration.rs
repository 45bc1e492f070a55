//! A trust declaration: an agent's claim about which of six trust
//! articles it upholds.

use serde::{Deserialize, Serialize};

/// The six trust articles a [`TrustDeclaration`] attests to. Order here
/// is the canonical order weights are applied in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Articles {
    /// The agent submits to inspection on demand.
    pub inspection_mandate: bool,
    /// The agent's consent model is architecturally enforced, not advisory.
    pub consent_architecture: bool,
    /// A human override exists for ethically consequential decisions.
    pub ethical_override: bool,
    /// The agent's compliance is validated continuously, not just at
    /// onboarding.
    pub continuous_validation: bool,
    /// Counterparties may disengage from the agent without penalty.
    pub right_to_disconnect: bool,
    /// The agent's moral status, whatever it is, is explicitly recognized
    /// rather than left ambiguous.
    pub moral_recognition: bool,
}

impl Articles {
    /// The six articles in canonical scoring order.
    #[must_use]
    pub const fn as_array(&self) -> [bool; 6] {
        [
            self.inspection_mandate,
            self.consent_architecture,
            self.ethical_override,
            self.continuous_validation,
            self.right_to_disconnect,
            self.moral_recognition,
        ]
    }
}

/// A structured claim about which trust articles an agent upholds.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustDeclaration {
    /// The declaring agent's DID.
    pub agent_id: String,
    /// A human-readable name for the agent.
    pub agent_name: String,
    /// The six articles declared.
    pub articles: Articles,
}
