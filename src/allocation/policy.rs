//! Allocation policy identifiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AllocationError;

/// How selections are distributed across participants.
///
/// The set is closed: dispatch is an exhaustive match, so adding a policy
/// without implementing it fails to compile rather than silently defaulting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AllocationPolicy {
    /// Snake draft: pick order reverses after every full pass.
    Staggered,
    /// Favorite-first tiers, drawn at random within each tier.
    #[default]
    Tiered,
    /// Uniform random partition with no probability awareness.
    Random,
    /// Greedy equity balancing toward an equal share each.
    Fair,
}

impl AllocationPolicy {
    /// Parse a policy identifier, surfacing unknown values as a distinct
    /// error instead of defaulting.
    pub fn parse(value: &str) -> Result<Self, AllocationError> {
        value
            .parse()
            .map_err(|_| AllocationError::UnknownPolicy(value.to_string()))
    }
}
