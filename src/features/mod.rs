//! Per-tenant feature gating.
//!
//! Feature keys are added over the product's lifetime and older tenant rows
//! simply lack the newer keys. The policy therefore biases toward visible: a
//! feature is disabled only by the literal boolean `false` on the tenant row.
//! That polarity is load-bearing - `== true` would silently hide every feature
//! shipped after a tenant was created.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Tenant;

/// Explicit three-state flag so the default-allow rule is a named policy
/// rather than an easily-inverted boolean expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagState {
    Enabled,
    Disabled,
    /// Key absent from the tenant row. Coerces to enabled.
    Unset,
}

impl FlagState {
    /// Wire rule: only the literal boolean `false` disables.
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Bool(false) => FlagState::Disabled,
            _ => FlagState::Enabled,
        }
    }

    /// The single coercion rule: `Unset` behaves as enabled.
    pub fn effective(self) -> bool {
        !matches!(self, FlagState::Disabled)
    }
}

/// Whether `feature_key` is visible for this tenant.
pub fn is_enabled(tenant: &Tenant, feature_key: &str) -> bool {
    tenant
        .feature_flags
        .get(feature_key)
        .copied()
        .unwrap_or(FlagState::Unset)
        .effective()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_literal_false_disables() {
        assert_eq!(FlagState::from_wire(&json!(false)), FlagState::Disabled);
        assert_eq!(FlagState::from_wire(&json!(true)), FlagState::Enabled);
        assert_eq!(FlagState::from_wire(&json!(null)), FlagState::Enabled);
        assert_eq!(FlagState::from_wire(&json!(0)), FlagState::Enabled);
        assert_eq!(FlagState::from_wire(&json!("false")), FlagState::Enabled);
    }

    #[test]
    fn unset_coerces_to_enabled() {
        assert!(FlagState::Unset.effective());
        assert!(FlagState::Enabled.effective());
        assert!(!FlagState::Disabled.effective());
    }

    #[test]
    fn empty_flag_map_enables_everything() {
        let tenant = Tenant::empty("T1", "Demo School");
        assert!(is_enabled(&tenant, "quizzes"));
        assert!(is_enabled(&tenant, "a-key-from-the-future"));
    }

    #[test]
    fn disabled_key_does_not_bleed_into_others() {
        let mut tenant = Tenant::empty("T1", "Demo School");
        tenant.feature_flags.insert("talkingCards".to_string(), FlagState::Disabled);
        assert!(!is_enabled(&tenant, "talkingCards"));
        assert!(is_enabled(&tenant, "quizzes"));
    }
}
