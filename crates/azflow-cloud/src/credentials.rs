//! Service principal credentials

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service principal used to authenticate against the control plane
///
/// The secret is never printed by the `Debug` implementation and never serialized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub subscription_id: String,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            subscription_id: subscription_id.into(),
        }
    }

    /// Names of the fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("subscription_id", &self.subscription_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secret() {
        let credentials = Credentials::new("tenant", "client", "s3cr3t", "sub");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("tenant"));
    }

    #[test]
    fn test_serialization_omits_secret() {
        let credentials = Credentials::new("tenant", "client", "s3cr3t", "sub");
        let json = serde_json::to_string(&credentials).unwrap();
        assert!(!json.contains("s3cr3t"));
        assert!(!json.contains("client_secret"));
        assert!(json.contains("\"tenant_id\":\"tenant\""));
    }

    #[test]
    fn test_missing_fields() {
        let credentials = Credentials::new("tenant", "", "secret", "  ");
        assert_eq!(
            credentials.missing_fields(),
            vec!["client_id", "subscription_id"]
        );
        assert!(
            Credentials::new("t", "c", "s", "sub")
                .missing_fields()
                .is_empty()
        );
    }
}
