use didhub_core::{
    agent::ConnectOptions,
    model::{DidMethod, SyncInterval},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::envelope::ApiError;

/// How the identity agent should be connected when creating a DID.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMethod {
    /// Agent defaults, no DWN endpoints.
    Auto,
    /// The endpoints given in the request.
    Custom,
    /// The configured community DWN.
    Community,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDidRequest {
    pub method: ConnectionMethod,
    #[serde(default)]
    pub did_method: DidMethod,
    #[serde(default)]
    pub sync_interval: SyncInterval,
    #[serde(default = "default_key_stored")]
    pub key_stored: bool,
    #[serde(default)]
    pub dwn_endpoints: Option<Vec<String>>,
}

fn default_key_stored() -> bool {
    true
}

impl CreateDidRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        for endpoint in self.dwn_endpoints.iter().flatten() {
            Url::parse(endpoint).map_err(|e| {
                ApiError::Validation(format!("invalid DWN endpoint {:?}: {}", endpoint, e))
            })?;
        }

        Ok(())
    }

    pub fn connect_options(&self, community_dwn: &str) -> ConnectOptions {
        let dwn_endpoints = match self.method {
            ConnectionMethod::Auto => Vec::new(),
            ConnectionMethod::Custom => self.dwn_endpoints.clone().unwrap_or_default(),
            ConnectionMethod::Community => vec![community_dwn.to_string()],
        };

        ConnectOptions {
            dwn_endpoints,
            sync: self.sync_interval,
            key_stored: self.key_stored,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolveDidRequest {
    pub did: String,
}

impl ResolveDidRequest {
    /// Returns the trimmed DID.
    pub fn validate(&self) -> Result<&str, ApiError> {
        let did = self.did.trim();

        if did.is_empty() {
            return Err(ApiError::Validation("did must not be empty".to_string()));
        }

        Ok(did)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_defaults() {
        let req: CreateDidRequest = serde_json::from_value(json!({ "method": "auto" })).unwrap();

        assert_eq!(req.did_method, DidMethod::Dht);
        assert_eq!(req.sync_interval, SyncInterval::TwoMinutes);
        assert!(req.key_stored);
        assert_eq!(req.dwn_endpoints, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_rejects_unknown_values() {
        let res = serde_json::from_value::<CreateDidRequest>(json!({ "method": "manual" }));
        assert!(res.is_err());

        let res = serde_json::from_value::<CreateDidRequest>(
            json!({ "method": "auto", "syncInterval": "10m" }),
        );
        assert!(res.is_err());

        let res = serde_json::from_value::<CreateDidRequest>(json!({ "didMethod": "jwk" }));
        assert!(res.is_err());
    }

    #[test]
    fn test_create_rejects_relative_endpoint() {
        let req: CreateDidRequest = serde_json::from_value(json!({
            "method": "custom",
            "dwnEndpoints": ["https://dwn.example.com", "/relative"],
        }))
        .unwrap();

        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("/relative"));
    }

    #[test]
    fn test_connect_options() {
        let mut req: CreateDidRequest = serde_json::from_value(json!({
            "method": "custom",
            "syncInterval": "off",
            "keyStored": false,
            "dwnEndpoints": ["https://dwn.example.com"],
        }))
        .unwrap();

        let options = req.connect_options("https://community.example.com");
        assert_eq!(options.dwn_endpoints, vec!["https://dwn.example.com"]);
        assert_eq!(options.sync, SyncInterval::Off);
        assert!(!options.key_stored);

        req.method = ConnectionMethod::Community;
        let options = req.connect_options("https://community.example.com");
        assert_eq!(options.dwn_endpoints, vec!["https://community.example.com"]);

        req.method = ConnectionMethod::Auto;
        assert!(req.connect_options("https://community.example.com").dwn_endpoints.is_empty());
    }

    #[test]
    fn test_resolve_trims() {
        let req = ResolveDidRequest {
            did: "  did:example:123\n".to_string(),
        };
        assert_eq!(req.validate().unwrap(), "did:example:123");

        let req = ResolveDidRequest {
            did: "   ".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
