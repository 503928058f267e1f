use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::ParseVariantError;

/// A created decentralized identity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub id: Uuid,
    /// The DID string. Unique across all identifiers.
    pub did: String,
    pub method: DidMethod,
    /// DID document, stored verbatim.
    pub document: Value,
    /// Whether private key material is held by a remote node.
    pub key_stored: bool,
    pub sync_interval: Option<SyncInterval>,
    pub dwn_endpoints: Option<Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Input for [IdentifierStore::insert_identifier](crate::store::IdentifierStore::insert_identifier).
#[derive(Debug, Clone, PartialEq)]
pub struct NewIdentifier {
    pub did: String,
    pub method: DidMethod,
    pub document: Value,
    pub key_stored: bool,
    pub sync_interval: Option<SyncInterval>,
    pub dwn_endpoints: Option<Vec<String>>,
}

impl NewIdentifier {
    /// Stamps the input with a fresh id and the current time.
    pub fn into_identifier(self) -> Identifier {
        Identifier {
            id: Uuid::new_v4(),
            did: self.did,
            method: self.method,
            document: self.document,
            key_stored: self.key_stored,
            sync_interval: self.sync_interval,
            dwn_endpoints: self.dwn_endpoints,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DidMethod {
    #[default]
    Dht,
    Jwk,
    Ion,
}

impl DidMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DidMethod::Dht => "dht",
            DidMethod::Jwk => "jwk",
            DidMethod::Ion => "ion",
        }
    }
}

impl Display for DidMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DidMethod {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dht" => Ok(DidMethod::Dht),
            "jwk" => Ok(DidMethod::Jwk),
            "ion" => Ok(DidMethod::Ion),
            other => Err(ParseVariantError::new("did method", other)),
        }
    }
}

/// How often the identity agent syncs with its DWN endpoints.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SyncInterval {
    #[serde(rename = "30s")]
    ThirtySeconds,
    #[default]
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "off")]
    Off,
}

impl SyncInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncInterval::ThirtySeconds => "30s",
            SyncInterval::TwoMinutes => "2m",
            SyncInterval::FiveMinutes => "5m",
            SyncInterval::Off => "off",
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != SyncInterval::Off
    }
}

impl Display for SyncInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncInterval {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30s" => Ok(SyncInterval::ThirtySeconds),
            "2m" => Ok(SyncInterval::TwoMinutes),
            "5m" => Ok(SyncInterval::FiveMinutes),
            "off" => Ok(SyncInterval::Off),
            other => Err(ParseVariantError::new("sync interval", other)),
        }
    }
}
