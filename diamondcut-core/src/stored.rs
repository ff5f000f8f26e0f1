//! Stored ABI documents.
//!
//! A stored ABI is either a bare JSON array of fragments or a deployment
//! record (`{"address": ..., "abi": [...], ...}`) whose `abi` field holds
//! them. Rewriting a record leaves its other fields untouched.

use anyhow::Context;
use diamondcut_types::Abi;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredAbi {
    abi: Abi,
    envelope: Option<Map<String, Value>>,
}

impl StoredAbi {
    /// A bare fragment array.
    pub fn bare(abi: Abi) -> Self {
        Self {
            abi,
            envelope: None,
        }
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(text).context("parse ABI JSON")?;
        match value {
            Value::Array(_) => {
                let abi = serde_json::from_value(value).context("decode ABI fragments")?;
                Ok(Self::bare(abi))
            }
            Value::Object(mut map) => {
                let abi = map
                    .remove("abi")
                    .context("ABI document is an object without an `abi` field")?;
                let abi = serde_json::from_value(abi).context("decode `abi` field")?;
                Ok(Self {
                    abi,
                    envelope: Some(map),
                })
            }
            _ => anyhow::bail!("expected an ABI array or an object with an `abi` field"),
        }
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn into_abi(self) -> Abi {
        self.abi
    }

    /// Same document shape, carrying `abi` instead.
    pub fn with_abi(&self, abi: Abi) -> Self {
        Self {
            abi,
            envelope: self.envelope.clone(),
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        let abi = serde_json::to_value(&self.abi).context("serialize ABI")?;
        let value = match &self.envelope {
            None => abi,
            Some(map) => {
                let mut map = map.clone();
                map.insert("abi".to_string(), abi);
                Value::Object(map)
            }
        };
        let mut text = serde_json::to_string_pretty(&value).context("serialize ABI document")?;
        text.push('\n');
        Ok(text)
    }
}
