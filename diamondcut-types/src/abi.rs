//! Solidity JSON ABI, as emitted by the compiler and persisted for the proxy.
//!
//! Fragments are plain recursive records: a kind tag, an optional name and
//! ordered parameters whose `components` nest to arbitrary depth. The serde
//! layout follows the compiler output so stored ABIs round-trip unchanged.

use serde::{Deserialize, Serialize};

/// Entry kind, serialized as the ABI `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    #[default]
    Function,
    Event,
    Error,
    Constructor,
    Fallback,
    Receive,
}

impl FragmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FragmentKind::Function => "function",
            FragmentKind::Event => "event",
            FragmentKind::Error => "error",
            FragmentKind::Constructor => "constructor",
            FragmentKind::Fallback => "fallback",
            FragmentKind::Receive => "receive",
        }
    }
}

/// One callable (or emitted) entry point.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbiFragment {
    #[serde(rename = "type", default)]
    pub kind: FragmentKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub inputs: Vec<AbiParam>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<AbiParam>,

    #[serde(
        rename = "stateMutability",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
}

impl AbiFragment {
    /// A `function` fragment with the given inputs and no outputs.
    pub fn function(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            kind: FragmentKind::Function,
            name: Some(name.into()),
            inputs,
            outputs: vec![],
            state_mutability: Some("nonpayable".to_string()),
            anonymous: None,
        }
    }

    /// An `event` fragment with the given inputs.
    pub fn event(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            kind: FragmentKind::Event,
            name: Some(name.into()),
            inputs,
            outputs: vec![],
            state_mutability: None,
            anonymous: Some(false),
        }
    }

    pub fn is_function(&self) -> bool {
        self.kind == FragmentKind::Function
    }

    /// Name for diagnostics; unnamed kinds fall back to the kind tag.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }
}

/// A typed parameter. Tuple-typed parameters carry their `components`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(
        rename = "internalType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<AbiParam>>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            internal_type: None,
            indexed: None,
            components: None,
        }
    }

    /// A tuple parameter; `suffix` is the array part of the type (`""`, `"[]"`, `"[3]"`).
    pub fn tuple(name: impl Into<String>, suffix: &str, components: Vec<AbiParam>) -> Self {
        Self {
            name: name.into(),
            ty: format!("tuple{}", suffix),
            internal_type: None,
            indexed: None,
            components: Some(components),
        }
    }

    pub fn is_tuple(&self) -> bool {
        self.ty.starts_with("tuple")
    }

    /// Array suffix of a tuple type (`tuple[2][]` gives `[2][]`).
    pub fn tuple_suffix(&self) -> Option<&str> {
        self.ty.strip_prefix("tuple")
    }
}

/// An ordered interface description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi(pub Vec<AbiFragment>);

impl Abi {
    pub fn new(fragments: Vec<AbiFragment>) -> Self {
        Self(fragments)
    }

    pub fn fragments(&self) -> &[AbiFragment] {
        &self.0
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiFragment> {
        self.0.iter().filter(|f| f.is_function())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AbiFragment> {
        self.0.iter()
    }

    /// Concatenate several descriptions, keeping order.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a Abi>) -> Abi {
        Abi(parts
            .into_iter()
            .flat_map(|abi| abi.0.iter().cloned())
            .collect())
    }
}

impl From<Vec<AbiFragment>> for Abi {
    fn from(fragments: Vec<AbiFragment>) -> Self {
        Self(fragments)
    }
}

impl<'a> IntoIterator for &'a Abi {
    type Item = &'a AbiFragment;
    type IntoIter = std::slice::Iter<'a, AbiFragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
