//! Selector derivation and order-preserving set algebra over selector lists.

use crate::error::PlanError;
use alloy_primitives::keccak256;
use diamondcut_types::{Abi, AbiFragment, AbiParam, Selector};
use std::collections::HashSet;

/// A function's selector together with the signature it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    pub selector: Selector,
    pub signature: String,
}

/// `name(type,...)` with tuples expanded to their parenthesized component list.
pub fn canonical_signature(fragment: &AbiFragment) -> Result<String, PlanError> {
    let name = fragment
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| {
            let detail = format!("{} fragment has no name", fragment.kind.as_str());
            malformed(fragment, detail)
        })?;

    let types = fragment
        .inputs
        .iter()
        .map(canonical_type)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|detail| malformed(fragment, detail))?;

    Ok(format!("{}({})", name, types.join(",")))
}

/// First four bytes of keccak256 over `signature`.
pub fn selector_from_signature(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    Selector::new([digest[0], digest[1], digest[2], digest[3]])
}

pub fn selector_of(fragment: &AbiFragment) -> Result<Selector, PlanError> {
    canonical_signature(fragment).map(|sig| selector_from_signature(&sig))
}

/// Function selectors of `abi` in declaration order, with their signatures.
///
/// Repeated declarations of one signature collapse to a single entry. Two
/// different signatures that hash to the same selector are a collision.
pub fn selector_table(abi: &Abi) -> Result<Vec<SelectorEntry>, PlanError> {
    let mut out: Vec<SelectorEntry> = Vec::new();
    for fragment in abi.functions() {
        let signature = canonical_signature(fragment)?;
        let selector = selector_from_signature(&signature);
        match out.iter().find(|e| e.selector == selector) {
            Some(existing) if existing.signature == signature => continue,
            Some(existing) => {
                return Err(PlanError::SelectorCollision {
                    selector,
                    first: existing.signature.clone(),
                    second: signature,
                });
            }
            None => out.push(SelectorEntry {
                selector,
                signature,
            }),
        }
    }
    Ok(out)
}

/// Function selectors of `abi`, deduplicated, in declaration order.
pub fn selectors_of(abi: &Abi) -> Result<Vec<Selector>, PlanError> {
    Ok(selector_table(abi)?
        .into_iter()
        .map(|e| e.selector)
        .collect())
}

/// Elements of `a` also in `b`, in `a`'s order, without duplicates.
pub fn intersect(a: &[Selector], b: &[Selector]) -> Vec<Selector> {
    let other: HashSet<Selector> = b.iter().copied().collect();
    retain_unique(a, |s| other.contains(s))
}

/// Elements of `a` not in `b`, in `a`'s order, without duplicates.
pub fn subtract(a: &[Selector], b: &[Selector]) -> Vec<Selector> {
    let other: HashSet<Selector> = b.iter().copied().collect();
    retain_unique(a, |s| !other.contains(s))
}

/// `a` with later repeats dropped.
pub fn dedup(a: &[Selector]) -> Vec<Selector> {
    retain_unique(a, |_| true)
}

fn retain_unique(a: &[Selector], keep: impl Fn(&Selector) -> bool) -> Vec<Selector> {
    let mut seen = HashSet::with_capacity(a.len());
    a.iter()
        .copied()
        .filter(|s| keep(s) && seen.insert(*s))
        .collect()
}

/// Check that every parameter's declared type agrees with its components.
pub fn validate_fragment(fragment: &AbiFragment) -> Result<(), PlanError> {
    for param in fragment.inputs.iter().chain(fragment.outputs.iter()) {
        canonical_type(param).map_err(|detail| malformed(fragment, detail))?;
    }
    Ok(())
}

/// Validate every fragment of `abi`.
pub fn validate_abi(abi: &Abi) -> Result<(), PlanError> {
    abi.iter().try_for_each(validate_fragment)
}

/// Canonical type string of one parameter (`uint` becomes `uint256`, tuples expand).
pub(crate) fn canonical_type(param: &AbiParam) -> Result<String, String> {
    let ty = param.ty.trim();
    if ty.is_empty() {
        return Err(format!("parameter '{}' has an empty type", param.name));
    }

    match (param.tuple_suffix(), declared_components(param)) {
        (Some(suffix), Some(components)) => {
            if !is_array_suffix(suffix) {
                return Err(format!(
                    "parameter '{}' has malformed tuple type '{}'",
                    param.name, param.ty
                ));
            }
            let inner = components
                .iter()
                .map(canonical_type)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("({}){}", inner.join(","), suffix))
        }
        (Some(_), None) => Err(format!(
            "parameter '{}' has type '{}' but declares no components",
            param.name, param.ty
        )),
        (None, Some(components)) if !components.is_empty() => Err(format!(
            "parameter '{}' declares {} component(s) but has non-tuple type '{}'",
            param.name,
            components.len(),
            param.ty
        )),
        (None, _) => Ok(normalize_elementary(ty)),
    }
}

/// Components as declared; `Some(&[])` only survives on tuple types.
pub(crate) fn declared_components(param: &AbiParam) -> Option<&[AbiParam]> {
    match &param.components {
        Some(c) if !c.is_empty() || param.is_tuple() => Some(c.as_slice()),
        _ => None,
    }
}

/// Expand the short aliases Solidity accepts (`uint`, `int`, `byte`, `fixed`).
pub(crate) fn normalize_elementary(ty: &str) -> String {
    let (base, suffix) = match ty.find('[') {
        Some(idx) => ty.split_at(idx),
        None => (ty, ""),
    };
    let base = match base {
        "uint" => "uint256",
        "int" => "int256",
        "byte" => "bytes1",
        "fixed" => "fixed128x18",
        "ufixed" => "ufixed128x18",
        other => other,
    };
    format!("{}{}", base, suffix)
}

fn is_array_suffix(suffix: &str) -> bool {
    let mut rest = suffix;
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return false;
        };
        let Some(close) = inner.find(']') else {
            return false;
        };
        if !inner[..close].chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        rest = &inner[close + 1..];
    }
    true
}

fn malformed(fragment: &AbiFragment, detail: String) -> PlanError {
    PlanError::MalformedFragment {
        facet: String::new(),
        fragment: fragment.display_name().to_string(),
        detail,
    }
}
