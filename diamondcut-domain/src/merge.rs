//! Structural merge of interface descriptions.

use crate::selectors::{declared_components, normalize_elementary};
use diamondcut_types::{Abi, AbiFragment, AbiParam};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::selectors::validate_abi;

/// How strictly two fragments must agree to count as the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityMode {
    /// Kind, name, arity, nesting shape and normalized parameter types.
    #[default]
    Strict,
    /// Kind, name, arity and nesting shape only. Parameter types are ignored,
    /// which matches how previously stored interfaces were deduplicated.
    Shape,
}

impl EqualityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EqualityMode::Strict => "strict",
            EqualityMode::Shape => "shape",
        }
    }
}

impl std::str::FromStr for EqualityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(EqualityMode::Strict),
            "shape" => Ok(EqualityMode::Shape),
            other => Err(format!(
                "unknown equality mode '{}' (expected 'strict' or 'shape')",
                other
            )),
        }
    }
}

/// Structural equality of two fragments.
pub fn entries_equal(a: &AbiFragment, b: &AbiFragment, mode: EqualityMode) -> bool {
    a.kind == b.kind && a.name == b.name && params_equal(&a.inputs, &b.inputs, mode)
}

fn params_equal(a: &[AbiParam], b: &[AbiParam], mode: EqualityMode) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| param_equal(x, y, mode))
}

fn param_equal(a: &AbiParam, b: &AbiParam, mode: EqualityMode) -> bool {
    let shape = match (declared_components(a), declared_components(b)) {
        (Some(ca), Some(cb)) => params_equal(ca, cb, mode),
        (None, None) => true,
        _ => false,
    };
    shape && (mode == EqualityMode::Shape || type_key(a) == type_key(b))
}

fn type_key(param: &AbiParam) -> String {
    match param.tuple_suffix() {
        Some(suffix) => format!("tuple{}", suffix.trim()),
        None => normalize_elementary(param.ty.trim()),
    }
}

/// First structurally-equal occurrence wins; order is otherwise preserved.
pub fn dedup_abi(abi: &Abi, mode: EqualityMode) -> Abi {
    let mut out: Vec<AbiFragment> = Vec::with_capacity(abi.len());
    for fragment in abi {
        if !out.iter().any(|kept| entries_equal(kept, fragment, mode)) {
            out.push(fragment.clone());
        }
    }
    Abi::new(out)
}

/// `base` followed by the fragments of `incoming` it does not already hold.
///
/// The result is deduplicated against itself, so `merge(d, d)` and
/// `merge(d, empty)` both equal `dedup_abi(d)`. Where `base` and `incoming`
/// hold equal fragments, `base`'s copy is the one kept.
pub fn merge(base: &Abi, incoming: &Abi, mode: EqualityMode) -> Abi {
    let merged = dedup_abi(&Abi::concat([base, incoming]), mode);
    debug!(
        base = base.len(),
        incoming = incoming.len(),
        merged = merged.len(),
        mode = mode.as_str(),
        "merged interface"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamondcut_types::FragmentKind;

    fn transfer() -> AbiFragment {
        AbiFragment::function(
            "transfer",
            vec![AbiParam::new("to", "address"), AbiParam::new("amount", "uint256")],
        )
    }

    fn mint() -> AbiFragment {
        AbiFragment::function("mint", vec![AbiParam::new("amount", "uint256")])
    }

    #[test]
    fn equal_ignores_param_names_and_internal_types() {
        let mut other = transfer();
        other.inputs[0].name = "recipient".to_string();
        other.inputs[0].internal_type = Some("address".to_string());
        assert!(entries_equal(&transfer(), &other, EqualityMode::Strict));
    }

    #[test]
    fn kind_name_and_arity_must_match() {
        let mut event = transfer();
        event.kind = FragmentKind::Event;
        assert!(!entries_equal(&transfer(), &event, EqualityMode::Shape));

        let mut renamed = transfer();
        renamed.name = Some("send".to_string());
        assert!(!entries_equal(&transfer(), &renamed, EqualityMode::Shape));

        let mut shorter = transfer();
        shorter.inputs.pop();
        assert!(!entries_equal(&transfer(), &shorter, EqualityMode::Shape));
    }

    #[test]
    fn shape_mode_ignores_primitive_types() {
        let a = AbiFragment::function("set", vec![AbiParam::new("v", "uint256")]);
        let b = AbiFragment::function("set", vec![AbiParam::new("v", "address")]);
        assert!(entries_equal(&a, &b, EqualityMode::Shape));
        assert!(!entries_equal(&a, &b, EqualityMode::Strict));
    }

    #[test]
    fn strict_mode_normalizes_aliases() {
        let a = AbiFragment::function("set", vec![AbiParam::new("v", "uint")]);
        let b = AbiFragment::function("set", vec![AbiParam::new("v", "uint256")]);
        assert!(entries_equal(&a, &b, EqualityMode::Strict));
    }

    #[test]
    fn one_sided_components_are_unequal() {
        let a = AbiFragment::function(
            "open",
            vec![AbiParam::tuple("t", "", vec![AbiParam::new("x", "uint8")])],
        );
        let b = AbiFragment::function("open", vec![AbiParam::new("t", "uint8")]);
        assert!(!entries_equal(&a, &b, EqualityMode::Shape));
        assert!(!entries_equal(&b, &a, EqualityMode::Shape));
    }

    #[test]
    fn empty_components_on_elementary_type_count_as_absent() {
        let mut a = AbiParam::new("v", "uint8");
        a.components = Some(vec![]);
        let fa = AbiFragment::function("f", vec![a]);
        let fb = AbiFragment::function("f", vec![AbiParam::new("v", "uint8")]);
        assert!(entries_equal(&fa, &fb, EqualityMode::Strict));
    }

    #[test]
    fn nested_components_recurse() {
        let leg = |ty: &str| AbiParam::tuple("legs", "[]", vec![AbiParam::new("qty", ty)]);
        let outer = |inner: AbiParam| {
            AbiFragment::function(
                "open",
                vec![AbiParam::tuple("data", "", vec![AbiParam::new("base", "address"), inner])],
            )
        };
        assert!(entries_equal(&outer(leg("uint96")), &outer(leg("uint96")), EqualityMode::Strict));
        assert!(!entries_equal(&outer(leg("uint96")), &outer(leg("uint64")), EqualityMode::Strict));
        assert!(entries_equal(&outer(leg("uint96")), &outer(leg("uint64")), EqualityMode::Shape));

        let deeper = AbiParam::tuple(
            "legs",
            "[]",
            vec![AbiParam::new("qty", "uint96"), AbiParam::new("price", "uint64")],
        );
        assert!(!entries_equal(&outer(leg("uint96")), &outer(deeper), EqualityMode::Shape));
    }

    #[test]
    fn merge_appends_only_new_fragments() {
        let base = Abi::new(vec![transfer()]);
        let incoming = Abi::new(vec![transfer(), mint()]);
        let merged = merge(&base, &incoming, EqualityMode::Strict);
        assert_eq!(merged, Abi::new(vec![transfer(), mint()]));
    }

    #[test]
    fn merge_keeps_base_copy_on_tie() {
        let mut base_copy = transfer();
        base_copy.inputs[0].name = "base".to_string();
        let base = Abi::new(vec![base_copy.clone()]);
        let incoming = Abi::new(vec![transfer()]);
        let merged = merge(&base, &incoming, EqualityMode::Strict);
        assert_eq!(merged.fragments(), &[base_copy]);
    }

    #[test]
    fn merge_dedups_incoming_against_itself() {
        let merged = merge(
            &Abi::default(),
            &Abi::new(vec![mint(), mint(), transfer()]),
            EqualityMode::Shape,
        );
        assert_eq!(merged, Abi::new(vec![mint(), transfer()]));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Strict".parse::<EqualityMode>(), Ok(EqualityMode::Strict));
        assert_eq!("shape".parse::<EqualityMode>(), Ok(EqualityMode::Shape));
        assert!("loose".parse::<EqualityMode>().is_err());
    }
}
