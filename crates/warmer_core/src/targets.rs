use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::contract::{TargetDescriptor, DEFAULT_REGION};
use crate::error::ConfigurationError;

pub const REGION_VAR: &str = "REGION";

/// Upper bound on invocations in one run. Every outcome needs a slot in the
/// completion channel, and tokio caps channel capacity at `usize::MAX >> 3`.
pub const MAX_TOTAL_INVOCATIONS: usize = 1 << 28;

fn function_key_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| {
        Regex::new(r"^LAMBDA_(\d+)_FUNCTION$").expect("function key pattern is valid")
    })
}

/// Builds the ordered target list from environment-style variables.
///
/// Each `LAMBDA_<n>_FUNCTION` key declares a target; `LAMBDA_<n>_PATH`,
/// `LAMBDA_<n>_REGION` and `LAMBDA_<n>_COUNT` refine it. Targets come back
/// sorted by `<n>`.
pub fn resolve_targets<I, K, V>(vars: I) -> Result<Vec<TargetDescriptor>, ConfigurationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let vars: HashMap<String, String> = vars
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect();

    let default_region = non_empty(vars.get(REGION_VAR))
        .unwrap_or(DEFAULT_REGION)
        .to_string();

    let mut indexed = BTreeMap::new();
    for (key, value) in &vars {
        let Some(captures) = function_key_matcher().captures(key) else {
            continue;
        };
        let digits = &captures[1];
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(ConfigurationError::InvalidIndex { key: key.clone() });
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| ConfigurationError::InvalidIndex { key: key.clone() })?;

        let name = value.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyFunctionName { index });
        }

        let region = non_empty(vars.get(&format!("LAMBDA_{index}_REGION")))
            .unwrap_or(default_region.as_str())
            .to_string();

        indexed.insert(
            index,
            TargetDescriptor {
                name: name.to_string(),
                path: vars
                    .get(&format!("LAMBDA_{index}_PATH"))
                    .cloned()
                    .unwrap_or_default(),
                region,
                count: parse_count(index, vars.get(&format!("LAMBDA_{index}_COUNT")))?,
            },
        );
    }

    let targets: Vec<TargetDescriptor> = indexed.into_values().collect();
    total_invocations(&targets)?;
    Ok(targets)
}

/// Sum of all target counts, rejected once it passes `MAX_TOTAL_INVOCATIONS`.
pub fn total_invocations(targets: &[TargetDescriptor]) -> Result<usize, ConfigurationError> {
    let too_many = ConfigurationError::TooManyInvocations {
        limit: MAX_TOTAL_INVOCATIONS,
    };
    targets
        .iter()
        .try_fold(0usize, |total, target| total.checked_add(target.count))
        .filter(|total| *total <= MAX_TOTAL_INVOCATIONS)
        .ok_or(too_many)
}

fn parse_count(index: u32, raw: Option<&String>) -> Result<usize, ConfigurationError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(1);
    };
    let invalid = || ConfigurationError::InvalidCount {
        index,
        value: raw.to_string(),
    };
    let parsed: i32 = raw.parse().map_err(|_| invalid())?;
    if parsed <= 0 {
        return Ok(1);
    }
    usize::try_from(parsed).map_err(|_| invalid())
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|value| value.trim()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn resolves_targets_in_index_order_with_defaults() {
        let targets = resolve_targets(env(&[
            ("LAMBDA_2_FUNCTION", "billing"),
            ("LAMBDA_10_FUNCTION", "search"),
            ("LAMBDA_10_COUNT", "4"),
            ("LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_1_PATH", "/spin"),
            ("HOME", "/root"),
        ]))
        .expect("targets should resolve");

        let names: Vec<&str> = targets.iter().map(|target| target.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "billing", "search"]);
        assert_eq!(targets[0].path, "/spin");
        assert_eq!(targets[0].count, 1);
        assert_eq!(targets[0].region, DEFAULT_REGION);
        assert_eq!(targets[1].path, "");
        assert_eq!(targets[2].count, 4);
        assert_eq!(total_invocations(&targets), Ok(6));
    }

    #[test]
    fn region_prefers_target_override_then_global() {
        let targets = resolve_targets(env(&[
            ("REGION", "us-east-1"),
            ("LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_2_FUNCTION", "billing"),
            ("LAMBDA_2_REGION", "eu-central-1"),
        ]))
        .expect("targets should resolve");

        assert_eq!(targets[0].region, "us-east-1");
        assert_eq!(targets[1].region, "eu-central-1");
    }

    #[test]
    fn non_positive_count_falls_back_to_one() {
        let targets = resolve_targets(env(&[
            ("LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_1_COUNT", "0"),
            ("LAMBDA_2_FUNCTION", "billing"),
            ("LAMBDA_2_COUNT", "-3"),
        ]))
        .expect("targets should resolve");

        assert!(targets.iter().all(|target| target.count == 1));
    }

    #[test]
    fn rejects_malformed_count() {
        let error = resolve_targets(env(&[
            ("LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_1_COUNT", "lots"),
        ]))
        .expect_err("malformed count should fail");

        assert_eq!(
            error,
            ConfigurationError::InvalidCount {
                index: 1,
                value: "lots".to_string(),
            }
        );
    }

    #[test]
    fn rejects_count_beyond_32_bits() {
        let error = resolve_targets(env(&[
            ("LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_1_COUNT", "9223372036854775807"),
        ]))
        .expect_err("oversized count should fail");

        assert_eq!(
            error,
            ConfigurationError::InvalidCount {
                index: 1,
                value: "9223372036854775807".to_string(),
            }
        );
    }

    #[test]
    fn rejects_total_beyond_channel_limit() {
        let error = resolve_targets(env(&[
            ("LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_1_COUNT", "2147483647"),
        ]))
        .expect_err("oversized total should fail");

        assert_eq!(
            error,
            ConfigurationError::TooManyInvocations {
                limit: MAX_TOTAL_INVOCATIONS,
            }
        );
    }

    #[test]
    fn total_invocations_rejects_overflowing_sum() {
        let target = TargetDescriptor {
            name: "orders".to_string(),
            path: String::new(),
            region: DEFAULT_REGION.to_string(),
            count: usize::MAX,
        };
        let targets = vec![target.clone(), target.clone(), target];

        assert_eq!(
            total_invocations(&targets),
            Err(ConfigurationError::TooManyInvocations {
                limit: MAX_TOTAL_INVOCATIONS,
            })
        );
    }

    #[test]
    fn rejects_zero_padded_index() {
        for pairs in [
            vec![("LAMBDA_01_FUNCTION", "orders")],
            vec![("LAMBDA_01_FUNCTION", "orders"), ("LAMBDA_1_FUNCTION", "billing")],
        ] {
            let error = resolve_targets(env(&pairs)).expect_err("padded index should fail");
            assert_eq!(
                error,
                ConfigurationError::InvalidIndex {
                    key: "LAMBDA_01_FUNCTION".to_string(),
                }
            );
        }
    }

    #[test]
    fn accepts_index_zero() {
        let targets = resolve_targets(env(&[("LAMBDA_0_FUNCTION", "orders")]))
            .expect("index zero should resolve");
        assert_eq!(targets[0].name, "orders");
    }

    #[test]
    fn rejects_index_out_of_range() {
        let error = resolve_targets(env(&[("LAMBDA_99999999999_FUNCTION", "orders")]))
            .expect_err("oversized index should fail");

        assert!(matches!(error, ConfigurationError::InvalidIndex { .. }));
    }

    #[test]
    fn rejects_blank_function_name() {
        let error = resolve_targets(env(&[("LAMBDA_4_FUNCTION", "  ")]))
            .expect_err("blank function should fail");

        assert_eq!(error, ConfigurationError::EmptyFunctionName { index: 4 });
    }

    #[test]
    fn ignores_keys_that_only_contain_the_pattern() {
        let targets = resolve_targets(env(&[
            ("MY_LAMBDA_1_FUNCTION", "orders"),
            ("LAMBDA_1_FUNCTION_NAME", "orders"),
        ]))
        .expect("targets should resolve");

        assert!(targets.is_empty());
    }
}
