//! Process-lifetime identity answered by warmed functions.
//!
//! A Lambda execution environment keeps its process alive between
//! invocations, so an identity generated on first use distinguishes one
//! environment from another for as long as it stays warm.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::SpinResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceIdentity {
    pub id: String,
    pub born: DateTime<Utc>,
}

static IDENTITY: OnceLock<InstanceIdentity> = OnceLock::new();

/// Returns the identity of this process, creating it on first access.
pub fn instance_identity() -> &'static InstanceIdentity {
    IDENTITY.get_or_init(|| InstanceIdentity {
        id: Uuid::new_v4().to_string(),
        born: Utc::now(),
    })
}

pub fn spin_result(version: &str) -> SpinResult {
    let identity = instance_identity();
    SpinResult {
        ok: true,
        version: version.to_string(),
        id: identity.id.clone(),
        born: identity.born,
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn identity_is_stable_across_calls() {
        let first = spin_result("v1");
        let second = spin_result("v2");

        assert!(first.ok);
        assert_eq!(first.id, second.id);
        assert_eq!(first.born, second.born);
        assert_eq!(second.version, "v2");
    }

    #[test]
    fn concurrent_first_access_yields_one_identity() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| instance_identity().id.clone()))
            .collect();
        let ids: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().expect("identity thread should not panic"))
            .collect();

        assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn spin_result_round_trips_as_json() {
        let spin = spin_result("v1");
        let body = serde_json::to_string(&spin).expect("spin result should serialize");
        let parsed: SpinResult = serde_json::from_str(&body).expect("spin result should parse");
        assert_eq!(parsed, spin);
    }
}
