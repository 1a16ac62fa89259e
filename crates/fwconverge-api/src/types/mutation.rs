// ── Mutation payloads ──
//
// Every policy mutation answers with a status plus an error-code list,
// even when the HTTP exchange itself succeeded.

use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "SUCCESS";

/// One entry of a mutation's structured error list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationError {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Status block shared by remove and publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationStatus {
    pub status: String,
    pub errors: Vec<MutationError>,
}

impl MutationStatus {
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            errors: Vec::new(),
        }
    }

    /// A mutation succeeded only if it said so and reported no errors.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS && self.errors.is_empty()
    }
}

/// Payload of add / update / move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMutationPayload<R> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub errors: Vec<MutationError>,
    pub rule: Option<RuleEnvelope<R>>,
}

impl<R> RuleMutationPayload<R> {
    pub fn success(rule: R) -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            errors: Vec::new(),
            rule: Some(RuleEnvelope { rule }),
        }
    }

    pub fn failure(errors: Vec<MutationError>) -> Self {
        Self {
            status: "FAILURE".into(),
            errors,
            rule: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS && self.errors.is_empty()
    }

    /// Split into the status block and the returned rule.
    pub fn into_parts(self) -> (MutationStatus, Option<R>) {
        (
            MutationStatus {
                status: self.status,
                errors: self.errors,
            },
            self.rule.map(|envelope| envelope.rule),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEnvelope<R> {
    pub rule: R,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn failure_with_errors_is_not_success() {
        let raw = serde_json::json!({
            "status": "FAILURE",
            "errors": [
                { "errorCode": "E1", "errorMessage": "bad host" },
                { "errorCode": "E2", "errorMessage": "bad site" }
            ],
            "rule": null
        });
        let payload: RuleMutationPayload<serde_json::Value> = serde_json::from_value(raw).unwrap();
        assert!(!payload.is_success());
        let (status, rule) = payload.into_parts();
        assert_eq!(status.errors.len(), 2);
        assert!(rule.is_none());
    }

    #[test]
    fn success_status_with_errors_is_not_success() {
        let status = MutationStatus {
            status: STATUS_SUCCESS.into(),
            errors: vec![MutationError::default()],
        };
        assert!(!status.is_success());
        assert!(MutationStatus::success().is_success());
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn rule_without_default_decodes_with_or_without_envelope() {
        let missing: RuleMutationPayload<Named> =
            serde_json::from_value(serde_json::json!({ "status": "FAILURE" })).unwrap();
        assert!(missing.rule.is_none());

        let raw = serde_json::json!({
            "status": "SUCCESS",
            "errors": [],
            "rule": { "rule": { "name": "allow-dns" } }
        });
        let payload: RuleMutationPayload<Named> = serde_json::from_value(raw).unwrap();
        assert!(payload.is_success());
        let (_, rule) = payload.into_parts();
        assert_eq!(rule.unwrap().name, "allow-dns");
    }
}
