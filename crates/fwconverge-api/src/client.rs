// Async GraphQL-over-HTTP client for the remote firewall policy API.
//
// One endpoint, one POST per operation.
// Auth: x-api-key header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::Error;
use crate::family::PolicyFamily;
use crate::queries;
use crate::types::{
    AddRuleInput, MoveRuleInput, MutationStatus, PolicyDocument, PublishInput, RemoveRuleInput,
    RuleMutationPayload, UpdateRuleInput,
};

// ── GraphQL envelope ─────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(serde::Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the firewall policy endpoint.
///
/// Every operation is scoped to a single account. The client is generic
/// over the firewall family at the method level, so one instance serves
/// both the WAN and Internet policies.
pub struct PolicyClient {
    http: reqwest::Client,
    endpoint: Url,
    account_id: String,
}

impl PolicyClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `x-api-key` as a default header on every request.
    pub fn from_api_key(
        endpoint: &str,
        account_id: impl Into<String>,
        api_key: &secrecy::SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("x-api-key", key_value);

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(endpoint, account_id, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        endpoint: &str,
        account_id: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self {
            http,
            endpoint,
            account_id: account_id.into(),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Execution ────────────────────────────────────────────────────

    /// POST one GraphQL document and deserialize the value found at `path`
    /// under `data`.
    async fn execute<T, I>(
        &self,
        operation: &str,
        document: &str,
        input: Option<&I>,
        path: &[&str],
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        I: Serialize + Sync,
    {
        let mut variables = json!({ "accountId": self.account_id });
        if let Some(input) = input {
            let input = serde_json::to_value(input).map_err(|e| Error::Deserialization {
                message: format!("failed to encode input for {operation}: {e}"),
                body: String::new(),
            })?;
            variables["input"] = input;
        }
        let body = json!({
            "operationName": operation,
            "query": document,
            "variables": variables,
        });

        debug!(operation, endpoint = %self.endpoint, "POST graphql");
        let resp = self.http.post(self.endpoint.clone()).json(&body).send().await?;
        let envelope = handle_response(resp).await?;

        if !envelope.errors.is_empty() {
            return Err(Error::GraphQl {
                messages: envelope.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        let mut node = envelope.data.unwrap_or(Value::Null);
        for segment in path {
            node = match node {
                Value::Object(mut map) => map.remove(*segment).unwrap_or(Value::Null),
                _ => Value::Null,
            };
        }
        if node.is_null() {
            return Err(Error::MissingData {
                path: path.join("."),
            });
        }

        serde_json::from_value(node.clone()).map_err(|e| Error::Deserialization {
            message: format!("{e} (at {})", path.join(".")),
            body: node.to_string(),
        })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Policy ───────────────────────────────────────────────────────

    /// Fetch the full policy document of one family.
    pub async fn policy<F: PolicyFamily>(&self) -> Result<PolicyDocument<F::Rule>, Error> {
        let document = queries::policy_query(F::FIELD, F::RULE_SELECTION);
        self.execute::<_, ()>("policy", &document, None, &["policy", F::FIELD, "policy"])
            .await
    }

    // ── Rules ────────────────────────────────────────────────────────

    pub async fn add_rule<F: PolicyFamily>(
        &self,
        input: &AddRuleInput<F::RuleInput>,
    ) -> Result<RuleMutationPayload<F::Rule>, Error> {
        self.rule_mutation::<F, _>("addRule", &format!("{}AddRuleInput", F::TYPE_PREFIX), input)
            .await
    }

    pub async fn update_rule<F: PolicyFamily>(
        &self,
        input: &UpdateRuleInput<F::RuleUpdateInput>,
    ) -> Result<RuleMutationPayload<F::Rule>, Error> {
        self.rule_mutation::<F, _>(
            "updateRule",
            &format!("{}UpdateRuleInput", F::TYPE_PREFIX),
            input,
        )
        .await
    }

    pub async fn move_rule<F: PolicyFamily>(
        &self,
        input: &MoveRuleInput,
    ) -> Result<RuleMutationPayload<F::Rule>, Error> {
        self.rule_mutation::<F, _>("moveRule", "PolicyMoveRuleInput", input)
            .await
    }

    pub async fn remove_rule<F: PolicyFamily>(
        &self,
        input: &RemoveRuleInput,
    ) -> Result<MutationStatus, Error> {
        let input_type = format!("{}RemoveRuleInput", F::TYPE_PREFIX);
        let document = queries::status_mutation("removeRule", F::FIELD, &input_type);
        self.execute("removeRule", &document, Some(input), &["policy", F::FIELD, "removeRule"])
            .await
    }

    // ── Publish ──────────────────────────────────────────────────────

    /// Commit every pending mutation of the family's policy.
    pub async fn publish<F: PolicyFamily>(
        &self,
        input: &PublishInput,
    ) -> Result<MutationStatus, Error> {
        let document =
            queries::status_mutation("publishPolicyRevision", F::FIELD, "PolicyPublishInput");
        self.execute(
            "publishPolicyRevision",
            &document,
            Some(input),
            &["policy", F::FIELD, "publishPolicyRevision"],
        )
        .await
    }

    async fn rule_mutation<F: PolicyFamily, I: Serialize + Sync>(
        &self,
        operation: &str,
        input_type: &str,
        input: &I,
    ) -> Result<RuleMutationPayload<F::Rule>, Error> {
        let document = queries::rule_mutation(operation, F::FIELD, input_type, F::RULE_SELECTION);
        self.execute(operation, &document, Some(input), &["policy", F::FIELD, operation])
            .await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(resp: reqwest::Response) -> Result<GraphQlResponse, Error> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::InvalidApiKey);
    }

    let body = resp.text().await?;
    let parsed = serde_json::from_str::<GraphQlResponse>(&body);

    if !status.is_success() {
        // GraphQL servers may pair a 4xx/5xx with a proper error envelope.
        if let Some(envelope) = parsed.ok().filter(|e| !e.errors.is_empty()) {
            return Ok(envelope);
        }
        return Err(Error::Http {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        });
    }

    parsed.map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
