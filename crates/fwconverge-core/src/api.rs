// ── Remote seam ──
//
// The controller talks to the policy endpoint through `PolicyApi` so it
// can be driven by the real client or by an in-memory double.

use std::future::Future;

use fwconverge_api::types::{
    AddRuleInput, MoveRuleInput, MutationStatus, PolicyDocument, PublishInput, RemoveRuleInput,
    RuleMutationPayload, UpdateRuleInput,
};
use fwconverge_api::{Error, PolicyClient, PolicyFamily};

pub trait PolicyApi: Send + Sync {
    fn policy<F: PolicyFamily>(
        &self,
    ) -> impl Future<Output = Result<PolicyDocument<F::Rule>, Error>> + Send;

    fn add_rule<F: PolicyFamily>(
        &self,
        input: &AddRuleInput<F::RuleInput>,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send;

    fn update_rule<F: PolicyFamily>(
        &self,
        input: &UpdateRuleInput<F::RuleUpdateInput>,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send;

    fn move_rule<F: PolicyFamily>(
        &self,
        input: &MoveRuleInput,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send;

    fn remove_rule<F: PolicyFamily>(
        &self,
        input: &RemoveRuleInput,
    ) -> impl Future<Output = Result<MutationStatus, Error>> + Send;

    fn publish<F: PolicyFamily>(
        &self,
        input: &PublishInput,
    ) -> impl Future<Output = Result<MutationStatus, Error>> + Send;
}

impl PolicyApi for PolicyClient {
    fn policy<F: PolicyFamily>(
        &self,
    ) -> impl Future<Output = Result<PolicyDocument<F::Rule>, Error>> + Send {
        PolicyClient::policy::<F>(self)
    }

    fn add_rule<F: PolicyFamily>(
        &self,
        input: &AddRuleInput<F::RuleInput>,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send {
        PolicyClient::add_rule::<F>(self, input)
    }

    fn update_rule<F: PolicyFamily>(
        &self,
        input: &UpdateRuleInput<F::RuleUpdateInput>,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send {
        PolicyClient::update_rule::<F>(self, input)
    }

    fn move_rule<F: PolicyFamily>(
        &self,
        input: &MoveRuleInput,
    ) -> impl Future<Output = Result<RuleMutationPayload<F::Rule>, Error>> + Send {
        PolicyClient::move_rule::<F>(self, input)
    }

    fn remove_rule<F: PolicyFamily>(
        &self,
        input: &RemoveRuleInput,
    ) -> impl Future<Output = Result<MutationStatus, Error>> + Send {
        PolicyClient::remove_rule::<F>(self, input)
    }

    fn publish<F: PolicyFamily>(
        &self,
        input: &PublishInput,
    ) -> impl Future<Output = Result<MutationStatus, Error>> + Send {
        PolicyClient::publish::<F>(self, input)
    }
}
