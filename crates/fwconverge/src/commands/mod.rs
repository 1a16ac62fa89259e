//! Command handlers and the shared session context.

pub mod apply;
pub mod login;
pub mod plan;
pub mod rule;

use std::collections::BTreeMap;
use std::path::PathBuf;

use fwconverge_api::PolicyClient;
use fwconverge_config::{Config, Profile, RuleFile, RuleRecord, StateFile};
use fwconverge_core::{Controller, InternetFirewall, RuleFamily, WanFirewall};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Session context ─────────────────────────────────────────────────

/// Config, active profile (with flag overrides) and state location.
pub struct Context {
    pub config: Config,
    pub profile_name: String,
    pub profile: Profile,
    pub state_path: PathBuf,
    api_key_flag: Option<String>,
}

impl Context {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = match &global.config {
            Some(path) => fwconverge_config::load_config_from(path)?,
            None => fwconverge_config::load_config()?,
        };
        let profile_name = global
            .profile
            .clone()
            .or_else(|| config.default_profile.clone())
            .unwrap_or_else(|| "default".into());

        let mut profile = config.profiles.get(&profile_name).cloned().unwrap_or_default();
        if let Some(ref endpoint) = global.endpoint {
            profile.endpoint.clone_from(endpoint);
        }
        if let Some(ref account) = global.account {
            profile.account_id.clone_from(account);
        }
        if global.insecure {
            profile.insecure = Some(true);
        }
        if global.timeout.is_some() {
            profile.timeout = global.timeout;
        }

        let state_path = global
            .state
            .clone()
            .or_else(|| profile.state_file.clone())
            .unwrap_or_else(|| fwconverge_config::state_path(&profile_name));
        debug!(profile = %profile_name, state = %state_path.display(), "session resolved");

        Ok(Self {
            config,
            profile_name,
            profile,
            state_path,
            api_key_flag: global.api_key.clone(),
        })
    }

    pub fn load_state(&self) -> Result<StateFile, CliError> {
        Ok(StateFile::load(&self.state_path)?)
    }

    pub fn save_state(&self, state: &StateFile) -> Result<(), CliError> {
        Ok(state.save(&self.state_path)?)
    }

    fn client(&self) -> Result<PolicyClient, CliError> {
        for (field, value) in [
            ("endpoint", &self.profile.endpoint),
            ("account_id", &self.profile.account_id),
        ] {
            if value.trim().is_empty() {
                return Err(CliError::Validation {
                    field: field.into(),
                    reason: format!(
                        "profile '{}' has no {field}; add it to {} or pass it as a flag",
                        self.profile_name,
                        fwconverge_config::config_path().display()
                    ),
                });
            }
        }
        self.profile.endpoint_url()?;
        let key = fwconverge_config::resolve_api_key(
            &self.profile,
            &self.profile_name,
            self.api_key_flag.as_deref(),
        )?;
        let transport = self.profile.transport(&self.config.defaults);
        PolicyClient::from_api_key(
            &self.profile.endpoint,
            self.profile.account_id.clone(),
            &key,
            &transport,
        )
        .map_err(|source| CliError::Api { source })
    }

    /// A controller that stops before its next remote call on Ctrl-C.
    pub fn controller(&self) -> Result<Controller<PolicyClient>, CliError> {
        let client = self.client()?;
        Ok(Controller::new(client, self.config.engine.clone()).with_cancellation(cancel_on_interrupt()))
    }

    pub fn core_error(&self, err: fwconverge_core::CoreError) -> CliError {
        CliError::from_core(err, &self.profile_name)
    }
}

fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping before the next remote call");
            child.cancel();
        }
    });
    token
}

// ── Family plumbing ─────────────────────────────────────────────────

/// Where a family's rules live in the rule file and the state file.
pub trait Tracked: RuleFamily {
    const KEY: &'static str;

    fn declared(file: &RuleFile) -> &[Self::Declared];
    fn records(state: &StateFile) -> &BTreeMap<String, RuleRecord<Self::Declared>>;
    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RuleRecord<Self::Declared>>;
}

impl Tracked for WanFirewall {
    const KEY: &'static str = "wan";

    fn declared(file: &RuleFile) -> &[Self::Declared] {
        &file.wan_rules
    }

    fn records(state: &StateFile) -> &BTreeMap<String, RuleRecord<Self::Declared>> {
        &state.wan
    }

    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RuleRecord<Self::Declared>> {
        &mut state.wan
    }
}

impl Tracked for InternetFirewall {
    const KEY: &'static str = "internet";

    fn declared(file: &RuleFile) -> &[Self::Declared] {
        &file.internet_rules
    }

    fn records(state: &StateFile) -> &BTreeMap<String, RuleRecord<Self::Declared>> {
        &state.internet
    }

    fn records_mut(state: &mut StateFile) -> &mut BTreeMap<String, RuleRecord<Self::Declared>> {
        &mut state.internet
    }
}
