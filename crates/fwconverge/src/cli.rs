//! Clap derive structures for the `fwconverge` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fwconverge -- declarative WAN and Internet firewall rules
#[derive(Debug, Parser)]
#[command(
    name = "fwconverge",
    version,
    about = "Converge declared firewall rules against a remote policy API",
    long_about = "Reads WAN and Internet firewall rules from a TOML or YAML file,\n\
        compares them with the remote policy, and creates, moves, updates\n\
        and publishes until the remote matches the declaration.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Endpoint profile to use
    #[arg(long, short = 'p', env = "FWCONVERGE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "FWCONVERGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Policy API endpoint URL (overrides profile)
    #[arg(long, short = 'e', global = true)]
    pub endpoint: Option<String>,

    /// Account ID (overrides profile)
    #[arg(long, short = 'a', global = true)]
    pub account: Option<String>,

    /// API key (prefer FWCONVERGE_API_KEY or the keyring)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// State file mapping rule names to remote IDs
    #[arg(long, env = "FWCONVERGE_STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept any TLS certificate
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    /// WAN firewall
    Wan,
    /// Internet firewall
    Internet,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Converge the remote policy to the rule file
    Apply(ApplyArgs),

    /// Read one tracked rule back from the remote
    Show(RuleArgs),

    /// Remove one tracked rule from the remote
    #[command(alias = "rm")]
    Delete(RuleArgs),

    /// Store the API key for the active profile in the OS keyring
    Login,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Rule file (.toml, .yaml or .yml)
    #[arg(long, short = 'r')]
    pub rules: PathBuf,

    /// Validate and plan without contacting the remote
    #[arg(long)]
    pub offline: bool,

    /// Show tracked rules missing from the rule file as deletions
    #[arg(long)]
    pub prune: bool,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Rule file (.toml, .yaml or .yml)
    #[arg(long, short = 'r')]
    pub rules: PathBuf,

    /// Delete tracked rules that are no longer in the rule file
    #[arg(long)]
    pub prune: bool,
}

#[derive(Debug, Args)]
pub struct RuleArgs {
    /// Firewall family
    #[arg(value_enum)]
    pub family: Family,

    /// Rule name as declared in the rule file
    pub name: String,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
