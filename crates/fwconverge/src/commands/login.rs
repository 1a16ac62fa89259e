//! `fwconverge login`: keep the API key out of the config file.

use std::io::{self, BufRead, IsTerminal};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::Context;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Context::load(global)?;

    let key = match global.api_key.clone() {
        Some(key) => key,
        None => {
            if io::stdin().is_terminal() {
                eprintln!("Paste the API key for profile '{}' and press Enter:", ctx.profile_name);
            }
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "no key given on --api-key or stdin".into(),
        });
    }

    fwconverge_config::store_api_key(&ctx.profile_name, key)?;
    if !global.quiet {
        eprintln!("API key for profile '{}' stored in the system keyring", ctx.profile_name);
    }
    Ok(())
}
