use clap::Subcommand;
use timenest_core::credentials::{self, KeyringTokenProvider, TokenProvider, TOKEN_ENV};

use super::CliResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the task store API token in the OS keyring
    Login {
        #[arg(long)]
        token: String,
    },
    /// Remove the stored token
    Logout,
    /// Check whether a token is available
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::Login { token } => {
            if token.trim().is_empty() {
                return Err("--token must not be empty".into());
            }
            credentials::store_token(&token)?;
            println!("task store token saved");
        }
        AuthAction::Logout => {
            credentials::clear_token()?;
            println!("task store token removed");
            if std::env::var_os(TOKEN_ENV).is_some() {
                eprintln!("note: {TOKEN_ENV} is still set in this shell");
            }
        }
        AuthAction::Status => {
            let signed_in = KeyringTokenProvider.token()?.is_some();
            println!(
                "{}",
                if signed_in {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}
