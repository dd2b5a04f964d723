//! Credential management commands.
//!
//! Provides `tenantvault secrets set|get|list|delete` for operating on the
//! encrypted store directly, e.g. when provisioning a tenant.

use std::path::Path;

use clap::Args;
use tenantvault_secrets::CredentialStore;

use super::{load_config, open_store};

/// Secrets command arguments.
#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

/// Tenant and optional user a command operates on.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    /// Tenant id
    pub tenant: String,

    /// User id (omit for tenant-shared credentials)
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Store a credential (prompts for value)
    Set {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Credential id
        credential_id: String,

        /// Secret value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Retrieve and print a decrypted credential
    Get {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Credential id
        credential_id: String,
    },

    /// List credential ids in a scope
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Only ids starting with this literal prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Also print decrypted values
        #[arg(long)]
        values: bool,
    },

    /// Delete one or more credentials
    Delete {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Credential ids
        #[arg(required = true)]
        credential_ids: Vec<String>,
    },
}

/// Run the secrets command.
pub async fn run(args: SecretsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config).await?;

    match args.command {
        SecretsCommand::Set {
            scope,
            credential_id,
            value,
        } => {
            let secret_value = match value {
                Some(v) => v,
                None => {
                    let prompt = format!("Enter value for '{credential_id}': ");
                    rpassword::prompt_password(prompt)
                        .map_err(|e| anyhow::anyhow!("Failed to read secret: {}", e))?
                }
            };

            if secret_value.is_empty() {
                anyhow::bail!("Secret value must not be empty");
            }

            store
                .set_credential(
                    &scope.tenant,
                    scope.user.as_deref(),
                    &credential_id,
                    &secret_value,
                )
                .await?;

            println!("Credential '{}' stored for {}.", credential_id, describe(&scope));
        }

        SecretsCommand::Get {
            scope,
            credential_id,
        } => {
            let secret = store
                .get_credential(&scope.tenant, scope.user.as_deref(), &credential_id)
                .await?;

            match secret {
                Some(secret) => println!("{}", secret.expose()),
                None => anyhow::bail!(
                    "Credential '{}' not found for {}",
                    credential_id,
                    describe(&scope)
                ),
            }
        }

        SecretsCommand::List {
            scope,
            prefix,
            values,
        } => {
            let rows: Vec<(String, Option<String>)> = if values {
                store
                    .list_credentials_with_values(
                        &scope.tenant,
                        scope.user.as_deref(),
                        prefix.as_deref(),
                    )
                    .await?
                    .into_iter()
                    .map(|(id, value)| (id, Some(value.expose().to_string())))
                    .collect()
            } else {
                store
                    .list_credential_ids(&scope.tenant, scope.user.as_deref(), prefix.as_deref())
                    .await?
                    .into_iter()
                    .map(|id| (id, None))
                    .collect()
            };

            if rows.is_empty() {
                println!("No credentials stored for {}.", describe(&scope));
            } else {
                print!("{}", render_table(&rows));
                println!("\n{} credential(s) total.", rows.len());
            }
        }

        SecretsCommand::Delete {
            scope,
            credential_ids,
        } => {
            if let [credential_id] = credential_ids.as_slice() {
                store
                    .delete_credential(&scope.tenant, scope.user.as_deref(), credential_id)
                    .await?;
            } else {
                let ids: Vec<&str> = credential_ids.iter().map(String::as_str).collect();
                store
                    .delete_credentials(&scope.tenant, scope.user.as_deref(), &ids)
                    .await?;
            }

            println!(
                "Deleted {} credential id(s) for {}.",
                credential_ids.len(),
                describe(&scope)
            );
        }
    }

    Ok(())
}

fn describe(scope: &ScopeArgs) -> String {
    match &scope.user {
        Some(user) => format!("tenant '{}' user '{}'", scope.tenant, user),
        None => format!("tenant '{}' (shared)", scope.tenant),
    }
}

fn render_table(rows: &[(String, Option<String>)]) -> String {
    let width = rows
        .iter()
        .map(|(id, _)| id.chars().count())
        .max()
        .unwrap_or(0)
        .max("CREDENTIAL".len());
    let with_values = rows.iter().any(|(_, v)| v.is_some());

    let mut out = String::new();
    if with_values {
        out.push_str(&format!("{:<width$}  {}\n", "CREDENTIAL", "VALUE"));
        out.push_str(&format!("{}\n", "-".repeat(width + 2 + 5)));
    } else {
        out.push_str("CREDENTIAL\n");
        out.push_str(&format!("{}\n", "-".repeat(width)));
    }
    for (id, value) in rows {
        match value {
            Some(value) => out.push_str(&format!("{:<width$}  {}\n", id, value)),
            None => out.push_str(&format!("{}\n", id)),
        }
    }
    out
}
