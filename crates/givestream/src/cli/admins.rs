//! the `admins` subcommand - manage admin accounts

use std::path::PathBuf;

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use givestream_db::{GivestreamDb, Store};
use givestream_types::{AdminId, Email, NewAdmin, Role};

use super::serve::{load_config_file, parse_database_url};
use crate::password;

/// database connection arguments shared by the admin subcommands.
#[derive(Args, Debug)]
pub struct DbArgs {
    /// path to config file (toml format)
    #[arg(short, long, env = "GIVESTREAM_CONFIG")]
    config: Option<PathBuf>,

    /// database url (sqlite:// or postgres://)
    #[arg(long, env = "GIVESTREAM_DATABASE_URL")]
    database_url: Option<String>,
}

impl DbArgs {
    /// open the database named by the cli flags or config file.
    async fn connect(self) -> Result<GivestreamDb> {
        let mut config = load_config_file(self.config.as_ref())?.unwrap_or_default();
        if let Some(db_url) = self.database_url {
            let write_ahead_log = config.database.write_ahead_log;
            config.database = parse_database_url(&db_url)?;
            config.database.write_ahead_log = write_ahead_log;
        }

        GivestreamDb::new(&config)
            .await
            .context("failed to open database")
    }
}

/// manage admin accounts
#[derive(Subcommand, Debug)]
pub enum AdminsCommand {
    /// create a new admin account
    Create(CreateArgs),

    /// list all admin accounts
    List(ListArgs),

    /// delete an admin account
    Delete(DeleteArgs),

    /// reset an admin account password
    ResetPassword(ResetPasswordArgs),
}

/// create a new admin account
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    db: DbArgs,

    /// login email address
    email: String,

    /// display name
    name: String,

    /// password (prefer the env var over the flag to keep it out of shell history)
    #[arg(long, env = "GIVESTREAM_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

/// list admin accounts
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    db: DbArgs,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

/// delete an admin account
#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    db: DbArgs,

    /// admin id to delete
    admin_id: u64,
}

/// reset an admin account password
#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    #[command(flatten)]
    db: DbArgs,

    /// admin id to update
    admin_id: u64,

    /// new password
    #[arg(long, env = "GIVESTREAM_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

impl AdminsCommand {
    /// run the admins command
    pub async fn run(self) -> Result<()> {
        match self {
            AdminsCommand::Create(args) => create_admin(args).await,
            AdminsCommand::List(args) => list_admins(args).await,
            AdminsCommand::Delete(args) => delete_admin(args).await,
            AdminsCommand::ResetPassword(args) => reset_password(args).await,
        }
    }
}

async fn create_admin(args: CreateArgs) -> Result<()> {
    let email = Email::new(&args.email).context("invalid email")?;

    let db = args.db.connect().await?;

    if db
        .admin_by_email(email.as_str())
        .await
        .context("failed to check for existing admin")?
        .is_some()
    {
        bail!("an admin with email {} already exists", email);
    }

    let password_hash =
        password::hash(&args.password).map_err(|e| eyre!("failed to hash password: {}", e))?;

    let created = db
        .create_admin(&NewAdmin {
            name: args.name,
            email,
            password_hash,
            role: Role::Admin,
        })
        .await
        .context("failed to create admin")?;

    println!("Created admin account:");
    println!("  ID:    {}", created.id.0);
    println!("  Name:  {}", created.name);
    println!("  Email: {}", created.email);

    Ok(())
}

async fn list_admins(args: ListArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let admins = db.list_admins().await.context("failed to list admins")?;

    if args.output == "json" {
        // password hashes are not serialized
        println!("{}", serde_json::to_string_pretty(&admins)?);
        return Ok(());
    }

    if admins.is_empty() {
        println!("No admin accounts found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<24} {:<32} {:<8} {}",
        "ID", "NAME", "EMAIL", "ROLE", "CREATED"
    );
    println!("{}", "-".repeat(90));

    for admin in admins {
        println!(
            "{:<6} {:<24} {:<32} {:<8} {}",
            admin.id.0,
            admin.name,
            admin.email,
            admin.role.as_str(),
            admin.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }

    Ok(())
}

async fn delete_admin(args: DeleteArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let deleted = db
        .delete_admin(AdminId(args.admin_id))
        .await
        .context("failed to delete admin")?;

    if !deleted {
        bail!("no admin with id {}", args.admin_id);
    }

    println!("Deleted admin {}", args.admin_id);

    Ok(())
}

async fn reset_password(args: ResetPasswordArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let password_hash =
        password::hash(&args.password).map_err(|e| eyre!("failed to hash password: {}", e))?;

    let updated = db
        .set_admin_password_hash(AdminId(args.admin_id), &password_hash)
        .await
        .context("failed to update password")?;

    if !updated {
        bail!("no admin with id {}", args.admin_id);
    }

    println!("Password updated for admin {}", args.admin_id);

    Ok(())
}
