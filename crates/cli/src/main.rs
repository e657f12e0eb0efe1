use anyhow::Context;
use clap::{Parser, Subcommand};
use sns_core::otp::OtpService;
use sns_core::repositories::users::UserService;
use sns_core::{db, seed, Settings};
use sns_types::DeliveryMethod;

#[derive(Parser)]
#[command(name = "sns")]
#[command(about = "SkillnScale backend administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all accounts
    Users,
    /// Drop every table and re-run migrations
    ResetDb {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
    /// Insert categories, demo professionals and a demo customer
    Seed,
    /// Issue a one-time login code for a phone number
    SendOtp {
        /// Phone number the code is bound to
        phone: String,
        /// Deliver over WhatsApp instead of SMS
        #[arg(long)]
        whatsapp: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sns_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'sns --help' for commands");
        return Ok(());
    };

    let settings = Settings::from_env().context("invalid configuration")?;
    let pool = db::connect(&settings)
        .await
        .context("failed to connect to the database")?;

    match command {
        Commands::Users => {
            let users = UserService::new(pool.clone()).list().await?;
            if users.is_empty() {
                println!("No users found.");
            }
            for user in users {
                println!(
                    "ID: {}, Phone: {}, Email: {}, Role: {}, Active: {}",
                    user.id,
                    user.phone,
                    user.email.as_deref().unwrap_or("-"),
                    user.role,
                    user.is_active
                );
            }
        }
        Commands::ResetDb { yes } => {
            if !yes {
                anyhow::bail!("reset-db deletes all data; re-run with --yes to confirm");
            }
            db::reset(&pool).await?;
            println!("Database reset.");
        }
        Commands::Seed => {
            db::run_migrations(&pool).await?;
            let report = seed::seed(&pool).await?;
            println!(
                "Seeded {} categories, {} users, {} availability slots.",
                report.categories, report.users, report.slots
            );
        }
        Commands::SendOtp { phone, whatsapp } => {
            let method = if whatsapp {
                DeliveryMethod::Whatsapp
            } else {
                DeliveryMethod::Sms
            };
            let code = OtpService::new(pool.clone()).send(phone.trim(), method).await?;
            println!("OTP for {}: {} (via {})", phone.trim(), code, method);
        }
    }

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_send_otp_with_whatsapp() {
        let cli = Cli::try_parse_from(["sns", "send-otp", "9876543210", "--whatsapp"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::SendOtp { ref phone, whatsapp: true }) if phone == "9876543210"
        ));
    }

    #[test]
    fn reset_requires_no_arguments() {
        let cli = Cli::try_parse_from(["sns", "reset-db"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ResetDb { yes: false })));
    }
}
