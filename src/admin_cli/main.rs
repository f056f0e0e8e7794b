use clap::{Parser, Subcommand};
use heartline::{
    database::{self, create_schema, models::user, ping},
    routes::{
        accounts::functions::{delete_account, find_by_email},
        payments::functions::credit_wallet,
    },
};
use sea_orm::{EntityTrait, QueryOrder};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Maintenance commands for the dating site database.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Database housekeeping.
    Db {
        #[command(subcommand)]
        db_command: DbCommand,
    },
    /// Member accounts.
    Users {
        #[command(subcommand)]
        users_command: UsersCommand,
    },
    /// Message credits.
    Wallet {
        #[command(subcommand)]
        wallet_command: WalletCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Creates any missing tables.
    Init,
    /// Checks that the database answers.
    Ping,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// Prints every account as JSON, newest first.
    List,
    /// Removes an account together with everything it owns.
    Delete {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Adds message credits to an account, e.g. after a refund.
    Credit {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        messages: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let cli = Cli::parse();
    let db = database::connect().await?;

    match cli.command {
        Commands::Db { db_command } => match db_command {
            DbCommand::Init => {
                create_schema(&db).await?;
                println!("Schema is up to date.");
            }
            DbCommand::Ping => {
                ping(&db).await?;
                println!("Database is reachable.");
            }
        },
        Commands::Users { users_command } => match users_command {
            UsersCommand::List => {
                let users = user::Entity::find()
                    .order_by_desc(user::Column::Date)
                    .all(&db)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&users)?);
            }
            UsersCommand::Delete { email } => {
                let account = find_by_email(&db, &email)
                    .await?
                    .ok_or_else(|| format!("No account with email {}", email))?;
                delete_account(&db, account.id).await?;
                println!("Deleted account {} ({}).", account.id, account.email);
            }
        },
        Commands::Wallet { wallet_command } => match wallet_command {
            WalletCommand::Credit { email, messages } => {
                if messages <= 0 {
                    return Err("--messages must be positive".into());
                }
                let account = find_by_email(&db, &email)
                    .await?
                    .ok_or_else(|| format!("No account with email {}", email))?;
                let balance = credit_wallet(&db, account.id, messages).await?;
                println!("{} now has {} messages.", account.email, balance);
            }
        },
    }

    Ok(())
}
