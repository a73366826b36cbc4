//! Library Console - command-line front-end
//!
//! Usage: `library-console [dashboard | whoami | permissions | login <token> | logout]`

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_console::{
    config::{AppConfig, LoggingConfig},
    guard::GuardDecision,
    models::group_by_category,
    views::{DashboardSummary, RbacSnapshot},
    ClientError, Console,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Login(String),
    Logout,
    Dashboard,
    Whoami,
    Permissions,
}

impl Command {
    /// Parse the arguments after the program name. No command means `dashboard`.
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let name = args.first().map(String::as_str).unwrap_or("dashboard");
        match name {
            "login" => match args.get(1) {
                Some(token) => Ok(Command::Login(token.clone())),
                None => bail!("usage: library-console login <token>"),
            },
            "logout" => Ok(Command::Logout),
            "dashboard" => Ok(Command::Dashboard),
            "whoami" => Ok(Command::Whoami),
            "permissions" => Ok(Command::Permissions),
            other => bail!("unknown command: {}", other),
        }
    }

    /// Location checked by the route guard, `None` for session commands
    fn guarded_location(&self) -> Option<&'static str> {
        match self {
            Command::Login(_) | Command::Logout => None,
            Command::Dashboard => Some("/dashboard"),
            Command::Whoami => Some("/whoami"),
            Command::Permissions => Some("/permissions"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::debug!("Starting Library Console v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let console = Console::from_config(config).context("Failed to initialise console")?;

    if let Some(location) = command.guarded_location() {
        if let GuardDecision::Redirect { to, reason, .. } = console.guard.check(location) {
            bail!("{}: please login again (see {})", reason, to);
        }
    }

    let result = match command {
        Command::Login(token) => {
            console.session.login(&token)?;
            println!("Session stored.");
            return Ok(());
        }
        Command::Logout => {
            console.session.logout()?;
            println!("Logged out.");
            return Ok(());
        }
        Command::Dashboard => dashboard(&console).await,
        Command::Whoami => whoami(&console).await,
        Command::Permissions => permissions(&console).await,
    };

    if let Err(e) = &result {
        if console.handle_unauthorized(e) {
            bail!("{}", e);
        }
    }
    Ok(result?)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_console={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn dashboard(console: &Console) -> Result<(), ClientError> {
    let summary = DashboardSummary::load(&console.api).await?;

    println!("Titles:      {}", summary.total_titles);
    println!("Copies:      {} ({} available)", summary.total_copies, summary.available_copies);
    println!("Categories:  {}", summary.categories);
    println!(
        "Borrowings:  {} active, {} overdue, {} returned",
        summary.active_borrowings, summary.overdue_borrowings, summary.returned_borrowings
    );
    Ok(())
}

async fn whoami(console: &Console) -> Result<(), ClientError> {
    let me = console.api.roles.current_user().await?;
    let roles: Vec<String> = me.roles.iter().map(|r| r.label()).collect();

    println!("{} <{}>", me.display_name(), me.email);
    println!("Roles: {}", if roles.is_empty() { "-".to_string() } else { roles.join(", ") });
    Ok(())
}

async fn permissions(console: &Console) -> Result<(), ClientError> {
    let snapshot = RbacSnapshot::load(&console.api).await?;

    for (category, permissions) in group_by_category(&snapshot.permissions) {
        println!("[{}]", category.as_deref().unwrap_or("Uncategorised"));
        for permission in permissions {
            let roles: Vec<&str> = snapshot
                .roles_with_permission(permission)
                .iter()
                .map(|r| r.name.as_str())
                .collect();
            println!("  {:<24} {}", permission.name, roles.join(", "));
        }
    }
    Ok(())
}
