use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use equipdesk::api::client::ApiClient;
use equipdesk::core::config::{ClientConfig, LoggingConfig};
use equipdesk::core::tracing_init::init_tracing;
use equipdesk::dashboard::admin::AdminDashboard;
use equipdesk::dashboard::employee::EmployeeDashboard;
use equipdesk::dashboard::notice::{Notice, NoticeLevel, Notifier};
use equipdesk::models::entry::Entry;
use equipdesk::models::user::{NewUser, Role};
use equipdesk::session::guard::{follow, resolve, View};
use equipdesk::session::manager::{RestorePolicy, SessionManager, SessionState};
use equipdesk::session::storage::FileStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Terminal client for the equipment desk
#[derive(Parser)]
#[command(
    name = "desk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Log in to the equipment desk, manage users and record allocations",
    long_about = None
)]
struct Cli {
    /// Config file holding a [client] table
    #[arg(global = true, long, default_value = "desk.toml")]
    config: PathBuf,

    /// Override the API root from the config file
    #[arg(global = true, long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Print the logged-in user
    Whoami,

    /// Show which view a path renders for the current session
    Open { path: String },

    /// Manage accounts (admin)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// List, export or submit allocation entries
    Entries {
        #[command(subcommand)]
        action: EntryAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum EntryAction {
    /// Every entry, newest first (admin)
    List,

    /// Write every entry to a spreadsheet (admin)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Record an allocation for yourself (employee)
    Submit {
        #[arg(long)]
        name: String,
        /// Repeat for each device serial
        #[arg(long = "serial", required = true)]
        serials: Vec<String>,
        #[arg(long)]
        id_number: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long)]
        van_shop: String,
        #[arg(long)]
        allocation_date: String,
        #[arg(long)]
        location: String,
    },

    /// Your own entries, newest first (employee)
    Mine,
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice),
            NoticeLevel::Error => eprintln!("{}", notice),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&LoggingConfig {
        level: "warn".to_string(),
        format: "console".to_string(),
        path: None,
        console: true,
    })?;

    let mut config = ClientConfig::from_file(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
        config.validate()?;
    }

    let client = ApiClient::new(config.api_url.clone(), Duration::from_secs(config.timeout_secs))?;
    let policy = if config.revalidate_on_restore {
        RestorePolicy::Revalidate
    } else {
        RestorePolicy::Trust
    };

    let session = SessionManager::start(
        client,
        Box::new(FileStorage::new(config.session_file.clone())),
        Arc::new(ConsoleNotifier),
        policy,
    )
    .await;

    match cli.command {
        Commands::Login { email, password } => {
            let destination = session.login(&email, &password).await?;
            println!("-> {}", destination.path());
        }
        Commands::Logout => {
            let destination = session.logout()?;
            println!("-> {}", destination.path());
        }
        Commands::Whoami => match session.state() {
            SessionState::Anonymous => println!("Not logged in"),
            SessionState::Authenticated(user) => {
                println!("{} <{}> ({}) id={}", user.name, user.email, user.role, user.id)
            }
        },
        Commands::Open { path } => {
            let state = session.state();
            match resolve(&state, &path) {
                View::Redirect(next) => println!("{} -> {} => {:?}", path, next, follow(&state, &path)),
                view => println!("{} => {:?}", path, view),
            }
        }
        Commands::Users { action } => users(&session, action).await?,
        Commands::Entries { action } => entries(&session, action, &config).await?,
    }

    Ok(())
}

fn require_view(session: &SessionManager<ApiClient>, path: &str, expected: View) -> Result<()> {
    let view = follow(&session.state(), path);
    if view != expected {
        bail!("{} is not available to this session (shows {:?})", path, view);
    }
    Ok(())
}

async fn users(session: &SessionManager<ApiClient>, action: UserAction) -> Result<()> {
    require_view(session, "/admin/users", View::AdminDashboard)?;
    let dashboard = AdminDashboard::open(session)?;
    dashboard.load().await?;

    match action {
        UserAction::List => {
            println!("Users (signed in as {})", dashboard.admin().email);
            for user in dashboard.users() {
                println!("{}  {:<30} {:<20} {}", user.id, user.email, user.name, user.role);
            }
        }
        UserAction::Add {
            email,
            password,
            name,
            role,
        } => {
            let user = dashboard
                .create_user(NewUser {
                    email,
                    password,
                    name,
                    role,
                })
                .await?;
            println!("id={}", user.id);
        }
        UserAction::Delete { id } => dashboard.delete_user(&id).await?,
    }
    Ok(())
}

async fn entries(
    session: &SessionManager<ApiClient>,
    action: EntryAction,
    config: &ClientConfig,
) -> Result<()> {
    match action {
        EntryAction::List => {
            require_view(session, "/admin/entries", View::AdminDashboard)?;
            let dashboard = AdminDashboard::open(session)?;
            dashboard.load().await?;
            print_entries(&dashboard.entries());
        }
        EntryAction::Export { out } => {
            require_view(session, "/admin/entries", View::AdminDashboard)?;
            let dashboard = AdminDashboard::open(session)?;
            dashboard.load().await?;
            let path = out.unwrap_or_else(|| config.export_path.clone());
            let rows = dashboard
                .export(&path)
                .context(format!("Failed to export to {}", path.display()))?;
            println!("{} rows -> {}", rows, path.display());
        }
        EntryAction::Submit {
            name,
            serials,
            id_number,
            phone_number,
            van_shop,
            allocation_date,
            location,
        } => {
            require_view(session, "/employee", View::EmployeeDashboard)?;
            let dashboard = EmployeeDashboard::open(session)?;
            dashboard.edit(|form| {
                form.name = name;
                form.serial_numbers = serials.join("\n");
                form.id_number = id_number;
                form.phone_number = phone_number;
                form.van_shop = van_shop;
                form.allocation_date = allocation_date;
                form.location = location;
            });
            let entry = dashboard.submit().await?;
            println!("id={}", entry.id);
        }
        EntryAction::Mine => {
            require_view(session, "/employee", View::EmployeeDashboard)?;
            let dashboard = EmployeeDashboard::open(session)?;
            dashboard.load_history().await?;
            println!("Entries submitted by {}", dashboard.employee().name);
            print_entries(&dashboard.entries());
        }
    }
    Ok(())
}

fn print_entries(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries found");
        return;
    }
    for entry in entries {
        let serials: Vec<&str> = entry.serials().collect();
        println!(
            "{}  {}  {:<20} {:<12} {:<14} {:<10} {:<14} {}  [{}]",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.id,
            entry.data.name,
            entry.data.id_number,
            entry.data.phone_number,
            entry.data.van_shop,
            entry.data.location,
            entry.data.allocation_date,
            serials.join(", "),
        );
    }
}
