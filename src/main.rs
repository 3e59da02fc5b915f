use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use welfare_admin::aggregate::Summary;
use welfare_admin::auth::{Session, SessionStore};
use welfare_admin::config::AppConfig;
use welfare_admin::dataset::Dataset;
use welfare_admin::error::AdminError;
use welfare_admin::list::ListController;
use welfare_admin::models::{Donator, HelpRequest, Record, Senior, Student};
use welfare_admin::report::Presentable;
use welfare_admin::source::MockSource;
use welfare_admin::{aggregate, auth, config, logging, report};

#[derive(Parser)]
#[command(name = "welfare-admin")]
#[command(about = "Admin console for the student, senior and donor welfare program", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON dataset to serve instead of the built-in demo records
    #[arg(long, env = "WELFARE_DATA", global = true)]
    data: Option<PathBuf>,

    /// Directory holding the persisted session
    #[arg(long, env = "WELFARE_STATE_DIR", default_value = config::DEFAULT_STATE_DIR, global = true)]
    state_dir: PathBuf,

    #[arg(long, env = "WELFARE_ADMIN_EMAIL", hide_env_values = true)]
    admin_email: Option<String>,

    #[arg(long, env = "WELFARE_ADMIN_PASSWORD_HASH", hide_env_values = true)]
    admin_password_hash: Option<String>,

    #[arg(long, env = "WELFARE_SESSION_TTL_MINUTES", default_value_t = config::DEFAULT_SESSION_TTL_MINUTES)]
    session_ttl_minutes: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ListArgs {
    /// Free-text search over the page's searchable fields
    #[arg(long, short, default_value = "")]
    query: String,
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = 10)]
    page_size: usize,
    /// Open the detail view for this id
    #[arg(long)]
    show: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Students,
    Seniors,
    Donators,
    Requests,
}

/// Pages that offer status changes.
#[derive(Clone, Copy, ValueEnum)]
enum StatusKindArg {
    Donators,
    Requests,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Discard the persisted session
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Student management page
    Students(ListArgs),
    /// Senior management page
    Seniors(ListArgs),
    /// Donation management page
    Donators(ListArgs),
    /// Help request management page
    Requests(ListArgs),
    /// Change the status of one record, saved back to --data when given
    SetStatus {
        #[arg(long, value_enum)]
        kind: StatusKindArg,
        #[arg(long)]
        id: u32,
        #[arg(long)]
        status: String,
    },
    /// Generate a markdown overview of the whole program
    Dashboard {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Append CSV rows of one kind to a dataset file
    Import {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print an argon2 hash for WELFARE_ADMIN_PASSWORD_HASH
    HashPassword {
        #[arg(long)]
        password: String,
    },
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            admin_email: self.admin_email.clone(),
            admin_password_hash: self.admin_password_hash.clone(),
            state_dir: self.state_dir.clone(),
            session_ttl_minutes: self.session_ttl_minutes,
            data_path: self.data.clone(),
        }
    }
}

fn load_dataset(config: &AppConfig) -> anyhow::Result<Dataset> {
    match &config.data_path {
        Some(path) => Dataset::load_json(path)
            .with_context(|| format!("failed to read dataset {}", path.display())),
        None => Ok(Dataset::seeded()),
    }
}

fn print_notifications<R: Record>(controller: &mut ListController<R>) {
    for notification in controller.take_notifications() {
        eprintln!("! {}", notification.message);
    }
}

async fn show_page<R>(
    title: &str,
    source: &MockSource,
    session: Option<&Session>,
    args: ListArgs,
) -> anyhow::Result<()>
where
    R: Presentable,
    R::Stats: Summary,
{
    let mut controller = ListController::<R>::default();
    controller.load(source, session).await?;
    print_notifications(&mut controller);

    controller.set_page_size(args.page_size)?;
    controller.set_query(args.query);
    controller.set_page(args.page.saturating_sub(1));
    if let Some(id) = args.show {
        match controller.open_detail(source, session, id).await {
            Ok(_) => {}
            Err(err @ AdminError::NotFound { .. }) => eprintln!("! {err}"),
            Err(err) => return Err(err.into()),
        }
    }

    print!("{}", report::render_page(title, &controller.view()));
    Ok(())
}

async fn set_status<R: Presentable>(
    config: &AppConfig,
    source: &MockSource,
    session: Option<&Session>,
    id: u32,
    status: &str,
) -> anyhow::Result<()> {
    let mut controller = ListController::<R>::default();
    controller.load(source, session).await?;
    print_notifications(&mut controller);

    let updated = controller.update_status(source, session, id, status).await?;
    print!("{}", report::render_detail(&updated));

    match &config.data_path {
        Some(path) => {
            source
                .snapshot()
                .await
                .save_json(path)
                .with_context(|| format!("failed to save dataset {}", path.display()))?;
            info!(path = %path.display(), "dataset saved");
        }
        None => println!("Demo data is not saved; pass --data to keep changes."),
    }
    Ok(())
}

async fn dashboard(
    source: &MockSource,
    session: Option<&Session>,
) -> anyhow::Result<String> {
    let mut students = ListController::<Student>::default();
    let mut seniors = ListController::<Senior>::default();
    let mut donators = ListController::<Donator>::default();
    let mut requests = ListController::<HelpRequest>::default();

    students.load(source, session).await?;
    seniors.load(source, session).await?;
    donators.load(source, session).await?;
    requests.load(source, session).await?;
    print_notifications(&mut students);
    print_notifications(&mut seniors);
    print_notifications(&mut donators);
    print_notifications(&mut requests);

    let stats = aggregate::dashboard_stats(
        students.records(),
        seniors.records(),
        donators.records(),
        requests.records(),
    );
    Ok(report::build_dashboard_report(
        chrono::Utc::now(),
        &stats,
        requests.records(),
        donators.records(),
    ))
}

/// Drops the persisted session and its registry entry.
fn forget_session(config: &AppConfig, sessions: &SessionStore) -> anyhow::Result<()> {
    if let Some(session) = sessions.load()? {
        config.session_registry()?.revoke(session.token)?;
    }
    sessions.clear().context("failed to clear persisted session")
}

fn connect(
    config: &AppConfig,
    sessions: &SessionStore,
) -> anyhow::Result<(MockSource, Option<Session>)> {
    let session = sessions.load()?;
    let source = MockSource::new(load_dataset(config)?, config.session_registry()?);
    Ok((source, session))
}

async fn run(cli: Cli, config: &AppConfig, sessions: &SessionStore) -> anyhow::Result<()> {
    match cli.command {
        Commands::Login { email, password } => {
            let session = config
                .authenticator()?
                .login(&email, &password)
                .map_err(|err| match err {
                    AdminError::Unauthorized => anyhow::anyhow!("invalid email or password"),
                    other => other.into(),
                })?;
            config.session_registry()?.register(&session)?;
            sessions.save(&session)?;
            println!("Logged in as {}.", session.user.email);
        }
        Commands::Logout => {
            forget_session(config, sessions)?;
            println!("Logged out.");
        }
        Commands::Whoami => match sessions.load()? {
            Some(session) => println!(
                "{} ({}) until {}",
                session.user.name, session.user.email, session.user.session_expires_at
            ),
            None => println!("Not logged in."),
        },
        Commands::Students(args) => {
            let (source, session) = connect(config, sessions)?;
            show_page::<Student>("Student Management", &source, session.as_ref(), args).await?;
        }
        Commands::Seniors(args) => {
            let (source, session) = connect(config, sessions)?;
            show_page::<Senior>("Senior Management", &source, session.as_ref(), args).await?;
        }
        Commands::Donators(args) => {
            let (source, session) = connect(config, sessions)?;
            show_page::<Donator>("Donator Management", &source, session.as_ref(), args).await?;
        }
        Commands::Requests(args) => {
            let (source, session) = connect(config, sessions)?;
            show_page::<HelpRequest>("Request Management", &source, session.as_ref(), args)
                .await?;
        }
        Commands::SetStatus { kind, id, status } => {
            let (source, session) = connect(config, sessions)?;
            let session = session.as_ref();
            match kind {
                StatusKindArg::Donators => {
                    set_status::<Donator>(config, &source, session, id, &status).await?
                }
                StatusKindArg::Requests => {
                    set_status::<HelpRequest>(config, &source, session, id, &status).await?
                }
            }
        }
        Commands::Dashboard { out } => {
            let (source, session) = connect(config, sessions)?;
            let report = dashboard(&source, session.as_ref()).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, report)?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => print!("{report}"),
            }
        }
        Commands::Import { kind, csv, out } => {
            let mut dataset = load_dataset(config)?;
            let inserted = match kind {
                KindArg::Students => dataset.import_csv::<Student>(&csv)?,
                KindArg::Seniors => dataset.import_csv::<Senior>(&csv)?,
                KindArg::Donators => dataset.import_csv::<Donator>(&csv)?,
                KindArg::Requests => dataset.import_csv::<HelpRequest>(&csv)?,
            };
            dataset.save_json(&out)?;
            println!("Imported {inserted} rows from {} into {}.", csv.display(), out.display());
        }
        Commands::HashPassword { password } => {
            println!("{}", auth::hash_password(&password)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = cli.config();
    let sessions = config.session_store();

    match run(cli, &config, &sessions).await {
        Err(err) if matches!(err.downcast_ref::<AdminError>(), Some(AdminError::Unauthorized)) => {
            warn!("session rejected, clearing {}", sessions.path().display());
            forget_session(&config, &sessions)?;
            info!("returning to login");
            anyhow::bail!("not logged in or session expired; run `welfare-admin login`")
        }
        other => other,
    }
}
