//! CLI entry and dispatch.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use campus_core::api::users::{UserAction, UserFilter};
use campus_core::config::{self, Config};
use campus_core::gateway::{Gateway, GatewayError};
use campus_core::guard::{GuardState, RemoteTokenValidator, RouteGuard};
use campus_core::navigation::{Navigator, Route};
use campus_core::session::{FileSessionStore, SessionStore};
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod navigator;

pub use navigator::{Redirected, TerminalNavigator};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CAMPUS_ADMIN_LOG";

#[derive(Parser)]
#[command(name = "campus-admin")]
#[command(version)]
#[command(about = "Backoffice for the campus platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides config)
    #[arg(long, global = true, env = "CAMPUS_ADMIN_API_URL", value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Read the password from stdin without prompting
        #[arg(long = "password-stdin")]
        password_stdin: bool,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the stored session and backend
    Status,

    /// Search and administer users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Browse courses
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },
    /// Platform statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum UserCommands {
    /// Search users by name or email
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        /// Only admins
        #[arg(long)]
        admins: bool,
        /// Only blocked users
        #[arg(long)]
        blocked: bool,
        /// Only active users
        #[arg(long)]
        active: bool,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Block a user by email
    Block {
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    /// Unblock a user by email
    Unblock {
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    /// Grant admin privileges to a user
    Promote {
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    /// User counters
    Stats,
}

#[derive(clap::Subcommand)]
enum CourseCommands {
    /// List every course
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Search courses by title
    Search {
        #[arg(value_name = "TITLE")]
        title: String,
    },
}

#[derive(clap::Subcommand)]
enum StatsCommands {
    /// Platform-wide counters
    General,
    /// Courses by status
    Courses,
    /// Assignments by type and status
    Assignments,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, api_url } = cli;

    // Config commands must work even when the config file does not parse.
    let app = || -> Result<App> {
        let config = Config::load().context("load config")?;
        App::new(config, api_url.as_deref())
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },

        Commands::Login {
            email,
            password_stdin,
        } => commands::auth::login(&app()?, &email, password_stdin).await,
        Commands::Logout => commands::auth::logout(&app()?),
        Commands::Status => commands::auth::status(&app()?),

        Commands::Users { command } => {
            let app = app()?;
            match command {
                UserCommands::Search {
                    query,
                    admins,
                    blocked,
                    active,
                    json,
                } => {
                    let filter = UserFilter {
                        admins_only: admins,
                        blocked_only: blocked,
                        active_only: active,
                    };
                    app.guarded(
                        Route::UserManagement,
                        commands::users::search(&app, &query, filter, json),
                    )
                    .await
                }
                UserCommands::Block { email } => {
                    let view = commands::users::act(&app, UserAction::Block, &email);
                    app.guarded(Route::BlockUser, view).await
                }
                UserCommands::Unblock { email } => {
                    let view = commands::users::act(&app, UserAction::Unblock, &email);
                    app.guarded(Route::BlockUser, view).await
                }
                UserCommands::Promote { email } => {
                    let view = commands::users::act(&app, UserAction::Promote, &email);
                    app.guarded(Route::AuthorizeAdmin, view).await
                }
                UserCommands::Stats => {
                    app.guarded(Route::Statistics, commands::users::stats(&app))
                        .await
                }
            }
        }

        Commands::Courses { command } => {
            let app = app()?;
            match command {
                CourseCommands::List { json } => {
                    app.guarded(Route::Courses, commands::courses::list(&app, json)).await
                }
                CourseCommands::Search { title } => {
                    app.guarded(Route::Courses, commands::courses::search(&app, &title)).await
                }
            }
        }

        Commands::Stats { command } => {
            let app = app()?;
            match command {
                StatsCommands::General => {
                    app.guarded(Route::GeneralStatistics, commands::stats::general(&app))
                        .await
                }
                StatsCommands::Courses => {
                    app.guarded(Route::CourseStatistics, commands::stats::courses(&app))
                        .await
                }
                StatsCommands::Assignments => {
                    let view = commands::stats::assignments(&app);
                    app.guarded(Route::AssignmentStatistics, view).await
                }
            }
        }
    }
}

/// Everything a command needs to talk to the backend.
pub(crate) struct App {
    config: Config,
    store: Arc<dyn SessionStore>,
    navigator: Arc<TerminalNavigator>,
    gateway: Arc<Gateway>,
}

impl App {
    fn new(config: Config, api_url: Option<&str>) -> Result<Self> {
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open_default());
        let navigator = Arc::new(TerminalNavigator::new());
        let gateway = Gateway::from_config(
            &config,
            api_url,
            Arc::clone(&store),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        )?;

        Ok(Self {
            config,
            store,
            navigator,
            gateway: Arc::new(gateway),
        })
    }

    pub(crate) fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub(crate) fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    fn guard(&self) -> RouteGuard {
        let guard = RouteGuard::new(
            Arc::clone(&self.store),
            Arc::clone(&self.navigator) as Arc<dyn Navigator>,
        )
        .on_state(|state| {
            if state == GuardState::Validating {
                tracing::debug!("validating session");
            }
        });

        match self.config.validation_path() {
            Some(path) => guard.with_validator(Arc::new(RemoteTokenValidator::new(
                Arc::clone(&self.gateway),
                path,
            ))),
            None => guard,
        }
    }

    /// Opens `route` and runs its command, behind the route guard when the
    /// route is protected.
    ///
    /// Denials and authorization failures during the command become
    /// [`Redirected`] so `main` can pick the exit code.
    async fn guarded<Fut>(&self, route: Route, view: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        tracing::debug!(%route, "open");
        if !route.is_protected() {
            return view.await.map_err(|e| self.redirect_on_auth_failure(e));
        }

        match self.guard().render(|| view).await {
            Ok(result) => result.map_err(|e| self.redirect_on_auth_failure(e)),
            Err(denial) => Err(Redirected::from(denial).into()),
        }
    }

    fn redirect_on_auth_failure(&self, e: anyhow::Error) -> anyhow::Error {
        let auth_failure = e
            .downcast_ref::<GatewayError>()
            .is_some_and(GatewayError::is_auth_failure);
        if auth_failure {
            tracing::debug!(redirect = ?self.navigator.last_redirect(), "auth failure");
            Redirected::session_expired().into()
        } else {
            e
        }
    }
}

/// Installs stderr logging plus a daily log file under the admin home.
///
/// The file layer is skipped when the log directory cannot be created.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("campus-admin")
        .filename_suffix("log")
        .build(config::paths::logs_dir())
        .ok()
        .map(|appender| {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            // keep the writer alive for the lifetime of the program
            std::mem::forget(guard);
            fmt::layer().with_ansi(false).with_writer(non_blocking)
        });

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
    {
        // reported through whichever subscriber was already installed
        tracing::debug!("logging already initialized: {e}");
    }
}
