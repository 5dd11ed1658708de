use clap::{Parser, Subcommand};
use workout_uploader::cli::{commands, OutputFormat};
use workout_uploader::config::Settings;
use workout_uploader::workout::ElapsedPolicy;

#[derive(Parser)]
#[command(name = "workout-uploader")]
#[command(author, version, about = "Upload workout CSV summaries to Strava", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Profile to use
    #[arg(short, long, global = true, env = "UPLOADER_PROFILE")]
    profile: Option<String>,

    /// Verbose logging, secrets shown redacted
    #[arg(long, global = true, env = "UPLOADER_DEBUG")]
    debug: bool,

    /// Redirect URI registered with the API application
    #[arg(long, global = true, env = "REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// Timeout for every remote call, in seconds
    #[arg(long, global = true, default_value = "10")]
    timeout_secs: u64,

    /// Elapsed time of the uploaded activity, in seconds
    #[arg(long, global = true, default_value = "60")]
    elapsed_seconds: u32,

    /// Derive elapsed time from the number of rows instead
    #[arg(long, global = true)]
    seconds_per_row: Option<u32>,

    /// Lower bound when deriving elapsed time from rows
    #[arg(long, global = true, default_value = "60")]
    elapsed_floor: u32,

    /// Override the API host (testing)
    #[arg(long, global = true, hide = true, env = "UPLOADER_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Override the OAuth host (testing)
    #[arg(long, global = true, hide = true, env = "UPLOADER_OAUTH_BASE_URL")]
    oauth_base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Workout file commands
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Validate API credentials and print the authorization URL
    Init {
        /// API application client ID
        #[arg(long, env = "CLIENT_ID")]
        client_id: String,
        /// API application client secret
        #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
    },
    /// Exchange the authorization code for a token
    Login {
        /// Code, or the full address the browser was redirected to
        #[arg(short, long)]
        code: String,
        /// Temporary key printed by `auth init`
        #[arg(long)]
        state: Option<String>,
        /// Client ID, when not using a temporary key
        #[arg(long)]
        client_id: Option<String>,
        /// Client secret, when not using a temporary key
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Refresh the access token now
    Refresh,
    /// Show authentication status
    Status,
    /// Logout and clear credentials
    Logout,
    /// Clear credentials and pending authorizations
    Reset,
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// List the exercises in a file
    Exercises {
        /// CSV file path
        file: String,
    },
    /// Show the activity that would be uploaded
    Preview {
        /// CSV file path
        file: String,
        /// Only summarize this exercise
        #[arg(short, long)]
        exercise: Option<String>,
        /// Label used in the activity name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Create an activity from a file
    Upload {
        /// CSV file path
        file: String,
        /// Only summarize this exercise
        #[arg(short, long)]
        exercise: Option<String>,
        /// Label used in the activity name
        #[arg(short, long)]
        name: Option<String>,
        /// Build the request without sending it
        #[arg(long)]
        dry_run: bool,
    },
}

fn settings_from(cli: &Cli) -> workout_uploader::Result<Settings> {
    let elapsed = match cli.seconds_per_row {
        Some(seconds_per_row) => ElapsedPolicy::PerRow {
            seconds_per_row,
            floor: cli.elapsed_floor,
        },
        None => ElapsedPolicy::Fixed {
            seconds: cli.elapsed_seconds,
        },
    };

    Ok(Settings::default()
        .with_timeout_secs(cli.timeout_secs)?
        .with_redirect_uri(cli.redirect_uri.clone())
        .with_elapsed(elapsed)
        .with_debug(cli.debug)
        .with_base_urls(cli.api_base_url.as_deref(), cli.oauth_base_url.as_deref()))
}

async fn run(cli: Cli) -> workout_uploader::Result<()> {
    let settings = settings_from(&cli)?;
    let format = cli.format;
    let profile = cli.profile;

    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Init {
                client_id,
                client_secret,
            } => commands::init(&client_id, &client_secret, &settings).await,
            AuthCommands::Login {
                code,
                state,
                client_id,
                client_secret,
            } => commands::login(&code, state, client_id, client_secret, profile, &settings).await,
            AuthCommands::Refresh => commands::refresh(profile, &settings).await,
            AuthCommands::Status => commands::status(profile).await,
            AuthCommands::Logout => commands::logout(profile).await,
            AuthCommands::Reset => commands::reset(profile).await,
        },
        Commands::Workout { command } => match command {
            WorkoutCommands::Exercises { file } => commands::exercises(&file, format).await,
            WorkoutCommands::Preview {
                file,
                exercise,
                name,
            } => commands::preview(&file, exercise, name, format, &settings).await,
            WorkoutCommands::Upload {
                file,
                exercise,
                name,
                dry_run,
            } => {
                commands::upload(&file, exercise, name, dry_run, profile, format, &settings).await
            }
        },
    }
}

#[tokio::main]
async fn main() -> workout_uploader::Result<()> {
    let cli = Cli::parse();
    workout_uploader::logging::init(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", workout_uploader::error::format_user_error(&e));
        std::process::exit(1);
    }

    Ok(())
}
