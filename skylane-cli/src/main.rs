mod commands;
mod state;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use skylane_client::AppConfig;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "skylane", author, version, about = "Search, book and manage flights")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session on this machine
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SKYLANE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the signed-in profile, or update it when any field is given
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        birthdate: Option<NaiveDate>,
    },
    /// City and airport suggestions for a search term
    Locations { term: String },
    /// Airports and airlines served
    Menu,
    /// Flights on one date between two airports
    Flights {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Search flights between two locations
    Search {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Random flights to browse
    Discover {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Book a seat on a flight
    Book(commands::BookArgs),
    /// List your tickets, or show one
    Tickets { ticket: Option<String> },
    Pay {
        ticket: String,
        /// Pay with loyalty points instead of cash
        #[arg(long)]
        points: bool,
    },
    Checkin { ticket: String },
    Cancel { ticket: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane=info,skylane_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!("Using API at {}", config.api.base_url);

    let state = AppState::new(config)?;
    if let Err(e) = state.session.restore().await {
        tracing::warn!("Could not restore session: {}", e);
    }

    match cli.command {
        Command::Login { email, password } => commands::login(&state, &email, &password).await,
        Command::Logout => commands::logout(&state).await,
        Command::Profile { first_name, last_name, phone, birthdate } => {
            commands::profile(&state, first_name, last_name, phone, birthdate).await
        }
        Command::Locations { term } => commands::locations(&state, &term).await,
        Command::Menu => commands::menu(&state).await,
        Command::Flights { date, from, to } => commands::flights(&state, date, &from, &to).await,
        Command::Search { from, to, start, end, pages } => {
            commands::search(&state, &from, &to, start, end, pages).await
        }
        Command::Discover { pages } => commands::discover(&state, pages).await,
        Command::Book(args) => commands::book(&state, args).await,
        Command::Tickets { ticket } => commands::tickets(&state, ticket.as_deref()).await,
        Command::Pay { ticket, points } => commands::pay(&state, &ticket, points).await,
        Command::Checkin { ticket } => commands::checkin(&state, &ticket).await,
        Command::Cancel { ticket } => commands::cancel(&state, &ticket).await,
    }
}
