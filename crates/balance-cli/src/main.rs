use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "balance", version, about = "Balance: daily wellness goals and streaks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// First-run goal selection
    Onboard(commands::onboard::OnboardArgs),
    /// Today's progress across every category
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Built-in fitness and mental health metrics
    Metric {
        #[command(subcommand)]
        action: commands::metric::MetricAction,
    },
    /// Completion streaks
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Custom goals
    Goal {
        #[command(subcommand)]
        action: commands::goal::CustomGoalAction,
    },
    /// Countup timer for timed activities
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Today's totals from the health data provider
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Delete every goal, value and streak
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Onboard(args) => commands::onboard::run(args),
        Commands::Status { json } => commands::status::run(json),
        Commands::Metric { action } => commands::metric::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Health { json } => commands::health::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Reset { yes } => commands::reset::run(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
