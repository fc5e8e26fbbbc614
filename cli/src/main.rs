mod commands;
mod config;
mod insights;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kcal_core::insights::InsightProvider;

use crate::commands::{
    BodyArgs, ImportKind, ProfileUpdate, cmd_delete, cmd_estimate_bmr, cmd_estimate_exercise,
    cmd_estimate_tdee, cmd_exercise_add, cmd_history, cmd_import, cmd_meal_add, cmd_month,
    cmd_profile_set, cmd_profile_show, cmd_summary, cmd_weight_history, cmd_weight_log,
};
use crate::config::Config;
use crate::insights::OpenAiInsightClient;
use crate::store::Store;

#[derive(Parser)]
#[command(
    name = "kcal",
    version,
    about = "A simple energy-balance tracker CLI",
    long_about = "Log meals, exercise and weigh-ins, then compare what you ate \
with what you burnt, day by day and month by month."
)]
struct Cli {
    /// Show debug logs on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log meals
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Log exercise
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Delete a meal, exercise or weight entry by ID (or ID prefix)
    Delete {
        /// Entry ID as shown in brackets, at least 4 characters
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage body data and weight goal
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Show the energy balance for a day (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Ask the configured AI service for insights
        #[arg(long)]
        insights: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show averages and weight trend for a month (defaults to this month)
    Month {
        /// Month to show (YYYY-MM)
        month: Option<String>,
        /// Ask the configured AI service for insights
        #[arg(long)]
        insights: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily balances for the last N days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import entries from a CSV file
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Run the energy formulas directly
    Estimate {
        #[command(subcommand)]
        command: EstimateCommands,
    },
}

#[derive(Subcommand)]
enum MealCommands {
    /// Log a meal
    Add {
        /// Meal name
        name: String,
        /// Calories (kcal)
        calories: f64,
        /// Protein in grams
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs in grams
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat in grams
        #[arg(long)]
        fat: Option<f64>,
        /// When it was eaten ("YYYY-MM-DD HH:MM", YYYY-MM-DD, now, yesterday; default: now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Log an exercise session
    Add {
        /// Exercise name
        name: String,
        /// Duration in minutes
        minutes: f64,
        /// Intensity: low, moderate, high
        #[arg(short, long, default_value = "moderate")]
        intensity: String,
        /// Type: general, walking, cycling, swimming, strength, running
        #[arg(short = 't', long = "type", default_value = "general")]
        exercise_type: String,
        /// Calories burnt (default: estimated from MET values and body weight)
        #[arg(long)]
        calories: Option<f64>,
        /// When it happened ("YYYY-MM-DD HH:MM", YYYY-MM-DD, now, yesterday; default: now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log a weight entry
    Log {
        /// Weight value (number)
        value: f64,
        /// Unit: kg or lbs (default: kg)
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// When it was measured ("YYYY-MM-DD HH:MM", YYYY-MM-DD, now, yesterday; default: now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recent weigh-ins, newest first
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "30")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Update profile fields (unset flags keep their current value)
    Set {
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Age in years
        #[arg(long)]
        age: Option<u32>,
        /// Gender: male, female, other
        #[arg(long)]
        gender: Option<String>,
        /// Activity level: sedentary, light, moderate, active, very_active
        #[arg(long)]
        activity: Option<String>,
        /// Target weight in kg
        #[arg(long)]
        target_weight: Option<f64>,
        /// Date to reach the target weight (YYYY-MM-DD)
        #[arg(long)]
        target_date: Option<String>,
        /// Remove the target weight and date
        #[arg(long, conflicts_with_all = ["target_weight", "target_date"])]
        clear_goal: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the profile with BMI, BMR, TDEE and daily target
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import meals (Timestamp, Name, Calories, Protein (g), Carbs (g), Fat (g))
    Meals {
        /// Path to the CSV file
        file: PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import exercises (Timestamp, Name, Duration (min), Intensity, Type, Calories)
    Exercises {
        /// Path to the CSV file
        file: PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import weigh-ins (Timestamp, Weight (kg))
    Weights {
        /// Path to the CSV file
        file: PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct BodyFlags {
    /// Weight in kg (default: profile)
    #[arg(long)]
    weight: Option<f64>,
    /// Height in cm (default: profile)
    #[arg(long)]
    height: Option<f64>,
    /// Age in years (default: profile)
    #[arg(long)]
    age: Option<u32>,
    /// Gender: male, female, other (default: profile)
    #[arg(long)]
    gender: Option<String>,
}

impl From<BodyFlags> for BodyArgs {
    fn from(flags: BodyFlags) -> Self {
        BodyArgs {
            weight_kg: flags.weight,
            height_cm: flags.height,
            age_years: flags.age,
            gender: flags.gender,
        }
    }
}

#[derive(Subcommand)]
enum EstimateCommands {
    /// Basal metabolic rate (Mifflin-St Jeor)
    Bmr {
        #[command(flatten)]
        body: BodyFlags,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Total daily energy expenditure
    Tdee {
        #[command(flatten)]
        body: BodyFlags,
        /// Activity level: sedentary, light, moderate, active, very_active (default: profile)
        #[arg(long)]
        activity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Calories burnt by an exercise session
    Exercise {
        /// Duration in minutes
        minutes: f64,
        /// Intensity: low, moderate, high
        #[arg(short, long, default_value = "moderate")]
        intensity: String,
        /// Type: general, walking, cycling, swimming, strength, running
        #[arg(short = 't', long = "type", default_value = "general")]
        exercise_type: String,
        /// Weight in kg (default: profile)
        #[arg(long)]
        weight: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn insight_client(config: &Config, wanted: bool) -> Result<Option<OpenAiInsightClient>> {
    if !wanted {
        return Ok(None);
    }
    let client = OpenAiInsightClient::from_config(&config.insights)?;
    if client.is_none() {
        eprintln!(
            "Note: insights are disabled. Set {} to enable them.",
            crate::config::INSIGHTS_API_KEY_ENV
        );
    }
    Ok(client)
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(path = %config.log_path.display(), "Using log file");
    let store = Store::open(&config.log_path);

    match cli.command {
        Commands::Meal { command } => match command {
            MealCommands::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                at,
                json,
            } => cmd_meal_add(&store, &name, calories, protein, carbs, fat, at, json),
        },
        Commands::Exercise { command } => match command {
            ExerciseCommands::Add {
                name,
                minutes,
                intensity,
                exercise_type,
                calories,
                at,
                json,
            } => cmd_exercise_add(
                &store,
                &name,
                minutes,
                &intensity,
                &exercise_type,
                calories,
                at,
                json,
            ),
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log {
                value,
                unit,
                at,
                json,
            } => cmd_weight_log(&store, value, &unit, at, json),
            WeightCommands::History { limit, json } => cmd_weight_history(&store, limit, json),
        },
        Commands::Delete { id, json } => cmd_delete(&store, &id, json),
        Commands::Profile { command } => match command {
            ProfileCommands::Set {
                height,
                age,
                gender,
                activity,
                target_weight,
                target_date,
                clear_goal,
                json,
            } => cmd_profile_set(
                &store,
                ProfileUpdate {
                    height_cm: height,
                    age_years: age,
                    gender,
                    activity_level: activity,
                    target_weight_kg: target_weight,
                    target_date,
                    clear_goal,
                },
                json,
            ),
            ProfileCommands::Show { json } => cmd_profile_show(&store, json),
        },
        Commands::Summary {
            date,
            insights,
            json,
        } => {
            let client = insight_client(&config, insights)?;
            let provider = client.as_ref().map(|c| c as &dyn InsightProvider);
            cmd_summary(&store, date, provider, json).await
        }
        Commands::Month {
            month,
            insights,
            json,
        } => {
            let client = insight_client(&config, insights)?;
            let provider = client.as_ref().map(|c| c as &dyn InsightProvider);
            cmd_month(&store, month, provider, json).await
        }
        Commands::History { days, json } => cmd_history(&store, days, json),
        Commands::Import { command } => {
            let (kind, file, dry_run, json) = match command {
                ImportCommands::Meals {
                    file,
                    dry_run,
                    json,
                } => (ImportKind::Meals, file, dry_run, json),
                ImportCommands::Exercises {
                    file,
                    dry_run,
                    json,
                } => (ImportKind::Exercises, file, dry_run, json),
                ImportCommands::Weights {
                    file,
                    dry_run,
                    json,
                } => (ImportKind::Weights, file, dry_run, json),
            };
            cmd_import(&store, kind, &file, dry_run, json)
        }
        Commands::Estimate { command } => match command {
            EstimateCommands::Bmr { body, json } => cmd_estimate_bmr(&store, body.into(), json),
            EstimateCommands::Tdee {
                body,
                activity,
                json,
            } => cmd_estimate_tdee(&store, body.into(), activity, json),
            EstimateCommands::Exercise {
                minutes,
                intensity,
                exercise_type,
                weight,
                json,
            } => cmd_estimate_exercise(&store, minutes, &intensity, &exercise_type, weight, json),
        },
    }
}
