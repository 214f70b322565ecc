//! Persona Lab command-line front end
//!
//! ```bash
//! persona-lab segments --csv my_segments.csv
//! persona-lab personas --segment "Active Seniors" --count 4
//! persona-lab add-persona --name "Greta Dijk" --gender female --age 31 --job Midwife
//! persona-lab product --name AquaLoop --description "Recycling shower" \
//!     --value-proposition "Half the water" --target-market Renters
//! persona-lab chat --persona 2
//! persona-lab interview --product "Connect Hub" --questions 6
//! persona-lab report --format markdown --out report.md
//! ```

mod commands;
mod config;
mod state;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::report::ReportFormat;
use config::LabConfig;
use research::{Gender, PersonaDraft};
use state::AppState;

#[derive(Parser)]
#[command(name = "persona-lab")]
#[command(about = "Synthetic user research with generated personas")]
#[command(long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "PERSONA_LAB_CONFIG")]
    config: Option<PathBuf>,

    /// Session file (overrides the config)
    #[arg(long, global = true, env = "PERSONA_LAB_SESSION")]
    session: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known segments
    Segments {
        /// Extra segment CSV to merge into the catalog
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Assemble a persona set and store it in the session
    Personas {
        /// Segment name (defaults to the configured segment)
        #[arg(long)]
        segment: Option<String>,

        /// Number of personas (defaults to the segment's count)
        #[arg(long)]
        count: Option<u32>,

        /// Extra segment CSV to merge into the catalog
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Load the hand-written example personas instead
        #[arg(long, conflicts_with_all = ["segment", "count", "seed"])]
        examples: bool,

        /// Seed for a reproducible batch
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Add a hand-built persona to the session
    AddPersona {
        /// Full name; the last word is the surname
        #[arg(long)]
        name: String,

        /// male or female
        #[arg(long)]
        gender: Gender,

        #[arg(long)]
        age: u8,

        #[arg(long, default_value = "")]
        job: String,

        #[arg(long, default_value = "")]
        company: String,

        #[arg(long, default_value = "")]
        experience: String,

        #[arg(long, default_value = "")]
        pain_points: String,

        #[arg(long, default_value = "")]
        goals: String,

        #[arg(long, default_value = "")]
        personality: String,
    },

    /// List the personas in the session
    List,

    /// Show one persona's full profile
    Show {
        #[arg(long)]
        persona: u64,
    },

    /// Chat with a persona (reads questions from stdin)
    Chat {
        #[arg(long)]
        persona: u64,

        /// Product template name
        #[arg(long)]
        product: Option<String>,
    },

    /// Show, choose or define the product under research
    Product {
        /// List the product templates
        #[arg(long, conflicts_with_all = ["template", "name"])]
        list: bool,

        /// Use a product template
        #[arg(long, conflicts_with = "name")]
        template: Option<String>,

        /// Name of a custom product
        #[arg(long, requires_all = ["description", "value_proposition", "target_market"])]
        name: Option<String>,

        #[arg(long, requires = "name")]
        description: Option<String>,

        #[arg(long, requires = "name")]
        value_proposition: Option<String>,

        #[arg(long, requires = "name")]
        target_market: Option<String>,
    },

    /// Run autonomous interviews over the session's personas
    Interview {
        /// Product template name
        #[arg(long)]
        product: Option<String>,

        /// Questions per interview
        #[arg(long)]
        questions: Option<usize>,

        /// Number of interviews (default: one per persona; extra ones reuse random personas)
        #[arg(long)]
        interviews: Option<usize>,
    },

    /// Export the session
    Report {
        #[arg(long, value_enum, default_value = "markdown")]
        format: ReportFormat,

        /// Write to a file instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = LabConfig::load(cli.config.as_deref())?;
    debug!("Effective config: {:?}", config);
    let mut state = AppState::new(config, cli.session, cli.json)?;

    match cli.command {
        Commands::Segments { csv } => {
            if let Some(csv) = csv {
                state.add_segments(&csv)?;
            }
            commands::segments::list_segments(&state)
        }
        Commands::Personas {
            segment,
            count,
            csv,
            examples,
            seed,
        } => {
            if let Some(csv) = csv {
                state.add_segments(&csv)?;
            }
            match seed {
                Some(seed) => {
                    info!("Using seed {}", seed);
                    let mut rng = StdRng::seed_from_u64(seed);
                    commands::personas::generate_seeded(&state, segment.as_deref(), count, &mut rng)
                }
                None => commands::personas::generate_personas(&state, segment.as_deref(), count, examples),
            }
        }
        Commands::AddPersona {
            name,
            gender,
            age,
            job,
            company,
            experience,
            pain_points,
            goals,
            personality,
        } => commands::personas::add_persona(
            &state,
            PersonaDraft {
                name,
                gender,
                age,
                job,
                company,
                experience,
                pain_points,
                goals,
                personality,
            },
        ),
        Commands::List => commands::personas::list_personas(&state),
        Commands::Show { persona } => commands::personas::get_persona(&state, persona),
        Commands::Chat { persona, product } => commands::chat::chat(&state, persona, product.as_deref()),
        Commands::Product {
            list,
            template,
            name,
            description,
            value_proposition,
            target_market,
        } => match (template, name) {
            _ if list => commands::product::list_products(&state),
            (Some(template), _) => commands::product::use_template(&state, &template),
            (None, Some(name)) => commands::product::define_product(
                &state,
                &name,
                description.as_deref().unwrap_or_default(),
                value_proposition.as_deref().unwrap_or_default(),
                target_market.as_deref().unwrap_or_default(),
            ),
            (None, None) => commands::product::show_product(&state),
        },
        Commands::Interview {
            product,
            questions,
            interviews,
        } => commands::interviews::run_interviews(&state, product.as_deref(), interviews, questions),
        Commands::Report { format, out } => {
            commands::report::export_report(&state, format, out.as_deref())
        }
        Commands::Config => commands::config::get_config(&state),
    }
}
