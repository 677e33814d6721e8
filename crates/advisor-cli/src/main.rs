mod audit_cmd;
mod config;
mod course_cmd;
mod data;
mod export_cmd;
mod prereq_cmd;
mod recommend_cmd;
mod validate_cmd;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use advisor_core::recommend::EXTENDED_RETRY_BUDGET;

use config::{AdvisorConfig, Overrides};

#[derive(Parser)]
#[command(name = "advisor", about = "Prerequisite and degree-requirement course advisor")]
struct Cli {
    /// Data directory holding courses.json and degrees/ (overrides ADVISOR_DATA_DIR env var)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an advisor config file (records --data-dir when given)
    Init {
        /// Plan generator command line to record in the config file
        #[arg(long)]
        generator: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Look up a course by code or title
    Course {
        /// Course code (`CS 01101`) or title words (`calc 2`)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show a course's prerequisites
    Prereq {
        /// Course code, e.g. `CS 01101`
        #[arg(required = true, num_args = 1..)]
        code: Vec<String>,
        /// Transcript JSON to check the prerequisites against
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// Reconcile a transcript against its degree requirements
    Audit {
        /// Transcript JSON
        #[arg(long)]
        transcript: PathBuf,
        /// Degree document to audit against (repeatable; default: from the transcript)
        #[arg(long = "degree")]
        degrees: Vec<PathBuf>,
        /// Print the program overview first
        #[arg(long)]
        summary: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a list of courses as next semester's plan
    Validate {
        /// Transcript JSON
        #[arg(long)]
        transcript: PathBuf,
        /// Credit target for the semester
        #[arg(long)]
        credits: u32,
        /// Emit JSON
        #[arg(long)]
        json: bool,
        /// Candidate courses, one per argument (`"CS 01101"`)
        #[arg(required = true, num_args = 1..)]
        courses: Vec<String>,
    },
    /// Ask the plan generator for a validated recommendation
    Recommend {
        /// Transcript JSON
        #[arg(long)]
        transcript: PathBuf,
        /// Credit target for the semester
        #[arg(long)]
        credits: u32,
        /// Degree document to plan against (repeatable; default: from the transcript)
        #[arg(long = "degree")]
        degrees: Vec<PathBuf>,
        /// Maximum generator attempts
        #[arg(long, conflicts_with = "unattended")]
        retries: Option<u32>,
        /// Use the extended retry budget for unattended runs
        #[arg(long)]
        unattended: bool,
        /// Plan generator command line (overrides ADVISOR_GENERATOR env var)
        #[arg(long)]
        generator: Option<String>,
        /// Seconds to wait for each generator call
        #[arg(long)]
        timeout: Option<u64>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Export every course's parsed prerequisites as JSON
    ExportPrereqs {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Execute the `advisor init` command: write config file.
fn cmd_init(data_dir: Option<PathBuf>, generator: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let data_dir = data_dir.unwrap_or_else(advisor_data::config::default_data_dir);
    let cfg = config::ConfigFile {
        data: config::DataSection {
            dir: Some(data_dir.clone()),
        },
        generator: config::GeneratorSection {
            command: generator.clone(),
            ..Default::default()
        },
        recommend: config::RecommendSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  data.dir = {}", data_dir.display());
    match &generator {
        Some(command) => println!("  generator.command = {command}"),
        None => println!("  generator.command = (unset)"),
    }
    println!();
    println!(
        "Next: place courses.json and degrees/*.json under {}.",
        data_dir.display()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut overrides = Overrides {
        data_dir: cli.data_dir.clone(),
        ..Default::default()
    };

    match cli.command {
        Commands::Init { generator, force } => {
            cmd_init(cli.data_dir, generator, force)?;
        }
        Commands::Course { query } => {
            let resolved = AdvisorConfig::resolve(&overrides)?;
            let index = data::load_index(&resolved.data_config)?;
            course_cmd::run_course(&index, &query.join(" "))?;
        }
        Commands::Prereq { code, transcript } => {
            let resolved = AdvisorConfig::resolve(&overrides)?;
            let index = data::load_index(&resolved.data_config)?;
            let code = data::parse_code(&code)?;
            let student = transcript.as_deref().map(data::Student::load).transpose()?;
            prereq_cmd::run_prereq(&index, &code, student.as_ref().map(|s| &s.completed))?;
        }
        Commands::Audit {
            transcript,
            degrees,
            summary,
            json,
        } => {
            let resolved = AdvisorConfig::resolve(&overrides)?;
            let student = data::Student::load(&transcript)?;
            let degrees = data::load_degrees(&resolved.data_config, &student.transcript, &degrees)?;
            let options = audit_cmd::AuditOptions { summary, json };
            audit_cmd::run_audit(&degrees, &student.completed, options)?;
        }
        Commands::Validate {
            transcript,
            credits,
            json,
            courses,
        } => {
            let resolved = AdvisorConfig::resolve(&overrides)?;
            let index = data::load_index(&resolved.data_config)?;
            let student = data::Student::load(&transcript)?;
            validate_cmd::run_validate(&index, &student.completed, &courses, credits, json)?;
        }
        Commands::Recommend {
            transcript,
            credits,
            degrees,
            retries,
            unattended,
            generator,
            timeout,
            json,
        } => {
            overrides.generator = generator;
            overrides.timeout_secs = timeout;
            overrides.retry_budget = if unattended {
                Some(EXTENDED_RETRY_BUDGET)
            } else {
                retries
            };
            let resolved = AdvisorConfig::resolve(&overrides)?;
            let index = data::load_index(&resolved.data_config)?;
            let student = data::Student::load(&transcript)?;
            let degrees = data::load_degrees(&resolved.data_config, &student.transcript, &degrees)?;
            let options = recommend_cmd::RecommendOptions {
                target_credits: credits,
                retry_budget: resolved.retry_budget,
                generator: resolved.generator,
                timeout: resolved.timeout,
                json,
            };
            recommend_cmd::run_recommend(&index, &student, &degrees, &options).await?;
        }
        Commands::ExportPrereqs { output } => {
            let resolved = AdvisorConfig::resolve(&overrides)?;
            let index = data::load_index(&resolved.data_config)?;
            export_cmd::run_export_prereqs(&index, output.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "advisor", &mut std::io::stdout());
        }
    }

    Ok(())
}
