// ABOUTME: Command-line front end over the job services client
// ABOUTME: Creates, submits, inspects, watches and cancels jobs described in TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use reality_capture::config::{Config, SettingsFile};
use reality_capture::remote::{CostParameters, ReqwestTransport};
use reality_capture::{JobHandle, JobProperties, ServiceClient, StaticToken};

#[derive(Parser)]
#[command(name = "reality-capture", version, about = "Submit and monitor reality capture cloud jobs")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short, global = true, default_value = "reality-capture.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a job from a TOML settings file
    Create {
        settings: PathBuf,
        /// Submit the job right after creating it
        #[arg(long)]
        submit: bool,
        /// iTwin or workspace id, overriding the config file
        #[arg(long)]
        owner: Option<String>,
    },
    /// Submit a created job for processing
    Submit { job_id: String },
    /// Show job properties
    Status {
        #[arg(required = true)]
        job_ids: Vec<String>,
    },
    /// Show job progress once
    Progress { job_id: String },
    /// Follow job progress until it finishes
    Watch {
        job_id: String,
        /// Seconds between progress queries
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
    /// Cancel a running job
    Cancel {
        job_id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete a job
    Delete {
        job_id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Estimate the processing cost of a job
    Estimate {
        job_id: String,
        #[arg(long)]
        giga_pixels: Option<f64>,
        #[arg(long)]
        mega_points: Option<f64>,
        #[arg(long)]
        mesh_quality: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reality_capture=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let token = config.token.clone().with_context(|| {
        format!(
            "No access token: set `token` in {} or {}",
            cli.config.display(),
            reality_capture::config::TOKEN_ENV
        )
    })?;

    let client = ServiceClient::with_transport(
        config.service,
        config.base_url(),
        Arc::new(ReqwestTransport::new()?),
        Arc::new(StaticToken::new(token)),
    );

    match cli.command {
        Commands::Create {
            settings,
            submit,
            owner,
        } => {
            let file = SettingsFile::load(&settings)?;
            let job_settings = file
                .to_settings(config.service)
                .with_context(|| format!("Invalid job settings in {}", settings.display()))?;
            let owner = owner
                .or(config.owner_id.clone())
                .context("No owner id: pass --owner or set owner_id in the config file")?;

            let job = client.create_job(&job_settings, &file.name, &owner).await?;
            println!("{}", job);
            if submit {
                client.submit_job(&job).await?;
                println!("Submitted {}", job);
            }
        }
        Commands::Submit { job_id } => {
            client.submit_job(&JobHandle::new(job_id)).await?;
        }
        Commands::Status { job_ids } => {
            let jobs: Vec<JobHandle> = job_ids.into_iter().map(JobHandle::from).collect();
            for properties in client.get_jobs_properties(&jobs).await? {
                print_properties(&properties);
            }
        }
        Commands::Progress { job_id } => {
            let progress = client.get_job_progress(&JobHandle::new(job_id)).await?;
            println!("{} {}% {}", progress.state, progress.progress, progress.step);
        }
        Commands::Watch { job_id, interval } => {
            let bar = ProgressBar::new(100);
            bar.set_style(ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] [{bar:40}] {pos}% {msg}",
            )?);

            let last = client
                .poll_until_complete(
                    &JobHandle::new(job_id),
                    Duration::from_secs(interval),
                    |progress| {
                        bar.set_position(progress.progress as u64);
                        bar.set_message(format!("{} {}", progress.state, progress.step));
                    },
                )
                .await?;
            bar.finish_with_message(last.state.to_string());
        }
        Commands::Cancel { job_id, yes } => {
            if yes || confirm(&format!("Cancel job {}?", job_id))? {
                client.cancel_job(&JobHandle::new(job_id)).await?;
            }
        }
        Commands::Delete { job_id, yes } => {
            if yes || confirm(&format!("Delete job {}?", job_id))? {
                client.delete_job(&JobHandle::new(job_id)).await?;
            }
        }
        Commands::Estimate {
            job_id,
            giga_pixels,
            mega_points,
            mesh_quality,
        } => {
            let parameters = CostParameters {
                giga_pixels,
                mega_points,
                mesh_quality,
            };
            let estimation = client
                .estimate_cost(&JobHandle::new(job_id), &parameters)
                .await?;
            match estimation.estimated_units.or(estimation.estimated_cost) {
                Some(cost) => println!("Estimated cost: {}", cost),
                None => println!("No estimate returned"),
            }
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn print_properties(properties: &JobProperties) {
    println!("{} ({})", properties.name, properties.id);
    println!("  type:    {}", properties.kind);
    println!("  state:   {}", properties.state);
    if let Some(created) = &properties.created_date_time {
        println!("  created: {}", created);
    }
    if let Some(ended) = &properties.ended_date_time {
        println!("  ended:   {}", ended);
    }
    if let Some(units) = properties.estimated_units {
        println!("  cost:    {}", units);
    }
    for (slot, id) in properties.settings.inputs() {
        println!("  input  {}: {}", slot, id);
    }
    for (slot, id) in properties.settings.outputs() {
        println!("  output {}: {}", slot, id);
    }
    for (spec, value) in properties.settings.options() {
        if !value.is_default() {
            println!("  option {}: {}", spec.name, value);
        }
    }
    for error in &properties.errors {
        println!("  error   {}: {}", error.code, error.message);
    }
    for warning in &properties.warnings {
        println!("  warning {}: {}", warning.code, warning.message);
    }
}
