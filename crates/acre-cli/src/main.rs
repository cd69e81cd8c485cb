use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use acre_algo::{optimize, OptimizationRequest};
use acre_core::AcreResult;
use acre_io::{read_crop_profiles, read_interaction_rules, read_request, read_weather_series};

mod cli;
mod output;

use cli::{Cli, Commands, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Optimize {
            request,
            weather,
            profiles,
            rules,
            format,
        } => run_optimize(&request, &weather, profiles.as_deref(), rules.as_deref(), format),
        Commands::Validate { request } => run_validate(&request),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_request(path: &Path, rules: Option<&Path>) -> AcreResult<OptimizationRequest> {
    let mut request = read_request(path)?;
    if request.rules.is_empty() {
        if let Some(rules_path) = rules {
            request.rules = read_interaction_rules(rules_path)?;
        }
    }
    Ok(request)
}

fn run_optimize(
    request_path: &Path,
    weather_path: &Path,
    profiles_path: Option<&Path>,
    rules_path: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = load_request(request_path, rules_path)?;
    let weather = read_weather_series(weather_path)?;
    let profiles = match profiles_path {
        Some(path) => read_crop_profiles(path)?,
        None => Vec::new(),
    };

    info!(
        fields = request.fields.len(),
        crops = request.crops.len(),
        "optimizing {} to {}",
        request.horizon.start,
        request.horizon.end
    );

    let result = optimize(&request, &weather, &profiles)?;
    info!(
        allocations = result.solution.len(),
        algorithm = %result.algorithm,
        "finished in {} ms",
        result.elapsed_ms
    );

    match format {
        OutputFormat::Human => print!("{}", output::render_human(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn run_validate(request_path: &Path) -> anyhow::Result<()> {
    let request = load_request(request_path, None)?;
    request.config.validate()?;
    for field in &request.fields {
        field.validate()?;
    }
    for spec in &request.crops {
        if let Some(profile) = &spec.profile {
            profile.validate()?;
        }
    }
    println!(
        "ok: {} field(s), {} crop(s), horizon {} to {}",
        request.fields.len(),
        request.crops.len(),
        request.horizon.start,
        request.horizon.end
    );
    Ok(())
}
