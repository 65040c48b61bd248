use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{MapError, Result};
use crate::models::{MapView, ViewOutcome};
use crate::processors::{load_validated, view_from_dataset, ValidationOutcome, ViewOptions};
use crate::server;
use crate::utils::generate_default_html_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::no_results_message;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Serve { input, host, port } => {
            if let Some(path) = input {
                config.input.path = path;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            println!("Input file: {}", config.input.path.display());
            server::start_server(config).await?;
        }

        Commands::Render {
            input,
            query,
            output,
        } => {
            let path = resolve_input(input, &config);
            let output_file = output.unwrap_or_else(generate_default_html_filename);

            let loaded = load_with_progress(&path, false)?;
            let options = ViewOptions {
                zoom: config.map.zoom,
            };

            match view_from_dataset(&loaded.dataset, &query, &options)? {
                ViewOutcome::NoResults => print_no_results(),
                ViewOutcome::Markers(view) => {
                    config
                        .map
                        .html_writer()
                        .write_static(&view, &query, &output_file)?;
                    println!(
                        "Map with {} markers written to {}",
                        view.marker_count(),
                        output_file.display()
                    );
                }
            }
        }

        Commands::Search { input, query, json } => {
            let path = resolve_input(input, &config);

            let loaded = load_with_progress(&path, json)?;
            let options = ViewOptions {
                zoom: config.map.zoom,
            };

            match view_from_dataset(&loaded.dataset, &query, &options)? {
                ViewOutcome::NoResults if json => {
                    println!("{}", serde_json::json!({ "status": "no_results", "message": no_results_message() }));
                }
                ViewOutcome::NoResults => print_no_results(),
                ViewOutcome::Markers(view) if json => {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                }
                ViewOutcome::Markers(view) => print_matches(&view),
            }
        }

        Commands::Validate { input } => {
            let path = resolve_input(input, &config);

            let loaded = load_with_progress(&path, false)?;

            println!("\n{}", loaded.report.summary());
            if loaded.report.dropped_rows() == 0 {
                println!("✅ Every row has usable coordinates");
            } else {
                println!(
                    "⚠️  {} rows will not appear on the map",
                    loaded.report.dropped_rows()
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so `search --json` stays machine readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_with_progress(path: &Path, silent: bool) -> Result<ValidationOutcome> {
    let progress = ProgressReporter::new_spinner(&format!("Loading {}...", path.display()), silent);

    match load_validated(path) {
        Ok(outcome) => {
            progress.finish_with_message(&format!(
                "Loaded {} records ({} dropped)",
                outcome.dataset.len(),
                outcome.report.dropped_rows()
            ));
            Ok(outcome)
        }
        Err(e) => {
            progress.finish_and_clear();
            Err(e)
        }
    }
}

fn print_no_results() {
    println!("⚠️  {}", no_results_message());
}

fn print_matches(view: &MapView) {
    println!("{} matching records:", view.marker_count());
    for (i, marker) in view.markers.iter().enumerate() {
        let popup = &marker.popup;
        println!(
            "{}. {} | cuenta {} | {} | medidor {} ({}) | {}",
            i + 1,
            popup.name,
            popup.account,
            popup.municipality,
            popup.meter_number,
            popup.meter_brand,
            marker.link_url
        );
    }
}

/// Text printed on stderr when a command fails.
pub fn error_report(error: &MapError) -> String {
    if error.is_load_failure() {
        format!(
            "Error: {}\nCheck --input or input.path in the configuration.",
            error
        )
    } else {
        format!("Error: {}", error)
    }
}

/// Input flag first, then configuration
fn resolve_input(flag: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.input.path.clone())
}
