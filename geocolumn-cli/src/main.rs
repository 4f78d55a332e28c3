use anyhow::Result;
use geocolumn_core::{CsvTable, GeocodeConfig, GeocodeContext, GeocodeJob, ProgressEvent};
use std::time::Duration;

mod cli;

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let table = CsvTable::load(&args.input)?;

    if args.list_columns {
        for header in table.headers() {
            println!("{}", header);
        }
        return Ok(());
    }

    let config = GeocodeConfig {
        api_key_path: args.api_key_file.clone(),
        request_timeout: Duration::from_secs(args.timeout_secs),
        ..GeocodeConfig::default()
    };

    // Credential problems are fatal before any processing starts
    log::debug!("Reading API key from {}", config.api_key_path.display());
    let context = GeocodeContext::from_config(config)?;

    let job = GeocodeJob::start(&context, Some(&table), args.column.as_deref())?;

    let mut write_error = None;
    while let Some(event) = job.next_event() {
        match event {
            ProgressEvent::Started { total } => {
                println!("Processing {} values...", total);
            }
            ProgressEvent::Row(progress) => {
                println!("{}", progress.line());
            }
            ProgressEvent::Finished {
                output_path,
                total,
                failed,
                not_found,
            } => {
                println!("\nProcessing complete!");
                println!(
                    "{} values ({} failed, {} without result) saved to {}",
                    total,
                    failed,
                    not_found,
                    output_path.display()
                );
            }
            ProgressEvent::WriteFailed { message } => {
                write_error = Some(message);
            }
        }
    }
    job.join();

    if let Some(message) = write_error {
        anyhow::bail!(message);
    }

    Ok(())
}
