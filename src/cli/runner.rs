use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use polarpro::{AttributeCategory, AttributeDirectory, PolarImage, RenderParams};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Parameters from `--params` (or defaults), with explicit flags applied on top.
fn resolve_params(args: &CliArgs) -> Result<RenderParams, AppError> {
    let mut params = match &args.params {
        Some(path) => {
            info!("Loading render parameters from {:?}", path);
            RenderParams::load(path)?
        }
        None => RenderParams::default(),
    };

    if args.orient {
        params.orient = true;
    }
    if args.toggle_direction {
        params.toggle_direction = true;
    }
    if args.blind_range {
        params.blind_range = true;
    }
    if args.heading {
        params.heading_from_header = true;
    }
    if let Some(fill) = args.fill {
        params.fill = fill;
    }
    if args.pixel_size.is_some() {
        params.pixel_size = args.pixel_size;
    }
    if let Some(rotation) = args.rotation {
        params.rotation_deg = rotation;
    }
    params.validate()?;
    Ok(params)
}

fn resolve_directory(args: &CliArgs) -> Result<Option<AttributeDirectory>, AppError> {
    match &args.directory {
        Some(path) => Ok(Some(AttributeDirectory::load(path)?)),
        None => Ok(None),
    }
}

fn print_header(image: &PolarImage, directory: &AttributeDirectory) {
    println!("{:?}", image.source().unwrap_or(Path::new("<memory>")));
    println!(
        "{} azimuths x {} ranges, {}, {}",
        image.grid().azimuth_count(),
        image.grid().range_count(),
        image.grid().bit_depth(),
        image.layout().byte_order
    );

    for category in AttributeCategory::ALL {
        let mut attributes = image
            .header()
            .iter()
            .filter(|a| directory.category(&a.name) == category)
            .peekable();
        if attributes.peek().is_none() {
            continue;
        }
        println!("\n[{}]", category);
        for attribute in attributes {
            if attribute.description.is_empty() {
                println!("  {:<8} = {}", attribute.name, attribute.raw);
            } else {
                println!(
                    "  {:<8} = {:<24} {}",
                    attribute.name, attribute.raw, attribute.description
                );
            }
            if let Some(note) = &attribute.note {
                println!("  {:<8}   # {}", "", note);
            }
        }
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    if args.input.is_some() && args.input_dir.is_some() {
        return Err(AppError::ConflictingArguments {
            first: "--input".to_string(),
            second: "--input-dir".to_string(),
        }
        .into());
    }

    let custom_directory = resolve_directory(&args)?;
    let directory = match &custom_directory {
        Some(directory) => directory,
        None => AttributeDirectory::builtin(),
    };

    if args.inspect {
        let input = args.input.as_ref().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let image = polarpro::decode_with_directory(input, directory)?;
        print_header(&image, directory);
        return Ok(());
    }

    let params = resolve_params(&args)?;

    if let Some(input_dir) = &args.input_dir {
        let output_dir = args.output_dir.as_ref().ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = polarpro::process_directory_to_path(
            input_dir,
            output_dir,
            &params,
            directory,
            args.sidecar,
            args.continue_on_error,
        )?;

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
        if report.errors > 0 {
            warn!("{} capture(s) failed", report.errors);
            return Err(AppError::BatchFailures {
                errors: report.errors,
            }
            .into());
        }
    } else {
        let input = args.input.as_ref().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| polarpro::default_output_path(input));

        polarpro::process_file_to_path(input, &output, &params, directory, args.sidecar)?;
        info!("Successfully processed: {:?} -> {:?}", input, output);
    }

    Ok(())
}
