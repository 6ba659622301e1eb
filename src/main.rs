//! # Minuta CLI
//!
//! Usage:
//!   minuta visit.json
//!   minuta visit.json -o report.pdf --options layout.json --logo logo.png
//!   echo '{ ... }' | minuta -o report.pdf
//!   minuta --example > visit.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use base64::Engine;
use clap::{ArgAction, Parser};
use minuta::{LayoutOptions, MinutaError, ReportInput};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Render a service-visit report ("minuta") to PDF.
#[derive(Parser, Debug)]
#[command(name = "minuta")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report JSON file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output PDF path. Defaults to Minuta_<site>.pdf
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout options JSON file
    #[arg(long)]
    options: Option<PathBuf>,

    /// Header logo image (PNG or JPEG), overrides the options file
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Print the laid-out instruction stream as JSON instead of writing a PDF
    #[arg(long, action = ArgAction::SetTrue)]
    dump_layout: bool,

    /// Print a webmail compose link after writing the PDF
    #[arg(long, action = ArgAction::SetTrue)]
    mail: bool,

    /// Print an example report document and exit
    #[arg(long, action = ArgAction::SetTrue)]
    example: bool,

    /// Print the default layout options and exit
    #[arg(long, action = ArgAction::SetTrue)]
    example_options: bool,

    /// Use debug logging level
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "minuta=debug" } else { "minuta=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), MinutaError> {
    if args.example {
        print!("{}", example_report_json());
        return Ok(());
    }
    if args.example_options {
        let json = serde_json::to_string_pretty(&LayoutOptions::default())
            .map_err(|e| MinutaError::Render(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    let input_json = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let mut doc: Value = serde_json::from_str(&input_json)?;
    inline_image_files(&mut doc)?;
    let input: ReportInput = serde_json::from_value(doc)?;

    let mut options = match &args.options {
        Some(path) => {
            let mut doc: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            inline_image_files(&mut doc)?;
            serde_json::from_value(doc)?
        }
        None => LayoutOptions::default(),
    };
    if let Some(logo) = &args.logo {
        options.logo = Some(fs::read(logo)?);
    }

    if args.dump_layout {
        println!("{}", minuta::dump_layout(&input, &options)?);
        return Ok(());
    }

    let pdf_bytes = minuta::render(&input, &options)?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(minuta::output_file_name(&input.site)));
    fs::write(&output_path, &pdf_bytes)?;
    eprintln!(
        "✓ Written {} bytes to {}",
        pdf_bytes.len(),
        output_path.display()
    );

    if args.mail {
        println!("{}", minuta::mail::compose_url(&input, &options));
    }
    Ok(())
}

/// Replace image fields that name local files (`/`, `./` or `../`) with the
/// file contents as base64. The library itself only accepts inline images.
fn inline_image_files(doc: &mut Value) -> Result<(), MinutaError> {
    if let Some(photos) = doc.get_mut("photos").and_then(Value::as_array_mut) {
        for photo in photos {
            if let Some(image) = photo.get_mut("image") {
                inline_file(image)?;
            }
        }
    }
    for key in ["technicianSignature", "responsibleSignature", "logo"] {
        if let Some(field) = doc.get_mut(key) {
            inline_file(field)?;
        }
    }
    Ok(())
}

fn inline_file(field: &mut Value) -> Result<(), MinutaError> {
    let Some(src) = field.as_str().map(|s| s.trim().to_string()) else {
        return Ok(());
    };
    let is_path = src.starts_with('/') || src.starts_with("./") || src.starts_with("../");
    // Raw base64 JPEG data also starts with "/9j/".
    if !is_path || minuta::image_loader::read_source_bytes(&src).is_ok() {
        return Ok(());
    }
    let bytes = fs::read(&src).map_err(|e| MinutaError::Image {
        label: src.clone(),
        message: format!("Failed to read image file: {}", e),
    })?;
    debug!(path = %src, len = bytes.len(), "inlined image file");
    *field = Value::String(base64::engine::general_purpose::STANDARD.encode(bytes));
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "site": "Mall Plaza Vespucio",
  "technician": "Camila Rojas",
  "responsible": "Pedro Soto",
  "date": "2024-03-05",
  "description": "Mantención preventiva del tablero eléctrico principal. Se reapretaron conexiones, se limpiaron contactos y se reemplazaron dos luminarias del pasillo de servicio.",
  "observations": "Se recomienda revisar la humedad en el muro norte de la sala eléctrica.",
  "photos": [
    {
      "image": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==",
      "caption": "Tablero principal"
    }
  ],
  "technicianSignature": null,
  "responsibleSignature": null
}
"##
}
