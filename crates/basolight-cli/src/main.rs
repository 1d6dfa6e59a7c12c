use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use basolight_core::models::{HighlightOptions, RedGate};
use basolight_core::{config, decoders, exporters, pipeline};

#[derive(Parser)]
#[command(name = "basolight")]
#[command(version, about = "Basophilic structure highlighter for stained micrographs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight basophilic structures (nuclei, basophils) in a stained image
    Highlight {
        /// Input image (PNG or TIFF; JPEG is not supported)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (defaults to <input>_highlighted.png)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Highlight config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the purple-qualification threshold
        #[arg(long, value_name = "FLOAT")]
        threshold: Option<f32>,

        /// Override the amplification factor
        #[arg(long, value_name = "FLOAT")]
        intensity: Option<f32>,

        /// Require red >= N instead of the literal nonzero red gate
        #[arg(long, value_name = "N")]
        red_floor: Option<u8>,

        /// Also print the pixel count of the decoded image
        #[arg(long)]
        count: bool,

        /// Enable debug output showing verdict statistics
        #[arg(long)]
        debug: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Count the pixels of an image and print a summary
    Count {
        /// Input image (PNG or TIFF; JPEG is not supported)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Short description of the image (e.g. "blood smear", "Gram stain")
        #[arg(long, value_name = "TEXT")]
        about: Option<String>,

        /// Save the count report to a JSON file
        #[arg(short, long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Highlight {
            input,
            out,
            config,
            threshold,
            intensity,
            red_floor,
            count,
            debug,
            verbose,
        } => cmd_highlight(
            input, out, config, threshold, intensity, red_floor, count, debug, verbose,
        ),

        Commands::Count { input, about, save } => cmd_count(input, about, save),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_highlight(
    input: PathBuf,
    out: Option<PathBuf>,
    config_path: Option<PathBuf>,
    threshold: Option<f32>,
    intensity: Option<f32>,
    red_floor: Option<u8>,
    count: bool,
    debug: bool,
    verbose: bool,
) -> Result<(), String> {
    config::set_verbose(verbose);

    println!("Highlighting {}...", input.display());

    // Resolve configuration, then apply command-line overrides. An explicit
    // --config path bypasses the process-wide handle; otherwise the config
    // is loaded once and shared.
    let mut profile = match &config_path {
        Some(path) => {
            let handle = config::load_highlight_config(Some(path));
            if let Some(source) = &handle.source {
                basolight_core::verbose_println!(
                    "[basolight] Loaded config from {}",
                    source.display()
                );
            }
            for warning in &handle.warnings {
                basolight_core::verbose_println!("[basolight] Config warning: {}", warning);
            }
            handle.config.defaults.to_profile()
        }
        None => {
            config::log_config_usage();
            config::highlight_config_handle().config.defaults.to_profile()
        }
    };
    if let Some(t) = threshold {
        profile.intensity_threshold = t;
    }
    if let Some(i) = intensity {
        profile.new_intensity = i;
    }
    if let Some(floor) = red_floor {
        profile.red_gate = RedGate::Floor(floor);
    }

    // Decode once; the same in-memory image serves counting and highlighting
    println!("Decoding image...");
    let mut decoded = decoders::decode_image(&input)?;
    println!(
        "  Image: {}x{}, {} channels",
        decoded.width, decoded.height, decoded.channels
    );

    if count {
        println!("  Pixels: {}", pipeline::count_pixels(&decoded));
    }

    let options = HighlightOptions { profile, debug };
    let stats = pipeline::highlight_image(&mut decoded, &options)?;
    println!(
        "  Basophilic: {} pixels, grayscaled: {}, unchanged: {}",
        stats.basophilic, stats.bright_non_purple, stats.unclassified
    );

    let output_path = determine_output_path(&input, &out)?;
    exporters::export_png(&decoded, &output_path)?;

    println!(
        "Done! Highlighted image saved to: {}",
        output_path.display()
    );
    Ok(())
}

/// JSON report written by `count --save`
#[derive(Serialize)]
struct CountReport {
    input: String,
    width: u32,
    height: u32,
    pixels: u64,
    about: Option<String>,
}

fn cmd_count(
    input: PathBuf,
    about: Option<String>,
    save: Option<PathBuf>,
) -> Result<(), String> {
    let decoded = decoders::decode_image(&input)?;
    let pixels = pipeline::count_pixels(&decoded);

    match &about {
        Some(description) => println!(
            "There are {} pixels in the {} image you chose.",
            pixels, description
        ),
        None => println!("There are {} pixels in {}.", pixels, input.display()),
    }

    if let Some(save_path) = save {
        let report = CountReport {
            input: input.display().to_string(),
            width: decoded.width,
            height: decoded.height,
            pixels,
            about,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize count report: {}", e))?;
        std::fs::write(&save_path, json)
            .map_err(|e| format!("Failed to write count report file: {}", e))?;
        println!("Count report saved to: {}", save_path.display());
    }

    Ok(())
}

/// Determine output path based on input and optional output argument
fn determine_output_path(input: &Path, out: &Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(out_path) = out {
        // If out is a directory, use input filename with the default suffix
        if out_path.is_dir() {
            let filename = input
                .file_stem()
                .ok_or("Invalid input filename")?
                .to_string_lossy();
            Ok(out_path.join(format!("{}_highlighted.png", filename)))
        } else {
            Ok(out_path.clone())
        }
    } else {
        let filename = input
            .file_stem()
            .ok_or("Invalid input filename")?
            .to_string_lossy();
        let parent = input.parent().unwrap_or(Path::new("."));
        Ok(parent.join(format!("{}_highlighted.png", filename)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_defaults_next_to_input() {
        let path = determine_output_path(Path::new("images/smear.png"), &None).unwrap();
        assert_eq!(path, PathBuf::from("images/smear_highlighted.png"));
    }

    #[test]
    fn test_output_path_explicit_file_wins() {
        let out = Some(PathBuf::from("out/result.png"));
        let path = determine_output_path(Path::new("smear.tif"), &out).unwrap();
        assert_eq!(path, PathBuf::from("out/result.png"));
    }
}
