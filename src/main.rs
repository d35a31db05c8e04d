use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use clinicmap::config::{EnrichmentScope, FileConfig, ServiceConfig};
use clinicmap::search::DEFAULT_ZOOM;
use clinicmap::{DEFAULT_RADIUS_M, Facility, NearbySearch, Progress, Query, SearchOutcome};

/// Find clinics, hospitals and other healthcare facilities near a location
///
/// Examples:
///   # Clinics within 1km of a neighbourhood
///   clinicmap -l "Indiranagar, Bangalore"
///
///   # Wider search, custom output file
///   clinicmap -l "Koramangala, Bangalore" -r 3000 -o koramangala.html
///
///   # Enrich each facility by its own coordinates instead of the query text
///   clinicmap -l "Jayanagar, Bangalore" --enrichment-scope facility
///
///   # Print the facility list as JSON
///   clinicmap -l "Whitefield, Bangalore" --json
#[derive(Parser, Debug)]
#[command(name = "clinicmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches clinicmap.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Location to search around (address, neighbourhood, city)
    #[arg(short = 'l', long)]
    location: Option<String>,

    /// Search radius in meters [default: 1000]
    #[arg(short = 'r', long)]
    radius: Option<u32>,

    /// Output HTML map path (defaults to {location}.html or clinics.html)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Initial map zoom level [default: 15]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=19))]
    zoom: Option<u8>,

    /// Location used for directory lookups: the query text or each facility's coordinates
    #[arg(long)]
    enrichment_scope: Option<EnrichmentScope>,

    /// Skip directory enrichment entirely
    #[arg(long)]
    no_enrich: bool,

    /// Print the facility list as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let location = args
        .location
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.location.clone()));
    let radius = resolve_radius(args.radius, file_config.as_ref());
    let zoom = resolve_zoom(args.zoom, file_config.as_ref());
    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    let output = args
        .output
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()));

    init_logging(verbose);

    let mut services = file_config
        .as_ref()
        .and_then(|c| c.services.clone())
        .unwrap_or_default();
    services.apply_env();
    if args.no_enrich {
        services.directory.enabled = false;
    }
    if let Some(scope) = args.enrichment_scope {
        services.directory.scope = scope;
    }

    let Some(location) = location.filter(|l| !l.trim().is_empty()) else {
        bail!("Must provide a location with --location/-l or in the config file");
    };

    let output_path = output.unwrap_or_else(|| default_output_path(&location));
    let query = Query::new(location.trim(), Some(radius));

    if !args.json {
        println!("clinicmap - Nearby Healthcare Finder");
        println!("====================================");
        println!();
    }

    if verbose {
        print_configuration(&query, zoom, &services, &output_path);
    }

    let search = NearbySearch::new(services)
        .context("Failed to set up HTTP client")?
        .with_zoom(zoom);

    let mut spinner = create_spinner(&format!("Geocoding \"{}\"...", query.location));
    let mut stage_start = Instant::now();
    let result = search.run_with_progress(&query, |progress| match progress {
        Progress::Geocoded(origin) => {
            spinner.finish_with_message(format!(
                "Geocoded: {} -> ({}) [{:.1}s]",
                query.location,
                origin,
                stage_start.elapsed().as_secs_f32()
            ));
            spinner = create_spinner(&format!(
                "Searching for facilities within {}m...",
                query.radius_m
            ));
            stage_start = Instant::now();
        }
        Progress::FeaturesFetched(count) => {
            spinner.finish_with_message(format!(
                "Found {} healthcare features [{:.1}s]",
                count,
                stage_start.elapsed().as_secs_f32()
            ));
            spinner = create_spinner("Building facility list...");
            stage_start = Instant::now();
        }
        Progress::FacilityReady {
            index,
            total,
            facility,
        } => {
            spinner.set_message(format!("[{}/{}] {}", index + 1, total, facility.name));
        }
    });

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.abandon();
            return Err(e).context(format!("Search around \"{}\" failed", query.location));
        }
    };

    spinner.finish_with_message(format!(
        "Built {} facilities [{:.1}s]",
        outcome.facilities.len(),
        stage_start.elapsed().as_secs_f32()
    ));

    let title = format!("Healthcare near {}", query.location);
    outcome
        .map
        .write_html(&output_path, &title)
        .context("Failed to write map")?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.facilities)
            .context("Failed to serialize facilities")?;
        println!("{}", json);
        return Ok(());
    }

    println!();
    print_facilities(&outcome.facilities);
    if verbose {
        print_enrichment_summary(&outcome);
    }
    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Map: {}", output_path.display());

    Ok(())
}

/// Command line beats the config file, which beats the built-in default
fn resolve_radius(arg: Option<u32>, file: Option<&FileConfig>) -> u32 {
    arg.or_else(|| file.map(|c| c.radius))
        .unwrap_or(DEFAULT_RADIUS_M)
}

fn resolve_zoom(arg: Option<u8>, file: Option<&FileConfig>) -> u8 {
    arg.or_else(|| file.map(|c| c.zoom)).unwrap_or(DEFAULT_ZOOM)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "clinicmap=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_output_path(location: &str) -> PathBuf {
    let slug: String = location
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        PathBuf::from("clinics.html")
    } else {
        PathBuf::from(format!("{}.html", slug))
    }
}

fn print_configuration(query: &Query, zoom: u8, services: &ServiceConfig, output: &Path) {
    println!("Configuration:");
    println!("  Location: {}", query.location);
    println!("  Radius: {}m", query.radius_m);
    println!("  Zoom: {}", zoom);
    println!("  Geocoder: {}", services.nominatim_url);
    println!("  Overpass: {}", services.overpass_url);
    println!(
        "  Directory enrichment: {}",
        if services.directory.is_active() {
            format!("enabled ({:?} scope)", services.directory.scope)
        } else {
            "disabled".to_string()
        }
    );
    println!("  Output: {}", output.display());
    println!();
}

fn print_facilities(facilities: &[Facility]) {
    if facilities.is_empty() {
        println!("No clinics or hospitals found. Try increasing the radius with -r.");
        return;
    }

    println!("Nearby facilities ({}):", facilities.len());
    for (i, facility) in facilities.iter().enumerate() {
        println!();
        println!("  {}. {}", i + 1, facility.name);
        println!("     Address: {}", facility.address);
        println!("     Contact: {}", facility.contact);
        if facility.has_appointment_link() {
            println!("     Book:    {}", facility.appointment_link);
        }
    }
}

fn print_enrichment_summary(outcome: &SearchOutcome) {
    let summary = &outcome.enrichment;
    println!();
    println!(
        "Directory lookups ({}): {} found, {} empty, {} unavailable, {} malformed",
        summary.total(),
        summary.found,
        summary.empty,
        summary.unavailable,
        summary.malformed
    );
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("Indiranagar, Bangalore"),
            PathBuf::from("indiranagar_bangalore.html")
        );
        assert_eq!(default_output_path("  "), PathBuf::from("clinics.html"));
        assert_eq!(
            default_output_path("12.97, 77.59"),
            PathBuf::from("12_97_77_59.html")
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "clinicmap",
            "-l",
            "Jayanagar",
            "-r",
            "2500",
            "--enrichment-scope",
            "facility",
            "--no-enrich",
        ])
        .unwrap();

        assert_eq!(args.location.as_deref(), Some("Jayanagar"));
        assert_eq!(args.radius, Some(2500));
        assert_eq!(args.enrichment_scope, Some(EnrichmentScope::Facility));
        assert!(args.no_enrich);
        assert_eq!(args.zoom, None);
    }

    #[test]
    fn test_explicit_default_radius_beats_config_file() {
        let file: FileConfig = toml::from_str("radius = 2000\nzoom = 12").unwrap();

        let args = Args::try_parse_from(["clinicmap", "-r", "1000", "--zoom", "15"]).unwrap();
        assert_eq!(resolve_radius(args.radius, Some(&file)), 1000);
        assert_eq!(resolve_zoom(args.zoom, Some(&file)), 15);

        let args = Args::try_parse_from(["clinicmap"]).unwrap();
        assert_eq!(resolve_radius(args.radius, Some(&file)), 2000);
        assert_eq!(resolve_zoom(args.zoom, Some(&file)), 12);
        assert_eq!(resolve_radius(args.radius, None), DEFAULT_RADIUS_M);
        assert_eq!(resolve_zoom(args.zoom, None), DEFAULT_ZOOM);
    }
}
