use clap::{Parser, Subcommand};
use survey_align::{
    io::{read_alignment_json, read_to_string},
    Alignment, AlignmentPlacementResolver, BasisCurve, EvaluationSettings, OffsetCurveByDistances,
    OffsetFrame, OffsetProfile, PointAddress,
};

/// Evaluate alignment placements from JSON alignment descriptions.
#[derive(Parser)]
#[command(name = "survey_align_cli", version)]
struct Cli {
    /// JSON file with evaluation settings
    #[arg(long, global = true)]
    settings: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the 4x4 placement at a station, one matrix row per line.
    Point {
        path: String,
        #[arg(allow_negative_numbers = true)]
        station: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lateral: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        vertical: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        longitudinal: f64,
        /// Measure offsets in the level section instead of the canted one
        #[arg(long)]
        level_offsets: bool,
        /// JSON offset profile applied before the point offsets
        #[arg(long)]
        offset_profile: Option<String>,
    },
    /// Print station,x,y,z rows at a fixed interval.
    Sample {
        path: String,
        #[arg(long, allow_negative_numbers = true)]
        start: f64,
        #[arg(long, allow_negative_numbers = true)]
        end: f64,
        #[arg(long)]
        interval: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lateral: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        vertical: f64,
        #[arg(long)]
        offset_profile: Option<String>,
    },
    /// Print elevation, gradient and roll at a station.
    Profile {
        path: String,
        #[arg(allow_negative_numbers = true)]
        station: f64,
    },
    /// Validate an alignment description and print its station domain.
    Check { path: String },
}

fn init_logging() {
    if let Ok(path) = std::env::var("SURVEY_ALIGN_LOG") {
        match std::fs::File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", path, e);
                env_logger::Builder::from_default_env().init();
            }
        }
    } else {
        env_logger::Builder::from_default_env().init();
    }
}

fn load_settings(path: Option<&str>) -> Result<EvaluationSettings, String> {
    match path {
        Some(path) => EvaluationSettings::load(path).map_err(|e| format!("Error reading {}: {}", path, e)),
        None => Ok(EvaluationSettings::default()),
    }
}

fn load_alignment(path: &str, settings: EvaluationSettings) -> Result<Alignment, String> {
    let description = read_alignment_json(path).map_err(|e| format!("Error reading {}: {}", path, e))?;
    let alignment = description
        .build(settings)
        .map_err(|e| format!("Error in {}: {}", path, e))?;
    log::info!("loaded alignment from {} over {:?}", path, alignment.domain());
    Ok(alignment)
}

fn load_profile(path: &str) -> Result<OffsetProfile, String> {
    let contents = read_to_string(path).map_err(|e| format!("Error reading {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Error in {}: {}", path, e))
}

/// The alignment itself, or a curve offset from it by a profile.
fn basis<'a>(
    alignment: &'a Alignment,
    profile: Option<OffsetProfile>,
) -> Box<dyn BasisCurve + 'a> {
    match profile {
        Some(profile) => Box::new(OffsetCurveByDistances::new(alignment, profile)),
        None => Box::new(alignment),
    }
}

fn format_domain((start, end): (f64, f64)) -> String {
    format!("[{:.3}, {:.3}]", start, end)
}

/// Upper bound on the rows one `sample` call prints.
const MAX_SAMPLES: usize = 1_000_000;

fn sample_stations(start: f64, end: f64, interval: f64) -> Result<Vec<f64>, String> {
    if !(interval > 0.0) || !start.is_finite() || !end.is_finite() || end < start {
        return Err(format!(
            "Invalid sampling range {} to {} every {}",
            start, end, interval
        ));
    }
    let steps = ((end - start) / interval + 1e-9).floor();
    if steps >= MAX_SAMPLES as f64 {
        return Err(format!(
            "Sampling {} to {} every {} exceeds {} stations",
            start, end, interval, MAX_SAMPLES
        ));
    }
    let count = steps as usize;
    let mut out: Vec<f64> = (0..=count).map(|i| start + i as f64 * interval).collect();
    if out.last().is_some_and(|s| end - s > 1e-9) {
        out.push(end);
    }
    Ok(out)
}

fn run(cli: Cli) -> Result<(), String> {
    let settings = load_settings(cli.settings.as_deref())?;
    let resolver = AlignmentPlacementResolver::new(settings);
    match cli.command {
        Commands::Point {
            path,
            station,
            lateral,
            vertical,
            longitudinal,
            level_offsets,
            offset_profile,
        } => {
            let alignment = load_alignment(&path, settings)?;
            let profile = offset_profile.as_deref().map(load_profile).transpose()?;
            let curve = basis(&alignment, profile);
            let frame = if level_offsets {
                OffsetFrame::Horizontal
            } else {
                OffsetFrame::CrossSection
            };
            let address = PointAddress::at(station)
                .with_lateral(lateral)
                .with_vertical(vertical)
                .with_longitudinal(longitudinal)
                .with_offset_frame(frame);
            let m = resolver
                .resolve(curve.as_ref(), &address)
                .map_err(|e| format!("Error at station {}: {}", station, e))?;
            for row in 0..4 {
                println!(
                    "{:.6} {:.6} {:.6} {:.6}",
                    m[(row, 0)],
                    m[(row, 1)],
                    m[(row, 2)],
                    m[(row, 3)]
                );
            }
        }
        Commands::Sample {
            path,
            start,
            end,
            interval,
            lateral,
            vertical,
            offset_profile,
        } => {
            let alignment = load_alignment(&path, settings)?;
            let profile = offset_profile.as_deref().map(load_profile).transpose()?;
            let curve = basis(&alignment, profile);
            let stations = sample_stations(start, end, interval)?;
            for station in stations {
                let address = PointAddress::at(station)
                    .with_lateral(lateral)
                    .with_vertical(vertical);
                let frame = resolver
                    .resolve_frame(curve.as_ref(), &address)
                    .map_err(|e| format!("Error at station {}: {}", station, e))?;
                println!(
                    "{:.3},{:.3},{:.3},{:.3}",
                    station, frame.origin.x, frame.origin.y, frame.origin.z
                );
            }
        }
        Commands::Profile { path, station } => {
            let alignment = load_alignment(&path, settings)?;
            let state = alignment
                .state_at(station)
                .map_err(|e| format!("Error at station {}: {}", station, e))?;
            println!("Elevation: {:.3}", state.vertical.elevation);
            println!("Gradient: {:.5}", state.vertical.gradient);
            println!("Roll: {:.6}", state.roll());
        }
        Commands::Check { path } => {
            let alignment = load_alignment(&path, settings)?;
            println!(
                "Horizontal: {} segment(s) over {}",
                alignment.horizontal().function().len(),
                format_domain(alignment.domain())
            );
            if let Some(vertical) = alignment.vertical() {
                println!(
                    "Vertical: {} segment(s) over {}",
                    vertical.function().len(),
                    format_domain(vertical.domain())
                );
            }
            if let Some(cant) = alignment.cant() {
                println!(
                    "Cant: {} segment(s) over {}",
                    cant.function().len(),
                    format_domain(cant.domain())
                );
            }
        }
    }
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
