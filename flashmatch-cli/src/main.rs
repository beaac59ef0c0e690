//! flashmatch CLI: Command-line interface for optical reconstruction.
//!
//! Finds optical hits in digitized waveforms, tags cosmic tracks against
//! beam flashes and assigns flash T0s to tracks.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};

use flashmatch_algorithms::{
    BeamFlashTagger, HitFinder, MatchCriteria, PhotonCounterMatcher, PulseFinder, SlidingWindow,
};
use flashmatch_core::Geometry;
use flashmatch_io::{
    read_visibility_library, DataFileWriter, EventRecord, OutputFormat, ReconstructionConfig,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    FlashmatchIo(#[from] flashmatch_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] flashmatch_core::Error),
}

/// T0 match ranking selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Criteria {
    /// Drift mismatch and YZ separation in quadrature
    Combined,
    /// YZ separation only
    YzSeparation,
    /// Drift mismatch only
    DeltaX,
}

impl From<Criteria> for MatchCriteria {
    fn from(criteria: Criteria) -> Self {
        match criteria {
            Criteria::Combined => Self::Combined,
            Criteria::YzSeparation => Self::YzSeparation,
            Criteria::DeltaX => Self::DeltaX,
        }
    }
}

/// Optical hit finding and beam-flash track matching.
#[derive(Parser)]
#[command(name = "flashmatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Reconstruction configuration (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use all cores
    #[arg(short, long, global = true)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find optical hits in the event's waveforms
    Hits {
        /// Input event file
        input: PathBuf,

        /// Output file path (.csv or .json)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Tag tracks that no beam flash can explain as cosmic
    Tag {
        /// Input event file
        input: PathBuf,

        /// Photon visibility library (JSON)
        #[arg(long)]
        visibility: PathBuf,

        /// Output file path (.csv or .json)
        #[arg(short, long)]
        output: PathBuf,

        /// Log every track/flash comparison
        #[arg(long)]
        debug: bool,
    },

    /// Assign flash T0s to tracks with hit timing
    MatchT0 {
        /// Input event file
        input: PathBuf,

        /// Output file path (.csv or .json)
        #[arg(short, long)]
        output: PathBuf,

        /// Override the configured ranking
        #[arg(long, value_enum)]
        criteria: Option<Criteria>,
    },

    /// Show information about an event file
    Info {
        /// Input event file
        input: PathBuf,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn load_config(path: Option<&Path>) -> Result<ReconstructionConfig> {
    let config = match path {
        Some(path) => {
            log::info!("Reading configuration: {}", path.display());
            ReconstructionConfig::from_file(path)?
        }
        None => ReconstructionConfig::default(),
    };
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Hits { input, output } => {
            let start = Instant::now();
            let event = EventRecord::from_file(&input)?;

            let pulse_finder = SlidingWindow::new(config.pulse.clone());
            log::debug!("Pulse finder: {}", pulse_finder.name());
            let finder = HitFinder::new(
                pulse_finder,
                &config.detector,
                &config.clock,
                &config.calibration,
                config.hit.clone(),
            );
            let hits = if cli.parallel {
                finder.find_hits_par(&event.waveforms)?
            } else {
                finder.find_hits(&event.waveforms)?
            };

            let mut writer = DataFileWriter::create(&output)?;
            match OutputFormat::from_path(&output) {
                OutputFormat::Csv => writer.write_hits_csv(&hits)?,
                OutputFormat::Json => writer.write_json(&hits)?,
            }

            println!(
                "Processed {} waveforms in {:.2}s",
                event.waveforms.len(),
                start.elapsed().as_secs_f64()
            );
            println!("Total hits: {}", hits.len());
        }

        Commands::Tag {
            input,
            visibility,
            output,
            debug,
        } => {
            let start = Instant::now();
            let event = EventRecord::from_file(&input)?;
            let library = read_visibility_library(
                &visibility,
                Some(config.detector.optical_channel_count()),
            )?;

            config.tagger.debug |= debug;
            let tagger = BeamFlashTagger::new(config.tagger.clone());
            let tags = if cli.parallel {
                tagger.tag_tracks_par(&event.tracks, &event.flashes, &config.detector, &library)
            } else {
                tagger.tag_tracks(&event.tracks, &event.flashes, &config.detector, &library)
            };

            let mut writer = DataFileWriter::create(&output)?;
            match OutputFormat::from_path(&output) {
                OutputFormat::Csv => writer.write_tags_csv(&tags)?,
                OutputFormat::Json => writer.write_json(&tags)?,
            }

            let cosmic = tags.iter().filter(|t| t.tag.is_cosmic()).count();
            println!(
                "Tagged {} of {} tracks in {:.2}s",
                tags.len(),
                event.tracks.len(),
                start.elapsed().as_secs_f64()
            );
            println!("Cosmic: {}", cosmic);
            println!("Beam compatible: {}", tags.len() - cosmic);
        }

        Commands::MatchT0 {
            input,
            output,
            criteria,
        } => {
            let event = EventRecord::from_file(&input)?;
            if let Some(criteria) = criteria {
                config.t0.match_criteria = criteria.into();
            }

            let matcher = PhotonCounterMatcher::new(config.t0.clone());
            let t0s = if cli.parallel {
                matcher.match_tracks_par(&event.tracks, &event.flashes)
            } else {
                matcher.match_tracks(&event.tracks, &event.flashes)
            };

            let mut writer = DataFileWriter::create(&output)?;
            match OutputFormat::from_path(&output) {
                OutputFormat::Csv => writer.write_t0s_csv(&t0s)?,
                OutputFormat::Json => writer.write_json(&t0s)?,
            }

            println!("Matched {} of {} tracks", t0s.len(), event.tracks.len());
        }

        Commands::Info { input } => {
            let event = EventRecord::from_file(&input)?;

            println!("File: {}", input.display());
            println!("Waveforms: {}", event.waveforms.len());
            println!("Samples: {}", event.total_samples());
            let mut channels: Vec<u32> = event.waveforms.iter().map(|w| w.channel).collect();
            channels.sort_unstable();
            channels.dedup();
            if let (Some(lo), Some(hi)) = (channels.first(), channels.last()) {
                println!("Channels: {} ({} - {})", channels.len(), lo, hi);
            }

            println!("Tracks: {}", event.tracks.len());
            let timed = event.tracks.iter().filter(|t| t.timing().is_some()).count();
            println!("Tracks with timing: {}", timed);

            println!("Flashes: {}", event.flashes.len());
            let on_beam = event.flashes.iter().filter(|f| f.on_beam_time).count();
            println!("Flashes on beam time: {}", on_beam);
            if let Some((lo, hi)) = event.flash_time_range() {
                println!("Flash time range: {} - {} us", lo, hi);
            }
        }

        Commands::Config => {
            println!("{}", config.to_json()?);
        }
    }

    Ok(())
}
