// crates/dashview-viewer/src/main.rs
//
// Headless front end: list the events in a folder, optionally play them all
// through on the simulated backend, optionally delete every clip.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use dashview_core::helpers::time::format_clock;
use dashview_core::PlaybackSpeed;
use dashview_media::SimBackend;
use dashview_viewer::helpers::log::init_logging;
use dashview_viewer::{Viewer, ViewerConfig, ViewerNotice};

#[derive(Parser, Debug)]
#[command(name = "dashview", version, about = "Browse multi-camera dashcam recordings")]
struct Args {
    /// Folder to scan (recursively) for clips.
    folder: PathBuf,

    /// JSON config file. Defaults to the per-user config if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the catalog as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Play every event through on a virtual clock, printing transitions.
    #[arg(long)]
    play: bool,

    /// Playback speed for --play (0.25, 0.5, 1, 2, 5, 10 or 20).
    #[arg(long)]
    speed: Option<f32>,

    /// Virtual seconds per sampler tick for --play. Defaults to the sample interval.
    #[arg(long)]
    step: Option<f64>,

    /// Simulated clip length in seconds for --play.
    #[arg(long, default_value_t = 60.0)]
    clip_secs: f64,

    /// Delete every clip in the catalog. Requires --yes.
    #[arg(long)]
    delete_all: bool,

    #[arg(long)]
    yes: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = ViewerConfig::load_or_default(args.config.as_deref());
    init_logging(loaded.as_ref().map_or(false, |c| c.log_to_file));
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("[config] {e:#}; using defaults");
        ViewerConfig::default()
    });
    if let Some(s) = args.speed {
        config.initial_speed = PlaybackSpeed::try_from(s)?;
    }

    if !(args.clip_secs.is_finite() && args.clip_secs > 0.0) {
        bail!("--clip-secs must be a positive number of seconds");
    }
    let backend = SimBackend::new(args.clip_secs);
    let mut viewer = Viewer::new(backend.clone(), config);
    let found = viewer
        .open_folder_blocking(&args.folder)
        .with_context(|| format!("opening {}", args.folder.display()))?;
    if found == 0 {
        println!("No recordings found in {}", args.folder.display());
        return Ok(());
    }

    print_catalog(&viewer, args.json)?;

    if args.play {
        play_through(&mut viewer, &backend, args.step)?;
    }

    if args.delete_all {
        if !args.yes {
            bail!("--delete-all removes every clip listed above; pass --yes to confirm");
        }
        delete_all(&mut viewer)?;
    }
    Ok(())
}

fn print_catalog(viewer: &Viewer<SimBackend>, json: bool) -> Result<()> {
    let catalog = viewer.catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.events())?);
        return Ok(());
    }
    println!("{} event(s), {} clip(s)", catalog.len(), catalog.clip_count());
    for (i, event) in catalog.events().iter().enumerate() {
        let angles: Vec<&str> = event.angles().map(|a| a.label()).collect();
        println!(
            "{:>4}  {}  {:<24} {}",
            i + 1,
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.name,
            angles.join(", "),
        );
    }
    Ok(())
}

fn play_through(viewer: &mut Viewer<SimBackend>, backend: &SimBackend, step: Option<f64>) -> Result<()> {
    let step = step.unwrap_or_else(|| viewer.config().sample_interval().as_secs_f64());
    if !step.is_finite() || step <= 0.0 {
        bail!("--step must be a positive number of seconds");
    }
    let controller = viewer.controller_mut();
    if controller.user_speed().rate() == 0.0 {
        bail!("cannot play at 0x");
    }

    let rx = controller.subscribe();
    controller.play();
    let mut shown = None;
    let mut virtual_secs = 0.0;

    while controller.is_playing() {
        backend.advance(step);
        virtual_secs += step;
        controller.sample();

        for snap in rx.try_iter() {
            if snap.event_index != shown && snap.event_index.is_some() {
                shown = snap.event_index;
                println!(
                    "[{}] {}  {}  angles: {}",
                    format_clock(virtual_secs),
                    snap.title,
                    snap.event_name.as_deref().unwrap_or("-"),
                    snap.active_angles.iter().map(|a| a.label()).collect::<Vec<_>>().join(", "),
                );
            }
        }
    }
    println!("Finished after {} of virtual time", format_clock(virtual_secs));
    Ok(())
}

fn delete_all(viewer: &mut Viewer<SimBackend>) -> Result<()> {
    if viewer.delete_all_backing_files().is_none() {
        println!("Nothing to delete");
        return Ok(());
    }
    while viewer.is_busy() {
        viewer.wait(Duration::from_millis(250));
    }
    for notice in viewer.take_notices() {
        if let ViewerNotice::DeletionFinished { report } = notice {
            println!("Deleted {}/{} file(s)", report.deleted, report.attempted());
            for (path, err) in &report.failures {
                println!("  failed: {}: {err}", path.display());
            }
        }
    }
    Ok(())
}
