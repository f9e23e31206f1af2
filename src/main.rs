mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use beatline::analysis::{analyze, Analysis};
use beatline::audio::decode::decode_audio;
use beatline::config::{self, Config};
use beatline::markers::Marker;
use beatline::session::{format_song_time, FrameState, PulseBeats};
use beatline::track::{Color, RibbonMesh};
use cli::{Cli, DEFAULT_RESOLUTION, DEFAULT_SMOOTHING, DEFAULT_WINDOW_SIZE};

#[derive(Serialize)]
struct Report<'a> {
    input: String,
    sample_rate: u32,
    channels: u16,
    duration: String,
    window_size: usize,
    slope_intensity: f32,
    control_points: &'a [Vec3],
    colors: &'a [Color],
    low_beats: &'a [usize],
    high_beats: &'a [usize],
    pulses: &'a PulseBeats,
    markers: &'a [Marker],
    total_points: u32,
    mesh: MeshSummary,
    frames: Vec<FrameReport>,
}

#[derive(Serialize)]
struct MeshSummary {
    vertices: usize,
    triangles: usize,
}

#[derive(Serialize)]
struct FrameReport {
    song_time: String,
    #[serde(flatten)]
    state: FrameState,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect beatline.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("beatline.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("beatline").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("beatline").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    let mut cfg = Config::default();
    if let Some(ref path) = config_path {
        if let Some(loaded) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            cfg = loaded;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    // Merge: CLI values apply only when moved off their default
    if cli.window_size != DEFAULT_WINDOW_SIZE { cfg.analysis.window_size = cli.window_size; }
    if cli.smoothing != DEFAULT_SMOOTHING { cfg.track.slope_smoothness = cli.smoothing; }
    if cli.resolution != DEFAULT_RESOLUTION { cfg.track.mesh_resolution = cli.resolution; }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("beatline - audio to track generator");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!(
        "Window: {} samples ({:?}), smoothing {:.3}, mesh resolution {}",
        cfg.analysis.window_size,
        cfg.analysis.window_function,
        cfg.track.slope_smoothness,
        cfg.track.mesh_resolution
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let waveform = decode_audio(&cli.input)?;

    // 2. Analyze
    log::info!("Analyzing audio...");
    let analysis = analyze(&waveform, &cfg).context("Audio analysis failed")?;
    log::info!(
        "Duration: {}, markers: {}, mesh triangles: {}",
        format_song_time(analysis.duration, analysis.duration),
        analysis.markers.len(),
        analysis.track.mesh.triangle_count()
    );

    // 3. Sample playback frames
    let frames = sample_frames(&analysis, cli.frames)?;

    // 4. Mesh dump
    if let Some(ref path) = cli.mesh_out {
        write_mesh(path, &analysis.track.mesh)?;
    }

    // 5. Report
    let report = Report {
        input: cli.input.display().to_string(),
        sample_rate: analysis.sample_rate,
        channels: analysis.channels,
        duration: format_song_time(analysis.duration, analysis.duration),
        window_size: analysis.window_size,
        slope_intensity: analysis.track.slope_intensity,
        control_points: &analysis.track.control_points,
        colors: &analysis.track.colors,
        low_beats: &analysis.low_beats,
        high_beats: &analysis.high_beats,
        pulses: &analysis.pulses,
        markers: &analysis.markers,
        total_points: analysis.session().scoreboard().total(),
        mesh: MeshSummary {
            vertices: analysis.track.mesh.vertices.len(),
            triangles: analysis.track.mesh.triangle_count(),
        },
        frames,
    };

    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create report: {}", cli.output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).context("Failed to write report")?;
    writer.flush()?;

    log::info!("Done! Report saved to {}", cli.output.display());
    Ok(())
}

fn sample_frames(analysis: &Analysis, count: usize) -> Result<Vec<FrameReport>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    log::info!("Sampling {} playback frames...", count);
    let session = analysis.session();
    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")?
            .progress_chars("=>-"),
    );

    let mut state = FrameState::default();
    let mut frames = Vec::with_capacity(count);
    for i in 0..count {
        let global = if count > 1 { i as f32 / (count - 1) as f32 } else { 0.0 };
        session.frame_into(global, &mut state);
        frames.push(FrameReport {
            song_time: format_song_time(state.elapsed_seconds, session.duration()),
            state: state.clone(),
        });
        pb.inc(1);
    }
    pb.finish_with_message("done");

    Ok(frames)
}

fn write_mesh(path: &Path, mesh: &RibbonMesh) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create mesh file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let counts = [mesh.vertices.len() as u32, mesh.indices.len() as u32];
    for count in counts {
        writer.write_all(&count.to_le_bytes())?;
    }
    writer.write_all(mesh.vertex_bytes())?;
    writer.write_all(mesh.index_bytes())?;
    writer.flush()?;

    log::info!(
        "Mesh saved to {} ({} vertices, {} indices)",
        path.display(),
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(())
}
