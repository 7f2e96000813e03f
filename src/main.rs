use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use space_occupancy::camera::Viewport;
use space_occupancy::cli::{Cli, Command};
use space_occupancy::config::AppConfig;
use space_occupancy::coordinator::{extract_model, LabelCoordinator, SamplingRequest, SolidKind};
use space_occupancy::loaders::load_scene;

#[derive(Serialize)]
struct SampleOutput<'a> {
    boundary: &'a str,
    attempts: usize,
    points: Vec<[f64; 3]>,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::from_json_file(path),
        None => Ok(AppConfig::default()),
    }
}

fn print_labels(config: &AppConfig, scene: &std::path::Path, width: Option<f64>, height: Option<f64>) -> Result<()> {
    let graph = load_scene(scene)?;
    let model = extract_model(&graph, &config.classifier);

    let viewport = Viewport::new(
        width.unwrap_or(config.viewport.width),
        height.unwrap_or(config.viewport.height),
    );

    let mut coordinator = LabelCoordinator::new(config.label_z_offset);
    coordinator.begin_loading();
    coordinator.set_model(model);
    coordinator.set_camera(config.camera.to_state(viewport));

    let labels = coordinator.try_labels(viewport)?;
    println!("{}", serde_json::to_string_pretty(labels)?);
    Ok(())
}

fn print_samples(config: &AppConfig, scene: &std::path::Path, request: SamplingRequest) -> Result<()> {
    let graph = load_scene(scene)?;
    let model = extract_model(&graph, &config.classifier);

    let name = model.boundary(request.boundary_id)?.name().to_string();
    let task = model.spawn_sample(request, config.sampler)?;
    let sampled = pollster::block_on(task)
        .with_context(|| format!("Sampling boundary {:?} failed", name))?;

    log::info!(
        "Accepted {} of {} candidates ({:.1}%)",
        sampled.points.len(),
        sampled.attempts,
        100.0 * sampled.acceptance_ratio()
    );

    let output = SampleOutput {
        boundary: &name,
        attempts: sampled.attempts,
        points: sampled.points.iter().map(|p| p.to_array()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Labels { scene, width, height } => print_labels(&config, scene, *width, *height),
        Command::Sample {
            scene,
            boundary,
            count,
            seed,
            mesh,
        } => {
            let solid = if *mesh { SolidKind::Mesh } else { SolidKind::Hull };
            print_samples(
                &config,
                scene,
                SamplingRequest::new(*boundary, *count, *seed).with_solid(solid),
            )
        }
    }
}
