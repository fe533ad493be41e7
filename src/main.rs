//! fractvox - build a scene's geometry into voxels and summarise the result.
//!
//! Usage:
//!   fractvox <scene.json> [--jobs N]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fractvox::build::build_scene;
use fractvox::core::logging;
use fractvox::scene::SceneConfig;
use fractvox::voxel::SolidGrid;

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(scene_path) = parse_scene_arg(&args) else {
        eprintln!("Usage: fractvox <scene.json> [--jobs N]");
        return ExitCode::from(2);
    };

    if let Some(jobs) = parse_usize_arg(&args, "--jobs") {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global() {
            log::warn!("Could not size the thread pool to {jobs}: {e}");
        }
    }

    match run(&scene_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(scene_path: &Path) -> fractvox::Result<()> {
    let scene = SceneConfig::load(scene_path)?;
    let mut grid = SolidGrid::for_domain(&scene.domain()?);
    let ctx = build_scene(&scene, &mut grid)?;

    let [nx, ny, nz] = grid.dims();
    println!("=== fractvox ===");
    println!("Scene:  {}", scene_path.display());
    println!("Domain: {nx} x {ny} x {nz} cells");
    println!("dt:     {:e} s", ctx.dt);
    println!();
    println!("{:>6}  {:<24} {:>12}", "numID", "material", "cells");
    for (num_id, cells) in grid.counts() {
        let name = ctx.registry.get(num_id).map_or("?", |m| m.id.as_str());
        println!("{:>6}  {:<24} {:>12}", num_id, name, cells);
    }
    Ok(())
}

/// First argument that is not a flag or a flag's value.
fn parse_scene_arg(args: &[String]) -> Option<PathBuf> {
    let mut i = 1;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += 2;
            continue;
        }
        return Some(PathBuf::from(&args[i]));
    }
    None
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}
