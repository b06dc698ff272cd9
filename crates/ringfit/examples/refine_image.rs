use image::ImageReader;
use ringfit::{CenterFinder, FinderConfig, ObjectiveKind, SeedStrategy};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <image.png> <radius_guess_px> [sum|variance]", args[0]);
        std::process::exit(2);
    }

    let image = ImageReader::open(&args[1])?.decode()?.to_luma8();
    let radius: f64 = args[2].parse()?;
    let objective = match args.get(3).map(String::as_str) {
        Some("sum") => ObjectiveKind::Sum,
        _ => ObjectiveKind::Variance,
    };

    let finder = CenterFinder::with_config(FinderConfig {
        objective: Some(objective),
        ..Default::default()
    });
    let result = finder.find(&image, &SeedStrategy::Centroid { radius })?;

    println!(
        "seed ({:.2}, {:.2}, {:.2}) -> circle ({:.3}, {:.3}, {:.3})",
        result.seed.x, result.seed.y, result.seed.r, result.circle.x, result.circle.y, result.circle.r
    );
    if let Some(r) = &result.refinement {
        println!(
            "{} objective {:.4} -> {:.4} in {} iterations (accepted: {})",
            r.objective, r.objective_initial, r.objective_final, r.iterations, r.accepted
        );
    }
    Ok(())
}
