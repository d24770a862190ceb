/// Plate remodeling benchmark: local vs spatial rule
///
/// Purpose: Run the remodeling loop on a 2D plate whose elements carry a
/// stress that falls linearly from the left edge to the right edge.
///
/// Setup:
/// - 20×10×1 structured grid, 2.0 × 1.0 × 0.1
/// - Prescribed stress σ(x) = 10 → 2 across the plate
/// - E = 100 ρ², K = 0.25, no lazy zone
///
/// Analytical (local rule, converged):
///   ρ*(x) = (σ(x)² / (2 CC K))^(1 / (GC + 1))
///
/// The spatial rule smooths the same profile over the influence distance D,
/// so its density should stay close to ρ* away from the plate edges.

use bone_remodel::*;

fn main() {
    env_logger::init();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  BENCHMARK: Weinans plate, local vs spatial remodeling");
    println!("═══════════════════════════════════════════════════════════════\n");

    let config_path = "inputs/weinans_plate.toml";
    let config = RemodelingConfig::from_file(config_path).expect("Failed to load config");
    config.log_summary();
    println!("Loaded config: {}", config_path);

    let (nx, ny, nz) = (20, 10, 1);
    let (lx, ly, lz) = (2.0, 1.0, 0.1);
    let (sigma_left, sigma_right) = (10.0, 2.0);

    let geometry = ElementGeometry::structured_grid(nx, ny, nz, lx, ly, lz);
    println!("  Grid: {}×{}×{} ({} elements)", nx, ny, nz, geometry.num_elements());
    println!("  Stress: {} → {} across x\n", sigma_left, sigma_right);

    let xs: Vec<f64> = geometry.centroids().iter().map(|p| p.x).collect();

    // Local rule
    let mut local_config = config.clone();
    local_config.control.rule = RuleKind::Local;
    local_config.spatial = None;
    let local_params = local_config.to_parameters().expect("Invalid local parameters");

    let session = PrescribedStressSession::linear_gradient(xs.iter().copied(), lx, sigma_left, sigma_right)
        .expect("Failed to build session");
    let mut local = RemodelingController::new(local_params.clone(), session);
    let local_end = local.run().expect("Local remodeling failed");
    println!("Local rule:   {:?}", local_end);

    // Spatial rule
    let spatial_params = config.to_parameters().expect("Invalid spatial parameters");
    let session = PrescribedStressSession::linear_gradient(xs.iter().copied(), lx, sigma_left, sigma_right)
        .expect("Failed to build session");
    let mut spatial = RemodelingController::new(spatial_params, session).with_geometry(geometry);
    let spatial_end = spatial.run().expect("Spatial remodeling failed");
    println!("Spatial rule: {:?}\n", spatial_end);

    // Column-averaged density along x
    let stiffness = local_params.stiffness();
    let k = local_params.lazy_zone().setpoint;
    let bounds = local_params.bounds();

    println!("  {:>6} {:>8} {:>10} {:>10} {:>10}", "x", "sigma", "rho*", "local", "spatial");
    let mut max_local_error: f64 = 0.0;
    for i in 0..nx {
        let x = xs[i];
        let sigma = sigma_left + (sigma_right - sigma_left) * x / lx;
        let exact = clamp_density(
            (sigma * sigma / (2.0 * stiffness.cc * k)).powf(1.0 / (stiffness.gc + 1.0)),
            bounds,
        );
        let column = |field: &ElementField| {
            (0..ny).map(|j| field[i + j * nx]).sum::<f64>() / ny as f64
        };
        let rho_local = column(&local.state().density);
        let rho_spatial = column(&spatial.state().density);
        max_local_error = max_local_error.max((rho_local - exact).abs());

        println!(
            "  {:>6.3} {:>8.3} {:>10.5} {:>10.5} {:>10.5}",
            x, sigma, exact, rho_local, rho_spatial
        );
    }

    println!("\nIteration history (spatial):");
    for record in &spatial.history().records {
        println!(
            "  iter {:>3}: rho in [{:.4}, {:.4}], mean {:.4}, change {:.3e}, +{} -{} ={}",
            record.iteration,
            record.density_min,
            record.density_max,
            record.density_mean,
            record.relative_change,
            record.forming,
            record.resorbing,
            record.quiescent
        );
    }

    println!("\nMax |local - rho*| = {:.3e}", max_local_error);
    if max_local_error < 1e-3 {
        println!("✓ Local rule reaches the analytical equilibrium");
    } else {
        println!("✗ Local rule did not reach the analytical equilibrium");
    }
}
