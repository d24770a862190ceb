use bone_remodel::*;
use std::path::Path;

fn plate_config() -> RemodelingConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("inputs/weinans_plate.toml");
    RemodelingConfig::from_file(path).unwrap()
}

#[test]
fn test_plate_input_loads() {
    let config = plate_config();
    assert_eq!(config.control.niter, 50);
    assert_eq!(config.control.rule, RuleKind::Spatial);

    let params = config.to_parameters().unwrap();
    assert_eq!(params.rho_ini(), 0.8);
    assert_eq!(params.poisson(), 0.3);
    assert_eq!(params.stiffness().cc, 100.0);
    assert_eq!(params.stiffness().gc, 2.0);
    assert_eq!(params.lazy_zone().setpoint, 0.25);
    assert_eq!(params.bounds().min, 0.01);
    assert_eq!(params.bounds().max, 1.74);
    assert!(matches!(params.rule(), UpdateRule::Spatial(_)));
    assert!(params.convergence().is_some());
}

#[test]
fn test_initial_density_outside_bounds_rejected() {
    let mut config = plate_config();
    config.material.rho_ini = 2.5;
    assert!(matches!(
        config.to_parameters(),
        Err(RemodelError::InvalidParameter { name: "rho_ini", .. })
    ));
}

#[test]
fn test_config_drives_a_run() {
    let mut config = plate_config();
    config.control.niter = 3;
    config.convergence = None;
    let params = config.to_parameters().unwrap();

    let geometry = ElementGeometry::structured_grid(4, 2, 1, 0.4, 0.2, 0.1);
    let xs: Vec<f64> = geometry.centroids().iter().map(|p| p.x).collect();
    let session = PrescribedStressSession::linear_gradient(xs, 0.4, 10.0, 2.0).unwrap();

    let mut controller = RemodelingController::new(params, session).with_geometry(geometry);
    let end = controller.run().unwrap();

    assert_eq!(end, Termination::IterationLimit { iterations: 3 });
    assert_eq!(controller.history().len(), 3);
    assert_eq!(controller.session().solves(), 3);
    assert!(controller
        .state()
        .density
        .as_slice()
        .iter()
        .all(|&rho| (0.01..=1.74).contains(&rho)));
}
