use crate::cancel::{CancellationToken, NeverCancel};
use crate::error::TourError;
use crate::geometry::{Point3, Vector3};
use crate::mesh::{Triangle, TriangleMesh};
use crate::tour::{
    edge_cost, find_collisions, waypoints_from_mesh, CloudVisit, CostMatrix, CostModelConfig, MetaCostMatrix,
    OptimizerConfig, TourOptimizer, TourSolution, TwoOptNeighborhood, Waypoint,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn wp(x: f64, y: f64, z: f64) -> Waypoint {
    Waypoint::new(Point3::new(x, y, z))
}

fn ground_mesh() -> TriangleMesh {
    TriangleMesh::new(vec![Triangle::new(
        Point3::new(-100.0, -100.0, 0.0),
        Point3::new(100.0, -100.0, 0.0),
        Point3::new(0.0, 100.0, 0.0),
    )])
}

fn optimizer(seed: u64) -> TourOptimizer {
    TourOptimizer::new(OptimizerConfig::default().with_seed(seed))
}

#[test]
fn test_convex_quad_converges_to_perimeter() {
    // Listed so that the identity order crosses itself
    let corners = vec![wp(0.0, 0.0, 0.0), wp(10.0, 10.0, 0.0), wp(10.0, 0.0, 0.0), wp(0.0, 10.0, 0.0)];
    let center = Point3::new(5.0, 5.0, 0.0);
    let matrix = CostMatrix::for_one_cloud(
        &corners,
        center,
        center,
        &TriangleMesh::default(),
        &CostModelConfig::default(),
        &NeverCancel,
    )
    .unwrap();

    for seed in [1, 7, 42] {
        let solution = optimizer(seed).optimize(&matrix, &NeverCancel).unwrap();
        assert!(solution.is_feasible());
        assert!((solution.cost() - (30.0 + 2.0 * 50.0_f64.sqrt())).abs() < 1e-9, "{:?}", solution);

        let visited = solution.ordered_waypoints(&corners);
        for w in visited.windows(2) {
            assert!(((w[1].position - w[0].position).norm() - 10.0).abs() < 1e-9);
        }
    }
}

#[test]
fn test_safety_distance_boundary() {
    let mesh = ground_mesh();
    let config = CostModelConfig::default().with_safety_distance(2.0);
    let before = Point3::new(0.0, 0.0, 50.0);

    let close = [wp(-10.0, 0.0, 1.99), wp(10.0, 0.0, 1.99)];
    let matrix = CostMatrix::for_one_cloud(&close, before, before, &mesh, &config, &NeverCancel).unwrap();
    assert!(matrix.cost(0, 1).is_infinite());
    assert!(matrix.is_obstructed(1, 0));

    let clear = [wp(-10.0, 0.0, 2.01), wp(10.0, 0.0, 2.01)];
    let matrix = CostMatrix::for_one_cloud(&clear, before, before, &mesh, &config, &NeverCancel).unwrap();
    assert!((matrix.cost(0, 1) - 20.0).abs() < 1e-9);
    assert_eq!(matrix.obstructed_edges(), 0);
}

#[test]
fn test_edge_over_face_with_distant_endpoints_is_obstructed() {
    let mesh = ground_mesh();
    let config = CostModelConfig::default().with_safety_distance(2.0);
    let before = Point3::new(0.0, 0.0, 50.0);
    let long = [wp(-200.0, 0.0, 1.0), wp(200.0, 0.0, 1.0)];

    let matrix = CostMatrix::for_one_cloud(&long, before, before, &mesh, &config, &NeverCancel).unwrap();
    assert!(matrix.cost(0, 1).is_infinite());
    assert_eq!(find_collisions(&mesh, 2.0, &[long[0].position, long[1].position]).len(), 1);
}

#[test]
fn test_obstruction_propagates_to_tour_cost() {
    let mesh = ground_mesh();
    let config = CostModelConfig::default().with_safety_distance(2.0);
    let waypoints = [wp(-10.0, 0.0, 1.0), wp(10.0, 0.0, 1.0), wp(0.0, 10.0, 1.0)];
    let start = Point3::new(0.0, 0.0, 30.0);
    let matrix = CostMatrix::for_one_cloud(&waypoints, start, start, &mesh, &config, &NeverCancel).unwrap();

    assert_eq!(matrix.calculate_cost(&[0, 1, 2]), f64::INFINITY);

    let solution = optimizer(3).optimize(&matrix, &NeverCancel).unwrap();
    assert!(!solution.is_feasible());
    assert_eq!(solution.order().len(), 3);
}

#[test]
fn test_cancellation() {
    let token = CancellationToken::new();
    let waypoints = [wp(0.0, 0.0, 10.0), wp(5.0, 0.0, 10.0), wp(5.0, 5.0, 10.0)];
    let origin = Point3::origin();
    let config = CostModelConfig::default();
    let matrix =
        CostMatrix::for_one_cloud(&waypoints, origin, origin, &ground_mesh(), &config, &token).unwrap();

    token.cancel();
    let err = CostMatrix::for_one_cloud(&waypoints, origin, origin, &ground_mesh(), &config, &token).unwrap_err();
    assert_eq!(err, TourError::Cancelled);
    assert_eq!(optimizer(1).optimize(&matrix, &token).unwrap_err(), TourError::Cancelled);
}

#[test]
fn test_empty_cloud_is_rejected() {
    let origin = Point3::origin();
    let res = CostMatrix::for_one_cloud(
        &[],
        origin,
        origin,
        &TriangleMesh::default(),
        &CostModelConfig::default(),
        &NeverCancel,
    );
    assert_eq!(res.unwrap_err(), TourError::EmptyCloud);
}

#[test]
fn test_neighborhood_covers_every_pair_once() {
    let mut rng = StdRng::seed_from_u64(11);
    let hood = TwoOptNeighborhood::new(6, &mut rng);
    assert_eq!(hood.size(), 15);

    let moves: Vec<(usize, usize)> = hood.collect();
    assert_eq!(moves.len(), 15);
    let unique: HashSet<_> = moves.iter().copied().collect();
    assert_eq!(unique.len(), 15);
    assert!(moves.iter().all(|&(a, b)| a < b && b < 6));

    assert_eq!(TwoOptNeighborhood::new(1, &mut rng).count(), 0);
    assert_eq!(TwoOptNeighborhood::new(2, &mut rng).collect::<Vec<_>>(), vec![(0, 1)]);
    assert_eq!(TwoOptNeighborhood::apply(&[0, 1, 2, 3, 4], 1, 3), vec![0, 3, 2, 1, 4]);
}

#[test]
fn test_heading_change_penalty() {
    let waypoints = [wp(10.0, 0.0, 0.0), wp(20.0, 0.0, 0.0), wp(30.0, 0.0, 0.0)];
    let config = CostModelConfig::default().with_orientation_penalties(0.0, 0.0, 1.0);
    let matrix = CostMatrix::for_one_cloud(
        &waypoints,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(40.0, 0.0, 0.0),
        &TriangleMesh::default(),
        &config,
        &NeverCancel,
    )
    .unwrap();

    assert!((matrix.yaw(0, 1) - 90.0).abs() < 1e-9);
    assert!((matrix.yaw(1, 0) + 90.0).abs() < 1e-9);
    assert!((matrix.calculate_cost(&[0, 1, 2]) - 40.0).abs() < 1e-9);
    // Two reversals of 180 degrees on a 60 m path
    assert!((matrix.calculate_cost(&[1, 0, 2]) - 420.0).abs() < 1e-9);
}

#[test]
fn test_edge_cost_weights() {
    let mesh = TriangleMesh::default();
    let config = CostModelConfig::default();
    assert!((edge_cost(&wp(0.0, 0.0, 0.0), &wp(0.0, 0.0, 10.0), &mesh, &config) - 20.0).abs() < 1e-9);

    let a = wp(0.0, 0.0, 0.0).with_normal(Vector3::x());
    let b = wp(3.0, 4.0, 0.0).with_normal(Vector3::y());
    let config = config.with_camera_change_penalty(2.0);
    let expected = 5.0 + std::f64::consts::PI;
    assert!((edge_cost(&a, &b, &mesh, &config) - expected).abs() < 1e-9);
}

#[test]
fn test_meta_clouds_expand_through_best_members() {
    let clouds = vec![
        vec![wp(0.0, 0.0, 0.0), wp(1.0, 0.0, 0.0)],
        vec![wp(10.0, 0.0, 0.0), wp(11.0, 0.0, 0.0)],
    ];
    let meta = MetaCostMatrix::for_meta_clouds(
        &clouds,
        Point3::new(-5.0, 0.0, 0.0),
        Point3::new(20.0, 0.0, 0.0),
        &TriangleMesh::default(),
        &CostModelConfig::default(),
        &NeverCancel,
    )
    .unwrap();

    let matrix = meta.matrix();
    assert_eq!(matrix.len(), 2);
    assert!((matrix.cost(0, 1) - 9.0).abs() < 1e-9);
    assert_eq!(meta.best_members(0, 1), (1, 0));
    assert_eq!(meta.best_members(1, 0), (0, 1));

    let solution = optimizer(5).optimize_from(matrix, vec![1, 0], &NeverCancel).unwrap();
    assert_eq!(solution.order(), &[0, 1]);
    assert!((solution.cost() - 23.0).abs() < 1e-9);

    let visits = meta.expand(solution.order());
    let expected = [(0, 0), (0, 1), (1, 0), (1, 1)];
    assert_eq!(visits.len(), expected.len());
    for (visit, (cloud, member)) in visits.iter().zip(expected) {
        assert_eq!(*visit, CloudVisit { cloud, member });
    }
}

#[test]
fn test_solution_must_be_permutation() {
    let waypoints = [wp(0.0, 0.0, 0.0), wp(1.0, 0.0, 0.0), wp(2.0, 0.0, 0.0)];
    let origin = Point3::origin();
    let matrix = CostMatrix::for_one_cloud(
        &waypoints,
        origin,
        origin,
        &TriangleMesh::default(),
        &CostModelConfig::default(),
        &NeverCancel,
    )
    .unwrap();

    assert!(matches!(TourSolution::new(vec![0, 0, 1], &matrix), Err(TourError::InvalidTour(_))));
    assert_eq!(
        TourSolution::new(vec![0, 1], &matrix),
        Err(TourError::MismatchedMatrix { expected: 3, actual: 2 })
    );
    let ok = TourSolution::new(vec![2, 0, 1], &matrix).unwrap();
    assert!((ok.cost() - 6.0).abs() < 1e-9);
}

#[test]
fn test_stored_solution_must_be_permutation() {
    let waypoints = [wp(0.0, 0.0, 0.0), wp(1.0, 0.0, 0.0)];
    let origin = Point3::origin();
    let matrix = CostMatrix::for_one_cloud(
        &waypoints,
        origin,
        origin,
        &TriangleMesh::default(),
        &CostModelConfig::default(),
        &NeverCancel,
    )
    .unwrap();
    let solution = TourSolution::new(vec![1, 0], &matrix).unwrap();

    let json = serde_json::to_string(&solution).unwrap();
    let restored: TourSolution = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, solution);

    assert!(serde_json::from_str::<TourSolution>(r#"{"order": [0, 0, 1], "cost": 1.0}"#).is_err());
    assert!(serde_json::from_str::<TourSolution>(r#"{"order": [0, 3], "cost": 1.0}"#).is_err());
}

#[test]
fn test_find_collisions() {
    let path = [
        Point3::new(-50.0, 0.0, 10.0),
        Point3::new(-20.0, 0.0, 10.0),
        Point3::new(-20.0, 0.0, 1.0),
        Point3::new(20.0, 0.0, 1.0),
    ];
    let hits = find_collisions(&ground_mesh(), 2.0, &path);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].segment, 1);
    assert_eq!(hits[1].segment, 2);
    assert!((hits[1].distance - 1.0).abs() < 1e-9);
}

#[test]
fn test_waypoints_from_mesh() {
    let mesh = TriangleMesh::new(vec![Triangle::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
    )]);
    let waypoints = waypoints_from_mesh(&mesh, 2.0, 5.0);
    assert!(!waypoints.is_empty());
    for w in &waypoints {
        assert_eq!(w.triangle, Some(0));
        assert!((w.position.z - 5.0).abs() < 1e-9);
        let orientation = w.camera_orientation().unwrap();
        assert!((orientation.pitch - 90.0).abs() < 1e-9);
    }
}

#[test]
fn test_config_from_json() {
    let config: CostModelConfig =
        serde_json::from_str(r#"{"safety_distance": 3.5, "yaw_penalty_per_degree": 0.1}"#).unwrap();
    assert_eq!(config.vertical_penalty, 2.0);
    assert!(config.validate().is_ok());

    let bad = config.with_vertical_penalty(0.0);
    assert!(matches!(bad.validate(), Err(TourError::InvalidConfig(_))));

    let opt: OptimizerConfig = serde_json::from_str(r#"{"seed": 9}"#).unwrap();
    assert_eq!(opt.seed, Some(9));
    assert_eq!(opt.max_passes, OptimizerConfig::default().max_passes);
}
