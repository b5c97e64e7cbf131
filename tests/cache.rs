use std::fs;

use commute_routing::config::{FleetSpec, SolverConfig};
use commute_routing::distance::{CostMatrix, MatrixCache};
use commute_routing::models::Node;
use commute_routing::pipeline::{optimize, Optimizer};
use commute_routing::request::{Request, Status};
use commute_routing::RoutingError;

fn points() -> Vec<(f64, f64)> {
    vec![
        (12.9716, 77.5946),
        (12.9352, 77.6245),
        (13.0358, 77.5970),
        (12.9279, 77.6271),
    ]
}

fn entries(cache: &MatrixCache) -> Vec<std::path::PathBuf> {
    fs::read_dir(cache.dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect()
}

#[test]
fn round_trip_returns_identical_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path()).unwrap();

    assert!(cache.load(&points()).is_none());
    let built = cache.get_or_build(&points()).unwrap();
    assert_eq!(entries(&cache).len(), 1);

    let loaded = cache.load(&points()).unwrap();
    assert_eq!(loaded, built);
    assert_eq!(built, CostMatrix::from_coordinates(&points()).unwrap());
}

#[test]
fn key_depends_on_order() {
    let mut reversed = points();
    reversed.reverse();
    assert_ne!(MatrixCache::key(&points()), MatrixCache::key(&reversed));
    assert_eq!(MatrixCache::key(&points()), MatrixCache::key(&points()));
}

#[test]
fn corrupt_entry_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path()).unwrap();
    cache.get_or_build(&points()).unwrap();

    let path = entries(&cache).pop().unwrap();
    fs::write(&path, b"{ not json").unwrap();
    assert!(cache.load(&points()).is_none());

    let rebuilt = cache.get_or_build(&points()).unwrap();
    assert_eq!(rebuilt, CostMatrix::from_coordinates(&points()).unwrap());
    assert_eq!(cache.load(&points()).unwrap(), rebuilt);
}

#[test]
fn mismatched_entry_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path()).unwrap();
    cache.get_or_build(&points()).unwrap();
    let path = entries(&cache).pop().unwrap();

    // A valid entry for another location set, stored under this key's file name.
    let other = [(0.0, 0.0), (1.0, 1.0)];
    let other_cache = MatrixCache::new(dir.path().join("other")).unwrap();
    other_cache.get_or_build(&other).unwrap();
    let other_path = entries(&other_cache).pop().unwrap();
    fs::copy(other_path, &path).unwrap();

    assert!(cache.load(&points()).is_none());
}

fn nodes() -> Vec<Node> {
    points()
        .into_iter()
        .enumerate()
        .map(|(i, (lat, lon))| {
            if i == 0 {
                Node::depot("OFFICE_DEPOT", lat, lon)
            } else {
                Node::new(format!("EMP_{i}"), lat, lon, 1)
            }
        })
        .collect()
}

#[test]
fn pipeline_uses_cache_directory() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path()).unwrap();
    let locations = nodes();
    let request = Request::new(locations, FleetSpec::uniform(2, 2).vehicles());

    let first = optimize(&request, &SolverConfig::default(), Some(&cache));
    assert_eq!(first.status, Status::Ok);
    assert_eq!(entries(&cache).len(), 1);

    let second = optimize(&request, &SolverConfig::default(), Some(&cache));
    assert_eq!(second, first);
}

#[test]
fn cached_pipeline_names_the_bad_location() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path()).unwrap();
    let mut locations = nodes();
    locations.push(Node::new("BAD", 123.0, 0.0, 1));
    let request = Request::new(locations, FleetSpec::default().vehicles());

    let optimizer = Optimizer::new(SolverConfig::default()).with_cache(cache.clone());
    match optimizer.run(&request) {
        Err(RoutingError::InvalidInput { node, .. }) => assert_eq!(node.as_deref(), Some("BAD")),
        other => panic!("expected invalid input, got {other:?}"),
    }
    assert!(entries(&cache).is_empty());
}
