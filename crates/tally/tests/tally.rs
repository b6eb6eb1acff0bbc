//! Integration tests for tally definitions and statepoint files

use rstest::{fixture, rstest};
use wwforge_mesh::SpatialMesh;
use wwforge_tally::{
    Error, Filter, FilterKind, Particle, ResultValue, Statepoint, TallyResult, TallySpecification,
};

#[fixture]
fn specification() -> TallySpecification {
    let mesh = SpatialMesh::regular(1, [2, 1, 1], [0.0; 3], [2.0, 1.0, 1.0]);
    TallySpecification::new(4)
        .with_filter(Filter::Mesh(mesh))
        .with_filter(Filter::Particle(vec![Particle::Neutron, Particle::Photon]))
        .with_nuclides(&["Fe56", "total"])
}

#[fixture]
fn result() -> TallyResult {
    // (mesh=2) x (particle=2) x (nuclide=2) x (score=1)
    TallyResult {
        id: 4,
        filter_bins: vec![2, 2],
        nuclides: vec!["Fe56".into(), "total".into()],
        scores: vec!["flux".into()],
        mean: vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0],
        rel_err: vec![0.1, 0.01, 0.2, 0.02, 0.3, 0.03, 0.4, 0.04],
    }
}

#[rstest]
fn filters_are_described(specification: TallySpecification) {
    assert_eq!(
        specification.filter_kinds(),
        vec![FilterKind::Mesh, FilterKind::Particle]
    );
    assert_eq!(specification.filter_bins(), vec![2, 2]);
    assert_eq!(
        specification.particles(),
        Some([Particle::Neutron, Particle::Photon].as_slice())
    );
    assert!(specification.energy_bounds().is_none());
    assert_eq!(specification.find_filter(FilterKind::Particle).unwrap().0, 1);
}

#[rstest]
fn specification_json_round_trip(specification: TallySpecification) {
    let text = serde_json::to_string(&specification).unwrap();
    assert!(text.contains(r#""type":"particle","bins":["neutron","photon"]"#));

    let parsed: TallySpecification = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, specification);
}

#[test]
fn specification_defaults() {
    let json = r#"{"id": 9, "filters": [{"type": "cell", "bins": [1, 2]}]}"#;
    let parsed: TallySpecification = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.scores, vec!["flux"]);
    assert_eq!(parsed.nuclides, vec!["total"]);
    assert_eq!(parsed.filter_kinds(), vec![FilterKind::Cell]);
}

#[rstest]
fn slice_selects_nuclide_and_score(result: TallyResult) {
    let nuclide = result.nuclide_index("total").unwrap();
    let score = result.score_index("flux").unwrap();

    assert_eq!(
        result.slice(ResultValue::Mean, nuclide, score).unwrap(),
        vec![10.0, 20.0, 30.0, 40.0]
    );
    assert_eq!(
        result.slice(ResultValue::RelErr, 0, score).unwrap(),
        vec![0.1, 0.2, 0.3, 0.4]
    );
}

#[rstest]
fn missing_entries(result: TallyResult) {
    assert!(matches!(
        result.score_index("heating"),
        Err(Error::ScoreNotFound { id: 4, .. })
    ));
    assert!(matches!(
        result.nuclide_index("U235"),
        Err(Error::NuclideNotFound { id: 4, .. })
    ));
    assert!(result.slice(ResultValue::Mean, 2, 0).is_err());
}

#[rstest]
fn inconsistent_lengths(mut result: TallyResult) {
    result.rel_err.pop();
    assert!(matches!(
        result.validate(),
        Err(Error::InconsistentShape {
            expected: 8,
            found: 7,
            ..
        })
    ));
}

#[test]
fn undefined_errors_read_as_nan() {
    let json = r#"{"id": 1, "filter_bins": [2], "nuclides": ["total"],
                   "scores": ["flux"], "mean": [0.0, 1.0], "rel_err": [null, 0.5]}"#;
    let parsed: TallyResult = serde_json::from_str(json).unwrap();
    assert!(parsed.rel_err[0].is_nan());
    assert_eq!(parsed.rel_err[1], 0.5);
}

#[rstest]
fn statepoint_file_round_trip(result: TallyResult) {
    let dir = tempfile::tempdir().unwrap();
    let path = Statepoint::path_in(dir.path(), 20);

    let statepoint = Statepoint {
        batches: 20,
        tallies: vec![result.clone()],
    };
    statepoint.write(&path).unwrap();

    let read = Statepoint::from_file(&path).unwrap();
    assert_eq!(read.get_tally(4).unwrap(), &result);
    assert!(matches!(read.get_tally(5), Err(Error::TallyNotFound(5))));
}

#[test]
fn corrupt_statepoint_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statepoint.10.json");
    std::fs::write(&path, "{\"batches\": 10, \"tallies\": [").unwrap();

    assert!(matches!(
        Statepoint::from_file(&path),
        Err(Error::JsonError(_))
    ));
    assert!(matches!(
        Statepoint::from_file(dir.path().join("missing.json")),
        Err(Error::IOError(_))
    ));
}

#[rstest]
#[case("\"neutron\"", Particle::Neutron)]
#[case("\"photon\"", Particle::Photon)]
#[case("\"positron\"", Particle::Positron)]
fn particle_labels(#[case] json: &str, #[case] expected: Particle) {
    assert_eq!(serde_json::from_str::<Particle>(json).unwrap(), expected);
    assert_eq!(serde_json::to_string(&expected).unwrap(), json);
}

#[test]
fn unknown_particle_label() {
    assert!(serde_json::from_str::<Particle>("\"muon\"").is_err());
}
