#![cfg(test)]

use crate::geo::PointKey;
use crate::topology::checker::TopologyChecker;
use crate::topology::cleaner::{RawLine, RawPoint, TopologyCleaner};
use crate::topology::{ArcFeature, TopoStatus};

use approx::assert_relative_eq;
use geo::{coord, point, wkt, Coord};
use rustc_hash::FxHashMap;

/// Three lines on dyadic-rational coordinates so every densified sample
/// (and therefore every attachment) is exactly predictable: a two-segment
/// meridian way, a small roundabout loop hanging off its north end, and a
/// disconnected one-way diagonal.
pub(crate) fn sample_lines() -> Vec<RawLine> {
    vec![
        RawLine::new(10, wkt! { LINESTRING (0.0 0.0, 0.0 1.0, 0.0 2.0) })
            .with_attribute("id", "10"),
        RawLine::new(
            11,
            wkt! { LINESTRING (0.0 2.0, 0.25 2.0, 0.25 2.25, 0.0 2.25) },
        )
        .with_attribute("id", "11")
        .with_attribute("junction", "roundabout"),
        RawLine::new(
            12,
            wkt! { LINESTRING (1.0 0.0, 2.0 1.0, 3.0 1.0, 3.0 2.0) },
        )
        .with_attribute("id", "12")
        .with_attribute("oneway", "yes"),
    ]
}

/// Nine external points: seven off-network (one of them nearest to the
/// roundabout), one on the meridian's start vertex and one on its middle
/// vertex.
pub(crate) fn sample_points() -> Vec<RawPoint> {
    vec![
        RawPoint::new(1, point! { x: 0.25, y: 0.5 }),
        RawPoint::new(2, point! { x: 0.5, y: 2.125 }),
        RawPoint::new(3, point! { x: -0.25, y: 1.5 }),
        RawPoint::new(4, point! { x: 0.0, y: 0.0 }),
        RawPoint::new(5, point! { x: 0.0, y: 1.0 }),
        RawPoint::new(6, point! { x: 0.125, y: 0.25 }),
        RawPoint::new(7, point! { x: -0.125, y: 0.75 }),
        RawPoint::new(8, point! { x: 0.25, y: 1.25 }),
        RawPoint::new(9, point! { x: -0.5, y: 1.75 }),
    ]
}

pub(crate) fn cleaned_arcs() -> Vec<ArcFeature> {
    TopologyCleaner::new(&sample_lines(), &sample_points())
        .expect("line set is not empty")
        .run()
        .expect("cleaning succeeds")
}

#[test_log::test]
fn connect_lines_emits_expected_uuids() {
    let arcs = cleaned_arcs();
    assert_eq!(arcs.len(), 18);

    let uuids = arcs.iter().map(ArcFeature::topo_uuid).collect::<Vec<_>>();
    assert_eq!(
        uuids,
        vec![
            "10_0_forward",
            "10_1_forward",
            "10_2_forward",
            "10_3_forward",
            "10_4_forward",
            "10_5_forward",
            "10_6_forward",
            "10_7_forward",
            "11_0_forward",
            "11_1_forward",
            "12_forward",
            "added_1_forward",
            "added_2_forward",
            "added_3_forward",
            "added_6_forward",
            "added_7_forward",
            "added_8_forward",
            "added_9_forward",
        ]
    );
}

#[test]
fn split_children_walk_the_parent() {
    let arcs = cleaned_arcs();
    let arc = |uuid: &str| {
        arcs.iter()
            .find(|arc| arc.topo_uuid() == uuid)
            .unwrap_or_else(|| panic!("{uuid} missing"))
    };

    // the meridian is cut at every attachment and at the on-vertex point
    assert_eq!(
        arc("10_0_forward").geometry(),
        &wkt! { LINESTRING (0.0 0.0, 0.0 0.25) }
    );
    assert_eq!(
        arc("10_4_forward").geometry(),
        &wkt! { LINESTRING (0.0 1.0, 0.0 1.25) }
    );
    assert_eq!(
        arc("10_7_forward").geometry(),
        &wkt! { LINESTRING (0.0 1.75, 0.0 2.0) }
    );

    // the roundabout is cut once, at the attachment of point 2
    assert_eq!(
        arc("11_0_forward").geometry(),
        &wkt! { LINESTRING (0.0 2.0, 0.25 2.0, 0.25 2.125) }
    );
    assert_eq!(
        arc("11_1_forward").geometry(),
        &wkt! { LINESTRING (0.25 2.125, 0.25 2.25, 0.0 2.25) }
    );

    // the diagonal is untouched
    let unchanged = arc("12_forward");
    assert_eq!(unchanged.status(), TopoStatus::Unchanged);
    assert_eq!(
        unchanged.geometry(),
        &wkt! { LINESTRING (1.0 0.0, 2.0 1.0, 3.0 1.0, 3.0 2.0) }
    );

    // connectors run from the external point to its attachment
    assert_eq!(
        arc("added_1_forward").geometry(),
        &wkt! { LINESTRING (0.25 0.5, 0.0 0.5) }
    );
    assert_eq!(
        arc("added_2_forward").geometry(),
        &wkt! { LINESTRING (0.5 2.125, 0.25 2.125) }
    );
}

#[test]
fn connectors_have_two_coordinates() {
    for arc in cleaned_arcs() {
        if arc.status() == TopoStatus::Added {
            assert_eq!(arc.geometry().0.len(), 2, "{}", arc.topo_uuid());
        }
    }
}

#[test]
fn on_vertex_points_emit_no_connector_but_still_split() {
    let arcs = cleaned_arcs();
    let uuids = arcs.iter().map(ArcFeature::topo_uuid).collect::<Vec<_>>();

    // points 4 and 5 sat on vertices of line 10: no connector emitted
    assert!(!uuids.iter().any(|uuid| uuid.starts_with("added_4")));
    assert!(!uuids.iter().any(|uuid| uuid.starts_with("added_5")));

    // but point 5's vertex still became a split node of line 10
    let endpoint_keys = arcs
        .iter()
        .flat_map(|arc| [arc.from_point(), arc.to_point()])
        .map(PointKey::from)
        .collect::<Vec<_>>();
    let middle = PointKey::from(coord! { x: 0.0, y: 1.0 });
    assert_eq!(endpoint_keys.iter().filter(|key| **key == middle).count(), 2);
}

#[test]
fn topology_checker_tallies() {
    let arcs = cleaned_arcs();
    let checker = TopologyChecker::new(&arcs);

    assert_eq!(checker.lines_split().len(), 10);
    assert_eq!(checker.lines_unchanged().len(), 1);
    assert_eq!(checker.lines_added().len(), 7);
    assert_eq!(checker.nodes_added().len(), 7);
    assert_eq!(checker.intersections_added().len(), 20);
}

#[test]
fn shared_coordinates_are_endpoints_of_both_arcs() {
    let arcs = cleaned_arcs();

    let mut endpoints: FxHashMap<PointKey, usize> = FxHashMap::default();
    let mut interiors: FxHashMap<PointKey, usize> = FxHashMap::default();
    for arc in &arcs {
        let coords = &arc.geometry().0;
        *endpoints.entry(PointKey::from(coords[0])).or_insert(0) += 1;
        *endpoints
            .entry(PointKey::from(coords[coords.len() - 1]))
            .or_insert(0) += 1;
        for coord in &coords[1..coords.len() - 1] {
            *interiors.entry(PointKey::from(*coord)).or_insert(0) += 1;
        }
    }

    // an interior coordinate belongs to exactly one arc and is nobody
    // else's endpoint
    for (key, count) in &interiors {
        assert_eq!(*count, 1, "{key:?} is interior to several arcs");
        assert!(
            !endpoints.contains_key(key),
            "{key:?} is both interior and an endpoint"
        );
    }
}

#[test]
fn emitted_length_dominates_input_length() {
    let lines = sample_lines();
    let input_length: f64 = lines
        .iter()
        .map(|line| crate::geo::ellipsoidal_length(&line.geometry))
        .sum();
    let output_length: f64 = cleaned_arcs().iter().map(ArcFeature::length).sum();

    // attachment vertices do not stretch a line; connectors only add
    assert!(output_length >= input_length);
}

#[test]
fn cleaning_without_points_leaves_lines_whole() {
    let arcs = TopologyCleaner::new(&sample_lines(), &[])
        .expect("line set is not empty")
        .run()
        .expect("cleaning succeeds");

    // lines 10 and 11 share only their mutual endpoint, line 12 floats
    assert_eq!(arcs.len(), 3);
    assert!(arcs.iter().all(|arc| arc.status() == TopoStatus::Unchanged));
    assert_eq!(
        arcs.iter().map(ArcFeature::topo_uuid).collect::<Vec<_>>(),
        vec!["10_forward", "11_forward", "12_forward"]
    );
}

#[test]
fn degenerate_lines_are_discarded_silently() {
    let lines = vec![
        RawLine::new(1, wkt! { LINESTRING (0.0 0.0, 0.0 1.0) }),
        RawLine::new(2, wkt! { LINESTRING (5.0 5.0, 5.0 5.0) }),
    ];

    let arcs = TopologyCleaner::new(&lines, &[])
        .expect("line set is not empty")
        .run()
        .expect("cleaning succeeds");

    assert_eq!(arcs.len(), 1);
    assert_eq!(arcs[0].topo_uuid(), "1_forward");
}

#[test]
fn empty_line_set_is_rejected() {
    assert!(TopologyCleaner::new(&[], &[]).is_err());
}

#[test_log::test]
fn improved_lines_chop_into_two_vertex_arcs() {
    let arcs = TopologyCleaner::new(&sample_lines(), &sample_points())
        .expect("line set is not empty")
        .improved_lines(true)
        .run()
        .expect("cleaning succeeds");

    // 22 segments across the 18 whole arcs, each cut into 2^(4-1) pieces
    assert_eq!(arcs.len(), 176);

    let uuids = arcs.iter().map(ArcFeature::topo_uuid).collect::<Vec<_>>();
    let unique = uuids.iter().collect::<std::collections::BTreeSet<_>>();
    assert_eq!(unique.len(), uuids.len());
    assert!(uuids.iter().all(|uuid| uuid.contains('_')));

    for arc in &arcs {
        assert_eq!(arc.geometry().0.len(), 2);
    }
}

#[test]
fn cleaning_is_deterministic() {
    let first = cleaned_arcs();
    let second = cleaned_arcs();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.topo_uuid(), b.topo_uuid());
        assert_eq!(a.geometry(), b.geometry());
        assert_eq!(a.status(), b.status());
    }
}

#[test]
fn arc_record_surface() {
    let arcs = cleaned_arcs();
    let record = arcs[0].record();

    assert_eq!(record["topo_uuid"], "10_0_forward");
    assert_eq!(record["topo_status"], "split");
    assert_eq!(record["direction"], "forward");
    assert_eq!(record["id"], "10");
    assert_eq!(record["geometry"][0][0], 0.0);

    let reversed = arcs[0].reversed();
    assert_eq!(reversed.record()["topo_uuid"], "10_0_backward");
    assert_relative_eq!(reversed.length(), arcs[0].length());
}

#[test]
fn backward_twin_reverses_geometry() {
    let arcs = cleaned_arcs();
    let forward = &arcs[0];
    let backward = forward.reversed();

    let mut coords = forward.geometry().0.clone();
    coords.reverse();
    assert_eq!(backward.geometry().0, coords);
    assert_eq!(backward.from_point(), forward.to_point());
    assert_eq!(backward.to_point(), forward.from_point());
    assert_eq!(backward.attributes(), forward.attributes());
}

#[test]
fn attachment_points_are_exact_samples() {
    // every connector ends on a dyadic sample of its host segment
    let expected: Vec<Coord<f64>> = vec![
        coord! { x: 0.0, y: 0.5 },
        coord! { x: 0.25, y: 2.125 },
        coord! { x: 0.0, y: 1.5 },
        coord! { x: 0.0, y: 0.25 },
        coord! { x: 0.0, y: 0.75 },
        coord! { x: 0.0, y: 1.25 },
        coord! { x: 0.0, y: 1.75 },
    ];

    let arcs = cleaned_arcs();
    let attachments = arcs
        .iter()
        .filter(|arc| arc.status() == TopoStatus::Added)
        .map(|arc| arc.to_point())
        .collect::<Vec<_>>();

    assert_eq!(attachments, expected);
}
