//! Decoding for the topology-encoded landmass geometry.
//!
//! The world outline feed shares arcs between neighbouring shapes and
//! delta-encodes quantized positions. This module turns the subset of that
//! format the feed actually uses (polygons, multipolygons, collections)
//! into plain rings of geographic points for the renderer.

use std::collections::HashMap;

use serde::Deserialize;

use crate::state::projection::GeoPoint;

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, Geometry>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    GeometryCollection { geometries: Vec<Geometry> },
    Polygon { arcs: Vec<Vec<i32>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i32>>> },
    LineString { arcs: Vec<i32> },
    MultiLineString { arcs: Vec<Vec<i32>> },
}

/// All boundary rings of the named topology object, in degrees.
pub fn object_outlines(topology: &Topology, name: &str) -> Vec<Vec<GeoPoint>> {
    let mut out = Vec::new();
    if let Some(geometry) = topology.objects.get(name) {
        collect_rings(topology, geometry, &mut out);
    }
    out
}

fn collect_rings(topology: &Topology, geometry: &Geometry, out: &mut Vec<Vec<GeoPoint>>) {
    match geometry {
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_rings(topology, g, out);
            }
        }
        Geometry::Polygon { arcs } => {
            out.extend(arcs.iter().map(|ring| decode_ring(topology, ring)));
        }
        Geometry::MultiPolygon { arcs } => {
            for polygon in arcs {
                out.extend(polygon.iter().map(|ring| decode_ring(topology, ring)));
            }
        }
        Geometry::LineString { arcs } => {
            out.push(decode_ring(topology, arcs));
        }
        Geometry::MultiLineString { arcs } => {
            out.extend(arcs.iter().map(|line| decode_ring(topology, line)));
        }
    }
}

/// Stitch the arcs of one ring together. Consecutive arcs share their
/// junction point, so every arc after the first drops its first position.
fn decode_ring(topology: &Topology, ring: &[i32]) -> Vec<GeoPoint> {
    let mut points: Vec<GeoPoint> = Vec::new();
    for &index in ring {
        let arc = decode_arc(topology, index);
        if points.is_empty() {
            points.extend(arc);
        } else {
            points.extend(arc.into_iter().skip(1));
        }
    }
    points
}

/// One arc, oriented. A negative (ones-complement) index selects the arc
/// reversed.
fn decode_arc(topology: &Topology, index: i32) -> Vec<GeoPoint> {
    let (idx, reversed) = if index < 0 {
        (!index as usize, true)
    } else {
        (index as usize, false)
    };
    let Some(arc) = topology.arcs.get(idx) else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(arc.len());
    match topology.transform {
        Some(t) => {
            // Quantized: positions are running deltas in grid units.
            let (mut x, mut y) = (0.0, 0.0);
            for position in arc {
                if position.len() < 2 {
                    continue;
                }
                x += position[0];
                y += position[1];
                points.push(GeoPoint::new(
                    x * t.scale[0] + t.translate[0],
                    y * t.scale[1] + t.translate[1],
                ));
            }
        }
        None => {
            for position in arc {
                if position.len() >= 2 {
                    points.push(GeoPoint::new(position[0], position[1]));
                }
            }
        }
    }
    if reversed {
        points.reverse();
    }
    points
}
