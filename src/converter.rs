//! Projections between the GPX model and the geometry containers.
//!
//! X is longitude and Y is latitude, always. A Z-bearing layout carries
//! elevation in the Z slot and an M-bearing layout carries the timestamp's
//! measure value (seconds since the Unix epoch) in the M slot. Projecting a
//! dimension the model does not populate yields `0.0` in that slot; the
//! inverse constructors populate exactly the fields the layout implies and
//! leave everything else unset.

use crate::geom::{Layout, LineString, MultiLineString, Point};
use crate::model::{Route, Track, TrackSegment, Waypoint};
use crate::time::{m_to_time, time_to_m};

impl Waypoint {
    /// Projects the waypoint into a point with the requested layout.
    pub fn geom(&self, layout: Layout) -> Point {
        let mut coords = Vec::with_capacity(layout.dim());
        coords.push(self.lon);
        coords.push(self.lat);
        if layout.has_z() {
            coords.push(self.ele.unwrap_or(0.0));
        }
        if layout.has_m() {
            coords.push(self.time.map(time_to_m).unwrap_or(0.0));
        }
        Point::new(layout, coords)
    }

    /// Builds a waypoint from a point, populating only the fields the
    /// point's layout implies.
    pub fn from_point(point: &Point) -> Self {
        let mut wpt = Waypoint::new(point.y(), point.x());
        if let Some(z) = point.z() {
            wpt.ele = Some(z);
        }
        if let Some(m) = point.m() {
            wpt.time = Some(m_to_time(m));
        }
        wpt
    }
}

impl Route {
    /// Projects the route into a line string, one coordinate per point.
    pub fn geom(&self, layout: Layout) -> LineString {
        line_from_points(&self.points, layout)
    }

    /// Builds a route from a line string, one point per coordinate.
    pub fn from_line_string(line: &LineString) -> Self {
        Route {
            points: points_from_line(line),
            ..Route::default()
        }
    }
}

impl TrackSegment {
    /// Projects the segment into a line string, one coordinate per point.
    pub fn geom(&self, layout: Layout) -> LineString {
        line_from_points(&self.points, layout)
    }

    /// Builds a segment from a line string, one point per coordinate.
    pub fn from_line_string(line: &LineString) -> Self {
        TrackSegment {
            points: points_from_line(line),
        }
    }
}

impl Track {
    /// Projects the track into a multi-line-string, one component line per
    /// segment. Segment boundaries are preserved exactly.
    pub fn geom(&self, layout: Layout) -> MultiLineString {
        MultiLineString::new(
            layout,
            self.segments
                .iter()
                .map(|segment| segment.geom(layout).coords)
                .collect(),
        )
    }

    /// Builds a track from a multi-line-string, one segment per component
    /// line.
    pub fn from_multi_line_string(lines: &MultiLineString) -> Self {
        Track {
            segments: lines
                .coords
                .iter()
                .map(|coords| {
                    TrackSegment::from_line_string(&LineString::new(lines.layout, coords.clone()))
                })
                .collect(),
            ..Track::default()
        }
    }
}

fn line_from_points(points: &[Waypoint], layout: Layout) -> LineString {
    LineString::new(
        layout,
        points.iter().map(|point| point.geom(layout).coords).collect(),
    )
}

fn points_from_line(line: &LineString) -> Vec<Waypoint> {
    line.coords
        .iter()
        .map(|coords| Waypoint::from_point(&Point::new(line.layout, coords.clone())))
        .collect()
}
