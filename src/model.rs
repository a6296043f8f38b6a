//! The GPX object model.
//!
//! Value aggregates mirroring the GPX 1.0 element tree. Optional elements are
//! `Option` fields and repeated elements are `Vec`s; a field that is `None`
//! (or an empty `Vec`) is omitted entirely on serialization. Documents are
//! built either by [`Gpx::read`]/[`Gpx::from_str`] or from geometry values
//! via the constructors in the converter module.

use std::io::{Read, Write};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{parser, writer};

/// A GPX document: the `<gpx>` root element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gpx {
    pub version: String,
    pub creator: String,
    pub metadata: Option<Metadata>,
    pub waypoints: Vec<Waypoint>,
    pub routes: Vec<Route>,
    pub tracks: Vec<Track>,
}

impl Gpx {
    /// Reads a full document from a byte source.
    pub fn read<R: Read>(mut source: R) -> Result<Self> {
        let mut xml = String::new();
        source.read_to_string(&mut xml)?;
        parser::parse_gpx(&xml)
    }

    /// Serializes the document with no whitespace between elements.
    pub fn write<W: Write>(&self, sink: W) -> Result<()> {
        writer::write_gpx(self, sink, None)
    }

    /// Serializes the document with one element per line; each line starts
    /// with `prefix` followed by one copy of `indent` per nesting level.
    ///
    /// This is the canonical form: any document written this way reads back
    /// to an equal tree, and a document read from this form is reproduced
    /// byte-for-byte.
    pub fn write_indent<W: Write>(&self, sink: W, prefix: &str, indent: &str) -> Result<()> {
        writer::write_gpx(self, sink, Some((prefix, indent)))
    }
}

impl FromStr for Gpx {
    type Err = crate::error::GpxError;

    fn from_str(s: &str) -> Result<Self> {
        parser::parse_gpx(s)
    }
}

/// A single georeferenced point (used for `wpt`, `rtept` and `trkpt`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude in degrees. Range is not validated.
    pub lat: f64,
    /// Longitude in degrees. Range is not validated.
    pub lon: f64,
    /// Elevation in meters
    pub ele: Option<f64>,
    /// Timestamp, UTC
    pub time: Option<DateTime<Utc>>,
    /// Magnetic variation in degrees
    pub magvar: Option<f64>,
    /// Geoid height in meters
    pub geoidheight: Option<f64>,
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub desc: Option<String>,
    pub src: Option<String>,
    pub link: Vec<Link>,
    pub sym: Option<String>,
    pub point_type: Option<String>,
    /// Fix type, stored as raw text ("none", "2d", "3d", "dgps", "pgps" per
    /// the schema; unknown values pass through unchanged)
    pub fix: Option<String>,
    /// Number of satellites
    pub sat: Option<i32>,
    pub hdop: Option<f64>,
    pub vdop: Option<f64>,
    pub pdop: Option<f64>,
    /// Seconds since the last DGPS update
    pub ageofdgpsdata: Option<f64>,
    /// DGPS station IDs
    pub dgpsid: Vec<i32>,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Self::default()
        }
    }
}

/// A `<link>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub text: Option<String>,
    pub link_type: Option<String>,
}

/// A `<rte>` element: an ordered sequence of route points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub desc: Option<String>,
    pub src: Option<String>,
    pub link: Vec<Link>,
    pub number: Option<i32>,
    pub route_type: Option<String>,
    pub points: Vec<Waypoint>,
}

/// A `<trk>` element: an ordered sequence of segments.
///
/// Segment breaks mark where a receiver paused and resumed logging; no
/// connectivity is implied between segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub desc: Option<String>,
    pub src: Option<String>,
    pub link: Vec<Link>,
    pub number: Option<i32>,
    pub track_type: Option<String>,
    pub segments: Vec<TrackSegment>,
}

/// A `<trkseg>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub points: Vec<Waypoint>,
}

/// A `<metadata>` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub author: Option<Person>,
    pub copyright: Option<Copyright>,
    pub link: Vec<Link>,
    pub time: Option<DateTime<Utc>>,
    pub keywords: Option<String>,
    pub bounds: Option<Bounds>,
}

/// An `<author>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub link: Option<Link>,
}

/// An `<email>` element, split into id and domain attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub domain: String,
}

/// A `<copyright>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Copyright {
    pub author: String,
    /// Year, lenient-parsed: trailing zone noise on input is discarded
    pub year: Option<i32>,
    pub license: Option<String>,
}

/// A `<bounds>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}
