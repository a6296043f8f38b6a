//! Bidirectional converter between GPX 1.0 documents and an in-memory object
//! model, with projections onto dimension-tagged geometry values.
//!
//! Reading builds a [`Gpx`] tree from XML; writing reproduces the crate's
//! canonical form byte-for-byte for any document it previously read.
//! Coordinate-bearing elements project onto [`Point`], [`LineString`] and
//! [`MultiLineString`] values whose [`Layout`] says which of X, Y, Z and M
//! are present: X/Y are always longitude/latitude, Z carries elevation and M
//! carries the timestamp as seconds since the Unix epoch.
//!
//! ```
//! use gpx_geom::{Gpx, Layout};
//!
//! let gpx: Gpx = r#"<gpx version="1.0" creator="example">
//! <rte>
//! <rtept lat="42.43095" lon="-71.107628"><ele>23.4696</ele></rtept>
//! <rtept lat="42.43124" lon="-71.109236"><ele>26.56189</ele></rtept>
//! </rte>
//! </gpx>"#
//!     .parse()?;
//!
//! let line = gpx.routes[0].geom(Layout::Xyz);
//! assert_eq!(line.coords[0], vec![-71.107628, 42.43095, 23.4696]);
//!
//! let mut out = Vec::new();
//! gpx.write_indent(&mut out, "", "\t")?;
//! # Ok::<(), gpx_geom::GpxError>(())
//! ```

mod converter;
pub mod error;
pub mod geom;
pub mod model;
mod parser;
pub mod time;
mod writer;

pub use error::GpxError;
pub use geom::{Layout, LineString, MultiLineString, Point};
pub use model::{
    Bounds, Copyright, Email, Gpx, Link, Metadata, Person, Route, Track, TrackSegment, Waypoint,
};
