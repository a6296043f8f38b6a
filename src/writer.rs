use std::io::{self, Write};

use quick_xml::escape::escape;

use crate::error::Result;
use crate::model::*;
use crate::time::format_time;

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/0";
const SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/0 http://www.topografix.com/GPX/1/0/gpx.xsd";

/// Serialize a document. `format` is `None` for the compact single-line form
/// or `Some((prefix, indent))` for one element per line.
pub fn write_gpx<W: Write>(gpx: &Gpx, sink: W, format: Option<(&str, &str)>) -> Result<()> {
    let mut out = XmlEmitter::new(sink, format);

    out.start(
        "gpx",
        &[
            ("version", gpx.version.as_str()),
            ("creator", gpx.creator.as_str()),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xmlns", GPX_NAMESPACE),
            ("xsi:schemaLocation", SCHEMA_LOCATION),
        ],
    )?;
    if let Some(metadata) = &gpx.metadata {
        write_metadata(&mut out, metadata)?;
    }
    for wpt in &gpx.waypoints {
        write_waypoint(&mut out, "wpt", wpt)?;
    }
    for rte in &gpx.routes {
        write_route(&mut out, rte)?;
    }
    for trk in &gpx.tracks {
        write_track(&mut out, trk)?;
    }
    out.end("gpx")?;

    Ok(())
}

fn write_waypoint<W: Write>(out: &mut XmlEmitter<W>, tag: &str, wpt: &Waypoint) -> Result<()> {
    let lat = wpt.lat.to_string();
    let lon = wpt.lon.to_string();
    out.start(tag, &[("lat", lat.as_str()), ("lon", lon.as_str())])?;
    write_f64(out, "ele", wpt.ele)?;
    if let Some(time) = wpt.time {
        out.leaf("time", &format_time(time))?;
    }
    write_f64(out, "magvar", wpt.magvar)?;
    write_f64(out, "geoidheight", wpt.geoidheight)?;
    write_text(out, "name", &wpt.name)?;
    write_text(out, "cmt", &wpt.cmt)?;
    write_text(out, "desc", &wpt.desc)?;
    write_text(out, "src", &wpt.src)?;
    for link in &wpt.link {
        write_link(out, link)?;
    }
    write_text(out, "sym", &wpt.sym)?;
    write_text(out, "type", &wpt.point_type)?;
    write_text(out, "fix", &wpt.fix)?;
    if let Some(sat) = wpt.sat {
        out.leaf("sat", &sat.to_string())?;
    }
    write_f64(out, "hdop", wpt.hdop)?;
    write_f64(out, "vdop", wpt.vdop)?;
    write_f64(out, "pdop", wpt.pdop)?;
    write_f64(out, "ageofdgpsdata", wpt.ageofdgpsdata)?;
    for id in &wpt.dgpsid {
        out.leaf("dgpsid", &id.to_string())?;
    }
    out.end(tag)
}

fn write_link<W: Write>(out: &mut XmlEmitter<W>, link: &Link) -> Result<()> {
    out.start("link", &[("href", link.href.as_str())])?;
    write_text(out, "text", &link.text)?;
    write_text(out, "type", &link.link_type)?;
    out.end("link")
}

fn write_route<W: Write>(out: &mut XmlEmitter<W>, rte: &Route) -> Result<()> {
    out.start("rte", &[])?;
    write_text(out, "name", &rte.name)?;
    write_text(out, "cmt", &rte.cmt)?;
    write_text(out, "desc", &rte.desc)?;
    write_text(out, "src", &rte.src)?;
    for link in &rte.link {
        write_link(out, link)?;
    }
    if let Some(number) = rte.number {
        out.leaf("number", &number.to_string())?;
    }
    write_text(out, "type", &rte.route_type)?;
    for point in &rte.points {
        write_waypoint(out, "rtept", point)?;
    }
    out.end("rte")
}

fn write_track<W: Write>(out: &mut XmlEmitter<W>, trk: &Track) -> Result<()> {
    out.start("trk", &[])?;
    write_text(out, "name", &trk.name)?;
    write_text(out, "cmt", &trk.cmt)?;
    write_text(out, "desc", &trk.desc)?;
    write_text(out, "src", &trk.src)?;
    for link in &trk.link {
        write_link(out, link)?;
    }
    if let Some(number) = trk.number {
        out.leaf("number", &number.to_string())?;
    }
    write_text(out, "type", &trk.track_type)?;
    for segment in &trk.segments {
        out.start("trkseg", &[])?;
        for point in &segment.points {
            write_waypoint(out, "trkpt", point)?;
        }
        out.end("trkseg")?;
    }
    out.end("trk")
}

fn write_metadata<W: Write>(out: &mut XmlEmitter<W>, metadata: &Metadata) -> Result<()> {
    out.start("metadata", &[])?;
    write_text(out, "name", &metadata.name)?;
    write_text(out, "desc", &metadata.desc)?;
    if let Some(author) = &metadata.author {
        write_person(out, author)?;
    }
    if let Some(copyright) = &metadata.copyright {
        write_copyright(out, copyright)?;
    }
    for link in &metadata.link {
        write_link(out, link)?;
    }
    if let Some(time) = metadata.time {
        out.leaf("time", &format_time(time))?;
    }
    write_text(out, "keywords", &metadata.keywords)?;
    if let Some(bounds) = &metadata.bounds {
        let minlat = bounds.minlat.to_string();
        let minlon = bounds.minlon.to_string();
        let maxlat = bounds.maxlat.to_string();
        let maxlon = bounds.maxlon.to_string();
        out.start(
            "bounds",
            &[
                ("minlat", minlat.as_str()),
                ("minlon", minlon.as_str()),
                ("maxlat", maxlat.as_str()),
                ("maxlon", maxlon.as_str()),
            ],
        )?;
        out.end("bounds")?;
    }
    out.end("metadata")
}

fn write_person<W: Write>(out: &mut XmlEmitter<W>, person: &Person) -> Result<()> {
    out.start("author", &[])?;
    write_text(out, "name", &person.name)?;
    if let Some(email) = &person.email {
        out.start(
            "email",
            &[("id", email.id.as_str()), ("domain", email.domain.as_str())],
        )?;
        out.end("email")?;
    }
    if let Some(link) = &person.link {
        write_link(out, link)?;
    }
    out.end("author")
}

fn write_copyright<W: Write>(out: &mut XmlEmitter<W>, copyright: &Copyright) -> Result<()> {
    out.start("copyright", &[("author", copyright.author.as_str())])?;
    if let Some(year) = copyright.year {
        out.leaf("year", &year.to_string())?;
    }
    write_text(out, "license", &copyright.license)?;
    out.end("copyright")
}

fn write_text<W: Write>(out: &mut XmlEmitter<W>, name: &str, value: &Option<String>) -> Result<()> {
    if let Some(value) = value {
        out.leaf(name, value)?;
    }
    Ok(())
}

fn write_f64<W: Write>(out: &mut XmlEmitter<W>, name: &str, value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        out.leaf(name, &value.to_string())?;
    }
    Ok(())
}

/// Low-level element emitter.
///
/// Produces the crate's canonical layout: every element starts on its own
/// line (prefix plus one indent repetition per depth level), a text element
/// stays on one line, and a childless container closes on the same line as
/// it opens (`<wpt lat="…" lon="…"></wpt>`). CDATA is never emitted; text
/// and attribute values are entity-escaped.
struct XmlEmitter<W: Write> {
    sink: W,
    prefix: String,
    indent: String,
    indented: bool,
    // One entry per open element: has it emitted a child element yet?
    stack: Vec<bool>,
}

impl<W: Write> XmlEmitter<W> {
    fn new(sink: W, format: Option<(&str, &str)>) -> Self {
        let (prefix, indent) = format.unwrap_or(("", ""));
        Self {
            sink,
            prefix: prefix.to_string(),
            indent: indent.to_string(),
            indented: format.is_some(),
            stack: Vec::new(),
        }
    }

    fn line_break(&mut self) -> io::Result<()> {
        if self.indented {
            self.sink.write_all(b"\n")?;
            self.sink.write_all(self.prefix.as_bytes())?;
            for _ in 0..self.stack.len() {
                self.sink.write_all(self.indent.as_bytes())?;
            }
        }
        Ok(())
    }

    fn begin_child(&mut self) -> io::Result<()> {
        match self.stack.last_mut() {
            Some(open) => {
                *open = true;
                self.line_break()
            }
            // The root element starts the first line: prefix, no newline.
            None => {
                if self.indented {
                    self.sink.write_all(self.prefix.as_bytes())?;
                }
                Ok(())
            }
        }
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        write!(self.sink, "<{name}")?;
        for (key, value) in attrs {
            write!(self.sink, " {key}=\"{}\"", escape(*value))?;
        }
        write!(self.sink, ">")
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.begin_child()?;
        self.open_tag(name, attrs)?;
        self.stack.push(false);
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        let had_children = self.stack.pop().unwrap_or(false);
        if had_children {
            self.line_break()?;
        }
        write!(self.sink, "</{name}>")?;
        Ok(())
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        self.begin_child()?;
        write!(self.sink, "<{name}>{}</{name}>", escape(text))?;
        Ok(())
    }
}
