use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

use crate::error::{GpxError, Result};
use crate::model::*;
use crate::time::{parse_time, parse_year};

/// Parse a GPX XML string into a document tree.
pub fn parse_gpx(xml: &str) -> Result<Gpx> {
    let mut reader = Reader::from_str(xml);
    let mut doc: Option<Gpx> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => doc = Some(parse_document(&e, &mut reader)?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"gpx" {
                    doc = Some(document_from_attrs(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    doc.ok_or(GpxError::MissingRoot)
}

/// Read the version/creator attributes from the open tag. The namespace and
/// schema-location attributes are not stored; serialization re-emits the
/// fixed GPX 1.0 header.
fn document_from_attrs(e: &BytesStart<'_>) -> Gpx {
    let mut gpx = Gpx::default();
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"version" => gpx.version = attr_text(&attr),
            b"creator" => gpx.creator = attr_text(&attr),
            _ => {}
        }
    }
    gpx
}

fn parse_document<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Gpx> {
    let mut gpx = document_from_attrs(start);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"metadata" => gpx.metadata = Some(parse_metadata(reader)?),
                b"wpt" => gpx.waypoints.push(parse_waypoint(&e, reader, "wpt")?),
                b"rte" => gpx.routes.push(parse_route(reader)?),
                b"trk" => gpx.tracks.push(parse_track(reader)?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"metadata" => gpx.metadata = Some(Metadata::default()),
                b"wpt" => {
                    let (lat, lon) = parse_lat_lon(&e, "wpt")?;
                    gpx.waypoints.push(Waypoint::new(lat, lon));
                }
                b"rte" => gpx.routes.push(Route::default()),
                b"trk" => gpx.tracks.push(Track::default()),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"gpx" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(gpx)
}

/// Parse lat/lon attributes from a point element's open tag.
fn parse_lat_lon(e: &BytesStart<'_>, element: &'static str) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| GpxError::XmlParse(e.into()))?;
        let key = attr.key.local_name();
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match key.as_ref() {
            b"lat" => {
                lat = Some(val.parse::<f64>().map_err(|_| GpxError::InvalidAttribute {
                    element,
                    attribute: "lat",
                    value: val.to_string(),
                })?);
            }
            b"lon" => {
                lon = Some(val.parse::<f64>().map_err(|_| GpxError::InvalidAttribute {
                    element,
                    attribute: "lon",
                    value: val.to_string(),
                })?);
            }
            _ => {}
        }
    }

    let lat = lat.ok_or(GpxError::MissingAttribute {
        element,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(GpxError::MissingAttribute {
        element,
        attribute: "lon",
    })?;

    Ok((lat, lon))
}

/// Parse a point element (wpt, rtept, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_waypoint<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    element: &'static str,
) -> Result<Waypoint> {
    let (lat, lon) = parse_lat_lon(start, element)?;
    let mut point = Waypoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => point.ele = Some(read_f64(reader, &e, "ele")?),
                b"time" => point.time = Some(read_time(reader, &e)?),
                b"magvar" => point.magvar = Some(read_f64(reader, &e, "magvar")?),
                b"geoidheight" => {
                    point.geoidheight = Some(read_f64(reader, &e, "geoidheight")?);
                }
                b"name" => point.name = Some(read_text_owned(reader, &e)?),
                b"cmt" => point.cmt = Some(read_text_owned(reader, &e)?),
                b"desc" => point.desc = Some(read_text_owned(reader, &e)?),
                b"src" => point.src = Some(read_text_owned(reader, &e)?),
                b"link" => point.link.push(parse_link(&e, reader)?),
                b"sym" => point.sym = Some(read_text_owned(reader, &e)?),
                b"type" => point.point_type = Some(read_text_owned(reader, &e)?),
                b"fix" => point.fix = Some(read_text_owned(reader, &e)?),
                b"sat" => point.sat = Some(read_i32(reader, &e, "sat")?),
                b"hdop" => point.hdop = Some(read_f64(reader, &e, "hdop")?),
                b"vdop" => point.vdop = Some(read_f64(reader, &e, "vdop")?),
                b"pdop" => point.pdop = Some(read_f64(reader, &e, "pdop")?),
                b"ageofdgpsdata" => {
                    point.ageofdgpsdata = Some(read_f64(reader, &e, "ageofdgpsdata")?);
                }
                b"dgpsid" => point.dgpsid.push(read_i32(reader, &e, "dgpsid")?),
                _ => {
                    // Skip unknown/extensions elements
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    point.link.push(link_from_attrs(&e));
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(point)
}

fn link_from_attrs(e: &BytesStart<'_>) -> Link {
    let mut link = Link::default();
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"href" {
            link.href = attr_text(&attr);
        }
    }
    link
}

/// Parse a `<link>` element.
fn parse_link<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Link> {
    let mut link = link_from_attrs(start);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"text" => link.text = Some(read_text_owned(reader, &e)?),
                b"type" => link.link_type = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"link" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(link)
}

/// Parse a `<rte>` element.
fn parse_route<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Route> {
    let mut route = Route::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => route.name = Some(read_text_owned(reader, &e)?),
                b"cmt" => route.cmt = Some(read_text_owned(reader, &e)?),
                b"desc" => route.desc = Some(read_text_owned(reader, &e)?),
                b"src" => route.src = Some(read_text_owned(reader, &e)?),
                b"link" => route.link.push(parse_link(&e, reader)?),
                b"number" => route.number = Some(read_i32(reader, &e, "number")?),
                b"type" => route.route_type = Some(read_text_owned(reader, &e)?),
                b"rtept" => route.points.push(parse_waypoint(&e, reader, "rtept")?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"rtept" => {
                    let (lat, lon) = parse_lat_lon(&e, "rtept")?;
                    route.points.push(Waypoint::new(lat, lon));
                }
                b"link" => route.link.push(link_from_attrs(&e)),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rte" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(route)
}

/// Parse a `<trk>` element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"cmt" => track.cmt = Some(read_text_owned(reader, &e)?),
                b"desc" => track.desc = Some(read_text_owned(reader, &e)?),
                b"src" => track.src = Some(read_text_owned(reader, &e)?),
                b"link" => track.link.push(parse_link(&e, reader)?),
                b"number" => track.number = Some(read_i32(reader, &e, "number")?),
                b"type" => track.track_type = Some(read_text_owned(reader, &e)?),
                // Empty segments are kept: segment boundaries carry
                // pause/resume information and must survive a round-trip.
                b"trkseg" => track.segments.push(parse_segment(reader)?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"trkseg" => track.segments.push(TrackSegment::default()),
                b"link" => track.link.push(link_from_attrs(&e)),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a `<trkseg>` element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<TrackSegment> {
    let mut segment = TrackSegment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_waypoint(&e, reader, "trkpt")?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = parse_lat_lon(&e, "trkpt")?;
                    segment.points.push(Waypoint::new(lat, lon));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(segment)
}

/// Parse a `<metadata>` element.
fn parse_metadata<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Metadata> {
    let mut metadata = Metadata::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => metadata.name = Some(read_text_owned(reader, &e)?),
                b"desc" => metadata.desc = Some(read_text_owned(reader, &e)?),
                b"author" => metadata.author = Some(parse_person(reader)?),
                b"copyright" => metadata.copyright = Some(parse_copyright(&e, reader)?),
                b"link" => metadata.link.push(parse_link(&e, reader)?),
                b"time" => metadata.time = Some(read_time(reader, &e)?),
                b"keywords" => metadata.keywords = Some(read_text_owned(reader, &e)?),
                b"bounds" => {
                    metadata.bounds = Some(parse_bounds(&e)?);
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"bounds" => metadata.bounds = Some(parse_bounds(&e)?),
                b"link" => metadata.link.push(link_from_attrs(&e)),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"metadata" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(metadata)
}

/// Parse an `<author>` element.
fn parse_person<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Person> {
    let mut person = Person::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => person.name = Some(read_text_owned(reader, &e)?),
                b"email" => {
                    person.email = Some(email_from_attrs(&e));
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
                b"link" => person.link = Some(parse_link(&e, reader)?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"email" => person.email = Some(email_from_attrs(&e)),
                b"link" => person.link = Some(link_from_attrs(&e)),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"author" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(person)
}

fn email_from_attrs(e: &BytesStart<'_>) -> Email {
    let mut email = Email::default();
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"id" => email.id = attr_text(&attr),
            b"domain" => email.domain = attr_text(&attr),
            _ => {}
        }
    }
    email
}

/// Parse a `<copyright>` element. The author attribute may be absent on
/// input; the year field is lenient-parsed.
fn parse_copyright<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Copyright> {
    let mut copyright = Copyright::default();
    for attr in start.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"author" {
            copyright.author = attr_text(&attr);
        }
    }

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"year" => {
                    let text = read_text_owned(reader, &e)?;
                    copyright.year = Some(parse_year(&text)?);
                }
                b"license" => copyright.license = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader.read_to_end(e.name()).map_err(GpxError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"copyright" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(copyright)
}

/// Parse a `<bounds>` element's corner attributes. Missing corners default
/// to zero; non-numeric text is an error.
fn parse_bounds(e: &BytesStart<'_>) -> Result<Bounds> {
    let mut bounds = Bounds::default();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| GpxError::XmlParse(e.into()))?;
        let attribute = match attr.key.local_name().as_ref() {
            b"minlat" => "minlat",
            b"minlon" => "minlon",
            b"maxlat" => "maxlat",
            b"maxlon" => "maxlon",
            _ => continue,
        };
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        let value = val.parse::<f64>().map_err(|_| GpxError::InvalidAttribute {
            element: "bounds",
            attribute,
            value: val.to_string(),
        })?;
        match attribute {
            "minlat" => bounds.minlat = value,
            "minlon" => bounds.minlon = value,
            "maxlat" => bounds.maxlat = value,
            _ => bounds.maxlon = value,
        }
    }
    Ok(bounds)
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references.
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                match unescape(raw) {
                    Ok(s) => text.push_str(&s),
                    Err(_) => text.push_str(raw),
                }
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(s);
            }
            Ok(Event::GeneralRef(e)) => {
                // Character references (&#60; &#x3C;) and predefined entities
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {} // Unknown entity, skip
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}

fn read_f64<'a>(
    reader: &mut Reader<&'a [u8]>,
    e: &BytesStart<'_>,
    element: &'static str,
) -> Result<f64> {
    let text = read_text_owned(reader, e)?;
    text.trim().parse().map_err(|_| GpxError::InvalidElement {
        element,
        value: text.trim().to_string(),
    })
}

fn read_i32<'a>(
    reader: &mut Reader<&'a [u8]>,
    e: &BytesStart<'_>,
    element: &'static str,
) -> Result<i32> {
    let text = read_text_owned(reader, e)?;
    text.trim().parse().map_err(|_| GpxError::InvalidElement {
        element,
        value: text.trim().to_string(),
    })
}

fn read_time<'a>(
    reader: &mut Reader<&'a [u8]>,
    e: &BytesStart<'_>,
) -> Result<chrono::DateTime<chrono::Utc>> {
    let text = read_text_owned(reader, e)?;
    parse_time(&text)
}

/// Attribute value as unescaped text.
fn attr_text(attr: &Attribute<'_>) -> String {
    let raw = std::str::from_utf8(&attr.value).unwrap_or_default();
    match unescape(raw) {
        Ok(cow) => cow.into_owned(),
        Err(_) => raw.to_string(),
    }
}
