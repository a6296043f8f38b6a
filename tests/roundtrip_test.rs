use chrono::TimeZone;
use chrono::Utc;

use gpx_geom::{Copyright, Gpx, Layout, Link, Metadata, Route, Waypoint};

const HEADER: &str = concat!(
    "<gpx version=\"1.0\" creator=\"ExpertGPS 1.1 - http://www.topografix.com\"",
    " xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"",
    " xmlns=\"http://www.topografix.com/GPX/1/0\"",
    " xsi:schemaLocation=\"http://www.topografix.com/GPX/1/0 http://www.topografix.com/GPX/1/0/gpx.xsd\">",
);

fn read(data: &str) -> Gpx {
    Gpx::read(data.as_bytes()).unwrap()
}

fn render(gpx: &Gpx) -> String {
    let mut out = Vec::new();
    gpx.write_indent(&mut out, "", "\t").unwrap();
    String::from_utf8(out).unwrap()
}

fn assert_round_trip(data: &str, expected: &Gpx) {
    let gpx = read(data);
    assert_eq!(&gpx, expected);
    assert_eq!(render(&gpx), data);
}

// ---- byte-for-byte round trips ----

#[test]
fn test_empty_document_round_trip() {
    let data = format!("{HEADER}</gpx>");
    let expected = Gpx {
        version: "1.0".to_string(),
        creator: "ExpertGPS 1.1 - http://www.topografix.com".to_string(),
        ..Gpx::default()
    };
    assert_round_trip(&data, &expected);
}

#[test]
fn test_waypoint_document_round_trip() {
    let data = concat!(
        "{HEADER}\n",
        "\t<wpt lat=\"42.438878\" lon=\"-71.119277\">\n",
        "\t\t<ele>44.586548</ele>\n",
        "\t\t<time>2001-11-28T21:05:28Z</time>\n",
        "\t\t<name>5066</name>\n",
        "\t\t<desc>5066</desc>\n",
        "\t\t<sym>Crossing</sym>\n",
        "\t\t<type>Crossing</type>\n",
        "\t</wpt>\n",
        "</gpx>",
    )
    .replace("{HEADER}", HEADER);

    let expected = Gpx {
        version: "1.0".to_string(),
        creator: "ExpertGPS 1.1 - http://www.topografix.com".to_string(),
        waypoints: vec![Waypoint {
            lat: 42.438878,
            lon: -71.119277,
            ele: Some(44.586548),
            time: Some(Utc.with_ymd_and_hms(2001, 11, 28, 21, 5, 28).unwrap()),
            name: Some("5066".to_string()),
            desc: Some("5066".to_string()),
            sym: Some("Crossing".to_string()),
            point_type: Some("Crossing".to_string()),
            ..Waypoint::default()
        }],
        ..Gpx::default()
    };
    assert_round_trip(&data, &expected);
}

#[test]
fn test_route_document_round_trip() {
    let data = concat!(
        "{HEADER}\n",
        "\t<rte>\n",
        "\t\t<name>BELLEVUE</name>\n",
        "\t\t<desc>Bike Loop Bellevue</desc>\n",
        "\t\t<number>1</number>\n",
        "\t\t<rtept lat=\"42.43095\" lon=\"-71.107628\">\n",
        "\t\t\t<ele>23.4696</ele>\n",
        "\t\t\t<time>2001-06-02T00:18:15Z</time>\n",
        "\t\t\t<name>BELLEVUE</name>\n",
        "\t\t\t<cmt>BELLEVUE</cmt>\n",
        "\t\t\t<desc>Bellevue Parking Lot</desc>\n",
        "\t\t\t<sym>Parking Area</sym>\n",
        "\t\t\t<type>Parking</type>\n",
        "\t\t</rtept>\n",
        "\t\t<rtept lat=\"42.43124\" lon=\"-71.109236\">\n",
        "\t\t\t<ele>26.56189</ele>\n",
        "\t\t\t<time>2001-11-07T23:53:41Z</time>\n",
        "\t\t\t<name>GATE6</name>\n",
        "\t\t\t<desc>Gate 6</desc>\n",
        "\t\t\t<sym>Trailhead</sym>\n",
        "\t\t\t<type>Trail Head</type>\n",
        "\t\t</rtept>\n",
        "\t</rte>\n",
        "</gpx>",
    )
    .replace("{HEADER}", HEADER);

    let expected = Gpx {
        version: "1.0".to_string(),
        creator: "ExpertGPS 1.1 - http://www.topografix.com".to_string(),
        routes: vec![Route {
            name: Some("BELLEVUE".to_string()),
            desc: Some("Bike Loop Bellevue".to_string()),
            number: Some(1),
            points: vec![
                Waypoint {
                    lat: 42.43095,
                    lon: -71.107628,
                    ele: Some(23.4696),
                    time: Some(Utc.with_ymd_and_hms(2001, 6, 2, 0, 18, 15).unwrap()),
                    name: Some("BELLEVUE".to_string()),
                    cmt: Some("BELLEVUE".to_string()),
                    desc: Some("Bellevue Parking Lot".to_string()),
                    sym: Some("Parking Area".to_string()),
                    point_type: Some("Parking".to_string()),
                    ..Waypoint::default()
                },
                Waypoint {
                    lat: 42.43124,
                    lon: -71.109236,
                    ele: Some(26.56189),
                    time: Some(Utc.with_ymd_and_hms(2001, 11, 7, 23, 53, 41).unwrap()),
                    name: Some("GATE6".to_string()),
                    desc: Some("Gate 6".to_string()),
                    sym: Some("Trailhead".to_string()),
                    point_type: Some("Trail Head".to_string()),
                    ..Waypoint::default()
                },
            ],
            ..Route::default()
        }],
        ..Gpx::default()
    };
    assert_round_trip(&data, &expected);

    // The same route projects onto the documented XYZM coordinates.
    let line = read(&data).routes[0].geom(Layout::Xyzm);
    assert_eq!(
        line.coords,
        vec![
            vec![-71.107628, 42.43095, 23.4696, 991_441_095.0],
            vec![-71.109236, 42.43124, 26.56189, 1_005_177_221.0],
        ]
    );
}

#[test]
fn test_track_document_round_trip() {
    let data = concat!(
        "{HEADER}\n",
        "\t<trk>\n",
        "\t\t<trkseg>\n",
        "\t\t\t<trkpt lat=\"47.644548\" lon=\"-122.326897\">\n",
        "\t\t\t\t<ele>4.46</ele>\n",
        "\t\t\t\t<time>2009-10-17T18:37:26Z</time>\n",
        "\t\t\t</trkpt>\n",
        "\t\t\t<trkpt lat=\"47.644548\" lon=\"-122.326897\">\n",
        "\t\t\t\t<ele>4.94</ele>\n",
        "\t\t\t\t<time>2009-10-17T18:37:31Z</time>\n",
        "\t\t\t</trkpt>\n",
        "\t\t</trkseg>\n",
        "\t\t<trkseg></trkseg>\n",
        "\t</trk>\n",
        "</gpx>",
    )
    .replace("{HEADER}", HEADER);

    let gpx = read(&data);
    assert_eq!(gpx.tracks.len(), 1);
    assert_eq!(gpx.tracks[0].segments.len(), 2);
    assert_eq!(gpx.tracks[0].segments[0].points.len(), 2);
    assert!(gpx.tracks[0].segments[1].points.is_empty());
    assert_eq!(render(&gpx), data);

    let lines = gpx.tracks[0].geom(Layout::Xyzm);
    assert_eq!(lines.coords.len(), 2);
    assert_eq!(
        lines.coords[0],
        vec![
            vec![-122.326897, 47.644548, 4.46, 1_255_804_646.0],
            vec![-122.326897, 47.644548, 4.94, 1_255_804_651.0],
        ]
    );
    assert!(lines.coords[1].is_empty());
}

#[test]
fn test_metadata_document_round_trip() {
    let data = concat!(
        "{HEADER}\n",
        "\t<metadata>\n",
        "\t\t<name>Mystic River Basin Trails</name>\n",
        "\t\t<copyright author=\"OpenStreetMap contributors\">\n",
        "\t\t\t<year>2019</year>\n",
        "\t\t\t<license>https://opendatacommons.org/licenses/odbl/</license>\n",
        "\t\t</copyright>\n",
        "\t\t<link href=\"http://example.com/trails\">\n",
        "\t\t\t<text>Trail index</text>\n",
        "\t\t</link>\n",
        "\t\t<time>2009-10-17T18:37:26Z</time>\n",
        "\t\t<bounds minlat=\"42.401051\" minlon=\"-71.126602\" maxlat=\"42.468655\" maxlon=\"-71.102973\"></bounds>\n",
        "\t</metadata>\n",
        "</gpx>",
    )
    .replace("{HEADER}", HEADER);

    let gpx = read(&data);
    let metadata = gpx.metadata.as_ref().unwrap();
    assert_eq!(metadata.name.as_deref(), Some("Mystic River Basin Trails"));
    assert_eq!(
        metadata.copyright.as_ref().unwrap().author,
        "OpenStreetMap contributors"
    );
    assert_eq!(metadata.copyright.as_ref().unwrap().year, Some(2019));
    assert_eq!(render(&gpx), data);
}

// ---- canonicalization ----

#[test]
fn test_noisy_copyright_year_truncated_on_output() {
    let input = format!(
        "{HEADER}\n\t<metadata>\n\t\t<copyright author=\"x\">\n\t\t\t<year>2011+05:00</year>\n\t\t</copyright>\n\t</metadata>\n</gpx>"
    );
    let gpx = read(&input);
    assert_eq!(
        gpx.metadata.as_ref().unwrap().copyright.as_ref().unwrap().year,
        Some(2011)
    );
    assert!(render(&gpx).contains("<year>2011</year>"));
}

#[test]
fn test_cdata_input_becomes_plain_text_output() {
    let input = format!(
        "{HEADER}\n\t<wpt lat=\"42.438878\" lon=\"-71.119277\">\n\t\t<desc><![CDATA[5066]]></desc>\n\t\t<type><![CDATA[Crossing]]></type>\n\t</wpt>\n</gpx>"
    );
    let gpx = read(&input);
    let text = render(&gpx);
    assert!(text.contains("<desc>5066</desc>"));
    assert!(text.contains("<type>Crossing</type>"));
    assert!(!text.contains("CDATA"));
}

#[test]
fn test_declaration_and_offset_times_normalize() {
    let input = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<gpx version=\"1.0\" creator=\"test\">\n",
        "  <wpt lat=\"42.438878\" lon=\"-71.119277\">\n",
        "    <time>2001-11-28T16:05:28-05:00</time>\n",
        "  </wpt>\n",
        "</gpx>\n",
    );
    let gpx = read(input);
    assert_eq!(
        gpx.waypoints[0].time,
        Some(Utc.with_ymd_and_hms(2001, 11, 28, 21, 5, 28).unwrap())
    );
    // Canonical output carries no declaration and UTC times.
    let text = render(&gpx);
    assert!(text.starts_with("<gpx"));
    assert!(text.contains("<time>2001-11-28T21:05:28Z</time>"));
}

// ---- stability ----

#[test]
fn test_write_read_write_is_stable() {
    let mut wpt = Waypoint::new(42.438878, -71.119277);
    wpt.ele = Some(44.586548);
    wpt.time = Some(Utc.with_ymd_and_hms(2001, 11, 28, 21, 5, 28).unwrap());
    wpt.magvar = Some(1.1);
    wpt.geoidheight = Some(2.2);
    wpt.name = Some("5066".to_string());
    wpt.cmt = Some("Comment".to_string());
    wpt.src = Some("Source".to_string());
    wpt.link = vec![Link {
        href: "http://example.com".to_string(),
        text: Some("Text".to_string()),
        link_type: Some("Type".to_string()),
    }];
    wpt.fix = Some("3d".to_string());
    wpt.sat = Some(3);
    wpt.hdop = Some(4.4);
    wpt.vdop = Some(5.5);
    wpt.pdop = Some(6.6);
    wpt.ageofdgpsdata = Some(7.7);
    wpt.dgpsid = vec![8];

    let gpx = Gpx {
        version: "1.0".to_string(),
        creator: "gpx-geom".to_string(),
        metadata: Some(Metadata {
            copyright: Some(Copyright {
                author: "author".to_string(),
                year: Some(2013),
                license: None,
            }),
            ..Metadata::default()
        }),
        waypoints: vec![wpt],
        ..Gpx::default()
    };

    let first = render(&gpx);
    let reread = read(&first);
    assert_eq!(reread, gpx);
    assert_eq!(render(&reread), first);
}

#[test]
fn test_point_order_preserved() {
    let points: Vec<String> = (0..20)
        .map(|i| format!("\t\t<rtept lat=\"42.4{i}1\" lon=\"-71.1{i}1\"></rtept>\n"))
        .collect();
    let data = format!("{HEADER}\n\t<rte>\n{}\t</rte>\n</gpx>", points.join(""));
    let gpx = read(&data);
    assert_eq!(gpx.routes[0].points.len(), 20);
    for (i, point) in gpx.routes[0].points.iter().enumerate() {
        assert_eq!(point.lat, format!("42.4{i}1").parse::<f64>().unwrap());
    }
    assert_eq!(render(&gpx), data);
}

// ---- fixtures ----

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

#[test]
fn test_parse_example_files() {
    for filename in ["bellevue.gpx", "mystic_basin_trail.gpx"] {
        let gpx = read(&load_fixture(filename));
        assert!(
            !gpx.waypoints.is_empty() || !gpx.routes.is_empty() || !gpx.tracks.is_empty(),
            "{filename} parsed to an empty document"
        );
        // Canonical form is a fixed point.
        let canonical = render(&gpx);
        let reread = read(&canonical);
        assert_eq!(reread, gpx, "{filename}");
        assert_eq!(render(&reread), canonical, "{filename}");
    }
}

// ---- serde interop ----

#[test]
fn test_model_serializes_to_json() {
    let mut wpt = Waypoint::new(42.438878, -71.119277);
    wpt.time = Some(Utc.with_ymd_and_hms(2001, 11, 28, 21, 5, 28).unwrap());
    let json = serde_json::to_value(&wpt).unwrap();
    assert_eq!(json["lat"], 42.438878);
    assert_eq!(json["lon"], -71.119277);
    let back: Waypoint = serde_json::from_value(json).unwrap();
    assert_eq!(back, wpt);
}
