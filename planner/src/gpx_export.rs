use std::{fs::File, io::BufWriter, path::Path};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::ExportError;
use crate::models::{Coordinate, EnrichedRoute};

const CREATOR: &str = "planner";

fn route_document(path: &[Coordinate], name: Option<String>) -> Gpx {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name,
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    segment.points.extend(path.iter().map(to_waypoint));
    track.segments.push(segment);
    gpx.tracks.push(track);
    gpx
}

/// Single-track GPX 1.1 document for `path`, base64 encoded.
pub fn encode_route_as_gpx(path: &[Coordinate]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    gpx::write(&route_document(path, Some(CREATOR.into())), &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

pub fn write_route_gpx(route: &EnrichedRoute, output: &Path) -> Result<(), ExportError> {
    let name = format!("{} route", route.profile.label());
    let document = route_document(&route.geometry.path, Some(name));
    let writer = BufWriter::new(File::create(output)?);
    gpx::write(&document, writer)?;
    tracing::info!(
        "wrote {} points of the {} route to {}",
        route.geometry.path.len(),
        route.profile,
        output.display()
    );
    Ok(())
}

fn to_waypoint(coord: &Coordinate) -> Waypoint {
    Waypoint::new(Point::new(coord.lon, coord.lat))
}
