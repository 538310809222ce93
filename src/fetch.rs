//! One-shot asynchronous loads of the two external data sources.
//!
//! Both loads happen once at startup; a failure leaves the corresponding
//! layer empty and the globe fully interactive.

use gloo_net::http::Request;

use crate::model::{self, ClubRecord, Location};
use crate::state::projection::GeoPoint;
use crate::topology::{self, Topology};

pub const WORLD_TOPOLOGY_URL: &str = "https://gist.githubusercontent.com/mbostock/4090846/raw/d534aba169207548a8a3d670c9c2cc719ff05c47/world-110m.json";

pub const CLUB_FEED_URL: &str = "https://api2.hackclub.com/v0/Operations/Clubs/?select=%7B%22fields%22:%5B%22Name%22,%22Latitude%22,%22Longitude%22,%22Customized%20Name%22%5D,%22filterByFormula%22:%22AND(%7BRejected%7D=0,%7BDummy%7D=0,%7BDropped%7D=0)%22%7D";

pub async fn load_landmasses() -> Result<Vec<Vec<GeoPoint>>, gloo_net::Error> {
    let topology: Topology = Request::get(WORLD_TOPOLOGY_URL).send().await?.json().await?;
    Ok(topology::object_outlines(&topology, "countries"))
}

pub async fn load_locations() -> Result<Vec<Location>, gloo_net::Error> {
    let records: Vec<ClubRecord> = Request::get(CLUB_FEED_URL).send().await?.json().await?;
    Ok(model::locations_from_records(records))
}
