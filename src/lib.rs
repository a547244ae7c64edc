pub mod aggregate;
pub mod arrivals;
pub mod config;
pub mod display;
pub mod error;
pub mod feeds;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod refresh;
pub mod render;
pub mod stats;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
