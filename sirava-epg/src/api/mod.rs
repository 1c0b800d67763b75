//! HTTP API handlers for sirava-epg

pub mod buildinfo;
pub mod health;
pub mod ui;
pub mod upload;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use ui::serve_index;
pub use upload::{upload_body_limit, upload_rundown};
