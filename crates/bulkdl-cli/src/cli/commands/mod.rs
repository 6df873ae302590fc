mod fetch;
mod status;

pub use fetch::{run_fetch, FetchOpts};
pub use status::run_status;
