pub mod error;
pub mod http;
pub mod result;
pub mod revisions;
pub mod tracker;

pub use error::ScanError;
pub use http::HttpClient;
pub use result::{BugMetadata, BugPage, DependencyLink};
pub use revisions::{Diffstat, RevisionFetcher, RevisionServer, StatTool};
pub use tracker::{BugSource, BugTracker};
