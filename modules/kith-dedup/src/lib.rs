pub mod exact;
pub mod fuzzy;
pub mod scan;
pub mod similarity;

pub use exact::exact_matches;
pub use fuzzy::{fuzzy_matches, DedupConfig};
pub use scan::scan_workspace;
