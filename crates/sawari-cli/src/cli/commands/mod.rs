mod audit;
mod crawl;
mod map;
mod verify;

pub use audit::run_audit;
pub use crawl::run_crawl;
pub use map::run_map_variants;
pub use verify::run_verify;
