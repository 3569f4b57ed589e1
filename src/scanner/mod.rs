pub mod dedup;
pub mod extractor;
pub mod poller;
pub mod publisher;
pub mod resolver;

pub use dedup::DedupGate;
pub use extractor::extract_symbol;
pub use poller::ListingPoller;
pub use publisher::ListingPublisher;
pub use resolver::{AnnouncementResolver, Detection};
