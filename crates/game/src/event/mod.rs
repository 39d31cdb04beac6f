mod feed;
mod types;

pub use feed::{EventSink, NullFeed, UdpFeed};
pub use types::{FeedEvent, spectator_name};
