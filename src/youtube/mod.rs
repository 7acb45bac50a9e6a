pub mod client;
pub mod fetcher;
pub mod types;
pub mod video;

pub use client::YoutubeClient;
pub use fetcher::CommentFetcher;
pub use types::{Comment, PartialFetchWarning};
pub use video::VideoId;
