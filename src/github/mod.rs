pub mod client;
pub mod paginator;
pub mod rate_limiter;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use paginator::Paginator;
pub use rate_limiter::RateLimiter;
