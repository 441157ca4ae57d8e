pub mod cache;
pub mod classifier;
pub mod client;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod normalize;
pub mod resolver;
pub mod retry;
pub mod throttle;
pub mod wire;

pub use classifier::{classify, classify_outcome, Classification, VoteAttempt, VoteOutcome};
pub use client::{ApiClient, StatsApi};
pub use config::Config;
pub use error::{ResolverError, Result};
pub use normalize::normalize;
pub use resolver::{VoteCheckResult, VoteResolver};
pub use retry::RetryPolicy;
pub use wire::{ServerInfo, VoteRecord};
