//! Transaction feed domain: data model, formatters and synchronization

pub mod config;
pub mod currency;
pub mod date;
pub mod error;
pub mod feed;
pub mod log;
pub mod normalize;
pub mod source;
pub mod transaction;

// Re-export main types for cleaner imports
pub use currency::{CurrencyFormat, CurrencyFormatter};
pub use error::FeedError;
pub use feed::{FeedSnapshot, FeedSubscription, FeedSynchronizer, FeedView, SyncStatus};
pub use normalize::RecordNormalizer;
pub use source::TransactionSource;
pub use transaction::{
    BalanceSummary, Category, CreatedAt, DisplayTransaction, FeedResponse, RawTransaction,
    TransactionKind,
};
