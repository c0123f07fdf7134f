//! Retrieval abstraction for the remote transaction service

use crate::core::error::Result;
use crate::core::transaction::FeedResponse;
use async_trait::async_trait;

#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Issues one `GET transactions` request.
    async fn fetch_transactions(&self) -> Result<FeedResponse>;
}
