pub mod client;
pub mod models;

pub use client::{MutationResponse, WalletClient};
pub use models::{
    ApiError, ApiErrorKind, ProfileUpdate, Transaction, TransactionAggregate, TransactionSummary,
    WalletUser,
};
