// region:    --- Imports
use crate::store::StoreError;

// endregion: --- Imports

// region:    --- Auction Error
/// 경매 코어 오류
/// 검증 실패는 종류별로 구분되고, 커밋 경합은 오류가 아니라 false 반환으로 처리된다
#[derive(Debug, thiserror::Error)]
pub enum AuctionError {
    #[error("bid amount is required")]
    AmountMissing,
    #[error("bid must be higher than the current price ({current_price})")]
    BidTooLow { current_price: i64 },
    #[error("insufficient balance: balance {balance}, bid {amount}")]
    InsufficientBalance { balance: i64, amount: i64 },
    #[error("starting price must be positive")]
    InvalidStartingPrice,
    #[error("end date must be at least 24 hours from now")]
    InvalidEndDate,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("no user is currently authenticated")]
    AuthRequired,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuctionError {
    /// 프레젠테이션 계층에 보여 줄 사용자 메시지
    pub fn user_message(&self) -> String {
        match self {
            Self::AmountMissing => "Place your bid amount.",
            Self::BidTooLow { .. } => "Your bid must be higher than the current price.",
            Self::InsufficientBalance { .. } => "Your balance is not enough for this bid.",
            Self::InvalidStartingPrice => "Starting price must be greater than zero.",
            Self::InvalidEndDate => "End date must be at least 24 hours from now.",
            Self::InvalidAmount => "Amount must be greater than zero.",
            Self::AuthRequired => "Please sign in first.",
            Self::Store(_) => "Something went wrong. Please try again.",
        }
        .to_string()
    }
}
// endregion: --- Auction Error
