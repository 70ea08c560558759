//! 컬렉션 경로 상수

/// 경매 컬렉션
pub const AUCTIONS: &str = "auctions";

/// 사용자 컬렉션
pub const USERS: &str = "users";

/// 경매 카테고리 컬렉션
pub const AUCTION_TYPES: &str = "auction-types";

/// 경매별 입찰 하위 컬렉션
pub fn bids(auction_id: &str) -> String {
    format!("{AUCTIONS}/{auction_id}/bids")
}

/// 경매별 채팅 하위 컬렉션
pub fn chat(auction_id: &str) -> String {
    format!("{AUCTIONS}/{auction_id}/chat")
}
