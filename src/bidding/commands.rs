/// 입찰 커맨드 처리
/// 클라이언트 측 사전 검증 후 단일 원자 배치로 커밋하며,
/// 현재 가격 재검증은 커밋 내부 사전 조건으로 수행된다
// region:    --- Imports
use crate::auction::model::{Auction, Bid, User};
use crate::error::AuctionError;
use crate::store::{paths, DocumentStore, Precondition, StoreError, WriteBatch};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: String,
    pub bid_amount: Option<i64>,
    pub bidder_id: String,
}

/// 입찰 처리
/// 검증 실패는 Err, 커밋 경합 / 커밋 실패는 Ok(false)
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &Arc<dyn DocumentStore>,
    enforce_balance: bool,
) -> Result<bool, AuctionError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    // 1. 입찰 금액 존재 확인
    let amount = cmd.bid_amount.ok_or(AuctionError::AmountMissing)?;

    // 2. 현재 가격보다 높은지 확인
    let doc = store
        .get(paths::AUCTIONS, &cmd.auction_id)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!("{}/{}", paths::AUCTIONS, cmd.auction_id))
        })?;
    let auction = Auction::from_document(doc).map_err(StoreError::from)?;
    if amount <= auction.current_price {
        return Err(AuctionError::BidTooLow {
            current_price: auction.current_price,
        });
    }

    // 3. 잔액 확인 (차감은 하지 않고 충분한지만 본다)
    if enforce_balance {
        let balance = match store.get(paths::USERS, &cmd.bidder_id).await? {
            Some(doc) => {
                let user: User = serde_json::from_value(doc.data).map_err(StoreError::from)?;
                user.balance
            }
            None => 0,
        };
        if balance < amount {
            return Err(AuctionError::InsufficientBalance { balance, amount });
        }
    }

    // 4. 원자적 커밋: 경매 갱신 + 입찰 기록 추가
    //    currentPrice 가 그 사이에 올라 조건이 깨지면 배치 전체가 버려진다
    let bid_id = store.create_id();
    let bid = Bid {
        id: bid_id.clone(),
        user_id: cmd.bidder_id.clone(),
        amount,
        timestamp: store.server_time(),
        display_name: None,
        profile_pic_url: None,
    };

    let mut fields = Map::new();
    fields.insert("currentPrice".to_string(), Value::from(amount));
    fields.insert(
        "highestBidderId".to_string(),
        Value::from(cmd.bidder_id.clone()),
    );

    let mut batch = WriteBatch::new();
    batch.update(
        paths::AUCTIONS,
        &cmd.auction_id,
        fields,
        Some(Precondition::field_less_than("currentPrice", amount)),
    );
    batch.set(
        &paths::bids(&cmd.auction_id),
        &bid_id,
        serde_json::to_value(&bid).map_err(StoreError::from)?,
    );

    match store.commit(batch).await {
        Ok(()) => {
            info!(
                "{:<12} --> 입찰 성공: auction={}, amount={}",
                "Command", cmd.auction_id, amount
            );
            Ok(true)
        }
        Err(StoreError::Conflict(reason)) => {
            warn!("{:<12} --> 입찰 경합 패배: {}", "Command", reason);
            Ok(false)
        }
        Err(e) => {
            error!("{:<12} --> 입찰 커밋 실패: {}", "Command", e);
            Ok(false)
        }
    }
}
// endregion: --- Commands
