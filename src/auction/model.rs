// region:    --- Imports
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Models

// 경매 모델
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub end_date: DateTime<Utc>,
    pub starting_price: i64,
    pub current_price: i64,
    pub is_active: bool,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_bidder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_bidder_id: Option<String>,
}

impl Auction {
    /// 문서 스냅샷을 경매 모델로 변환 (저장소가 부여한 id 주입)
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        let mut data = doc.data;
        if let Some(obj) = data.as_object_mut() {
            obj.insert("id".to_string(), serde_json::Value::String(doc.id));
        }
        serde_json::from_value(data)
    }

    /// 종료까지 남은 시간 표시 문자열
    pub fn time_left(&self, now: DateTime<Utc>) -> String {
        let mut difference = (self.end_date - now).num_seconds();
        if difference < 0 {
            return "Ended".to_string();
        }

        let days = difference / 86_400;
        difference -= days * 86_400;

        let hours = difference / 3_600;
        difference -= hours * 3_600;

        let minutes = difference / 60;
        let seconds = difference - minutes * 60;

        if days > 0 {
            format!("Ends in {days}d {hours}h")
        } else if hours > 0 {
            format!("Ends in {hours}h {minutes}m")
        } else if minutes > 0 {
            format!("Ends in {minutes}m {seconds}s")
        } else {
            format!("Ends in {seconds}s")
        }
    }
}

// 입찰 모델 (표시용 필드는 조회 시점에 사용자 문서에서 채워진다)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
}

// 채팅 메시지 모델
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: String,
    pub sender_user_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
}

// 사용자 모델
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_pic_url: String,
    #[serde(default)]
    pub balance: i64,
}

// endregion: --- Models
