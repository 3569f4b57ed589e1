use serde::{Deserialize, Serialize};

/// Envelope KuCoin wraps around every REST payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KuCoinResponse<T> {
    pub code: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPage {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_num: Option<u64>,
    #[serde(default)]
    pub items: Vec<Announcement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(default)]
    pub ann_id: Option<i64>,
    pub ann_title: String,
    #[serde(default)]
    pub ann_type: Vec<String>,
    #[serde(default)]
    pub ann_desc: Option<String>,
    #[serde(default)]
    pub c_time: Option<i64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub ann_url: Option<String>,
}

/// One entry of Gate.io's `/spot/currencies` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub currency: String,
    #[serde(default)]
    pub delisted: bool,
    #[serde(default)]
    pub withdraw_disabled: bool,
    #[serde(default)]
    pub withdraw_delayed: bool,
    #[serde(default)]
    pub deposit_disabled: bool,
    #[serde(default)]
    pub trade_disabled: bool,
    #[serde(default)]
    pub chain: Option<String>,
}
