use serde::{Deserialize, Serialize};

use coinshop_ledger::{AccountInfo, HistoryLine};

// -------------------------
// Request DTOs
// -------------------------

/// Login body. No `Debug`: it carries a plaintext password.
#[derive(Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    pub to_user: String,
    pub amount: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub const OK: StatusResponse = StatusResponse { status: "ok" };
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub coins: i64,
    pub inventory: Vec<InventoryItem>,
    pub coin_history: CoinHistory,
}

#[derive(Debug, Serialize)]
pub struct InventoryItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CoinHistory {
    pub received: Vec<CoinTransaction>,
    pub sent: Vec<CoinTransaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinTransaction {
    /// Counterparty account id.
    pub other_user: String,
    pub amount: i64,
}

impl From<HistoryLine> for CoinTransaction {
    fn from(line: HistoryLine) -> Self {
        Self {
            other_user: line.counterparty.to_string(),
            amount: line.amount.get(),
        }
    }
}

impl From<AccountInfo> for InfoResponse {
    fn from(info: AccountInfo) -> Self {
        Self {
            coins: info.balance.get(),
            inventory: info
                .inventory
                .into_iter()
                .map(|line| InventoryItem {
                    item_type: line.item_name,
                    quantity: line.quantity,
                })
                .collect(),
            coin_history: CoinHistory {
                received: info.history.received.into_iter().map(Into::into).collect(),
                sent: info.history.sent.into_iter().map(Into::into).collect(),
            },
        }
    }
}
