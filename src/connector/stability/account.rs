use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::Query;

use super::Stability;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `AUDIO`, `CLASSIFICATION`, `PICTURE`, `STORAGE`, `TEXT` or `VIDEO`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub credits: f64,
}

impl Stability {
    /// Lists the engines available to the key.
    pub async fn list_engines(&self) -> Result<Vec<Engine>, ConnectorError> {
        self.client.get("v1/engines/list", &Query::new()).await
    }

    pub async fn get_account(&self) -> Result<Account, ConnectorError> {
        self.client.get("v1/user/account", &Query::new()).await
    }

    /// Remaining credit balance.
    pub async fn get_balance(&self) -> Result<Balance, ConnectorError> {
        self.client.get("v1/user/balance", &Query::new()).await
    }
}
