use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub telegram_id: i64,
    pub language: String,
    pub expire_at: Option<DateTime<Utc>>,
    pub subscription_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// A subscription counts as active only while its expiry lies strictly after `now`.
    pub fn active_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expire_at.filter(|expire_at| *expire_at > now)
    }

    pub fn subscription_link(&self) -> Option<&str> {
        self.subscription_link
            .as_deref()
            .filter(|link| !link.trim().is_empty())
    }
}
