use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Campus account role. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no_show",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Scheduled)
    }

    /// Cancelled sessions release their time window; everything else blocks it.
    pub fn blocks_calendar(&self) -> bool {
        !matches!(self, SessionStatus::Cancelled)
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "no_show" => Ok(SessionStatus::NoShow),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            other => Err(format!("unknown subscription status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub sessions_per_month: i64,
    pub monthly_price_cents: i64,
    pub price_id_1m: String,
    pub price_id_3m: String,
    pub price_id_6m: String,
    pub active: bool,
}

impl Package {
    /// Commitment length in months for one of this package's price ids.
    pub fn duration_for_price_id(&self, price_id: &str) -> Option<u32> {
        if price_id == self.price_id_1m {
            Some(1)
        } else if price_id == self.price_id_3m {
            Some(3)
        } else if price_id == self.price_id_6m {
            Some(6)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: String,
    pub student_id: String,
    pub package_id: String,
    pub status: SubscriptionStatus,
    pub duration_months: i64,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    pub sessions_total: i64,
    pub sessions_used: i64,
}

impl Subscription {
    pub fn sessions_remaining(&self) -> i64 {
        (self.sessions_total - self.sessions_used).max(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub subscription_id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: SessionStatus,
    pub meet_link: Option<String>,
    pub teacher_notes: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + chrono::Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentTeacher {
    pub student_id: String,
    pub teacher_id: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct AvailabilityBlock {
    pub teacher_id: String,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
    pub start_minute: u16,
    pub end_minute: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub locale: String,
    pub message: Option<String>,
    pub consent: bool,
    pub created_at: DateTime<Utc>,
}

/// Row shape consumed by the reminder endpoint: one upcoming session joined
/// with the people involved.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub session_id: String,
    pub student_email: String,
    pub student_name: String,
    pub teacher_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub meet_link: Option<String>,
}
