use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Itinerary,
    Budget,
    Attraction,
    Time,
    Practical,
    Activity,
    General,
}

impl QueryType {
    /// The six keyword-scored types, in tie-break evaluation order.
    pub const ALL_SCORED: [QueryType; 6] = [
        Self::Itinerary,
        Self::Budget,
        Self::Attraction,
        Self::Time,
        Self::Practical,
        Self::Activity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Itinerary => "itinerary",
            Self::Budget => "budget",
            Self::Attraction => "attraction",
            Self::Time => "time",
            Self::Practical => "practical",
            Self::Activity => "activity",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default, rename = "daily_budget_low")]
    pub daily_low: Option<f64>,
    #[serde(default, rename = "daily_budget_mid")]
    pub daily_mid: Option<f64>,
    #[serde(default, rename = "daily_budget_high")]
    pub daily_high: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Static per-destination dataset the assistant grounds its answers in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, rename = "location")]
    pub name: String,
    #[serde(default)]
    pub attractions: Vec<Attraction>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub best_time_to_visit: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl LocationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One prior user message, in the order the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationTurn(pub String);

impl ConversationTurn {
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationTurn {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConversationTurn {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub query_type: QueryType,
    pub duration_days: Option<u32>,
    pub travel_related: bool,
}
