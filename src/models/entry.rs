use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

// The backend stores `name` as a nullable column, so accept null as well as a missing key
fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Server-assigned creation time. Never produced or modified by this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedAt {
    Text(String),
    Millis(i64),
    FractionalMillis(f64),
}

impl CreatedAt {
    fn to_datetime<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        match self {
            CreatedAt::Text(text) => {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                    return Some(parsed.with_timezone(tz));
                }
                // No offset: a wall-clock time in the viewer's zone
                let naive: NaiveDateTime = text.parse().ok()?;
                tz.from_local_datetime(&naive).earliest()
            }
            CreatedAt::Millis(ms) => DateTime::from_timestamp_millis(*ms).map(|t| t.with_timezone(tz)),
            CreatedAt::FractionalMillis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.trunc() as i64).map(|t| t.with_timezone(tz))
            }
            CreatedAt::FractionalMillis(_) => None,
        }
    }

    /// Format as `M/D/YYYY, h:mm:ss AM` in `tz`, falling back to the raw value.
    pub fn format_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match self.to_datetime(tz) {
            Some(t) => t.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
            None => self.raw(),
        }
    }

    pub fn to_local_string(&self) -> String {
        self.format_in(&Local)
    }

    fn raw(&self) -> String {
        match self {
            CreatedAt::Text(text) => text.clone(),
            CreatedAt::Millis(ms) => ms.to_string(),
            CreatedAt::FractionalMillis(ms) => ms.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "deserialize_name")]
    pub name: String,
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: CreatedAt,
}

/// Write payload for `POST /api/entries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub message: String,
}
