use serde::{Deserialize, Serialize};

use super::schema::Schema;

/// A media type object (OpenAPI 3.x `content` entry).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// Whether a media type carries JSON (`application/json`, `*/*+json`, ...).
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json") || essence.ends_with("/json")
}

/// Pick the preferred media type: `application/json`, then any other JSON
/// type, then the first declared one. Empty when nothing is declared.
pub fn preferred_media_type<'a, I>(declared: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let declared: Vec<&str> = declared.into_iter().collect();
    declared
        .iter()
        .find(|m| m.trim().eq_ignore_ascii_case("application/json"))
        .or_else(|| declared.iter().find(|m| is_json_media_type(m)))
        .or_else(|| declared.first())
        .map(|m| m.to_string())
        .unwrap_or_default()
}
