use crate::utils::error::FakerError;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    /// PHC-formatted hash; never serialized back to clients.
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectChanges {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = FakerError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == upper)
            .ok_or_else(|| FakerError::validation("method", format!("invalid HTTP method: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlConfig {
    pub id: i64,
    pub path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub description: String,
    pub project_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlConfigFields {
    pub path: String,
    pub method: HttpMethod,
    pub description: String,
    pub project_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlHttpStatus {
    pub id: i64,
    pub url_id: i64,
    pub http_status: u16,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlHttpStatusFields {
    pub url_id: i64,
    pub http_status: u16,
    pub percentage: u32,
}

/// A mocked response body, held as the exact JSON text it was configured
/// with. Key order, whitespace and number precision survive the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBody(String);

impl MockBody {
    /// Accepts any well-formed JSON document.
    pub fn parse(text: impl Into<String>) -> serde_json::Result<Self> {
        let text = text.into();
        serde_json::from_str::<IgnoredAny>(&text)?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.0)
    }
}

impl From<Box<RawValue>> for MockBody {
    fn from(raw: Box<RawValue>) -> Self {
        Self(raw.get().to_string())
    }
}

impl From<Value> for MockBody {
    fn from(value: Value) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<Value> for MockBody {
    fn eq(&self, other: &Value) -> bool {
        self.to_value().is_ok_and(|value| value == *other)
    }
}

/// Written inline as raw JSON, not as a string.
impl Serialize for MockBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawValue::from_string(self.0.clone())
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

/// Captures the document text from a JSON request body without re-encoding it.
impl<'de> Deserialize<'de> for MockBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(Self::from)
    }
}

/// Store representation of a [`MockBody`]: its JSON text in a text column.
mod stored_body {
    use super::MockBody;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &MockBody, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(body.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MockBody, D::Error> {
        let text = String::deserialize(deserializer)?;
        MockBody::parse(text).map_err(serde::de::Error::custom)
    }
}

/// Serializes for clients with the body inline; decodes from a store row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseModel {
    pub id: i64,
    pub url_http_status_id: i64,
    #[serde(deserialize_with = "stored_body::deserialize")]
    pub model: MockBody,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseModelFields {
    pub url_http_status_id: i64,
    #[serde(serialize_with = "stored_body::serialize")]
    pub model: MockBody,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parsing_normalizes_case() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Patch ".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_account_password_is_not_serialized() {
        let account = Account {
            id: 1,
            email: "dev@example.com".to_string(),
            password: "$argon2id$v=19$hash".to_string(),
        };

        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], "dev@example.com");
    }

    #[test]
    fn test_url_config_method_round_trips_uppercase() {
        let value = serde_json::json!({
            "id": 4,
            "path": "/users",
            "method": "DELETE",
            "description": "",
            "project_id": 2
        });

        let config: UrlConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.method, HttpMethod::Delete);
        assert_eq!(serde_json::to_value(config.method).unwrap(), "DELETE");
    }

    #[test]
    fn test_mock_body_keeps_order_and_precision() {
        let text = r#"{"zeta": 1, "alpha": 2, "big": 12345678901234567890123}"#;
        #[derive(Deserialize)]
        struct Payload {
            model: MockBody,
        }
        let payload: Payload = serde_json::from_str(&format!(r#"{{"model": {}}}"#, text)).unwrap();
        assert_eq!(payload.model.as_str(), text);

        let emitted = serde_json::to_string(&payload.model).unwrap();
        assert_eq!(emitted, text);
    }

    #[test]
    fn test_response_model_decodes_from_stored_text() {
        let row = serde_json::json!({
            "id": 1,
            "url_http_status_id": 2,
            "model": "[3, 1, 2]",
            "description": ""
        });
        let model: ResponseModel = serde_json::from_value(row).unwrap();
        assert_eq!(model.model.as_str(), "[3, 1, 2]");

        let garbage = serde_json::json!({"id": 1, "url_http_status_id": 2, "model": "{oops"});
        assert!(serde_json::from_value::<ResponseModel>(garbage).is_err());
    }

    #[test]
    fn test_mock_body_rejects_malformed_text() {
        assert!(MockBody::parse("{\"open\": ").is_err());
        assert!(MockBody::parse("null").is_ok());
    }
}
