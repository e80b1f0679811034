use serde::Deserialize;

///
/// Key set document published by the identity provider.
///
/// Entries are kept as raw JSON, so a single malformed entry
/// doesn't make the whole document unusable.
///
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    #[serde(default)]
    pub keys: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Jwk {
    pub kid: Option<String>,
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}
