//! `Authorization: Digest` header parsing and validation.

use std::collections::HashMap;

const SCHEME_PREFIX: &str = "Digest ";

/// The five parameters every digest credential must carry.
const REQUIRED_FIELDS: [&str; 5] = ["username", "realm", "nonce", "uri", "response"];

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Missing `Digest ` prefix or a segment that is not `key=value`.
    MalformedHeader,
    /// One or more required parameters absent or empty.
    MissingField(Vec<&'static str>),
    /// `qop` present without `cnonce` or `nc`.
    MissingQopParams,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader => write!(f, "malformed digest header"),
            Self::MissingField(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Self::MissingQopParams => write!(f, "qop specified without cnonce or nc"),
        }
    }
}

/// A validated digest credential.
///
/// The mandatory fields are guaranteed non-empty; optional fields keep the
/// presence information verification needs (qop selects the hashing branch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestCredential {
    pub username: String,
    pub realm: String,
    pub nonce: String,
    pub uri: String,
    pub response: String,
    pub qop: Option<String>,
    pub cnonce: Option<String>,
    pub nc: Option<String>,
    pub opaque: Option<String>,
}

/// Parse and validate a raw `Authorization` header value.
///
/// # Errors
///
/// Returns [`ParseError::MalformedHeader`] when the scheme prefix or the
/// `key=value` segment shape is wrong, [`ParseError::MissingField`] naming
/// every absent mandatory parameter, or [`ParseError::MissingQopParams`]
/// when `qop` lacks its companions.
pub fn parse(header: &str) -> Result<DigestCredential, ParseError> {
    let params = split_params(header)?;
    validate(&params)?;

    let get = |key: &str| params.get(key).cloned();

    Ok(DigestCredential {
        username: params["username"].clone(),
        realm: params["realm"].clone(),
        nonce: params["nonce"].clone(),
        uri: params["uri"].clone(),
        response: params["response"].clone(),
        qop: get("qop"),
        cnonce: get("cnonce"),
        nc: get("nc"),
        opaque: get("opaque"),
    })
}

/// Split the header into its `key="value"` segments, quotes stripped.
fn split_params(header: &str) -> Result<HashMap<String, String>, ParseError> {
    let value = header
        .strip_prefix(SCHEME_PREFIX)
        .ok_or(ParseError::MalformedHeader)?;

    let mut params = HashMap::new();
    for part in value.split(',') {
        let (key, raw) = part
            .trim()
            .split_once('=')
            .ok_or(ParseError::MalformedHeader)?;
        params.insert(key.trim().to_string(), unquote(raw).to_string());
    }

    Ok(params)
}

/// Check required parameters and qop companions on the raw parameter map.
///
/// # Errors
///
/// See [`parse`]; empty values count as missing, never defaulted.
pub fn validate(params: &HashMap<String, String>) -> Result<(), ParseError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| params.get(*field).map_or(true, String::is_empty))
        .collect();

    if !missing.is_empty() {
        return Err(ParseError::MissingField(missing));
    }

    let has = |key: &str| params.get(key).is_some_and(|value| !value.is_empty());

    if has("qop") && (!has("cnonce") || !has("nc")) {
        return Err(ParseError::MissingQopParams);
    }

    Ok(())
}

fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}
