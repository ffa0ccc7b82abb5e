use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Separator between the timestamp prefix and the random suffix.
pub const ID_SEPARATOR: char = '-';

/// Upper bound on identifier length accepted from the wire.
pub const MAX_ID_LEN: usize = 64;

/// Length of the random alphanumeric suffix in generated identifiers.
const SUFFIX_LEN: usize = 12;

/// Errors produced when parsing a peer identifier
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Peer identifier is empty")]
    Empty,

    #[error("Peer identifier exceeds {MAX_ID_LEN} characters")]
    TooLong,

    #[error("Peer identifier has no '{ID_SEPARATOR}' separator")]
    MissingSeparator,

    #[error("Peer identifier timestamp must be numeric: {0:?}")]
    InvalidTimestamp(String),

    #[error("Peer identifier suffix must be alphanumeric: {0:?}")]
    InvalidSuffix(String),
}

/// Process-unique identity of a peer: `<unix-millis>-<alphanumeric suffix>`.
///
/// The host's identity doubles as the signalling room name, so the
/// identifier is what a joining player types in to connect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerIdentity(String);

impl PeerIdentity {
    /// Mint a fresh identity stamped with the current wall-clock time
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0);
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{millis}{ID_SEPARATOR}{}", &suffix[..SUFFIX_LEN]))
    }

    /// Parse and validate an identifier against the grammar
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        validate(s)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond timestamp embedded in the identifier
    pub fn issued_at_millis(&self) -> Option<u64> {
        self.0
            .split_once(ID_SEPARATOR)
            .and_then(|(prefix, _)| prefix.parse().ok())
    }
}

/// Returns true if `s` matches `digits '-' alphanumerics`
pub fn is_valid_peer_id(s: &str) -> bool {
    validate(s).is_ok()
}

fn validate(s: &str) -> Result<(), IdentityError> {
    if s.is_empty() {
        return Err(IdentityError::Empty);
    }
    if s.len() > MAX_ID_LEN {
        return Err(IdentityError::TooLong);
    }

    let (prefix, suffix) = s
        .split_once(ID_SEPARATOR)
        .ok_or(IdentityError::MissingSeparator)?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentityError::InvalidTimestamp(prefix.to_string()));
    }
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(IdentityError::InvalidSuffix(suffix.to_string()));
    }

    Ok(())
}

impl FromStr for PeerIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PeerIdentity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)?;
        Ok(Self(value))
    }
}

impl From<PeerIdentity> for String {
    fn from(id: PeerIdentity) -> Self {
        id.0
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
