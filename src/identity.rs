use crate::error::{DashboardError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use uuid::Uuid;

lazy_static! {
    static ref IDENTITY_RE: Regex =
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("identity pattern is valid");
}

/// Caller-supplied identity token
///
/// The token is trusted as-is once it has the canonical lowercase UUID form;
/// issuing and verifying it is the job of the authentication layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity(Uuid);

impl Identity {
    /// Parses an identity token
    ///
    /// # Arguments
    /// * `token` - Lowercase hyphenated UUID, 36 characters long
    ///
    /// # Returns
    /// * `Result<Identity>` - The identity or `InvalidIdentity`
    ///
    /// # Examples
    /// ```
    /// use dashboard::identity::Identity;
    ///
    /// assert!(Identity::parse("0b8f3c1e-4a5d-4e2f-9c3b-7d6a5e4f3c2b").is_ok());
    /// assert!(Identity::parse("not-a-uuid").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        if token.len() != 36 {
            return Err(DashboardError::InvalidIdentity(format!(
                "invalid length {}, expected 36",
                token.len()
            )));
        }
        if !IDENTITY_RE.is_match(token) {
            return Err(DashboardError::InvalidIdentity(format!(
                "invalid UUID format: {}",
                token
            )));
        }
        Uuid::parse_str(token)
            .map(Identity)
            .map_err(|e| DashboardError::InvalidIdentity(e.to_string()))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Identity(uuid)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
