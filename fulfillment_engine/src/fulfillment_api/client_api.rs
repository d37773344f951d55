use std::fmt::Debug;

use log::*;

use crate::{
    order_objects::ClientSummary,
    traits::{CatalogLookup, FulfillmentError},
};

pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hashed once per [`ClientApi`] to give unknown documents something to be checked against.
const DUMMY_PASSWORD: &str = "ofp-no-such-client";

/// Password hashing parameters. This is an explicit value handed to [`ClientApi`] rather than global state, so tests
/// can use a cheap cost and production a strong one.
///
/// bcrypt reads the cost of an existing hash from the hash itself, so the cost only applies to new hashes. It should
/// match the cost of the stored hashes, otherwise logins for unknown documents finish faster than wrong passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { cost: DEFAULT_BCRYPT_COST }
    }
}

impl PasswordPolicy {
    /// Creates a policy with the given bcrypt cost. bcrypt only supports costs between 4 and 31.
    pub fn new(cost: u32) -> Result<Self, FulfillmentError> {
        if !(4..=31).contains(&cost) {
            return Err(FulfillmentError::InvalidRequest(format!("bcrypt cost must be between 4 and 31, not {cost}")));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, FulfillmentError> {
        bcrypt::hash(password, self.cost).map_err(|e| FulfillmentError::DatabaseError(format!("Hashing failed. {e}")))
    }
}

/// Returns true if `password` matches the stored hash. A malformed hash never matches.
///
/// This is CPU bound. Async callers should go through [`verify_password`].
pub fn password_matches(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or_else(|e| {
        warn!("🔑️ Stored password hash could not be checked. {e}");
        false
    })
}

/// Runs [`password_matches`] on the blocking thread pool.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, FulfillmentError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || password_matches(&password, &hash))
        .await
        .map_err(|e| FulfillmentError::DatabaseError(format!("Password check did not complete. {e}")))
}

/// `ClientApi` verifies client credentials.
pub struct ClientApi<B> {
    db: B,
    policy: PasswordPolicy,
    dummy_hash: String,
}

impl<B: Debug> Debug for ClientApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientApi ({:?}, cost {})", self.db, self.policy.cost)
    }
}

impl<B> ClientApi<B>
where B: CatalogLookup
{
    /// Creates the API, hashing a dummy password under `policy`. Call this once at start-up.
    pub fn new(db: B, policy: PasswordPolicy) -> Result<Self, FulfillmentError> {
        let dummy_hash = policy.hash(DUMMY_PASSWORD)?;
        Ok(Self { db, policy, dummy_hash })
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Checks the password for the client holding `national_document`.
    ///
    /// Unknown documents and wrong passwords both fail with [`FulfillmentError::InvalidCredentials`]. Both paths run a
    /// bcrypt check, so callers cannot tell which one it was from the response or its timing.
    pub async fn login(&self, national_document: &str, password: &str) -> Result<ClientSummary, FulfillmentError> {
        if national_document.trim().is_empty() || password.is_empty() {
            return Err(FulfillmentError::InvalidRequest("Both a document and a password are required".into()));
        }
        let creds = self.db.fetch_client_credentials(national_document.trim()).await?;
        let hash = creds.as_ref().map(|c| c.password_hash.as_str()).unwrap_or(self.dummy_hash.as_str());
        let matches = verify_password(password, hash).await?;
        let creds = match creds {
            Some(c) if matches => c,
            Some(c) => {
                debug!("🔑️ Wrong password for client #{}", c.id);
                return Err(FulfillmentError::InvalidCredentials);
            },
            None => {
                debug!("🔑️ Login attempt for unknown document {national_document}");
                return Err(FulfillmentError::InvalidCredentials);
            },
        };
        info!("🔑️ Client #{} authenticated", creds.id);
        Ok(ClientSummary {
            id: creds.id,
            national_document: creds.national_document,
            name: creds.name,
            lastname: creds.lastname,
        })
    }
}
