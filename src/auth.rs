use crate::backend::{PortalBackend, RoleUpdate};
use crate::types::ADMIN_ROLE;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Google publishes the keys Firebase signs ID tokens with under this JWKS
/// endpoint. Keys rotate, so a miss triggers a refetch.
const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

pub trait TokenVerifier: Clone + Send + Sync + 'static {
    /// Resolves a bearer token to a verified email address.
    fn verify(&self, token: &str) -> impl Future<Output = Result<String, String>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    email: Option<String>,
}

/// Verifies Firebase ID tokens: RS256 signature against Google's published
/// keys, audience = project id, issuer = the securetoken issuer for the
/// project. Without a configured project id every token is rejected, which
/// callers treat as an anonymous request.
#[derive(Clone)]
pub struct FirebaseTokenVerifier {
    client: reqwest::Client,
    project_id: Option<String>,
    keys: Arc<Mutex<HashMap<String, Jwk>>>,
}

impl FirebaseTokenVerifier {
    pub fn new(project_id: Option<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            project_id,
            keys: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn cached_key(&self, kid: &str) -> Option<Jwk> {
        self.keys.lock().unwrap().get(kid).cloned()
    }

    async fn refresh_keys(&self) -> Result<(), String> {
        let jwks: JwkSet = self
            .client
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|err| format!("key fetch failed: {err}"))?
            .json()
            .await
            .map_err(|err| format!("key fetch returned invalid JSON: {err}"))?;

        let mut keys = self.keys.lock().unwrap();
        keys.clear();
        for key in jwks.keys {
            keys.insert(key.kid.clone(), key);
        }
        Ok(())
    }
}

impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, String> {
        let Some(project_id) = self.project_id.clone() else {
            return Err("identity verification is not configured".into());
        };

        let header = decode_header(token).map_err(|err| format!("invalid token header: {err}"))?;
        let kid = header.kid.ok_or_else(|| "token header has no key id".to_string())?;

        let jwk = match self.cached_key(&kid) {
            Some(jwk) => jwk,
            None => {
                self.refresh_keys().await?;
                self.cached_key(&kid)
                    .ok_or_else(|| "token signed with an unknown key".to_string())?
            }
        };
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|err| format!("unusable verification key: {err}"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id.as_str()]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{project_id}")]);

        let token_data = decode::<IdTokenClaims>(token, &key, &validation)
            .map_err(|err| format!("token rejected: {err}"))?;
        token_data
            .claims
            .email
            .ok_or_else(|| "token carries no email claim".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleAction {
    Grant,
    Revoke,
}

impl RoleAction {
    pub fn target_role(self) -> Option<&'static str> {
        match self {
            RoleAction::Grant => Some(ADMIN_ROLE),
            RoleAction::Revoke => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The caller tried to revoke their own admin role.
    SelfDemotion,
    /// The caller is anonymous, unknown, or not an admin.
    NoPermission,
    /// The mutation was applied; counts tell which of the three result
    /// messages the caller gets.
    Applied(RoleUpdate),
}

/// The role gate. `caller` is the explicit result of bearer verification,
/// `None` when the token was missing or rejected. The self-demotion guard
/// runs before the permission check.
pub fn authorize_role_change<B: PortalBackend>(
    backend: &B,
    caller: Option<&str>,
    target_email: &str,
    action: RoleAction,
) -> Result<GateOutcome, String> {
    if let Some(caller) = caller {
        if caller == target_email && action == RoleAction::Revoke {
            return Ok(GateOutcome::SelfDemotion);
        }
    }

    let Some(caller) = caller else {
        return Ok(GateOutcome::NoPermission);
    };
    match backend.find_user(caller)? {
        Some(user) if user.is_admin() => {}
        _ => return Ok(GateOutcome::NoPermission),
    }

    let update = backend.update_role(target_email, action.target_role())?;
    Ok(GateOutcome::Applied(update))
}
