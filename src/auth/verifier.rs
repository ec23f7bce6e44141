use chrono::{Duration, Utc};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use moka::future::Cache;

use crate::auth::{provider::normalize_domain, Claims, Identity};
use crate::config::Config;

/// Algorithms accepted from the identity provider. Symmetric algorithms are
/// never valid against a published key set.
const OIDC_ALGORITHMS: [Algorithm; 8] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    #[error("Token is missing the 'kid' header")]
    MissingKid,

    #[error("No key found for kid '{0}'")]
    KeyNotFound(String),

    #[error("Invalid JWK format: {0}")]
    InvalidKeyFormat(String),

    #[error("JWT validation failed: {0}")]
    JwtValidationFailed(String),

    #[error("Unsupported token algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("Tokens can only be issued with a shared secret")]
    CannotIssue,
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => VerifyError::JwtValidationFailed("Token expired".into()),
            ErrorKind::InvalidSignature => {
                VerifyError::JwtValidationFailed("Invalid signature".into())
            }
            ErrorKind::InvalidToken => VerifyError::JwtValidationFailed("Invalid token".into()),
            _ => VerifyError::JwtValidationFailed(e.to_string()),
        }
    }
}

/// Keys published by an OIDC issuer, cached per `kid`.
#[derive(Clone)]
pub struct OidcKeys {
    issuer: String,
    audience: Option<String>,
    jwks_uri: String,
    http: reqwest::Client,
    keys: Cache<String, Jwk>,
}

impl OidcKeys {
    pub fn new(issuer: String, audience: Option<String>, jwks_uri: String) -> Self {
        Self {
            issuer,
            audience,
            jwks_uri,
            http: reqwest::Client::new(),
            keys: Cache::builder()
                .max_capacity(64)
                .time_to_live(std::time::Duration::from_secs(60 * 60))
                .build(),
        }
    }

    /// Look up a JWK by `kid`. Refreshes the key set once on a miss.
    async fn key(&self, kid: &str) -> Result<Jwk, VerifyError> {
        if let Some(jwk) = self.keys.get(kid).await {
            return Ok(jwk);
        }

        self.refresh().await?;

        self.keys
            .get(kid)
            .await
            .ok_or_else(|| VerifyError::KeyNotFound(kid.to_string()))
    }

    async fn refresh(&self) -> Result<(), VerifyError> {
        log::info!("Refreshing JWKS from {}", self.jwks_uri);

        let response = self.http.get(&self.jwks_uri).send().await.map_err(|e| {
            VerifyError::JwksFetchFailed(format!(
                "Failed to fetch JWKS from '{}': {}",
                self.jwks_uri, e
            ))
        })?;

        if !response.status().is_success() {
            return Err(VerifyError::JwksFetchFailed(format!(
                "JWKS request to '{}' returned status {}",
                self.jwks_uri,
                response.status()
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            VerifyError::JwksFetchFailed(format!(
                "Failed to parse JWKS JSON from '{}': {}",
                self.jwks_uri, e
            ))
        })?;

        for jwk in jwks.keys {
            if let Some(kid) = jwk.common.key_id.clone() {
                log::debug!("Caching key: {}", kid);
                self.keys.insert(kid, jwk).await;
            }
        }

        Ok(())
    }

    async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = decode_header(token)?;
        if !OIDC_ALGORITHMS.contains(&header.alg) {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(VerifyError::MissingKid)?;

        let jwk = self.key(&kid).await?;
        let decoding_key =
            DecodingKey::from_jwk(&jwk).map_err(|e| VerifyError::InvalidKeyFormat(e.to_string()))?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = OIDC_ALGORITHMS.to_vec();
        validation.set_issuer(&[&self.issuer]);
        match self.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// Turns bearer tokens into identities.
///
/// `SharedSecret` verifies HS256 tokens signed with `JWT_SECRET` and is what
/// development and tests run on. `Oidc` verifies tokens from the hosted
/// identity provider against its published keys.
#[derive(Clone)]
pub enum IdentityVerifier {
    SharedSecret {
        secret: String,
        audience: Option<String>,
    },
    Oidc(OidcKeys),
}

impl IdentityVerifier {
    pub fn shared_secret(secret: impl Into<String>) -> Self {
        IdentityVerifier::SharedSecret {
            secret: secret.into(),
            audience: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match config.auth0_domain {
            Some(ref domain) => {
                let domain = normalize_domain(domain);
                log::info!("Verifying bearer tokens against https://{}/", domain);
                IdentityVerifier::Oidc(OidcKeys::new(
                    format!("https://{}/", domain),
                    config.auth0_audience.clone(),
                    format!("https://{}/.well-known/jwks.json", domain),
                ))
            }
            None => {
                if config.is_production() {
                    log::warn!("AUTH0_DOMAIN is not set; verifying tokens with the shared secret");
                }
                IdentityVerifier::SharedSecret {
                    secret: config.jwt_secret.clone(),
                    audience: config.auth0_audience.clone(),
                }
            }
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let claims = match self {
            IdentityVerifier::SharedSecret { secret, audience } => {
                let mut validation = Validation::new(Algorithm::HS256);
                match audience {
                    Some(audience) => validation.set_audience(&[audience]),
                    None => validation.validate_aud = false,
                }
                decode::<Claims>(
                    token,
                    &DecodingKey::from_secret(secret.as_ref()),
                    &validation,
                )?
                .claims
            }
            IdentityVerifier::Oidc(keys) => keys.verify(token).await?,
        };

        if claims.sub.trim().is_empty() {
            return Err(VerifyError::JwtValidationFailed("Token has an empty subject".into()));
        }

        Ok(claims.into())
    }

    /// Sign a token for `identity`. Only available with a shared secret; used
    /// for local development and tests.
    pub fn issue_token(&self, identity: &Identity, valid_for: Duration) -> Result<String, VerifyError> {
        let IdentityVerifier::SharedSecret { secret, .. } = self else {
            return Err(VerifyError::CannotIssue);
        };

        let exp = (Utc::now() + valid_for).timestamp().max(0) as usize;
        let claims = Claims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            picture: identity.picture.clone(),
            email_verified: Some(identity.email_verified),
            exp,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "auth0|abc".to_string(),
            email: Some("user@x.com".to_string()),
            name: Some("User X".to_string()),
            picture: Some("https://cdn.example.com/u.png".to_string()),
            email_verified: true,
        }
    }

    #[tokio::test]
    async fn shared_secret_accepts_its_own_tokens() {
        let verifier = IdentityVerifier::shared_secret("secret-one");
        let token = verifier.issue_token(&identity(), Duration::hours(1)).unwrap();

        let verified = verifier.verify(&token).await.unwrap();
        assert_eq!(verified, identity());
    }

    #[tokio::test]
    async fn shared_secret_rejects_foreign_signature() {
        let issuer = IdentityVerifier::shared_secret("secret-one");
        let verifier = IdentityVerifier::shared_secret("secret-two");
        let token = issuer.issue_token(&identity(), Duration::hours(1)).unwrap();

        assert!(matches!(
            verifier.verify(&token).await,
            Err(VerifyError::JwtValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        let verifier = IdentityVerifier::shared_secret("secret-one");
        let token = verifier.issue_token(&identity(), Duration::hours(-2)).unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        assert_eq!(err.to_string(), "JWT validation failed: Token expired");
    }

    #[tokio::test]
    async fn oidc_verifier_cannot_issue() {
        let verifier = IdentityVerifier::Oidc(OidcKeys::new(
            "https://tenant.example.com/".to_string(),
            None,
            "https://tenant.example.com/.well-known/jwks.json".to_string(),
        ));

        assert!(matches!(
            verifier.issue_token(&identity(), Duration::hours(1)),
            Err(VerifyError::CannotIssue)
        ));
    }

    fn unreachable_oidc() -> IdentityVerifier {
        IdentityVerifier::Oidc(OidcKeys::new(
            "https://tenant.example.com/".to_string(),
            None,
            "http://127.0.0.1:9/jwks.json".to_string(),
        ))
    }

    #[tokio::test]
    async fn oidc_rejects_tokens_without_kid() {
        let signer = IdentityVerifier::shared_secret("secret-one");
        let token = signer.issue_token(&identity(), Duration::hours(1)).unwrap();
        // {"alg":"RS256","typ":"JWT"}
        let (_, rest) = token.split_once('.').unwrap();
        let token = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}", rest);

        assert!(matches!(
            unreachable_oidc().verify(&token).await,
            Err(VerifyError::MissingKid)
        ));
    }

    #[tokio::test]
    async fn oidc_rejects_symmetric_algorithms_before_key_lookup() {
        let claims = Claims {
            sub: "auth0|abc".to_string(),
            email: None,
            name: None,
            picture: None,
            email_verified: None,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let header = Header {
            kid: Some("tenant-key".to_string()),
            ..Header::new(Algorithm::HS256)
        };
        let token = encode(&header, &claims, &EncodingKey::from_secret(b"guessable")).unwrap();

        // The JWKS endpoint is unreachable, so reaching the key lookup would
        // surface as a fetch failure instead.
        assert!(matches!(
            unreachable_oidc().verify(&token).await,
            Err(VerifyError::UnsupportedAlgorithm(Algorithm::HS256))
        ));
    }
}
