use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ActingUser, IdentityError, IdentityResolver};

/// Token claims; `uid` carries the acting user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: i32,
    pub exp: usize,
}

/// HS256 bearer-token resolver.
pub struct JwtIdentityResolver {
    secret: String,
    ttl: Duration,
}

impl JwtIdentityResolver {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self { secret: secret.into(), ttl }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self::new(cfg.jwt_secret.clone(), Duration::seconds(cfg.token_ttl_secs as i64))
    }

    /// Mint a token identifying `user`.
    ///
    /// # Examples
    /// ```
    /// use service::identity::{ActingUser, IdentityResolver, JwtIdentityResolver};
    /// let resolver = JwtIdentityResolver::new("secret", chrono::Duration::hours(1));
    /// let token = resolver.issue_token(ActingUser::new(11), "u@e.com").unwrap();
    /// let header = format!("Bearer {}", token);
    /// assert_eq!(resolver.resolve(Some(&header)).unwrap(), ActingUser::new(11));
    /// ```
    #[instrument(skip(self), fields(user = %user))]
    pub fn issue_token(&self, user: ActingUser, subject: &str) -> Result<String, IdentityError> {
        let exp = (Utc::now() + self.ttl).timestamp() as usize;
        self.encode(&Claims { sub: subject.to_string(), uid: user.id(), exp })
    }

    fn encode(&self, claims: &Claims) -> Result<String, IdentityError> {
        encode(&JwtHeader::default(), claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| IdentityError::TokenError(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, IdentityError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, authorization: Option<&str>) -> Result<ActingUser, IdentityError> {
        let token = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(IdentityError::MissingCredentials)?;
        let claims = self.decode(token)?;
        debug!(uid = claims.uid, "acting_user_resolved");
        Ok(ActingUser::new(claims.uid))
    }
}
