use crate::{dto::Claims, error::AuthError, util::is_rsa_family, JwksKeyCache, User};
use anyhow::anyhow;
use jsonwebtoken::{Algorithm, Validation};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TokenVerifierConfig {
    pub algorithms: Vec<Algorithm>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

///
/// Verifies bearer tokens with keys from [JwksKeyCache].
///
pub struct TokenVerifier {
    key_cache: Arc<JwksKeyCache>,
    validation: Validation,
}

impl TokenVerifier {
    ///
    /// ### Errors
    /// - when algorithms list is empty or contains algorithm outside of RSA family
    ///
    pub fn new(config: TokenVerifierConfig, key_cache: Arc<JwksKeyCache>) -> anyhow::Result<Self> {
        if config.algorithms.is_empty() {
            return Err(anyhow!("at least one algorithm is required"));
        }
        if let Some(algorithm) = config
            .algorithms
            .iter()
            .find(|algorithm| !is_rsa_family(**algorithm))
        {
            return Err(anyhow!("algorithm {algorithm:?} can't be verified with RSA keys"));
        }

        let mut validation = Validation::default();
        validation.algorithms = config.algorithms;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key_cache,
            validation,
        })
    }

    ///
    /// Verifies token signature and claims.
    ///
    /// ### Returns
    /// [User] built from `sub` and `realm_access.roles` claims
    ///
    /// ### Errors
    /// - [AuthError::MalformedToken] when token header can't be decoded
    /// - [AuthError::UnsupportedAlgorithm] when token isn't signed with one of configured algorithms
    /// - [AuthError::MissingKeyId] when token header has no `kid`
    /// - [AuthError::UnknownKey] when key set doesn't contain `kid` even after reload
    /// - [AuthError::KeySetUnavailable] when key set couldn't be fetched
    /// - [AuthError::InvalidToken] when signature, `exp`, issuer or audience is invalid
    /// - [AuthError::MissingSubject] when `sub` claim is missing or empty
    ///
    pub async fn verify(&self, token: &str) -> Result<User, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(AuthError::MalformedToken)?;
        if !self.validation.algorithms.contains(&header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.key_cache.get_key(&kid).await?;

        let token_data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)
            .map_err(AuthError::InvalidToken)?;
        let claims = token_data.claims;

        let id = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::MissingSubject)?;
        let roles = claims
            .realm_access
            .map(|realm_access| realm_access.roles)
            .unwrap_or_default();

        Ok(User::new(id, roles))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        test::{
            create_jwt, encode_jwt, encode_jwt_with_other_key, test_key_cache, FAR_FUTURE_EXP,
            TEST_KEY_ID,
        },
        JwksKeyCacheConfig,
    };
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn verify_valid_token() {
        let verifier = create_verifier(None, None);
        let token = create_jwt("u1", &["first_role", "second_role"]);

        let user = verifier.verify(&token).await.unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.roles, vec!["first_role", "second_role"]);
    }

    #[tokio::test]
    async fn verify_token_without_roles() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(Some(TEST_KEY_ID), json!({ "sub": "u1", "exp": FAR_FUTURE_EXP }));

        let user = verifier.verify(&token).await.unwrap();

        assert!(user.roles.is_empty());
    }

    #[tokio::test]
    async fn verify_malformed_token() {
        let verifier = create_verifier(None, None);

        let result = verifier.verify("that's not correct JWT").await;

        assert!(matches!(result, Err(AuthError::MalformedToken(_))));
    }

    #[tokio::test]
    async fn verify_symmetric_algorithm() {
        let verifier = create_verifier(None, None);
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(TEST_KEY_ID.to_string());
        let claims = json!({ "sub": "u1", "exp": FAR_FUTURE_EXP });
        let token =
            jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(b"some secret"))
                .unwrap();

        let result = verifier.verify(&token).await;

        assert!(matches!(
            result,
            Err(AuthError::UnsupportedAlgorithm(Algorithm::HS256))
        ));
    }

    #[tokio::test]
    async fn verify_missing_kid() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(None, json!({ "sub": "u1", "exp": FAR_FUTURE_EXP }));

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::MissingKeyId)));
    }

    #[tokio::test]
    async fn verify_unknown_kid() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(
            Some("rotated-away"),
            json!({ "sub": "u1", "exp": FAR_FUTURE_EXP }),
        );

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::UnknownKey { kid }) if kid == "rotated-away"));
    }

    #[tokio::test]
    async fn verify_invalid_signature() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt_with_other_key(json!({ "sub": "u1", "exp": FAR_FUTURE_EXP }));

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn verify_expired_token() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(Some(TEST_KEY_ID), json!({ "sub": "u1", "exp": 12312 }));

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn verify_missing_exp() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(Some(TEST_KEY_ID), json!({ "sub": "u1" }));

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn verify_missing_subject() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(Some(TEST_KEY_ID), json!({ "exp": FAR_FUTURE_EXP }));

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::MissingSubject)));
    }

    #[tokio::test]
    async fn verify_empty_subject() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(Some(TEST_KEY_ID), json!({ "sub": "", "exp": FAR_FUTURE_EXP }));

        let result = verifier.verify(&token).await;

        assert!(matches!(result, Err(AuthError::MissingSubject)));
    }

    #[tokio::test]
    async fn verify_issuer_and_audience() {
        let verifier = create_verifier(Some("https://idp.local"), Some("ticket-service"));

        let valid = encode_jwt(
            Some(TEST_KEY_ID),
            json!({
                "sub": "u1",
                "exp": FAR_FUTURE_EXP,
                "iss": "https://idp.local",
                "aud": "ticket-service",
            }),
        );
        let wrong_issuer = encode_jwt(
            Some(TEST_KEY_ID),
            json!({
                "sub": "u1",
                "exp": FAR_FUTURE_EXP,
                "iss": "https://other.local",
                "aud": "ticket-service",
            }),
        );
        let wrong_audience = encode_jwt(
            Some(TEST_KEY_ID),
            json!({
                "sub": "u1",
                "exp": FAR_FUTURE_EXP,
                "iss": "https://idp.local",
                "aud": "other-service",
            }),
        );

        assert!(verifier.verify(&valid).await.is_ok());
        assert!(matches!(
            verifier.verify(&wrong_issuer).await,
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            verifier.verify(&wrong_audience).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn verify_audience_ignored_when_not_configured() {
        let verifier = create_verifier(None, None);
        let token = encode_jwt(
            Some(TEST_KEY_ID),
            json!({ "sub": "u1", "exp": FAR_FUTURE_EXP, "aud": "account" }),
        );

        assert!(verifier.verify(&token).await.is_ok());
    }

    #[test]
    fn new_rejects_symmetric_algorithms() {
        let config = TokenVerifierConfig {
            algorithms: vec![Algorithm::RS256, Algorithm::HS256],
            issuer: None,
            audience: None,
        };
        let key_cache = Arc::new(test_key_cache(JwksKeyCacheConfig {
            min_reload_interval: Duration::ZERO,
        }));

        assert!(TokenVerifier::new(config, key_cache).is_err());
    }

    #[test]
    fn new_rejects_empty_algorithms() {
        let config = TokenVerifierConfig {
            algorithms: Vec::new(),
            issuer: None,
            audience: None,
        };
        let key_cache = Arc::new(test_key_cache(JwksKeyCacheConfig {
            min_reload_interval: Duration::ZERO,
        }));

        assert!(TokenVerifier::new(config, key_cache).is_err());
    }

    fn create_verifier(issuer: Option<&str>, audience: Option<&str>) -> TokenVerifier {
        let config = TokenVerifierConfig {
            algorithms: vec![Algorithm::RS256],
            issuer: issuer.map(str::to_string),
            audience: audience.map(str::to_string),
        };
        let key_cache = Arc::new(test_key_cache(JwksKeyCacheConfig {
            min_reload_interval: Duration::ZERO,
        }));

        TokenVerifier::new(config, key_cache).unwrap()
    }
}
