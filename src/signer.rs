//! `Signer` issuing tokens.

use core::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Serialize;

use crate::{ClaimSchema, KeyError, SecretKey, SigningError};

/// Issuer of `HS256` tokens for a particular secret key.
///
/// A signer is immutable after construction, so it can be shared among threads
/// and used to sign any number of tokens.
///
/// # Examples
///
/// ```
/// # use goinstant_auth::{GroupClaim, Signer, UserIdentity};
/// # fn main() -> anyhow::Result<()> {
/// let signer = Signer::new("HKYdFdnezle2yrI2_Ph3cHz144bISk-cvuAbeAAA999")?;
/// let user = UserIdentity::new("example.com", "bar", "bob")
///     .with_group(GroupClaim::new(42, "Meaning Group"));
/// let token = signer.sign_sync(&user)?;
/// assert_eq!(token.split('.').count(), 3);
///
/// // Untyped user data is accepted as well.
/// let user = serde_json::json!({
///     "domain": "example.com",
///     "id": "bar",
///     "displayName": "bob",
/// });
/// let other_token = signer.sign_sync(&user)?;
/// assert_ne!(token, other_token); // `groups` differ
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Signer {
    key: SecretKey,
    schema: ClaimSchema,
    defer_digest: bool,
}

impl fmt::Debug for Signer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Signer")
            .field("schema", &self.schema)
            .field("defer_digest", &self.defer_digest)
            .finish_non_exhaustive()
    }
}

impl Signer {
    /// Creates a signer from base64 or base64url `secret_key` text.
    pub fn new(secret_key: &str) -> Result<Self, KeyError> {
        let key = SecretKey::from_base64(secret_key).map_err(|err| {
            tracing::debug!(%err, "rejected secret key");
            err
        })?;
        Ok(Self::from_key(key))
    }

    /// Creates a signer from an already decoded key.
    pub fn from_key(key: SecretKey) -> Self {
        tracing::debug!(key_len = key.len(), "created signer");
        Self {
            key,
            schema: ClaimSchema::goinstant(),
            defer_digest: true,
        }
    }

    /// Replaces the claim schema used by this signer.
    #[must_use]
    pub fn with_schema(mut self, schema: ClaimSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets whether [`Self::sign()`] yields to the executor once before computing the digest.
    /// Enabled by default.
    #[must_use]
    pub fn with_deferred_digest(mut self, defer: bool) -> Self {
        self.defer_digest = defer;
        self
    }

    /// Returns the claim schema used by this signer.
    pub fn schema(&self) -> &ClaimSchema {
        &self.schema
    }

    /// Serializes `user` data and `headers` into the signing input. See
    /// [`ClaimSchema::serialize()`].
    pub fn serialize<U, H>(&self, user: &U, headers: &H) -> Result<String, SigningError>
    where
        U: Serialize + ?Sized,
        H: Serialize + ?Sized,
    {
        self.schema.serialize(user, headers).map_err(|err| {
            tracing::debug!(%err, "invalid token data");
            err
        })
    }

    /// Creates a token for the `user`.
    pub fn sign_sync<U>(&self, user: &U) -> Result<String, SigningError>
    where
        U: Serialize + ?Sized,
    {
        self.sign_sync_with_headers(user, &())
    }

    /// Creates a token for the `user` with additional JWS `headers`.
    pub fn sign_sync_with_headers<U, H>(
        &self,
        user: &U,
        headers: &H,
    ) -> Result<String, SigningError>
    where
        U: Serialize + ?Sized,
        H: Serialize + ?Sized,
    {
        let signing_input = self.serialize(user, headers)?;
        let signature = self
            .key
            .hmac(&signing_input)
            .map_err(SigningError::Digest)?;
        Ok(assemble(signing_input, &signature))
    }

    /// Asynchronously creates a token for the `user`. The output is the same
    /// as for [`Self::sign_sync()`].
    pub async fn sign<U>(&self, user: &U) -> Result<String, SigningError>
    where
        U: Serialize + ?Sized,
    {
        self.sign_with_headers(user, &()).await
    }

    /// Asynchronously creates a token for the `user` with additional JWS `headers`.
    ///
    /// Inputs are validated and serialized before the first suspension point. If deferred
    /// digest is enabled, the signer then yields once; the digest is computed by feeding
    /// the header and claims into HMAC separately.
    pub async fn sign_with_headers<U, H>(
        &self,
        user: &U,
        headers: &H,
    ) -> Result<String, SigningError>
    where
        U: Serialize + ?Sized,
        H: Serialize + ?Sized,
    {
        let signing_input = self.serialize(user, headers)?;
        if self.defer_digest {
            tokio::task::yield_now().await;
        }

        let (header, claims) = signing_input
            .split_once('.')
            .unwrap_or((signing_input.as_str(), ""));
        let parts = [header.as_bytes(), b".", claims.as_bytes()];
        let signature = self
            .key
            .hmac_parts(parts)
            .map_err(SigningError::Digest)?;
        Ok(assemble(signing_input, &signature))
    }
}

impl TryFrom<&str> for Signer {
    type Error = KeyError;

    fn try_from(secret_key: &str) -> Result<Self, Self::Error> {
        Self::new(secret_key)
    }
}

fn assemble(mut signing_input: String, signature: &[u8]) -> String {
    signing_input.push('.');
    signing_input.push_str(&Base64UrlUnpadded::encode_string(signature));
    tracing::trace!(token_len = signing_input.len(), "signed token");
    signing_input
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::{ExtraHeaders, UserIdentity};

    const KEY: &str = "HKYdFdnezle2yrI2_Ph3cHz144bISk-cvuAbeAAA999";

    fn signer() -> Signer {
        Signer::new(KEY).unwrap()
    }

    #[test]
    fn signer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Signer>();
    }

    #[test]
    fn debug_output_hides_key() {
        let debug = format!("{:?}", signer());
        assert!(debug.starts_with("Signer { schema: "), "{debug}");
        assert!(!debug.contains("key:"), "{debug}");
    }

    #[test]
    fn try_from_text() {
        assert!(Signer::try_from("abc1").is_ok());
        assert_matches!(Signer::try_from(""), Err(KeyError::Empty));
    }

    #[test]
    fn typed_and_untyped_user_data_produce_same_token() {
        let signer = signer();
        let typed = UserIdentity::new("example.com", "bar", "bob").with_groups([]);
        let untyped = json!({
            "domain": "example.com",
            "id": "bar",
            "displayName": "bob",
            "groups": [],
        });
        assert_eq!(
            signer.sign_sync(&typed).unwrap(),
            signer.sign_sync(&untyped).unwrap()
        );
    }

    #[test]
    fn extra_headers_are_included() {
        let signer = signer();
        let user = UserIdentity::new("example.com", "bar", "bob");
        let headers = ExtraHeaders::empty().with_key_id("key-1");
        let signing_input = signer.serialize(&user, &headers).unwrap();
        let expected_header =
            Base64UrlUnpadded::encode_string(br#"{"kid":"key-1","typ":"JWT","alg":"HS256"}"#);
        assert!(signing_input.starts_with(&format!("{expected_header}.")));

        let token = signer.sign_sync_with_headers(&user, &headers).unwrap();
        assert!(token.starts_with(&signing_input));
    }

    #[tokio::test]
    async fn deferred_and_immediate_digests_coincide() {
        let user = UserIdentity::new("example.com", "bar", "bob");
        let deferred = signer().sign(&user).await.unwrap();
        let immediate = signer()
            .with_deferred_digest(false)
            .sign(&user)
            .await
            .unwrap();
        assert_eq!(deferred, immediate);
        assert_eq!(deferred, signer().sign_sync(&user).unwrap());
    }

    #[tokio::test]
    async fn async_signing_reports_validation_errors() {
        let err = signer().sign(&json!({ "id": "bar" })).await.unwrap_err();
        assert_matches!(err, SigningError::MissingClaim { name } if name == "domain");
    }
}
