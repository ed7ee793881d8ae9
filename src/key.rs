//! Secret keys for `HS256` token signatures.

use core::{fmt, str::FromStr};

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use hmac::{
    digest::{InvalidLength, Output},
    Hmac, Mac,
};
use sha2::Sha256;
use smallvec::SmallVec;
use zeroize::Zeroize;

use crate::KeyError;

/// HMAC-SHA256 digest, i.e. the raw token signature.
pub(crate) type Hs256Digest = Output<Hmac<Sha256>>;

/// Engine used to decode normalized key text. Non-zero trailing bits in the last symbol
/// are accepted, so that every text in the base64url alphabet with a valid length decodes.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Converts base64 text into the base64url alphabet and strips padding.
/// Text already in the base64url alphabet is returned unchanged.
pub(crate) fn to_base64url(text: &str) -> String {
    text.chars()
        .filter_map(|ch| match ch {
            '+' => Some('-'),
            '/' => Some('_'),
            '=' => None,
            other => Some(other),
        })
        .collect()
}

fn is_base64url(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

/// Secret key shared between the token issuer and the verifying service. Zeroed on drop.
///
/// The key bytes are never exposed after construction; the [`Debug`] implementation
/// does not print them either.
#[derive(Clone)]
pub struct SecretKey(SmallVec<[u8; 64]>);

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.as_mut_slice().zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SecretKey").field(&"_").finish()
    }
}

impl SecretKey {
    /// Creates a key from the specified raw `bytes`.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, KeyError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(bytes.into()))
    }

    /// Decodes a key from base64 or base64url text. Padding is optional in both cases.
    pub fn from_base64(text: &str) -> Result<Self, KeyError> {
        if text.is_empty() {
            return Err(KeyError::Empty);
        }
        let normalized = to_base64url(text);
        if !is_base64url(&normalized) {
            return Err(KeyError::InvalidAlphabet);
        }
        let mut bytes = KEY_ENGINE.decode(normalized)?;
        let key = Self::new(&bytes);
        bytes.zeroize();
        key
    }

    /// Returns the key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always returns `false`; keys are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Computes HMAC-SHA256 with this key over the specified `message`.
    pub(crate) fn hmac(&self, message: impl AsRef<[u8]>) -> Result<Hs256Digest, InvalidLength> {
        let hmac = Hmac::<Sha256>::new_from_slice(&self.0)?;
        Ok(hmac.chain_update(message).finalize().into_bytes())
    }

    /// Computes HMAC-SHA256 with this key, feeding the message into the MAC piece by piece.
    /// The result is the same as for [`Self::hmac()`] over the concatenated `parts`.
    pub(crate) fn hmac_parts<'a>(
        &self,
        parts: impl IntoIterator<Item = &'a [u8]>,
    ) -> Result<Hs256Digest, InvalidLength> {
        let mut hmac = Hmac::<Sha256>::new_from_slice(&self.0)?;
        for part in parts {
            hmac.update(part);
        }
        Ok(hmac.finalize().into_bytes())
    }
}

impl FromStr for SecretKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn base64_is_normalized() {
        assert_eq!(to_base64url("ab+/cd=="), "ab-_cd");
        assert_eq!(to_base64url("ab-_cd"), "ab-_cd");
        assert_eq!(to_base64url("="), "");
    }

    #[test]
    fn key_is_decoded_with_and_without_padding() {
        let padded = SecretKey::from_base64("abc1==").unwrap();
        let unpadded = SecretKey::from_base64("abc1").unwrap();
        assert_eq!(padded.len(), 3);
        assert_eq!(padded.0, unpadded.0);
    }

    #[test]
    fn standard_and_url_safe_keys_coincide() {
        let standard = SecretKey::from_base64("+/+/").unwrap();
        let url_safe = SecretKey::from_base64("-_-_").unwrap();
        assert_eq!(standard.0, url_safe.0);
        assert_eq!(standard.0.as_slice(), [0xfb, 0xff, 0xbf]);
    }

    #[test]
    fn key_with_trailing_bits_is_accepted() {
        let key = SecretKey::from_base64("HKYdFdnezle2yrI2_Ph3cHz144bISk-cvuAbeAAA999").unwrap();
        assert_eq!(key.len(), 32);
    }

    #[test]
    fn invalid_keys() {
        assert_matches!(SecretKey::from_base64(""), Err(KeyError::Empty));
        assert_matches!(SecretKey::from_base64("==="), Err(KeyError::InvalidAlphabet));
        assert_matches!(SecretKey::from_base64("!@$^&*"), Err(KeyError::InvalidAlphabet));
        assert_matches!(SecretKey::from_base64("abc d"), Err(KeyError::InvalidAlphabet));
        assert_matches!(SecretKey::from_base64("abcde"), Err(KeyError::Malformed(_)));
        assert_matches!(SecretKey::new(b""), Err(KeyError::Empty));
    }

    #[test]
    fn debug_output_hides_key() {
        let key = SecretKey::new(b"super_secret_key_donut_steel").unwrap();
        assert_eq!(format!("{key:?}"), "SecretKey(\"_\")");
    }

    #[test]
    fn streaming_hmac_matches_one_shot() {
        let key = SecretKey::new(b"super_secret_key_donut_steel").unwrap();
        let one_shot = key.hmac(b"header.payload").unwrap();
        let streamed = key
            .hmac_parts([b"header".as_slice(), b".", b"payload"])
            .unwrap();
        assert_eq!(one_shot, streamed);
    }
}
