//! Error handling.

use core::fmt;

/// Errors that may occur when creating a [`SecretKey`](crate::SecretKey) or a
/// [`Signer`](crate::Signer) from text.
#[derive(Debug)]
#[non_exhaustive]
pub enum KeyError {
    /// Provided secret key (text or bytes) is empty.
    Empty,
    /// Secret key contains chars outside the base64 / base64url alphabets, or consists
    /// only of padding.
    InvalidAlphabet,
    /// Secret key uses a valid alphabet, but cannot be decoded (e.g., its length
    /// does not correspond to a whole number of bytes).
    Malformed(base64::DecodeError),
}

impl fmt::Display for KeyError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("Secret Key must not be empty"),
            Self::InvalidAlphabet => {
                formatter.write_str("Secret Key must be a base64url or base64")
            }
            Self::Malformed(e) => write!(formatter, "Secret Key could not be parsed: {e}"),
        }
    }
}

impl From<base64::DecodeError> for KeyError {
    fn from(error: base64::DecodeError) -> Self {
        Self::Malformed(error)
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors that can occur during token creation.
///
/// All variants except [`Self::Digest`] are raised while validating inputs, i.e.,
/// before any cryptographic work is performed.
#[derive(Debug)]
#[non_exhaustive]
pub enum SigningError {
    /// User data does not serialize to a JSON object.
    UserDataNotObject,
    /// Extra headers do not serialize to a JSON object.
    ExtraHeadersNotObject,
    /// Groups are present, but are not a JSON array.
    GroupsNotArray,
    /// A group is not a JSON object.
    GroupNotObject {
        /// Zero-based index of the group.
        index: usize,
    },
    /// A required user claim is absent or `null`.
    MissingClaim {
        /// Name of the claim as supplied by the application (e.g., `displayName`).
        name: String,
    },
    /// A required group claim is absent or `null`.
    MissingGroupClaim {
        /// Zero-based index of the group.
        index: usize,
        /// Name of the claim as supplied by the application.
        name: String,
    },
    /// User data or headers cannot be converted into JSON.
    Serialization(serde_json::Error),
    /// HMAC primitive has rejected the key.
    Digest(hmac::digest::InvalidLength),
}

impl fmt::Display for SigningError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserDataNotObject => formatter.write_str("User Data must be an Object"),
            Self::ExtraHeadersNotObject => formatter.write_str("Extra Headers must be an Object"),
            Self::GroupsNotArray => formatter.write_str("Groups must be in an Array"),
            Self::GroupNotObject { index } => write!(formatter, "group {index} must be an Object"),
            Self::MissingClaim { name } => write!(formatter, "missing required key: {name}"),
            Self::MissingGroupClaim { index, name } => {
                write!(formatter, "group {index} missing required key: {name}")
            }
            Self::Serialization(e) => write!(formatter, "Cannot serialize token data: {e}"),
            Self::Digest(e) => write!(formatter, "Cannot compute HMAC: {e}"),
        }
    }
}

impl std::error::Error for SigningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            Self::Digest(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_errors_mention_index_and_key() {
        let err = SigningError::MissingGroupClaim {
            index: 1,
            name: "displayName".to_owned(),
        };
        assert_eq!(err.to_string(), "group 1 missing required key: displayName");
        assert_eq!(
            SigningError::GroupNotObject { index: 3 }.to_string(),
            "group 3 must be an Object"
        );
    }
}
