//! Typed descriptors of the data placed into a token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object with arbitrary fields.
pub type Obj = Map<String, Value>;

/// Descriptor of a user on whose behalf a token is issued.
///
/// Serializes to the shape expected by [`Signer`](crate::Signer): `domain`, `id`,
/// `displayName` and optional `groups`. Other fields are passed to the token claims
/// unchanged.
///
/// ```
/// # use goinstant_auth::{GroupClaim, UserIdentity};
/// let user = UserIdentity::new("example.com", "bar", "bob")
///     .with_group(GroupClaim::new(42, "Meaning Group"))
///     .with_field("email", "bob@example.com");
/// assert_eq!(user.groups.as_ref().map(Vec::len), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UserIdentity {
    /// Identifier of the issuing party. Mapped to the `iss` claim.
    pub domain: String,
    /// Identifier of the user. Mapped to the `sub` claim.
    pub id: String,
    /// Human-readable user name. Mapped to the `dn` claim.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Groups the user is a member of. Mapped to the `g` claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupClaim>>,
    /// Other fields, passed to the claims as is.
    #[serde(flatten)]
    pub other_fields: Obj,
}

impl UserIdentity {
    /// Creates a user descriptor without groups.
    pub fn new(
        domain: impl Into<String>,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            id: id.into(),
            display_name: display_name.into(),
            groups: None,
            other_fields: Obj::new(),
        }
    }

    /// Adds a group to this descriptor.
    pub fn with_group(mut self, group: GroupClaim) -> Self {
        self.groups.get_or_insert_with(Vec::new).push(group);
        self
    }

    /// Sets groups for this descriptor. An empty list still produces the `g` claim.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupClaim>) -> Self {
        self.groups = Some(groups.into_iter().collect());
        self
    }

    /// Adds a custom field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.other_fields.insert(name.into(), value.into());
        self
    }
}

/// Group membership of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct GroupClaim {
    /// Group identifier. May be any JSON value; integers are customary.
    pub id: Value,
    /// Human-readable group name. Mapped to the `dn` field.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Other fields, passed to the claims as is.
    #[serde(flatten)]
    pub other_fields: Obj,
}

impl GroupClaim {
    /// Creates a group with the specified ID and name.
    pub fn new(id: impl Into<Value>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            other_fields: Obj::new(),
        }
    }

    /// Adds a custom field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.other_fields.insert(name.into(), value.into());
        self
    }
}

/// Additional JWS header fields.
///
/// `typ` and `alg` fields are always set by the signer and override the values
/// supplied here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExtraHeaders {
    /// Identifier of the key that has signed the token. This field is renamed to [`kid`]
    /// for serialization.
    ///
    /// [`kid`]: https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.4
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Other header fields.
    #[serde(flatten)]
    pub other_fields: Obj,
}

impl ExtraHeaders {
    /// Creates an empty set of headers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the `key_id` field.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Adds a custom field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.other_fields.insert(name.into(), value.into());
        self
    }
}
