//! Claim tables and construction of the signing input.

use std::borrow::Cow;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Serialize;
use serde_json::Value;

use crate::{claims::Obj, SigningError};

/// Value of the `typ` header field.
pub const TOKEN_TYPE: &str = "JWT";
/// Name of the signing algorithm, as mentioned in the `alg` header field.
pub const ALGORITHM: &str = "HS256";
/// Audience (`aud` claim) of the issued tokens.
pub const DEFAULT_AUDIENCE: &str = "goinstant.net";

/// Ordered table of renames from names supplied by the application (*external* names)
/// to claim names placed into the token (*internal* names).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimTable {
    entries: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl ClaimTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rename to this table.
    #[must_use]
    pub fn with_entry(
        mut self,
        external: impl Into<Cow<'static, str>>,
        internal: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.entries.push((external.into(), internal.into()));
        self
    }

    /// Iterates over `(external, internal)` names in the table order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(external, internal)| (&**external, &**internal))
    }

    /// Renames all fields in the table, failing if any of them is absent or `null`.
    /// `claims` are not modified; the renamed object is returned instead.
    pub fn map_required(&self, claims: &Obj) -> Result<Obj, SigningError> {
        self.rename_required(claims)
            .map_err(|name| SigningError::MissingClaim {
                name: name.to_owned(),
            })
    }

    /// Renames the fields in the table that are present and not `null`; other fields
    /// are left as is.
    pub fn map_optional(&self, claims: &Obj) -> Obj {
        let renamed: Vec<_> = self
            .lookup(claims)
            .into_iter()
            .filter_map(|(external, internal, value)| {
                value.map(|value| (external, internal, value))
            })
            .collect();
        apply_renames(claims, &renamed)
    }

    /// Returns the name of the first missing field on error.
    fn rename_required(&self, claims: &Obj) -> Result<Obj, &str> {
        let renamed = self
            .lookup(claims)
            .into_iter()
            .map(|(external, internal, value)| {
                value
                    .map(|value| (external, internal, value))
                    .ok_or(external)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(apply_renames(claims, &renamed))
    }

    fn lookup<'s, 'c>(&'s self, claims: &'c Obj) -> Vec<(&'s str, &'s str, Option<&'c Value>)> {
        self.entries()
            .map(|(external, internal)| {
                let value = claims.get(external).filter(|value| !value.is_null());
                (external, internal, value)
            })
            .collect()
    }
}

/// Drops renamed fields from `claims` and appends them under the new names in the table order.
/// A new name coinciding with an untouched field overwrites that field in place.
fn apply_renames(claims: &Obj, renamed: &[(&str, &str, &Value)]) -> Obj {
    let mut output: Obj = claims
        .iter()
        .filter(|(key, _)| !renamed.iter().any(|(external, ..)| *external == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    for (_, internal, value) in renamed {
        output.insert((*internal).to_owned(), (*value).clone());
    }
    output
}

/// Describes how user data maps to the token claims.
///
/// The [`Default`] schema is [`Self::goinstant()`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ClaimSchema {
    /// User fields that must be present.
    pub required: ClaimTable,
    /// User fields that are renamed if present.
    pub optional: ClaimTable,
    /// Claim holding user groups (after renaming). If present, it must be an array of objects.
    pub groups_claim: Cow<'static, str>,
    /// Fields that must be present in each group.
    pub group_required: ClaimTable,
    /// Value of the `aud` claim. Overrides any `aud` field in the user data.
    pub audience: Cow<'static, str>,
}

impl Default for ClaimSchema {
    fn default() -> Self {
        Self::goinstant()
    }
}

impl ClaimSchema {
    /// Schema accepted by the GoInstant platform.
    ///
    /// | User field | Claim |
    /// |------------|-------|
    /// | `domain` | `iss` |
    /// | `id` | `sub` |
    /// | `displayName` | `dn` |
    /// | `groups` (optional) | `g` |
    /// | `groups[i].id` | `g[i].id` |
    /// | `groups[i].displayName` | `g[i].dn` |
    pub fn goinstant() -> Self {
        Self {
            required: ClaimTable::new()
                .with_entry("domain", "iss")
                .with_entry("id", "sub")
                .with_entry("displayName", "dn"),
            optional: ClaimTable::new().with_entry("groups", "g"),
            groups_claim: Cow::Borrowed("g"),
            group_required: ClaimTable::new()
                .with_entry("id", "id")
                .with_entry("displayName", "dn"),
            audience: Cow::Borrowed(DEFAULT_AUDIENCE),
        }
    }

    /// Sets the audience of the issued tokens.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<Cow<'static, str>>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Builds the complete token header: `headers` with `typ` and `alg` fields set.
    /// `null` is treated as an empty set of headers.
    pub fn header<H>(&self, headers: &H) -> Result<Obj, SigningError>
    where
        H: Serialize + ?Sized,
    {
        let headers = to_object(headers, SigningError::ExtraHeadersNotObject)?;
        Ok(complete_header(headers))
    }

    /// Maps `user` data to the token claims.
    pub fn claims<U>(&self, user: &U) -> Result<Obj, SigningError>
    where
        U: Serialize + ?Sized,
    {
        let user = user_object(user)?;
        self.map_claims(&user)
    }

    /// Serializes `user` data and `headers` into the signing input, i.e., base64url-encoded
    /// header and claims separated by a period. All inputs are validated before serialization.
    pub fn serialize<U, H>(&self, user: &U, headers: &H) -> Result<String, SigningError>
    where
        U: Serialize + ?Sized,
        H: Serialize + ?Sized,
    {
        let user = user_object(user)?;
        let headers = to_object(headers, SigningError::ExtraHeadersNotObject)?;

        let header = complete_header(headers);
        let claims = self.map_claims(&user)?;

        let header = serde_json::to_vec(&header).map_err(SigningError::Serialization)?;
        let claims = serde_json::to_vec(&claims).map_err(SigningError::Serialization)?;
        let mut signing_input = Base64UrlUnpadded::encode_string(&header);
        signing_input.push('.');
        signing_input.push_str(&Base64UrlUnpadded::encode_string(&claims));
        Ok(signing_input)
    }

    fn map_claims(&self, user: &Obj) -> Result<Obj, SigningError> {
        let claims = self.required.map_required(user)?;
        let mut claims = self.optional.map_optional(&claims);

        let groups = claims
            .get_mut(&*self.groups_claim)
            .filter(|groups| !groups.is_null());
        if let Some(groups) = groups {
            let Value::Array(groups) = groups else {
                return Err(SigningError::GroupsNotArray);
            };
            for (index, group) in groups.iter_mut().enumerate() {
                let Value::Object(fields) = group else {
                    return Err(SigningError::GroupNotObject { index });
                };
                *fields = self.group_required.rename_required(fields).map_err(|name| {
                    SigningError::MissingGroupClaim {
                        index,
                        name: name.to_owned(),
                    }
                })?;
            }
        }

        claims.insert("aud".to_owned(), Value::from(&*self.audience));
        Ok(claims)
    }
}

fn user_object<U: Serialize + ?Sized>(user: &U) -> Result<Obj, SigningError> {
    match serde_json::to_value(user).map_err(SigningError::Serialization)? {
        Value::Object(user) => Ok(user),
        _ => Err(SigningError::UserDataNotObject),
    }
}

fn to_object<T: Serialize + ?Sized>(value: &T, err: SigningError) -> Result<Obj, SigningError> {
    match serde_json::to_value(value).map_err(SigningError::Serialization)? {
        Value::Object(obj) => Ok(obj),
        Value::Null => Ok(Obj::new()),
        _ => Err(err),
    }
}

fn complete_header(mut headers: Obj) -> Obj {
    headers.insert("typ".to_owned(), Value::from(TOKEN_TYPE));
    headers.insert("alg".to_owned(), Value::from(ALGORITHM));
    headers
}
