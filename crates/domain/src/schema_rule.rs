use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Formatter;

use rbac_shield_core::{AppError, AppResult, NonEmptyString};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Role;

/// Access rule declared for one schema location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocationRule {
    /// Roles allowed on the whole type.
    WholeType(Vec<Role>),
    /// Roles allowed per listed field of the type.
    Fields(BTreeMap<NonEmptyString, Vec<Role>>),
}

impl LocationRule {
    /// Returns whether the rule covers the whole type.
    #[must_use]
    pub fn is_whole_type(&self) -> bool {
        matches!(self, Self::WholeType(_))
    }

    /// Iterates every role named by the rule, duplicates included.
    pub fn roles(&self) -> Box<dyn Iterator<Item = &Role> + '_> {
        match self {
            Self::WholeType(roles) => Box::new(roles.iter()),
            Self::Fields(fields) => Box::new(fields.values().flatten()),
        }
    }
}

impl<'de> Deserialize<'de> for LocationRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LocationRuleVisitor;

        impl<'de> Visitor<'de> for LocationRuleVisitor {
            type Value = LocationRule;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter
                    .write_str("a list of role names or a map of field names to lists of role names")
            }

            fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let roles = Vec::<Role>::deserialize(de::value::SeqAccessDeserializer::new(seq))?;
                Ok(LocationRule::WholeType(roles))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let fields = BTreeMap::<NonEmptyString, Vec<Role>>::deserialize(
                    de::value::MapAccessDeserializer::new(map),
                )?;
                Ok(LocationRule::Fields(fields))
            }
        }

        deserializer.deserialize_any(LocationRuleVisitor)
    }
}

/// Declarative table mapping schema locations to permitted roles.
///
/// Keys are GraphQL type names. Whole-type and per-field rules may be mixed
/// freely across locations, but one location holds exactly one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaPermissionTable {
    locations: BTreeMap<NonEmptyString, LocationRule>,
}

impl SchemaPermissionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a whole-type rule for a location.
    pub fn with_whole_type<I, S>(mut self, location: impl Into<String>, roles: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let location = NonEmptyString::new(location)?;
        if self.locations.contains_key(location.as_str()) {
            return Err(AppError::Validation(format!(
                "location '{location}' already has a rule"
            )));
        }

        self.locations
            .insert(location, LocationRule::WholeType(parse_roles(roles)?));
        Ok(self)
    }

    /// Adds a per-field rule for one field of a location.
    pub fn with_field<I, S>(
        mut self,
        location: impl Into<String>,
        field: impl Into<String>,
        roles: I,
    ) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let location = NonEmptyString::new(location)?;
        let field = NonEmptyString::new(field)?;
        let roles = parse_roles(roles)?;

        match self
            .locations
            .entry(location)
            .or_insert_with(|| LocationRule::Fields(BTreeMap::new()))
        {
            LocationRule::Fields(fields) => {
                if fields.contains_key(field.as_str()) {
                    return Err(AppError::Validation(format!(
                        "field '{field}' already has a rule"
                    )));
                }
                fields.insert(field, roles);
            }
            LocationRule::WholeType(_) => {
                return Err(AppError::Validation(format!(
                    "cannot add field '{field}' to a location with a whole-type rule"
                )));
            }
        }

        Ok(self)
    }

    /// Returns the rule declared for a location.
    #[must_use]
    pub fn get(&self, location: &str) -> Option<&LocationRule> {
        self.locations.get(location)
    }

    /// Iterates locations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&NonEmptyString, &LocationRule)> {
        self.locations.iter()
    }

    /// Returns the number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns whether the table declares no location.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Returns every distinct role referenced by the table.
    #[must_use]
    pub fn referenced_roles(&self) -> BTreeSet<&Role> {
        self.locations.values().flat_map(LocationRule::roles).collect()
    }
}

fn parse_roles<I, S>(roles: I) -> AppResult<Vec<Role>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    roles.into_iter().map(Role::new).collect()
}

#[cfg(test)]
mod tests {
    use super::{LocationRule, SchemaPermissionTable};

    #[test]
    fn parses_mixed_whole_type_and_field_rules() {
        let json = r#"{
            "Query": { "test": ["ADMIN"] },
            "Mutation": { "test": ["ADMIN", "DEVELOPER"] },
            "Obj": ["ADMIN"]
        }"#;

        let table = serde_json::from_str::<SchemaPermissionTable>(json)
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(table.len(), 3);
        assert!(matches!(table.get("Obj"), Some(LocationRule::WholeType(roles)) if roles.len() == 1));
        assert!(matches!(
            table.get("Mutation"),
            Some(LocationRule::Fields(fields)) if fields.get("test").map(Vec::len) == Some(2)
        ));
    }

    #[test]
    fn rejects_entry_that_is_neither_list_nor_map() {
        let parsed = serde_json::from_str::<SchemaPermissionTable>(r#"{ "Query": "ADMIN" }"#);
        let error = parsed.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(error.contains("a list of role names or a map"));
    }

    #[test]
    fn rejects_nested_field_value_that_is_not_a_list() {
        let parsed =
            serde_json::from_str::<SchemaPermissionTable>(r#"{ "Query": { "test": "ADMIN" } }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_blank_role_in_table() {
        let parsed = serde_json::from_str::<SchemaPermissionTable>(r#"{ "Obj": [""] }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn builder_rejects_field_on_whole_type_location() {
        let table = SchemaPermissionTable::new()
            .with_whole_type("Obj", ["ADMIN"])
            .and_then(|table| table.with_field("Obj", "secret", ["ADMIN"]));
        assert!(table.is_err());
    }

    #[test]
    fn builder_groups_fields_under_one_location() {
        let table = SchemaPermissionTable::new()
            .with_field("Obj", "secret", ["ADMIN"])
            .and_then(|table| table.with_field("Obj", "token", ["ADMIN", "DEVELOPER"]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(table.len(), 1);
        assert_eq!(table.referenced_roles().len(), 2);
    }

    #[test]
    fn empty_role_list_is_kept() {
        let table = SchemaPermissionTable::new()
            .with_whole_type("Locked", Vec::<String>::new())
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(table.get("Locked"), Some(LocationRule::WholeType(roles)) if roles.is_empty()));
    }
}
