//! Address book domain types.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for an address.
pub type AddressId = i64;

/// Which of the two address book entries an address occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSlot {
    Home,
    Work,
}

impl AddressSlot {
    /// The slots in the order they are filled.
    pub const ALL: [AddressSlot; 2] = [AddressSlot::Home, AddressSlot::Work];

    fn as_str(&self) -> &'static str {
        match self {
            AddressSlot::Home => "home",
            AddressSlot::Work => "work",
        }
    }
}

impl Display for AddressSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for AddressSlot {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, rusqlite::Error> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AddressSlot {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "home" => Ok(AddressSlot::Home),
            "work" => Ok(AddressSlot::Work),
            other => Err(FromSqlError::Other(
                format!("unknown address slot {other:?}").into(),
            )),
        }
    }
}

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub slot: AddressSlot,
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
}

/// The request body for adding or editing an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
}

impl AddressForm {
    /// Trim every field and check that none of them are empty.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] naming the first empty field.
    pub fn validate(self) -> Result<Self, Error> {
        let check = |field: &str, value: String| {
            let value = value.trim();

            if value.is_empty() {
                Err(Error::Validation(format!("{field} cannot be empty")))
            } else {
                Ok(value.to_owned())
            }
        };

        Ok(Self {
            city: check("city", self.city)?,
            street: check("street", self.street)?,
            house: check("house", self.house)?,
            postal_code: check("postal code", self.postal_code)?,
        })
    }
}

#[cfg(test)]
mod address_form_tests {
    use crate::Error;

    use super::{AddressForm, AddressSlot};

    fn form(city: &str, postal_code: &str) -> AddressForm {
        AddressForm {
            city: city.to_owned(),
            street: "Queen Street".to_owned(),
            house: "12".to_owned(),
            postal_code: postal_code.to_owned(),
        }
    }

    #[test]
    fn validate_trims_fields() {
        let validated = form(" Auckland ", "1010 ").validate().unwrap();

        assert_eq!(validated.city, "Auckland");
        assert_eq!(validated.postal_code, "1010");
    }

    #[test]
    fn validate_names_empty_field() {
        let result = form("Auckland", "  ").validate();

        assert_eq!(
            result,
            Err(Error::Validation("postal code cannot be empty".to_owned()))
        );
    }

    #[test]
    fn slot_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AddressSlot::Home).unwrap(), "\"home\"");
        assert_eq!(AddressSlot::Work.to_string(), "work");
    }
}
