//! Field validation for household and family member forms.
//!
//! These checks are pure: they look only at the collected string values and
//! never touch the database or the filesystem. Photo references are carried
//! through as paths and only read when a draft is prepared for submission.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// A form field, used to report which input failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AddressId,
    OwnerName,
    OwnerAge,
    Mobile,
    Address,
    Name,
    Age,
    Relation,
    Occupation,
    Designation,
}

impl Field {
    /// Label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Field::AddressId => "Address ID",
            Field::OwnerName => "Owner Name",
            Field::OwnerAge => "Owner Age",
            Field::Mobile => "Mobile",
            Field::Address => "Address",
            Field::Name => "Name",
            Field::Age => "Age",
            Field::Relation => "Relation",
            Field::Occupation => "Occupation",
            Field::Designation => "Designation",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw household values as collected from the entry form.
///
/// When read from a file, numeric values such as `owner_age = 45` or
/// `mobile = 9999` are kept as their text so the validator sees them as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdForm {
    #[serde(deserialize_with = "raw_text")]
    pub address_id: String,
    #[serde(deserialize_with = "raw_text")]
    pub owner_name: String,
    #[serde(deserialize_with = "raw_text")]
    pub owner_age: String,
    #[serde(deserialize_with = "raw_text")]
    pub occupation: String,
    #[serde(deserialize_with = "raw_text")]
    pub designation: String,
    #[serde(deserialize_with = "raw_text")]
    pub mobile: String,
    #[serde(deserialize_with = "raw_text")]
    pub address: String,
    pub photo: Option<PathBuf>,
}

/// Raw family member values as collected from the member dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberForm {
    #[serde(deserialize_with = "raw_text")]
    pub name: String,
    #[serde(deserialize_with = "raw_text")]
    pub age: String,
    #[serde(deserialize_with = "raw_text")]
    pub relation: String,
    #[serde(deserialize_with = "raw_text")]
    pub occupation: String,
    #[serde(deserialize_with = "raw_text")]
    pub designation: String,
    #[serde(deserialize_with = "raw_text")]
    pub mobile: String,
    pub photo: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn raw_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawText::deserialize(deserializer)? {
        RawText::Text(text) => text,
        RawText::Integer(n) => n.to_string(),
        RawText::Float(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedHousehold {
    pub address_id: String,
    pub owner_name: String,
    pub owner_age: i64,
    pub owner_occupation: String,
    pub owner_designation: String,
    pub mobile: String,
    pub address: String,
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMember {
    pub name: String,
    pub age: i64,
    pub relation: String,
    pub occupation: String,
    pub designation: String,
    pub mobile: String,
    pub photo: Option<PathBuf>,
}

/// Check a household form. Required fields are reported in form order:
/// address id, owner name, owner age, mobile, address.
pub fn validate_household(form: &HouseholdForm) -> Result<ValidatedHousehold> {
    let address_id = required(&form.address_id, Field::AddressId)?;
    let owner_name = required(&form.owner_name, Field::OwnerName)?;
    let owner_age = required(&form.owner_age, Field::OwnerAge)?;
    let mobile = required(&form.mobile, Field::Mobile)?;
    let address = required(&form.address, Field::Address)?;

    let owner_age = parse_age(owner_age, Field::OwnerAge.label())?;

    Ok(ValidatedHousehold {
        address_id: address_id.to_string(),
        owner_name: owner_name.to_string(),
        owner_age,
        owner_occupation: form.occupation.trim().to_string(),
        owner_designation: form.designation.trim().to_string(),
        mobile: mobile.to_string(),
        address: address.to_string(),
        photo: form.photo.clone(),
    })
}

/// Check a family member row. The age is checked before the other fields,
/// so a row with an unparseable age is always reported as `InvalidAge`,
/// naming the member when a name was entered.
pub fn validate_member(form: &MemberForm) -> Result<ValidatedMember> {
    let name = form.name.trim();
    let context = if name.is_empty() {
        Field::Age.label().to_string()
    } else {
        format!("Age of {}", name)
    };
    let age = parse_age(&form.age, &context)?;

    Ok(ValidatedMember {
        name: required(&form.name, Field::Name)?.to_string(),
        age,
        relation: required(&form.relation, Field::Relation)?.to_string(),
        occupation: required(&form.occupation, Field::Occupation)?.to_string(),
        designation: required(&form.designation, Field::Designation)?.to_string(),
        mobile: required(&form.mobile, Field::Mobile)?.to_string(),
        photo: form.photo.clone(),
    })
}

/// Parse an age value. No range is enforced: zero and negative values pass.
pub fn parse_age(raw: &str, context: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidAge(context.to_string()))
}

fn required(value: &str, field: Field) -> Result<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
