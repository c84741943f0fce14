//! Types for persisted households and family members.

use serde::Serialize;

/// A household row. Photo blobs are returned exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Household {
    pub address_id: String,
    pub owner_name: String,
    pub owner_age: i64,
    pub owner_occupation: String,
    pub owner_designation: String,
    pub mobile: String,
    pub address: String,
    #[serde(skip)]
    pub owner_photo: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyMember {
    pub id: i64,
    pub address_id: String,
    pub name: String,
    pub age: i64,
    pub relation: String,
    pub occupation: String,
    pub designation: String,
    pub mobile: String,
    #[serde(skip)]
    pub photo: Option<Vec<u8>>,
}

/// A household together with every member that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseholdRecord {
    pub household: Household,
    pub members: Vec<FamilyMember>,
}
