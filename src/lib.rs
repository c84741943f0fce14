//! Household and family member registry.
//!
//! Form values are checked by [`validate`], staged in a [`draft::HouseholdDraft`]
//! and persisted through [`db::Store`], which keeps households and their
//! members in a local SQLite file.

pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod logging;
pub mod tasks;
pub mod validate;

pub use db::{FamilyMember, Household, HouseholdRecord, Store};
pub use draft::{HouseholdDraft, Submission};
pub use error::{Error, Result};
pub use validate::{
    validate_household, validate_member, Field, HouseholdForm, MemberForm, ValidatedHousehold,
    ValidatedMember,
};
