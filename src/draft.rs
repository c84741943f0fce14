//! In-memory household draft.
//!
//! A draft holds the household form and the family members staged so far.
//! Nothing is persisted until the draft is submitted through the store.

use std::path::Path;

use crate::error::{Error, Result};
use crate::validate::{
    validate_household, validate_member, HouseholdForm, MemberForm, ValidatedHousehold,
    ValidatedMember,
};

#[derive(Debug, Clone, Default)]
pub struct HouseholdDraft {
    household: HouseholdForm,
    members: Vec<MemberForm>,
}

/// A fully validated draft with photo bytes loaded, ready for the store.
#[derive(Debug, Clone)]
pub struct Submission {
    pub household: ValidatedHousehold,
    pub members: Vec<ValidatedMember>,
    pub owner_photo: Option<Vec<u8>>,
    pub member_photos: Vec<Option<Vec<u8>>>,
}

impl HouseholdDraft {
    pub fn new(household: HouseholdForm) -> Self {
        Self {
            household,
            members: Vec::new(),
        }
    }

    /// Rebuild a draft from previously collected values, such as a draft
    /// file. Members are not validated until `prepare`.
    pub fn from_parts(household: HouseholdForm, members: Vec<MemberForm>) -> Self {
        Self { household, members }
    }

    pub fn household(&self) -> &HouseholdForm {
        &self.household
    }

    pub fn members(&self) -> &[MemberForm] {
        &self.members
    }

    /// Stage a family member. Rows that fail validation are rejected and
    /// the draft is left unchanged.
    pub fn stage_member(&mut self, member: MemberForm) -> Result<()> {
        validate_member(&member)?;
        self.members.push(member);
        Ok(())
    }

    pub fn remove_member(&mut self, index: usize) -> Option<MemberForm> {
        if index < self.members.len() {
            Some(self.members.remove(index))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.household == HouseholdForm::default() && self.members.is_empty()
    }

    /// Reset the household form and drop every staged member.
    pub fn clear(&mut self) {
        self.household = HouseholdForm::default();
        self.members.clear();
    }

    /// Validate everything and load photo bytes. Does not touch the database.
    pub fn prepare(&self) -> Result<Submission> {
        let household = validate_household(&self.household)?;

        let mut members = Vec::with_capacity(self.members.len());
        for (i, form) in self.members.iter().enumerate() {
            let name = form.name.trim().to_string();
            let member = validate_member(form).map_err(|e| match e {
                Error::InvalidAge(_) => Error::MemberAgeInvalid { name: name.clone() },
                other => Error::MemberInvalid {
                    position: i + 1,
                    name: name.clone(),
                    source: Box::new(other),
                },
            })?;
            members.push(member);
        }

        let owner_photo = household.photo.as_deref().map(read_photo).transpose()?;
        let member_photos = members
            .iter()
            .map(|m| m.photo.as_deref().map(read_photo).transpose())
            .collect::<Result<Vec<_>>>()?;

        Ok(Submission {
            household,
            members,
            owner_photo,
            member_photos,
        })
    }
}

/// Read a photo file as opaque bytes. No format or size checks are applied.
pub fn read_photo(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::io(path, e))
}
