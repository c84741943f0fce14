//! Household submission, lookup and removal.

use rusqlite::{params, Row};

use super::records::{FamilyMember, Household, HouseholdRecord};
use super::Store;
use crate::draft::HouseholdDraft;
use crate::error::{Error, Result};
use crate::validate::{ValidatedHousehold, ValidatedMember};

impl Store {
    /// Persist a household and its members in one transaction.
    ///
    /// `member_photos` is matched to `members` by position; a missing entry
    /// means the member has no photo. More photos than members is rejected
    /// with `PhotoCountMismatch` before the database is opened. If the
    /// address id is already taken the call fails with `DuplicateKey` and
    /// nothing is written. Any other failure rolls back the household row
    /// and every member inserted so far.
    pub fn submit_household(
        &self,
        household: &ValidatedHousehold,
        members: &[ValidatedMember],
        owner_photo: Option<&[u8]>,
        member_photos: &[Option<Vec<u8>>],
    ) -> Result<()> {
        if member_photos.len() > members.len() {
            return Err(Error::PhotoCountMismatch {
                members: members.len(),
                photos: member_photos.len(),
            });
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM households WHERE address_id = ?1)",
            [&household.address_id],
            |row| row.get(0),
        )?;
        if exists {
            tracing::warn!("Rejected duplicate address id {}", household.address_id);
            return Err(Error::DuplicateKey(household.address_id.clone()));
        }

        tx.execute(
            r#"
            INSERT INTO households
                (address_id, owner_name, owner_age, owner_occupation, owner_designation,
                 mobile, address, owner_photo)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                household.address_id,
                household.owner_name,
                household.owner_age,
                household.owner_occupation,
                household.owner_designation,
                household.mobile,
                household.address,
                owner_photo,
            ],
        )
        .map_err(|e| {
            if is_primary_key_violation(&e) {
                Error::DuplicateKey(household.address_id.clone())
            } else {
                Error::Storage(e)
            }
        })?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO family_members
                    (address_id, name, age, relation, occupation, designation, mobile, photo)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for (i, member) in members.iter().enumerate() {
                let photo = member_photos.get(i).and_then(|p| p.as_deref());
                stmt.execute(params![
                    household.address_id,
                    member.name,
                    member.age,
                    member.relation,
                    member.occupation,
                    member.designation,
                    member.mobile,
                    photo,
                ])?;
            }
        }

        tx.commit()?;
        tracing::info!(
            "Saved household {} with {} member(s)",
            household.address_id,
            members.len()
        );
        Ok(())
    }

    /// Validate a draft, load its photos and persist it.
    ///
    /// Validation and photo read errors are returned before the database is
    /// opened.
    pub fn submit_draft(&self, draft: &HouseholdDraft) -> Result<()> {
        let submission = draft.prepare()?;
        self.submit_household(
            &submission.household,
            &submission.members,
            submission.owner_photo.as_deref(),
            &submission.member_photos,
        )
    }

    /// Look up a household by exact address id, with all of its members.
    pub fn find_household(&self, address_id: &str) -> Result<Option<HouseholdRecord>> {
        let conn = self.connect()?;

        let result = conn.query_row(
            r#"
            SELECT address_id, owner_name, owner_age, owner_occupation, owner_designation,
                   mobile, address, owner_photo
            FROM households
            WHERE address_id = ?1
            "#,
            [address_id],
            household_from_row,
        );
        let household = match result {
            Ok(household) => household,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                tracing::debug!("No household for address id {}", address_id);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT id, address_id, name, age, relation, occupation, designation, mobile, photo
            FROM family_members
            WHERE address_id = ?1
            ORDER BY id
            "#,
        )?;
        let members = stmt
            .query_map([address_id], member_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(HouseholdRecord { household, members }))
    }

    /// Remove a household and all of its members in one transaction.
    ///
    /// Returns `false` if no household had this address id.
    pub fn delete_household(&self, address_id: &str) -> Result<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let members = tx.execute(
            "DELETE FROM family_members WHERE address_id = ?1",
            [address_id],
        )?;
        let removed = tx.execute("DELETE FROM households WHERE address_id = ?1", [address_id])?;
        tx.commit()?;

        if removed > 0 {
            tracing::info!("Deleted household {} and {} member(s)", address_id, members);
        } else {
            tracing::debug!("Nothing to delete for address id {}", address_id);
        }
        Ok(removed > 0)
    }

    pub fn count_households(&self) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row("SELECT COUNT(*) FROM households", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn household_from_row(row: &Row<'_>) -> rusqlite::Result<Household> {
    Ok(Household {
        address_id: row.get(0)?,
        owner_name: row.get(1)?,
        owner_age: row.get(2)?,
        owner_occupation: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        owner_designation: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        mobile: row.get(5)?,
        address: row.get(6)?,
        owner_photo: row.get(7)?,
    })
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<FamilyMember> {
    Ok(FamilyMember {
        id: row.get(0)?,
        address_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        relation: row.get(4)?,
        occupation: row.get(5)?,
        designation: row.get(6)?,
        mobile: row.get(7)?,
        photo: row.get(8)?,
    })
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate_household, validate_member, HouseholdForm, MemberForm};

    fn make_store() -> (Store, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path().join("data").join("sangha.db")).unwrap();
        store.ensure_schema().unwrap();
        (store, tmp)
    }

    fn household(address_id: &str, owner_name: &str) -> ValidatedHousehold {
        validate_household(&HouseholdForm {
            address_id: address_id.to_string(),
            owner_name: owner_name.to_string(),
            owner_age: "45".to_string(),
            mobile: "9999".to_string(),
            address: "Street 1".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn member(name: &str, age: &str) -> ValidatedMember {
        validate_member(&MemberForm {
            name: name.to_string(),
            age: age.to_string(),
            relation: "Spouse".to_string(),
            occupation: "Teacher".to_string(),
            designation: "Senior".to_string(),
            mobile: "8888".to_string(),
            photo: None,
        })
        .unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let (store, _tmp) = make_store();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.count_households().unwrap(), 0);
    }

    #[test]
    fn test_submit_then_find_round_trip() {
        let (store, _tmp) = make_store();
        let hh = household("A1", "Rao");
        store
            .submit_household(&hh, &[member("Sita", "40")], None, &[])
            .unwrap();

        let record = store.find_household("A1").unwrap().unwrap();
        assert_eq!(record.household.address_id, "A1");
        assert_eq!(record.household.owner_name, "Rao");
        assert_eq!(record.household.owner_age, 45);
        assert_eq!(record.household.owner_occupation, "");
        assert_eq!(record.household.mobile, "9999");
        assert_eq!(record.household.address, "Street 1");
        assert_eq!(record.household.owner_photo, None);

        assert_eq!(record.members.len(), 1);
        let sita = &record.members[0];
        assert_eq!(sita.address_id, "A1");
        assert_eq!(sita.name, "Sita");
        assert_eq!(sita.age, 40);
        assert_eq!(sita.relation, "Spouse");
        assert_eq!(sita.occupation, "Teacher");
        assert_eq!(sita.designation, "Senior");
        assert_eq!(sita.mobile, "8888");
    }

    #[test]
    fn test_photos_returned_unchanged() {
        let (store, _tmp) = make_store();
        let owner_photo: Vec<u8> = (0..=255).collect();
        let member_photo = vec![0u8, 1, 2, 3];

        store
            .submit_household(
                &household("A1", "Rao"),
                &[member("Sita", "40"), member("Ravi", "12")],
                Some(owner_photo.as_slice()),
                &[Some(member_photo.clone())],
            )
            .unwrap();

        let record = store.find_household("A1").unwrap().unwrap();
        assert_eq!(record.household.owner_photo, Some(owner_photo));
        assert_eq!(record.members[0].photo, Some(member_photo));
        assert_eq!(record.members[1].photo, None);
    }

    #[test]
    fn test_extra_member_photos_rejected() {
        let (store, _tmp) = make_store();
        let err = store
            .submit_household(&household("A1", "Rao"), &[], None, &[Some(vec![1, 2, 3])])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PhotoCountMismatch {
                members: 0,
                photos: 1
            }
        ));
        assert!(store.find_household("A1").unwrap().is_none());

        let err = store
            .submit_household(
                &household("A1", "Rao"),
                &[member("Sita", "40")],
                None,
                &[None, Some(vec![9])],
            )
            .unwrap_err();
        assert!(matches!(err, Error::PhotoCountMismatch { .. }));
        assert_eq!(store.count_households().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_key_leaves_prior_record() {
        let (store, _tmp) = make_store();
        store
            .submit_household(&household("A1", "Rao"), &[member("Sita", "40")], None, &[])
            .unwrap();

        let err = store
            .submit_household(
                &household("A1", "Someone Else"),
                &[member("Ravi", "12"), member("Anu", "9")],
                None,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref id) if id == "A1"));

        let record = store.find_household("A1").unwrap().unwrap();
        assert_eq!(record.household.owner_name, "Rao");
        assert_eq!(record.members.len(), 1);
        assert_eq!(record.members[0].name, "Sita");
    }

    #[test]
    fn test_failed_member_insert_rolls_back_household() {
        let (store, tmp) = make_store();
        let conn = rusqlite::Connection::open(tmp.path().join("data").join("sangha.db")).unwrap();
        conn.execute_batch(
            r#"
            CREATE TRIGGER reject_member BEFORE INSERT ON family_members
            WHEN NEW.name = 'Boom'
            BEGIN SELECT RAISE(ABORT, 'rejected'); END;
            "#,
        )
        .unwrap();
        drop(conn);

        let err = store
            .submit_household(
                &household("A1", "Rao"),
                &[member("Sita", "40"), member("Boom", "1")],
                None,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(store.find_household("A1").unwrap().is_none());
        assert_eq!(store.count_households().unwrap(), 0);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let (store, _tmp) = make_store();
        assert!(store.find_household("nope").unwrap().is_none());
    }

    #[test]
    fn test_delete_removes_household_and_members() {
        let (store, tmp) = make_store();
        store
            .submit_household(
                &household("A1", "Rao"),
                &[member("Sita", "40"), member("Ravi", "12")],
                None,
                &[],
            )
            .unwrap();
        store
            .submit_household(&household("B2", "Iyer"), &[member("Meena", "30")], None, &[])
            .unwrap();

        assert!(store.delete_household("A1").unwrap());
        assert!(store.find_household("A1").unwrap().is_none());

        let conn = rusqlite::Connection::open(tmp.path().join("data").join("sangha.db")).unwrap();
        let orphans: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM family_members WHERE address_id = 'A1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);

        let other = store.find_household("B2").unwrap().unwrap();
        assert_eq!(other.members.len(), 1);
    }

    #[test]
    fn test_delete_missing_is_not_an_error() {
        let (store, _tmp) = make_store();
        assert!(!store.delete_household("nope").unwrap());
    }

    #[test]
    fn test_submit_draft_example_scenario() {
        let (store, _tmp) = make_store();
        let mut draft = HouseholdDraft::new(HouseholdForm {
            address_id: "A1".to_string(),
            owner_name: "Rao".to_string(),
            owner_age: "45".to_string(),
            mobile: "9999".to_string(),
            address: "Street 1".to_string(),
            ..Default::default()
        });
        draft
            .stage_member(MemberForm {
                name: "Sita".to_string(),
                age: "40".to_string(),
                relation: "Spouse".to_string(),
                occupation: "Teacher".to_string(),
                designation: "Senior".to_string(),
                mobile: "8888".to_string(),
                photo: None,
            })
            .unwrap();

        store.submit_draft(&draft).unwrap();

        let record = store.find_household("A1").unwrap().unwrap();
        assert_eq!(record.household.owner_age, 45);
        assert_eq!(record.members.len(), 1);
        assert_eq!(record.members[0].age, 40);
    }

    #[test]
    fn test_invalid_draft_never_reaches_store() {
        let (store, _tmp) = make_store();
        let draft = HouseholdDraft::new(HouseholdForm {
            address_id: "A1".to_string(),
            owner_name: "Rao".to_string(),
            ..Default::default()
        });

        let err = store.submit_draft(&draft).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count_households().unwrap(), 0);
    }
}
