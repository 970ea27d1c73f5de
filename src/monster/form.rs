//! Create / edit / duplicate form controller.
//!
//! The mode is fixed when the form is opened. Edit overwrites its record on
//! submit; create and duplicate both append a new record.

use crate::error::{StoreError, ValidationError};
use crate::monster::model::Monster;
use crate::monster::store::MonsterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Overwrite the record at this index.
    Edit(usize),
    /// Pre-fill from the record at this index, submit as a new record.
    Duplicate(usize),
}

impl FormMode {
    /// `duplicate` only has an effect when an index is given.
    pub fn from_params(id: Option<usize>, duplicate: bool) -> Self {
        match (id, duplicate) {
            (None, _) => FormMode::Create,
            (Some(i), false) => FormMode::Edit(i),
            (Some(i), true) => FormMode::Duplicate(i),
        }
    }

    /// Index whose own name never counts as a collision.
    fn exempt_index(&self) -> Option<usize> {
        match self {
            FormMode::Edit(i) => Some(*i),
            FormMode::Create | FormMode::Duplicate(_) => None,
        }
    }
}

/// Field values as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValues {
    pub name: String,
    pub description: String,
    pub favorite: bool,
    pub role: String,
}

impl From<Monster> for FormValues {
    fn from(m: Monster) -> Self {
        Self {
            name: m.name,
            description: m.description,
            favorite: m.favorite,
            role: m.role,
        }
    }
}

impl From<FormValues> for Monster {
    fn from(v: FormValues) -> Self {
        Monster {
            name: v.name,
            description: v.description,
            favorite: v.favorite,
            role: v.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterForm {
    pub mode: FormMode,
    pub values: FormValues,
}

/// Why a submit did not save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Invalid(Vec<ValidationError>),
    Store(StoreError),
}

impl MonsterForm {
    /// Open a form, pre-filled from the store for edit and duplicate.
    pub fn open(mode: FormMode, store: &MonsterStore) -> Result<Self, StoreError> {
        let values = match mode {
            FormMode::Create => FormValues::default(),
            FormMode::Edit(i) => store.get(i)?.into(),
            FormMode::Duplicate(i) => store.duplicate_source(i)?.into(),
        };
        Ok(Self { mode, values })
    }

    /// Every failing check, name errors first.
    pub fn validate(&self, existing: &[Monster]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let name = self.values.name.trim().to_lowercase();
        if name.is_empty() {
            errors.push(ValidationError::NameRequired);
        } else {
            let exempt = self.mode.exempt_index();
            let taken = existing
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != exempt)
                .any(|(_, m)| m.name.trim().to_lowercase() == name);
            if taken {
                errors.push(ValidationError::DuplicateName);
            }
        }
        if self.values.description.trim().is_empty() {
            errors.push(ValidationError::DescriptionRequired);
        }
        errors
    }

    /// Validate against the store's current list, then save.
    pub fn submit(self, store: &mut MonsterStore) -> Result<(), SubmitError> {
        let errors = self.validate(&store.list());
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }
        match self.mode {
            FormMode::Edit(i) => store.update(i, self.values.into()).map_err(SubmitError::Store),
            FormMode::Create | FormMode::Duplicate(_) => {
                store.add(self.values.into());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::store::MonsterPersistence;
    use crate::storage::{BridgeStorage, SharedStorage};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> MonsterStore {
        let storage: SharedStorage = Rc::new(RefCell::new(BridgeStorage::new(1 << 20)));
        let mut store = MonsterStore::open(MonsterPersistence::new(storage, "monster_list"));
        store.set_all(vec![
            Monster::new("Vampire", "Bites.", true, "soldier"),
            Monster::new("Bob", "Just Bob.", false, ""),
        ]);
        store
    }

    fn values(name: &str, description: &str) -> FormValues {
        FormValues {
            name: name.to_string(),
            description: description.to_string(),
            favorite: false,
            role: String::new(),
        }
    }

    #[test]
    fn mode_from_params() {
        assert_eq!(FormMode::from_params(None, true), FormMode::Create);
        assert_eq!(FormMode::from_params(Some(1), false), FormMode::Edit(1));
        assert_eq!(FormMode::from_params(Some(1), true), FormMode::Duplicate(1));
    }

    #[test]
    fn create_rejects_duplicate_name_any_case() {
        let store = store();
        for name in ["vampire", "  VAMPIRE ", "Vampire"] {
            let form = MonsterForm { mode: FormMode::Create, values: values(name, "x") };
            assert_eq!(form.validate(&store.list()), vec![ValidationError::DuplicateName]);
        }
    }

    #[test]
    fn edit_exempts_own_record() {
        let store = store();
        let form = MonsterForm::open(FormMode::Edit(0), &store).unwrap();
        assert_eq!(form.values.name, "Vampire");
        assert!(form.validate(&store.list()).is_empty());

        let mut renamed = form.clone();
        renamed.values.name = "bob".into();
        assert_eq!(renamed.validate(&store.list()), vec![ValidationError::DuplicateName]);
    }

    #[test]
    fn duplicate_does_not_exempt_source() {
        let store = store();
        let form = MonsterForm::open(FormMode::Duplicate(0), &store).unwrap();
        assert_eq!(form.values, FormValues::from(store.get(0).unwrap()));
        assert_eq!(form.validate(&store.list()), vec![ValidationError::DuplicateName]);
    }

    #[test]
    fn required_fields() {
        let store = store();
        let form = MonsterForm { mode: FormMode::Create, values: values("  ", "") };
        assert_eq!(
            form.validate(&store.list()),
            vec![ValidationError::NameRequired, ValidationError::DescriptionRequired]
        );
    }

    #[test]
    fn open_out_of_range_fails() {
        let store = store();
        assert!(MonsterForm::open(FormMode::Edit(5), &store).is_err());
        assert!(MonsterForm::open(FormMode::Duplicate(2), &store).is_err());
    }

    #[test]
    fn submit_edit_updates_in_place() {
        let mut store = store();
        let mut form = MonsterForm::open(FormMode::Edit(1), &store).unwrap();
        form.values.description = "Bob, again.".into();
        form.submit(&mut store).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().description, "Bob, again.");
    }

    #[test]
    fn submit_duplicate_appends() {
        let mut store = store();
        let mut form = MonsterForm::open(FormMode::Duplicate(1), &store).unwrap();
        form.values.name = "Bob II".into();
        form.submit(&mut store).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2).unwrap().description, "Just Bob.");
        assert_eq!(store.get(1).unwrap().name, "Bob");
    }

    #[test]
    fn submit_invalid_saves_nothing() {
        let mut store = store();
        let form = MonsterForm { mode: FormMode::Create, values: values("bob", "Another.") };
        assert!(matches!(form.submit(&mut store), Err(SubmitError::Invalid(_))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn submit_edit_on_vanished_record() {
        let mut store = store();
        let form = MonsterForm::open(FormMode::Edit(1), &store).unwrap();
        store.set_all(vec![Monster::new("Solo", "Alone.", false, "")]);
        assert!(matches!(form.submit(&mut store), Err(SubmitError::Store(_))));
        assert_eq!(store.len(), 1);
    }
}
