//! Monster store: owns the list, writes it through to storage, and
//! broadcasts every change.
//!
//! Every mutation runs mutate → persist → notify within one call. Storage
//! failures are logged and otherwise ignored; the in-memory list stays the
//! source of truth for the session.
//!
//! Subscribers get the full list on each change and nothing on subscribe, so
//! a new subscriber pulls `list()` itself.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use rand::Rng;
use std::collections::HashSet;

use crate::error::{StorageError, StoreError};
use crate::monster::catalog::{self, CATALOG, CatalogEntry};
use crate::monster::confirm::{ConfirmDialog, DELETE_PROMPT};
use crate::monster::model::{Monster, default_monsters};
use crate::monster::transfer;
use crate::storage::SharedStorage;

/// Draws `add_random` makes before accepting a colliding name.
const RANDOM_ATTEMPTS: usize = 10;
pub const TEAM_SIZE: usize = 5;

// ── Persistence ────────────────────────────────────────────────────

/// The monster list's slot in key-value storage.
pub struct MonsterPersistence {
    storage: SharedStorage,
    key: String,
}

impl MonsterPersistence {
    pub fn new(storage: SharedStorage, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    /// The persisted list, or `None` if absent, unreadable or malformed.
    pub fn load(&self) -> Option<Vec<Monster>> {
        let raw = match self.storage.borrow().get(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                log::warn!("reading {} failed: {}", self.key, e);
                return None;
            }
        };
        match transfer::parse_list(&raw) {
            Ok(list) => Some(list),
            Err(e) => {
                log::warn!("discarding persisted {}: {}", self.key, e);
                None
            }
        }
    }

    pub fn save(&self, monsters: &[Monster]) -> Result<(), StorageError> {
        let json = serde_json::to_string(monsters).unwrap_or_else(|_| "[]".to_string());
        self.storage.borrow_mut().set(&self.key, &json)
    }
}

// ── Change stream ──────────────────────────────────────────────────

/// Receiving end of the store's change broadcast. Dropping it unsubscribes.
pub struct Subscription {
    rx: UnboundedReceiver<Vec<Monster>>,
}

impl Subscription {
    /// The newest list broadcast since the last call, if any.
    pub fn latest(&mut self) -> Option<Vec<Monster>> {
        let mut latest = None;
        while let Ok(Some(list)) = self.rx.try_next() {
            latest = Some(list);
        }
        latest
    }
}

// ── Store ──────────────────────────────────────────────────────────

pub struct MonsterStore {
    monsters: Vec<Monster>,
    persistence: MonsterPersistence,
    subscribers: Vec<UnboundedSender<Vec<Monster>>>,
    catalog: &'static [CatalogEntry],
    notice: Option<&'static str>,
}

impl MonsterStore {
    /// Load from storage, falling back to the two default records.
    pub fn open(persistence: MonsterPersistence) -> Self {
        let monsters = persistence.load().unwrap_or_else(default_monsters);
        log::debug!("store opened with {} monsters", monsters.len());
        Self {
            monsters,
            persistence,
            subscribers: Vec::new(),
            catalog: CATALOG,
            notice: None,
        }
    }

    /// Swap the seed catalog used by random generation.
    ///
    /// # Panics
    /// If `catalog` is empty.
    pub fn with_catalog(mut self, catalog: &'static [CatalogEntry]) -> Self {
        assert!(!catalog.is_empty(), "random catalog must not be empty");
        self.catalog = catalog;
        self
    }

    pub fn subscribe(&mut self) -> Subscription {
        // Views are opened per request, so drop dead ones here as well as on emit.
        self.subscribers.retain(|tx| !tx.is_closed());
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    /// Snapshot copy of every record.
    pub fn list(&self) -> Vec<Monster> {
        self.monsters.clone()
    }

    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Monster, StoreError> {
        self.monsters.get(index).cloned().ok_or(self.out_of_range(index))
    }

    /// Copy of a record to pre-fill a duplicate form. The list is untouched
    /// until the copy is submitted through `add`.
    pub fn duplicate_source(&self, index: usize) -> Result<Monster, StoreError> {
        self.get(index)
    }

    pub fn add(&mut self, monster: Monster) {
        self.monsters.push(monster);
        self.emit_change(Some("Monster added"));
    }

    pub fn update(&mut self, index: usize, monster: Monster) -> Result<(), StoreError> {
        let len = self.monsters.len();
        let slot = self
            .monsters
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        *slot = monster;
        self.emit_change(Some("Monster updated"));
        Ok(())
    }

    /// Remove after the dialog confirms. Returns whether a record was removed.
    pub async fn remove(
        &mut self,
        index: usize,
        dialog: &dyn ConfirmDialog,
    ) -> Result<bool, StoreError> {
        if index >= self.monsters.len() {
            return Err(self.out_of_range(index));
        }
        if !dialog.confirm(DELETE_PROMPT).await {
            return Ok(false);
        }
        self.monsters.remove(index);
        self.emit_change(Some("Monster deleted"));
        Ok(true)
    }

    /// Replace the whole list (import).
    pub fn set_all(&mut self, monsters: Vec<Monster>) {
        log::info!("replacing list with {} imported monsters", monsters.len());
        self.monsters = monsters;
        self.emit_change(Some("Monsters imported"));
    }

    pub fn remove_all(&mut self) {
        log::info!("removing all {} monsters", self.monsters.len());
        self.monsters.clear();
        self.emit_change(Some("All monsters removed"));
    }

    /// Flip one favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, index: usize) -> Result<bool, StoreError> {
        let len = self.monsters.len();
        let monster = self
            .monsters
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        monster.favorite = !monster.favorite;
        let favorite = monster.favorite;
        self.emit_change(Some(if favorite { "Marked favorite" } else { "Unfavorited" }));
        Ok(favorite)
    }

    pub fn unfavorite_all(&mut self) {
        for monster in &mut self.monsters {
            monster.favorite = false;
        }
        self.emit_change(Some("All favorites cleared"));
    }

    /// Append one catalog draw, retrying to dodge existing names. After
    /// `RANDOM_ATTEMPTS` collisions the last draw is kept anyway.
    pub fn add_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Monster {
        let mut candidate = catalog::draw(self.catalog, rng);
        for _ in 1..RANDOM_ATTEMPTS {
            if !self.is_name_taken(&candidate.name) {
                break;
            }
            candidate = catalog::draw(self.catalog, rng);
        }
        self.monsters.push(candidate.clone());
        self.emit_change(Some("Random monster added"));
        candidate
    }

    /// Clear the list, then fill it with `TEAM_SIZE` distinct catalog draws.
    /// Broadcasts once after clearing and once with the finished team.
    pub fn create_random_team<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), StoreError> {
        let distinct = catalog::distinct_names(self.catalog);
        if distinct < TEAM_SIZE {
            return Err(StoreError::CatalogTooSmall { distinct });
        }

        self.monsters.clear();
        self.emit_change(None);

        let mut names = HashSet::new();
        while self.monsters.len() < TEAM_SIZE {
            let candidate = catalog::draw(self.catalog, rng);
            if names.insert(candidate.name.clone()) {
                self.monsters.push(candidate);
            }
        }
        log::info!("random team created");
        self.emit_change(Some("Random team created"));
        Ok(())
    }

    /// Reorder the owned list by name, plain ordinal comparison.
    pub fn sort_by_name(&mut self) {
        self.monsters.sort_by(|a, b| a.name.cmp(&b.name));
        self.emit_change(None);
    }

    /// Case-insensitive name check against every record.
    pub fn is_name_taken(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.monsters.iter().any(|m| m.name.to_lowercase() == wanted)
    }

    /// Latest user-facing notice from a mutation, cleared on read.
    pub fn take_notice(&mut self) -> Option<&'static str> {
        self.notice.take()
    }

    fn out_of_range(&self, index: usize) -> StoreError {
        StoreError::IndexOutOfRange {
            index,
            len: self.monsters.len(),
        }
    }

    fn emit_change(&mut self, notice: Option<&'static str>) {
        if let Err(e) = self.persistence.save(&self.monsters) {
            log::warn!("monster list not persisted: {}", e);
        }
        let snapshot = self.monsters.clone();
        self.subscribers
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
        if notice.is_some() {
            self.notice = notice;
        }
    }
}
