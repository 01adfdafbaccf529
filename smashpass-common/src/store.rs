//! Verdict store
//!
//! Ordered roster of characters, each owning an entity-id → verdict mapping.
//! A missing entry always reads as `Verdict::Undecided`; reads never fail.

use crate::events::{EventBus, StoreEvent};
use crate::{Error, Result, Verdict};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A named voter and the verdicts it has stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    name: String,
    choices: HashMap<String, Verdict>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            choices: HashMap::new(),
        }
    }

    pub fn with_choices(name: impl Into<String>, choices: HashMap<String, Verdict>) -> Self {
        Self {
            name: name.into(),
            choices,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored entries only; absent ids are implicitly `Undecided`
    pub fn choices(&self) -> &HashMap<String, Verdict> {
        &self.choices
    }

    pub fn verdict(&self, entity_id: &str) -> Verdict {
        self.choices.get(entity_id).copied().unwrap_or_default()
    }

    /// Counts over the stored map
    ///
    /// `undecided` only counts entries explicitly stored as `Undecided`
    /// (verdicts that were toggled back off), not catalog entities that were
    /// never touched. Use [`Tally::undecided_in_catalog`] for the latter.
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for verdict in self.choices.values() {
            match verdict {
                Verdict::Smash => tally.smash += 1,
                Verdict::Pass => tally.pass += 1,
                Verdict::Undecided => tally.undecided += 1,
            }
        }
        tally
    }
}

/// Per-character verdict counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub smash: usize,
    pub pass: usize,
    pub undecided: usize,
}

impl Tally {
    /// Entities in a catalog of `catalog_len` that are neither Smash nor Pass
    pub fn undecided_in_catalog(&self, catalog_len: usize) -> usize {
        catalog_len.saturating_sub(self.smash + self.pass)
    }
}

/// In-memory (character, entity) → verdict mapping
///
/// The store is a plain owned value. Front-ends that want change
/// notifications build it with [`VerdictStore::with_events`] and subscribe to
/// the bus.
#[derive(Debug, Clone, Default)]
pub struct VerdictStore {
    characters: Vec<Character>,
    events: Option<EventBus>,
}

impl VerdictStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that publishes a `StoreEvent` after every successful mutation
    pub fn with_events(events: EventBus) -> Self {
        Self {
            characters: Vec::new(),
            events: Some(events),
        }
    }

    /// Seed a fixed roster in declaration order
    pub fn with_roster<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_character(name.as_ref())?;
        }
        Ok(self)
    }

    /// Add an empty character at the end of the roster
    ///
    /// Names are matched exactly (case-sensitive) and stored as given. A name
    /// that is empty or only whitespace is rejected with `InvalidInput`, so
    /// `"  "` is not a valid character even though it is non-empty. Such a
    /// name would export as a blank header cell.
    pub fn add_character(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        self.characters.push(Character::new(name));
        debug!(character = %name, total = self.characters.len(), "Character added");
        self.notify(StoreEvent::CharacterAdded {
            name: name.to_string(),
            position: self.characters.len() - 1,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Remove a character together with its entire mapping
    pub fn remove_character(&mut self, name: &str) -> Result<Character> {
        let index = self
            .index_of(name)
            .ok_or_else(|| Error::NotFound(format!("character '{}'", name)))?;

        let removed = self.characters.remove(index);
        debug!(character = %name, entries = removed.choices.len(), "Character removed");
        self.notify(StoreEvent::CharacterRemoved {
            name: name.to_string(),
            timestamp: chrono::Utc::now(),
        });
        Ok(removed)
    }

    /// Overwrite one verdict
    pub fn set_verdict(&mut self, character: &str, entity_id: &str, verdict: Verdict) -> Result<()> {
        let entry = self
            .character_mut(character)?
            .choices
            .insert(entity_id.to_string(), verdict);
        let old = entry.unwrap_or_default();

        self.notify(StoreEvent::VerdictChanged {
            character: character.to_string(),
            entity_id: entity_id.to_string(),
            old,
            new: verdict,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Press the `candidate` button for (character, entity)
    ///
    /// Sets `candidate`, or `Undecided` when `candidate` is already the
    /// current verdict. Returns the verdict now stored.
    pub fn toggle_verdict(
        &mut self,
        character: &str,
        entity_id: &str,
        candidate: Verdict,
    ) -> Result<Verdict> {
        let next = self.get_verdict(character, entity_id).toggled(candidate);
        self.set_verdict(character, entity_id, next)?;
        Ok(next)
    }

    /// Current verdict, `Undecided` when nothing is stored (or the character is unknown)
    pub fn get_verdict(&self, character: &str, entity_id: &str) -> Verdict {
        self.character(character)
            .map(|c| c.verdict(entity_id))
            .unwrap_or_default()
    }

    pub fn tally(&self, character: &str) -> Result<Tally> {
        self.character(character)
            .map(Character::tally)
            .ok_or_else(|| Error::NotFound(format!("character '{}'", character)))
    }

    /// Replace every character's mapping, keeping the roster
    ///
    /// `choices[i]` becomes the mapping of the i-th character.
    pub fn replace_choices(&mut self, choices: Vec<HashMap<String, Verdict>>) -> Result<()> {
        if choices.len() != self.characters.len() {
            return Err(Error::InvalidInput(format!(
                "expected {} mapping(s), got {}",
                self.characters.len(),
                choices.len()
            )));
        }

        for (character, mapping) in self.characters.iter_mut().zip(choices) {
            character.choices = mapping;
        }
        self.notify_replaced();
        Ok(())
    }

    /// Replace the roster and all mappings at once
    pub fn replace_roster(&mut self, characters: Vec<Character>) -> Result<()> {
        let mut seen = HashSet::new();
        for character in &characters {
            validate_name(&character.name)?;
            if !seen.insert(character.name.as_str()) {
                return Err(Error::DuplicateName(character.name.clone()));
            }
        }

        self.characters = characters;
        self.notify_replaced();
        Ok(())
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Names in roster order
    pub fn character_names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Total stored entries across all characters
    pub fn entry_count(&self) -> usize {
        self.characters.iter().map(|c| c.choices.len()).sum()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.characters.iter().position(|c| c.name == name)
    }

    fn character_mut(&mut self, name: &str) -> Result<&mut Character> {
        self.characters
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::NotFound(format!("character '{}'", name)))
    }

    fn notify_replaced(&self) {
        debug!(
            characters = self.characters.len(),
            entries = self.entry_count(),
            "Store contents replaced"
        );
        self.notify(StoreEvent::StoreReplaced {
            characters: self.character_names(),
            entries: self.entry_count(),
            timestamp: chrono::Utc::now(),
        });
    }

    fn notify(&self, event: StoreEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("character name must not be empty".to_string()));
    }
    Ok(())
}
