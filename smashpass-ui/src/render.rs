//! Text rendering for the terminal front-end

use crate::session::{ImageState, Session};
use smashpass_common::events::StoreEvent;
use smashpass_common::{Error, Verdict};

pub const HELP: &str = "\
Commands:
  n, next, right (or →)     next entity
  p, prev, left  (or ←)     previous entity
  goto N                    jump to entity number N
  smash NAME / s NAME       toggle Smash for a character
  pass NAME  / x NAME       toggle Pass for a character
  add NAME                  add a character
  remove NAME               remove a character and all its verdicts
  import PATH               import a CSV file (overwrites current data)
  drop PATH                 same as dropping a .csv file on the window
  export [PATH]             export to CSV (.csv is appended if missing)
  stats                     per-character counts
  show, image, help, quit";

/// Current entity with every character's verdict buttons
pub fn entity_view(session: &Session) -> String {
    let catalog_len = session.catalog().len();
    let Some(entity) = session.current_entity() else {
        return format!(
            "(no entity at position {} of {})",
            session.position() + 1,
            catalog_len
        );
    };

    let mut out = format!("#{}/{}  {}\n", entity.id, catalog_len, entity.display_name());
    out.push_str(&format!("  image: {}\n", image_line(session.image())));

    let store = session.store();
    if store.is_empty() {
        out.push_str("  (no characters yet, use 'add NAME')");
        return out;
    }

    let width = store
        .characters()
        .iter()
        .map(|c| c.name().chars().count())
        .max()
        .unwrap_or(0);

    let rows: Vec<String> = store
        .characters()
        .iter()
        .map(|c| {
            let verdict = c.verdict(&entity.id);
            format!(
                "  {:<width$}  {}  {}",
                c.name(),
                button(Verdict::Smash, verdict),
                button(Verdict::Pass, verdict),
                width = width
            )
        })
        .collect();
    out.push_str(&rows.join("\n"));
    out
}

/// Stats drawer: literal stored counts plus the catalog-relative remainder
pub fn stats_view(session: &Session) -> String {
    let tallies = session.tallies();
    if tallies.is_empty() {
        return "Stats: no characters".to_string();
    }

    let catalog_len = session.catalog().len();
    let mut out = String::from("Stats:");
    for (name, tally) in tallies {
        out.push_str(&format!(
            "\n  {}\n    Smash: {}\n    Pass: {}\n    Undecided: {}  ({} of {} not voted)",
            name,
            tally.smash,
            tally.pass,
            tally.undecided,
            tally.undecided_in_catalog(catalog_len),
            catalog_len
        ));
    }
    out
}

pub fn image_line(state: &ImageState) -> String {
    match state {
        ImageState::Idle => "-".to_string(),
        ImageState::Loading { .. } => "loading...".to_string(),
        ImageState::Ready {
            bytes,
            content_type,
            ..
        } => format!(
            "{} bytes ({})",
            bytes,
            content_type.as_deref().unwrap_or("unknown type")
        ),
        ImageState::Failed { reason, .. } => format!("unavailable: {}", reason),
    }
}

/// One line per store change notification
pub fn event_line(event: &StoreEvent) -> String {
    match event {
        StoreEvent::CharacterAdded { name, position, .. } => {
            format!("+ {} joined (column {})", name, position + 1)
        }
        StoreEvent::CharacterRemoved { name, .. } => format!("- {} removed", name),
        StoreEvent::VerdictChanged {
            character,
            entity_id,
            new,
            ..
        } => format!("* {} → {} for #{}", character, new, entity_id),
        StoreEvent::StoreReplaced {
            characters,
            entries,
            ..
        } => format!(
            "* data replaced: {} character(s) [{}], {} entries",
            characters.len(),
            characters.join(", "),
            entries
        ),
    }
}

/// Dismissible error notice
pub fn notice(error: &Error) -> String {
    format!("! {}", error)
}

fn button(candidate: Verdict, current: Verdict) -> String {
    if candidate == current {
        format!("[{}]", candidate)
    } else {
        format!(" {} ", candidate.as_str().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smashpass_common::csv_codec::ImportOptions;
    use smashpass_common::{Catalog, Entity, VerdictStore};
    use std::sync::Arc;

    fn session() -> Session {
        let catalog = Catalog::new(vec![Entity::new("001", "bulbasaur", "u")]);
        let store = VerdictStore::new().with_roster(["Alex", "Amun"]).unwrap();
        Session::new(Arc::new(catalog), store, ImportOptions::default())
    }

    #[test]
    fn test_entity_view_marks_active_button() {
        let mut session = session();
        session.toggle("Alex", Verdict::Smash).unwrap();

        let view = entity_view(&session);
        assert!(view.starts_with("#001/1  Bulbasaur\n"));
        assert!(view.contains("Alex  [Smash]   pass "));
        assert!(view.contains("Amun   smash    pass "));
    }

    #[test]
    fn test_entity_view_out_of_range() {
        let mut session = session();
        session.next();
        assert_eq!(entity_view(&session), "(no entity at position 2 of 1)");
    }

    #[test]
    fn test_stats_view_counts() {
        let mut session = session();
        session.toggle("Amun", Verdict::Pass).unwrap();
        let view = stats_view(&session);
        assert!(view.contains("Amun\n    Smash: 0\n    Pass: 1\n    Undecided: 0  (0 of 1 not voted)"));
    }

    #[test]
    fn test_notice_prefix() {
        let line = notice(&Error::DuplicateName("Alex".to_string()));
        assert_eq!(line, "! Duplicate name: Alex");
    }
}
