//! End-to-end tests of the input loop
//!
//! Input is fed from a byte slice and output captured in a Vec; images are
//! disabled so nothing touches the network.

use smashpass_common::csv_codec::ImportOptions;
use smashpass_common::events::EventBus;
use smashpass_common::{Catalog, Entity, Verdict, VerdictStore};
use smashpass_ui::{App, Session};
use std::sync::Arc;
use tempfile::TempDir;

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(vec![
        Entity::new("001", "bulbasaur", "http://img/001.png"),
        Entity::new("002", "ivysaur", "http://img/002.png"),
        Entity::new("003", "venusaur", "http://img/003.png"),
    ]))
}

fn app(roster: &[&str]) -> App<Vec<u8>> {
    let bus = EventBus::new(64);
    let events = bus.subscribe();
    let store = VerdictStore::with_events(bus).with_roster(roster).unwrap();
    let session = Session::new(catalog(), store, ImportOptions::default());
    App::new(session, events, None, Vec::new())
}

async fn run(app: &mut App<Vec<u8>>, input: &str) {
    app.run(input.as_bytes()).await.unwrap();
}

fn output(app: App<Vec<u8>>) -> String {
    String::from_utf8(app.into_output()).unwrap()
}

#[tokio::test]
async fn test_initial_render_shows_first_entity() {
    let mut app = app(&["Alex"]);
    run(&mut app, "").await;
    let out = output(app);
    assert!(out.starts_with("#001/3  Bulbasaur\n"));
}

#[tokio::test]
async fn test_toggle_flow_and_notifications() {
    let mut app = app(&[]);
    run(&mut app, "add Alex\nadd Amun\nnext\nsmash Alex\npass Amun\npass Amun\n").await;

    let store = app.session().store();
    assert_eq!(store.get_verdict("Alex", "002"), Verdict::Smash);
    assert_eq!(store.get_verdict("Amun", "002"), Verdict::Undecided);
    assert_eq!(store.tally("Amun").unwrap().undecided, 1);

    let out = output(app);
    assert!(out.contains("+ Alex joined (column 1)"));
    assert!(out.contains("+ Amun joined (column 2)"));
    assert!(out.contains("#002/3  Ivysaur"));
    assert!(out.contains("* Alex → Smash for #002"));
    assert!(out.contains("* Amun → Undecided for #002"));
}

#[tokio::test]
async fn test_errors_are_notices_and_loop_continues() {
    let mut app = app(&["Alex"]);
    run(&mut app, "add Alex\ndance\nremove Nobody\nsmash Alex\n").await;

    assert_eq!(app.session().store().get_verdict("Alex", "001"), Verdict::Smash);
    let out = output(app);
    assert!(out.contains("! Duplicate name: Alex"));
    assert!(out.contains("! Invalid input: unknown command 'dance'"));
    assert!(out.contains("! Not found: character 'Nobody'"));
}

#[tokio::test]
async fn test_quit_stops_processing() {
    let mut app = app(&["Alex"]);
    run(&mut app, "quit\nsmash Alex\n").await;
    assert_eq!(app.session().store().get_verdict("Alex", "001"), Verdict::Undecided);
}

#[tokio::test]
async fn test_navigation_past_end_shows_nothing() {
    let mut app = app(&["Alex"]);
    run(&mut app, "goto 3\nnext\nsmash Alex\nprev\n").await;

    assert_eq!(app.session().position(), 2);
    let out = output(app);
    assert!(out.contains("#003/3  Venusaur"));
    assert!(out.contains("(no entity at position 4 of 3)"));
    assert!(out.contains("! Invalid input: no entity at this position"));
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sheet");

    let mut first = app(&["Alex", "Amun"]);
    let script = format!(
        "smash Alex\nnext\npass Amun\nexport {}\n",
        target.display()
    );
    run(&mut first, &script).await;
    let out = output(first);
    let written = dir.path().join("sheet.csv");
    assert!(out.contains("Writing to file..."));
    assert!(out.contains(&format!("Writing done! Saved to {}", written.display())));
    assert_eq!(
        std::fs::read_to_string(&written).unwrap(),
        ",Alex,Amun\nbulbasaur,Smash,Undecided\nivysaur,Undecided,Pass\nvenusaur,Undecided,Undecided"
    );

    let mut second = app(&["Alex", "Amun"]);
    run(&mut second, &format!("import {}\n", written.display())).await;
    let store = second.session().store();
    assert_eq!(store.get_verdict("Alex", "001"), Verdict::Smash);
    assert_eq!(store.get_verdict("Amun", "002"), Verdict::Pass);
    assert_eq!(store.get_verdict("Amun", "001"), Verdict::Undecided);

    let out = output(second);
    assert!(out.contains("Import done: 2 character(s), 3 row(s)"));
    assert!(out.contains("* data replaced: 2 character(s) [Alex, Amun], 6 entries"));
}

#[tokio::test]
async fn test_import_with_wrong_roster_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.csv");
    std::fs::write(&path, ",Alex\nbulbasaur,Smash").unwrap();

    let mut app = app(&["Alex", "Amun"]);
    run(&mut app, &format!("import {}\n", path.display())).await;

    assert_eq!(app.session().store().get_verdict("Alex", "001"), Verdict::Undecided);
    let out = output(app);
    assert!(out.contains("! Malformed CSV: header has 1 character column(s) but 2 character(s) are loaded"));
}

#[tokio::test]
async fn test_drop_only_accepts_csv() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, ",Alex\nbulbasaur,Smash").unwrap();
    let sheet = dir.path().join("sheet.csv");
    std::fs::write(&sheet, ",Alex\nbulbasaur,Pass").unwrap();

    let mut app = app(&["Alex"]);
    run(
        &mut app,
        &format!("drop {}\ndrop {}\n", notes.display(), sheet.display()),
    )
    .await;

    assert_eq!(app.session().store().get_verdict("Alex", "001"), Verdict::Pass);
    let out = output(app);
    assert!(out.contains("(not a .csv file)"));
}

#[tokio::test]
async fn test_stats_command() {
    let mut app = app(&["Alex"]);
    run(&mut app, "smash Alex\nnext\nsmash Alex\nstats\n").await;
    let out = output(app);
    assert!(out.contains("Stats:\n  Alex\n    Smash: 2\n    Pass: 0\n    Undecided: 0  (1 of 3 not voted)"));
}

#[tokio::test]
async fn test_goto_extreme_numbers_clamp() {
    let mut low = app(&["Alex"]);
    let mut high = app(&["Alex"]);

    run(&mut low, "goto -9223372036854775808\nsmash Alex\n").await;
    assert_eq!(low.session().position(), 0);
    assert_eq!(low.session().store().get_verdict("Alex", "001"), Verdict::Smash);

    run(&mut high, "goto 9223372036854775807\n").await;
    assert_eq!(high.session().position(), 3);
}
