//! Library-level tests for the note service and its search index.

use notebox::backup::BackupManager;
use notebox::domain::{Note, Tag};
use notebox::infra::{JsonStorage, NoteStorage};
use notebox::search::{IndexedSearch, LinearSearch, SearchEngine, SearchIndex};
use notebox::service::{NoteService, NoteUpdate, ResolveResult, ServiceError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

type Service = NoteService<JsonStorage, SearchIndex>;

fn tags(names: &[&str]) -> Vec<Tag> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}

fn titles(notes: &[&Note]) -> Vec<String> {
    notes.iter().map(|n| n.title().to_string()).collect()
}

fn open(temp: &TempDir) -> Service {
    let storage = JsonStorage::new(temp.path().join("notes.json"));
    NoteService::open(storage, SearchIndex::new()).unwrap()
}

fn open_with_backups(temp: &TempDir) -> Service {
    let notes_file = temp.path().join("notes.json");
    let backups = BackupManager::open(&notes_file, temp.path().join("backups")).unwrap();
    NoteService::open(JsonStorage::new(notes_file), SearchIndex::new())
        .unwrap()
        .with_backups(backups)
}

/// Client meeting (work, client), Shopping list (personal),
/// Project idea (work, project).
fn seed(service: &mut Service) {
    service
        .create_note("Client meeting", "Discuss project X", tags(&["work", "client"]))
        .unwrap();
    service
        .create_note("Shopping list", "Buy bread and milk", tags(&["personal"]))
        .unwrap();
    service
        .create_note("Project idea", "Build a mobile app", tags(&["work", "project"]))
        .unwrap();
}

#[test]
fn tag_queries_over_three_notes() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);

    assert_eq!(
        titles(&service.notes_by_tag("work")),
        vec!["Client meeting", "Project idea"]
    );
    assert_eq!(titles(&service.notes_by_tag("personal")), vec!["Shopping list"]);
    assert!(service.notes_by_tag("missing").is_empty());

    let all = service.notes_by_tags(&["work".into(), "client".into()], true);
    assert_eq!(titles(&all), vec!["Client meeting"]);
    let any = service.notes_by_tags(&["personal".into(), "project".into()], false);
    assert_eq!(titles(&any), vec!["Shopping list", "Project idea"]);
}

#[test]
fn every_tagged_note_is_found_by_its_tags() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);
    service
        .create_note("Mixed case", "", tags(&["Rust", "CLI"]))
        .unwrap();

    let notes: Vec<Note> = service.all_notes().to_vec();
    for note in &notes {
        for tag in note.tags() {
            let found = service.notes_by_tag(tag.as_str());
            assert!(
                found.iter().any(|n| n.id() == note.id()),
                "{} not found by tag {}",
                note.title(),
                tag
            );
        }
    }
}

#[test]
fn repeated_queries_return_equal_results() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);

    let first = titles(&service.search_notes("project"));
    let second = titles(&service.search_notes("project"));
    assert_eq!(first, second);
    assert_eq!(first, vec!["Client meeting", "Project idea"]);
}

#[test]
fn results_follow_mutations() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);
    assert_eq!(service.search_notes("bread").len(), 1);

    let id = service.all_notes()[1].id().clone();
    service
        .update_note(
            &id,
            NoteUpdate {
                content: Some("Buy cheese".into()),
                ..NoteUpdate::default()
            },
        )
        .unwrap();
    assert!(service.search_notes("bread").is_empty());
    assert_eq!(titles(&service.search_notes("cheese")), vec!["Shopping list"]);

    assert!(service.delete_note(&id).unwrap());
    assert!(service.search_notes("cheese").is_empty());
    assert!(!service.delete_note(&id).unwrap());
}

#[test]
fn index_agrees_with_linear_scan() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);
    let notes: Vec<Note> = service.all_notes().to_vec();

    let mut index = SearchIndex::new();
    index.build_indexes(&notes);
    let mut linear = LinearSearch::new();

    for query in ["project", "bread", "BUILD", "work", "nothing"] {
        assert_eq!(
            titles(&index.search(&notes, query)),
            titles(&linear.search(&notes, query)),
            "query {query}"
        );
    }
    for tag in ["work", "Personal", "missing"] {
        assert_eq!(
            titles(&index.search_by_tag(&notes, tag)),
            titles(&linear.search_by_tag(&notes, tag))
        );
    }
}

#[test]
fn notes_survive_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let mut service = open(&temp);
        seed(&mut service);
    }
    let mut service = open(&temp);
    assert_eq!(service.notes_count(), 3);
    assert_eq!(titles(&service.notes_by_tag("client")), vec!["Client meeting"]);
}

#[test]
fn resolve_by_id_prefix_and_title() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);
    let note = service.all_notes()[2].clone();

    assert!(matches!(
        service.resolve_note(note.id().as_str()),
        ResolveResult::Unique(n) if n.id() == note.id()
    ));
    assert!(matches!(
        service.resolve_note(note.id().prefix()),
        ResolveResult::Unique(n) if n.id() == note.id()
    ));
    assert!(matches!(
        service.resolve_note("project IDEA"),
        ResolveResult::Unique(n) if n.id() == note.id()
    ));
    assert!(matches!(service.resolve_note("nope"), ResolveResult::NotFound));
}

#[test]
fn backup_operations_need_a_manager() {
    let temp = TempDir::new().unwrap();
    let mut service = open(&temp);
    seed(&mut service);
    assert!(matches!(
        service.create_backup(),
        Err(ServiceError::BackupsDisabled)
    ));
}

#[test]
fn restore_reloads_notes_and_index() {
    let temp = TempDir::new().unwrap();
    let mut service = open_with_backups(&temp);
    seed(&mut service);
    let backup = service.create_backup().unwrap();
    assert_eq!(backup.notes_count, 3);

    service.clear_all_notes().unwrap();
    assert!(service.search_notes("project").is_empty());

    service.restore_backup(&backup.id).unwrap();
    assert_eq!(service.notes_count(), 3);
    assert_eq!(
        titles(&service.search_notes("project")),
        vec!["Client meeting", "Project idea"]
    );
    assert_eq!(
        JsonStorage::new(temp.path().join("notes.json"))
            .load()
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn auto_backup_runs_after_threshold() {
    let temp = TempDir::new().unwrap();
    let mut service = open_with_backups(&temp);
    service.configure_auto_backup(2, 2).unwrap();

    for i in 0..6 {
        service.create_note(format!("note {i}"), "", vec![]).unwrap();
    }
    let backups = service.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    assert_eq!(backups[0].notes_count, 6);
    assert_eq!(backups[1].notes_count, 4);
}

#[test]
fn auto_backup_counts_across_reopened_services() {
    let temp = TempDir::new().unwrap();

    for i in 0..3 {
        let mut service = open_with_backups(&temp);
        service.configure_auto_backup(2, 5).unwrap();
        service.create_note(format!("note {i}"), "", vec![]).unwrap();
    }

    let service = open_with_backups(&temp);
    let backups = service.list_backups().unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].notes_count, 2);
}

#[test]
fn invalid_auto_backup_thresholds_are_rejected() {
    let temp = TempDir::new().unwrap();
    let mut service = open_with_backups(&temp);
    assert!(matches!(
        service.configure_auto_backup(0, 5),
        Err(ServiceError::InvalidConfig(_))
    ));
    assert!(!service.auto_backup_config().enabled);
}
