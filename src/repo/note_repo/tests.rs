use super::*;
use crate::models::{NoteCategory, NotePriority};
use crate::test_utils::setup_test_db;

fn note(listing_id: &str, title: &str) -> Note {
    Note::new(
        listing_id.to_string(),
        title.to_string(),
        "Owner prefers afternoon visits".to_string(),
        NoteCategory::Showing,
        NotePriority::Normal,
        true,
    )
}

#[test]
fn test_create_and_get_note() {
    let pool = setup_test_db();

    let created = create_note(&pool, note("listing-1", "Visiting hours")).unwrap();
    let fetched = get_note(&pool, &created.get_id()).unwrap().unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.get_category(), NoteCategory::Showing);
}

#[test]
fn test_list_notes_filters_by_listing() {
    let pool = setup_test_db();

    let a1 = create_note(&pool, note("listing-a", "first")).unwrap();
    let b1 = create_note(&pool, note("listing-b", "other")).unwrap();
    let a2 = create_note(&pool, note("listing-a", "second")).unwrap();

    let for_a: Vec<String> = list_notes(&pool, Some("listing-a")).unwrap().iter().map(|n| n.get_id()).collect();
    assert_eq!(for_a, vec![a1.get_id(), a2.get_id()]);

    let all = list_notes(&pool, None).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|n| n.get_id() == b1.get_id()));
}

#[test]
fn test_update_note_applies_only_given_fields() {
    let pool = setup_test_db();
    let created = create_note(&pool, note("listing-1", "Keys")).unwrap();

    let changes = UpdateNoteDto {
        priority: Some(NotePriority::Urgent),
        visible: Some(false),
        ..Default::default()
    };
    let updated = update_note(&pool, &created.get_id(), changes).unwrap().unwrap();

    assert_eq!(updated.get_title(), "Keys");
    assert_eq!(updated.get_priority(), NotePriority::Urgent);
    assert!(!updated.get_visible());
    assert!(updated.get_updated_at() >= created.get_updated_at());

    let fetched = get_note(&pool, &created.get_id()).unwrap().unwrap();
    assert_eq!(fetched, updated);
}

#[test]
fn test_update_missing_note() {
    let pool = setup_test_db();
    assert!(update_note(&pool, "nonexistent-id", UpdateNoteDto::default()).unwrap().is_none());
}

#[test]
fn test_delete_note() {
    let pool = setup_test_db();
    let created = create_note(&pool, note("listing-1", "Keys")).unwrap();

    assert!(delete_note(&pool, &created.get_id()).unwrap());
    assert!(!delete_note(&pool, &created.get_id()).unwrap());
}
