use taskdesk_core::db::open_db_in_memory;
use taskdesk_core::{LabelRepository, NewLabel, SqliteLabelRepository};

#[test]
fn create_and_get_label() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLabelRepository::try_new(&conn).unwrap();

    let created = repo.create_label(&NewLabel::new("errands", "#00ff00")).unwrap();
    let loaded = repo.get_label(created.id).unwrap();

    assert_eq!(loaded, Some(created));
    assert_eq!(repo.get_label(404).unwrap(), None);
}

#[test]
fn find_by_ids_skips_unknown_and_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLabelRepository::try_new(&conn).unwrap();
    let a = repo.create_label(&NewLabel::new("a", "red")).unwrap();
    let b = repo.create_label(&NewLabel::new("b", "green")).unwrap();
    repo.create_label(&NewLabel::new("c", "blue")).unwrap();

    let found = repo.find_labels_by_ids(&[b.id, 77, a.id, b.id]).unwrap();
    assert_eq!(found, vec![a, b]);
    assert!(repo.find_labels_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn list_labels_is_sorted_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLabelRepository::try_new(&conn).unwrap();
    for name in ["zeta", "alpha", "mid"] {
        repo.create_label(&NewLabel::new(name, "gray")).unwrap();
    }

    let names: Vec<String> = repo
        .list_labels()
        .unwrap()
        .into_iter()
        .map(|label| label.name)
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}
