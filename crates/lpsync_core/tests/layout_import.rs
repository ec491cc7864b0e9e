mod common;

use common::{
    container_ids, empty_store, insert_app, insert_page, parent_and_ordering, seeded_store,
    strings, trigger_switch, CALC, CLOCK, MAIL, MAPS, NOTES, SAFARI, WEATHER,
};
use lpsync_core::{
    Folder, FolderPage, IssueKind, LaunchpadRepository, LayoutDocument, LayoutService,
    LayoutTree, Page, PlacementIssue, RepoError, SqliteLaunchpadRepository, SyncError,
    TreeAnchors,
};
use rusqlite::Connection;
use std::collections::HashMap;

fn service(conn: &Connection) -> LayoutService<SqliteLaunchpadRepository<'_>> {
    LayoutService::new(SqliteLaunchpadRepository::new(conn))
}

fn page(number: u32, flat_items: &[&str], folders: Vec<Folder>) -> Page {
    Page {
        number,
        flat_items: strings(flat_items),
        folders,
    }
}

fn folder(name: &str, items: &[&str]) -> Folder {
    Folder {
        name: name.to_string(),
        pages: vec![FolderPage {
            number: 1,
            items: strings(items),
        }],
    }
}

fn apps_only(pages: Vec<Page>) -> LayoutDocument {
    LayoutDocument {
        apps: LayoutTree { pages },
        widgets: LayoutTree {
            pages: vec![page(1, &["Weather", "Clock"], Vec::new())],
        },
    }
}

#[test]
fn unchanged_document_round_trips() {
    let conn = seeded_store();
    let original = service(&conn).export_layout().unwrap();

    let report = service(&conn).import_layout(&original).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(exported, original);
    assert!(report.apps.issues.is_empty());
    assert!(report.apps.appended_missing.is_empty());
    assert!(report.widgets.appended_missing.is_empty());
}

#[test]
fn edited_document_is_applied() {
    let conn = seeded_store();
    let document = apps_only(vec![
        page(1, &["Maps"], vec![folder("Work", &["Mail", "Notes"])]),
        page(2, &["Calc", "Safari"], Vec::new()),
    ]);

    let report = service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(exported, document);
    assert_eq!(report.apps.pages_created, 2);
    assert_eq!(report.apps.folders_created, 1);
    assert_eq!(report.apps.entries_placed, 5);
    assert_eq!(report.widgets.entries_placed, 2);
}

#[test]
fn every_installed_entry_lands_exactly_once() {
    let conn = seeded_store();
    let document = apps_only(vec![page(1, &["Notes"], vec![folder("Nav", &["Maps"])])]);

    service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for title in exported.apps.titles() {
        *counts.entry(title).or_default() += 1;
    }
    for title in ["Safari", "Mail", "Calc", "Notes", "Maps"] {
        assert_eq!(counts.get(title), Some(&1), "{title} placed once");
    }
    assert_eq!(counts.len(), 5);
}

#[test]
fn container_ids_stay_above_entry_ids() {
    let conn = seeded_store();
    let document = service(&conn).export_layout().unwrap();

    let report = service(&conn).import_layout(&document).unwrap();

    let entry_ids = [SAFARI, MAIL, CALC, NOTES, MAPS, WEATHER, CLOCK];
    let highest_entry = *entry_ids.iter().max().unwrap();
    let containers = container_ids(&conn);
    // apps: 2 pages + folder root + inner page; widgets: 1 page
    assert_eq!(
        containers,
        (highest_entry + 1..=highest_entry + 5).collect::<Vec<_>>()
    );
    assert!(containers.iter().all(|id| !entry_ids.contains(id)));
    assert_eq!(report.last_allocated_id, highest_entry + 5);
}

#[test]
fn container_ids_follow_traversal_order() {
    let conn = seeded_store();
    let document = service(&conn).export_layout().unwrap();

    service(&conn).import_layout(&document).unwrap();

    let base = CLOCK;
    // page 1, its folder root, the folder's inner page, page 2, widget page
    assert_eq!(parent_and_ordering(&conn, base + 1), (1, 0));
    assert_eq!(parent_and_ordering(&conn, base + 2), (base + 1, 2));
    assert_eq!(parent_and_ordering(&conn, base + 3), (base + 2, 0));
    assert_eq!(parent_and_ordering(&conn, base + 4), (1, 1));
    assert_eq!(parent_and_ordering(&conn, base + 5), (3, 0));

    assert_eq!(parent_and_ordering(&conn, CALC), (base + 3, 0));
    assert_eq!(parent_and_ordering(&conn, NOTES), (base + 3, 1));
    assert_eq!(parent_and_ordering(&conn, MAPS), (base + 4, 0));
}

#[test]
fn repeated_import_allocates_the_same_ids() {
    let conn = seeded_store();
    let document = service(&conn).export_layout().unwrap();

    service(&conn).import_layout(&document).unwrap();
    let first = container_ids(&conn);
    service(&conn).import_layout(&document).unwrap();
    let second = container_ids(&conn);

    assert_eq!(first, second);
}

#[test]
fn listed_order_becomes_increasing_ordering() {
    let conn = seeded_store();
    let document = apps_only(vec![page(1, &["Maps", "Safari", "Calc"], Vec::new())]);

    service(&conn).import_layout(&document).unwrap();

    let (maps_parent, maps_order) = parent_and_ordering(&conn, MAPS);
    let (safari_parent, safari_order) = parent_and_ordering(&conn, SAFARI);
    let (calc_parent, calc_order) = parent_and_ordering(&conn, CALC);
    assert_eq!(maps_parent, safari_parent);
    assert_eq!(safari_parent, calc_parent);
    assert!(maps_order < safari_order && safari_order < calc_order);
}

#[test]
fn omitted_entries_are_appended_on_a_new_last_page() {
    let conn = seeded_store();
    let document = apps_only(vec![page(1, &["Safari"], Vec::new())]);

    let report = service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    let missing = strings(&["Mail", "Calc", "Notes", "Maps"]);
    assert_eq!(report.apps.appended_missing, missing);
    assert_eq!(exported.apps.pages.len(), 2);
    assert_eq!(exported.apps.pages[0].flat_items, strings(&["Safari"]));
    assert_eq!(exported.apps.pages[1].number, 2);
    assert_eq!(exported.apps.pages[1].flat_items, missing);
}

#[test]
fn empty_widget_tree_keeps_widgets_reachable() {
    let conn = seeded_store();
    let mut document = service(&conn).export_layout().unwrap();
    document.widgets = LayoutTree::default();

    let report = service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(report.widgets.appended_missing, strings(&["Weather", "Clock"]));
    assert_eq!(exported.widgets.pages.len(), 1);
    assert_eq!(exported.widgets.pages[0].number, 1);
    assert_eq!(
        exported.widgets.pages[0].flat_items,
        strings(&["Weather", "Clock"])
    );
}

#[test]
fn unknown_title_is_skipped_and_reported() {
    let conn = seeded_store();
    let mut document = service(&conn).export_layout().unwrap();
    document.apps.pages[1].flat_items.insert(0, "Ghost".to_string());

    let report = service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(
        report.apps.issues,
        vec![PlacementIssue {
            title: "Ghost".to_string(),
            kind: IssueKind::Unmatched,
        }]
    );
    assert_eq!(exported.apps.pages[1].flat_items, strings(&["Maps"]));
    assert_eq!(parent_and_ordering(&conn, MAPS).1, 0);
    assert_eq!(exported.apps.pages[0].flat_items, strings(&["Safari", "Mail"]));
}

#[test]
fn repeated_title_is_placed_once() {
    let conn = seeded_store();
    let document = apps_only(vec![
        page(1, &["Safari", "Mail"], vec![folder("Utils", &["Calc", "Notes"])]),
        page(2, &["Maps", "Safari"], Vec::new()),
    ]);

    let report = service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(
        report.apps.issues,
        vec![PlacementIssue {
            title: "Safari".to_string(),
            kind: IssueKind::Duplicate,
        }]
    );
    assert_eq!(exported.apps.pages[0].flat_items, strings(&["Safari", "Mail"]));
    assert_eq!(exported.apps.pages[1].flat_items, strings(&["Maps"]));
}

#[test]
fn folder_document_rebuilds_single_folder_page() {
    let conn = empty_store();
    insert_page(&conn, 20, 1, 0);
    insert_app(&conn, 7, 20, 0, "Notes");
    insert_app(&conn, 8, 20, 1, "Calc");

    let document = LayoutDocument {
        apps: LayoutTree {
            pages: vec![page(1, &[], vec![folder("Utils", &["Calc", "Notes"])])],
        },
        widgets: LayoutTree::default(),
    };

    service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(exported.apps.pages.len(), 1);
    assert!(exported.apps.pages[0].flat_items.is_empty());
    assert_eq!(exported.apps.pages[0].folders.len(), 1);
    assert_eq!(exported.apps.pages[0].folders[0].name, "Utils");
    assert_eq!(
        exported.apps.pages[0].folders[0].pages[0].items,
        strings(&["Calc", "Notes"])
    );
}

#[test]
fn multi_page_folder_is_flattened_into_one_inner_page() {
    let conn = seeded_store();
    let mut document = service(&conn).export_layout().unwrap();
    document.apps.pages[0].folders[0].pages.push(FolderPage {
        number: 2,
        items: strings(&["Maps"]),
    });
    document.apps.pages.truncate(1);

    service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(exported.apps.pages.len(), 1);
    assert_eq!(exported.apps.pages[0].folders[0].pages.len(), 1);
    assert_eq!(
        exported.apps.pages[0].folders[0].pages[0].items,
        strings(&["Calc", "Notes", "Maps"])
    );
}

#[test]
fn entries_sharing_a_title_are_placed_together() {
    let conn = seeded_store();
    insert_app(&conn, 6_000, 23, 1, "Maps");

    let document = apps_only(vec![page(1, &["Maps", "Safari"], Vec::new())]);
    service(&conn).import_layout(&document).unwrap();

    let (first_parent, first_order) = parent_and_ordering(&conn, MAPS);
    let (second_parent, second_order) = parent_and_ordering(&conn, 6_000);
    let (_, safari_order) = parent_and_ordering(&conn, SAFARI);
    assert_eq!(first_parent, second_parent);
    assert_eq!((first_order, second_order, safari_order), (0, 1, 2));

    let containers = container_ids(&conn);
    assert!(containers.iter().all(|id| *id > 6_000));
}

#[test]
fn triggers_are_active_again_after_import() {
    let conn = seeded_store();
    let document = service(&conn).export_layout().unwrap();

    service(&conn).import_layout(&document).unwrap();

    assert_eq!(trigger_switch(&conn), "0");
}

#[test]
fn anchors_are_recreated_for_both_trees() {
    let conn = seeded_store();
    let document = service(&conn).export_layout().unwrap();

    service(&conn).import_layout(&document).unwrap();

    let mut stmt = conn
        .prepare("SELECT rowid, uuid FROM items WHERE type = 1 ORDER BY rowid;")
        .unwrap();
    let anchors = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let expected = [
        (1, "ROOTPAGE"),
        (2, "HOLDINGPAGE"),
        (3, "ROOTPAGE_DB"),
        (4, "HOLDINGPAGE_DB"),
        (5, "ROOTPAGE_VERS"),
        (6, "HOLDINGPAGE_VERS"),
    ]
    .map(|(id, uuid)| (id, uuid.to_string()));
    assert_eq!(anchors, expected.to_vec());

    let groups: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM groups WHERE item_id IN (1, 2, 3, 4);",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(groups, 4);
}

#[test]
fn stale_containers_from_an_interrupted_pass_are_removed() {
    let conn = seeded_store();
    // Leftover page parented to nothing, inside the allocation range.
    insert_page(&conn, CLOCK + 1, 999, 0);
    let document = service(&conn).export_layout().unwrap();

    service(&conn).import_layout(&document).unwrap();

    assert_eq!(parent_and_ordering(&conn, CLOCK + 1), (1, 0));
    assert_eq!(container_ids(&conn).len(), 5);
}

fn drop_apps_holding_anchor(conn: &Connection) {
    conn.execute_batch(
        "DELETE FROM groups WHERE item_id = 2;
         DELETE FROM items WHERE rowid = 2;",
    )
    .unwrap();
}

#[test]
fn entry_in_holding_fallback_slot_aborts_before_any_delete() {
    let conn = empty_store();
    drop_apps_holding_anchor(&conn);
    insert_page(&conn, 20, 1, 0);
    insert_app(&conn, 2, 20, 0, "Safari");
    insert_app(&conn, 7, 20, 1, "Mail");
    let document = apps_only(vec![page(1, &["Safari", "Mail"], Vec::new())]);

    let err = service(&conn).import_layout(&document).unwrap_err();

    assert!(matches!(err, SyncError::Repo(RepoError::InvalidData(_))));
    assert_eq!(parent_and_ordering(&conn, 2), (20, 0));
    assert_eq!(parent_and_ordering(&conn, 7), (20, 1));
    assert_eq!(container_ids(&conn), vec![20]);
    let safari_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM items WHERE rowid = 2 AND type = 4;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(safari_rows, 1);
    assert_eq!(trigger_switch(&conn), "0");
}

#[test]
fn free_holding_fallback_slot_gets_a_fresh_anchor() {
    let conn = seeded_store();
    drop_apps_holding_anchor(&conn);
    let document = service(&conn).export_layout().unwrap();

    service(&conn).import_layout(&document).unwrap();

    let holding: (String, i64) = conn
        .query_row(
            "SELECT uuid, type FROM items WHERE rowid = 2;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(holding, ("HOLDINGPAGE".to_string(), 1));
    assert_eq!(service(&conn).export_layout().unwrap(), document);
}

#[test]
fn purge_never_removes_an_entry_passed_as_anchor() {
    let conn = seeded_store();
    let repo = SqliteLaunchpadRepository::new(&conn);

    repo.purge_tree_containers(TreeAnchors {
        root: 1,
        holding: SAFARI,
    })
    .unwrap();

    assert_eq!(parent_and_ordering(&conn, SAFARI), (20, 0));
}

#[test]
fn trailing_page_after_max_page_number_is_placed() {
    let conn = seeded_store();
    let document = apps_only(vec![Page {
        number: u32::MAX,
        flat_items: strings(&["Safari"]),
        folders: Vec::new(),
    }]);

    let report = service(&conn).import_layout(&document).unwrap();
    let exported = service(&conn).export_layout().unwrap();

    assert_eq!(
        report.apps.appended_missing,
        strings(&["Mail", "Calc", "Notes", "Maps"])
    );
    assert_eq!(exported.apps.pages.len(), 2);
    assert_eq!(exported.apps.pages[1].number, 2);
}
