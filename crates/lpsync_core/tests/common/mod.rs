#![allow(dead_code)]

use lpsync_core::db::open_store_in_memory;
use rusqlite::{params, Connection};

pub const SAFARI: i64 = 7;
pub const MAIL: i64 = 8;
pub const CALC: i64 = 9;
pub const NOTES: i64 = 10;
pub const MAPS: i64 = 11;
pub const WEATHER: i64 = 12;
pub const CLOCK: i64 = 13;

pub fn empty_store() -> Connection {
    open_store_in_memory().unwrap()
}

pub fn insert_container(
    conn: &Connection,
    id: i64,
    kind: i64,
    parent_id: i64,
    ordering: i64,
    title: Option<&str>,
) {
    conn.execute(
        "INSERT INTO items (rowid, uuid, flags, type, parent_id, ordering)
         VALUES (?1, ?2, 0, ?3, ?4, ?5);",
        params![id, format!("GROUP-{id}"), kind, parent_id, ordering],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO groups (item_id, category_id, title) VALUES (?1, NULL, ?2);",
        params![id, title],
    )
    .unwrap();
}

pub fn insert_page(conn: &Connection, id: i64, parent_id: i64, ordering: i64) {
    insert_container(conn, id, 3, parent_id, ordering, None);
}

pub fn insert_folder(conn: &Connection, id: i64, parent_id: i64, ordering: i64, title: &str) {
    insert_container(conn, id, 2, parent_id, ordering, Some(title));
}

pub fn insert_app(conn: &Connection, id: i64, parent_id: i64, ordering: i64, title: &str) {
    insert_entry(conn, "apps", 4, id, parent_id, ordering, title);
}

pub fn insert_widget(conn: &Connection, id: i64, parent_id: i64, ordering: i64, title: &str) {
    insert_entry(conn, "widgets", 6, id, parent_id, ordering, title);
}

fn insert_entry(
    conn: &Connection,
    table: &str,
    kind: i64,
    id: i64,
    parent_id: i64,
    ordering: i64,
    title: &str,
) {
    conn.execute(
        "INSERT INTO items (rowid, uuid, flags, type, parent_id, ordering)
         VALUES (?1, ?2, 0, ?3, ?4, ?5);",
        params![id, format!("ENTRY-{id}"), kind, parent_id, ordering],
    )
    .unwrap();
    conn.execute(
        &format!(
            "INSERT INTO {table} (item_id, title, bundleid) VALUES (?1, ?2, ?3);"
        ),
        params![id, title, format!("com.example.{}", title.to_lowercase())],
    )
    .unwrap();
}

/// Apps: page 1 = Safari, Mail, folder Utils [Calc, Notes]; page 2 = Maps.
/// Widgets: page 1 = Weather, Clock.
pub fn seeded_store() -> Connection {
    let conn = empty_store();

    insert_page(&conn, 20, 1, 0);
    insert_app(&conn, SAFARI, 20, 0, "Safari");
    insert_app(&conn, MAIL, 20, 1, "Mail");
    insert_folder(&conn, 21, 20, 2, "Utils");
    insert_page(&conn, 22, 21, 0);
    insert_app(&conn, CALC, 22, 0, "Calc");
    insert_app(&conn, NOTES, 22, 1, "Notes");
    insert_page(&conn, 23, 1, 1);
    insert_app(&conn, MAPS, 23, 0, "Maps");

    insert_page(&conn, 24, 3, 0);
    insert_widget(&conn, WEATHER, 24, 0, "Weather");
    insert_widget(&conn, CLOCK, 24, 1, "Clock");

    conn
}

pub fn parent_and_ordering(conn: &Connection, id: i64) -> (i64, i64) {
    conn.query_row(
        "SELECT parent_id, ordering FROM items WHERE rowid = ?1;",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap()
}

pub fn container_ids(conn: &Connection) -> Vec<i64> {
    let mut stmt = conn
        .prepare("SELECT rowid FROM items WHERE type IN (2, 3) ORDER BY rowid;")
        .unwrap();
    let ids = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<i64>, _>>()
        .unwrap();
    ids
}

pub fn trigger_switch(conn: &Connection) -> String {
    conn.query_row(
        "SELECT value FROM dbinfo WHERE key = 'ignore_items_update_triggers';",
        [],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
