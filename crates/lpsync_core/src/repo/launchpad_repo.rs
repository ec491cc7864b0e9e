//! Launcher layout repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide read APIs for layout rows, installed entries and anchors.
//! - Provide the write primitives used by container rebuilds.
//! - Keep SQL details and the trigger switch inside the repository boundary.
//!
//! # Invariants
//! - Layout rows are returned ordered by `parent_id, ordering, rowid`.
//! - Entry rows are only ever re-parented/re-ordered, never inserted or deleted.
//! - Container rows always come with a matching `groups` row.

use crate::db::StoreError;
use crate::model::item::{
    EntryRecord, ItemId, ItemKind, LayoutRow, TreeAnchors, TreeKind, ANCHOR_UUIDS,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TRIGGER_SWITCH_KEY: &str = "ignore_items_update_triggers";

/// Result type used by launcher repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from launcher repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Store(StoreError),
    /// `dbinfo` does not hold the anchor key for a tree.
    AnchorKeyNotFound(&'static str),
    /// Entry row vanished between lookup and placement.
    EntryNotFound(ItemId),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::AnchorKeyNotFound(key) => write!(f, "anchor key not found in dbinfo: {key}"),
            Self::EntryNotFound(id) => write!(f, "entry row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid launcher data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::AnchorKeyNotFound(_) => None,
            Self::EntryNotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(value))
    }
}

/// Synthetic container row to insert during a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewContainer<'a> {
    pub id: ItemId,
    pub parent_id: ItemId,
    pub ordering: i64,
    pub kind: ItemKind,
    /// Folder title; `None` for pages.
    pub title: Option<&'a str>,
}

/// Repository interface for launcher layout operations.
pub trait LaunchpadRepository {
    /// Resolves the root and holding anchor ids of one tree.
    fn resolve_anchors(&self, tree: TreeKind) -> RepoResult<TreeAnchors>;
    /// Loads every non-anchor item with its title payload.
    fn load_layout_rows(&self) -> RepoResult<Vec<LayoutRow>>;
    /// Lists installed entries of one tree in store ordering.
    fn list_entries(&self, tree: TreeKind) -> RepoResult<Vec<EntryRecord>>;
    /// Highest entry id of one tree, `0` when the tree is empty.
    fn max_entry_id(&self, tree: TreeKind) -> RepoResult<ItemId>;
    /// Flips the store's ordering-trigger switch. Idempotent.
    fn set_triggers_suspended(&self, suspended: bool) -> RepoResult<()>;
    /// Deletes every folder/page container row in the store.
    fn clear_containers(&self) -> RepoResult<usize>;
    /// Deletes the anchors of one tree and every container below them.
    fn purge_tree_containers(&self, anchors: TreeAnchors) -> RepoResult<usize>;
    /// Inserts the anchor pair of one tree.
    fn create_anchors(&self, tree: TreeKind, anchors: TreeAnchors) -> RepoResult<()>;
    /// Inserts one container row and its `groups` payload.
    fn create_container(&self, container: &NewContainer<'_>) -> RepoResult<()>;
    /// Re-parents one entry.
    fn place_entry(&self, entry_id: ItemId, parent_id: ItemId, ordering: i64) -> RepoResult<()>;
}

/// SQLite-backed launcher repository.
pub struct SqliteLaunchpadRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLaunchpadRepository<'conn> {
    /// Creates repository from an opened store connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Fails when `id` belongs to a row other than an anchor.
    fn ensure_anchor_slot(&self, id: ItemId, role: &str) -> RepoResult<()> {
        let code: Option<i64> = self
            .conn
            .query_row(
                "SELECT COALESCE(type, 0)
                 FROM items
                 WHERE rowid = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        match code.map(ItemKind::from_code) {
            None | Some(ItemKind::Root) => Ok(()),
            Some(kind) => Err(RepoError::InvalidData(format!(
                "{role} anchor id {id} is taken by a row of type {}",
                kind.code()
            ))),
        }
    }
}

impl LaunchpadRepository for SqliteLaunchpadRepository<'_> {
    fn resolve_anchors(&self, tree: TreeKind) -> RepoResult<TreeAnchors> {
        let key = tree.root_key();
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value
                 FROM dbinfo
                 WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        let value = value.ok_or(RepoError::AnchorKeyNotFound(key))?;
        let root = value.trim().parse::<ItemId>().map_err(|_| {
            RepoError::InvalidData(format!("invalid anchor id `{value}` in dbinfo.{key}"))
        })?;

        let (_, holding_uuid) = tree.anchor_uuids();
        let holding: Option<ItemId> = self
            .conn
            .query_row(
                "SELECT rowid
                 FROM items
                 WHERE uuid = ?1;",
                [holding_uuid],
                |row| row.get(0),
            )
            .optional()?;

        let holding = holding.unwrap_or(root + 1);

        self.ensure_anchor_slot(root, tree.as_str())?;
        self.ensure_anchor_slot(holding, holding_uuid)?;
        Ok(TreeAnchors { root, holding })
    }

    fn load_layout_rows(&self) -> RepoResult<Vec<LayoutRow>> {
        let placeholders = (1..=ANCHOR_UUIDS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT
                i.rowid AS id,
                i.parent_id AS parent_id,
                i.ordering AS ordering,
                i.type AS type,
                COALESCE(a.title, w.title, g.title) AS title
             FROM items i
             LEFT JOIN apps a ON a.item_id = i.rowid
             LEFT JOIN widgets w ON w.item_id = i.rowid
             LEFT JOIN groups g ON g.item_id = i.rowid
             WHERE i.uuid IS NULL OR i.uuid NOT IN ({placeholders})
             ORDER BY i.parent_id ASC, i.ordering ASC, i.rowid ASC;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ANCHOR_UUIDS.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_layout_row(row)?);
        }
        Ok(items)
    }

    fn list_entries(&self, tree: TreeKind) -> RepoResult<Vec<EntryRecord>> {
        let sql = format!(
            "SELECT e.item_id, COALESCE(e.title, '')
             FROM {table} e
             INNER JOIN items i ON i.rowid = e.item_id
             ORDER BY i.parent_id ASC, i.ordering ASC, e.item_id ASC;",
            table = entry_table(tree)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(EntryRecord {
                id: row.get(0)?,
                title: row.get(1)?,
            });
        }
        Ok(entries)
    }

    fn max_entry_id(&self, tree: TreeKind) -> RepoResult<ItemId> {
        let sql = format!(
            "SELECT COALESCE(MAX(item_id), 0) FROM {table};",
            table = entry_table(tree)
        );
        let max = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(max)
    }

    fn set_triggers_suspended(&self, suspended: bool) -> RepoResult<()> {
        let value = if suspended { "1" } else { "0" };
        let changed = self.conn.execute(
            "UPDATE dbinfo
             SET value = ?2
             WHERE key = ?1;",
            params![TRIGGER_SWITCH_KEY, value],
        )?;
        if changed == 0 {
            self.conn.execute(
                "INSERT INTO dbinfo (key, value) VALUES (?1, ?2);",
                params![TRIGGER_SWITCH_KEY, value],
            )?;
        }
        Ok(())
    }

    fn clear_containers(&self) -> RepoResult<usize> {
        let (folder_root, page) = (ItemKind::FolderRoot.code(), ItemKind::Page.code());
        self.conn.execute(
            "DELETE FROM groups
             WHERE item_id IN (
                SELECT rowid FROM items WHERE type IN (?1, ?2)
             );",
            params![folder_root, page],
        )?;
        let removed = self.conn.execute(
            "DELETE FROM items
             WHERE type IN (?1, ?2);",
            params![folder_root, page],
        )?;
        Ok(removed)
    }

    fn purge_tree_containers(&self, anchors: TreeAnchors) -> RepoResult<usize> {
        let subtree = "WITH RECURSIVE containers(id) AS (
                SELECT rowid
                FROM items
                WHERE rowid IN (?1, ?2) AND type = ?3
                UNION
                SELECT child.rowid
                FROM items child
                INNER JOIN containers parent ON child.parent_id = parent.id
                WHERE child.type IN (?3, ?4, ?5)
            )";
        let (root, folder_root, page) = (
            ItemKind::Root.code(),
            ItemKind::FolderRoot.code(),
            ItemKind::Page.code(),
        );

        self.conn.execute(
            &format!(
                "{subtree}
                DELETE FROM groups
                WHERE item_id IN (SELECT id FROM containers);"
            ),
            params![anchors.root, anchors.holding, root, folder_root, page],
        )?;
        let removed = self.conn.execute(
            &format!(
                "{subtree}
                DELETE FROM items
                WHERE rowid IN (SELECT id FROM containers);"
            ),
            params![anchors.root, anchors.holding, root, folder_root, page],
        )?;
        Ok(removed)
    }

    fn create_anchors(&self, tree: TreeKind, anchors: TreeAnchors) -> RepoResult<()> {
        let (root_uuid, holding_uuid) = tree.anchor_uuids();
        for (id, uuid) in [(anchors.root, root_uuid), (anchors.holding, holding_uuid)] {
            self.conn.execute(
                "INSERT INTO items (rowid, uuid, flags, type, parent_id, ordering)
                 VALUES (?1, ?2, 0, ?3, 0, 0);",
                params![id, uuid, ItemKind::Root.code()],
            )?;
            self.conn.execute(
                "INSERT INTO groups (item_id, category_id, title)
                 VALUES (?1, NULL, NULL);",
                [id],
            )?;
        }
        Ok(())
    }

    fn create_container(&self, container: &NewContainer<'_>) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO items (rowid, uuid, flags, type, parent_id, ordering)
             VALUES (?1, ?2, 0, ?3, ?4, ?5);",
            params![
                container.id,
                Uuid::new_v4().to_string().to_uppercase(),
                container.kind.code(),
                container.parent_id,
                container.ordering,
            ],
        )?;
        self.conn.execute(
            "INSERT INTO groups (item_id, category_id, title)
             VALUES (?1, NULL, ?2);",
            params![container.id, container.title],
        )?;
        Ok(())
    }

    fn place_entry(&self, entry_id: ItemId, parent_id: ItemId, ordering: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET parent_id = ?2,
                 ordering = ?3
             WHERE rowid = ?1;",
            params![entry_id, parent_id, ordering],
        )?;
        if changed == 0 {
            return Err(RepoError::EntryNotFound(entry_id));
        }
        Ok(())
    }
}

fn entry_table(tree: TreeKind) -> &'static str {
    match tree {
        TreeKind::Apps => "apps",
        TreeKind::Widgets => "widgets",
    }
}

fn parse_layout_row(row: &Row<'_>) -> RepoResult<LayoutRow> {
    let ordering = row.get::<_, Option<i64>>("ordering")?.unwrap_or(0);
    let kind_code = row.get::<_, Option<i64>>("type")?.ok_or_else(|| {
        RepoError::InvalidData("missing item type in items.type".to_string())
    })?;

    Ok(LayoutRow {
        id: row.get("id")?,
        parent_id: row.get("parent_id")?,
        ordering,
        kind: ItemKind::from_code(kind_code),
        title: row.get("title")?,
    })
}
