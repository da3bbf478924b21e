//! Navigation business logic - The site's menu as a self-referencing tree.
//!
//! Entries are stored flat with a nullable `parent_id`; every traversal walks
//! parent references by id and keeps a visited set, so a corrupted table with
//! a parent cycle is reported as `Error::NavigationCycle` instead of looping.
//! Writes refuse to create such a cycle in the first place.
//!
//! Sibling order is `(position, id)` ascending everywhere.

use crate::{
    entities::{Navigation, navigation},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Fields for a new navigation entry. Only `title` and `url` are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewNavigationItem {
    /// Link text, trimmed and non-empty
    pub title: String,
    /// Link target, trimmed and non-empty
    pub url: String,
    /// Sort key among siblings
    #[serde(default)]
    pub position: i32,
    /// Existing entry to nest under
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Published when true
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Open the link in a new tab
    #[serde(default)]
    pub open_new_tab: bool,
    /// Extra class for the rendered link
    #[serde(default)]
    pub css_class: String,
}

const fn default_true() -> bool {
    true
}

impl NewNavigationItem {
    /// An active, top-level entry at position 0.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            position: 0,
            parent_id: None,
            is_active: true,
            open_new_tab: false,
            css_class: String::new(),
        }
    }

    /// Sets the sort position.
    #[must_use]
    pub const fn at_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Nests the entry under `parent_id`.
    #[must_use]
    pub const fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Stores the entry without publishing it.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// A merge-patch for an existing entry: `None` leaves the field untouched.
///
/// `parent_id` is doubly optional so that an explicit JSON `null` (move the
/// entry to the top level) differs from the key being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NavigationPatch {
    /// New link text
    #[serde(default)]
    pub title: Option<String>,
    /// New link target
    #[serde(default)]
    pub url: Option<String>,
    /// New sort position
    #[serde(default)]
    pub position: Option<i32>,
    /// `Some(None)` moves the entry to the top level
    #[serde(default, deserialize_with = "present_value")]
    pub parent_id: Option<Option<i64>>,
    /// Publish or hide the entry
    #[serde(default)]
    pub is_active: Option<bool>,
    /// New-tab flag
    #[serde(default)]
    pub open_new_tab: Option<bool>,
    /// Replacement CSS class
    #[serde(default)]
    pub css_class: Option<String>,
}

impl NavigationPatch {
    /// Whether the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.position.is_none()
            && self.parent_id.is_none()
            && self.is_active.is_none()
            && self.open_new_tab.is_none()
            && self.css_class.is_none()
    }
}

fn present_value<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An active entry placed in the published menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationNode {
    /// Id of the stored entry
    pub id: i64,
    /// Link text
    pub title: String,
    /// Link target
    pub url: String,
    /// Open in a new tab
    pub open_new_tab: bool,
    /// Extra CSS class, possibly empty
    pub css_class: String,
    /// Active descendants, in `(position, id)` order
    pub children: Vec<NavigationNode>,
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!(
            "Navigation {field} cannot be empty"
        )));
    }
    Ok(trimmed.to_string())
}

async fn ensure_parent_exists<C>(db: &C, parent_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    if Navigation::find_by_id(parent_id).one(db).await?.is_none() {
        return Err(Error::validation(format!(
            "Parent navigation item {parent_id} does not exist"
        )));
    }
    Ok(())
}

/// Retrieves a navigation entry by id.
pub async fn get_navigation_item(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<navigation::Model>> {
    Navigation::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Lists navigation entries ordered by `(position, id)`.
///
/// With `active_only`, inactive entries are left out one by one; their
/// descendants are still listed if they are active themselves.
pub async fn list_navigation_items<C>(db: &C, active_only: bool) -> Result<Vec<navigation::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Navigation::find();
    if active_only {
        query = query.filter(navigation::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(navigation::Column::Position)
        .order_by_asc(navigation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a navigation entry after validating it.
///
/// Title and URL are trimmed and must not be empty; a parent, when given,
/// must already exist. Nothing is written if validation fails.
pub async fn add_navigation_item(
    db: &DatabaseConnection,
    item: NewNavigationItem,
) -> Result<navigation::Model> {
    let title = required_text("title", &item.title)?;
    let url = required_text("url", &item.url)?;

    if let Some(parent_id) = item.parent_id {
        ensure_parent_exists(db, parent_id).await?;
    }

    let now = Utc::now().naive_utc();
    let model = navigation::ActiveModel {
        title: Set(title),
        url: Set(url),
        position: Set(item.position),
        parent_id: Set(item.parent_id),
        is_active: Set(item.is_active),
        open_new_tab: Set(item.open_new_tab),
        css_class: Set(item.css_class.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Added navigation item {} ({})", model.id, model.title);
    Ok(model)
}

/// Applies a merge-patch to an existing entry.
///
/// Only the fields present in `patch` change. A new parent must exist and
/// must not be the entry itself or one of its descendants.
pub async fn update_navigation_item(
    db: &DatabaseConnection,
    id: i64,
    patch: NavigationPatch,
) -> Result<navigation::Model> {
    let title = patch
        .title
        .as_deref()
        .map(|t| required_text("title", t))
        .transpose()?;
    let url = patch
        .url
        .as_deref()
        .map(|u| required_text("url", u))
        .transpose()?;

    let txn = db.begin().await?;

    let existing = Navigation::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(Error::NavigationNotFound { id })?;

    if patch.is_empty() {
        return Ok(existing);
    }

    if let Some(Some(parent_id)) = patch.parent_id {
        ensure_parent_exists(&txn, parent_id).await?;
        ensure_not_descendant(&txn, id, parent_id).await?;
    }

    let mut active_model: navigation::ActiveModel = existing.into();
    if let Some(title) = title {
        active_model.title = Set(title);
    }
    if let Some(url) = url {
        active_model.url = Set(url);
    }
    if let Some(position) = patch.position {
        active_model.position = Set(position);
    }
    if let Some(parent_id) = patch.parent_id {
        active_model.parent_id = Set(parent_id);
    }
    if let Some(is_active) = patch.is_active {
        active_model.is_active = Set(is_active);
    }
    if let Some(open_new_tab) = patch.open_new_tab {
        active_model.open_new_tab = Set(open_new_tab);
    }
    if let Some(css_class) = patch.css_class {
        active_model.css_class = Set(css_class.trim().to_string());
    }
    active_model.updated_at = Set(Utc::now().naive_utc());

    let updated = active_model.update(&txn).await?;
    txn.commit().await?;

    tracing::info!("Updated navigation item {}", id);
    Ok(updated)
}

/// Rejects moving `id` under `new_parent` when `new_parent` is `id` or sits
/// below it.
async fn ensure_not_descendant<C>(db: &C, id: i64, new_parent: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let parents = parent_map(db).await?;
    let mut visited = HashSet::new();
    let mut current = Some(new_parent);

    while let Some(node) = current {
        if node == id {
            return Err(Error::validation(format!(
                "Navigation item {id} cannot be placed under itself or its descendant {new_parent}"
            )));
        }
        if !visited.insert(node) {
            return Err(Error::NavigationCycle { id: node });
        }
        current = parents.get(&node).copied().flatten();
    }
    Ok(())
}

async fn parent_map<C>(db: &C) -> Result<HashMap<i64, Option<i64>>>
where
    C: ConnectionTrait,
{
    let items = Navigation::find().all(db).await?;
    Ok(items.into_iter().map(|m| (m.id, m.parent_id)).collect())
}

/// Ids of every transitive descendant of `root`, excluding `root` itself.
fn collect_descendants(root: i64, parents: &HashMap<i64, Option<i64>>) -> BTreeSet<i64> {
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for (&child, parent) in parents {
        if let Some(parent) = parent {
            children.entry(*parent).or_default().push(child);
        }
    }

    let mut found = BTreeSet::new();
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        for &child in children.get(&node).into_iter().flatten() {
            // The visited check also stops at a cycle leading back to root
            if child != root && found.insert(child) {
                queue.push_back(child);
            }
        }
    }
    found
}

/// Deletes an entry and its whole subtree in one transaction.
///
/// Returns how many entries were removed (the entry plus its descendants).
pub async fn delete_navigation_item(db: &DatabaseConnection, id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    if Navigation::find_by_id(id).one(&txn).await?.is_none() {
        return Err(Error::NavigationNotFound { id });
    }

    let parents = parent_map(&txn).await?;
    let mut doomed = collect_descendants(id, &parents);
    doomed.insert(id);

    Navigation::delete_many()
        .filter(navigation::Column::Id.is_in(doomed.iter().copied()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let removed = doomed.len() as u64;
    tracing::info!("Deleted navigation item {} and {} descendants", id, removed - 1);
    Ok(removed)
}

/// Assigns new positions to several entries at once.
///
/// Every id must exist; otherwise nothing is changed. All positions are
/// written inside one transaction.
pub async fn reorder_navigation(db: &DatabaseConnection, order: &[(i64, i32)]) -> Result<()> {
    if order.is_empty() {
        return Ok(());
    }

    let txn = db.begin().await?;

    let requested: BTreeSet<i64> = order.iter().map(|(id, _)| *id).collect();
    let found: HashSet<i64> = Navigation::find()
        .filter(navigation::Column::Id.is_in(requested.iter().copied()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    if let Some(missing) = requested.iter().find(|id| !found.contains(id)) {
        return Err(Error::NavigationNotFound { id: *missing });
    }

    let now = Utc::now().naive_utc();
    for (id, position) in order {
        Navigation::update_many()
            .col_expr(navigation::Column::Position, Expr::value(*position))
            .col_expr(navigation::Column::UpdatedAt, Expr::value(now))
            .filter(navigation::Column::Id.eq(*id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    tracing::info!("Reordered {} navigation items", order.len());
    Ok(())
}

/// Builds the published menu from a full `(position, id)`-ordered listing.
///
/// Inactive entries are dropped individually; an active entry hangs under its
/// nearest active ancestor, or at the top level if it has none. Entries whose
/// parent reference dangles are treated as top-level.
///
/// # Errors
/// Returns `Error::NavigationCycle` if any parent chain loops.
pub fn build_active_tree(items: &[navigation::Model]) -> Result<Vec<NavigationNode>> {
    let by_id: HashMap<i64, &navigation::Model> = items.iter().map(|m| (m.id, m)).collect();

    let mut placement: HashMap<i64, Option<i64>> = HashMap::new();
    for item in items.iter().filter(|m| m.is_active) {
        let mut visited = HashSet::from([item.id]);
        let mut current = item.parent_id;
        let mut anchor = None;

        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                return Err(Error::NavigationCycle { id: parent_id });
            }
            let Some(parent) = by_id.get(&parent_id) else {
                break;
            };
            if parent.is_active {
                anchor = Some(parent_id);
                break;
            }
            current = parent.parent_id;
        }
        placement.insert(item.id, anchor);
    }

    // A cycle made only of inactive entries above an active one is caught
    // above; one entirely among active entries shows up here.
    for item in items.iter().filter(|m| m.is_active) {
        let mut visited = HashSet::from([item.id]);
        let mut current = placement.get(&item.id).copied().flatten();
        while let Some(anchor) = current {
            if !visited.insert(anchor) {
                return Err(Error::NavigationCycle { id: anchor });
            }
            current = placement.get(&anchor).copied().flatten();
        }
    }

    Ok(attach_children(None, items, &placement))
}

fn attach_children(
    anchor: Option<i64>,
    items: &[navigation::Model],
    placement: &HashMap<i64, Option<i64>>,
) -> Vec<NavigationNode> {
    items
        .iter()
        .filter(|m| m.is_active && placement.get(&m.id).copied().flatten() == anchor)
        .map(|m| NavigationNode {
            id: m.id,
            title: m.title.clone(),
            url: m.url.clone(),
            open_new_tab: m.open_new_tab,
            css_class: m.css_class.clone(),
            children: attach_children(Some(m.id), items, placement),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_validates_title_and_url() -> Result<()> {
        let db = setup_test_db().await?;

        let result = add_navigation_item(&db, NewNavigationItem::new("   ", "about.html")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = add_navigation_item(&db, NewNavigationItem::new("About", "")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(list_navigation_items(&db, false).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_trims_and_applies_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let item = add_navigation_item(&db, NewNavigationItem::new("  About ", " about.html "))
            .await?;

        assert_eq!(item.title, "About");
        assert_eq!(item.url, "about.html");
        assert_eq!(item.position, 0);
        assert_eq!(item.parent_id, None);
        assert!(item.is_active);
        assert!(!item.open_new_tab);
        assert_eq!(item.css_class, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_rejects_missing_parent() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_navigation_item(&db, NewNavigationItem::new("Child", "c.html").under(99))
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_by_position_then_id() -> Result<()> {
        let db = setup_test_db().await?;

        let contact = create_test_nav_item(&db, "Contact", 2).await?;
        let blog = create_test_nav_item(&db, "Blog", 1).await?;
        let about = create_test_nav_item(&db, "About", 1).await?;
        let home = create_test_nav_item(&db, "Home", 0).await?;

        let ids: Vec<i64> = list_navigation_items(&db, false)
            .await?
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![home.id, blog.id, about.id, contact.id]);

        // Each added entry appears exactly once
        assert_eq!(ids.iter().filter(|id| **id == about.id).count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_active_only_excludes_per_item() -> Result<()> {
        let db = setup_test_db().await?;

        let parent =
            add_navigation_item(&db, NewNavigationItem::new("Work", "work.html").inactive())
                .await?;
        let child =
            add_navigation_item(&db, NewNavigationItem::new("Case", "case.html").under(parent.id))
                .await?;

        let active = list_navigation_items(&db, true).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, child.id);

        assert_eq!(list_navigation_items(&db, false).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_only_changes_supplied_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let parent = create_test_nav_item(&db, "Services", 3).await?;
        let item = add_navigation_item(
            &db,
            NewNavigationItem::new("Design", "design.html")
                .at_position(5)
                .under(parent.id),
        )
        .await?;

        let updated = update_navigation_item(
            &db,
            item.id,
            NavigationPatch {
                title: Some("Web Design".to_string()),
                ..NavigationPatch::default()
            },
        )
        .await?;

        assert_eq!(updated.title, "Web Design");
        assert_eq!(updated.url, "design.html");
        assert_eq!(updated.position, 5);
        assert_eq!(updated.parent_id, Some(parent.id));
        assert!(updated.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_navigation_item(
            &db,
            42,
            NavigationPatch {
                title: Some("x".to_string()),
                ..NavigationPatch::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::NavigationNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_nav_item(&db, "About", 0).await?;
        let result = update_navigation_item(
            &db,
            item.id,
            NavigationPatch {
                title: Some(" ".to_string()),
                ..NavigationPatch::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(get_navigation_item(&db, item.id).await?.unwrap().title, "About");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_can_clear_parent() -> Result<()> {
        let db = setup_test_db().await?;
        let parent = create_test_nav_item(&db, "Services", 0).await?;
        let child =
            add_navigation_item(&db, NewNavigationItem::new("Design", "d.html").under(parent.id))
                .await?;

        let patch: NavigationPatch = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(patch.parent_id, Some(None));

        let updated = update_navigation_item(&db, child.id, patch).await?;
        assert_eq!(updated.parent_id, None);
        Ok(())
    }

    #[test]
    fn test_patch_absent_parent_is_untouched() {
        let patch: NavigationPatch = serde_json::from_str(r#"{"title": "Blog"}"#).unwrap();
        assert_eq!(patch.parent_id, None);
        assert_eq!(patch.title.as_deref(), Some("Blog"));
        assert!(!patch.is_empty());
        assert!(NavigationPatch::default().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_parent_cycle() -> Result<()> {
        let db = setup_test_db().await?;
        let root = create_test_nav_item(&db, "Root", 0).await?;
        let mid =
            add_navigation_item(&db, NewNavigationItem::new("Mid", "m.html").under(root.id))
                .await?;
        let leaf =
            add_navigation_item(&db, NewNavigationItem::new("Leaf", "l.html").under(mid.id))
                .await?;

        let move_under_leaf = NavigationPatch {
            parent_id: Some(Some(leaf.id)),
            ..NavigationPatch::default()
        };
        let result = update_navigation_item(&db, root.id, move_under_leaf).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let move_under_self = NavigationPatch {
            parent_id: Some(Some(mid.id)),
            ..NavigationPatch::default()
        };
        let result = update_navigation_item(&db, mid.id, move_under_self).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert_eq!(get_navigation_item(&db, root.id).await?.unwrap().parent_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cascades_to_descendants() -> Result<()> {
        let db = setup_test_db().await?;
        let keep = create_test_nav_item(&db, "Home", 0).await?;
        let services = create_test_nav_item(&db, "Services", 1).await?;
        let design = add_navigation_item(
            &db,
            NewNavigationItem::new("Design", "design.html").under(services.id),
        )
        .await?;
        add_navigation_item(&db, NewNavigationItem::new("Logos", "logos.html").under(design.id))
            .await?;
        add_navigation_item(
            &db,
            NewNavigationItem::new("Hosting", "hosting.html").under(services.id),
        )
        .await?;

        let before = list_navigation_items(&db, false).await?.len() as u64;
        let removed = delete_navigation_item(&db, services.id).await?;
        let after = list_navigation_items(&db, false).await?.len() as u64;

        assert_eq!(removed, 4);
        assert_eq!(before - after, 1 + 3);
        let remaining = list_navigation_items(&db, false).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_item_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_nav_item(&db, "Home", 0).await?;
        let result = delete_navigation_item(&db, 7).await;
        assert!(matches!(result, Err(Error::NavigationNotFound { id: 7 })));
        assert_eq!(list_navigation_items(&db, false).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_applies_all_positions() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_nav_item(&db, "A", 0).await?;
        let b = create_test_nav_item(&db, "B", 1).await?;
        let c = create_test_nav_item(&db, "C", 2).await?;

        reorder_navigation(&db, &[(a.id, 2), (b.id, 0), (c.id, 1)]).await?;

        let titles: Vec<String> = list_navigation_items(&db, false)
            .await?
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_with_unknown_id_changes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_nav_item(&db, "A", 0).await?;
        let b = create_test_nav_item(&db, "B", 1).await?;

        let result = reorder_navigation(&db, &[(a.id, 5), (999, 0), (b.id, 4)]).await;
        assert!(matches!(result, Err(Error::NavigationNotFound { id: 999 })));

        assert_eq!(get_navigation_item(&db, a.id).await?.unwrap().position, 0);
        assert_eq!(get_navigation_item(&db, b.id).await?.unwrap().position, 1);
        Ok(())
    }

    fn model(id: i64, parent_id: Option<i64>, is_active: bool) -> navigation::Model {
        let now = Utc::now().naive_utc();
        navigation::Model {
            id,
            title: format!("Item {id}"),
            url: format!("item-{id}.html"),
            position: 0,
            parent_id,
            is_active,
            open_new_tab: false,
            css_class: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_tree_nests_and_promotes() {
        let items = vec![
            model(1, None, true),
            model(2, Some(1), true),
            model(3, None, false),
            model(4, Some(3), true),
            model(5, Some(2), false),
            model(6, Some(5), true),
        ];

        let tree = build_active_tree(&items).unwrap();

        let top: Vec<i64> = tree.iter().map(|n| n.id).collect();
        assert_eq!(top, vec![1, 4]);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, 2);
        // 6 skips its inactive parent 5 and lands under 2
        assert_eq!(tree[0].children[0].children[0].id, 6);
    }

    #[test]
    fn test_active_tree_reports_cycles() {
        let items = vec![model(1, Some(2), true), model(2, Some(1), true)];
        assert!(matches!(
            build_active_tree(&items),
            Err(Error::NavigationCycle { .. })
        ));

        let through_inactive = vec![
            model(1, Some(2), true),
            model(2, Some(3), false),
            model(3, Some(2), false),
        ];
        assert!(matches!(
            build_active_tree(&through_inactive),
            Err(Error::NavigationCycle { .. })
        ));
    }

    #[test]
    fn test_collect_descendants_stops_on_cycles() {
        let parents = HashMap::from([(1, Some(3)), (2, Some(1)), (3, Some(2)), (4, None)]);
        let found = collect_descendants(1, &parents);
        assert_eq!(found, BTreeSet::from([2, 3]));
    }
}
