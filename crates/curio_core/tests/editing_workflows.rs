//! Headless end-to-end workflows: scoped managers, joint save/cancel and
//! re-rendering through the reconciler.

use curio_core::{
    apply_plan, shared_list, BatchManager, BatchOptions, CollectionStore, Config, CoreError,
    HeadlessContainer, HeadlessRenderer, Item, ListRenderer, Record, RenderEntry, RenderPass,
    SaveBar, SaveCoordinator, ScopeRegistry, SharedList,
};
use std::cell::RefCell;
use std::rc::Rc;

fn records(ids: &[&str]) -> SharedList<Record> {
    shared_list(
        ids.iter()
            .map(|id| Record::new().with("id", *id).with("title", id.to_uppercase()))
            .collect(),
    )
}

fn ids(list: &SharedList<Record>) -> Vec<String> {
    list.borrow()
        .iter()
        .map(|item| item.identity().expect("fixture id"))
        .collect()
}

#[derive(Default)]
struct MemoryStore {
    items: Vec<Record>,
    calls: Vec<String>,
}

impl CollectionStore<Record> for MemoryStore {
    async fn delete(&mut self, item: &Record) -> Result<(), CoreError> {
        let id = item
            .identity()
            .ok_or_else(|| CoreError::Store("item without id".to_string()))?;
        self.items
            .retain(|stored| stored.identity().as_deref() != Some(id.as_str()));
        self.calls.push(format!("delete {}", id));
        Ok(())
    }

    async fn reorder(&mut self, order: &[Record]) -> Result<(), CoreError> {
        self.items = order.to_vec();
        self.calls.push(format!("reorder {}", order.len()));
        Ok(())
    }
}

#[tokio::test]
async fn scopes_share_one_save_bar_and_revert_together() {
    let bar = SaveBar::new();
    let config = Config::default();
    let registry = Rc::new(ScopeRegistry::new(move |_scope: &&'static str| {
        BatchOptions::from_config(&config, None)
    }));
    let albums = registry.visit("albums", records(&["a1", "a2", "a3"]));
    let photos = registry.visit("photos", records(&["p1", "p2"]));

    let save_registry = Rc::clone(&registry);
    let cancel_registry = Rc::clone(&registry);
    let coordinator = SaveCoordinator::new(
        bar.clone(),
        vec![
            registry.accessor("albums"),
            registry.accessor("photos"),
            registry.accessor("tags"),
        ],
        move || {
            let registry = Rc::clone(&save_registry);
            async move {
                for scope in ["albums", "photos", "tags"] {
                    if let Some(manager) = registry.get(&scope) {
                        manager.borrow_mut().mark_committed()?;
                    }
                }
                Ok::<(), CoreError>(())
            }
        },
        move || {
            let registry = Rc::clone(&cancel_registry);
            async move { registry.reset_all() }
        },
    );
    assert!(!bar.is_visible());

    photos.borrow_mut().toggle_delete(0);
    assert!(bar.is_visible());

    let tags = registry.visit("tags", records(&["rock", "jazz"]));
    assert_eq!(coordinator.rehook(), 1);
    tags.borrow_mut().toggle_select(1);
    tags.borrow_mut().move_to(0);
    albums.borrow_mut().toggle_select(0);

    coordinator.revert().await.expect("revert");

    assert!(!bar.is_visible());
    assert!(!registry.any_dirty());
    assert_eq!(ids(&tags.borrow().list()), vec!["rock", "jazz"]);
    assert!(albums.borrow().selection().is_empty());
}

#[tokio::test]
async fn commit_applies_deletions_before_one_reorder() {
    let list = records(&["a", "b", "c", "d"]);
    let manager = BatchManager::shared(Rc::clone(&list), BatchOptions::new());
    let store = Rc::new(RefCell::new(MemoryStore {
        items: list.borrow().clone(),
        calls: Vec::new(),
    }));

    let save_manager = Rc::clone(&manager);
    let save_store = Rc::clone(&store);
    let coordinator = SaveCoordinator::new(
        SaveBar::new(),
        vec![curio_core::track(&manager)],
        move || {
            let manager = Rc::clone(&save_manager);
            let store = Rc::clone(&save_store);
            async move {
                let plan = manager.borrow().commit_plan();
                let mut remote = std::mem::take(&mut *store.borrow_mut());
                let applied = apply_plan(&mut remote, &plan).await;
                *store.borrow_mut() = remote;
                applied?;
                manager.borrow_mut().mark_committed()?;
                Ok::<(), CoreError>(())
            }
        },
        || async { Ok::<(), CoreError>(()) },
    );

    {
        let mut editing = manager.borrow_mut();
        editing.toggle_delete(1);
        editing.toggle_delete(3);
        editing.toggle_select(2);
        editing.move_to(0);
    }
    assert!(coordinator.bar().is_visible());

    coordinator.commit().await.expect("commit");

    let store = store.borrow();
    assert_eq!(store.calls, vec!["delete b", "delete d", "reorder 2"]);
    assert_eq!(ids(&list), vec!["a", "c"]);
    let remote_ids: Vec<String> = store.items.iter().filter_map(Item::identity).collect();
    assert_eq!(remote_ids, vec!["a", "c"]);
    assert!(!coordinator.bar().is_visible());
    assert!(!manager.borrow().is_dirty());
}

#[test]
fn update_callback_rerenders_without_rebuilding_nodes() {
    let container = Rc::new(RefCell::new(HeadlessContainer::new()));
    let renderer = Rc::new(RefCell::new(HeadlessRenderer::new(Record::label)));
    let list_renderer = ListRenderer::from_config(&Config::default());

    let view = Rc::clone(&container);
    let paint = Rc::clone(&renderer);
    let view_renderer = list_renderer.clone();
    let options = BatchOptions::new().on_update(move |manager: &BatchManager<Record>| {
        view_renderer.render(
            &mut *view.borrow_mut(),
            RenderEntry::from_manager(manager),
            &mut *paint.borrow_mut(),
        );
    });
    let manager = BatchManager::shared(records(&["x", "y", "z"]), options);

    let first = list_renderer.render(
        &mut *container.borrow_mut(),
        RenderEntry::from_manager(&manager.borrow()),
        &mut *renderer.borrow_mut(),
    );
    assert!(matches!(first, RenderPass::Bulk(ref paint) if paint.is_done()));
    let serials = container.borrow().serials();

    manager.borrow_mut().toggle_select(2);
    manager.borrow_mut().toggle_delete(0);
    manager.borrow_mut().move_to(0);

    let view = container.borrow();
    assert_eq!(view.labels(), vec!["X", "Z", "Y"]);
    assert_eq!(view.nodes()[0].classes, "is-deleted");
    assert_eq!(renderer.borrow().created, 3);
    let mut reordered = view.serials();
    reordered.sort_unstable();
    assert_eq!(reordered, serials);
}
