//! In-memory catalog storage using DashMap.
//!
//! This module provides a memory-based implementation of every repository
//! trait. Data is lost on service restart. Uniqueness rules are enforced
//! through secondary name indexes claimed with the entry API, so concurrent
//! inserts of the same name resolve to exactly one winner just like a
//! database unique index would.

use std::hash::Hash;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::application::Application;
use crate::domain::event::Event;
use crate::domain::message::Message;
use crate::domain::notification::Notification;
use crate::domain::tags::Tag;

use super::backend::{
    ApplicationRepository, EventRepository, ListFilter, MessageRepository, NotificationRepository,
    Page, PageRequest, Sort, SortDirection, SortField, StoreError, StoreResult, TagRepository,
};

/// In-memory catalog storage.
#[derive(Default)]
pub struct MemoryStore {
    applications: DashMap<Uuid, Application>,
    application_names: DashMap<String, Uuid>,

    events: DashMap<Uuid, Event>,
    /// (application_id, name) → event id
    event_names: DashMap<(Uuid, String), Uuid>,

    notifications: DashMap<Uuid, Notification>,
    /// (event_id, name) → notification id
    notification_names: DashMap<(Uuid, String), Uuid>,

    tags: DashMap<String, Tag>,

    /// notification id → messages in insertion order
    messages: DashMap<Uuid, Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reserve `key` in a unique index for `id`.
fn claim<K: Eq + Hash>(index: &DashMap<K, Uuid>, key: K, id: Uuid, what: &str) -> StoreResult<()> {
    match index.entry(key) {
        Entry::Occupied(entry) if *entry.get() != id => {
            Err(StoreError::DuplicateKey(what.to_string()))
        }
        Entry::Occupied(_) => Ok(()),
        Entry::Vacant(entry) => {
            entry.insert(id);
            Ok(())
        }
    }
}

/// Drop `key` from a unique index if it is still held by `id`.
fn release<K: Eq + Hash>(index: &DashMap<K, Uuid>, key: &K, id: Uuid) {
    index.remove_if(key, |_, holder| *holder == id);
}

/// Accessors the generic listing helper needs.
trait Listable: Clone {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn is_active(&self) -> bool;
    fn is_deleted(&self) -> bool;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_listable {
    ($ty:ty) => {
        impl Listable for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn description(&self) -> &str {
                &self.description
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
            fn is_deleted(&self) -> bool {
                self.is_deleted
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }
        }
    };
}

impl_listable!(Application);
impl_listable!(Event);
impl_listable!(Notification);

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_filter<T: Listable>(item: &T, filter: &ListFilter) -> bool {
    if let Some(name) = &filter.name {
        if !contains_ci(item.name(), name) {
            return false;
        }
    }
    if let Some(description) = &filter.description {
        if !contains_ci(item.description(), description) {
            return false;
        }
    }
    if let Some(active) = filter.is_active {
        if item.is_active() != active {
            return false;
        }
    }
    if let Some(deleted) = filter.is_deleted {
        if item.is_deleted() != deleted {
            return false;
        }
    }
    true
}

fn paginate<T: Listable>(
    mut items: Vec<T>,
    filter: &ListFilter,
    sort: Option<Sort>,
    page: PageRequest,
) -> Page<T> {
    items.retain(|item| matches_filter(item, filter));

    // Insertion order first; a requested sort is stable on top of it.
    items.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });

    if let Some(sort) = sort {
        items.sort_by(|a, b| {
            let ord = match sort.field {
                SortField::Name => a.name().cmp(b.name()),
                SortField::IsActive => a.is_active().cmp(&b.is_active()),
                SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
                SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            };
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();

    Page { items, total }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn insert(&self, application: &Application) -> StoreResult<()> {
        claim(
            &self.application_names,
            application.name.clone(),
            application.id,
            "applications.name",
        )?;
        self.applications
            .insert(application.id, application.clone());
        Ok(())
    }

    async fn update(&self, application: &Application) -> StoreResult<()> {
        let current = self
            .applications
            .get(&application.id)
            .map(|a| a.clone())
            .ok_or_else(|| StoreError::NotFound(format!("application {}", application.id)))?;

        if current.name != application.name {
            claim(
                &self.application_names,
                application.name.clone(),
                application.id,
                "applications.name",
            )?;
            release(&self.application_names, &current.name, application.id);
        }

        self.applications
            .insert(application.id, application.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Application>> {
        Ok(self.applications.get(&id).map(|a| a.clone()))
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Application>> {
        let id = match self.application_names.get(name) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.applications.get(&id).map(|a| a.clone()))
    }

    async fn list(
        &self,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Application>> {
        let items = self
            .applications
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Ok(paginate(items, filter, sort, page))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert(&self, event: &Event) -> StoreResult<()> {
        claim(
            &self.event_names,
            (event.application_id, event.name.clone()),
            event.id,
            "events.application_id_name",
        )?;
        self.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> StoreResult<()> {
        let current = self
            .events
            .get(&event.id)
            .map(|e| e.clone())
            .ok_or_else(|| StoreError::NotFound(format!("event {}", event.id)))?;

        let old_key = (current.application_id, current.name.clone());
        let new_key = (event.application_id, event.name.clone());
        if old_key != new_key {
            claim(
                &self.event_names,
                new_key,
                event.id,
                "events.application_id_name",
            )?;
            release(&self.event_names, &old_key, event.id);
        }

        self.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self.events.get(&id).map(|e| e.clone()))
    }

    async fn find_by_name(&self, application_id: Uuid, name: &str) -> StoreResult<Option<Event>> {
        let id = match self.event_names.get(&(application_id, name.to_string())) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.events.get(&id).map(|e| e.clone()))
    }

    async fn list(
        &self,
        application_id: Uuid,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Event>> {
        let items = self
            .events
            .iter()
            .filter(|entry| entry.application_id == application_id)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(paginate(items, filter, sort, page))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: &Notification) -> StoreResult<()> {
        claim(
            &self.notification_names,
            (notification.event_id, notification.name.clone()),
            notification.id,
            "notifications.event_id_name",
        )?;
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> StoreResult<()> {
        let current = self
            .notifications
            .get(&notification.id)
            .map(|n| n.clone())
            .ok_or_else(|| StoreError::NotFound(format!("notification {}", notification.id)))?;

        let old_key = (current.event_id, current.name.clone());
        let new_key = (notification.event_id, notification.name.clone());
        if old_key != new_key {
            claim(
                &self.notification_names,
                new_key,
                notification.id,
                "notifications.event_id_name",
            )?;
            release(&self.notification_names, &old_key, notification.id);
        }

        self.notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        Ok(self.notifications.get(&id).map(|n| n.clone()))
    }

    async fn find_by_name(
        &self,
        event_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Notification>> {
        let id = match self.notification_names.get(&(event_id, name.to_string())) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.notifications.get(&id).map(|n| n.clone()))
    }

    async fn list(
        &self,
        event_id: Uuid,
        filter: &ListFilter,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> StoreResult<Page<Notification>> {
        let items = self
            .notifications
            .iter()
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(paginate(items, filter, sort, page))
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn find_by_label(&self, label: &str) -> StoreResult<Option<Tag>> {
        Ok(self.tags.get(label).map(|t| t.clone()))
    }

    async fn insert(&self, tag: &Tag) -> StoreResult<()> {
        match self.tags.entry(tag.label.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey("tags.label".to_string())),
            Entry::Vacant(entry) => {
                entry.insert(tag.clone());
                Ok(())
            }
        }
    }

    async fn list(&self) -> StoreResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.tags.iter().map(|t| t.value().clone()).collect();
        tags.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(tags)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn insert(&self, message: &Message) -> StoreResult<()> {
        self.messages
            .entry(message.notification_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_by_notification(&self, notification_id: Uuid) -> StoreResult<Vec<Message>> {
        Ok(self
            .messages
            .get(&notification_id)
            .map(|m| m.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> ListFilter {
        ListFilter::default()
    }

    fn first_page(limit: u32) -> PageRequest {
        PageRequest { page: 1, limit }
    }

    #[tokio::test]
    async fn test_application_name_unique() {
        let store = MemoryStore::new();
        let a = Application::new("Billing".into(), "Billing system".into());
        let b = Application::new("Billing".into(), "Another one".into());

        ApplicationRepository::insert(&store, &a).await.unwrap();
        let err = ApplicationRepository::insert(&store, &b).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_rename_releases_old_name() {
        let store = MemoryStore::new();
        let mut a = Application::new("Billing".into(), "Billing system".into());
        ApplicationRepository::insert(&store, &a).await.unwrap();

        a.name = "Invoicing".into();
        ApplicationRepository::update(&store, &a).await.unwrap();

        let reuse = Application::new("Billing".into(), "Billing system".into());
        ApplicationRepository::insert(&store, &reuse).await.unwrap();
        assert!(ApplicationRepository::find_by_name(&store, "Invoicing")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = MemoryStore::new();
        let a = Application::new("Billing".into(), "Billing system".into());
        let err = ApplicationRepository::update(&store, &a).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_notification_name_scoped_by_event() {
        let store = MemoryStore::new();
        let e1 = Uuid::new_v4();
        let e2 = Uuid::new_v4();

        let n1 = Notification::new(e1, "N1".into(), "desc".into(), "{{a}}".into());
        let n2 = Notification::new(e2, "N1".into(), "desc".into(), "{{a}}".into());
        let n3 = Notification::new(e1, "N1".into(), "desc".into(), "{{a}}".into());

        NotificationRepository::insert(&store, &n1).await.unwrap();
        NotificationRepository::insert(&store, &n2).await.unwrap();
        assert!(NotificationRepository::insert(&store, &n3)
            .await
            .unwrap_err()
            .is_duplicate_key());
    }

    #[tokio::test]
    async fn test_list_filter_sort_and_paginate() {
        let store = MemoryStore::new();
        for name in ["Charlie", "alpha", "Bravo", "Delta"] {
            let app = Application::new(name.into(), "some description".into());
            ApplicationRepository::insert(&store, &app).await.unwrap();
        }

        let sort = Some(Sort {
            field: SortField::Name,
            direction: SortDirection::Desc,
        });
        let page = ApplicationRepository::list(
            &store,
            &all(),
            sort,
            PageRequest { page: 2, limit: 3 },
        )
        .await
        .unwrap();
        assert_eq!(page.total, 4);
        // Byte order: "alpha" sorts after the capitalised names.
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Bravo");

        let filter = ListFilter {
            name: Some("ALP".into()),
            ..Default::default()
        };
        let page = ApplicationRepository::list(&store, &filter, None, first_page(10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_list_excludes_deleted_when_filtered() {
        let store = MemoryStore::new();
        let mut gone = Application::new("Gone".into(), "deleted app".into());
        gone.is_deleted = true;
        ApplicationRepository::insert(&store, &gone).await.unwrap();
        let kept = Application::new("Kept".into(), "live app".into());
        ApplicationRepository::insert(&store, &kept).await.unwrap();

        let filter = ListFilter {
            is_deleted: Some(false),
            ..Default::default()
        };
        let page = ApplicationRepository::list(&store, &filter, None, first_page(10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Kept");
    }

    #[tokio::test]
    async fn test_tag_insert_duplicate() {
        let store = MemoryStore::new();
        TagRepository::insert(&store, &Tag::new("x")).await.unwrap();
        assert!(TagRepository::insert(&store, &Tag::new("x"))
            .await
            .unwrap_err()
            .is_duplicate_key());
    }

    #[tokio::test]
    async fn test_messages_grouped_by_notification() {
        let store = MemoryStore::new();
        let n = Uuid::new_v4();
        MessageRepository::insert(&store, &Message::new(n, "a@x.io".into(), "one".into()))
            .await
            .unwrap();
        MessageRepository::insert(&store, &Message::new(n, "b@x.io".into(), "two".into()))
            .await
            .unwrap();

        let messages = store.list_by_notification(n).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].email, "a@x.io");
        assert!(store.list_by_notification(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
