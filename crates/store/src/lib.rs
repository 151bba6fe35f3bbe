pub mod json_file;

pub use json_file::JsonFileStore;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use models::{BidRecord, CallRecord, InventoryRecord, UserProfile};

// Logical collection names.
pub const CALLS: &str = "calls";
pub const INVENTORY: &str = "inventory";
pub const BIDS: &str = "bids";
pub const USERS: &str = "users";

pub const COLLECTIONS: [&str; 4] = [CALLS, INVENTORY, BIDS, USERS];

/// A flat document store: named collections of JSON documents keyed by a
/// string `id` field. Constructed by the process entry point and passed in
/// wherever it's needed.
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, in stored order.
    fn list(&self, collection: &str) -> Result<Vec<Value>>;

    /// Deletes every document in a collection; returns how many were removed.
    fn clear(&self, collection: &str) -> Result<usize>;

    /// Appends documents to a collection in one write.
    fn insert_many(&self, collection: &str, docs: Vec<Value>) -> Result<()>;

    /// Inserts or replaces the document with the given id.
    fn put(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Looks up a document by id.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;
}

/// Records that receive a store-assigned identifier on import.
pub trait Identified {
    fn set_id(&mut self, id: String);
}

impl Identified for CallRecord {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identified for InventoryRecord {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identified for BidRecord {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Replaces the whole contents of a collection with freshly decoded records.
///
/// Ordering matters and is part of the contract: (a) existing documents are
/// deleted, (b) ids `"1"..="N"` are assigned in record order, (c) the new
/// records are inserted in one bulk write. Ids are recomputed on every
/// import. The clear and the insert are separately durable, so a crash
/// between them leaves the collection empty; that is the accepted failure
/// mode of an import.
pub fn replace_collection<T>(
    store: &dyn DocumentStore,
    collection: &str,
    mut records: Vec<T>,
) -> Result<usize>
where
    T: Serialize + Identified,
{
    store.clear(collection)?;

    for (index, record) in records.iter_mut().enumerate() {
        record.set_id((index + 1).to_string());
    }

    let docs = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let count = docs.len();
    store.insert_many(collection, docs)?;
    Ok(count)
}

/// Loads a collection into typed records, skipping documents that no longer
/// decode (the store enforces no schema, so stale shapes are possible).
pub fn load_records<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<T>> {
    Ok(store
        .list(collection)?
        .into_iter()
        .filter_map(|doc| serde_json::from_value(doc).ok())
        .collect())
}

pub fn load_calls(store: &dyn DocumentStore) -> Result<Vec<CallRecord>> {
    load_records(store, CALLS)
}

pub fn load_inventory(store: &dyn DocumentStore) -> Result<Vec<InventoryRecord>> {
    load_records(store, INVENTORY)
}

pub fn load_bids(store: &dyn DocumentStore) -> Result<Vec<BidRecord>> {
    load_records(store, BIDS)
}

pub fn load_users(store: &dyn DocumentStore) -> Result<Vec<UserProfile>> {
    load_records(store, USERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn call(month: &str, center: &str, total: i64) -> CallRecord {
        CallRecord {
            month: month.to_string(),
            center: center.to_string(),
            total_calls: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_twice_leaves_only_second_set() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let set_a = vec![
            call("May", "North", 100),
            call("May", "South", 50),
            call("June", "North", 80),
        ];
        replace_collection(&store, CALLS, set_a).unwrap();

        let set_b = vec![call("July", "East", 10), call("July", "West", 20)];
        replace_collection(&store, CALLS, set_b).unwrap();

        let calls = load_calls(&store).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "1");
        assert_eq!(calls[1].id, "2");
        assert_eq!(calls[0].center, "East");
        assert_eq!(calls[1].center, "West");
    }

    #[test]
    fn test_ids_assigned_in_record_order() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let records: Vec<CallRecord> = (0..5).map(|i| call("May", &format!("SC{i}"), i)).collect();
        let count = replace_collection(&store, CALLS, records).unwrap();
        assert_eq!(count, 5);

        let ids: Vec<String> = load_calls(&store).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_load_records_skips_undecodable_documents() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store
            .insert_many(
                USERS,
                vec![
                    serde_json::json!({"uid": "u1", "email": "a@b.c", "roles": ["csd"]}),
                    serde_json::json!("not a user document"),
                ],
            )
            .unwrap();

        let users = load_users(&store).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].uid, "u1");
    }
}
