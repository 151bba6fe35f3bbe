use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::{COLLECTIONS, DocumentStore};

/// File-backed implementation: one `database.json` holding every collection
/// as a top-level array. Each mutation rewrites the whole file; volumes are
/// hundreds of rows, so read-modify-write is fine here.
pub struct JsonFileStore {
    database_path: PathBuf,
}

impl JsonFileStore {
    /// Accepts either a path to the json file or a directory (which resolves
    /// to `database.json` inside it).
    pub fn new<P: AsRef<Path>>(database_path: P) -> Self {
        let path = database_path.as_ref();
        let database_path =
            if path.is_dir() || (!path.exists() && !path.to_string_lossy().ends_with(".json")) {
                path.join("database.json")
            } else {
                path.to_path_buf()
            };
        Self { database_path }
    }

    pub fn path(&self) -> &Path {
        &self.database_path
    }

    /// Makes sure the database file exists and is valid JSON, initializing an
    /// empty structure otherwise.
    pub fn ensure_exists(&self) -> Result<()> {
        let needs_initialization = match File::open(&self.database_path) {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents)?;
                serde_json::from_str::<Value>(&contents).is_err()
            }
            Err(_) => true,
        };

        if needs_initialization {
            self.write(&empty_database())?;
        }
        Ok(())
    }

    fn read(&self) -> Result<Value> {
        self.ensure_exists()?;

        let mut file = File::open(&self.database_path)
            .with_context(|| format!("Cannot open database at {}", self.database_path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        serde_json::from_str(&contents).with_context(|| {
            format!("Database at {} is not valid JSON", self.database_path.display())
        })
    }

    fn write(&self, database: &Value) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&self.database_path).with_context(|| {
            format!("Cannot create database file at {}", self.database_path.display())
        })?;
        let formatted = serde_json::to_string_pretty(database)?;
        file.write_all(formatted.as_bytes())?;
        Ok(())
    }
}

fn empty_database() -> Value {
    let mut db = serde_json::Map::new();
    for collection in COLLECTIONS {
        db.insert(collection.to_string(), Value::Array(vec![]));
    }
    Value::Object(db)
}

fn collection_array<'a>(database: &'a mut Value, collection: &str) -> Result<&'a mut Vec<Value>> {
    // Collections spring into existence on first touch, like a document DB.
    let obj = database
        .as_object_mut()
        .ok_or_else(|| anyhow!("database root is not an object"))?;
    obj.entry(collection.to_string())
        .or_insert_with(|| Value::Array(vec![]))
        .as_array_mut()
        .ok_or_else(|| anyhow!("collection '{}' is not an array", collection))
}

impl DocumentStore for JsonFileStore {
    fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let database = self.read()?;
        Ok(database
            .get(collection)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    fn clear(&self, collection: &str) -> Result<usize> {
        let mut database = self.read()?;
        let arr = collection_array(&mut database, collection)?;
        let removed = arr.len();
        arr.clear();
        self.write(&database)?;
        Ok(removed)
    }

    fn insert_many(&self, collection: &str, docs: Vec<Value>) -> Result<()> {
        let mut database = self.read()?;
        let arr = collection_array(&mut database, collection)?;
        arr.extend(docs);
        self.write(&database)
    }

    fn put(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut database = self.read()?;
        let arr = collection_array(&mut database, collection)?;

        let existing = arr.iter_mut().find(|d| {
            d.get("id")
                .or_else(|| d.get("uid"))
                .and_then(|v| v.as_str())
                .map(|s| s == id)
                .unwrap_or(false)
        });

        match existing {
            Some(slot) => *slot = doc,
            None => arr.push(doc),
        }
        self.write(&database)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self.list(collection)?.into_iter().find(|d| {
            d.get("id")
                .or_else(|| d.get("uid"))
                .and_then(|v| v.as_str())
                .map(|s| s == id)
                .unwrap_or(false)
        }))
    }
}
