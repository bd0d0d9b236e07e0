use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::kv::KeyValueStore;
use super::seed::merge_with_seed;
use super::types::{Document, DocumentPatch, NewDocument};
use crate::core::errors::ApiError;

/// Ordered document collection backed by a key-value namespace.
///
/// The whole collection is serialized on every mutation. The write lock is
/// held across the persist call so concurrent edits reach storage in the order
/// they were applied.
#[derive(Clone)]
pub struct DocumentStore {
    kv: Arc<dyn KeyValueStore>,
    namespace_key: Arc<str>,
    documents: Arc<RwLock<Vec<Document>>>,
}

impl DocumentStore {
    /// Reads the persisted collection, merges it behind `seed`, and writes
    /// the merged result back.
    pub async fn load(
        kv: Arc<dyn KeyValueStore>,
        namespace_key: &str,
        seed: Vec<Document>,
    ) -> Result<Self, ApiError> {
        let persisted = match kv.get(namespace_key).await? {
            Some(raw) => match serde_json::from_str::<Vec<Document>>(&raw) {
                Ok(docs) => docs,
                Err(err) => {
                    tracing::warn!(
                        "Ignoring unreadable document collection under '{}': {}",
                        namespace_key,
                        err
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let merged = merge_with_seed(seed, persisted);
        tracing::info!(
            "Loaded {} documents from '{}' ({} backend)",
            merged.len(),
            namespace_key,
            kv.name()
        );

        let store = Self {
            kv,
            namespace_key: Arc::from(namespace_key),
            documents: Arc::new(RwLock::new(Vec::new())),
        };
        store.persist(&merged).await?;
        *store.documents.write().await = merged;
        Ok(store)
    }

    pub fn backend_name(&self) -> &str {
        self.kv.name()
    }

    pub async fn list(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        self.documents
            .read()
            .await
            .iter()
            .find(|doc| doc.id == id)
            .cloned()
    }

    pub async fn add(&self, new_doc: NewDocument) -> Result<Document, ApiError> {
        let mut added = self.add_many(vec![new_doc]).await?;
        added
            .pop()
            .ok_or_else(|| ApiError::internal("Document was not added"))
    }

    /// Adds the whole batch or none of it. Names are checked before anything
    /// is touched, and one persist covers every new document.
    pub async fn add_many(&self, new_docs: Vec<NewDocument>) -> Result<Vec<Document>, ApiError> {
        if new_docs.iter().any(|doc| doc.name.trim().is_empty()) {
            return Err(ApiError::BadRequest("Document name is required".to_string()));
        }
        if new_docs.is_empty() {
            return Ok(Vec::new());
        }

        let mut documents = self.documents.write().await;
        let original_len = documents.len();
        let mut added = Vec::with_capacity(new_docs.len());

        for new_doc in new_docs {
            let id = match new_doc.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => {
                    if documents.iter().any(|doc| doc.id == id) {
                        documents.truncate(original_len);
                        return Err(ApiError::Conflict(format!(
                            "Document with id '{}' already exists",
                            id
                        )));
                    }
                    id.to_string()
                }
                _ => next_timestamp_id(&documents),
            };

            let document = Document {
                id,
                name: new_doc.name,
                content: new_doc.content,
                format: new_doc.format,
                category: new_doc.category.filter(|c| !c.trim().is_empty()),
                uploaded_at: Utc::now(),
            };
            documents.push(document.clone());
            added.push(document);
        }

        if let Err(err) = self.persist(&documents).await {
            documents.truncate(original_len);
            return Err(err);
        }

        for document in &added {
            tracing::info!("Added document '{}' ({})", document.name, document.id);
        }
        Ok(added)
    }

    pub async fn update(&self, id: &str, patch: DocumentPatch) -> Result<Document, ApiError> {
        let mut documents = self.documents.write().await;
        let index = documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Document '{}' not found", id)))?;

        if let Some(name) = patch.name.as_deref() {
            if name.trim().is_empty() {
                return Err(ApiError::BadRequest("Document name cannot be empty".to_string()));
            }
        }

        let previous = documents[index].clone();
        let doc = &mut documents[index];
        if let Some(name) = patch.name {
            doc.name = name;
        }
        if let Some(content) = patch.content {
            doc.content = content;
        }
        if let Some(category) = patch.category {
            doc.category = Some(category).filter(|c| !c.trim().is_empty());
        }
        let updated = doc.clone();

        if let Err(err) = self.persist(&documents).await {
            documents[index] = previous;
            return Err(err);
        }

        tracing::info!("Updated document '{}'", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let mut documents = self.documents.write().await;
        let Some(index) = documents.iter().position(|doc| doc.id == id) else {
            return Ok(false);
        };

        let removed = documents.remove(index);
        if let Err(err) = self.persist(&documents).await {
            documents.insert(index, removed);
            return Err(err);
        }

        tracing::info!("Deleted document '{}'", id);
        Ok(true)
    }

    async fn persist(&self, documents: &[Document]) -> Result<(), ApiError> {
        let raw = serde_json::to_string(documents).map_err(ApiError::internal)?;
        self.kv.set(&self.namespace_key, &raw).await
    }
}

/// Millisecond timestamp, bumped past any id already taken.
fn next_timestamp_id(documents: &[Document]) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    while documents.iter().any(|doc| doc.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::kv::MemoryKeyValueStore;
    use crate::knowledge::types::DocumentFormat;
    use async_trait::async_trait;

    const KEY: &str = "hr_docs";

    fn seed_doc(id: &str, content: &str) -> Document {
        Document {
            id: id.to_string(),
            name: format!("Seed {}", id),
            content: content.to_string(),
            format: DocumentFormat::Txt,
            category: None,
            uploaded_at: Utc::now(),
        }
    }

    fn new_doc(name: &str, content: &str) -> NewDocument {
        NewDocument {
            name: name.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    async fn persisted_ids(kv: &MemoryKeyValueStore) -> Vec<String> {
        let raw = kv.get(KEY).await.unwrap().unwrap();
        serde_json::from_str::<Vec<Document>>(&raw)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect()
    }

    #[tokio::test]
    async fn load_merges_with_seed_and_writes_back() {
        let kv = MemoryKeyValueStore::new();
        let persisted = vec![seed_doc("A", "Y"), seed_doc("B", "Z")];
        kv.set(KEY, &serde_json::to_string(&persisted).unwrap())
            .await
            .unwrap();

        let store = DocumentStore::load(Arc::new(kv.clone()), KEY, vec![seed_doc("A", "X")])
            .await
            .unwrap();

        let docs = store.list().await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "X");
        assert_eq!(docs[1].content, "Z");
        assert_eq!(persisted_ids(&kv).await, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn load_ignores_unreadable_persisted_value() {
        let kv = MemoryKeyValueStore::new();
        kv.set(KEY, "not json").await.unwrap();

        let store = DocumentStore::load(Arc::new(kv), KEY, vec![seed_doc("A", "X")])
            .await
            .unwrap();

        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn add_generates_unique_ids_and_persists_in_order() {
        let kv = MemoryKeyValueStore::new();
        let store = DocumentStore::load(Arc::new(kv.clone()), KEY, Vec::new())
            .await
            .unwrap();

        let first = store.add(new_doc("One", "1")).await.unwrap();
        let second = store.add(new_doc("Two", "2")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(persisted_ids(&kv).await, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_and_blank_input() {
        let store = DocumentStore::load(
            Arc::new(MemoryKeyValueStore::new()),
            KEY,
            vec![seed_doc("A", "X")],
        )
        .await
        .unwrap();

        let duplicate = NewDocument {
            id: Some("A".to_string()),
            ..new_doc("Dup", "d")
        };
        assert!(matches!(store.add(duplicate).await, Err(ApiError::Conflict(_))));
        assert!(matches!(
            store.add(new_doc("  ", "d")).await,
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn update_edits_in_place_and_delete_removes() {
        let kv = MemoryKeyValueStore::new();
        let store = DocumentStore::load(
            Arc::new(kv.clone()),
            KEY,
            vec![seed_doc("A", "X"), seed_doc("B", "Y")],
        )
        .await
        .unwrap();

        let updated = store
            .update(
                "A",
                DocumentPatch {
                    content: Some("X2".to_string()),
                    category: Some("Legal".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "X2");
        assert_eq!(updated.category.as_deref(), Some("Legal"));
        assert_eq!(store.list().await[0].id, "A");

        assert!(store.delete("A").await.unwrap());
        assert!(!store.delete("A").await.unwrap());
        assert_eq!(persisted_ids(&kv).await, vec!["B"]);

        let missing = store.update("A", DocumentPatch::default()).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn batch_add_is_all_or_nothing() {
        let kv = MemoryKeyValueStore::new();
        let store = DocumentStore::load(Arc::new(kv.clone()), KEY, vec![seed_doc("A", "X")])
            .await
            .unwrap();

        let clashing = vec![
            new_doc("remote.txt", "Hybrid is 3 days office."),
            NewDocument {
                id: Some("A".to_string()),
                ..new_doc("clash.txt", "c")
            },
        ];
        assert!(matches!(store.add_many(clashing).await, Err(ApiError::Conflict(_))));

        let blank_name = vec![new_doc("ok.txt", "o"), new_doc(" ", "b")];
        assert!(matches!(
            store.add_many(blank_name).await,
            Err(ApiError::BadRequest(_))
        ));

        assert_eq!(store.count().await, 1);
        assert_eq!(persisted_ids(&kv).await, vec!["A"]);

        let added = store
            .add_many(vec![new_doc("one.txt", "1"), new_doc("two.txt", "2")])
            .await
            .unwrap();
        assert_eq!(added.len(), 2);
        assert_ne!(added[0].id, added[1].id);
        assert_eq!(
            persisted_ids(&kv).await,
            vec!["A".to_string(), added[0].id.clone(), added[1].id.clone()]
        );
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, ApiError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), ApiError> {
            Err(ApiError::internal("disk full"))
        }
    }

    #[tokio::test]
    async fn failed_write_rolls_back_mutation() {
        let store = DocumentStore {
            kv: Arc::new(FailingStore),
            namespace_key: Arc::from(KEY),
            documents: Arc::new(RwLock::new(vec![seed_doc("A", "X")])),
        };

        assert!(store.add(new_doc("New", "n")).await.is_err());
        assert!(store
            .add_many(vec![new_doc("B1", "b"), new_doc("B2", "b")])
            .await
            .is_err());
        assert!(store.delete("A").await.is_err());
        assert!(store
            .update(
                "A",
                DocumentPatch {
                    content: Some("changed".to_string()),
                    ..Default::default()
                }
            )
            .await
            .is_err());

        let docs = store.list().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "X");
    }
}
