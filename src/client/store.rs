use tracing::warn;
use uuid::Uuid;

use super::{ApiClient, ClientError, Resource};

/// Local copy of one resource collection.
///
/// Writes are pessimistic: the cached items change only after the server
/// confirms. A failed call leaves the last good snapshot readable.
pub struct EntityStore<R: Resource> {
    client: ApiClient,
    items: Vec<R>,
    loaded: bool,
}

impl<R: Resource> EntityStore<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            items: Vec::new(),
            loaded: false,
        }
    }

    /// Replaces the snapshot with the server's list.
    pub async fn fetch(&mut self) -> Result<&[R], ClientError> {
        match self.client.get::<Vec<R>>(R::PATH).await {
            Ok(items) => {
                self.items = items;
                self.loaded = true;
                Ok(&self.items)
            }
            Err(e) => {
                warn!(path = R::PATH, error = %e, "fetch failed, keeping cached snapshot");
                Err(e)
            }
        }
    }

    pub async fn create(&mut self, payload: &R::Create) -> Result<R, ClientError> {
        let created: R = self.client.post(R::PATH, payload).await?;
        self.items.push(created.clone());
        Ok(created)
    }

    pub async fn update(&mut self, id: Uuid, payload: &R::Update) -> Result<R, ClientError> {
        let path = format!("{}/{}", R::PATH, id);
        let updated: R = self.client.put(&path, payload).await?;
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.items.push(updated.clone()),
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        let path = format!("{}/{}", R::PATH, id);
        self.client.delete(&path).await?;
        self.items.retain(|item| item.id() != id);
        Ok(())
    }

    /// Last confirmed state. Empty until the first successful fetch or write.
    pub fn snapshot(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}
