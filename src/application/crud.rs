use async_trait::async_trait;

/// Create/read/update/delete over an entity type `T` keyed by `ID`
#[async_trait]
pub trait CrudService<T, ID>: Send + Sync
where
    T: Send + 'static,
    ID: Send + Sync + 'static,
{
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a new entity. Fails if it already carries an id.
    async fn create(&self, entity: T) -> Result<T, Self::Error>;

    /// Replace the entity stored under `id`. Fails if `id` is not stored.
    async fn update(&self, id: &ID, entity: T) -> Result<T, Self::Error>;

    async fn get_by_id(&self, id: &ID) -> Result<T, Self::Error>;

    async fn get_all(&self) -> Result<Vec<T>, Self::Error>;

    /// Remove the entity and return it
    async fn delete(&self, id: &ID) -> Result<T, Self::Error>;
}
