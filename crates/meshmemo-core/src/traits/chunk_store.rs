use crate::errors::MeshResult;
use crate::models::Chunk;

/// Read-only view over a durable chunk store.
pub trait IChunkStore: Send + Sync {
    fn list(&self) -> MeshResult<Vec<Chunk>>;
    fn get(&self, id: &str) -> MeshResult<Option<Chunk>>;

    fn len(&self) -> MeshResult<usize> {
        Ok(self.list()?.len())
    }

    fn is_empty(&self) -> MeshResult<bool> {
        Ok(self.len()? == 0)
    }
}
