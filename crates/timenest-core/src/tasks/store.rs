use async_trait::async_trait;

use super::model::{NewTask, Task, TaskUpdate};
use crate::error::TaskStoreError;

/// Remote task collection.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, TaskStoreError>;

    async fn create(&self, task: &NewTask) -> Result<Task, TaskStoreError>;

    async fn update(&self, id: &str, update: &TaskUpdate) -> Result<Task, TaskStoreError>;

    async fn delete(&self, id: &str) -> Result<(), TaskStoreError>;
}
