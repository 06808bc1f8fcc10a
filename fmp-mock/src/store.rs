use async_trait::async_trait;
use fmp_core::{FmpError, Persistence, Table};
use tokio::sync::Mutex;

/// In-memory [`Persistence`] that records every write.
#[derive(Default)]
pub struct MemoryStore {
    writes: Mutex<Vec<(String, Table)>>,
    fail_with: Option<String>,
}

impl MemoryStore {
    /// Store that accepts every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes always fail with `Persistence(msg)`.
    #[must_use]
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            writes: Mutex::default(),
            fail_with: Some(msg.into()),
        }
    }

    /// All writes in order.
    pub async fn writes(&self) -> Vec<(String, Table)> {
        self.writes.lock().await.clone()
    }

    /// Names written, in order.
    pub async fn table_names(&self) -> Vec<String> {
        self.writes
            .lock()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Most recent table written under `name`.
    pub async fn table(&self, name: &str) -> Option<Table> {
        self.writes
            .lock()
            .await
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.clone())
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn write_table(&self, table_name: &str, table: &Table) -> Result<(), FmpError> {
        if let Some(msg) = &self.fail_with {
            return Err(FmpError::Persistence(msg.clone()));
        }
        self.writes
            .lock()
            .await
            .push((table_name.to_string(), table.clone()));
        Ok(())
    }
}
