use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use sheets::Worksheet;
use station::{DedupKey, HEADER};

#[cfg(test)]
use mockall::automock;

/// Remote table the readings are appended to.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Cells of the first row.
    async fn header(&self) -> sheets::Result<Vec<String>>;

    /// Inserts `header` above the first row.
    async fn insert_header(&self, header: Vec<String>) -> sheets::Result<()>;

    async fn append_row(&self, row: Vec<Value>) -> sheets::Result<()>;

    /// Date and time of every saved row, oldest first.
    async fn recorded_keys(&self) -> sheets::Result<Vec<DedupKey>>;
}

#[async_trait]
impl TabularStore for Worksheet {
    async fn header(&self) -> sheets::Result<Vec<String>> {
        self.row_values(1).await
    }

    async fn insert_header(&self, header: Vec<String>) -> sheets::Result<()> {
        self.insert_row(header.into_iter().map(Value::from).collect(), 1)
            .await
    }

    async fn append_row(&self, row: Vec<Value>) -> sheets::Result<()> {
        Worksheet::append_row(self, row).await
    }

    async fn recorded_keys(&self) -> sheets::Result<Vec<DedupKey>> {
        let rows = self.values("A2:B").await?;
        Ok(keys_from_rows(&rows))
    }
}

fn keys_from_rows(rows: &[Vec<String>]) -> Vec<DedupKey> {
    rows.iter()
        .filter_map(|row| match row.as_slice() {
            [date, time, ..] if !date.is_empty() && !time.is_empty() => {
                Some(DedupKey::new(date, time))
            }
            _ => None,
        })
        .collect()
}

/// Writes the column names into the first row unless it already holds at
/// least as many cells as there are columns. Returns whether it did.
pub async fn provision_header<S>(store: &S) -> sheets::Result<bool>
where
    S: TabularStore + ?Sized,
{
    let current = store.header().await?;
    let populated = current.iter().filter(|cell| !cell.trim().is_empty()).count();

    if populated >= HEADER.len() {
        debug!("header is present: {current:?}");
        return Ok(false);
    }

    info!("header has {populated} cells, inserting {HEADER:?}");

    let header = HEADER.iter().map(|name| name.to_string()).collect();
    store.insert_header(header).await?;

    Ok(true)
}
