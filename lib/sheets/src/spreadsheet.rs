use std::sync::Arc;

use hyper::Method;
use log::debug;
use serde_json::Value;

use crate::api::{self, SpreadsheetMeta, ValueRange};
use crate::{Client, Error, Result};

pub struct Spreadsheet {
    client: Arc<Client>,
    id: String,
    title: String,
}

impl Spreadsheet {
    pub(crate) fn new(client: Arc<Client>, id: String, title: String) -> Self {
        Self { client, id, title }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The worksheet with the lowest index, i.e. the leftmost tab.
    pub async fn first_worksheet(&self) -> Result<Worksheet> {
        let meta: SpreadsheetMeta = self
            .client
            .get_json(self.client.endpoints().spreadsheet_url(&self.id)?)
            .await?;

        let properties = meta
            .first_sheet()
            .ok_or_else(|| Error::NoWorksheet(self.id.clone()))?;

        debug!(
            "using worksheet {} ({}) of {}",
            properties.title, properties.sheet_id, self.title
        );

        Ok(Worksheet {
            client: self.client.clone(),
            spreadsheet_id: self.id.clone(),
            sheet_id: properties.sheet_id,
            title: properties.title,
        })
    }
}

#[derive(Clone)]
pub struct Worksheet {
    client: Arc<Client>,
    spreadsheet_id: String,
    sheet_id: i64,
    title: String,
}

impl Worksheet {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Cells of `range` (A1 notation without the sheet name) as formatted strings.
    pub async fn values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let range = api::a1_range(&self.title, range);
        let url = self.client.endpoints().values_url(&self.spreadsheet_id, &range)?;
        let body: ValueRange = self.client.get_json(url).await?;

        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(api::cell_to_string).collect())
            .collect())
    }

    /// `row` is 1-based. Trailing empty cells are not returned.
    pub async fn row_values(&self, row: u32) -> Result<Vec<String>> {
        let rows = self.values(&format!("{row}:{row}")).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Inserts a new row at `index` (1-based), shifting existing rows down.
    pub async fn insert_row(&self, values: Vec<Value>, index: u32) -> Result<()> {
        let url = self.client.endpoints().batch_update_url(&self.spreadsheet_id)?;
        let body = api::insert_row_body(self.sheet_id, index);
        self.client.send(Method::POST, url, Some(body)).await?;

        let range = api::a1_range(&self.title, &format!("A{index}"));
        let url = self.client.endpoints().update_url(&self.spreadsheet_id, &range)?;
        self.client
            .send(Method::PUT, url, Some(api::rows_body(vec![values])))
            .await?;

        Ok(())
    }

    /// Appends a row after the last row of the table that starts at A1.
    pub async fn append_row(&self, values: Vec<Value>) -> Result<()> {
        let range = api::a1_range(&self.title, "A1");
        let url = self.client.endpoints().append_url(&self.spreadsheet_id, &range)?;
        self.client
            .send(Method::POST, url, Some(api::rows_body(vec![values])))
            .await?;

        Ok(())
    }
}
