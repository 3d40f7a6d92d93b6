use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::{Error, Result};

const DRIVE_FILES: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEETS: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<File>,
}

#[derive(Debug, Deserialize)]
pub struct File {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl SpreadsheetMeta {
    pub fn first_sheet(self) -> Option<SheetProperties> {
        self.sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .min_by_key(|properties| properties.index)
    }
}

pub fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(value) => value.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Drive query literal: backslashes and single quotes are escaped.
pub fn drive_query(name: &str) -> String {
    let name = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{name}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false")
}

/// Base URLs of the Drive files and Sheets spreadsheets collections.
#[derive(Clone, Debug)]
pub struct Endpoints {
    drive_files: String,
    spreadsheets: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            drive_files: DRIVE_FILES.to_owned(),
            spreadsheets: SPREADSHEETS.to_owned(),
        }
    }
}

impl Endpoints {
    #[cfg(test)]
    pub fn local(base: &str) -> Self {
        Self {
            drive_files: format!("{base}/drive/v3/files"),
            spreadsheets: format!("{base}/v4/spreadsheets"),
        }
    }

    pub fn files_url(&self, name: &str) -> Result<Url> {
        Ok(Url::parse_with_params(
            &self.drive_files,
            [
                ("q", drive_query(name).as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ],
        )?)
    }

    pub fn spreadsheet_url(&self, spreadsheet_id: &str) -> Result<Url> {
        let mut url = self.spreadsheets_url([spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        Ok(url)
    }

    pub fn batch_update_url(&self, spreadsheet_id: &str) -> Result<Url> {
        self.spreadsheets_url([format!("{spreadsheet_id}:batchUpdate").as_str()])
    }

    pub fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        self.spreadsheets_url([spreadsheet_id, "values", range])
    }

    pub fn update_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        let mut url = self.values_url(spreadsheet_id, range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }

    pub fn append_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        let range = format!("{range}:append");
        let mut url = self.spreadsheets_url([spreadsheet_id, "values", range.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }

    fn spreadsheets_url<'a, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = Url::parse(&self.spreadsheets)?;
        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .extend(segments);
        Ok(url)
    }
}

/// A1 notation with the sheet title always quoted, `'` doubled.
pub fn a1_range(title: &str, range: &str) -> String {
    format!("'{}'!{range}", title.replace('\'', "''"))
}

pub fn rows_body(rows: Vec<Vec<Value>>) -> Value {
    json!({
        "majorDimension": "ROWS",
        "values": rows,
    })
}

/// Shifts rows starting at `index` (1-based) down by one.
pub fn insert_row_body(sheet_id: i64, index: u32) -> Value {
    let start = i64::from(index) - 1;

    json!({
        "requests": [{
            "insertDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": start,
                    "endIndex": start + 1,
                },
                "inheritFromBefore": false,
            }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_query_escaping() {
        assert_eq!(
            drive_query("aws brin 2025"),
            "name = 'aws brin 2025' and mimeType = 'application/vnd.google-apps.spreadsheet' \
             and trashed = false"
        );
        assert!(drive_query(r"it's a\b").starts_with(r"name = 'it\'s a\\b'"));
    }

    #[test]
    fn test_files_url() {
        let url = Endpoints::default().files_url("aws brin 2025").unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/drive/v3/files");
        assert_eq!(pairs[0].0, "q");
        assert_eq!(pairs[0].1, drive_query("aws brin 2025"));
        assert_eq!(pairs[1], ("fields".to_owned(), "files(id,name)".to_owned()));
    }

    #[test]
    fn test_a1_range() {
        assert_eq!(a1_range("Sheet1", "1:1"), "'Sheet1'!1:1");
        assert_eq!(a1_range("Bob's data", "A2:B"), "'Bob''s data'!A2:B");
    }

    #[test]
    fn test_values_urls() {
        let endpoints = Endpoints::default();
        let range = a1_range("Sheet 1", "A1");

        assert_eq!(
            endpoints.values_url("abc", &range).unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'Sheet%201'!A1"
        );
        assert_eq!(
            endpoints.append_url("abc", &range).unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'Sheet%201'!A1:append\
             ?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
        assert_eq!(
            endpoints.update_url("abc", &range).unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'Sheet%201'!A1\
             ?valueInputOption=RAW"
        );
        assert_eq!(
            endpoints.batch_update_url("abc").unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc:batchUpdate"
        );
        assert_eq!(
            endpoints.spreadsheet_url("abc").unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc?fields=sheets.properties"
        );
    }

    #[test]
    fn test_local_endpoints() {
        let endpoints = Endpoints::local("http://127.0.0.1:8080");

        assert_eq!(
            endpoints.spreadsheet_url("abc").unwrap().as_str(),
            "http://127.0.0.1:8080/v4/spreadsheets/abc?fields=sheets.properties"
        );
        assert_eq!(endpoints.files_url("x").unwrap().path(), "/drive/v3/files");
    }

    #[test]
    fn test_first_sheet_is_lowest_index() {
        let meta: SpreadsheetMeta = serde_json::from_value(json!({
            "sheets": [
                { "properties": { "sheetId": 7, "title": "Archive", "index": 1 } },
                { "properties": { "sheetId": 0, "title": "Sheet1", "index": 0 } },
            ]
        }))
        .unwrap();

        assert_eq!(
            meta.first_sheet(),
            Some(SheetProperties {
                sheet_id: 0,
                title: "Sheet1".to_owned(),
                index: 0,
            })
        );
    }

    #[test]
    fn test_no_sheets() {
        let meta: SpreadsheetMeta = serde_json::from_value(json!({})).unwrap();
        assert_eq!(meta.first_sheet(), None);
    }

    #[test]
    fn test_empty_value_range() {
        let range: ValueRange =
            serde_json::from_value(json!({ "range": "Sheet1!A1:Z1", "majorDimension": "ROWS" }))
                .unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&json!("Date")), "Date");
        assert_eq!(cell_to_string(&json!(25.5)), "25.5");
        assert_eq!(cell_to_string(&Value::Null), "");
    }

    #[test]
    fn test_insert_row_body() {
        assert_eq!(
            insert_row_body(0, 1),
            json!({
                "requests": [{
                    "insertDimension": {
                        "range": {
                            "sheetId": 0,
                            "dimension": "ROWS",
                            "startIndex": 0,
                            "endIndex": 1,
                        },
                        "inheritFromBefore": false,
                    }
                }]
            })
        );
    }

    #[test]
    fn test_rows_body() {
        assert_eq!(
            rows_body(vec![vec![json!("01-01-2025"), json!(25.5)]]),
            json!({ "majorDimension": "ROWS", "values": [["01-01-2025", 25.5]] })
        );
    }
}
