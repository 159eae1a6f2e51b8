use {
    anyhow::{anyhow, bail, Context},
    serde::Deserialize,
    serde_json::Value,
};

use super::Row;
use crate::RepertoireError;

// The spreadsheet "gviz" response. The JSON object arrives wrapped in a
// JavaScript callback, e.g. `/*O_o*/ google.visualization.Query.setResponse({...});`.
#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ResponseError>,
    #[serde(default)]
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detailed_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Table {
    #[serde(default)]
    rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    c: Vec<Option<Cell>>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: Option<Value>,
}

// Extracts the table rows. A `null` cell, or one without a value, becomes
// `Value::Null`.
pub fn parse_gviz(text: &str) -> Result<Vec<Row>, RepertoireError> {
    let start = text
        .find('{')
        .ok_or_else(|| anyhow!("no JSON object in spreadsheet response"))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| anyhow!("unterminated JSON object in spreadsheet response"))?;

    let response: Response = serde_json::from_str(&text[start..=end])
        .with_context(|| "failed to parse spreadsheet response")?;

    if response.status.as_deref() == Some("error") {
        let reason = response
            .errors
            .iter()
            .filter_map(|e| e.detailed_message.as_ref().or(e.message.as_ref()))
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        bail!("spreadsheet query failed: {reason}");
    }

    let table = response
        .table
        .ok_or_else(|| anyhow!("spreadsheet response has no table"))?;

    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.c
                .into_iter()
                .map(|cell| cell.and_then(|c| c.v).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const RESPONSE: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","reqId":"0","status":"ok","sig":"1","table":{"cols":[{"id":"A","label":"","type":"number"},{"id":"B","label":"","type":"string"}],"rows":[{"c":[{"v":1.0,"f":"1"},{"v":"Ave Maria"},null]},{"c":[{"v":2.0},{"v":null},{"v":"Gloria {draft}"}]}],"parsedNumHeaders":0}});"#;

    #[test]
    fn test_parse_wrapped_response() {
        let rows = parse_gviz(RESPONSE).expect("valid response");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![json!(1.0), json!("Ave Maria"), Value::Null]);
        assert_eq!(rows[1], vec![json!(2.0), Value::Null, json!("Gloria {draft}")]);
    }

    #[test]
    fn test_error_response() {
        let text = r#"setResponse({"status":"error","errors":[{"reason":"invalid_query","message":"INVALID_QUERY","detailed_message":"Invalid query"}]});"#;
        let err = parse_gviz(text).expect_err("error status");

        assert!(err.to_string().contains("Invalid query"), "{err}");
    }

    #[test]
    fn test_garbage_response() {
        assert!(parse_gviz("<html>Sign in</html>").is_err());
        assert!(parse_gviz("} {").is_err());
    }
}
