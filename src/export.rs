//! Export helpers - curl command rendering and query result files

use crate::models::{QueryExecution, ResultTable, SavedRequest};

/// Format a request as a curl command, one flag per line. The caller passes
/// the final URL so query parameters appear exactly as sent.
pub fn to_curl(request: &SavedRequest, final_url: &str) -> String {
    let mut parts = Vec::new();

    parts.push(format!("curl -X {}", request.method.as_str()));
    parts.push(format!("'{}'", shell_quote(final_url)));

    for header in &request.headers {
        parts.push(format!(
            "-H '{}: {}'",
            shell_quote(&header.key),
            shell_quote(&header.value)
        ));
    }

    if request.method.has_body() && !request.body.is_empty() {
        parts.push(format!("-d '{}'", shell_quote(&request.body)));
    }

    parts.join(" \\\n  ")
}

fn shell_quote(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Render a result table as CSV. Cells containing separators or quotes are
/// quoted per RFC 4180.
pub fn table_to_csv(table: &ResultTable) -> String {
    let mut out = String::new();
    out.push_str(&csv_line(&table.columns));
    for row in &table.rows {
        out.push_str(&csv_line(row));
    }
    out
}

fn csv_line(cells: &[String]) -> String {
    let escaped: Vec<String> = cells
        .iter()
        .map(|c| {
            if c.contains(',') || c.contains('"') || c.contains('\n') {
                format!("\"{}\"", c.replace('"', "\"\""))
            } else {
                c.clone()
            }
        })
        .collect();
    format!("{}\n", escaped.join(","))
}

/// Render a result table as a JSON array of objects keyed by column name.
pub fn table_to_json(table: &ResultTable) -> String {
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let obj: serde_json::Map<String, serde_json::Value> = table
                .columns
                .iter()
                .zip(row.iter())
                .map(|(col, cell)| (col.clone(), serde_json::Value::String(cell.clone())))
                .collect();
            serde_json::Value::Object(obj)
        })
        .collect();
    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| String::from("[]"))
}

/// One-line summary of a query execution for history lists.
pub fn query_summary(entry: &QueryExecution) -> String {
    match (&entry.error, entry.row_count, entry.rows_affected) {
        (Some(e), _, _) => format!("error: {e}"),
        (None, Some(n), _) => format!("{n} rows"),
        (None, None, Some(n)) => format!("{n} affected"),
        _ => String::from("ok"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, KeyValue};

    #[test]
    fn curl_export_carries_method_url_headers_body() {
        let mut req = SavedRequest::default();
        req.method = HttpMethod::POST;
        req.url = String::from("https://api.example.com/users");
        req.headers = vec![KeyValue::new("Content-Type", "application/json")];
        req.body = String::from("{\"name\":\"test\"}");

        let cmd = to_curl(&req, "https://api.example.com/users?page=2");
        assert!(cmd.starts_with("curl -X POST"));
        assert!(cmd.contains("'https://api.example.com/users?page=2'"));
        assert!(cmd.contains("-H 'Content-Type: application/json'"));
        assert!(cmd.contains("-d '{\"name\":\"test\"}'"));
    }

    #[test]
    fn curl_export_skips_body_for_get() {
        let mut req = SavedRequest::default();
        req.url = String::from("https://a");
        req.body = String::from("ignored");
        let cmd = to_curl(&req, "https://a");
        assert!(!cmd.contains("-d"));
    }

    #[test]
    fn csv_quotes_awkward_cells() {
        let table = ResultTable {
            columns: vec![String::from("id"), String::from("note")],
            rows: vec![vec![String::from("1"), String::from("a,b \"c\"")]],
        };
        let csv = table_to_csv(&table);
        assert_eq!(csv, "id,note\n1,\"a,b \"\"c\"\"\"\n");
    }

    #[test]
    fn json_rows_keyed_by_column() {
        let table = ResultTable {
            columns: vec![String::from("id")],
            rows: vec![vec![String::from("7")]],
        };
        let parsed: serde_json::Value = serde_json::from_str(&table_to_json(&table)).unwrap();
        assert_eq!(parsed[0]["id"], "7");
    }
}
