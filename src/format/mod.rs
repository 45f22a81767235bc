//! Output formatting for response trees and regions (JSON, compact JSON, table).

use crate::api::{Region, ResponseTree};
use crate::config::OutputFormat;

/// Formats command results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a response tree.
    pub fn format_tree(&self, tree: &ResponseTree) -> String {
        match self.format {
            OutputFormat::Json => tree.to_json_pretty(),
            OutputFormat::Compact => tree.to_json(),
            OutputFormat::Table => self.table_tree(tree),
        }
    }

    /// Formats the cached region list.
    pub fn format_regions(&self, regions: &[Region]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(regions).unwrap_or_else(|_| "[]".to_string()),
            OutputFormat::Compact => serde_json::to_string(regions).unwrap_or_else(|_| "[]".to_string()),
            OutputFormat::Table if regions.is_empty() => "No regions found.".to_string(),
            OutputFormat::Table => self.table_regions(regions),
        }
    }

    /// Formats a signing breakdown.
    pub fn format_signature(&self, string_to_sign: &str, signature: &str) -> String {
        match self.format {
            OutputFormat::Table => {
                format!("String to sign:\n{}\n\nSignature: {}", string_to_sign, signature)
            }
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "string_to_sign": string_to_sign,
                "signature": signature,
            }))
            .unwrap_or_else(|_| "{}".to_string()),
            OutputFormat::Compact => serde_json::json!({
                "string_to_sign": string_to_sign,
                "signature": signature,
            })
            .to_string(),
        }
    }

    // Table formatting

    fn table_tree(&self, tree: &ResponseTree) -> String {
        let mut rows = Vec::new();
        flatten("", tree, &mut rows);

        let width = rows.iter().map(|(path, _)| path.len()).max().unwrap_or(0);
        rows.iter()
            .map(|(path, value)| format!("{:<width$}  {}", path, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table_regions(&self, regions: &[Region]) -> String {
        let id_width = column_width("Region", regions.iter().map(|r| r.region_id.as_str()));
        let name_width = column_width("Name", regions.iter().map(|r| r.region_name.as_str()));
        let hv_width = column_width("Hypervisor", regions.iter().map(|r| r.hypervisor.as_str()));
        let net_width = column_width("Network", regions.iter().map(|r| r.network_mode.as_str()));

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<id_width$}  {:<name_width$}  {:<hv_width$}  {:<net_width$}  {}",
            "Region", "Name", "Hypervisor", "Network", "Endpoint"
        ));
        lines.push(format!(
            "{:-<id_width$}  {:-<name_width$}  {:-<hv_width$}  {:-<net_width$}  {:-<8}",
            "", "", "", "", ""
        ));

        for region in regions {
            lines.push(format!(
                "{:<id_width$}  {:<name_width$}  {:<hv_width$}  {:<net_width$}  {}",
                region.region_id,
                region.region_name,
                or_dash(&region.hypervisor),
                or_dash(&region.network_mode),
                or_dash(&region.region_endpoint)
            ));
        }

        lines.join("\n")
    }
}

/// Flattens a tree into `path value` rows; array elements are addressed as `[i]`.
fn flatten(prefix: &str, tree: &ResponseTree, rows: &mut Vec<(String, String)>) {
    match tree {
        ResponseTree::Text(text) => rows.push((prefix.to_string(), text.clone())),
        ResponseTree::Array(items) if items.is_empty() => rows.push((prefix.to_string(), "[]".to_string())),
        ResponseTree::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, i), item, rows);
            }
        }
        ResponseTree::Object(fields) if fields.is_empty() => {
            rows.push((prefix.to_string(), "{}".to_string()))
        }
        ResponseTree::Object(fields) => {
            for (key, value) in fields {
                let path = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
                flatten(&path, value, rows);
            }
        }
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(str::len).chain(std::iter::once(header.len())).max().unwrap_or(0)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
