use super::attributes::AttributeSet;

pub fn escape(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }
    res
}

/// Key/value table the map page drops next to the parcel outline.
pub fn attributes_table(source_name: &str, attributes: &AttributeSet) -> String {
    let rows: String = attributes
        .iter()
        .map(|(k, v)| format!("<tr><td><b>{}</b></td><td>{}</td></tr>", escape(k), escape(v)))
        .collect();
    format!(
        "<p><b>MPZP ({})</b></p><table border='1' cellpadding='4' cellspacing='0'><tbody>{rows}</tbody></table>",
        escape(source_name)
    )
}
