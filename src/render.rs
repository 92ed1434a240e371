use askama::Template;

use crate::models::Entry;

pub const EMPTY_PLACEHOLDER: &str = "No entries yet — be the first!";

/// Replace `& < > " '` with their entity forms.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

struct EntryItem {
    name: String,
    created_at: String,
    message: String,
}

impl From<&Entry> for EntryItem {
    fn from(entry: &Entry) -> Self {
        Self {
            name: escape_html(&entry.name),
            created_at: escape_html(&entry.created_at.to_local_string()),
            message: escape_html(&entry.message),
        }
    }
}

// Fields are escaped by `escape_html` before they reach the template
#[derive(Template)]
#[template(path = "entries/list.html", escape = "none")]
struct EntryListTemplate {
    items: Vec<EntryItem>,
    placeholder: &'static str,
}

/// Render the children of the entry list container, one `<li>` per entry.
pub fn render_entries(entries: &[Entry]) -> Result<String, askama::Error> {
    let template = EntryListTemplate {
        items: entries.iter().map(EntryItem::from).collect(),
        placeholder: EMPTY_PLACEHOLDER,
    };
    template.render()
}
