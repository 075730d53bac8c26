//! Form page generation
//!
//! Renders the introspected schema as one page: a tab strip with one tab per
//! table, and per tab a form with one labeled input per column plus the
//! Insert/View/Update/Delete buttons. Behaviour lives in `assets/forms.js`.

use std::fmt::Write;

use crate::schema::{Notice, TableSchema, TablesResponse};

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(character),
        }
    }
    escaped
}

/// Render the whole form page
pub fn render_page(title: &str, response: &TablesResponse) -> String {
    let title = escape_html(title);
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="assets/forms.css">
</head>
<body>
    <header><h1>{title}</h1></header>
    <main class="notebook">
"#
    );

    if response.tables.is_empty() {
        html.push_str("        <p class=\"empty\">No tables found.</p>\n");
    } else {
        render_tab_strip(&mut html, &response.tables);
        for (index, table) in response.tables.iter().enumerate() {
            render_table_form(&mut html, index, table);
        }
    }

    html.push_str("    </main>\n");

    for notice in &response.notices {
        render_notice(&mut html, notice);
    }

    html.push_str(
        r#"    <dialog id="notice-dialog" class="notice">
        <h2 class="notice-title"></h2>
        <p class="notice-message"></p>
        <form method="dialog"><button>OK</button></form>
    </dialog>
    <dialog id="records-dialog" class="records">
        <h2 class="records-title"></h2>
        <div class="records-body"></div>
        <form method="dialog"><button>Close</button></form>
    </dialog>
    <script src="assets/forms.js"></script>
</body>
</html>
"#,
    );

    html
}

fn render_tab_strip(html: &mut String, tables: &[TableSchema]) {
    html.push_str("        <nav class=\"tabs\" role=\"tablist\">\n");
    for (index, table) in tables.iter().enumerate() {
        let _ = writeln!(
            html,
            "            <button type=\"button\" class=\"tab\" role=\"tab\" data-tab=\"{index}\" aria-selected=\"{}\">{}</button>",
            index == 0,
            escape_html(&table.name)
        );
    }
    html.push_str("        </nav>\n");
}

fn render_table_form(html: &mut String, index: usize, table: &TableSchema) {
    let name = escape_html(&table.name);
    let hidden = if index == 0 { "" } else { " hidden" };

    let _ = writeln!(
        html,
        "        <section class=\"tab-panel\" role=\"tabpanel\" data-panel=\"{index}\" data-table=\"{name}\"{hidden}>"
    );
    html.push_str("            <form class=\"record-form\" autocomplete=\"off\">\n");

    for (column_index, column) in table.columns.iter().enumerate() {
        let column_name = escape_html(&column.name);
        let _ = writeln!(
            html,
            "                <label for=\"field-{index}-{column_index}\" title=\"{}\">{column_name}</label>\n                <input id=\"field-{index}-{column_index}\" name=\"{column_name}\" type=\"text\">",
            escape_html(&column.data_type)
        );
    }

    html.push_str(
        r#"                <div class="buttons">
                    <button type="button" data-action="insert">Insert</button>
                    <button type="button" data-action="view">View</button>
                    <button type="button" data-action="update">Update</button>
                    <button type="button" data-action="delete">Delete</button>
                </div>
            </form>
        </section>
"#,
    );
}

/// Notices known at render time are shown as already-open dialogs
fn render_notice(html: &mut String, notice: &Notice) {
    let _ = writeln!(
        html,
        "    <dialog class=\"notice startup-notice\" open>\n        <h2>{}</h2>\n        <p>{}</p>\n        <form method=\"dialog\"><button>OK</button></form>\n    </dialog>",
        escape_html(&notice.title),
        escape_html(&notice.message)
    );
}
