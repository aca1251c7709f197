//! HTML listing of a directory's entries.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
}

/// Formats a size column the way directory listings usually show it.
///
/// ```
/// # use tinyserve::http::directory::format_size;
/// assert_eq!(format_size(false, 512), "512");
/// assert_eq!(format_size(false, 1536), "1.5K");
/// assert_eq!(format_size(true, 0), "[DIR]");
/// ```
pub fn format_size(is_dir: bool, size: u64) -> String {
    const K: u64 = 1024;

    if is_dir {
        return "[DIR]".to_string();
    }

    match size {
        s if s < K => s.to_string(),
        s if s < K * K => format!("{:.1}K", s as f64 / K as f64),
        s if s < K * K * K => format!("{:.1}M", s as f64 / (K * K) as f64),
        s => format!("{:.1}G", s as f64 / (K * K * K) as f64),
    }
}

/// Renders the listing of `dir`, linking entries under `request_path`.
///
/// `request_path` is the decoded path relative to the document root, `.` for
/// the root itself.
pub async fn render_listing(dir: &Path, request_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        // Entries that vanish or can't be stat'ed are skipped
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: meta.is_dir(),
            size: meta.len(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let prefix = if request_path == "." {
        "/".to_string()
    } else {
        let encoded: Vec<String> = request_path
            .split('/')
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        format!("/{}/", encoded.join("/"))
    };
    let title = escape_html(if request_path == "." { "/" } else { request_path });

    let mut html = String::new();
    let _ = write!(
        html,
        "<html><head><style>body{{font-family:monospace;font-size:13px;}}\
         td{{padding:1.5px 6px;}}</style></head><body>\
         <h3>Index of {}</h3><table>\n",
        title
    );

    for entry in &entries {
        let slash = if entry.is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{}{}{}\">{}{}</a></td><td>{}</td></tr>",
            prefix,
            urlencoding::encode(&entry.name),
            slash,
            escape_html(&entry.name),
            slash,
            format_size(entry.is_dir, entry.size)
        );
    }

    html.push_str("</table></body></html>\n");
    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
