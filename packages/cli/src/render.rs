//! Turning command output into text.

use assetfs_bridge::{DocumentMetadata, RootDescriptor};
use nu_ansi_term::{Color, Style};

use crate::commands::Output;
use crate::error::Result;

/// Render `output` as protocol rows in JSON, or as a coloured table.
///
/// Streamed content to stdout renders as an empty string so nothing is
/// appended to the document bytes.
pub fn render(output: &Output, json: bool) -> Result<String> {
    if json {
        return render_json(output);
    }
    Ok(match output {
        Output::Roots(roots) => roots.iter().map(root_line).collect::<Vec<_>>().join("\n"),
        Output::Document(doc) => document_detail(doc),
        Output::Documents(docs) if docs.is_empty() => {
            format!("{}", Color::DarkGray.paint("(no documents)"))
        }
        Output::Documents(docs) => docs.iter().map(document_line).collect::<Vec<_>>().join("\n"),
        Output::Streamed { path: None, .. } => String::new(),
        Output::Streamed {
            id,
            bytes,
            path: Some(path),
        } => format!(
            "{} wrote {} bytes of {} to {}",
            Color::Green.paint("ok"),
            bytes,
            Color::Magenta.paint(id),
            path.display()
        ),
    })
}

fn render_json(output: &Output) -> Result<String> {
    let text = match output {
        Output::Roots(roots) => serde_json::to_string_pretty(roots)?,
        Output::Document(doc) => serde_json::to_string_pretty(doc)?,
        Output::Documents(docs) => serde_json::to_string_pretty(docs)?,
        Output::Streamed { path: None, .. } => String::new(),
        Output::Streamed { id, bytes, path } => serde_json::to_string_pretty(&serde_json::json!({
            "documentId": id,
            "bytes": bytes,
            "path": path,
        }))?,
    };
    Ok(text)
}

fn root_line(root: &RootDescriptor) -> String {
    let mut flags = Vec::new();
    if root.supports_search {
        flags.push("search");
    }
    if root.supports_recents {
        flags.push("recents");
    }
    if root.local_only {
        flags.push("local");
    }
    format!(
        "{} {} {} [{}] {}",
        Style::new().bold().paint(&root.title),
        Color::Cyan.paint(&root.root_id),
        Color::DarkGray.paint(format!("-> '{}'", root.document_id)),
        flags.join(", "),
        Color::Yellow.paint(root.accepted_mime_types.join(" "))
    )
}

fn document_line(doc: &DocumentMetadata) -> String {
    let name = if doc.is_directory() {
        Style::new().bold().fg(Color::Blue).paint(format!("{}/", doc.display_name))
    } else {
        Style::new().paint(doc.display_name.clone())
    };
    format!(
        "{}  {}  {}",
        name,
        Color::DarkGray.paint(doc.id.as_str()),
        Color::Yellow.paint(doc.mime_type.as_str())
    )
}

fn document_detail(doc: &DocumentMetadata) -> String {
    let key = Style::new().fg(Color::Cyan);
    let last_modified = doc
        .last_modified
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    let size = doc
        .size
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());

    [
        format!("{} {}", key.paint("id:          "), doc.id),
        format!("{} {}", key.paint("name:        "), doc.display_name),
        format!("{} {:?}", key.paint("kind:        "), doc.kind),
        format!("{} {}", key.paint("mime:        "), doc.mime_type),
        format!("{} {}", key.paint("size:        "), size),
        format!("{} {}", key.paint("modified:    "), last_modified),
        format!("{} {}", key.paint("thumbnail:   "), doc.thumbnail_supported),
        format!("{} {}", key.paint("grid:        "), doc.prefers_grid),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetfs_bridge::{DocumentId, NodeKind};
    use std::path::PathBuf;

    fn grumpy() -> DocumentMetadata {
        DocumentMetadata {
            id: DocumentId::parse("Cats/Grumpy Cat.jpg").unwrap(),
            display_name: "Grumpy Cat".to_string(),
            kind: NodeKind::File,
            mime_type: "image/jpeg".to_string(),
            size: None,
            last_modified: None,
            thumbnail_supported: true,
            prefers_grid: false,
        }
    }

    #[test]
    fn json_rows_use_protocol_names() {
        let text = render(&Output::Documents(vec![grumpy()]), true).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(rows[0]["id"], "Cats/Grumpy Cat.jpg");
        assert_eq!(rows[0]["displayName"], "Grumpy Cat");
        assert_eq!(rows[0]["mimeType"], "image/jpeg");
    }

    #[test]
    fn table_line_mentions_name_and_id() {
        let text = render(&Output::Documents(vec![grumpy()]), false).unwrap();
        assert!(text.contains("Grumpy Cat"));
        assert!(text.contains("Cats/Grumpy Cat.jpg"));
    }

    #[test]
    fn stdout_stream_renders_nothing() {
        let output = Output::Streamed {
            id: "a.png".to_string(),
            bytes: 3,
            path: None,
        };
        assert_eq!(render(&output, false).unwrap(), "");
        assert_eq!(render(&output, true).unwrap(), "");
    }

    #[test]
    fn file_stream_reports_path() {
        let output = Output::Streamed {
            id: "a.png".to_string(),
            bytes: 3,
            path: Some(PathBuf::from("/tmp/a.png")),
        };
        assert!(render(&output, false).unwrap().contains("/tmp/a.png"));
    }
}
