use crate::parser::{AnnotationRecord, BookIdentity};

/// Render one book's annotations as a Markdown document.
///
/// Output depends only on the inputs, so an unchanged book re-renders byte for byte.
pub fn render(book: &BookIdentity, records: &[AnnotationRecord]) -> String {
    let mut lines = vec![
        format!("# {}", book.title),
        format!("**Author:** {}", book.author),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    for r in records {
        if !r.text.is_empty() {
            lines.extend(r.text.lines().map(|l| format!("> {}", l).trim_end().to_string()));
            lines.push(String::new());
        }

        if !r.note.is_empty() {
            lines.push(format!("**Note:** {}", r.note));
        }

        let mut meta = Vec::new();
        if !r.location.is_empty() {
            meta.push(format!("**Location:** {}", r.location));
        }
        if !r.page.is_empty() {
            meta.push(format!("**Page:** {}", r.page));
        }
        if !meta.is_empty() {
            lines.push(meta.join(" | "));
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> BookIdentity {
        BookIdentity::new("Dune", "Frank Herbert")
    }

    #[test]
    fn full_record() {
        let records = vec![AnnotationRecord {
            text: "Fear is the mind-killer.".into(),
            note: "Litany".into(),
            location: "123".into(),
            page: "8".into(),
            color: "Yellow".into(),
        }];
        let expected = "# Dune\n\
                        **Author:** Frank Herbert\n\
                        \n\
                        ---\n\
                        \n\
                        > Fear is the mind-killer.\n\
                        \n\
                        **Note:** Litany\n\
                        **Location:** 123 | **Page:** 8\n\
                        \n\
                        ---\n";
        assert_eq!(render(&book(), &records), expected);
    }

    #[test]
    fn note_only_without_metadata() {
        let records = vec![AnnotationRecord {
            note: "just a thought".into(),
            ..Default::default()
        }];
        let doc = render(&book(), &records);
        assert!(doc.ends_with("---\n\n**Note:** just a thought\n\n---\n"));
        assert!(!doc.contains('>'));
        assert!(!doc.contains("**Location:**"));
    }

    #[test]
    fn page_without_location() {
        let records = vec![AnnotationRecord {
            text: "x".into(),
            page: "56".into(),
            ..Default::default()
        }];
        let doc = render(&book(), &records);
        assert!(doc.contains("\n**Page:** 56\n"));
        assert!(!doc.contains(" | "));
    }

    #[test]
    fn multiline_highlight_stays_quoted() {
        let records = vec![AnnotationRecord {
            text: "line one\n\nline three".into(),
            ..Default::default()
        }];
        let doc = render(&book(), &records);
        assert!(doc.contains("> line one\n>\n> line three\n"));
    }

    #[test]
    fn no_records_is_just_the_heading() {
        assert_eq!(render(&book(), &[]), "# Dune\n**Author:** Frank Herbert\n\n---\n");
    }
}
