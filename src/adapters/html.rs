//! Markup to plain text.
//!
//! Only the visible text matters. Text nodes are concatenated as they appear,
//! so inline markup never splits a word (`Prom<span>Con</span>` reads as
//! `PromCon`). Block elements and `<br>` introduce a break, and all runs of
//! whitespace collapse to a single space at the end.

use scraper::{ElementRef, Html, Node};

/// Elements whose text content is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements rendered on their own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody",
    "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

pub fn html_to_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut raw = String::with_capacity(markup.len());
    push_visible_text(document.root_element(), &mut raw);

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if HIDDEN_ELEMENTS.contains(&name) {
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        out.push('\n');
    }

    for child in element.children() {
        if let Node::Text(text) = child.value() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            push_visible_text(child_element, out);
        }
    }

    if block {
        out.push('\n');
    }
}
