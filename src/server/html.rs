//! Definition post-processing and page rendering.
//!
//! Stored articles carry links in the dictionary-app URL schemes of their
//! source format; they are rewritten to point back at the serving route so
//! cross-references stay navigable. Pages are small enough that plain
//! string templates suffice; no template engine is carried for them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::dictionary::Dictionary;

static X_DICTIONARY_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="x-dictionary:[^"]*" title="([^"]*)""#).expect("static pattern")
});

static BWORD_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="bword://[^"]*" title="([^"]*)""#).expect("static pattern")
});

const STYLESHEET_TAG: &str = r#"<link rel="stylesheet" href="style.css">"#;

/// Rewrite in-article cross-reference links to `{route}?word={title}`.
pub fn rewrite_links(body: &str, route: &str) -> String {
    let replacement = format!(r#"href="{route}?word=${{1}}" title="${{1}}""#);
    let body = X_DICTIONARY_LINK.replace_all(body, replacement.as_str());
    BWORD_LINK
        .replace_all(&body, replacement.as_str())
        .into_owned()
}

/// Remove stylesheet tags left over from the source dictionary package.
pub fn strip_stylesheet_tags(body: &str) -> String {
    body.replace(STYLESHEET_TAG, "")
}

/// Minimal HTML escaping for user-echoed strings. Definition bodies are
/// dataset content and pass through untouched.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

fn search_form(dict: Dictionary) -> String {
    format!(
        "<form action=\"/{slug}\" method=\"get\">\
         <input type=\"text\" name=\"word\" autofocus>\
         <button type=\"submit\">Look up</button>\
         </form>",
        slug = dict.slug()
    )
}

/// Landing page listing every available dictionary.
pub fn render_index(dictionaries: &[Dictionary]) -> String {
    let items: String = dictionaries
        .iter()
        .map(|d| format!("<li><a href=\"/{}\">{}</a></li>", d.slug(), d.display_name()))
        .collect();
    page("Dictionaries", &format!("<h1>Dictionaries</h1><ul>{items}</ul>"))
}

/// Empty search form, shown when no `word` parameter was supplied.
pub fn render_form(dict: Dictionary) -> String {
    page(
        dict.display_name(),
        &format!("<h1>{}</h1>{}", dict.display_name(), search_form(dict)),
    )
}

/// Definition page for a resolved term.
pub fn render_definitions(dict: Dictionary, term: &str, entries: &[String]) -> String {
    let articles: String = entries
        .iter()
        .map(|e| format!("<article>{e}</article>"))
        .collect();
    page(
        &format!("{} - {}", escape(term), dict.display_name()),
        &format!(
            "<h1>{}</h1>{}{}",
            escape(term),
            search_form(dict),
            articles
        ),
    )
}

/// "Word not found" page; also used for over-long input.
pub fn render_not_found(dict: Dictionary, word: &str) -> String {
    page(
        dict.display_name(),
        &format!(
            "<h1>{}</h1>{}<p>No entry found for \u{201c}{}\u{201d}.</p>",
            dict.display_name(),
            search_form(dict),
            escape(word)
        ),
    )
}

/// Bare message page for limiter and error responses.
pub fn render_message(message: &str) -> String {
    page("wordvault", &format!("<p>{}</p>", escape(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_x_dictionary_links() {
        let body = r#"<a href="x-dictionary:r:m_en_123:gb" title="colour">colour</a>"#;
        let out = rewrite_links(body, "/NewOxfordAmericanDictionary");
        assert_eq!(
            out,
            r#"<a href="/NewOxfordAmericanDictionary?word=colour" title="colour">colour</a>"#
        );
    }

    #[test]
    fn test_rewrite_bword_links() {
        let body = r#"<a href="bword://katt" title="katt">katt</a>"#;
        let out = rewrite_links(body, "/SwedishEnglishDictionary");
        assert_eq!(
            out,
            r#"<a href="/SwedishEnglishDictionary?word=katt" title="katt">katt</a>"#
        );
    }

    #[test]
    fn test_rewrite_leaves_ordinary_links_alone() {
        let body = r#"<a href="https://example.com" title="x">x</a>"#;
        assert_eq!(rewrite_links(body, "/d"), body);
    }

    #[test]
    fn test_strip_stylesheet_tags() {
        let body = r#"<link rel="stylesheet" href="style.css"><p>entry</p>"#;
        assert_eq!(strip_stylesheet_tags(body), "<p>entry</p>");
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>&"quote"'</b>"#),
            "&lt;b&gt;&amp;&quot;quote&quot;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_not_found_page_escapes_the_word() {
        let out = render_not_found(Dictionary::ChineseEnglish, "<script>");
        assert!(out.contains("&lt;script&gt;"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn test_form_page_has_a_form() {
        let out = render_form(Dictionary::NewOxfordAmerican);
        assert!(out.contains("<form action=\"/NewOxfordAmericanDictionary\""));
        assert!(out.contains("name=\"word\""));
    }

    #[test]
    fn test_index_lists_dictionaries() {
        let out = render_index(&Dictionary::ALL);
        for dict in Dictionary::ALL {
            assert!(out.contains(dict.slug()));
        }
    }
}
