//! Final article extraction and structural validation.
//!
//! Reviewer output is free text. [`validate_article`] pulls the single
//! `<article>` block out of it (tolerating Markdown code fences and
//! surrounding chatter) and checks that the required sections are present
//! and in order.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validated HTML article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Article {
    html: String,
}

impl Article {
    /// Wrap text without validation. Used when validation is disabled.
    pub fn unchecked(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.html)
    }
}

/// Structural violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArticleError {
    #[error("no <article> root element found")]
    MissingRoot,

    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    #[error("element {later} appears before {earlier}")]
    OutOfOrder {
        earlier: &'static str,
        later: &'static str,
    },
}

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<header\b[^>]*>(?P<inner>.*?)</header>").expect("header pattern")
});

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<section\b[^>]*\bclass\s*=\s*["'][^"']*\bcuerpo\b[^"']*["'][^>]*>(?P<inner>.*?)</section>"#,
    )
    .expect("body pattern")
});

static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<footer\b[^>]*>(?P<inner>.*?)</footer>").expect("footer pattern")
});

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>.*?</h1>").expect("h1 pattern"));

static P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>.*?</p>").expect("p pattern"));

static SOURCES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*\bclass\s*=\s*["'][^"']*\bfuentes\b[^"']*["'][^>]*>.*?</div>"#)
        .expect("sources pattern")
});

/// Locate the outermost `<article>…</article>` block in `text`.
pub fn extract_article(text: &str) -> Option<&str> {
    let lowered = text.to_ascii_lowercase();
    let start = find_open_tag(&lowered, "<article")?;
    let end = lowered.rfind("</article>")? + "</article>".len();
    (end > start).then(|| &text[start..end])
}

fn find_open_tag(lowered: &str, tag: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = lowered[from..].find(tag) {
        let idx = from + pos;
        match lowered[idx + tag.len()..].chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => return Some(idx),
            _ => from = idx + tag.len(),
        }
    }
    None
}

/// Extract and validate the article contained in `text`.
pub fn validate_article(text: &str) -> Result<Article, ArticleError> {
    let html = extract_article(text).ok_or(ArticleError::MissingRoot)?;

    let parts: [(&'static str, &Regex); 3] = [
        ("<header>", &*HEADER_RE),
        ("<section class=\"cuerpo\">", &*BODY_RE),
        ("<footer>", &*FOOTER_RE),
    ];
    let mut spans = Vec::with_capacity(parts.len());
    for (name, re) in parts {
        let caps = re
            .captures(html)
            .ok_or(ArticleError::MissingElement(name))?;
        let start = caps.get(0).map(|m| m.start()).unwrap_or_default();
        let inner = caps.name("inner").map(|m| m.as_str()).unwrap_or_default();
        spans.push((name, start, inner));
    }

    for pair in spans.windows(2) {
        if pair[1].1 < pair[0].1 {
            return Err(ArticleError::OutOfOrder {
                earlier: pair[0].0,
                later: pair[1].0,
            });
        }
    }

    let header = spans[0].2;
    if !H1_RE.is_match(header) {
        return Err(ArticleError::MissingElement("<h1> in <header>"));
    }
    if !P_RE.is_match(header) {
        return Err(ArticleError::MissingElement("<p> in <header>"));
    }
    if !P_RE.is_match(spans[1].2) {
        return Err(ArticleError::MissingElement("<p> in <section class=\"cuerpo\">"));
    }
    let footer = spans[2].2;
    if !P_RE.is_match(footer) {
        return Err(ArticleError::MissingElement("<p> in <footer>"));
    }
    if !SOURCES_RE.is_match(footer) {
        return Err(ArticleError::MissingElement("<div class=\"fuentes\"> in <footer>"));
    }

    Ok(Article::unchecked(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"<article>
  <header>
    <h1>Titular</h1>
    <p class="entradilla">Entradilla</p>
  </header>
  <section class="cuerpo">
    <p>Cuerpo.</p>
  </section>
  <footer>
    <p class="conclusion">Conclusión</p>
    <div class="fuentes">
      <h3>Fuentes:</h3>
      <ul><li>Agencia</li></ul>
    </div>
  </footer>
</article>"#;

    #[test]
    fn test_valid_article_passes() {
        let article = validate_article(GOOD).unwrap();
        assert_eq!(article.html(), GOOD);
    }

    #[test]
    fn test_code_fences_and_chatter_are_stripped() {
        let wrapped = format!("Aquí está la noticia final:\n```html\n{GOOD}\n```\nSaludos.");
        let article = validate_article(&wrapped).unwrap();
        assert_eq!(article.html(), GOOD);
    }

    #[test]
    fn test_missing_root() {
        assert_eq!(
            validate_article("<div>no es un artículo</div>"),
            Err(ArticleError::MissingRoot)
        );
        assert_eq!(validate_article(""), Err(ArticleError::MissingRoot));
    }

    #[test]
    fn test_articles_tag_is_not_article() {
        assert_eq!(
            validate_article("<articles>x</articles>"),
            Err(ArticleError::MissingRoot)
        );
    }

    #[test]
    fn test_missing_sources_div() {
        let html = GOOD.replace("class=\"fuentes\"", "class=\"otros\"");
        assert_eq!(
            validate_article(&html),
            Err(ArticleError::MissingElement("<div class=\"fuentes\"> in <footer>"))
        );
    }

    #[test]
    fn test_missing_body_section() {
        let html = GOOD.replace("class=\"cuerpo\"", "class=\"texto\"");
        assert_eq!(
            validate_article(&html),
            Err(ArticleError::MissingElement("<section class=\"cuerpo\">"))
        );
    }

    #[test]
    fn test_footer_before_header_is_rejected() {
        let html = r#"<article>
<footer><p>c</p><div class="fuentes">f</div></footer>
<header><h1>t</h1><p>e</p></header>
<section class="cuerpo"><p>b</p></section>
</article>"#;
        assert!(matches!(
            validate_article(html),
            Err(ArticleError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_uppercase_tags_are_accepted() {
        let upper = GOOD.replace("<article>", "<ARTICLE>").replace("</article>", "</ARTICLE>");
        assert!(validate_article(&upper).is_ok());
    }
}
