use anyhow::Result;
use maud::html;
use regex::Regex;
use serde::Deserialize;

use crate::content::NavLink;

const HEADER_MARKER: &str = "class=\"site-header\"";
const FOOTER_MARKER: &str = "class=\"site-footer\"";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub logo: String,
    pub logo_alt: String,
    pub footer: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            logo: "logos/ec2g.svg".into(),
            logo_alt: "EC2G Logo".into(),
            footer: "\u{a9} 2025 EC2G - UTFSM".into(),
        }
    }
}

pub fn header_markup(nav: &[NavLink], cfg: &TemplateConfig) -> String {
    html! {
        header.site-header {
            div.header-bar {
                div.header-logo {
                    img src=(cfg.logo) alt=(cfg.logo_alt);
                }
                nav.header-nav {
                    @for link in nav {
                        a href=(link.href) { (link.text) }
                    }
                }
            }
        }
    }
    .into_string()
}

pub fn footer_markup(cfg: &TemplateConfig) -> String {
    html! { footer.site-footer { (cfg.footer) } }.into_string()
}

/// Add the shared header right after `<body>` and the footer right before `</body>`.
/// Blocks already present are left alone, so injecting twice changes nothing.
pub fn inject(html: &str, nav: &[NavLink], cfg: &TemplateConfig) -> Result<String> {
    let body_open = Regex::new(r"(?i)<body(\s[^>]*)?>")?;
    let body_close = Regex::new(r"(?i)</body\s*>")?;

    let Some(open) = body_open.find(html) else {
        tracing::warn!("page has no <body>; templates not injected");
        return Ok(html.to_string());
    };
    let close = body_close.find_iter(html).last().map(|m| m.start()).filter(|&c| c >= open.end());

    let mut out = String::with_capacity(html.len() + 512);
    out.push_str(&html[..open.end()]);
    if !html.contains(HEADER_MARKER) {
        out.push('\n');
        out.push_str(&header_markup(nav, cfg));
    }
    match close {
        Some(close) => {
            out.push_str(&html[open.end()..close]);
            if !html.contains(FOOTER_MARKER) {
                out.push_str(&footer_markup(cfg));
                out.push('\n');
            }
            out.push_str(&html[close..]);
        }
        None => {
            out.push_str(&html[open.end()..]);
            if !html.contains(FOOTER_MARKER) { out.push_str(&footer_markup(cfg)); }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> Vec<NavLink> {
        vec![
            NavLink { href: "index.html".into(), text: "Home".into() },
            NavLink { href: "news.html".into(), text: "News & Events".into() },
        ]
    }

    const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>t</title></head>\n<BODY class=\"home\">\n<main>hi</main>\n</body>\n</html>\n";

    #[test]
    fn header_lists_navigation() {
        let header = header_markup(&nav(), &TemplateConfig::default());
        assert_eq!(
            header,
            "<header class=\"site-header\"><div class=\"header-bar\"><div class=\"header-logo\"><img src=\"logos/ec2g.svg\" alt=\"EC2G Logo\"></div>\
             <nav class=\"header-nav\"><a href=\"index.html\">Home</a><a href=\"news.html\">News &amp; Events</a></nav></div></header>"
        );
    }

    #[test]
    fn injects_inside_body() {
        let out = inject(PAGE, &nav(), &TemplateConfig::default()).unwrap();
        let header_at = out.find("<header").unwrap();
        let main_at = out.find("<main>").unwrap();
        let footer_at = out.find("<footer").unwrap();
        assert!(out.find("<BODY class=\"home\">").unwrap() < header_at);
        assert!(header_at < main_at && main_at < footer_at);
        assert!(footer_at < out.find("</body>").unwrap());
        assert!(out.contains("<footer class=\"site-footer\">\u{a9} 2025 EC2G - UTFSM</footer>"));
    }

    #[test]
    fn injection_is_idempotent() {
        let cfg = TemplateConfig::default();
        let once = inject(PAGE, &nav(), &cfg).unwrap();
        let twice = inject(&once, &nav(), &cfg).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.matches("<header").count(), 1);
        assert_eq!(twice.matches("<footer").count(), 1);
    }

    #[test]
    fn page_without_body_is_untouched() {
        let html = "<p>fragment</p>";
        assert_eq!(inject(html, &nav(), &TemplateConfig::default()).unwrap(), html);
    }
}
