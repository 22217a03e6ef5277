//! Offline checklist over a site tree: required files and directories, plus a few
//! substring checks on the HTML, CSS and JS. Read-only; advisory, not a linter.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub required_files: Vec<String>,
    pub required_directories: Vec<String>,
    pub stylesheet: String,
    pub image_extensions: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect();
        Self {
            required_files: s(&[
                "index.html", "news.html", "staff.html", "videos.html", "network.html",
                "style.css", "js/data.js", "js/utils.js",
            ]),
            required_directories: s(&["img", "logos", "staff", "staff/avatars", "news"]),
            stylesheet: "style.css".into(),
            image_extensions: s(&[".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Files,
    Directories,
    Html,
    Css,
    JavaScript,
}

impl Section {
    fn heading(self) -> &'static str {
        match self {
            Section::Files => "Checking required files:",
            Section::Directories => "Checking required directories:",
            Section::Html => "Validating HTML files:",
            Section::Css => "Validating CSS:",
            Section::JavaScript => "Validating JavaScript:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Missing,
    Issues(Vec<String>),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct CheckItem {
    pub section: Section,
    pub path: String,
    pub status: Status,
}

impl CheckItem {
    pub fn passed(&self) -> bool { self.status == Status::Ok }
}

/// Image files and stray non-image files under the required directories.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub images: usize,
    pub other: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub items: Vec<CheckItem>,
    pub inventory: Inventory,
}

impl Report {
    pub fn passed(&self) -> bool { self.items.iter().all(CheckItem::passed) }
    pub fn failures(&self) -> impl Iterator<Item = &CheckItem> { self.items.iter().filter(|i| !i.passed()) }
    pub fn exit_code(&self) -> i32 { if self.passed() { 0 } else { 1 } }

    pub fn print(&self, out: &mut impl Write, color: bool) -> io::Result<()> {
        let paint = Painter(color);
        writeln!(out, "{}", paint.blue("EC2G Website Build Validation"))?;
        writeln!(out, "{}", paint.blue("================================"))?;
        let mut section = None;
        for item in &self.items {
            if section != Some(item.section) {
                section = Some(item.section);
                writeln!(out, "\n{}", paint.blue(item.section.heading()))?;
            }
            let shown = match item.section {
                Section::Directories => format!("{}/", item.path),
                _ => item.path.clone(),
            };
            match &item.status {
                Status::Ok if matches!(item.section, Section::Files | Section::Directories) => writeln!(out, "{}", paint.green(format!("✓ {shown}")))?,
                Status::Ok => writeln!(out, "{}", paint.green(format!("✓ {shown} (valid)")))?,
                Status::Missing => writeln!(out, "{}", paint.red(format!("✗ {shown} (missing)")))?,
                Status::Error(e) => writeln!(out, "{}", paint.red(format!("✗ {shown} (error: {e})")))?,
                Status::Issues(issues) => {
                    writeln!(out, "{}", paint.yellow(format!("⚠ {shown} has issues:")))?;
                    for issue in issues { writeln!(out, "{}", paint.yellow(format!("  - {issue}")))?; }
                }
            }
        }

        writeln!(out, "\n{}", paint.blue("Assets:"))?;
        writeln!(out, "  {} image file(s)", self.inventory.images)?;
        for p in &self.inventory.other {
            writeln!(out, "{}", paint.yellow(format!("  - not an image: {}", p.display())))?;
        }

        writeln!(out, "\n{}", paint.blue("Summary:"))?;
        if self.passed() {
            writeln!(out, "{}", paint.green("All checks passed! Website is ready for deployment."))
        } else {
            writeln!(out, "{}", paint.red("Some checks failed. Please fix the issues above."))
        }
    }
}

struct Painter(bool);

impl Painter {
    fn wrap(&self, code: &str, s: impl fmt::Display) -> String {
        if self.0 { format!("\x1b[{code}m{s}\x1b[0m") } else { s.to_string() }
    }
    fn red(&self, s: impl fmt::Display) -> String { self.wrap("31", s) }
    fn green(&self, s: impl fmt::Display) -> String { self.wrap("32", s) }
    fn yellow(&self, s: impl fmt::Display) -> String { self.wrap("33", s) }
    fn blue(&self, s: impl fmt::Display) -> String { self.wrap("34", s) }
}

pub fn validate(root: &Path, manifest: &Manifest) -> Report {
    let mut items = Vec::new();

    for f in &manifest.required_files {
        items.push(CheckItem { section: Section::Files, path: f.clone(), status: presence(&root.join(f), false) });
    }
    for d in &manifest.required_directories {
        items.push(CheckItem { section: Section::Directories, path: d.clone(), status: presence(&root.join(d), true) });
    }
    for f in manifest.required_files.iter().filter(|f| f.ends_with(".html")) {
        items.push(CheckItem { section: Section::Html, path: f.clone(), status: check_text(&root.join(f), html_issues) });
    }
    items.push(CheckItem {
        section: Section::Css,
        path: manifest.stylesheet.clone(),
        status: check_text(&root.join(&manifest.stylesheet), css_issues),
    });
    for f in manifest.required_files.iter().filter(|f| f.ends_with(".js")) {
        items.push(CheckItem { section: Section::JavaScript, path: f.clone(), status: check_text(&root.join(f), js_issues) });
    }

    let inventory = inventory(root, manifest);
    tracing::debug!(root = %root.display(), checks = items.len(), images = inventory.images, "validated site tree");
    Report { items, inventory }
}

fn presence(path: &Path, dir: bool) -> Status {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() == dir => Status::Ok,
        Ok(_) => Status::Missing,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Status::Missing,
        Err(e) => Status::Error(e.to_string()),
    }
}

fn check_text(path: &Path, rules: fn(&str) -> Vec<String>) -> Status {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let issues = rules(&content);
            if issues.is_empty() { Status::Ok } else { Status::Issues(issues) }
        }
        Err(e) => Status::Error(format!("error reading file: {e}")),
    }
}

pub fn html_issues(content: &str) -> Vec<String> {
    let mut issues = Vec::new();
    let checks = [
        ("<!DOCTYPE html>", "Missing DOCTYPE declaration"),
        ("<html", "Missing <html> tag"),
        ("<head>", "Missing <head> tag"),
        ("<body>", "Missing <body> tag"),
        ("viewport", "Missing viewport meta tag"),
        ("style.css", "Missing style.css link"),
    ];
    for (needle, issue) in checks {
        if !content.contains(needle) { issues.push(issue.to_string()); }
    }
    if !content.contains("data.js") || !content.contains("utils.js") {
        issues.push("Missing JavaScript includes".to_string());
    }
    issues
}

pub fn css_issues(content: &str) -> Vec<String> {
    let mut issues = Vec::new();
    if !content.contains(":root") { issues.push("Missing CSS variables (--brick, etc.)".to_string()); }
    if !content.contains("@media") { issues.push("Missing responsive design rules".to_string()); }
    issues
}

pub fn js_issues(content: &str) -> Vec<String> {
    let mut issues = Vec::new();
    if content.contains("function") && !content.contains('{') {
        issues.push("Potential syntax error in function definition".to_string());
    }
    let opened = content.matches('{').count();
    let closed = content.matches('}').count();
    if opened != closed {
        issues.push(format!("Unbalanced braces ({opened} opening, {closed} closing)"));
    }
    issues
}

fn inventory(root: &Path, manifest: &Manifest) -> Inventory {
    let mut inv = Inventory::default();
    // nested required dirs (staff/avatars) are already covered by their parent
    let tops: Vec<&String> = manifest.required_directories.iter()
        .filter(|d| !manifest.required_directories.iter().any(|p| *d != p && Path::new(d.as_str()).starts_with(p.as_str())))
        .collect();
    for dir in tops {
        for entry in WalkDir::new(root.join(dir)).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() { continue; }
            let ext = entry.path().extension().and_then(|e| e.to_str()).map(|e| format!(".{}", e.to_ascii_lowercase()));
            if ext.is_some_and(|e| manifest.image_extensions.contains(&e)) {
                inv.images += 1;
            } else {
                inv.other.push(entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf());
            }
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GOOD_HTML: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta name=\"viewport\" content=\"width=device-width\">\n\
        <link rel=\"stylesheet\" href=\"style.css\">\n</head>\n<body>\n<script src=\"js/data.js\"></script>\n\
        <script src=\"js/utils.js\"></script>\n</body>\n</html>\n";

    fn complete_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for page in ["index.html", "news.html", "staff.html", "videos.html", "network.html"] {
            fs::write(root.join(page), GOOD_HTML).unwrap();
        }
        fs::write(root.join("style.css"), ":root { --brick: #a33; }\n@media (max-width: 600px) { body { margin: 0; } }\n").unwrap();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::write(root.join("js/data.js"), "const EC2GData = { news: [] };\n").unwrap();
        fs::write(root.join("js/utils.js"), "function init() { return 1; }\n").unwrap();
        for d in ["img", "logos", "staff/avatars", "news"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        fs::write(root.join("logos/ec2g.svg"), "<svg/>").unwrap();
        fs::write(root.join("staff/avatars/a.PNG"), b"png").unwrap();
        dir
    }

    fn printed(report: &Report) -> String {
        let mut buf = Vec::new();
        report.print(&mut buf, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn complete_tree_passes() {
        let dir = complete_tree();
        let report = validate(dir.path(), &Manifest::default());
        assert!(report.passed(), "{}", printed(&report));
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.inventory.images, 2);
        assert!(printed(&report).contains("All checks passed!"));
    }

    #[test]
    fn missing_file_fails_and_is_named() {
        let dir = complete_tree();
        fs::remove_file(dir.path().join("videos.html")).unwrap();
        let report = validate(dir.path(), &Manifest::default());
        assert_eq!(report.exit_code(), 1);
        let out = printed(&report);
        assert!(out.contains("✗ videos.html (missing)"), "{out}");
        assert!(report.failures().any(|f| f.path == "videos.html" && f.section == Section::Files));
    }

    #[test]
    fn file_in_place_of_directory_is_missing() {
        let dir = complete_tree();
        fs::remove_dir_all(dir.path().join("news")).unwrap();
        fs::write(dir.path().join("news"), "oops").unwrap();
        let report = validate(dir.path(), &Manifest::default());
        assert!(report.failures().any(|f| f.path == "news" && f.status == Status::Missing));
        assert!(printed(&report).contains("✗ news/ (missing)"));
    }

    #[test]
    fn html_rules() {
        assert!(html_issues(GOOD_HTML).is_empty());
        let issues = html_issues("<html><head></head><body></body></html>");
        assert!(issues.contains(&"Missing DOCTYPE declaration".to_string()));
        assert!(issues.contains(&"Missing viewport meta tag".to_string()));
        assert!(issues.contains(&"Missing JavaScript includes".to_string()));
    }

    #[test]
    fn css_and_js_rules() {
        assert_eq!(css_issues("body {}"), vec!["Missing CSS variables (--brick, etc.)", "Missing responsive design rules"]);
        assert!(js_issues("function f() { if (x) { y(); } }").is_empty());
        assert_eq!(js_issues("function f() { if (x) { y(); }"), vec!["Unbalanced braces (2 opening, 1 closing)"]);
        assert!(js_issues("function f()").contains(&"Potential syntax error in function definition".to_string()));
    }

    #[test]
    fn bad_text_fails_with_issue_lines() {
        let dir = complete_tree();
        fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();
        let report = validate(dir.path(), &Manifest::default());
        assert!(!report.passed());
        let out = printed(&report);
        assert!(out.contains("⚠ style.css has issues:"));
        assert!(out.contains("  - Missing responsive design rules"));
    }

    #[test]
    fn inventory_lists_stray_files() {
        let dir = complete_tree();
        fs::write(dir.path().join("img/notes.txt"), "x").unwrap();
        let report = validate(dir.path(), &Manifest::default());
        assert!(report.passed());
        assert_eq!(report.inventory.other, vec![PathBuf::from("img/notes.txt")]);
    }
}
