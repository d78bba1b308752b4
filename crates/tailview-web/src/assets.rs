//! Viewer page and static assets compiled into the binary

pub const INDEX_HTML: &str = include_str!("../assets/index.html");

const STYLE_CSS: &str = include_str!("../assets/style.css");
const APP_JS: &str = include_str!("../assets/app.js");

/// Look up a static asset by file name, returning its content type and body
pub fn lookup(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "style.css" => Some(("text/css; charset=utf-8", STYLE_CSS)),
        "app.js" => Some(("text/javascript; charset=utf-8", APP_JS)),
        _ => None,
    }
}
