use std::sync::LazyLock;

use regex::Regex;

use crate::core::Identity;

pub const EMPTY_PAD: &str = "/h/e3b0c44298fc/j/e3b0c44298fc/edit";

pub const WELCOME_PAD: &str = "/h/d6d40c3cd33b/j/e3b0c44298fc/edit";

static EDIT_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/h/([0-9a-f]+)/j/([0-9a-f]+)/edit/?$").expect("Invalid edit route regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Edit { html: Identity, js: Identity },
    Welcome,
    New,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        if path == "/welcome" || path == "/welcome/" {
            return Route::Welcome;
        }
        let edit = EDIT_ROUTE.captures(path).and_then(|caps| {
            let html = Identity::parse(caps.get(1)?.as_str()).ok()?;
            let js = Identity::parse(caps.get(2)?.as_str()).ok()?;
            Some(Route::Edit { html, js })
        });
        edit.unwrap_or(Route::New)
    }

    pub fn edit_path(html: &Identity, js: &Identity) -> String {
        format!("/h/{}/j/{}/edit", html, js)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: String,
    pub fragment: Option<String>,
}

impl Location {
    pub fn parse(url: &str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (url, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let path = match path.split_once("://") {
            Some((_, after_scheme)) => after_scheme
                .find('/')
                .map_or("/", |slash| &after_scheme[slash..]),
            None => path,
        };
        Self {
            path: if path.is_empty() { "/".into() } else { path.into() },
            query: query.to_string(),
            fragment,
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let value = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                (key.to_string(), value)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Adds a new entry, dropping any forward entries. The fragment carries
    // over so the open tab survives navigation.
    pub fn push(&mut self, path: &str) {
        let next = self.follow(path);
        self.entries.truncate(self.index + 1);
        self.entries.push(next);
        self.index = self.entries.len() - 1;
    }

    pub fn replace(&mut self, path: &str) {
        self.entries[self.index] = self.follow(path);
    }

    fn follow(&self, path: &str) -> Location {
        Location {
            fragment: self.current().fragment.clone(),
            ..Location::path(path)
        }
    }

    pub fn replace_fragment(&mut self, fragment: &str) {
        self.entries[self.index].fragment = Some(fragment.to_string());
    }

    pub fn back(&mut self) -> Option<&Location> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(
            Route::parse("/h/abc123/j/e3b0c44298fc/edit"),
            Route::Edit {
                html: Identity::parse("abc123").unwrap(),
                js: Identity::parse("e3b0c44298fc").unwrap(),
            }
        );
        assert_eq!(Route::parse("/welcome"), Route::Welcome);
        assert_eq!(Route::parse("/"), Route::New);
        assert_eq!(Route::parse("/h/XYZ/j/abc/edit"), Route::New);
        assert_eq!(Route::parse("/h/abc/j/def"), Route::New);
    }

    #[test]
    fn test_canonical_pads_parse_as_edit() {
        assert!(matches!(Route::parse(EMPTY_PAD), Route::Edit { .. }));
        match Route::parse(WELCOME_PAD) {
            Route::Edit { html, js } => {
                assert_eq!(html.as_str(), "d6d40c3cd33b");
                assert_eq!(js, Identity::of(""));
            }
            other => panic!("unexpected route {:?}", other),
        }
    }

    #[test]
    fn test_location_parse() {
        let loc = Location::parse("http://localhost:4000/new?html=%3Cb%3E&js=go()#javascript");
        assert_eq!(loc.path, "/new");
        assert_eq!(loc.fragment.as_deref(), Some("javascript"));
        assert_eq!(
            loc.query_pairs(),
            vec![
                ("html".to_string(), "<b>".to_string()),
                ("js".to_string(), "go()".to_string())
            ]
        );

        let bare = Location::parse("http://localhost:4000");
        assert_eq!(bare.path, "/");
        assert!(bare.query_pairs().is_empty());
    }

    #[test]
    fn test_history_replace_and_back() {
        let mut history = History::new(Location::path("/"));
        history.replace(EMPTY_PAD);
        assert_eq!(history.len(), 1);
        assert!(history.back().is_none());

        history.push("/h/abc/j/def/edit");
        history.replace_fragment("javascript");
        assert_eq!(history.current().fragment.as_deref(), Some("javascript"));
        assert_eq!(history.len(), 2);

        history.push("/h/123/j/def/edit");
        assert_eq!(history.current().fragment.as_deref(), Some("javascript"));
        history.back();
        assert_eq!(history.back().map(|l| l.path.as_str()), Some(EMPTY_PAD));
        assert_eq!(history.len(), 3);
    }
}
