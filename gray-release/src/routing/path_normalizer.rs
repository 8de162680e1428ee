pub const PATH_SEPARATOR: char = '/';
const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

/// Resolves a navigation target against the route of the page issuing it.
///
/// Absolute targets lose their leading separator and are otherwise kept as
/// given. Relative targets are applied segment by segment to the directory of
/// `current_path`. Popping past the root is not guarded against: the extra
/// `..` segments are simply swallowed.
pub fn resolve(current_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix(PATH_SEPARATOR) {
        return absolute.to_string();
    }

    let mut stack: Vec<&str> = current_path.split(PATH_SEPARATOR).collect();
    // drop the current page's own file component
    stack.pop();

    for segment in target.split(PATH_SEPARATOR) {
        match segment {
            CURRENT_DIR => {}
            PARENT_DIR => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    stack.join("/")
}

/// Splits `pages/a/index?x=1` into the path and the raw query string.
pub fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Builds the absolute url handed to the host navigation primitives.
pub fn to_url(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{PATH_SEPARATOR}{path}?{query}"),
        _ => format!("{PATH_SEPARATOR}{path}"),
    }
}

/// The path segment under which the canary bundle's pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanaryPrefix {
    // segment plus trailing separator, e.g. "gray/"
    prefix: String,
}

impl CanaryPrefix {
    pub fn new(segment: &str) -> Self {
        let segment = segment.trim_matches(PATH_SEPARATOR);
        Self {
            prefix: format!("{segment}{PATH_SEPARATOR}"),
        }
    }

    pub fn segment(&self) -> &str {
        self.prefix.trim_end_matches(PATH_SEPARATOR)
    }

    pub fn is_prefixed(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// No-op for paths that do not carry the prefix.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.prefix.as_str()).unwrap_or(path)
    }

    /// Not guarded: prefixing an already prefixed path prefixes it twice, so
    /// callers strip first.
    pub fn apply(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }
}
