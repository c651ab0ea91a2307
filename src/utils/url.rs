// src/utils/url.rs

//! URL manipulation utilities.

/// Path of a URL with its query string, without scheme and host.
///
/// # Examples
/// ```
/// use comment_init::utils::url::path_of;
///
/// assert_eq!(path_of("https://example.com/posts/a/?p=1"), "/posts/a/?p=1");
/// assert_eq!(path_of("https://example.com"), "/");
/// ```
pub fn path_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.has_host() => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        _ => strip_authority(url),
    }
}

/// Fallback for strings `url` cannot parse: drop anything up to the first
/// `/` after `scheme://`.
fn strip_authority(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    match without_fragment.find("://") {
        Some(scheme_end) => {
            let after_scheme = &without_fragment[scheme_end + 3..];
            match after_scheme.find(['/', '?']) {
                Some(idx) if after_scheme[idx..].starts_with('?') => {
                    format!("/{}", &after_scheme[idx..])
                }
                Some(idx) => after_scheme[idx..].to_string(),
                None => "/".to_string(),
            }
        }
        None => without_fragment.to_string(),
    }
}

/// Keep URLs containing at least one of `fragments`, preserving order.
///
/// An empty fragment list keeps everything.
pub fn filter_included(urls: Vec<String>, fragments: &[String]) -> Vec<String> {
    if fragments.is_empty() {
        return urls;
    }
    urls.into_iter()
        .filter(|url| fragments.iter().any(|fragment| url.contains(fragment.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_of_absolute_url() {
        assert_eq!(path_of("https://www.zzwzdx.cn/project/a/"), "/project/a/");
    }

    #[test]
    fn test_path_of_keeps_query_drops_fragment() {
        assert_eq!(path_of("https://x/a?b=1#top"), "/a?b=1");
    }

    #[test]
    fn test_path_of_bare_host() {
        assert_eq!(path_of("https://x"), "/");
    }

    #[test]
    fn test_path_of_relative_input() {
        assert_eq!(path_of("/already/a/path/"), "/already/a/path/");
    }

    #[test]
    fn test_strip_authority_fallback() {
        assert_eq!(strip_authority("weird://host name/a/b"), "/a/b");
        assert_eq!(strip_authority("weird://host name?q=1"), "/?q=1");
        assert_eq!(strip_authority("weird://host name"), "/");
    }

    #[test]
    fn test_filter_included() {
        let urls = vec![
            "https://x/project/a/".to_string(),
            "https://x/posts/b/".to_string(),
            "https://x/tutorial/c/".to_string(),
        ];
        let kept = filter_included(urls.clone(), &["/project/".into(), "/tutorial/".into()]);
        assert_eq!(kept, vec![urls[0].clone(), urls[2].clone()]);

        assert_eq!(filter_included(urls.clone(), &[]), urls);
    }

    #[test]
    fn test_filter_included_no_duplicates() {
        let urls = vec!["https://x/project/tutorial/".to_string()];
        let kept = filter_included(urls, &["/project/".into(), "tutorial".into()]);
        assert_eq!(kept.len(), 1);
    }
}
