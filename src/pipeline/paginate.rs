//! Listing pages for "special" pages.
//!
//! Every page with a `special` tag gets its own paginated archive of the
//! posts sharing that tag. The first listing page lives at the special page's
//! own path; later ones at `{base}{pagination_dir}/{n}/`.

use std::cmp::Ordering;

use crate::error::{AppError, Result};
use crate::models::{ListingData, ListingPage, PaginationConfig, Page, Post};

/// Layouts tried for listing pages, most specific first.
const LISTING_LAYOUTS: [&str; 3] = ["special", "archive", "index"];

/// Post field used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    /// Last update, falling back to the publication date
    Updated,
    Title,
    Path,
}

/// Parsed `order_by` setting such as `-date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub descending: bool,
}

impl SortOrder {
    /// Parse `field` or `-field`.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let (descending, field) = match value.strip_prefix('-') {
            Some(field) => (true, field),
            None => (false, value),
        };
        let key = match field {
            "date" => SortKey::Date,
            "updated" => SortKey::Updated,
            "title" => SortKey::Title,
            "path" => SortKey::Path,
            other => {
                return Err(AppError::config(format!(
                    "unsupported pagination.order_by field '{other}'"
                )));
            }
        };
        Ok(Self { key, descending })
    }

    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let ordering = match self.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Updated => a.updated.unwrap_or(a.date).cmp(&b.updated.unwrap_or(b.date)),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Path => a.path.cmp(&b.path),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Sort posts in place; ties keep their input order.
    pub fn sort(&self, posts: &mut [Post]) {
        posts.sort_by(|a, b| self.compare(a, b));
    }
}

/// Generates listing pages for special pages.
#[derive(Debug, Clone)]
pub struct Paginator {
    per_page: usize,
    pagination_dir: String,
    order: SortOrder,
}

impl Paginator {
    /// Create a paginator from the `[pagination]` config section.
    pub fn new(config: &PaginationConfig) -> Result<Self> {
        Ok(Self {
            per_page: config.per_page,
            pagination_dir: config.pagination_dir.trim_matches('/').to_string(),
            order: SortOrder::parse(&config.order_by)?,
        })
    }

    /// Listing pages for every special page, in page order.
    pub fn generate(&self, pages: &[Page], posts: &[Post]) -> Vec<ListingPage> {
        pages
            .iter()
            .filter_map(|page| page.special.as_deref().map(|tag| (page, tag)))
            .flat_map(|(page, tag)| {
                let mut selected: Vec<Post> = posts
                    .iter()
                    .filter(|post| post.special.as_deref() == Some(tag))
                    .cloned()
                    .collect();
                self.order.sort(&mut selected);
                self.paginate(&base_path(&page.path), selected, &page.title)
            })
            .collect()
    }

    /// Split `posts` into listing pages rooted at `base`.
    pub fn paginate(&self, base: &str, posts: Vec<Post>, title: &str) -> Vec<ListingPage> {
        let total = if self.per_page == 0 {
            1
        } else {
            posts.len().div_ceil(self.per_page).max(1)
        };

        let chunks: Vec<Vec<Post>> = if self.per_page == 0 {
            vec![posts]
        } else if posts.is_empty() {
            vec![Vec::new()]
        } else {
            posts.chunks(self.per_page).map(<[Post]>::to_vec).collect()
        };

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, posts)| {
                let current = index + 1;
                let url = self.page_url(base, current);
                let (prev, prev_link) = if current > 1 {
                    (current - 1, self.page_url(base, current - 1))
                } else {
                    (0, String::new())
                };
                let (next, next_link) = if current < total {
                    (current + 1, self.page_url(base, current + 1))
                } else {
                    (0, String::new())
                };

                ListingPage {
                    path: url.clone(),
                    layout: LISTING_LAYOUTS.iter().map(|l| l.to_string()).collect(),
                    data: ListingData {
                        base: base.to_string(),
                        total,
                        current,
                        current_url: url,
                        posts,
                        prev,
                        prev_link,
                        next,
                        next_link,
                        title: title.to_string(),
                    },
                }
            })
            .collect()
    }

    fn page_url(&self, base: &str, page: usize) -> String {
        if page > 1 {
            format!("{}{}/{}/", base, self.pagination_dir, page)
        } else {
            base.to_string()
        }
    }
}

/// Listing pages for every special page in `pages`.
pub fn paginate(
    pages: &[Page],
    posts: &[Post],
    config: &PaginationConfig,
) -> Result<Vec<ListingPage>> {
    Ok(Paginator::new(config)?.generate(pages, posts))
}

/// Directory of a page: `travel/index.html` becomes `travel/`.
fn base_path(page_path: &str) -> String {
    let base = page_path.strip_suffix("index.html").unwrap_or(page_path);
    if base.is_empty() || base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn post(title: &str, special: &str, ts: i64) -> Post {
        Post {
            title: title.to_string(),
            path: format!("posts/{title}/"),
            date: Utc.timestamp_opt(ts, 0).unwrap(),
            updated: None,
            special: Some(special.to_string()),
        }
    }

    fn special_page(path: &str, tag: &str) -> Page {
        Page {
            path: path.to_string(),
            title: format!("All about {tag}"),
            special: Some(tag.to_string()),
        }
    }

    fn paginator(per_page: usize, order_by: &str) -> Paginator {
        Paginator::new(&PaginationConfig {
            per_page,
            order_by: order_by.to_string(),
            ..PaginationConfig::default()
        })
        .unwrap()
    }

    fn titles(page: &ListingPage) -> Vec<&str> {
        page.data.posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_filters_by_special_and_sorts() {
        let posts = vec![post("one", "s", 1), post("two", "s", 2), post("three", "t", 3)];
        let pages = vec![special_page("s/index.html", "s")];

        let listing = paginator(10, "-date").generate(&pages, &posts);
        assert_eq!(listing.len(), 1);
        assert_eq!(titles(&listing[0]), vec!["two", "one"]);

        let listing = paginator(10, "date").generate(&pages, &posts);
        assert_eq!(titles(&listing[0]), vec!["one", "two"]);
    }

    #[test]
    fn test_paginate_rejects_unknown_order() {
        let config = PaginationConfig {
            order_by: "-weight".to_string(),
            ..PaginationConfig::default()
        };
        assert!(paginate(&[], &[], &config).is_err());
        assert!(paginate(&[], &[], &PaginationConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_non_special_pages_are_skipped() {
        let pages = vec![Page {
            path: "about/index.html".to_string(),
            title: "About".to_string(),
            special: None,
        }];
        let posts = vec![post("one", "s", 1)];
        assert!(paginator(10, "-date").generate(&pages, &posts).is_empty());
    }

    #[test]
    fn test_pagination_links() {
        let posts: Vec<Post> = (1..=5).map(|i| post(&format!("p{i}"), "s", i)).collect();
        let pages = vec![special_page("travel/index.html", "s")];

        let listing = paginator(2, "-date").generate(&pages, &posts);
        let paths: Vec<&str> = listing.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["travel/", "travel/page/2/", "travel/page/3/"]);

        let first = &listing[0].data;
        assert_eq!((first.total, first.current), (3, 1));
        assert_eq!((first.prev, first.prev_link.as_str()), (0, ""));
        assert_eq!((first.next, first.next_link.as_str()), (2, "travel/page/2/"));
        assert_eq!(titles(&listing[0]), vec!["p5", "p4"]);

        let middle = &listing[1].data;
        assert_eq!(middle.prev_link, "travel/");
        assert_eq!(middle.next_link, "travel/page/3/");

        let last = &listing[2];
        assert_eq!(titles(last), vec!["p1"]);
        assert_eq!((last.data.next, last.data.next_link.as_str()), (0, ""));
        assert_eq!(last.data.title, "All about s");
        assert_eq!(last.layout, vec!["special", "archive", "index"]);
    }

    #[test]
    fn test_zero_per_page_disables_pagination() {
        let posts: Vec<Post> = (1..=25).map(|i| post(&format!("p{i}"), "s", i)).collect();
        let pages = vec![special_page("s/", "s")];

        let listing = paginator(0, "-date").generate(&pages, &posts);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].data.posts.len(), 25);
        assert_eq!(listing[0].data.total, 1);
    }

    #[test]
    fn test_empty_special_page_still_rendered() {
        let pages = vec![special_page("empty/index.html", "none")];
        let listing = paginator(10, "-date").generate(&pages, &[post("one", "s", 1)]);
        assert_eq!(listing.len(), 1);
        assert!(listing[0].data.posts.is_empty());
        assert_eq!(listing[0].path, "empty/");
    }

    #[test]
    fn test_custom_pagination_dir() {
        let posts: Vec<Post> = (1..=3).map(|i| post(&format!("p{i}"), "s", i)).collect();
        let paginator = Paginator::new(&PaginationConfig {
            per_page: 2,
            pagination_dir: "/p/".to_string(),
            order_by: "title".to_string(),
        })
        .unwrap();

        let listing = paginator.generate(&[special_page("s/index.html", "s")], &posts);
        assert_eq!(listing[1].path, "s/p/2/");
        assert_eq!(titles(&listing[0]), vec!["p1", "p2"]);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(
            SortOrder::parse("-updated").unwrap(),
            SortOrder {
                key: SortKey::Updated,
                descending: true
            }
        );
        assert!(!SortOrder::parse("path").unwrap().descending);
        assert!(SortOrder::parse("-weight").is_err());
    }

    #[test]
    fn test_updated_falls_back_to_date() {
        let mut edited = post("edited", "s", 1);
        edited.updated = Some(Utc.timestamp_opt(10, 0).unwrap());
        let mut posts = vec![post("fresh", "s", 5), edited];

        SortOrder::parse("-updated").unwrap().sort(&mut posts);
        assert_eq!(posts[0].title, "edited");
    }

    #[test]
    fn test_base_path() {
        assert_eq!(base_path("travel/index.html"), "travel/");
        assert_eq!(base_path("travel"), "travel/");
        assert_eq!(base_path("index.html"), "");
    }
}
