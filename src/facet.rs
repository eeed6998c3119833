//! Faceted filtering: author, tag, type and time facets over a post list.
//!
//! Facets compose with the parsed search query by AND; values within one facet
//! compose by OR. Each facet's counts are computed with every other active
//! filter applied but not its own, so ticking an author never hides the other
//! authors from the list.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FacetConfig;
use crate::post::{Post, PostType};
use crate::search::{Query, matches, parse_query};

/// An inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// The last `days` calendar days up to `now`, starting at midnight UTC of
    /// the first day. `None` for zero days. Windows reaching past the earliest
    /// representable date start there instead.
    pub fn last_days(days: u32, now: DateTime<Utc>) -> Option<Self> {
        if days == 0 {
            return None;
        }
        let first_day = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);
        let start = first_day.and_hms_opt(0, 0, 0)?.and_utc();
        Some(Self { start, end: now })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// One facet dimension, used to exclude a facet from its own counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Authors,
    Tags,
    Types,
    Time,
}

/// The facet values the reader has ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSelection {
    /// Author names; compared trimmed and case-insensitively.
    pub authors: BTreeSet<String>,
    /// Tags; compared exactly.
    pub tags: BTreeSet<String>,
    pub types: BTreeSet<PostType>,
    /// A window picked on the histogram.
    pub range: Option<DateRange>,
    /// Quick "last N days" filter.
    pub days: Option<u32>,
}

impl FacetSelection {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.tags.is_empty()
            && self.types.is_empty()
            && self.range.is_none()
            && self.days.is_none()
    }

    /// Whether `post` passes every selected facet except `skip`.
    pub fn admits(&self, post: &Post, now: DateTime<Utc>, skip: Option<Dimension>) -> bool {
        (skip == Some(Dimension::Authors) || self.admits_author(post))
            && (skip == Some(Dimension::Tags) || self.admits_tag(post))
            && (skip == Some(Dimension::Types) || self.admits_type(post))
            && (skip == Some(Dimension::Time) || self.admits_time(post, now))
    }

    fn admits_author(&self, post: &Post) -> bool {
        if self.authors.is_empty() {
            return true;
        }
        let wanted: HashSet<String> = self.authors.iter().map(|a| fold(a)).collect();
        post.authors.iter().any(|a| wanted.contains(&fold(a)))
    }

    fn admits_tag(&self, post: &Post) -> bool {
        self.tags.is_empty() || post.tags.iter().any(|t| self.tags.contains(t))
    }

    fn admits_type(&self, post: &Post) -> bool {
        self.types.is_empty() || self.types.contains(&post.post_type())
    }

    fn admits_time(&self, post: &Post, now: DateTime<Utc>) -> bool {
        let windows: Vec<DateRange> = self
            .range
            .into_iter()
            .chain(self.days.and_then(|d| DateRange::last_days(d, now)))
            .collect();
        if windows.is_empty() {
            return true;
        }
        match post.parsed_date() {
            Some(date) => windows.iter().all(|w| w.contains(date)),
            None => false,
        }
    }
}

/// Trimmed, case-folded grouping key for author names.
fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Post counts per facet value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetCounts {
    pub authors: BTreeMap<String, usize>,
    pub tags: BTreeMap<String, usize>,
    pub types: BTreeMap<PostType, usize>,
}

/// Count posts per author.
///
/// Names group by their trimmed lowercase form and display with the first
/// casing seen. Corporate posts without an external link are left out.
pub fn count_authors<'a, I>(posts: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut canonical: HashMap<String, String> = HashMap::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for post in posts {
        if post.is_corporate_internal() {
            continue;
        }
        let mut seen: HashSet<String> = HashSet::new();
        for author in &post.authors {
            let key = fold(author);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            let display = canonical
                .entry(key)
                .or_insert_with(|| author.trim().to_string());
            *counts.entry(display.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Count posts per tag, verbatim.
pub fn count_tags<'a, I>(posts: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for post in posts {
        let distinct: BTreeSet<&String> = post.tags.iter().collect();
        for tag in distinct {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Count posts per [`PostType`].
pub fn count_types<'a, I>(posts: I) -> BTreeMap<PostType, usize>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut counts: BTreeMap<PostType, usize> = BTreeMap::new();
    for post in posts {
        *counts.entry(post.post_type()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One month of the publishing histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bin {
    /// `YYYY-MM`.
    pub key: String,
    pub start: DateTime<Utc>,
    /// Last millisecond of the month.
    pub end: DateTime<Utc>,
    pub count: usize,
}

/// `months` monthly bins ending with `now`'s month, counting `posts` by date.
/// Undated posts and posts outside the window are not counted.
pub fn monthly_bins<'a, I>(posts: I, now: DateTime<Utc>, months: u32) -> Vec<Bin>
where
    I: IntoIterator<Item = &'a Post>,
{
    let current = i64::from(now.year()) * 12 + i64::from(now.month0());
    let mut bins: Vec<Bin> = (0..i64::from(months))
        .rev()
        .filter_map(|back| {
            let start = month_start(current - back)?;
            let end = month_start(current - back + 1)? - Duration::milliseconds(1);
            Some(Bin {
                key: start.format("%Y-%m").to_string(),
                start,
                end,
                count: 0,
            })
        })
        .collect();

    for date in posts.into_iter().filter_map(Post::parsed_date) {
        if let Some(bin) = bins.iter_mut().find(|b| b.start <= date && date <= b.end) {
            bin.count += 1;
        }
    }
    bins
}

/// Midnight UTC on the first of the month `index` months after year 0.
fn month_start(index: i64) -> Option<DateTime<Utc>> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some(
        NaiveDate::from_ymd_opt(year, month, 1)?
            .and_hms_opt(0, 0, 0)?
            .and_utc(),
    )
}

// ---------------------------------------------------------------------------
// Full view
// ---------------------------------------------------------------------------

/// Everything the listing page renders for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct SearchView<'a> {
    pub query: Query,
    /// Posts passing the query and every facet, in input order.
    pub results: Vec<&'a Post>,
    pub facets: FacetCounts,
    /// Posts per month, ignoring the time facets.
    pub histogram: Vec<Bin>,
}

impl<'a> SearchView<'a> {
    /// Recompute the view from scratch.
    pub fn compute(
        posts: &'a [Post],
        raw_query: &str,
        selection: &FacetSelection,
        now: DateTime<Utc>,
        config: &FacetConfig,
    ) -> Self {
        let query = parse_query(raw_query);
        let by_query: Vec<&'a Post> = posts.iter().filter(|p| matches(p, &query)).collect();
        let except = |skip: Dimension| {
            by_query
                .iter()
                .copied()
                .filter(move |p| selection.admits(p, now, Some(skip)))
        };

        let facets = FacetCounts {
            authors: count_authors(except(Dimension::Authors)),
            tags: count_tags(except(Dimension::Tags)),
            types: count_types(except(Dimension::Types)),
        };
        let histogram = monthly_bins(except(Dimension::Time), now, config.histogram_months);
        let matched_query = by_query.len();
        let results: Vec<&'a Post> = if selection.is_empty() {
            by_query
        } else {
            by_query
                .into_iter()
                .filter(|p| selection.admits(p, now, None))
                .collect()
        };

        tracing::debug!(
            posts = posts.len(),
            matched_query,
            results = results.len(),
            "computed search view"
        );
        Self {
            query,
            results,
            facets,
            histogram,
        }
    }
}
