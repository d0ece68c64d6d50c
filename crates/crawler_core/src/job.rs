use std::cmp::Reverse;

/// A URL visited by a job and how many times the job has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub url: String,
    pub hits: i64,
}

/// Point-in-time snapshot of a job's counters and page views.
///
/// A concurrent `mark_done` may be observed between its two counter updates,
/// so `processing` and `done` are not guaranteed to be mutually consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    /// URLs currently being fetched.
    pub processing: i64,
    /// URLs fully processed.
    pub done: i64,
    page_views: Vec<PageView>,
}

impl JobStatus {
    pub fn new(processing: i64, done: i64, mut page_views: Vec<PageView>) -> Self {
        // Descending by hits, ties broken by URL so the order is deterministic.
        page_views.sort_by(|a, b| (Reverse(a.hits), &a.url).cmp(&(Reverse(b.hits), &b.url)));
        Self {
            processing,
            done,
            page_views,
        }
    }

    /// Page views in descending order by number of hits.
    pub fn page_views(&self) -> &[PageView] {
        &self.page_views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_views_are_ordered_by_descending_hits() {
        let status = JobStatus::new(
            0,
            3,
            vec![
                PageView {
                    url: "http://a.example/".into(),
                    hits: 1,
                },
                PageView {
                    url: "http://b.example/".into(),
                    hits: 5,
                },
                PageView {
                    url: "http://c.example/".into(),
                    hits: 2,
                },
            ],
        );

        let urls: Vec<&str> = status.page_views().iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["http://b.example/", "http://c.example/", "http://a.example/"]
        );
    }

    #[test]
    fn ties_are_broken_by_url() {
        let status = JobStatus::new(
            0,
            0,
            vec![
                PageView {
                    url: "http://z.example/".into(),
                    hits: 2,
                },
                PageView {
                    url: "http://a.example/".into(),
                    hits: 2,
                },
            ],
        );

        assert_eq!(status.page_views()[0].url, "http://a.example/");
        assert_eq!(status.page_views()[1].url, "http://z.example/");
    }
}
