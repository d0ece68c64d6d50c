//! Plain-text rendering of job status and results.

use std::fmt::Write;

use crawler_core::JobStatus;

pub fn render_status(status: &JobStatus) -> String {
    let mut out = format!(
        "- Processing: {} URLs\n- Done: {} URLs\n",
        status.processing, status.done
    );

    let page_views = status.page_views();
    if !page_views.is_empty() {
        out.push_str("- Page views:");
        for page in page_views {
            let label = if page.hits == 1 { "hit" } else { "hits" };
            let _ = write!(out, "\n\t- {} -> {} {}", page.url, page.hits, label);
        }
        out.push('\n');
    }

    out
}

pub fn render_results(images: &[String]) -> String {
    let mut out = String::new();
    for image in images {
        out.push_str(image);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawler_core::PageView;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_report_lists_pages_with_hit_labels() {
        let status = JobStatus::new(
            1,
            2,
            vec![
                PageView {
                    url: "http://a.example/".into(),
                    hits: 1,
                },
                PageView {
                    url: "http://b.example/".into(),
                    hits: 3,
                },
            ],
        );

        assert_eq!(
            render_status(&status),
            "- Processing: 1 URLs\n- Done: 2 URLs\n- Page views:\n\t- http://b.example/ -> 3 hits\n\t- http://a.example/ -> 1 hit\n"
        );
    }

    #[test]
    fn results_report_is_one_url_per_line() {
        let images = vec![
            "http://a.example/1.png".to_string(),
            "http://a.example/2.png".to_string(),
        ];
        assert_eq!(
            render_results(&images),
            "http://a.example/1.png\nhttp://a.example/2.png\n"
        );
        assert_eq!(render_results(&[]), "");
    }
}
