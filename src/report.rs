//! Plain-text rendering of check results

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::parser::types::DEFAULT_REGISTRY;
use crate::version::checker::{ChartResult, ImageResult, Results, Status};

/// Rendering options
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Paths are shown relative to this directory when possible
    pub base_dir: PathBuf,
    /// Show every row instead of only updates and errors
    pub verbose: bool,
}

/// Column-aligned table with a title line
struct Table {
    title: &'static str,
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(title: &'static str, headers: Vec<&'static str>) -> Self {
        Self {
            title,
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let _ = writeln!(out, "{}", self.title);
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        write_row(out, &header, &widths);
        for row in &self.rows {
            write_row(out, row, &widths);
        }
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn is_actionable(status: Status) -> bool {
    matches!(status, Status::UpdateAvailable | Status::Error)
}

fn display_path(path: &Path, base_dir: &Path) -> String {
    if path.as_os_str().is_empty() {
        return "-".to_string();
    }
    path.strip_prefix(base_dir)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn display_line(line: usize) -> String {
    if line > 0 {
        line.to_string()
    } else {
        String::new()
    }
}

fn display_latest(status: Status, latest: &str) -> String {
    match status {
        Status::Skipped | Status::Error => "-".to_string(),
        _ if latest.is_empty() => "?".to_string(),
        _ => latest.to_string(),
    }
}

fn sorted_by_location<T, F>(items: &[T], key: F) -> Vec<&T>
where
    F: Fn(&T) -> (&Path, usize),
{
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| key(*a).cmp(&key(*b)));
    sorted
}

fn render_images(out: &mut String, images: &[ImageResult], options: &ReportOptions) {
    if images.is_empty() {
        let _ = writeln!(out, "No Docker images found.");
        return;
    }

    let mut table = Table::new(
        "DOCKER IMAGES",
        vec!["REPOSITORY", "CURRENT", "LATEST", "STATUS", "LINE", "FILE", "DETAIL"],
    );
    for image in sorted_by_location(images, |i| (i.path.as_path(), i.line)) {
        if !options.verbose && !is_actionable(image.status) {
            continue;
        }
        let repository = if image.registry.is_empty() || image.registry == DEFAULT_REGISTRY {
            image.repository.clone()
        } else {
            format!("{}/{}", image.registry, image.repository)
        };
        table.push(vec![
            repository,
            image.current.clone(),
            display_latest(image.status, &image.latest),
            image.status.to_string(),
            display_line(image.line),
            display_path(&image.path, &options.base_dir),
            image.error.clone().unwrap_or_default(),
        ]);
    }

    if table.rows.is_empty() {
        let _ = writeln!(out, "No updates among {} Docker images.", images.len());
    } else {
        table.render(out);
    }
}

fn render_charts(out: &mut String, charts: &[ChartResult], options: &ReportOptions) {
    if charts.is_empty() {
        let _ = writeln!(out, "No Helm charts found.");
        return;
    }

    let mut table = Table::new(
        "HELM CHARTS",
        vec!["CHART", "UPSTREAM", "CURRENT", "LATEST", "STATUS", "LINE", "FILE", "DETAIL"],
    );
    for chart in sorted_by_location(charts, |c| (c.path.as_path(), c.line)) {
        if !options.verbose && !is_actionable(chart.status) {
            continue;
        }
        let upstream = if chart.upstream.is_empty() {
            "(local)".to_string()
        } else {
            chart.upstream.clone()
        };
        table.push(vec![
            chart.name.clone(),
            upstream,
            chart.current.clone(),
            display_latest(chart.status, &chart.latest),
            chart.status.to_string(),
            display_line(chart.line),
            display_path(&chart.path, &options.base_dir),
            chart.error.clone().unwrap_or_default(),
        ]);
    }

    if table.rows.is_empty() {
        let _ = writeln!(out, "No updates among {} Helm charts.", charts.len());
    } else {
        table.render(out);
    }
}

/// Status counts over images and charts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub updates: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_results(results: &Results) -> Self {
        let statuses = results
            .images
            .iter()
            .map(|i| i.status)
            .chain(results.charts.iter().map(|c| c.status));

        statuses.fold(Summary::default(), |mut summary, status| {
            match status {
                Status::UpdateAvailable => summary.updates += 1,
                Status::UpToDate => summary.up_to_date += 1,
                Status::Skipped => summary.skipped += 1,
                Status::Error => summary.errors += 1,
                Status::Unknown => {}
            }
            summary
        })
    }
}

fn render_summary(out: &mut String, summary: &Summary) {
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "Updates available  {}", summary.updates);
    let _ = writeln!(out, "Up to date         {}", summary.up_to_date);
    let _ = writeln!(out, "Skipped            {}", summary.skipped);
    if summary.errors > 0 {
        let _ = writeln!(out, "Errors             {}", summary.errors);
    }
}

/// Renders image and chart tables followed by a summary
pub fn render(results: &Results, options: &ReportOptions) -> String {
    let mut out = String::new();
    render_images(&mut out, &results.images, options);
    out.push('\n');
    render_charts(&mut out, &results.charts, options);
    out.push('\n');
    render_summary(&mut out, &Summary::from_results(results));
    out
}

/// Warning printed when a run was cut short by a rate limit
pub fn rate_limit_banner(ttl_secs: i64) -> String {
    let minutes = (ttl_secs / 60).max(1);
    format!(
        "Error: Rate limit hit. Partial results shown below.\n\
         Try again later. Cached results will be used for {} minutes.\n",
        minutes
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(repository: &str, status: Status, path: &str, line: usize) -> ImageResult {
        ImageResult {
            registry: "docker.io".to_string(),
            repository: repository.to_string(),
            current: "1.0.0".to_string(),
            latest: "2.0.0".to_string(),
            status,
            error: None,
            path: PathBuf::from(path),
            line,
        }
    }

    fn chart(name: &str, upstream: &str, status: Status) -> ChartResult {
        ChartResult {
            name: name.to_string(),
            current: "1.0.0".to_string(),
            latest: "1.0.0".to_string(),
            upstream: upstream.to_string(),
            app_version: String::new(),
            status,
            error: None,
            path: PathBuf::from("/repo/charts/app/Chart.yaml"),
            line: 3,
        }
    }

    fn options(verbose: bool) -> ReportOptions {
        ReportOptions {
            base_dir: PathBuf::from("/repo"),
            verbose,
        }
    }

    #[test]
    fn render_shows_only_actionable_rows_by_default() {
        let mut failed = image("bitnami/kafka", Status::Error, "/repo/values.yaml", 9);
        failed.error = Some("rate limit hit".to_string());
        let results = Results {
            images: vec![
                image("bitnami/redis", Status::UpdateAvailable, "/repo/values.yaml", 4),
                image("bitnami/nginx", Status::UpToDate, "/repo/values.yaml", 2),
                failed,
            ],
            charts: vec![chart("app", "", Status::Skipped)],
        };

        let output = render(&results, &options(false));

        assert!(output.contains("bitnami/redis"));
        assert!(output.contains("bitnami/kafka"));
        assert!(output.contains("rate limit hit"));
        assert!(!output.contains("bitnami/nginx"));
        assert!(output.contains("No updates among 1 Helm charts."));
        assert!(output.contains("Errors             1"));
    }

    #[test]
    fn render_verbose_shows_every_row_sorted_by_location() {
        let results = Results {
            images: vec![
                image("b/second", Status::UpToDate, "/repo/values.yaml", 10),
                image("a/first", Status::UpToDate, "/repo/values.yaml", 2),
                image("c/docker", Status::UpToDate, "/repo/Dockerfile", 1),
            ],
            charts: vec![chart("app", "", Status::Skipped)],
        };

        let output = render(&results, &options(true));

        let docker = output.find("c/docker").unwrap();
        let first = output.find("a/first").unwrap();
        let second = output.find("b/second").unwrap();
        assert!(docker < first && first < second);
        assert!(output.contains("(local)"));
        assert!(output.contains("charts/app/Chart.yaml"));
        assert!(!output.contains("/repo/charts"));
    }

    #[test]
    fn render_prefixes_non_default_registries() {
        let mut ghcr = image("org/app", Status::UpdateAvailable, "/repo/Dockerfile", 1);
        ghcr.registry = "ghcr.io".to_string();
        let results = Results {
            images: vec![ghcr],
            charts: vec![],
        };

        let output = render(&results, &options(false));

        assert!(output.contains("ghcr.io/org/app"));
        assert!(output.contains("No Helm charts found."));
    }

    #[test]
    fn summary_counts_statuses() {
        let results = Results {
            images: vec![
                image("a", Status::UpdateAvailable, "v", 1),
                image("b", Status::UpToDate, "v", 2),
                image("c", Status::Unknown, "v", 3),
            ],
            charts: vec![chart("x", "bitnami", Status::Error), chart("y", "", Status::Skipped)],
        };

        assert_eq!(
            Summary::from_results(&results),
            Summary {
                updates: 1,
                up_to_date: 1,
                skipped: 1,
                errors: 1,
            }
        );
    }

    #[test]
    fn display_path_keeps_paths_outside_base_dir() {
        let base = Path::new("/repo");
        assert_eq!(display_path(Path::new("/other/values.yaml"), base), "/other/values.yaml");
        assert_eq!(display_path(Path::new("/repo/a/values.yaml"), base), "a/values.yaml");
        assert_eq!(display_path(Path::new(""), base), "-");
    }

    #[test]
    fn rate_limit_banner_mentions_cache_duration() {
        assert!(rate_limit_banner(3600).contains("60 minutes"));
    }
}
