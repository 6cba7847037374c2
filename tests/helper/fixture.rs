//! Scanned directory fixtures

use std::fs;
use std::path::Path;

/// Writes `(relative path, content)` pairs below `root`, creating parent directories
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

pub const CHART_YAML: &str = r#"apiVersion: v2
name: platform
version: 1.0.0
appVersion: "3.2"
dependencies:
  - name: postgresql
    version: 15.0.0
    repository: https://charts.bitnami.com/bitnami
"#;

pub const VALUES_YAML: &str = r#"redis:
  image:
    registry: docker.io
    repository: bitnami/redis
    tag: 7.0.0
exporter:
  image: quay.io/prometheus/node-exporter:v1.7.0
internal:
  image: thinkportgmbh/internal:1.0
"#;

pub const DOCKERFILE: &str = r#"ARG GO_VERSION=1.21
FROM golang:${GO_VERSION} AS build
RUN go build ./...
FROM build
"#;

/// A small deployment repository with one chart, its values and a Dockerfile
pub fn write_platform_repo(root: &Path) {
    write_tree(
        root,
        &[
            ("Dockerfile", DOCKERFILE),
            ("charts/platform/Chart.yaml", CHART_YAML),
            ("charts/platform/values.yaml", VALUES_YAML),
        ],
    );
}
