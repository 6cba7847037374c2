//! Parser layer
//! - traits.rs: Parser trait definition
//! - types.rs: Common types (ImageReference, ChartReference, ScanResults)
//! - yaml.rs: YAML node model with line numbers
//! - image.rs: image reference string parsing
//! - chart_yaml.rs: Chart.yaml parser
//! - values_yaml.rs: values.yaml parser
//! - dockerfile.rs: Dockerfile parser
//! - upstream.rs: chart upstream detection
//! - scanner.rs: directory walk and deduplication

pub mod chart_yaml;
pub mod dockerfile;
pub mod image;
pub mod scanner;
pub mod traits;
pub mod types;
pub mod upstream;
pub mod values_yaml;
pub mod yaml;

pub use chart_yaml::ChartYamlParser;
pub use dockerfile::DockerfileParser;
pub use image::ImageParser;
pub use scanner::{ScanError, Scanner};
pub use traits::{ParseError, Parser};
pub use types::{ChartReference, ImageReference, ScanResults};
pub use values_yaml::ValuesYamlParser;
