use std::path::PathBuf;

use clap::ValueHint;
use objstl::FacetNormal;
use tracing_subscriber::fmt::time::{FormatTime, OffsetTime};

/// Shape of the lines written to stderr.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, clap::ValueEnum)]
pub enum LogStyle {
    /// One short line per event
    Compact,
    /// One line per event, with span context
    Full,
    /// Multi-line, human-oriented
    #[default]
    Pretty,
    /// Newline-delimited JSON objects
    Json,
}

/// Where facet normals come from; see [FacetNormal].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, clap::ValueEnum)]
pub enum NormalSource {
    /// The vertex normals each face refers to (matches older output)
    #[default]
    FromNormals,
    /// The vertex positions of each face
    FromPositions,
}

impl From<NormalSource> for FacetNormal {
    fn from(value: NormalSource) -> Self {
        match value {
            NormalSource::FromNormals => FacetNormal::FromNormals,
            NormalSource::FromPositions => FacetNormal::FromPositions,
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Event filter directives, e.g. `objstl=trace`; comma-separated
    #[arg(
        short,
        long,
        default_value = "warn,objstl=info,objmerge=info",
        env = "OBJMERGE_LOG_FILTER"
    )]
    pub log_filter: String,
    /// How log events are rendered
    #[arg(long, value_enum, default_value_t)]
    pub log_style: LogStyle,
    /// Label stored in the 80-byte STL header
    #[arg(short, long, default_value = objstl::ser::stl::DEFAULT_NAME)]
    pub name: String,
    /// How to compute the normal stored with each triangle
    #[arg(long, value_enum, default_value_t)]
    pub facet_normals: NormalSource,
    /// Where to write the merged STL
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
    /// OBJ files to merge, in order
    #[arg(num_args = 1.., required = true, value_hint = ValueHint::FilePath)]
    pub files: Vec<PathBuf>,
}

/// Wall-clock `HH:MM:SS` in the local offset, or UTC if the offset can't be determined.
fn local_clock() -> impl FormatTime {
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    OffsetTime::new(offset, time::macros::format_description!("[hour]:[minute]:[second]"))
}

/// Install the global subscriber; events go to stderr so stdout stays free.
pub(crate) fn init_logging(filter: &str, style: LogStyle) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_timer(local_clock())
        .with_target(style != LogStyle::Compact)
        .with_env_filter(filter);

    match style {
        LogStyle::Compact => builder.compact().init(),
        LogStyle::Full => builder.init(),
        LogStyle::Pretty => builder.pretty().init(),
        LogStyle::Json => builder.json().init(),
    }
}
