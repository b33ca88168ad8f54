use std::{fs, process::ExitCode};

use clap::Parser;
use objstl::StlDocument;

mod cli;
use cli::Cli;

fn run(cli: &Cli) -> objstl::Result<()> {
    let mut doc = StlDocument::new()
        .with_name(cli.name.as_str())
        .with_facet_normal(cli.facet_normals.into());
    for path in &cli.files {
        tracing::info!(path = %path.display(), "reading mesh");
        doc.add_file(path)?;
    }

    tracing::info!(
        path = %cli.output.display(),
        meshes = doc.meshes().len(),
        triangles = doc.total_face_count(),
        "writing STL"
    );
    if let Err(e) = doc.save(&cli.output) {
        // a failed save can leave a partial file behind
        if cli.output.is_file() {
            if let Err(rm) = fs::remove_file(&cli.output) {
                tracing::warn!(path = %cli.output.display(), error = %rm, "couldn't remove partial output");
            }
        }
        return Err(e);
    }
    Ok(())
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(&cli.log_filter, cli.log_style);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "merge failed");
            ExitCode::FAILURE
        }
    }
}
