//! horn CLI - acoustic horn generator
//!
//! Resolves horn parameters from flags or a JSON file, meshes the horn
//! (geometry kernel first, direct lathe as fallback) and writes STL.

use anyhow::{bail, Context, Result};
use clap::Parser;
use horn_engine::{
    initialize_kernel, ExportRoute, Exported, Generation, HornSession, TruckLoader,
};
use horn_format::{parse_ascii_stl, parse_binary_stl, save};
use horn_ops::{HornMetrics, MeshSource};
use horn_types::CameraFit;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{Cli, ConfigFile};

/// Summary printed after a successful generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    horn_type: String,
    length_mm: f64,
    source: MeshSource,
    vertices: usize,
    triangles: usize,
    metrics: HornMetrics,
    volume_liters: f64,
    camera: CameraFit,
}

impl From<&Generation> for Report {
    fn from(g: &Generation) -> Self {
        Self {
            horn_type: g.parameters.kind().to_string(),
            length_mm: g.parameters.length(),
            source: g.source,
            vertices: g.mesh.vertex_count(),
            triangles: g.mesh.triangle_count(),
            metrics: g.metrics,
            volume_liters: g.metrics.volume_liters(),
            camera: g.camera,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,horn_engine=info,horn_format=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let mut inputs = file.horn;
    cli.apply(&mut inputs);

    let kernel = if cli.no_kernel {
        None
    } else {
        match initialize_kernel(&mut TruckLoader, &file.pipeline.retry).await {
            Ok(kernel) => Some(kernel),
            Err(e) => {
                warn!(error = %e, "continuing without geometry kernel");
                None
            }
        }
    };

    let mut session = HornSession::new(kernel, file.pipeline);
    let report = Report::from(session.generate(&inputs).context("horn generation failed")?);
    print_report(&report, cli.json)?;

    let exported = session.export(cli.format).context("export failed")?;
    if cli.verify {
        verify(&exported, report.triangles)?;
    }

    save(&cli.output, &exported.bytes)?;
    if !cli.json {
        println!(
            "Wrote {} ({} STL, {} bytes)",
            cli.output.display(),
            exported.route,
            exported.bytes.len()
        );
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let m = &report.metrics;
    println!("Horn:             {} ({} mesh)", report.horn_type, report.source);
    println!("Length:           {:.1} mm", report.length_mm);
    println!("Cutoff frequency: {:.1} Hz", m.cutoff_frequency);
    println!("Flare constant:   {:.6} /mm", m.flare_constant);
    println!(
        "Volume:           {:.3} L (sampled wall {:.3} L)",
        report.volume_liters,
        m.sampled_volume_mm3 * 1e-6
    );
    println!(
        "Mesh:             {} vertices, {} triangles",
        report.vertices, report.triangles
    );
    println!(
        "Camera fit:       center {:?}, radius {:.1}",
        report.camera.center, report.camera.radius
    );
    Ok(())
}

/// Decode the encoded file again and check it against the mesh.
///
/// The native writer tessellates on its own, so only the mesh encoders are
/// held to the exact triangle count.
fn verify(exported: &Exported, mesh_triangles: usize) -> Result<()> {
    let facets = match exported.route {
        ExportRoute::Ascii => {
            let text = std::str::from_utf8(&exported.bytes).context("ASCII STL is not UTF-8")?;
            parse_ascii_stl(text)?
        }
        _ => parse_binary_stl(&exported.bytes)?,
    };

    if facets.is_empty() {
        bail!("exported STL has no facets");
    }
    if exported.route != ExportRoute::Native && facets.len() != mesh_triangles {
        bail!(
            "exported STL has {} facets, mesh has {} triangles",
            facets.len(),
            mesh_triangles
        );
    }
    let bad = facets
        .iter()
        .flat_map(|f| f.vertices.iter().flatten())
        .filter(|c| !c.is_finite())
        .count();
    if bad > 0 {
        bail!("exported STL has {bad} non-finite coordinates");
    }

    info!(facets = facets.len(), route = %exported.route, "verified exported STL");
    Ok(())
}
