use crate::ReportFormat;
use std::path::Path;
use wireup_core::Bootstrap;

/// Bootstrap and print the report. Returns false when bootstrap failed.
pub fn run(root: &Path, base_path: Option<&str>, strict: bool, format: ReportFormat) -> anyhow::Result<bool> {
    let settings = super::settings(base_path, strict)?;
    let discovery = super::discovery(root);
    tracing::debug!(root = %root.display(), path = %settings.configuration_path(), "Checking service layer");

    let bootstrap = match Bootstrap::new(settings, discovery) {
        Ok(bootstrap) => bootstrap,
        Err(e) => {
            eprintln!("✗ {}", e);
            return Ok(false);
        }
    };

    let report = bootstrap.report();
    let rendered = match format {
        ReportFormat::Yaml => report.to_yaml()?,
        ReportFormat::Json => report.to_json()?,
    };
    println!("{}", rendered);

    if report.is_clean() {
        eprintln!("✓ Service layer bootstrapped");
    } else {
        eprintln!("⚠ Service layer bootstrapped with {} configuration error(s)", report.errors.len());
    }
    Ok(true)
}
