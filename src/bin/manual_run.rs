//! Manual end-to-end run against a locally installed OpenSees binary.
//!
//! Builds a 5 m cantilever with a 10 kN tip load and runs the full
//! pipeline, printing the results as JSON. Useful for checking a local
//! OpenSees install; set `OPENSEES_EXE` to point at a specific binary.

use tracing_subscriber::EnvFilter;

use portico::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut model = StructuralModel::new();
    model.add_node(0.0, 0.0, 0.0, Restraint::fixed())?;
    model.add_node(5.0, 0.0, 0.0, Restraint::free())?;
    model.add_frame(1, 2, "A36", "W14X22")?;

    let materials = portico::catalog::default_materials();
    let sections = portico::catalog::default_sections();

    let load_case = LoadCase::new("Tip load", LoadCaseType::Live)?;
    let tip_load = NodalLoad::new(2, load_case.id).with_forces(0.0, 0.0, -10.0);

    let mut service = AnalysisService::default();
    let progress = |step: usize, total: usize, message: &str| {
        eprintln!("[{step}/{total}] {message}");
    };
    let results = service.analyze(
        &model,
        &materials,
        &sections,
        &load_case,
        &[tip_load],
        &[],
        &[],
        Some(&progress),
    );

    println!("{}", serde_json::to_string_pretty(&results)?);

    if results.success {
        if let Some(tip) = results.get_displacement(2) {
            eprintln!("tip deflection: {:.6} m", tip.uz);
        }
    }
    Ok(())
}
