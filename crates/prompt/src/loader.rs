//! Template loader.
//!
//! Templates live as YAML files under `<data_dir>/templates/<name>.yml`.
//! The "default" template falls back to the built-in definition when no
//! file overrides it, so a fresh deployment answers questions without any
//! template editing.

use crate::builder::validate_layout;
use crate::types::TemplateDefinition;
use std::path::Path;
use sumika_core::{AppError, AppResult};

/// Load a template by name.
///
/// Validation runs on every load: an empty layout or a reference to an
/// unknown slot is a configuration fault surfaced as `AppError::Template`,
/// never silently patched over.
pub fn load_template(data_dir: &Path, name: &str) -> AppResult<TemplateDefinition> {
    let template_file = data_dir.join("templates").join(format!("{}.yml", name));

    tracing::debug!("Loading template from: {:?}", template_file);

    if !template_file.exists() {
        if name == "default" {
            return Ok(TemplateDefinition::builtin_default());
        }
        return Err(AppError::Template(format!(
            "Template file not found: {:?}",
            template_file
        )));
    }

    let contents = std::fs::read_to_string(&template_file).map_err(|e| {
        AppError::Template(format!(
            "Failed to read template file {:?}: {}",
            template_file, e
        ))
    })?;

    let definition: TemplateDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Template(format!(
            "Failed to parse template YAML {:?}: {}",
            template_file, e
        ))
    })?;

    validate_template(&definition)?;

    tracing::info!("Loaded template: {}", definition.name);

    Ok(definition)
}

/// List available template names. The built-in "default" is always present.
pub fn list_templates(data_dir: &Path) -> AppResult<Vec<String>> {
    let templates_dir = data_dir.join("templates");
    let mut names = vec!["default".to_string()];

    if !templates_dir.exists() {
        return Ok(names);
    }

    for entry in walkdir::WalkDir::new(&templates_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != "default" {
                    names.push(stem.to_string());
                }
            }
        }
    }

    names.sort();
    Ok(names)
}

fn validate_template(def: &TemplateDefinition) -> AppResult<()> {
    if def.name.is_empty() {
        return Err(AppError::Template("Template name cannot be empty".to_string()));
    }
    if def.layout.is_empty() {
        return Err(AppError::Template(
            "Template layout cannot be empty".to_string(),
        ));
    }
    validate_layout(&def.layout)
}
