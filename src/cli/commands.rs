//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::SelectionRequest;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::TreeStructure;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e))?,
    };
    let mut settings = Settings::load(Some(project_dir.as_path()))?;
    if let Some(data) = &cli.data {
        settings.data_file = data.clone();
    }
    debug!("settings: data_file={}", settings.data_file.display());

    match command {
        Commands::Tree {
            tree_id,
            flat,
            format,
        } => cmd_tree(settings, *tree_id, *flat, *format),
        Commands::Trees => cmd_trees(settings),
        Commands::Position { id, format } => cmd_position(settings, *id, *format),
        Commands::Validate { file } => cmd_validate(settings, file),
        Commands::Config { command } => cmd_config(&settings, command, &project_dir),
        Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(settings))]
fn cmd_tree(
    settings: Settings,
    tree_id: Option<uuid::Uuid>,
    flat: bool,
    format: Option<OutputFormat>,
) -> CliResult<()> {
    let format = format.unwrap_or(settings.format);
    let container = ServiceContainer::new(settings);
    let service = container.tree_service();

    let structure = if flat {
        service.flat_structure()?
    } else {
        match tree_id {
            Some(id) => service.build_tree(id)?,
            None => service.build_default_tree()?,
        }
    };
    print_structure(&structure, format)
}

fn print_structure(structure: &TreeStructure, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(structure),
        OutputFormat::Text => {
            output::info(&output::render_tree(&structure.name, &structure.root));
            output::diagnostics(&structure.diagnostics);
            Ok(())
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| InfraError::parse("serialize output", e))?;
    output::info(&json);
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_trees(settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let trees = container.tree_service().list_trees()?;
    if trees.is_empty() {
        output::warning("no tree definitions");
        return Ok(());
    }
    for tree in trees {
        let marker = if tree.is_default { " (default)" } else { "" };
        output::header(&format!("{}{}", tree.name, marker));
        output::detail(&format!("id: {}", tree.id));
        let levels: Vec<String> = tree
            .sorted_levels()
            .iter()
            .map(|l| format!("{}:{}", l.order, l.field_key))
            .collect();
        output::detail(&format!("levels: {}", levels.join(" > ")));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_position(settings: Settings, id: i64, format: Option<OutputFormat>) -> CliResult<()> {
    let format = format.unwrap_or(settings.format);
    let container = ServiceContainer::new(settings);
    let (position, fields, diagnostics) = container.tree_service().position_fields(id)?;

    match format {
        OutputFormat::Json => print_json(&fields)?,
        OutputFormat::Text => {
            output::header(&format!("#{} {}", position.id, position.name));
            output::resolved_fields(&fields);
            output::diagnostics(&diagnostics);
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_validate(settings: Settings, file: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let request = read_request(container.fs.as_ref(), file)?;

    let fields = container.tree_service().validate_selection(&request)?;
    output::success(&format!("valid selection ({} fields)", fields.len()));
    output::resolved_fields(&fields);
    Ok(())
}

fn read_request(fs: &dyn FileSystem, file: &Path) -> CliResult<SelectionRequest> {
    let content = fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    let request = serde_json::from_str(&content)
        .map_err(|e| InfraError::parse(format!("parse {}", file.display()), e))?;
    Ok(request)
}

fn cmd_config(
    settings: &Settings,
    command: &ConfigCommands,
    project_dir: &Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Init => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail(&"global: (no config directory)"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(project_dir).display()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct MemoryFs(HashMap<PathBuf, String>);

    impl FileSystem for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn exists(&self, path: &Path) -> bool {
            self.0.contains_key(path)
        }
    }

    #[test]
    fn test_read_request_goes_through_file_system() {
        let fs = MemoryFs(HashMap::from([(
            PathBuf::from("/virtual/request.json"),
            r#"{ "custom_fields": [] }"#.to_string(),
        )]));

        let request = read_request(&fs, Path::new("/virtual/request.json")).unwrap();

        assert!(request.custom_fields.is_empty());
    }

    #[test]
    fn test_read_request_maps_missing_and_malformed_files() {
        let fs = MemoryFs(HashMap::from([(
            PathBuf::from("/virtual/broken.json"),
            "{ not json".to_string(),
        )]));

        let missing = read_request(&fs, Path::new("/virtual/absent.json")).unwrap_err();
        let broken = read_request(&fs, Path::new("/virtual/broken.json")).unwrap_err();

        assert_eq!(missing.exit_code(), crate::exitcode::IOERR);
        assert_eq!(broken.exit_code(), crate::exitcode::DATAERR);
    }
}
