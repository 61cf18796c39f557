use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gx_core::GalaxyToolError;
use gx_testgen::GalaxyToolDocument;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan, LoadedTool};

/// Reads `tool`, plus every `.xml` file next to it or below its directory when
/// the tool expands macros.
pub(crate) fn load_tool(tool: &str) -> Result<LoadedTool, GalaxyToolError> {
    let tool_path = resolve_path(tool)?;
    if !tool_path.is_file() {
        return Err(GalaxyToolError::new(
            "CLI_SOURCE_NOT_FILE",
            format!("tool is not a file: {}", tool_path.display()),
        ));
    }
    let Some(tool_dir) = tool_path.parent() else {
        return Err(GalaxyToolError::new(
            "CLI_SOURCE_PATH",
            format!("tool has no parent directory: {}", tool_path.display()),
        ));
    };

    let key = relative_key(tool_dir, &tool_path)?;
    let source = fs::read_to_string(&tool_path).map_err(map_cli_source_read)?;
    let document = GalaxyToolDocument::parse(key.clone(), &source)?;
    let mut sources = if document.uses_macros() {
        read_xml_sources_from_dir(tool_dir)?
    } else {
        BTreeMap::new()
    };
    sources.insert(key, source);

    Ok(LoadedTool { document, sources })
}

pub(crate) fn resolve_tools_dir(tools_dir: &str) -> Result<PathBuf, GalaxyToolError> {
    let path = resolve_path(tools_dir)?;
    if !path.is_dir() {
        return Err(GalaxyToolError::new(
            "CLI_SOURCE_NOT_DIR",
            format!("tools-dir is not a directory: {}", path.display()),
        ));
    }
    Ok(path)
}

pub(crate) fn resolve_path(raw: &str) -> Result<PathBuf, GalaxyToolError> {
    let path = PathBuf::from(raw);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(GalaxyToolError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("path does not exist: {}", absolute.display()),
        ));
    }
    Ok(absolute)
}

pub(crate) fn read_xml_sources_from_dir(
    dir: &Path,
) -> Result<BTreeMap<String, String>, GalaxyToolError> {
    let mut sources = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some("xml") {
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                log::warn!("Skipping unreadable source \"{}\": {}", path.display(), error);
                continue;
            }
        };
        sources.insert(relative_key(dir, path)?, content);
    }

    Ok(sources)
}

fn relative_key(dir: &Path, path: &Path) -> Result<String, GalaxyToolError> {
    Ok(path
        .strip_prefix(dir)
        .map_err(map_cli_source_scan)?
        .to_string_lossy()
        .replace('\\', "/"))
}
