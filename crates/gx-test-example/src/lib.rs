use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn tools_root() -> PathBuf {
    workspace_root().join("demos").join("tools")
}

pub fn tool_dir(name: &str) -> PathBuf {
    tools_root().join(name)
}

pub fn tool_path(name: &str) -> PathBuf {
    tool_dir(name).join("tool.xml")
}
