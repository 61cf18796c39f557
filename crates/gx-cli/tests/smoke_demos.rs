use std::fs;
use std::process::Command;

#[test]
fn snippet_runs_all_demo_tools() {
    let bin = env!("CARGO_BIN_EXE_gx-cli");
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let tools_root = manifest_dir
        .join("..")
        .join("..")
        .join("demos")
        .join("tools");

    let mut directories = fs::read_dir(&tools_root)
        .expect("demo tools root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();

    assert!(!directories.is_empty(), "expected demo tools");

    for directory in directories {
        let output = Command::new(bin)
            .arg("snippet")
            .arg("--tool")
            .arg(directory.join("tool.xml"))
            .output()
            .expect("cli should execute");

        if !output.status.success() {
            panic!(
                "tool {} failed\nstdout:\n{}\nstderr:\n{}",
                directory.display(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("RESULT:OK"),
            "stdout missing RESULT:OK for {}",
            directory.display()
        );
        assert!(
            stdout.contains("<test expect_num_outputs=\"$1\">"),
            "stdout missing test case for {}",
            directory.display()
        );
    }
}

#[test]
fn snippet_expands_macros_of_demo_tool() {
    let bin = env!("CARGO_BIN_EXE_gx-cli");
    let tool = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("tools")
        .join("macros")
        .join("tool.xml");

    let output = Command::new(bin)
        .arg("snippet")
        .arg("--tool")
        .arg(&tool)
        .output()
        .expect("cli should execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TESTS:2"));
    assert!(stdout.contains("<param name=\"direction\" value=\"desc\"/>"));
    assert!(stdout.contains("<param name=\"stable\" value=\"${3|true,false|}\"/>"));
}
