use gx_core::GalaxyToolError;
use gx_macros::SourceMapExpander;
use gx_testgen::{GalaxyToolDocument, SnippetOptions, TestSnippetGenerator};

use crate::{
    load_tool, map_cli_json_encode, read_xml_sources_from_dir, resolve_tools_dir, LoadedTool,
    ScanArgs, SnippetArgs, TreeArgs,
};

pub(super) fn run_snippet(args: SnippetArgs) -> Result<i32, GalaxyToolError> {
    let options = SnippetOptions {
        tab_size: args.tab_size,
        numbering: args.numbering.into(),
    };
    let generator = tool_generator(load_tool(&args.tool)?)?;
    let snippet = generator.generate_test_suite_snippet(&options);

    println!("RESULT:OK");
    println!("TOOL:{}", generator.document().path());
    println!("TESTS:{}", generator.input_tree().leaves().len());
    print!("{}", snippet);
    Ok(0)
}

pub(super) fn run_tree(args: TreeArgs) -> Result<i32, GalaxyToolError> {
    let generator = tool_generator(load_tool(&args.tool)?)?;
    let tree = generator.input_tree();

    println!("RESULT:OK");
    if args.json {
        println!(
            "TREE_JSON:{}",
            serde_json::to_string(&tree.summary()).map_err(map_cli_json_encode)?
        );
    } else {
        print!("{}", tree.render());
    }
    Ok(0)
}

pub(super) fn run_scan(args: ScanArgs) -> Result<i32, GalaxyToolError> {
    let tools_dir = resolve_tools_dir(&args.tools_dir)?;
    let sources = read_xml_sources_from_dir(&tools_dir)?;
    let expander = SourceMapExpander::new(sources);

    let mut lines = Vec::new();
    for (path, source) in expander.sources() {
        let document = match GalaxyToolDocument::parse(path.as_str(), source) {
            Ok(document) => document,
            Err(error) => {
                log::warn!("Skipping \"{}\": {}", path, error);
                continue;
            }
        };
        if !document.is_valid() {
            log::debug!("Skipping \"{}\": not a tool.", path);
            continue;
        }
        let generator = TestSnippetGenerator::new(document, Some(&expander));
        lines.push(format!(
            "TOOL:{} TESTS:{}",
            path,
            generator.input_tree().leaves().len()
        ));
    }

    if lines.is_empty() {
        return Err(GalaxyToolError::new(
            "CLI_SOURCE_EMPTY",
            format!("No tool files under {}", tools_dir.display()),
        ));
    }

    println!("RESULT:OK");
    println!("TOOLS:{}", lines.len());
    for line in lines {
        println!("{}", line);
    }
    Ok(0)
}

fn tool_generator(loaded: LoadedTool) -> Result<TestSnippetGenerator, GalaxyToolError> {
    if !loaded.document.is_valid() {
        return Err(GalaxyToolError::new(
            "CLI_NOT_A_TOOL",
            format!(
                "\"{}\" has a <{}> root, not <tool>.",
                loaded.document.path(),
                loaded.document.root().name
            ),
        ));
    }
    let expander = SourceMapExpander::new(loaded.sources);
    Ok(TestSnippetGenerator::new(loaded.document, Some(&expander)))
}
