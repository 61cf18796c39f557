pub const INPUTS: &str = "inputs";
pub const OUTPUTS: &str = "outputs";
pub const PARAM: &str = "param";
pub const CONDITIONAL: &str = "conditional";
pub const REPEAT: &str = "repeat";
pub const WHEN: &str = "when";
pub const OPTION: &str = "option";
pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const VALUE: &str = "value";
pub const MIN: &str = "min";

pub const SELECT: &str = "select";
pub const TEXT: &str = "text";
pub const BOOLEAN: &str = "boolean";
pub const BOOLEAN_OPTIONS: [&str; 2] = ["true", "false"];

pub const TEST: &str = "test";
pub const EXPECT_NUM_OUTPUTS: &str = "expect_num_outputs";
pub const DATA: &str = "data";
pub const COLLECTION: &str = "collection";
pub const OUTPUT: &str = "output";
pub const OUTPUT_COLLECTION: &str = "output_collection";
pub const AUTO_GEN_TEST_COMMENT: &str =
    "TODO: auto-generated test case. Please fill in the required values";
