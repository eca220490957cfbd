pub const MOLANNOT_DISPLAY_VERSION: &str = env!("MOLANNOT_DISPLAY_VERSION");
pub const MOLANNOT_BUILD_N: &str = env!("MOLANNOT_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "mol-annotator {}\nBuild {}\nReview tool for molecule transformation records",
        MOLANNOT_DISPLAY_VERSION, MOLANNOT_BUILD_N
    )
}
