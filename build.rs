// Embedded credentials and build metadata are read with `option_env!`;
// rebuild whenever they change.
fn main() {
    for var in [
        "TINCAN_EMBED_ACCESS_KEY",
        "TINCAN_EMBED_SECRET_KEY",
        "TINCAN_EMBED_REGION",
        "TINCAN_EMBED_BUCKET",
        "TINCAN_GIT_COMMIT",
        "TINCAN_BUILD_DATE",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }
}
