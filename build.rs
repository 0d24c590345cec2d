fn main() {
    // Values embedded with option_env! in src/config/build_info.rs
    for var in ["KBOT_VERSION", "KBOT_TARGETOS", "KBOT_TARGETARCH"] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
