use std::path::{Path, PathBuf};

fn main() {
    // Generate the demo schema into OUT_DIR; tests read the files back with include_str!
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let mut config =
        mapper_codegen::CodegenConfig::from_file(Path::new("../demos/mapper-codegen.toml"))
            .expect("invalid demo config");
    config.schema_file = PathBuf::from("../demos/orders-schema.sql");

    let report = mapper_codegen::CodegenBuilder::from_config(config)
        .output_dir(&out_dir)
        .generate()
        .expect("codegen failed");

    std::fs::write(out_dir.join("warnings.txt"), report.warnings.join("\n"))
        .expect("cannot record warnings");

    println!("cargo:rerun-if-changed=../demos/orders-schema.sql");
    println!("cargo:rerun-if-changed=../demos/mapper-codegen.toml");
}
