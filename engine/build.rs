fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/analysis.proto"); // Rerun if .proto file changes
    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile(&["proto/analysis.proto"], &["proto"])?;
    Ok(())
}
