use std::{io::Error, path::PathBuf, result::Result};

use glob::glob;

fn main() -> Result<(), Error> {
    let proto_files: Vec<_> = glob("proto/**/*.proto")
        .unwrap()
        .map(Result::unwrap)
        .collect();
    println!("cargo:rerun-if-changed=proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&proto_files, &[PathBuf::from("proto")])
}
