use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

/// Nothing listens on the tcpmux port, so connections are refused right away.
pub const CLOSED_API_URL: &str = "http://127.0.0.1:1/api/v1";

pub fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_hagal-cli"));
    command.env_remove("HAGAL_API_URL").env_remove("HAGAL_CONFIG");
    command
}

#[allow(dead_code)]
pub fn config_file(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create config file");
    file.write_all(yaml.as_bytes()).expect("write config file");
    file
}
