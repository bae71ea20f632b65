use devmodel_core::ParameterSet;
use std::io::{self, Read};

/// Read a piped parameter set (JSON, or YAML as a fallback).
/// Returns None when stdin is a TTY or carries nothing.
pub fn read_stdin_params() -> Result<Option<ParameterSet>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_params(&buffer)
}

fn parse_params(text: &str) -> Result<Option<ParameterSet>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(params) => Ok(Some(params)),
        Err(json_err) => serde_yaml::from_str(trimmed)
            .map(Some)
            .map_err(|_| format!("stdin is neither a JSON nor a YAML parameter set: {json_err}").into()),
    }
}
