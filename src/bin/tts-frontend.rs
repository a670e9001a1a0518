use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use tts_frontend::frontend::{EncodeOptionsBuilder, Pipeline, ValidationPolicy};

const USAGE: &str = "usage: tts-frontend <config.json> <lang> [--strict] [--segment] [--expand]";

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut options = EncodeOptionsBuilder::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--strict" => {
                options.validation(ValidationPolicy::Strict);
            }
            "--segment" => {
                options.use_segmentation(true);
            }
            "--expand" => {
                options.expand_text(true);
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag {flag}\n{USAGE}").into());
            }
            _ => positional.push(arg),
        }
    }
    let [config, language] = positional.as_slice() else {
        return Err(USAGE.into());
    };
    let options = options.build()?;

    let pipeline = Pipeline::from_config_file(&PathBuf::from(config))?;

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let tokens = pipeline.encode(&text, language, &options)?;
    if tokens.unknown_units() > 0 {
        log::warn!("{} units were not in the vocabulary", tokens.unknown_units());
    }
    println!("{}", serde_json::to_string(tokens.ids())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
