use std::path::PathBuf;
use std::time::Instant;

use tts_frontend::frontend::{EncodeOptionsBuilder, Pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("models/frontend.json"));

    let load_start = Instant::now();
    let pipeline = Pipeline::from_config_file(&config_path)?;
    println!("Frontend loaded in {:.2?}", load_start.elapsed());
    println!("Languages: {:?}", pipeline.registry().codes());
    println!("Vocabulary: {}", pipeline.vocabulary().version());

    let options = EncodeOptionsBuilder::default()
        .use_segmentation(true)
        .expand_text(true)
        .build()?;

    let samples = [
        ("vi", "Tp. Hồ Chí Minh có 21 quận. Xin chào Hà Nội!"),
        ("en", "Hello! This is a multilingual text frontend."),
        ("fr", "Où est l'hôpital ? Ça coûte douze euros."),
        ("es", "¿Dónde está la estación? Mañana, gracias."),
        ("de", "Größe und Übung machen den Meister."),
    ];

    for (language, text) in samples {
        if pipeline.registry().resolve(language).is_err() {
            println!("[{language}] not registered, skipping");
            continue;
        }
        let encode_start = Instant::now();
        let tokens = pipeline.encode(text, language, &options)?;
        println!(
            "[{language}] {} ids ({} unknown) in {:.2?}",
            tokens.len(),
            tokens.unknown_units(),
            encode_start.elapsed()
        );
        println!("  ids:     {:?}", tokens.ids());
        println!("  decoded: {}", pipeline.vocabulary().decode(tokens.ids()));

        let chunks = pipeline.encode_chunked(text, language, &options, 16)?;
        println!("  chunks of 16: {}", chunks.len());
    }

    Ok(())
}
