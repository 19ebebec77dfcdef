use folio::{FormatError, FormatterBuilder};
use std::env;
use std::path::Path;
use std::time::Instant;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Formats a JSON flow document to PDF or area-tree XML.
fn main() -> Result<(), FormatError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Lays out a JSON flow document and writes PDF or area-tree XML.");
        eprintln!();
        eprintln!(
            "Usage: {} <document.json> <output.pdf|output.xml> [config.json]",
            args.first().map(String::as_str).unwrap_or("folio")
        );
        std::process::exit(1);
    }

    let builder = match args.get(3) {
        Some(config) => FormatterBuilder::from_json_file(config)?,
        None => FormatterBuilder::new(),
    };
    let formatter = builder.build()?;

    let start = Instant::now();
    let output = formatter.format_file(Path::new(&args[1]), Path::new(&args[2]))?;
    println!(
        "Wrote {} page(s) to {} in {:.2?}",
        output.tree.page_count(),
        args[2],
        start.elapsed()
    );
    if !output.unresolved.is_empty() {
        let ids: Vec<&str> = output.unresolved.ids().map(|id| id.as_str()).collect();
        eprintln!("Unresolved references: {}", ids.join(", "));
    }
    Ok(())
}
