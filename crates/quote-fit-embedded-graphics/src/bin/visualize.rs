use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use quote_fit::QuoteRecord;
use quote_fit_embedded_graphics::{EgRenderer, EgTextMeasurer, MonoCanvas};
use quote_fit_render::{EngineConfig, QuoteEngine};

#[derive(Clone, Debug)]
struct Args {
    out_dir: String,
    width: u32,
    height: u32,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cfg = parse_args(args)?;
    fs::create_dir_all(&cfg.out_dir).map_err(|e| e.to_string())?;

    let engine = QuoteEngine::new(EngineConfig::for_display(cfg.width, cfg.height))
        .with_text_measurer(EgTextMeasurer::shared());
    let renderer = EgRenderer::new();

    for (index, record) in demo_records().iter().enumerate() {
        let composed = engine.compose(record);
        let mut canvas = MonoCanvas::new(cfg.width, cfg.height);
        renderer
            .render_page(&composed.page, &mut canvas)
            .map_err(|_| "render failed".to_string())?;

        let path = Path::new(&cfg.out_dir).join(format!("quote_{:02}.pbm", index + 1));
        fs::write(&path, canvas.to_pbm()).map_err(|e| e.to_string())?;

        println!(
            "{} size={} lines={} truncated={} diagnostics={:?}",
            path.display(),
            composed.fit.font_size,
            composed.fit.lines.len(),
            composed.fit.truncated,
            composed.diagnostics,
        );
    }
    Ok(())
}

fn demo_records() -> Vec<QuoteRecord> {
    vec![
        QuoteRecord::new(
            "'Tis now the very witching time of night, when churchyards yawn \
             and hell itself breathes out contagion to this world.",
            "witching time of night",
            "Hamlet",
            "William Shakespeare",
        ),
        QuoteRecord::new(
            "It was twelve o\u{2019}clock, and the fog had thickened into a \
             wall around the lamp posts.",
            "twelve o'clock",
            "A Winter Ledger",
            "E. Marlowe",
        ),
        QuoteRecord::new(
            "The clock struck half past two and went on striking, long past \
             any hour the household kept, until the landing filled with the \
             sound and nobody rose to stop it, and still it struck, and struck \
             again, through the small hours and into the grey edge of morning, \
             insisting on a time that no one living in the house would own.",
            "half past two",
            "The Long Stair",
            "R. Casement",
        ),
    ]
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    let mut cfg = Args {
        out_dir: "out".to_string(),
        width: 800,
        height: 480,
    };
    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out-dir" => cfg.out_dir = next_value(&mut iter, "--out-dir")?,
            "--width" => cfg.width = parse_number(&next_value(&mut iter, "--width")?)?,
            "--height" => cfg.height = parse_number(&next_value(&mut iter, "--height")?)?,
            "--help" | "-h" => return Err("help requested".to_string()),
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err("width/height must be non-zero".to_string());
    }
    Ok(cfg)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next().ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_number(value: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("invalid number: {}", value))
}

fn help_text() -> &'static str {
    "usage: visualize [--out-dir DIR] [--width W] [--height H]\n\
     Writes one PBM preview per demo record."
}
