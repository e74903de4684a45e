use crate::cli::{PlanArgs, QrArgs, RenderArgs};
use crate::config_wizard::Configuration;
use anyhow::{anyhow, Context, Result};
use card_press::card::CardDeck;
use card_press::print::layout::{CardPlacement, DuplexLayout};
use card_press::print::{Compositor, ExportMode, Page, SvgRasterizer};
use card_press::records;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

pub fn render(config: &Configuration, args: &RenderArgs) -> Result<()> {
    println!("Loading records...");
    let records = records::load_csv(&args.csv)
        .with_context(|| format!("Failed to load records from {}", args.csv.display()))?;

    let mode = args.mode.map(ExportMode::from).unwrap_or(config.print.mode);
    let outfile = args
        .out
        .clone()
        .unwrap_or_else(|| config.print.outfile(mode));

    let renderer = config.print.symbol_renderer();
    let deck = CardDeck {
        records: &records,
        config: &config.card,
        renderer: &renderer,
    };
    let rasterizer = SvgRasterizer::new();

    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .expect("can parse progress style")
            .progress_chars("#>-"),
    );
    progress.set_message("Rendering cards...");

    let document = Compositor::new(&rasterizer, config.print.geometry)
        .pixel_density(config.print.pixel_density)
        .pause(config.print.pause())
        .compose(&deck, mode, &progress)
        .with_context(|| "Failed to compose cards")?;
    progress.finish_with_message("Cards rendered");
    if document.pages.iter().all(Page::is_empty) {
        return Err(anyhow!("None of the {} card(s) could be rendered", records.len()));
    }

    if let Some(dir) = outfile.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }
    document
        .save(&outfile)
        .with_context(|| format!("Failed to write {}", outfile.display()))?;

    println!();
    println!("  PDF:     {}", outfile.display());
    println!("  Layout:  {mode}");
    println!("  Pages:   {}", document.pages.len());
    println!("  Cards:   {}", records.len() - document.skipped.len());
    if !document.skipped.is_empty() {
        println!(
            "  Skipped: [{}]",
            document
                .skipped
                .iter()
                .map(|&i| records[i].label())
                .collect::<Vec<String>>()
                .join("], [")
        );
    }
    if mode == ExportMode::Precision {
        println!();
        println!("To print:");
        println!("  1. Print at 100% scale (no \"fit to page\")");
        println!("  2. Cut along the crop marks");
        println!("  3. Fold each pair along the dashed line");
    }

    Ok(())
}

pub fn qr(config: &Configuration, args: &QrArgs) -> Result<()> {
    let symbol = config
        .print
        .symbol_renderer()
        .try_render(
            &args.payload,
            args.size,
            config.card.qr_colour,
            config.card.qr_bg_colour,
        )
        .with_context(|| format!("Failed to encode '{}'", args.payload))?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, symbol.to_svg())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} ({} modules, {} px) written!",
                path.display(),
                symbol.count(),
                symbol.size()
            );
        }
        None => println!("{}", symbol.to_svg()),
    }
    Ok(())
}

#[derive(Serialize)]
struct PlannedCard {
    index: usize,
    label: String,
    #[serde(flatten)]
    placement: CardPlacement,
}

pub fn plan(config: &Configuration, args: &PlanArgs) -> Result<()> {
    let records = records::load_csv(&args.csv)
        .with_context(|| format!("Failed to load records from {}", args.csv.display()))?;
    if records.is_empty() {
        return Err(anyhow!("{} contains no records", args.csv.display()));
    }
    config
        .print
        .geometry
        .validate(ExportMode::Precision)
        .with_context(|| "Invalid page geometry")?;

    let layout = DuplexLayout::new(config.print.geometry);
    let plan: Vec<PlannedCard> = records
        .iter()
        .enumerate()
        .map(|(index, record)| PlannedCard {
            index,
            label: record.label(),
            placement: layout.placement(index),
        })
        .collect();

    let json = serde_json::to_string_pretty(&plan).with_context(|| "Failed to serialize plan")?;
    println!("{json}");
    Ok(())
}
