//! CLI tool for positional text extraction

use pdf_positions::{extract_from_file, serialize_runs, DocumentMetadata, PageRange, RunOrder};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut path: Option<&String> = None;
    let mut range = PageRange::full();
    let mut order = RunOrder::PositionSorted;
    let mut want_count = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pages" => {
                i += 1;
                match args.get(i).and_then(|s| parse_range(s)) {
                    Some(r) => range = r,
                    None => {
                        eprintln!("Invalid --pages value, expected N or MIN-MAX");
                        process::exit(1);
                    }
                }
            }
            "--stream-order" => order = RunOrder::Stream,
            "--count" => want_count = true,
            other => {
                if path.is_none() {
                    path = Some(&args[i]);
                } else {
                    eprintln!("Unexpected argument: {}", other);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    let Some(path) = path else {
        eprintln!(
            "Usage: {} <pdf_file> [--pages N | MIN-MAX] [--stream-order] [--count]",
            args[0]
        );
        eprintln!();
        eprintln!("Prints every text run as a JSON array of records, each with its");
        eprintln!("page number and bounding box.");
        process::exit(1);
    };

    let mut metadata = DocumentMetadata::default();
    match extract_from_file(path, range, order, Some(&mut metadata)) {
        Ok(runs) => {
            println!("{}", serialize_runs(&runs));
            if want_count {
                if let Some(pages) = metadata.page_count {
                    eprintln!("{} pages", pages);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn parse_range(s: &str) -> Option<PageRange> {
    if let Some((a, b)) = s.split_once('-') {
        Some(PageRange::new(a.trim().parse().ok()?, b.trim().parse().ok()?))
    } else {
        let page = s.trim().parse().ok()?;
        Some(PageRange::new(page, page))
    }
}
