use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use log::debug;
use quill::config::{RcConfig, RcLoader};
use quill::document_model::{Document, brackets};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Piece-table text editing from the command line")]
pub struct Cli {
    /// Read settings from this file instead of .quillrc
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every match of PATTERN in FILE
    Search {
        pattern: String,
        file: PathBuf,
        #[arg(short = 'i', long)]
        ignore_case: bool,
        #[arg(short = 'r', long)]
        regex: bool,
        #[arg(long)]
        no_color: bool,
    },
    /// Replace every match of PATTERN in FILE
    Replace {
        pattern: String,
        replacement: String,
        file: PathBuf,
        #[arg(short = 'i', long)]
        ignore_case: bool,
        #[arg(short = 'r', long)]
        regex: bool,
        /// Write the result back to FILE instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// Insert TEXT at a byte offset of FILE
    Insert {
        file: PathBuf,
        #[arg(long)]
        at: usize,
        #[arg(long)]
        text: String,
        #[arg(long)]
        in_place: bool,
    },
    /// Find the bracket matching the one before a byte offset
    Brackets {
        file: PathBuf,
        #[arg(long)]
        at: usize,
    },
    /// Print a sample .quillrc
    SampleRc,
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RcLoader::load_from(path)?,
        None => RcLoader::load_config(),
    };
    debug!("config: {config:?}");

    match cli.command {
        Command::Search {
            pattern,
            file,
            ignore_case,
            regex,
            no_color,
        } => {
            config.case_sensitive &= !ignore_case;
            config.use_regex |= regex;
            config.color &= !no_color;
            let mut doc = open(&file, &config)?;
            search(&mut doc, &pattern, &config)
        }
        Command::Replace {
            pattern,
            replacement,
            file,
            ignore_case,
            regex,
            in_place,
        } => {
            config.case_sensitive &= !ignore_case;
            config.use_regex |= regex;
            let mut doc = open(&file, &config)?;
            let count = doc
                .replace_all(&pattern, &replacement)
                .with_context(|| format!("replacing '{pattern}'"))?;
            eprintln!("{count} replacement(s)");
            finish(&mut doc, in_place)
        }
        Command::Insert {
            file,
            at,
            text,
            in_place,
        } => {
            let mut doc = open(&file, &config)?;
            doc.insert(at, &text)
                .with_context(|| format!("inserting at offset {at}"))?;
            finish(&mut doc, in_place)
        }
        Command::Brackets { file, at } => {
            let doc = open(&file, &config)?;
            match brackets::matching_bracket(&doc.text(), at) {
                Some(offset) => println!("{offset}"),
                None => println!("no matching bracket"),
            }
            Ok(())
        }
        Command::SampleRc => {
            print!("{}", RcLoader::generate_sample_rc());
            Ok(())
        }
    }
}

fn open(file: &Path, config: &RcConfig) -> Result<Document> {
    let mut doc = Document::open(file).with_context(|| format!("opening {}", file.display()))?;
    RcLoader::apply_to_document(&mut doc, config);
    Ok(doc)
}

fn finish(doc: &mut Document, in_place: bool) -> Result<()> {
    if in_place {
        doc.save().context("saving")?;
    } else {
        let mut out = io::stdout().lock();
        out.write_all(doc.line_ending.apply(&doc.text()).as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

fn search(doc: &mut Document, pattern: &str, config: &RcConfig) -> Result<()> {
    let count = doc
        .find(pattern)
        .with_context(|| format!("searching for '{pattern}'"))?;
    let text = doc.text();
    let lines: Vec<&str> = text.split('\n').collect();
    let matches = doc.search.matches.clone();
    let mut out = io::stdout().lock();

    for m in matches {
        let (line_no, column) = doc.offset_to_position(m.start);
        let Some(line) = lines.get(line_no) else {
            continue;
        };
        let end = (column + (m.end - m.start)).min(line.len());
        let (before, matched, after) = (&line[..column], &line[column..end], &line[end..]);

        write!(out, "{}:{}: ", line_no + 1, column + 1)?;
        if config.color {
            writeln!(out, "{before}{}{after}", matched.red().bold())?;
        } else {
            writeln!(out, "{line}")?;
            let prefix = format!("{}:{}: ", line_no + 1, column + 1);
            let pad = prefix.width() + before.width();
            writeln!(out, "{}{}", " ".repeat(pad), "^".repeat(matched.width().max(1)))?;
        }
    }
    writeln!(out, "{count} match(es)")?;
    Ok(())
}
