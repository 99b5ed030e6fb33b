//! Arbor CLI
//!
//! Parses an XML-like file (or an inline string) and prints the resulting
//! tree. Diagnostics go to stderr; set `RUST_LOG` or pass `-v` for more.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use arbor_dom::{Document, NodeId};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Arbor: parse an XML-like document and print its tree
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    arbor ./config.xml

    # Parse an inline string
    arbor --xml '<a k="v">hello<b/></a>'

    # Only check that a file parses
    arbor -q ./config.xml
"#)]
struct Cli {
    /// Path to the document to parse
    #[arg(value_name = "FILE", required_unless_present = "xml", conflicts_with = "xml")]
    file: Option<PathBuf>,

    /// Parse this string instead of reading a file
    #[arg(long, value_name = "XML")]
    xml: Option<String>,

    /// Print only the declaration metadata, not the tree
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `-v` when both are given.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let doc = if let Some(ref xml) = cli.xml {
        arbor_xml::parse(xml).context("failed to parse inline document")?
    } else if let Some(ref path) = cli.file {
        arbor_xml::load(path).with_context(|| format!("failed to load {}", path.display()))?
    } else {
        anyhow::bail!("a file path or --xml is required")
    };
    debug!(nodes = doc.len(), "document ready");

    print_metadata(&doc);
    if !cli.quiet {
        println!("{}", "=== Tree ===".bold());
        for &child in doc.children(doc.root()) {
            print_tree(&doc, child, 0);
        }
        if let Some(text) = doc.root_node().text() {
            println!("{}", format!("(top-level text) \"{text}\"").dimmed());
        }
    }

    doc.destroy();
    Ok(())
}

fn print_metadata(doc: &Document) {
    println!(
        "version: {}  encoding: {}",
        doc.version().unwrap_or("-"),
        doc.encoding().unwrap_or("-")
    );
}

fn print_tree(doc: &Document, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = doc.get(id) else {
        return;
    };

    let tag = node.tag().unwrap_or_default();
    if node.attributes().is_empty() {
        println!("{prefix}<{}>", tag.cyan());
    } else {
        let attrs: Vec<String> = node
            .attributes()
            .iter()
            .map(|attr| format!("{}=\"{}\"", attr.key().yellow(), attr.value()))
            .collect();
        println!("{prefix}<{} {}>", tag.cyan(), attrs.join(" "));
    }

    if let Some(text) = node.text() {
        let display = text.replace('\n', "\\n");
        println!("{prefix}  {}", format!("\"{display}\"").green());
    }

    for &child in doc.children(id) {
        print_tree(doc, child, indent + 1);
    }
}
