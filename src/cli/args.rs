use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agpe-map")]
#[command(about = "AGPE EBSA customer map: search meter records and plot them on a map")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: agpe-map.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the interactive map with a search box
    Serve {
        #[arg(short, long, help = "Input CSV file [default: from configuration]")]
        input: Option<PathBuf>,

        #[arg(long, help = "Address to bind [default: from configuration]")]
        host: Option<String>,

        #[arg(short, long, help = "Port to listen on [default: from configuration]")]
        port: Option<u16>,
    },

    /// Write a standalone HTML map for one search
    Render {
        #[arg(short, long, help = "Input CSV file [default: from configuration]")]
        input: Option<PathBuf>,

        #[arg(short, long, default_value = "", help = "Search text (empty shows every record)")]
        query: String,

        #[arg(
            short,
            long,
            help = "Output HTML file path [default: output/agpe-map-{YYMMDD}.html]"
        )]
        output: Option<PathBuf>,
    },

    /// Print the records matching a search
    Search {
        #[arg(short, long, help = "Input CSV file [default: from configuration]")]
        input: Option<PathBuf>,

        #[arg(short, long, default_value = "", help = "Search text (empty shows every record)")]
        query: String,

        #[arg(long, help = "Print the map view as JSON")]
        json: bool,
    },

    /// Load the input file and report rows dropped for bad coordinates
    Validate {
        #[arg(short, long, help = "Input CSV file [default: from configuration]")]
        input: Option<PathBuf>,
    },
}
