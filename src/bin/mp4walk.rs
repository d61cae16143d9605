use clap::{ArgAction, Parser, Subcommand};
use mp4walk::{Forward, ITunesMetadata, Mvhd, Seekable, Source, Tkhd, copy_cover, dump};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

#[derive(Parser, Debug)]
#[command(version, about = "Streaming MP4/QuickTime atom walker")]
struct Args {
    /// Read the input as a forward-only stream, skipping by reading instead of seeking
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    stream: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print type path, offset and size of every atom
    Dump {
        /// MP4 file path, or - for stdin
        path: String,
        /// Emit JSON instead of one line per atom
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Print iTunes metadata as JSON
    Itunes {
        /// MP4 file path, or - for stdin
        path: String,
        /// Collect values by looking at each data atom's ancestors
        #[arg(long, action = ArgAction::SetTrue)]
        uplooking: bool,
    },
    /// Print the movie header as JSON
    Mvhd {
        /// MP4 file path, or - for stdin
        path: String,
    },
    /// Print the track headers as JSON
    Tkhd {
        /// MP4 file path, or - for stdin
        path: String,
    },
    /// Copy the cover art image
    Cover {
        /// MP4 file path, or - for stdin
        path: String,
        /// Output file (defaults to stdout)
        output: Option<String>,
    },
}

impl Command {
    fn path(&self) -> &str {
        match self {
            Command::Dump { path, .. }
            | Command::Itunes { path, .. }
            | Command::Mvhd { path }
            | Command::Tkhd { path }
            | Command::Cover { path, .. } => path.as_str(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let path = args.command.path();
    if path == "-" {
        return run(&args.command, Forward(io::stdin().lock()));
    }
    let f = BufReader::new(File::open(path)?);
    if args.stream {
        run(&args.command, Forward(f))
    } else {
        run(&args.command, Seekable::new(f))
    }
}

fn run<S: Source>(command: &Command, source: S) -> anyhow::Result<()> {
    match command {
        Command::Dump { json, .. } => {
            let entries = dump(source)?;
            if *json {
                print_json(&entries)?;
            } else {
                let mut out = io::stdout().lock();
                for e in &entries {
                    writeln!(out, "{e}")?;
                }
            }
        }
        Command::Itunes { uplooking, .. } => {
            let mut meta = ITunesMetadata::default();
            if *uplooking {
                meta.read_uplooking(source)?;
            } else {
                meta.read(source)?;
            }
            print_json(&meta)?;
        }
        Command::Mvhd { .. } => match Mvhd::read(source)? {
            Some(mvhd) => print_json(&mvhd)?,
            None => anyhow::bail!("no mvhd atom found"),
        },
        Command::Tkhd { .. } => print_json(&Tkhd::read_all(source)?)?,
        Command::Cover { output, .. } => {
            let copied = match output {
                Some(out) => {
                    let mut wr = BufWriter::new(File::create(out)?);
                    let n = copy_cover(source, &mut wr)?;
                    wr.flush()?;
                    n
                }
                None => {
                    let mut wr = io::stdout().lock();
                    let n = copy_cover(source, &mut wr)?;
                    wr.flush()?;
                    n
                }
            };
            log::info!("copied {copied} bytes of cover art");
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
