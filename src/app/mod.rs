
use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::cli::{
    Cli, Command, ConvertArgs, CuesArgs, ListArgs, ProgressCommand, SaveArgs, SubsCommand,
};
use crate::http::get_bytes_with_retries;
use crate::paths::data_dir_path;
use crate::record::ProgressRecord;
use crate::storage::{FsStorage, Storage};
use crate::store::ProgressStore;
use crate::subs::vtt::Cue;
use crate::subs::{encoding, srt, vtt};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const FETCH_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Subs(command) => run_subs(command),
        Command::Progress(command) => {
            let mut store = ProgressStore::open(FsStorage::new(data_dir_path()?))?;
            run_progress(&mut store, command)
        }
    }
}

fn run_subs(command: SubsCommand) -> Result<()> {
    match command {
        SubsCommand::Convert(args) => run_convert(args),
        SubsCommand::Cues(args) => run_cues(args),
    }
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let bytes = if let Some(url) = &args.url {
        get_bytes_with_retries(url, CONNECT_TIMEOUT, READ_TIMEOUT, FETCH_ATTEMPTS, RETRY_DELAY)
            .map_err(|err| anyhow!(err))
            .with_context(|| format!("failed to fetch subtitles from {url}"))?
    } else {
        read_input(&args.input)?
    };

    let vtt_text = srt::convert_document(&encoding::decode_bytes(&bytes));

    if args.output == "-" {
        io::stdout()
            .write_all(vtt_text.as_bytes())
            .context("failed to write to stdout")
    } else {
        std::fs::write(&args.output, &vtt_text)
            .with_context(|| format!("failed to write output file '{}'", args.output))
    }
}

fn run_cues(args: CuesArgs) -> Result<()> {
    let bytes = read_input(&args.file)?;
    let cues = vtt::parse_bytes(&bytes)
        .with_context(|| format!("failed to parse '{}'", args.file))?;

    match args.at {
        Some(time) => match vtt::active_at(&cues, time) {
            Some(cue) => println!("{}", format_cue(cue)),
            None => println!("No cue active at {time}s."),
        },
        None => {
            if cues.is_empty() {
                println!("No cues found.");
            }
            for cue in &cues {
                println!("{}", format_cue(cue));
            }
        }
    }
    Ok(())
}

fn read_input(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read from stdin")?;
        return Ok(buffer);
    }
    std::fs::read(source).with_context(|| format!("failed to open input file '{source}'"))
}

fn run_progress<S: Storage>(store: &mut ProgressStore<S>, command: ProgressCommand) -> Result<()> {
    match command {
        ProgressCommand::Save(args) => {
            let record = record_from_args(args);
            let item = record.item_identifier.clone();
            let file = record.filename.clone();
            let complete = record.is_complete();
            store.save(record)?;
            if complete {
                println!("Playback complete: cleared progress for {item} | {file}");
            } else {
                println!("Recorded progress for {item} | {file}");
            }
        }
        ProgressCommand::Show { item, file } => {
            let found = match &file {
                Some(file) => store.get(&item, file),
                None => store.latest(&item),
            };
            match found {
                Some(record) => println!("{}", format_record(&record)),
                None => println!("No progress recorded for {item}."),
            }
        }
        ProgressCommand::List(ListArgs { audio, limit }) => {
            let records = if audio {
                store.continue_listening(limit)
            } else {
                store.continue_watching(limit)
            };
            if records.is_empty() {
                println!("Nothing to resume.");
            }
            for record in &records {
                println!("{}", format_record(record));
            }
        }
        ProgressCommand::Remove { item, file } => {
            match file {
                Some(file) => {
                    store.remove(&item, &file)?;
                    println!("Removed progress for {item} | {file}");
                }
                None => {
                    store.remove_all(&item)?;
                    println!("Removed all progress for {item}");
                }
            }
        }
        ProgressCommand::Clear => {
            store.clear()?;
            println!("Cleared all playback progress.");
        }
    }
    Ok(())
}

fn record_from_args(args: SaveArgs) -> ProgressRecord {
    let mut record = ProgressRecord::new(args.item, args.file, args.position, args.duration);
    record.title = args.title;
    record.media_type = args.media_type;
    record.image_url = args.image_url;
    record.track_index = args.track_index;
    record.track_filename = args.track_file;
    record.track_current_time = args.track_position;
    record
}

fn format_cue(cue: &Cue) -> String {
    format!(
        "{} --> {}  {}",
        format_seconds(cue.start),
        format_seconds(cue.end),
        cue.text.replace('\n', " / ")
    )
}

fn format_record(record: &ProgressRecord) -> String {
    let title = record.title.as_deref().unwrap_or(&record.item_identifier);
    let position = if record.is_album_level() {
        match record.track_index {
            Some(index) => format!("{:.0}% (track {index})", record.progress_fraction() * 100.0),
            None => format!("{:.0}%", record.progress_fraction() * 100.0),
        }
    } else {
        format!(
            "{} / {} ({:.0}%)",
            format_seconds(record.current_time),
            format_seconds(record.duration),
            record.progress_fraction() * 100.0
        )
    };
    format!(
        "{title} | {} | {position} | {}",
        record.filename,
        record.last_watched.format("%Y-%m-%d %H:%M")
    )
}

fn format_seconds(time: f64) -> String {
    let total_millis = (time.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
