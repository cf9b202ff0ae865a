use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use lana_core::{
    ChangeSet, Chapter, SaveDirectory, SaveModel, SaveRecord, WriteMode, WriteOptions, compare,
    plan_write, read_save, write_patches,
};
use lana_render::{
    FieldSelection, render_changes_json, render_changes_text, render_json_full,
    render_json_selected, render_record_sheet, render_selected_pairs,
};
use log::warn;
use serde_json::Value as JsonValue;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(
        value_name = "SAVE",
        required_unless_present = "save_slot",
        conflicts_with = "save_slot"
    )]
    path: Option<PathBuf>,
    /// Open `slot_{n-1}.sav` from the save directory instead of a path.
    #[arg(
        long = "save-slot",
        value_name = "1|2|3",
        value_parser = clap::value_parser!(u8).range(1..=3)
    )]
    save_slot: Option<u8>,
    #[arg(long = "save-dir", value_name = "DIR", env = "LANA_SAVE_DIR")]
    save_dir: Option<PathBuf>,
    #[arg(long)]
    timestamp: bool,
    #[arg(long = "game-version")]
    game_version: bool,
    #[arg(long)]
    elapsed: bool,
    #[arg(long)]
    deaths: bool,
    #[arg(long)]
    slot: bool,
    #[arg(long)]
    chapter: bool,
    #[arg(long)]
    scene: bool,
    #[arg(long)]
    position: bool,
    #[arg(long)]
    json: bool,
    /// Protected writes replace the version, so this needs `--unprotected`.
    #[arg(long = "set-version", value_name = "VERSION", requires = "unprotected")]
    set_version: Option<String>,
    /// Slot number as shown in game.
    #[arg(
        long = "set-slot",
        value_name = "1|2|3",
        value_parser = clap::value_parser!(u64).range(1..=3)
    )]
    set_slot: Option<u64>,
    #[arg(long = "set-chapter", value_name = "ID")]
    set_chapter: Option<u64>,
    #[arg(long = "set-scene", value_name = "ID")]
    set_scene: Option<u64>,
    #[arg(long = "set-position", value_name = "X,Y,Z", value_parser = parse_position)]
    set_position: Option<[u16; 3]>,
    #[arg(long)]
    output: Option<PathBuf>,
    /// Keep the save's own time, version and death values when writing.
    #[arg(long, requires = "output")]
    unprotected: bool,
    #[arg(long, value_name = "FIELD", requires = "output")]
    only: Option<String>,
    #[arg(long, value_name = "OTHER", conflicts_with_all = ["watch", "output"])]
    compare: Option<PathBuf>,
    /// Poll the save and print what changed between reads.
    #[arg(long, conflicts_with = "output")]
    watch: bool,
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    interval: u64,
    #[arg(long = "ignore-time")]
    ignore_time: bool,
    #[arg(long, value_name = "N")]
    polls: Option<u64>,
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            timestamp: self.timestamp,
            version: self.game_version,
            elapsed: self.elapsed,
            deaths: self.deaths,
            slot: self.slot,
            chapter: self.chapter,
            scene: self.scene,
            position: self.position,
        }
    }

    fn has_edits(&self) -> bool {
        self.set_version.is_some()
            || self.set_slot.is_some()
            || self.set_chapter.is_some()
            || self.set_scene.is_some()
            || self.set_position.is_some()
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            mode: if self.unprotected {
                WriteMode::Unprotected
            } else {
                WriteMode::Protected
            },
            only: self.only.clone(),
        }
    }
}

fn parse_position(raw: &str) -> Result<[u16; 3], String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected X,Y,Z, got `{raw}`"));
    };
    let parse = |part: &str| {
        part.parse::<u16>()
            .map_err(|e| format!("invalid position component `{part}`: {e}"))
    };
    Ok([parse(x)?, parse(y)?, parse(z)?])
}

fn resolve_save_path(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.path {
        return path.clone();
    }

    // clap guarantees one of the two is present.
    let slot = cli.save_slot.unwrap_or(1);
    let directory = cli
        .save_dir
        .clone()
        .map(SaveDirectory::new)
        .or_else(SaveDirectory::from_env)
        .unwrap_or_else(|| {
            eprintln!("--save-slot needs --save-dir <DIR>, LANA_SAVE_DIR or APPDATA");
            process::exit(2);
        });
    directory.slot_path(slot - 1).unwrap_or_else(|e| {
        eprintln!("Error resolving save slot {slot}: {e}");
        process::exit(2);
    })
}

fn apply_edits(cli: &Cli, record: &mut SaveRecord) {
    if let Some(version) = &cli.set_version {
        record.version = Some(version.clone());
    }
    if let Some(slot) = cli.set_slot {
        record.slot = Some(slot - 1);
    }
    if let Some(chapter_id) = cli.set_chapter {
        if !Chapter::from_raw(chapter_id).is_known() {
            warn!("chapter id {chapter_id} is not one the game writes");
        }
        record.chapter_id = Some(chapter_id);
    }
    if let Some(scene_id) = cli.set_scene {
        record.scene_id = Some(scene_id);
    }
    if let Some(position) = cli.set_position {
        record.position = Some(position);
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_edited_copy(
    source: &Path,
    out_path: &Path,
    model: &mut SaveModel,
    options: &WriteOptions,
) {
    let patches = plan_write(model, options).unwrap_or_else(|e| {
        eprintln!("Error preparing edits: {e}");
        process::exit(1);
    });

    if !same_file(source, out_path) {
        fs::copy(source, out_path).unwrap_or_else(|e| {
            eprintln!(
                "Error copying {} to {}: {e}",
                source.display(),
                out_path.display()
            );
            process::exit(1);
        });
    }
    write_patches(out_path, &patches).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn print_changes(changes: &ChangeSet, json: bool) {
    if json {
        print_json(&render_changes_json(changes));
    } else {
        print!("{}", render_changes_text(changes));
    }
}

fn warn_on_slot_mismatch(record: &SaveRecord, watched_slot: Option<u8>) {
    let Some(watched) = watched_slot else {
        return;
    };
    match record.display_slot() {
        Some(stored) if stored != u64::from(watched) => {
            warn!("save for slot {watched} stores slot {stored}");
        }
        _ => {}
    }
}

fn watch(cli: &Cli, path: &Path, mut previous: SaveRecord) {
    warn_on_slot_mismatch(&previous, cli.save_slot);

    let mut polls = 0u64;
    while cli.polls.is_none_or(|limit| polls < limit) {
        thread::sleep(Duration::from_secs(cli.interval));
        polls += 1;

        let current = read_save(path)
            .unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            })
            .into_record();
        warn_on_slot_mismatch(&current, cli.save_slot);

        let mut changes = compare(&previous, &current);
        if cli.ignore_time {
            changes = changes.without_time();
        }
        print_changes(&changes, cli.json);
        previous = current;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let fields = cli.field_selection();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }

    let path = resolve_save_path(&cli);
    let mut model = read_save(&path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });

    if cli.watch {
        watch(&cli, &path, model.into_record());
        return;
    }

    if let Some(other_path) = &cli.compare {
        let other = read_save(other_path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {e}", other_path.display());
            process::exit(1);
        });
        print_changes(&compare(model.record(), other.record()), cli.json);
        return;
    }

    if let Some(out_path) = &cli.output {
        apply_edits(&cli, model.record_mut());
        write_edited_copy(&path, out_path, &mut model, &cli.write_options());
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(model.record(), &fields)
        } else {
            render_json_full(model.record())
        };
        print_json(&json);
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_selected_pairs(model.record(), &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print!("{}", render_record_sheet(model.record()));
}
