//! Runs every `tests/fixtures/*.php` case.
//!
//! A fixture starts with a `#!add <flags>` or `#!remove` line, followed by
//! the input, a `-----` line and the expected output. `add` flags go through
//! the real argument parser on top of `--php 7.0 --no-strict-types`, so each
//! fixture only names the features it needs.

use clap::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use typehinter::cli::{Cli, Commands};
use typehinter::{add_to_sources, remove_from_source, HintOptions};

const BASE_FLAGS: &[&str] = &["--php", "7.0", "--no-strict-types"];

struct Fixture {
    mode: String,
    flags: Vec<String>,
    input: String,
    expected: String,
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(name: &str) -> Fixture {
    let path = fixtures_dir().join(format!("{name}.php"));
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));

    let (header, body) = text.split_once('\n').expect("fixture has a header line");
    let mut words = header
        .strip_prefix("#!")
        .expect("header starts with #!")
        .split_whitespace()
        .map(str::to_string);
    let mode = words.next().expect("header names a mode");
    let flags = words.collect();

    let (input, expected) = body
        .split_once("\n-----\n")
        .expect("fixture has a ----- separator");
    Fixture {
        mode,
        flags,
        input: input.to_string(),
        expected: expected.to_string(),
    }
}

fn options_from_flags(flags: &[String]) -> HintOptions {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let argv = ["typehinter", "add"]
        .into_iter()
        .chain(BASE_FLAGS.iter().copied())
        .chain(flags.iter().map(String::as_str))
        .chain([manifest_dir]);

    match Cli::try_parse_from(argv).expect("fixture flags parse").command {
        Commands::Add(args) => args.hint_options(None).expect("valid options"),
        Commands::Remove(_) => unreachable!("parsed as add"),
    }
}

fn run_fixture(name: &str) {
    let fixture = load_fixture(name);
    let path = PathBuf::from(format!("{name}.php"));

    let output = match fixture.mode.as_str() {
        "add" => {
            let options = options_from_flags(&fixture.flags);
            add_to_sources(&[(path.as_path(), fixture.input.as_str())], &options)
                .expect("add succeeds")
                .remove(0)
        }
        "remove" => remove_from_source(&path, &fixture.input).expect("remove succeeds"),
        other => panic!("unknown fixture mode {other}"),
    };

    assert_eq!(
        output.trim(),
        fixture.expected.trim(),
        "fixture {name} ({} {:?})",
        fixture.mode,
        fixture.flags
    );
}

macro_rules! fixtures {
    ($($name:ident),* $(,)?) => {
        const FIXTURE_NAMES: &[&str] = &[$(stringify!($name)),*];

        $(
            #[test]
            fn $name() {
                run_fixture(stringify!($name));
            }
        )*
    };
}

fixtures! {
    anonymous_class,
    basic,
    builtin,
    closures,
    comments_in_signature,
    inheritance,
    interface,
    iterable,
    name_resolution,
    null,
    nullable,
    nullable_inheritance,
    object,
    php_version,
    promoted_params,
    property_types,
    remove,
    remove_comments_in_signature,
    rename,
    self_inheritance,
    self_parent_static,
    strict_types,
    trait_pseudo_parents,
}

#[test]
fn test_every_fixture_file_is_listed() {
    let mut on_disk: Vec<String> = fs::read_dir(fixtures_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "php"))
        .filter_map(|path| Some(path.file_stem()?.to_str()?.to_string()))
        .collect();
    on_disk.sort();

    let mut listed: Vec<String> = FIXTURE_NAMES.iter().map(|name| name.to_string()).collect();
    listed.sort();

    assert_eq!(on_disk, listed);
}

#[test]
fn test_add_output_is_stable_under_a_second_run() {
    for name in FIXTURE_NAMES {
        let fixture = load_fixture(name);
        if fixture.mode != "add" {
            continue;
        }
        let options = options_from_flags(&fixture.flags);
        let path = PathBuf::from(format!("{name}.php"));
        let expected = fixture.expected.trim_start().to_string();
        let again = add_to_sources(&[(path.as_path(), expected.as_str())], &options)
            .unwrap()
            .remove(0);
        assert_eq!(again, expected, "second add over {name} changed it");
    }
}
