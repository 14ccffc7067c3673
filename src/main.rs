use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use specializer::extern_decl::load_manifest;
use specializer::language::{builtin_registry, LanguageRegistry};
use specializer::logging::{self, LogConfig, LogFormat};
use specializer::{SpecResult, Specialize, SpecializeError, Specializer, TargetLanguage};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_cli() -> ClapCommand {
    ClapCommand::new("specializer")
        .version("0.1.0")
        .about("Render inline extern declarations into C or Chapel source")
        .arg(
            Arg::new("manifest")
                .help("JSON file holding the extern declarations")
                .required_unless_present("list-languages")
                .index(1),
        )
        .arg(
            Arg::new("lang")
                .short('l')
                .long("lang")
                .help("Target language")
                .default_value("c"),
        )
        .arg(
            Arg::new("templates")
                .short('t')
                .long("templates")
                .help("Directory holding the inline.prefix/inline.func templates")
                .default_value("templates"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the generated source here instead of stdout"),
        )
        .arg(
            Arg::new("no-prefix")
                .long("no-prefix")
                .help("Omit the prefix template")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("allow-arity-mismatch")
                .long("allow-arity-mismatch")
                .help("Truncate to the shorter of argument names and types instead of failing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("languages")
                .long("languages")
                .help("TOML file declaring additional target languages"),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .help("Print the registered languages and their type tables")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Emit logs as JSON")
                .action(ArgAction::SetTrue),
        )
}

fn run() -> SpecResult<()> {
    let matches = build_cli().get_matches();

    let format = if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logging::init(LogConfig::from_verbosity(matches.get_count("verbose")).with_format(format));

    let registry = load_registry(matches.get_one::<String>("languages").map(Path::new))?;

    if matches.get_flag("list-languages") {
        return write_stdout(render_listing(&registry).as_bytes());
    }

    let source = generate(&matches, &registry)?;
    write_output(matches.get_one::<String>("output").map(String::as_str), &source)
}

fn load_registry(extra: Option<&Path>) -> SpecResult<LanguageRegistry> {
    let mut registry = builtin_registry().clone();
    if let Some(path) = extra {
        let added = registry.load_toml(path)?;
        tracing::info!(path = %path.display(), added, "loaded language declarations");
    }
    Ok(registry)
}

fn resolve_language<'a>(registry: &'a LanguageRegistry, name: &str) -> SpecResult<&'a TargetLanguage> {
    registry
        .get(name)
        .ok_or_else(|| SpecializeError::UnsupportedLanguage {
            language: name.to_string(),
        })
}

fn generate(matches: &ArgMatches, registry: &LanguageRegistry) -> SpecResult<String> {
    let lang_name = matches
        .get_one::<String>("lang")
        .map(String::as_str)
        .unwrap_or("c");
    let language = resolve_language(registry, lang_name)?;

    let templates = matches
        .get_one::<String>("templates")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("templates"));
    let specializer = Specializer::new(language, &templates)
        .with_strict_arity(!matches.get_flag("allow-arity-mismatch"));

    let manifest = matches
        .get_one::<String>("manifest")
        .map(PathBuf::from)
        .unwrap_or_default();
    let externs = load_manifest(&manifest)?;
    tracing::info!(
        language = %specializer.language().name,
        externs = externs.len(),
        templates = %templates.display(),
        "specializing"
    );

    specializer.specialize(&externs, !matches.get_flag("no-prefix"))
}

fn render_listing(registry: &LanguageRegistry) -> String {
    let mut listing = String::new();
    for name in registry.names() {
        let Some(language) = registry.get(name) else {
            continue;
        };
        listing.push_str(&format!(
            "{} ({}, {}, {:?})\n",
            language.name, language.prefix_filename, language.func_filename, language.join_style
        ));
        for (ty, spelling) in &language.type_table {
            listing.push_str(&format!("    {:<8} -> {}\n", ty.as_str(), spelling));
        }
    }
    listing
}

fn write_output(output: Option<&str>, source: &str) -> SpecResult<()> {
    match output {
        Some(out) => {
            fs::write(out, source).map_err(|e| SpecializeError::FileAccess {
                path: PathBuf::from(out),
                source: e,
            })?;
            tracing::info!(output = %out, bytes = source.len(), "wrote generated source");
            Ok(())
        }
        None => write_stdout(source.as_bytes()),
    }
}

fn write_stdout(bytes: &[u8]) -> SpecResult<()> {
    io::stdout()
        .write_all(bytes)
        .map_err(|source| SpecializeError::FileAccess {
            path: PathBuf::from("<stdout>"),
            source,
        })
}
