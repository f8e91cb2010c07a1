//! CLI: one subcommand per editor command.
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use dart_devtools::classgen::{AccessorKind, ClassGen};
use dart_devtools::document::{
    Applied, DartFormatter, DocumentEditor, FileEditor, Formatter, NoopFormatter, Position, Range,
};
use dart_devtools::json_to_dart::JsonToDart;
use dart_devtools::l10n::{
    self, BatchReport, CancelFlag, ExtractRequest, IndicatifProgress, L10nDefinitions, Location, Progress,
};
use dart_devtools::outline::{JsonOutlineProvider, OutlineProvider};
use dart_devtools::project_tree::TreeNode;
use dart_devtools::terminal::{self, ToolCommand};
use dart_devtools::{Error, Workspace, naming, routes, synth};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Dart and Flutter project tooling
#[derive(Parser, Debug)]
#[command(name = "dart-devtools", version)]
pub struct CommandLineInterface {
    /// workspace root
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// debug logging (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the Dart classes for a JSON sample
    Classes(ClassesOut),
    /// generate Dart classes from a JSON sample, at the cursor
    Json2dart(JsonToDartArgs),
    /// add an unnamed constructor to the class at the cursor
    Constructor(Selected),
    /// add fromJson / toJson / fromJsonList and the json_serializable wiring
    Serialization(Selected),
    /// privatize the selected fields and add getters
    Getter(Selected),
    /// privatize the selected fields and add setters
    Setter(Selected),
    /// privatize the selected fields and add getters and setters
    Accessors(Selected),
    /// translate every template message missing from an ARB file
    TranslateArb(TranslateArbArgs),
    /// move the string literal at the cursor into the ARB files
    ExtractL10n(ExtractArgs),
    /// ARB entries for the `S.current.key` at the cursor
    L10nDefinition(Cursor),
    /// generated getter and sibling entries for the ARB key on a line
    ArbReference(Cursor),
    /// GetX route declarations or usages for the route name at the cursor
    RouteDefinition(OutlinedCursor),
    /// image previews for the `Images.xxx` reference at the cursor
    ImageHover(Cursor),
    /// project view and file operations
    #[command(subcommand)]
    Tree(TreeCommand),
    /// flutter tool commands, printed or run
    #[command(subcommand)]
    Tool(ToolCommandArgs),
}

/// Zero-based cursor in a file.
#[derive(Args, Debug, Clone)]
struct Cursor {
    /// source file, relative to the root
    #[arg(long, short)]
    file: PathBuf,
    #[arg(long, short)]
    line: usize,
    #[arg(long, short, default_value_t = 0)]
    column: usize,
}

#[derive(Args, Debug, Clone)]
struct OutlinedCursor {
    #[command(flatten)]
    cursor: Cursor,
    /// outline dump (defaults to `<file>.outline.json`)
    #[arg(long)]
    outline: Option<PathBuf>,
}

/// A selection plus the outline of its file.
#[derive(Args, Debug, Clone)]
struct Selected {
    #[command(flatten)]
    at: OutlinedCursor,
    /// selection end line (defaults to the cursor)
    #[arg(long)]
    end_line: Option<usize>,
    #[arg(long)]
    end_column: Option<usize>,
}

/// JSON sample given inline or as a file.
#[derive(Args, Debug, Clone)]
struct JsonInput {
    /// file holding the JSON sample
    #[arg(long, conflicts_with = "json")]
    json_file: Option<PathBuf>,
    /// inline JSON sample
    #[arg(long)]
    json: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ClassesOut {
    #[command(flatten)]
    input: JsonInput,
    /// top-level Dart class name, before the configured suffix
    #[arg(long, default_value = "Root")]
    class_name: String,
    /// output .dart file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct JsonToDartArgs {
    #[command(flatten)]
    selected: Selected,
    #[command(flatten)]
    input: JsonInput,
    /// class to create when the cursor is outside any class
    #[arg(long)]
    class_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct TranslateArbArgs {
    /// ARB file to complete
    #[arg(long, short)]
    file: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ExtractArgs {
    #[command(flatten)]
    cursor: Cursor,
    /// key to use instead of deriving one
    #[arg(long)]
    key: Option<String>,
    /// only write the template ARB file
    #[arg(long)]
    no_translate: bool,
}

#[derive(Subcommand, Debug)]
enum TreeCommand {
    /// list a folder (the root when omitted)
    Ls {
        dir: Option<PathBuf>,
        /// print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// create an empty file
    Add {
        name: String,
        #[arg(long)]
        parent: Option<PathBuf>,
    },
    /// create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<PathBuf>,
    },
    /// rename a file or folder in place
    Rename { path: PathBuf, new_name: String },
    /// delete a file or folder
    Rm {
        path: PathBuf,
        /// skip the confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ToolCommandArgs {
    /// build_runner for the project, or for one file's generated output
    BuildRunner {
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        exec: Exec,
    },
    /// flutter pub deps
    Deps {
        #[command(flatten)]
        exec: Exec,
    },
    /// flutter gen-l10n
    GenL10n {
        #[command(flatten)]
        exec: Exec,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct Exec {
    /// run the command instead of printing it
    #[arg(long)]
    run: bool,
}

#[derive(Debug, Clone, Copy)]
enum Output {
    Text,
    Json,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Cursor {
    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// The cursor's line of text.
    fn line_text(&self, ws: &Workspace) -> anyhow::Result<String> {
        let path = ws.resolve(&self.file);
        let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(text.lines().nth(self.line).unwrap_or_default().to_string())
    }
}

impl JsonInput {
    fn read(&self, ws: &Workspace) -> anyhow::Result<String> {
        match (&self.json, &self.json_file) {
            (Some(json), _) => Ok(json.clone()),
            (None, Some(file)) => {
                let path = ws.resolve(file);
                std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
            }
            (None, None) => bail!("pass the JSON sample with --json or --json-file"),
        }
    }
}

impl OutlinedCursor {
    fn provider(&self, ws: &Workspace) -> JsonOutlineProvider {
        JsonOutlineProvider::new(self.outline.as_ref().map(|p| ws.resolve(p)))
    }
}

impl Selected {
    fn range(&self) -> Range {
        let start = self.at.cursor.position();
        let end = Position::new(
            self.end_line.unwrap_or(start.line),
            self.end_column.unwrap_or(start.character),
        );
        Range::new(start, end.max(start))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let ws = Workspace::open(&self.root)?;
        debug!(root = ?ws.root(), "workspace opened");
        match &self.cmd {
            Command::Classes(target) => classes(&ws, target),
            Command::Json2dart(args) => json_to_dart(&ws, args),
            Command::Constructor(sel) => with_class_gen(&ws, sel, |generator, path, range| {
                Ok(generator.generate_constructor(path, range)?.into_iter().collect())
            }),
            Command::Serialization(sel) => {
                with_class_gen(&ws, sel, |generator, path, range| Ok(generator.generate_serialization(path, range)?))
            }
            Command::Getter(sel) => accessors(&ws, sel, AccessorKind::Getter),
            Command::Setter(sel) => accessors(&ws, sel, AccessorKind::Setter),
            Command::Accessors(sel) => accessors(&ws, sel, AccessorKind::Both),
            Command::TranslateArb(args) => translate_arb(&ws, args),
            Command::ExtractL10n(args) => extract_l10n(&ws, args),
            Command::L10nDefinition(cursor) => {
                let mut defs = L10nDefinitions::new(ws.l10n_config()?.clone());
                let found = defs.definition(&cursor.line_text(&ws)?, cursor.column)?;
                print_locations(&ws, &found);
                Ok(())
            }
            Command::ArbReference(cursor) => {
                let mut defs = L10nDefinitions::new(ws.l10n_config()?.clone());
                let found = defs.references(&ws.resolve(&cursor.file), &cursor.line_text(&ws)?)?;
                print_locations(&ws, &found);
                Ok(())
            }
            Command::RouteDefinition(at) => route_definition(&ws, at),
            Command::ImageHover(cursor) => {
                let Some(assets) = ws.assets() else {
                    bail!("imagesFilePath is not configured in {}", dart_devtools::settings::SETTINGS_FILE);
                };
                let previews = assets.hover(&ws.resolve(&cursor.file), &cursor.line_text(&ws)?, cursor.column)?;
                for preview in previews {
                    println!("{}", preview.markdown());
                }
                Ok(())
            }
            Command::Tree(cmd) => tree(&ws, cmd),
            Command::Tool(cmd) => tool(&ws, cmd),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMMANDS
// ————————————————————————————————————————————————————————————————————————————

fn classes(ws: &Workspace, target: &ClassesOut) -> anyhow::Result<()> {
    let settings = ws.settings();
    let name = target.class_name.trim();
    if !naming::is_dart_class_name(name) {
        return Err(Error::InvalidClassName(name.to_string()).into());
    }
    let root = synth::parse_root(&target.input.read(ws)?)?;
    let full = format!("{name}{}", settings.class_suffix);
    let dart_src = synth::synthesize_all(&root, &full, &settings.synth_options()).into_source();
    if let Some(out) = target.out.as_ref() {
        let out = ws.resolve(out);
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out, format!("{dart_src}\n"))?;
        println!("{} {}", "wrote".green(), out.display());
    } else {
        println!("{dart_src}");
    }
    Ok(())
}

fn json_to_dart(ws: &Workspace, args: &JsonToDartArgs) -> anyhow::Result<()> {
    let json = args.input.read(ws)?;
    let settings = ws.settings();
    with_class_gen(ws, &args.selected, |generator, path, selection| {
        let command = JsonToDart { path, selection, json: &json, class_name: args.class_name.as_deref() };
        Ok(command.run(generator, settings)?)
    })
}

fn accessors(ws: &Workspace, sel: &Selected, kind: AccessorKind) -> anyhow::Result<()> {
    with_class_gen(ws, sel, |generator, path, range| Ok(generator.generate_accessors(path, range, kind)?))
}

/// Run one class generation command against the file on disk, then format.
fn with_class_gen(
    ws: &Workspace,
    sel: &Selected,
    command: impl FnOnce(&mut ClassGen<'_>, &Path, Range) -> anyhow::Result<Vec<Applied>>,
) -> anyhow::Result<()> {
    let path = ws.resolve(&sel.at.cursor.file);
    let provider = sel.at.provider(ws);
    let mut editor = FileEditor::new(formatter());
    let mut generator = ClassGen::new(&provider, &mut editor).with_converters(ws.settings().converters.clone());
    let steps = command(&mut generator, &path, sel.range())?;
    if steps.is_empty() {
        println!("{}", "nothing to change".dimmed());
        return Ok(());
    }
    generator.finish(&path, &ws.settings().format_options())?;
    let edits: usize = steps.iter().map(|s| s.edits.len()).sum();
    println!("{} {} edit(s) in {} step(s) to {}", "applied".green(), edits, steps.len(), path.display());
    Ok(())
}

fn formatter() -> Box<dyn Formatter> {
    match DartFormatter::discover() {
        Some(dart) => Box::new(dart),
        None => {
            debug!("dart not on PATH, output stays unformatted");
            Box::new(NoopFormatter)
        }
    }
}

fn translate_arb(ws: &Workspace, args: &TranslateArbArgs) -> anyhow::Result<()> {
    let config = ws.l10n_config()?;
    let progress = IndicatifProgress::bar(0);
    let report = l10n::translate_arb(
        config,
        &ws.resolve(&args.file),
        ws.translator()?,
        &CancelFlag::new(),
        &progress,
    )?;
    progress.finish("done");
    print_report(&report);
    Ok(())
}

fn extract_l10n(ws: &Workspace, args: &ExtractArgs) -> anyhow::Result<()> {
    let config = ws.l10n_config()?;
    let path = ws.resolve(&args.cursor.file);
    let request = ExtractRequest {
        path: &path,
        position: args.cursor.position(),
        translate: !args.no_translate,
        key: args.key.as_deref(),
        require_key: ws.settings().show_rename_dialog,
    };
    let mut editor = FileEditor::new(Box::new(NoopFormatter));
    let progress = IndicatifProgress::spinner();
    let extraction = l10n::extract_l10n(
        &mut editor,
        config,
        ws.translator()?,
        &request,
        &CancelFlag::new(),
        &progress,
    )?;
    if extraction.applied.is_none() {
        println!("{}", "cancelled, nothing changed".yellow());
        return Ok(());
    }
    let verb = if extraction.reused { "reused" } else { "added" };
    println!("{} {} → {}", verb.green(), extraction.key.bold(), extraction.reference);
    print_report(&extraction.report);
    Ok(())
}

fn route_definition(ws: &Workspace, at: &OutlinedCursor) -> anyhow::Result<()> {
    let path = ws.resolve(&at.cursor.file);
    let doc = FileEditor::new(Box::new(NoopFormatter)).document(&path)?;
    let outline = at.provider(ws).outline(&path)?;
    let Some(def) = routes::route_definition(&doc, &outline, at.cursor.position()) else {
        println!("{}", "no route here".dimmed());
        return Ok(());
    };
    for target in def.targets {
        let location = Location { path: path.clone(), position: target.position };
        match target.page {
            Some(page) => println!("{}  {}", format_location(ws, &location), page.cyan()),
            None => println!("{}", format_location(ws, &location)),
        }
    }
    Ok(())
}

fn tree(ws: &Workspace, cmd: &TreeCommand) -> anyhow::Result<()> {
    let tree = ws.project_tree();
    let resolve = |p: &Option<PathBuf>| p.as_ref().map(|p| ws.resolve(p));
    match cmd {
        TreeCommand::Ls { dir, json } => {
            let nodes = tree.children(resolve(dir).as_deref())?;
            let output = if *json { Output::Json } else { Output::Text };
            print_nodes(&nodes, output)?;
        }
        TreeCommand::Add { name, parent } => {
            let path = tree.create_file(resolve(parent).as_deref(), name)?;
            println!("{} {}", "created".green(), path.display());
        }
        TreeCommand::Mkdir { name, parent } => {
            let path = tree.create_folder(resolve(parent).as_deref(), name)?;
            println!("{} {}", "created".green(), path.display());
        }
        TreeCommand::Rename { path, new_name } => {
            let renamed = tree.rename(&ws.resolve(path), new_name)?;
            println!("{} {}", "renamed to".green(), renamed.display());
        }
        TreeCommand::Rm { path, yes } => {
            let path = ws.resolve(path);
            if !yes {
                bail!("refusing to delete {} without --yes", path.display());
            }
            tree.delete(&path)?;
            println!("{} {}", "deleted".green(), path.display());
        }
    }
    Ok(())
}

fn tool(ws: &Workspace, cmd: &ToolCommandArgs) -> anyhow::Result<()> {
    let (command, exec): (ToolCommand, Exec) = match cmd {
        ToolCommandArgs::BuildRunner { file, exec } => {
            let file = file.as_ref().map(|f| ws.resolve(f));
            (terminal::build_runner(ws.root(), file.as_deref()), *exec)
        }
        ToolCommandArgs::Deps { exec } => (terminal::pub_deps(), *exec),
        ToolCommandArgs::GenL10n { exec } => (terminal::gen_l10n(), *exec),
    };
    if exec.run {
        command.run(ws.root())?;
    } else {
        println!("{command}");
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn format_location(ws: &Workspace, location: &Location) -> String {
    let path = location.path.strip_prefix(ws.root()).unwrap_or(&location.path);
    format!("{}:{}:{}", path.display(), location.position.line + 1, location.position.character + 1)
}

fn print_locations(ws: &Workspace, locations: &[Location]) {
    if locations.is_empty() {
        println!("{}", "no definition".dimmed());
    }
    for location in locations {
        println!("{}", format_location(ws, location));
    }
}

fn print_nodes(nodes: &[TreeNode], output: Output) -> anyhow::Result<()> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(nodes)?),
        Output::Text => {
            for node in nodes {
                if node.is_dir() {
                    println!("{}/", node.name.blue().bold());
                } else {
                    println!("{}", node.name);
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    for (path, key) in &report.written {
        println!("{} {} in {}", "wrote".green(), key, l10n::arb::file_name(path));
    }
    if report.cancelled {
        println!("{}", "cancelled".yellow());
    }
    if let Some(warning) = report.warning() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}
