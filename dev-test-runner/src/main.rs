//! Print the Dart classes synthesized for built-in payload samples and for
//! every `*.json` file in the directories given on the command line.
use serde_json::{Value, json};

use dart_devtools::synth::{self, SynthOptions};

/// Payload shapes that exercise nesting, list element inference and
/// annotated keys.
fn realistic_samples() -> Vec<(&'static str, Value)> {
    vec![
        (
            "Store",
            json!({
                "id": "0ahUKEa1ZQ",
                "name": "Acme Widgets",
                "rating": 4.3,
                "open": true,
                "tags": ["hardware", "store"],
                "location": {"lat": 37.4219, "lng": -122.0840},
                "reviews": [
                    {"author": "kim", "stars": 5, "reply": null}
                ],
                "extra": null
            }),
        ),
        (
            "Envelope",
            json!([{
                "code": 0,
                "message": "ok",
                "data": {
                    "total_count": 2,
                    "items": [{"item_id": 1, "title": "first", "created_at": "2024-01-01"}],
                    "page<int>": 1
                }
            }]),
        ),
        (
            "Matrix",
            json!({
                "rows": [[1, 2], [3, 4]],
                "labels": [],
                "mixed": [1, "two", null]
            }),
        ),
    ]
}

fn print_sample(name: &str, text: &str, options: &SynthOptions) {
    println!("// ---- {name} ----");
    match synth::parse_root(text) {
        Ok(root) => println!("{}\n", synth::synthesize_all(&root, name, options).into_source()),
        Err(error) => println!("// skipped: {error}\n"),
    }
}

fn main() {
    let options = SynthOptions::default();
    for (name, value) in realistic_samples() {
        print_sample(name, &value.to_string(), &options);
    }

    for dir in std::env::args().skip(1) {
        let pattern = format!("{}/*.json", glob::Pattern::escape(&dir));
        let Ok(paths) = glob::glob(&pattern) else {
            eprintln!("bad sample directory: {dir}");
            continue;
        };
        for path in paths.flatten() {
            let Ok(text) = std::fs::read_to_string(&path) else {
                eprintln!("unreadable sample: {}", path.display());
                continue;
            };
            let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            let name = dart_devtools::naming::type_name_for_key(&stem, "");
            print_sample(&name, &text, &options);
        }
    }
}
