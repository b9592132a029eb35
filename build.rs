use std::collections::HashSet;
use std::fs;
use std::path::Path;

// Integrity check for the bundled decision tree. The catalog is immutable at
// runtime, so any malformed node is a build failure.
fn main() {
    println!("cargo:rerun-if-changed=assets/tree.json");

    let asset = Path::new("assets").join("tree.json");
    let content = fs::read_to_string(&asset).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&content).unwrap();

    let nodes = tree["nodes"].as_object().expect("assets/tree.json: `nodes` must be an object");
    let ids: HashSet<&str> = nodes.keys().map(|k| k.as_str()).collect();

    let mut problems = Vec::new();

    for (id, node) in nodes {
        let kind = node["kind"].as_str().unwrap_or("");
        let choices = node["choices"].as_array().map(|c| c.as_slice()).unwrap_or(&[]);

        match kind {
            "question" if choices.is_empty() => {
                problems.push(format!("question {} has no choices", id));
            }
            "terminal" if !choices.is_empty() => {
                problems.push(format!("terminal {} has choices", id));
            }
            "question" | "terminal" => {}
            other => problems.push(format!("node {} has unknown kind {:?}", id, other)),
        }

        for choice in choices {
            let label = choice["label"].as_str().unwrap_or("");
            if label.trim().is_empty() {
                problems.push(format!("node {} has a choice with an empty label", id));
            }
            let target = choice["target"].as_str().unwrap_or("");
            if !ids.contains(target) {
                problems.push(format!("node {} targets missing node {:?}", id, target));
            }
        }
    }

    let mut seen = HashSet::new();
    if let Some(sections) = tree["sections"].as_array() {
        for section in sections {
            let id = section["id"].as_str().unwrap_or("");
            if !seen.insert(id) {
                problems.push(format!("section {} declared twice", id));
            }
        }
    }

    if !problems.is_empty() {
        panic!("bundled catalog is invalid:\n  {}", problems.join("\n  "));
    }
}
