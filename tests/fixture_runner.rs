//! Data-driven query tests.
//!
//! Each `tests/fixtures/*.fixture` file holds a query mode, a PHP source
//! with a `<|>` cursor marker and the expected response envelope:
//!
//! ```text
//! mode: invocation
//! --- source
//! <?php
//! foo(<|>);
//! --- expect
//! {"success": true, "result": {...}}
//! ```
//!
//! `mode` is one of `scope-chain`, `selector` or `invocation`.  Expected
//! envelopes are compared as JSON values, so formatting is free.

use phpcursor::query::{QueryEngine, QueryMode, QueryRequest, Response, SourceInput};

const CURSOR: &str = "<|>";
const SOURCE_HEADER: &str = "--- source\n";
const EXPECT_HEADER: &str = "--- expect\n";

struct Fixture {
    mode: String,
    source: String,
    offset: u32,
    expected: serde_json::Value,
}

fn parse_fixture(contents: &str) -> Result<Fixture, String> {
    let (header, rest) = contents
        .split_once(SOURCE_HEADER)
        .ok_or("missing `--- source` section")?;
    let (marked, expected) = rest
        .split_once(EXPECT_HEADER)
        .ok_or("missing `--- expect` section")?;

    let mode = header
        .lines()
        .find_map(|line| line.strip_prefix("mode:"))
        .map(|mode| mode.trim().to_string())
        .ok_or("missing `mode:` line")?;

    let offset = marked.find(CURSOR).ok_or("source has no <|> cursor marker")? as u32;
    let source = marked.replacen(CURSOR, "", 1);
    let expected =
        serde_json::from_str(expected).map_err(|e| format!("invalid expected JSON: {e}"))?;

    Ok(Fixture {
        mode,
        source,
        offset,
        expected,
    })
}

fn run_fixture(
    path: &datatest_stable::Utf8Path,
    contents: String,
) -> datatest_stable::Result<()> {
    let fixture = parse_fixture(&contents).map_err(|e| format!("{path}: {e}"))?;

    let (mode, as_selector) = match fixture.mode.as_str() {
        "scope-chain" => (QueryMode::ScopeChain, false),
        "selector" => (QueryMode::ScopeChain, true),
        "invocation" => (QueryMode::Invocation, false),
        other => return Err(format!("{path}: unknown mode `{other}`").into()),
    };

    let request = QueryRequest {
        mode: Some(mode),
        source: Some(SourceInput::Text(fixture.source)),
        offset: Some(fixture.offset),
        as_selector,
        char_offset: false,
    };
    let response = Response::from_outcome(QueryEngine::default().run(&request));
    let actual: serde_json::Value = serde_json::from_str(&response.to_json()?)?;

    if actual != fixture.expected {
        return Err(format!(
            "{path}: response mismatch\n  expected: {}\n  actual:   {}",
            fixture.expected, actual
        )
        .into());
    }
    Ok(())
}

datatest_stable::harness! {
    { test = run_fixture, root = "tests/fixtures", pattern = r"^.*\.fixture$" },
}
