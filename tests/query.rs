mod common;

use common::{split_cursor, write_php};
use phpcursor::query::{
    MISSING_OFFSET, QueryEngine, QueryMode, QueryOutput, QueryRequest, Response, SourceInput,
};
use serde_json::{Value, json};

fn run(mode: QueryMode, marked: &str, as_selector: bool) -> Value {
    let (source, offset) = split_cursor(marked);
    let request = QueryRequest {
        mode: Some(mode),
        source: Some(SourceInput::Text(source)),
        offset: Some(offset),
        as_selector,
        char_offset: false,
    };
    let response = Response::from_outcome(QueryEngine::default().run(&request));
    serde_json::from_str(&response.to_json().unwrap()).unwrap()
}

#[test]
fn test_scope_chain_envelope() {
    let value = run(
        QueryMode::ScopeChain,
        "<?php\nclass A {\n    function b() {\n        <|>\n    }\n}\n",
        false,
    );
    assert_eq!(
        value,
        json!({
            "success": true,
            "result": [{"kind": "ClassDeclaration"}, {"kind": "MethodDeclaration"}]
        })
    );
}

#[test]
fn test_scope_chain_selector_envelope() {
    let value = run(
        QueryMode::ScopeChain,
        "<?php\nclass A {\n    function b() {\n        <|>\n    }\n}\n",
        true,
    );
    assert_eq!(
        value,
        json!({"success": true, "result": "ClassDeclaration.MethodDeclaration"})
    );
}

#[test]
fn test_empty_scope_chain_is_still_a_success() {
    let value = run(QueryMode::ScopeChain, "<?php\n<|>", false);
    assert_eq!(value, json!({"success": true, "result": []}));
}

#[test]
fn test_invocation_envelope() {
    let marked = "<?php\nfoo(1, 2, bar(<|>3));\n";
    let (source, _) = split_cursor(marked);
    let bar_end = source.find("bar").unwrap() + 3;

    let value = run(QueryMode::Invocation, marked, false);
    assert_eq!(
        value,
        json!({
            "success": true,
            "result": {
                "name": "bar",
                "type": "function",
                "callStack": ["bar"],
                "argumentIndex": 0,
                "parameterListStartPos": bar_end,
            }
        })
    );
}

#[test]
fn test_method_invocation_is_reported_with_function_type() {
    let value = run(QueryMode::Invocation, "<?php\n$a->b->c(<|>);\n", false);
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["result"]["type"], json!("function"));
    assert_eq!(value["result"]["callStack"], json!(["$a", "b", "c()"]));
}

#[test]
fn test_not_found_envelope() {
    let value = run(QueryMode::Invocation, "<?php\n$x = <|>1;\n", false);
    assert_eq!(
        value,
        json!({"success": false, "result": "No invocation found!"})
    );
}

#[test]
fn test_missing_offset_envelope() {
    let request = QueryRequest {
        mode: Some(QueryMode::Invocation),
        source: Some(SourceInput::Text("<?php foo();".into())),
        ..QueryRequest::default()
    };
    let response = Response::from_outcome(QueryEngine::default().run(&request));
    assert!(!response.success);
    let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
    assert_eq!(value["result"], json!(MISSING_OFFSET));
}

#[test]
fn test_file_source() {
    let (_dir, path) = write_php("<?php\nstrlen($s);\n");
    let request = QueryRequest {
        mode: Some(QueryMode::Invocation),
        source: Some(SourceInput::File(path)),
        offset: Some(14),
        ..QueryRequest::default()
    };
    let QueryOutput::Invocation(call) = QueryEngine::default().run(&request).unwrap() else {
        panic!("expected an invocation");
    };
    assert_eq!(call.name.as_deref(), Some("strlen"));
}

#[test]
fn test_character_offset_scope_chain() {
    // "ü" takes two bytes, so byte and character offsets differ after it.
    let source = "<?php\n$ü = 1;\nfunction f() {\n    \n}\n";
    let byte_offset = source.find("    \n}").unwrap() + 2;
    let char_offset = source[..byte_offset].chars().count();
    assert_eq!(byte_offset, char_offset + 1);

    let request = QueryRequest {
        mode: Some(QueryMode::ScopeChain),
        source: Some(SourceInput::Text(source.into())),
        offset: Some(char_offset as u32),
        as_selector: true,
        char_offset: true,
    };
    assert_eq!(
        QueryEngine::default().run(&request).unwrap(),
        QueryOutput::Selector("FunctionDeclaration".into())
    );
}
