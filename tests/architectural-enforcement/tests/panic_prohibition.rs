//! Integration Test: Panic Shortcut Prohibition
//!
//! **Policy**: Production code propagates errors; failures of remote
//! operations become `Failed` states, notifications or transcript entries,
//! never panics. `unwrap()` and `expect()` are allowed only for compiling
//! constant regexes and in test code.

use architectural_enforcement::{report, scan, LineContext, SourceLine};

fn check(line: &SourceLine<'_>) -> Option<String> {
    if line.context == LineContext::Test {
        return None;
    }
    if line.code.contains("Regex::new(") {
        return None;
    }
    if line.code.contains(".unwrap()") {
        return Some(line.violation("unwrap()"));
    }
    if line.code.contains(".expect(") {
        return Some(line.violation("expect()"));
    }
    None
}

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = scan(check);

    report(
        "Panicking shortcut in production code",
        &violations,
        &[
            "✅ Use `?` with the module's error type (ApiError, ConfigError, UploadRejection)",
            "✅ Use `unwrap_or_default()` / `unwrap_or_else()` where a fallback is meaningful",
        ],
    );
}
