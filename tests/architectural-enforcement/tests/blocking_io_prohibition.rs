//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the engine MUST NOT use blocking I/O. Every
//! remote operation runs on the caller's runtime; one blocking call stalls
//! every session sharing it.
//! **Required**: `tokio::fs`, `tokio::net`, async `reqwest`.
//! **Allowed**: blocking calls in plain `fn`s (configuration loading runs
//! before any operation starts) and in test code.

use architectural_enforcement::{report, scan, LineContext, SourceLine};

const BLOCKING_CALLS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::io::stdout()", "Blocking stdout"),
];

fn check(line: &SourceLine<'_>) -> Option<String> {
    match line.context {
        LineContext::Test | LineContext::Sync => None,
        // Importing a blocking module makes every use look innocent
        LineContext::Item => (line.code.contains("use std::fs")
            || line.code.contains("use std::net"))
        .then(|| line.violation("Blocking module import")),
        LineContext::Async => BLOCKING_CALLS
            .iter()
            .find(|(pattern, _)| line.code.contains(pattern))
            .map(|(_, kind)| line.violation(kind)),
    }
}

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan(check);

    report(
        "Blocking I/O in async code",
        &violations,
        &[
            "✅ REQUIRED async I/O:",
            "  - tokio::fs::read(path).await, tokio::fs::metadata(path).await",
            "  - reqwest::Client (async) for the service API",
            "✅ ACCEPTABLE blocking I/O:",
            "  - Non-async functions (configuration loading)",
            "  - Test code",
        ],
    );
}
