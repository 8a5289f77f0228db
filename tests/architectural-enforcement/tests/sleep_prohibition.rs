//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. Sessions wait on the
//! service's response and nothing else; there is no polling, retry loop or
//! frame pacing in the engine.

use architectural_enforcement::{report, scan, LineContext, SourceLine};

fn check(line: &SourceLine<'_>) -> Option<String> {
    if line.context == LineContext::Test {
        return None;
    }
    (line.code.contains("::sleep(") || line.code.contains(".sleep("))
        .then(|| line.violation("Sleep"))
}

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(check);

    report(
        "Sleep in production code",
        &violations,
        &[
            "❌ FORBIDDEN:",
            "  - Sleep as poor man's synchronization",
            "  - Sleep to 'wait' for a response (await the request instead)",
            "✅ Timeouts belong in the HTTP client configuration",
        ],
    );
}
