#![no_main]

use flatql_core::tokenize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string (ignore invalid UTF-8)
    if let Ok(query) = std::str::from_utf8(data) {
        // Limit query length to prevent timeout
        if query.len() > 10_000 {
            return;
        }

        // Tokenizing should never panic, and a token list printed back out
        // must tokenize to the same list
        if let Ok(tokens) = tokenize(query) {
            let printed: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            let again = tokenize(&printed.join(" ")).expect("printed tokens must re-tokenize");
            assert_eq!(tokens, again);
        }
    }
});
