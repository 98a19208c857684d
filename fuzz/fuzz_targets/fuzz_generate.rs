#![no_main]

use libfuzzer_sys::fuzz_target;
use yang_openapi_core::{generate, GenerateOptions, SchemaContext};

// Arbitrary bytes as a schema context document. Malformed contexts must be
// rejected with an error, never a panic.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(ctx) = SchemaContext::from_json(text) {
        let modules: Vec<String> = ctx.modules.iter().map(|m| m.name.clone()).collect();
        let mut options = GenerateOptions::for_modules(modules);
        options.max_depth = 16;
        let _ = generate(&ctx, &options);
    }
});
