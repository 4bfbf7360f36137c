#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Some((a, b)) = launcher_ui::parse_pair(data) {
        assert!(a.is_finite() && b.is_finite());
    }
});
