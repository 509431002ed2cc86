#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use loginmon_auth_watcher::parser::{Fingerprints, parse_text};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    line: String,
    /// None이면 기본 fingerprint 사용
    custom: Option<(String, String)>,
}

fuzz_target!(|input: FuzzInput| {
    let fingerprints = match input.custom {
        Some((login, logout)) => Fingerprints::new(login, logout),
        None => Fingerprints::default(),
    };

    // 패닉 없이 None 또는 공백 없는 사용자명을 반환해야 한다
    if let Some(matched) = parse_text(&input.line, &fingerprints) {
        assert!(!matched.user.is_empty());
        assert!(!matched.user.contains(char::is_whitespace));
    }
});
