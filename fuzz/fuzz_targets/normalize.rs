#![no_main]

use std::time::SystemTime;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use loginmon_core::event::{NormalizedEvent, Provider, RESERVED_TAGS};
use loginmon_core::identity::ProcessIdentity;
use loginmon_core::normalize::normalize;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    hostname: String,
    measurement: String,
    kind: String,
    docker: bool,
    tags: Vec<(String, String)>,
}

fuzz_target!(|input: FuzzInput| {
    let identity = ProcessIdentity::new(input.hostname, input.measurement, "loginmon");
    let provider = if input.docker {
        Provider::Docker
    } else {
        Provider::Auth
    };

    let mut event = NormalizedEvent::new(provider, input.kind, "fuzz", SystemTime::UNIX_EPOCH);
    for (k, v) in input.tags {
        event = event.with_tag(k, v);
    }

    let conflicts = event.tags.keys().any(|k| RESERVED_TAGS.contains(&k.as_str()));
    match normalize(&identity, &event) {
        Ok(point) => {
            assert!(!conflicts);
            assert_eq!(point.tag("hostname"), Some(identity.hostname()));
            assert_eq!(point.tag("event"), Some(event.kind.as_str()));
        }
        Err(_) => assert!(conflicts),
    }
});
