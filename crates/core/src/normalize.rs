//! 이벤트 정규화 및 예약 태그 보호
//!
//! [`normalize`]는 watcher가 만든 [`NormalizedEvent`]에 프로세스 식별 태그를
//! 합쳐 [`CanonicalPoint`]를 만듭니다. 이벤트 태그가 예약 태그
//! (`hostname`, `event`)를 덮어쓰려 하면 병합을 중단하고 [`TagConflict`]를
//! 반환합니다.
//!
//! 순수 함수입니다. 같은 입력에는 항상 같은 measurement와 태그가 나옵니다.

use std::collections::BTreeMap;

use crate::error::TagConflict;
use crate::event::{
    CanonicalPoint, FIELD_DESCRIPTION, FieldValue, NormalizedEvent, Provider, TAG_EVENT,
    TAG_HOSTNAME,
};
use crate::identity::ProcessIdentity;

/// 이벤트를 저장용 포인트로 변환합니다.
///
/// # Errors
/// 이벤트 태그 중 하나라도 기본 태그와 같은 키를 가지면 [`TagConflict`].
pub fn normalize(
    identity: &ProcessIdentity,
    event: &NormalizedEvent,
) -> Result<CanonicalPoint, TagConflict> {
    let mut tags = BTreeMap::new();
    tags.insert(TAG_HOSTNAME.to_owned(), identity.hostname().to_owned());
    tags.insert(TAG_EVENT.to_owned(), event.kind.clone());

    merge_tags(&mut tags, &event.tags)?;

    let mut fields = BTreeMap::new();
    fields.insert(
        FIELD_DESCRIPTION.to_owned(),
        FieldValue::String(event.description.clone()),
    );

    Ok(CanonicalPoint::new(
        measurement_name(event.provider, identity.measurement_base()),
        tags,
        fields,
        event.timestamp,
    ))
}

/// `incoming` 태그를 `base`에 병합합니다.
///
/// 충돌하는 키가 하나라도 있으면 `base`를 변경하지 않고 첫 충돌 키를 반환합니다.
pub fn merge_tags(
    base: &mut BTreeMap<String, String>,
    incoming: &BTreeMap<String, String>,
) -> Result<(), TagConflict> {
    if let Some(key) = incoming.keys().find(|key| base.contains_key(*key)) {
        return Err(TagConflict { key: key.clone() });
    }

    base.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(())
}

/// `provider ++ title_case(base)` (예: `auth` + `events` → `authEvents`)
pub fn measurement_name(provider: Provider, base: &str) -> String {
    format!("{}{}", provider.as_str(), title_case(base))
}

/// 공백으로 구분된 각 단어의 첫 글자를 대문자로 바꿉니다. 나머지 글자와 공백은 유지합니다.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for ch in input.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }

    out
}
