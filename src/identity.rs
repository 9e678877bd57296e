/// Stable upsert key for a place found under one category and district.
///
/// The same provider place collected for a different category or district
/// gets a different key, so those rows co-exist downstream.
pub fn record_id(place_id: &str, category: &str, district: &str) -> String {
    let source: String = [place_id, category, district]
        .concat()
        .chars()
        .filter(|c| *c != ' ' && *c != ',')
        .collect();
    format!("{:x}", md5::compute(source.as_bytes()))
}
