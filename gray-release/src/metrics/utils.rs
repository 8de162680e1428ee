pub fn inc(name: &'static str, labels: &[(String, String)], value: u64) {
    ::metrics::counter!(name, labels).increment(value);
}

pub fn label(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}
